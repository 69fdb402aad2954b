//! Storage and extraction of authenticated navigation-data slices.
//!
//! Each I/NAV subframe carries, spread across five or two of its 128-bit
//! words, the exact bit sequence that a TESLA tag authenticates. This module
//! extracts those sequences and keeps them around long enough for a delayed
//! tag to be checked against them.

use crate::bitfields::Adkd;
use crate::subframe::Subframe;
use crate::types::BitVec;
use crate::Gst;
use bitvec::prelude::*;
use std::collections::HashMap;

/// PRND value used for ADKD-4 (timing parameters) navdata, which is common to
/// the whole constellation rather than tied to one satellite.
pub const CONSTELLATION_PRND: u8 = 255;

// Subframe page indices carrying, in order, I/NAV word types 1 through 5.
const CED_PAGES: [usize; 5] = [10, 0, 11, 1, 12];
// Subframe page indices carrying word type 6 and word type 10.
const TIMING_PAGES: [usize; 2] = [2, 4];

const CED_BITS: usize = 549;
const TIMING_BITS: usize = 141;

/// A navdata slice retrieved from the store, together with whether it came
/// from the current subframe or from an older fallback entry.
#[derive(Debug, Clone)]
pub struct NavDataEntry {
    /// The authenticated-data bits.
    pub bits: BitVec,
    /// Whether this entry came from a fallback (older) slice rather than the
    /// one extracted for the GST being authenticated.
    pub old_nav_data_used: bool,
    /// Whether the subframe this slice was extracted from was missing one
    /// or more pages. Always `false` when `old_nav_data_used` is `true`,
    /// since the fallback path does not track this.
    pub incomplete_subframe: bool,
}

/// Store of navigation-data slices extracted from received subframes.
///
/// Two mappings are kept, matching the lifecycle of the data: `current`
/// holds the slice extracted for one particular GST, removed once the tag
/// that authenticates it has been resolved; `last_known` holds, per (PRND,
/// ADKD), the most recently extracted slice regardless of whether it has
/// been consumed, used as a fallback when `current` has nothing for the GST
/// being authenticated.
#[derive(Debug, Default)]
pub struct NavDataStore {
    current: HashMap<(Gst, u8, Adkd), (BitVec, bool)>,
    last_known: HashMap<(u8, Adkd), (BitVec, Gst)>,
}

impl NavDataStore {
    /// Constructs an empty navdata store.
    pub fn new() -> NavDataStore {
        NavDataStore {
            current: HashMap::new(),
            last_known: HashMap::new(),
        }
    }

    /// Extracts the ADKD-0/12 and ADKD-4 navdata slices carried by `subframe`
    /// and inserts them into the store.
    ///
    /// The ADKD-0 and ADKD-12 slices are identical (both authenticate the
    /// same ephemeris-clock-status data, at different key-disclosure delays)
    /// and are stored under the transmitting satellite's PRND. The ADKD-4
    /// slice, when present, is stored under [`CONSTELLATION_PRND`] since
    /// timing parameters are not tied to one satellite. Extracting the same
    /// subframe twice is idempotent: both slices are rebuilt from scratch
    /// from `subframe`'s bits, so the result only depends on the subframe's
    /// data.
    pub fn extract_subframe(&mut self, subframe: &Subframe) {
        self.extract_ced_and_slowmac(subframe);
        if let Some(timing) = extract_timing(subframe) {
            self.insert(
                subframe.gst(),
                CONSTELLATION_PRND,
                Adkd::InavTiming,
                timing,
                subframe.is_complete(),
            );
        }
    }

    /// Like [`NavDataStore::extract_subframe`], but skips the ADKD-4 (timing)
    /// slice.
    ///
    /// Used when a subframe's OSNMA field is absent: the I/NAV words carrying
    /// ephemeris and clock data are still usable for a later ADKD-0/12 tag,
    /// but there is no point extracting the timing slice since no key-chain
    /// has necessarily been established yet to authenticate it either.
    pub fn extract_subframe_no_timing(&mut self, subframe: &Subframe) {
        self.extract_ced_and_slowmac(subframe);
    }

    fn extract_ced_and_slowmac(&mut self, subframe: &Subframe) {
        let gst = subframe.gst();
        let prnd = u8::from(subframe.svn());
        let complete = subframe.is_complete();
        let ced = extract_ced(subframe);
        self.insert(gst, prnd, Adkd::InavCed, ced.clone(), complete);
        self.insert(gst, prnd, Adkd::SlowMac, ced, complete);
    }

    fn insert(&mut self, gst: Gst, prnd: u8, adkd: Adkd, bits: BitVec, complete: bool) {
        self.last_known.insert((prnd, adkd), (bits.clone(), gst));
        self.current.insert((gst, prnd, adkd), (bits, complete));
    }

    /// Looks up the navdata slice for (`gst`, `prnd`, `adkd`).
    ///
    /// If no entry exists for that exact GST, falls back to the most
    /// recently extracted slice for (`prnd`, `adkd`), flagging
    /// [`NavDataEntry::old_nav_data_used`].
    pub fn lookup(&self, gst: Gst, prnd: u8, adkd: Adkd) -> Option<NavDataEntry> {
        if let Some((bits, complete)) = self.current.get(&(gst, prnd, adkd)) {
            return Some(NavDataEntry {
                bits: bits.clone(),
                old_nav_data_used: false,
                incomplete_subframe: !complete,
            });
        }
        self.last_known
            .get(&(prnd, adkd))
            .map(|(bits, _)| NavDataEntry {
                bits: bits.clone(),
                old_nav_data_used: true,
                incomplete_subframe: false,
            })
    }

    /// Removes the `current` entry for (`gst`, `prnd`, `adkd`), once its tag
    /// has been resolved (successfully or not).
    ///
    /// The `last_known` fallback entry is left untouched.
    pub fn remove(&mut self, gst: Gst, prnd: u8, adkd: Adkd) {
        self.current.remove(&(gst, prnd, adkd));
    }
}

fn extract_ced(subframe: &Subframe) -> BitVec {
    let mut bits = BitVec::repeat(false, CED_BITS);
    for &page in &CED_PAGES {
        let word = subframe.word(page);
        let word_type = word[..6].load_be::<u8>();
        match word_type {
            1 => bits[0..120].copy_from_bitslice(&word[6..126]),
            2 => bits[120..240].copy_from_bitslice(&word[6..126]),
            3 => bits[240..362].copy_from_bitslice(&word[6..128]),
            4 => bits[362..482].copy_from_bitslice(&word[6..126]),
            5 => bits[482..549].copy_from_bitslice(&word[6..73]),
            _ => (),
        }
    }
    bits
}

fn extract_timing(subframe: &Subframe) -> Option<BitVec> {
    let word4 = subframe.word(TIMING_PAGES[1]);
    if word4[..6].load_be::<u8>() != 10 {
        return None;
    }
    let mut bits = BitVec::repeat(false, TIMING_BITS);
    let word2 = subframe.word(TIMING_PAGES[0]);
    bits[0..99].copy_from_bitslice(&word2[6..105]);
    bits[99..141].copy_from_bitslice(&word4[86..128]);
    Some(bits)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{BitSlice, PAGES_PER_SUBFRAME, PAGE_EVEN_BITS, PAGE_ODD_BITS, SUBFRAME_BITS};
    use crate::Svn;

    fn word_into_page(page: &mut BitVec, word_type: u8, offset: usize, payload: &BitSlice) {
        // A page's word is even[2:114] | odd[2:18]; the word type occupies
        // its first 6 bits, and `offset` is where the payload starts within
        // the 128-bit word.
        let mut word = BitVec::repeat(false, 128);
        word[..6].store_be(word_type);
        word[offset..offset + payload.len()].copy_from_bitslice(payload);
        page[2..114].copy_from_bitslice(&word[..112]);
        page[PAGE_EVEN_BITS + 2..PAGE_EVEN_BITS + 18].copy_from_bitslice(&word[112..128]);
    }

    fn subframe_with_words(words: &[(usize, u8, usize, &BitSlice)]) -> Subframe {
        let mut data = BitVec::repeat(false, SUBFRAME_BITS);
        for &(page_index, word_type, offset, payload) in words {
            let start = page_index * (PAGE_EVEN_BITS + PAGE_ODD_BITS);
            let mut page = BitVec::repeat(false, PAGE_EVEN_BITS + PAGE_ODD_BITS);
            word_into_page(&mut page, word_type, offset, payload);
            data[start..start + PAGE_EVEN_BITS + PAGE_ODD_BITS].copy_from_bitslice(&page);
        }
        Subframe::new(
            1234,
            60,
            Svn::try_from(5).unwrap(),
            data,
            [true; PAGES_PER_SUBFRAME],
        )
    }

    #[test]
    fn idempotent_extraction() {
        let payload = BitVec::repeat(true, 120);
        let subframe = subframe_with_words(&[(10, 1, 6, &payload)]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        let first = store
            .lookup(subframe.gst(), u8::from(subframe.svn()), Adkd::InavCed)
            .unwrap()
            .bits;
        store.extract_subframe(&subframe);
        let second = store
            .lookup(subframe.gst(), u8::from(subframe.svn()), Adkd::InavCed)
            .unwrap()
            .bits;
        assert_eq!(first, second);
    }

    #[test]
    fn all_zero_subframe_yields_zero_ced() {
        let subframe = subframe_with_words(&[]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        let entry = store
            .lookup(subframe.gst(), u8::from(subframe.svn()), Adkd::InavCed)
            .unwrap();
        assert!(!entry.bits.any());
        assert_eq!(entry.bits.len(), CED_BITS);
    }

    #[test]
    fn ced_shared_between_inav_ced_and_slow_mac() {
        let payload = BitVec::repeat(true, 120);
        let subframe = subframe_with_words(&[(10, 1, 6, &payload)]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        let svn = u8::from(subframe.svn());
        let ced = store.lookup(subframe.gst(), svn, Adkd::InavCed).unwrap().bits;
        let slow_mac = store.lookup(subframe.gst(), svn, Adkd::SlowMac).unwrap().bits;
        assert_eq!(ced, slow_mac);
    }

    #[test]
    fn timing_unavailable_without_word_type_10_on_page_4() {
        let subframe = subframe_with_words(&[(2, 6, 6, &BitVec::repeat(true, 99))]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        assert!(store
            .lookup(subframe.gst(), CONSTELLATION_PRND, Adkd::InavTiming)
            .is_none());
    }

    #[test]
    fn timing_present_when_page_4_has_word_type_10() {
        let word2_payload = BitVec::repeat(true, 99);
        let word4_payload = BitVec::repeat(true, 42);
        let subframe = subframe_with_words(&[
            (2, 6, 6, &word2_payload),
            (4, 10, 86, &word4_payload),
        ]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        let entry = store
            .lookup(subframe.gst(), CONSTELLATION_PRND, Adkd::InavTiming)
            .unwrap();
        assert_eq!(entry.bits.len(), TIMING_BITS);
        assert!(entry.bits[0..99].all());
        assert!(entry.bits[99..141].all());
    }

    #[test]
    fn fallback_to_last_known_flags_old_navdata() {
        let payload = BitVec::repeat(true, 120);
        let subframe = subframe_with_words(&[(10, 1, 6, &payload)]);
        let mut store = NavDataStore::new();
        store.extract_subframe(&subframe);
        let svn = u8::from(subframe.svn());
        store.remove(subframe.gst(), svn, Adkd::InavCed);
        assert!(store.lookup(subframe.gst(), svn, Adkd::InavCed).is_none());
        // last_known is untouched by remove(), so the fallback still applies
        // to a later GST that has no current entry of its own.
        let later_gst = subframe.gst().add_seconds(30);
        let fallback = store.lookup(later_gst, svn, Adkd::InavCed).unwrap();
        assert!(fallback.old_nav_data_used);
    }
}
