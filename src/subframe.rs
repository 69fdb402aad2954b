//! I/NAV subframe collection and bit-level field extraction.
//!
//! This module contains the [`Subframe`] struct, which represents one 30-second
//! I/NAV subframe received from a single satellite, and the bit codec used to
//! extract the HKROOT and MACK messages (and, for navigation-data
//! authentication, the raw 128-bit words) from its 3510 bits of page data.

use crate::types::{
    BitSlice, BitVec, HkrootMessage, MackMessage, Tow, Wn, HKROOT_MESSAGE_BYTES,
    MACK_MESSAGE_BYTES, PAGES_PER_SUBFRAME, PAGE_EVEN_BITS, PAGE_ODD_BITS, SUBFRAME_BITS,
};
use crate::{Gst, Svn};
use bitvec::prelude::*;
use core::fmt;

// Offset, within the odd half of a page, of the 40-bit OSNMA field (two
// status bits followed by 16 bits of data word before OSNMA begins).
const OSNMA_FIELD_OFFSET: usize = 18;
const OSNMA_FIELD_BITS: usize = 40;
const PAGE_BITS: usize = PAGE_EVEN_BITS + PAGE_ODD_BITS;

/// One 30-second I/NAV subframe from a single satellite.
///
/// The subframe carries the concatenation of 15 consecutive I/NAV pages, with
/// the 6-bit inter-page tail already stripped, for a total of 3510 bits. Pages
/// that were not received are represented as all-zero bits; the `received`
/// bitmap records which of the 15 pages actually arrived.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Subframe {
    wn: Wn,
    tow: Tow,
    svn: Svn,
    data: BitVec,
    received: [bool; PAGES_PER_SUBFRAME],
}

impl Subframe {
    /// Constructs a new subframe.
    ///
    /// The `tow` given is the GST time of week at the start of the subframe,
    /// and must be a multiple of 30. `data` must contain exactly
    /// [`SUBFRAME_BITS`] bits. `received[i]` indicates whether page `i` (0
    /// being the first page of the subframe) was actually received; data for
    /// pages that were not received should be zero-filled by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != SUBFRAME_BITS`, or if `tow` is not a multiple
    /// of 30.
    pub fn new(
        wn: Wn,
        tow: Tow,
        svn: Svn,
        data: BitVec,
        received: [bool; PAGES_PER_SUBFRAME],
    ) -> Subframe {
        assert_eq!(data.len(), SUBFRAME_BITS);
        assert_eq!(tow % 30, 0);
        Subframe {
            wn,
            tow,
            svn,
            data,
            received,
        }
    }

    /// Gives the GST at the start of the subframe.
    pub fn gst(&self) -> Gst {
        Gst::new(self.wn, self.tow)
    }

    /// Gives the SVN of the satellite that transmitted this subframe.
    pub fn svn(&self) -> Svn {
        self.svn
    }

    /// Reports whether every one of the 15 pages in the subframe was received.
    pub fn is_complete(&self) -> bool {
        self.received.iter().all(|&r| r)
    }

    /// Gives the bitmap of received pages, page 0 first.
    pub fn received_pages(&self) -> [bool; PAGES_PER_SUBFRAME] {
        self.received
    }

    fn page(&self, page_index: usize) -> &BitSlice {
        let start = page_index * PAGE_BITS;
        &self.data[start..start + PAGE_BITS]
    }

    fn even_half(&self, page_index: usize) -> &BitSlice {
        &self.page(page_index)[..PAGE_EVEN_BITS]
    }

    fn odd_half(&self, page_index: usize) -> &BitSlice {
        &self.page(page_index)[PAGE_EVEN_BITS..]
    }

    /// Extracts the 128-bit navigation-data word carried by one page.
    ///
    /// Per the Galileo SIS ICD, a word is the concatenation of the even
    /// half's data field (bits 2 to 114, skipping the 2-bit page/word-type
    /// preamble) and the odd half's data field (bits 2 to 18, skipping the
    /// 2-bit preamble and stopping before the OSNMA field).
    pub fn word(&self, page_index: usize) -> BitVec {
        let mut word = BitVec::new();
        word.extend_from_bitslice(&self.even_half(page_index)[2..]);
        word.extend_from_bitslice(&self.odd_half(page_index)[2..OSNMA_FIELD_OFFSET]);
        word
    }

    /// Extracts the HKROOT and MACK messages carried by this subframe.
    ///
    /// This concatenates, across the 15 pages, the first 8 bits of each
    /// page's 40-bit OSNMA field into the 120-bit HKROOT message, and the
    /// remaining 32 bits into the 480-bit MACK message. If both messages are
    /// entirely zero, this is reported as
    /// [`SubframeError::NoOsnmaData`], since that is not a valid OSNMA
    /// transmission.
    pub fn hkroot_mack(&self) -> Result<(HkrootMessage, MackMessage), SubframeError> {
        let mut hkroot = [0u8; HKROOT_MESSAGE_BYTES];
        let mut mack = [0u8; MACK_MESSAGE_BYTES];
        for page_index in 0..PAGES_PER_SUBFRAME {
            let odd = self.odd_half(page_index);
            let osnma = &odd[OSNMA_FIELD_OFFSET..OSNMA_FIELD_OFFSET + OSNMA_FIELD_BITS];
            hkroot[page_index] = osnma[..8].load_be::<u8>();
            let mack_chunk = BitSlice::from_slice_mut(&mut mack[page_index * 4..page_index * 4 + 4]);
            mack_chunk.copy_from_bitslice(&osnma[8..]);
        }
        if hkroot == [0; HKROOT_MESSAGE_BYTES] && mack == [0; MACK_MESSAGE_BYTES] {
            log::trace!("no OSNMA data in subframe (GST {:?}, {})", self.gst(), self.svn);
            return Err(SubframeError::NoOsnmaData);
        }
        Ok((hkroot, mack))
    }
}

/// Errors produced while extracting fields from a [`Subframe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SubframeError {
    /// The HKROOT and MACK messages extracted from the subframe are both
    /// entirely zero, meaning the satellite is not transmitting OSNMA data.
    NoOsnmaData,
}

impl fmt::Display for SubframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubframeError::NoOsnmaData => "no OSNMA data present in subframe".fmt(f),
        }
    }
}

impl std::error::Error for SubframeError {}

#[cfg(test)]
mod test {
    use super::*;

    fn page_bits(hkroot_byte: u8, mack_word: u32) -> BitVec {
        let mut page = BitVec::repeat(false, PAGE_BITS);
        let osnma_start = PAGE_EVEN_BITS + OSNMA_FIELD_OFFSET;
        page[osnma_start..osnma_start + 8].store_be(hkroot_byte);
        page[osnma_start + 8..osnma_start + OSNMA_FIELD_BITS].store_be(mack_word);
        page
    }

    fn subframe_from_pages(pages: &[(u8, u32)]) -> Subframe {
        let mut data = BitVec::new();
        for &(h, m) in pages {
            data.extend_from_bitslice(&page_bits(h, m));
        }
        Subframe::new(
            1234,
            60,
            Svn::try_from(3).unwrap(),
            data,
            [true; PAGES_PER_SUBFRAME],
        )
    }

    #[test]
    fn extract_hkroot_mack() {
        let pages: Vec<(u8, u32)> = (0..PAGES_PER_SUBFRAME as u8)
            .map(|i| (i, u32::from(i) << 24 | u32::from(i) << 16 | u32::from(i) << 8 | u32::from(i)))
            .collect();
        let subframe = subframe_from_pages(&pages);
        let (hkroot, mack) = subframe.hkroot_mack().unwrap();
        for (i, &h) in hkroot.iter().enumerate() {
            assert_eq!(h, i as u8);
        }
        for chunk in mack.chunks_exact(4) {
            assert_eq!(chunk, &[chunk[0]; 4]);
        }
    }

    #[test]
    fn no_osnma_data() {
        let pages = vec![(0u8, 0u32); PAGES_PER_SUBFRAME];
        let subframe = subframe_from_pages(&pages);
        assert_eq!(subframe.hkroot_mack(), Err(SubframeError::NoOsnmaData));
    }

    #[test]
    fn incomplete_subframe_flagged() {
        let mut received = [true; PAGES_PER_SUBFRAME];
        received[4] = false;
        let subframe = Subframe::new(
            1234,
            60,
            Svn::try_from(1).unwrap(),
            BitVec::repeat(false, SUBFRAME_BITS),
            received,
        );
        assert!(!subframe.is_complete());
    }
}
