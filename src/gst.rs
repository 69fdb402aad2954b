//! Galileo System Time.

use crate::types::{Tow, Wn, SECONDS_PER_SUBFRAME};

const SECS_IN_WEEK: Tow = 24 * 3600 * 7;

/// GST (Galileo System Time)
///
/// The Galileo System Time, stored as a week number and a time of week.
///
/// # Examples
/// ```
/// use osnma_core::Gst;
///
/// let gst = Gst::new(1177, 175767);
/// assert_eq!(gst.wn(), 1177);
/// assert_eq!(gst.tow(), 175767);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Gst {
    wn: Wn,
    tow: Tow,
}

impl Gst {
    /// Constructs a new GST from a week number and TOW.
    ///
    /// # Panics
    ///
    /// Panics if `tow` is greater or equal to 604800 (the number of
    /// seconds in a week).
    pub fn new(wn: Wn, tow: Tow) -> Self {
        assert!(tow < SECS_IN_WEEK);
        Gst { wn, tow }
    }

    /// Returns the week number of the GST.
    pub fn wn(&self) -> Wn {
        self.wn
    }

    /// Returns the time of week of the GST.
    pub fn tow(&self) -> Tow {
        self.tow
    }

    /// Adds `seconds` seconds to the GST.
    ///
    /// The GST corresponding to the sum is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use osnma_core::Gst;
    ///
    /// let gst = Gst::new(1177, 175767);
    /// let gst_next_page = gst.add_seconds(2);
    /// assert_eq!(gst_next_page.wn(), 1177);
    /// assert_eq!(gst_next_page.tow(), 175769);
    ///
    /// assert_eq!(gst_next_page.add_seconds(-2), gst);
    /// ```
    pub fn add_seconds(&self, seconds: i64) -> Self {
        let secs_in_week = i64::from(SECS_IN_WEEK);
        let weeks = seconds.div_euclid(secs_in_week);
        let seconds = seconds - weeks * secs_in_week;
        let mut tow = i64::from(self.tow) + seconds;
        let mut wn = i64::from(self.wn) + weeks;
        if tow < 0 {
            wn -= 1;
            tow += secs_in_week;
        } else if tow >= secs_in_week {
            wn += 1;
            tow -= secs_in_week;
        };
        assert!((0..secs_in_week).contains(&tow));
        Gst {
            tow: tow.try_into().unwrap(),
            wn: wn.try_into().expect("GST week number out of range"),
        }
    }

    /// Adds `subframes` 30-second subframes to the GST.
    ///
    /// The GST corresponding to the sum is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use osnma_core::Gst;
    ///
    /// let gst = Gst::new(1177, 175767);
    /// let gst2 = gst.add_subframes(3);
    /// assert_eq!(gst2.wn(), 1177);
    /// assert_eq!(gst2.tow(), 175857);
    ///
    /// assert_eq!(gst2.add_subframes(-3), gst);
    /// ```
    pub fn add_subframes(&self, subframes: i64) -> Self {
        self.add_seconds(subframes * i64::from(SECONDS_PER_SUBFRAME))
    }

    /// Returns the GST at the start of the subframe that contains `self`.
    ///
    /// The GST returned has the same week number as `self` and its time
    /// of week is the largest multiple of 30 seconds that is smaller or
    /// equal than the time of week of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osnma_core::Gst;
    ///
    /// let gst = Gst::new(1177, 175767);
    /// let subframe = gst.gst_subframe();
    /// assert_eq!(subframe.wn(), 1177);
    /// assert_eq!(subframe.tow(), 175740);
    /// ```
    pub fn gst_subframe(&self) -> Self {
        Gst {
            wn: self.wn,
            tow: self.tow / SECONDS_PER_SUBFRAME * SECONDS_PER_SUBFRAME,
        }
    }

    /// Returns `true` if `self` corresponds to the start of a subframe.
    ///
    /// A GST corresponds to the start of a subframe if its time of week is a
    /// multiple of 30 seconds.
    ///
    /// # Examples
    /// ```
    /// use osnma_core::Gst;
    ///
    /// let gst = Gst::new(1177, 175767);
    /// let subframe = gst.gst_subframe();
    /// assert_eq!(gst.is_subframe(), false);
    /// assert_eq!(subframe.is_subframe(), true);
    /// ```
    pub fn is_subframe(&self) -> bool {
        self.tow % SECONDS_PER_SUBFRAME == 0
    }

    /// Packs the GST into its 32-bit representation: the week number in the
    /// upper 12 bits, the time of week in the lower 20 bits, big-endian.
    ///
    /// This is the representation used when a GST is embedded in a MAC
    /// message (see the OSNMA SIS ICD, section 6.7).
    pub fn bit_packed(&self) -> u32 {
        (u32::from(self.wn) << 20) | self.tow
    }

    /// Reconstructs a GST from its 32-bit bit-packed representation.
    pub fn from_bit_packed(packed: u32) -> Self {
        let wn = (packed >> 20) as Wn;
        let tow = packed & 0xF_FFFF;
        Gst::new(wn, tow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_seconds_roundtrip() {
        for (wn, tow) in [(1177u16, 175767u32), (0, 0), (4095, 604799), (500, 30)] {
            let gst = Gst::new(wn, tow);
            for delta in [1i64, 30, 3600, 604800, 604800 * 3 + 17] {
                assert_eq!(gst.add_seconds(delta).add_seconds(-delta), gst);
            }
        }
    }

    #[test]
    fn bit_packed_roundtrip() {
        for (wn, tow) in [(1177u16, 175767u32), (0, 0), (4095, 604799)] {
            let gst = Gst::new(wn, tow);
            assert_eq!(Gst::from_bit_packed(gst.bit_packed()), gst);
        }
    }

    #[test]
    fn week_carry() {
        let gst = Gst::new(10, 604799);
        let next = gst.add_seconds(1);
        assert_eq!(next.wn(), 11);
        assert_eq!(next.tow(), 0);
        assert_eq!(next.add_seconds(-1), gst);
    }

    #[test]
    fn ordering_by_wn_then_tow() {
        let a = Gst::new(10, 100);
        let b = Gst::new(10, 200);
        let c = Gst::new(11, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
