//! Acquisition flag codec.
//!
//! The scanner packs per-profile booleans into the low 31 bits of an integer. Flags are
//! numbered from 1 the way the scanner documents them, so flag `n` lives at bit `n - 1`.

use ndarray::{Array2, Axis};

use crate::error::{PrepError, Result};
use crate::raw::RawProfile;

/// width of the flag field
pub const N_FLAG_BITS: usize = 31;

/// Named acquisition flags. Discriminants are the scanner's 1-based flag numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AcqFlag {
    FirstInEncodeStep1 = 1,
    LastInEncodeStep1 = 2,
    FirstInEncodeStep2 = 3,
    LastInEncodeStep2 = 4,
    FirstInAverage = 5,
    LastInAverage = 6,
    FirstInSlice = 7,
    LastInSlice = 8,
    FirstInContrast = 9,
    LastInContrast = 10,
    FirstInPhase = 11,
    LastInPhase = 12,
    FirstInRepetition = 13,
    LastInRepetition = 14,
    FirstInSet = 15,
    LastInSet = 16,
    FirstInSegment = 17,
    LastInSegment = 18,
    IsNoiseMeasurement = 19,
    IsParallelCalibration = 20,
    IsParallelCalibrationAndImaging = 21,
    /// readout acquired on the returning lobe of a bipolar gradient
    IsReverse = 22,
    IsNavigationData = 23,
    IsPhaseCorrData = 24,
    LastInMeasurement = 25,
    IsHpFeedbackData = 26,
    IsDummyScanData = 27,
    IsRtFeedbackData = 28,
    IsSurfaceCoilCorrectionScanData = 29,
    IsPhaseStabilizationReference = 30,
    IsPhaseStabilization = 31,
}

impl AcqFlag {
    /// scanner flag number (1-based)
    pub fn number(self) -> u8 {
        self as u8
    }

    /// zero-based bit position within the packed field
    pub fn bit(self) -> usize {
        self as usize - 1
    }

    pub fn mask(self) -> u64 {
        1u64 << self.bit()
    }
}

/// Packed flag field of a single profile, guaranteed to fit in 31 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcqFlags(u64);

impl AcqFlags {
    /// Returns `None` when bits beyond the 31-bit field are set.
    pub fn from_raw(value: u64) -> Option<Self> {
        if value >> N_FLAG_BITS != 0 {
            None
        } else {
            Some(AcqFlags(value))
        }
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn contains(&self, flag: AcqFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    pub fn set(&mut self, flag: AcqFlag) {
        self.0 |= flag.mask();
    }

    /// Clears `flag`. Returns false and leaves the field untouched if it was not set.
    pub fn clear(&mut self, flag: AcqFlag) -> bool {
        if self.contains(flag) {
            self.0 -= flag.mask();
            true
        } else {
            false
        }
    }

    pub fn decode(&self) -> [bool; N_FLAG_BITS] {
        decode(self.0)
    }
}

impl FromIterator<AcqFlag> for AcqFlags {
    fn from_iter<T: IntoIterator<Item = AcqFlag>>(iter: T) -> Self {
        let mut flags = AcqFlags::default();
        iter.into_iter().for_each(|f| flags.set(f));
        flags
    }
}

/// little-endian bit decode, entry `b` is bit `b` of `value`
pub fn decode(value: u64) -> [bool; N_FLAG_BITS] {
    let mut bits = [false; N_FLAG_BITS];
    bits.iter_mut().enumerate().for_each(|(b, bit)| *bit = (value >> b) & 1 == 1);
    bits
}

/// Decoded flags for a whole profile list, one row per profile.
#[derive(Debug, Clone)]
pub struct FlagTable {
    bits: Array2<bool>,
}

impl FlagTable {
    pub fn decode(profiles: &[RawProfile]) -> Result<Self> {
        let mut bits = Array2::from_elem((profiles.len(), N_FLAG_BITS), false);
        for (i, (profile, mut row)) in profiles.iter().zip(bits.axis_iter_mut(Axis(0))).enumerate() {
            let flags = AcqFlags::from_raw(profile.flags).ok_or(PrepError::MalformedFlags {
                profile: i,
                value: profile.flags,
            })?;
            row.iter_mut().zip(flags.decode()).for_each(|(dst, src)| *dst = src);
        }
        Ok(FlagTable { bits })
    }

    pub fn n_rows(&self) -> usize {
        self.bits.nrows()
    }

    /// the table must describe exactly `n_profiles` profiles before a step may act on it
    pub fn ensure_rows(&self, step: &'static str, n_profiles: usize) -> Result<()> {
        if self.n_rows() != n_profiles {
            return Err(PrepError::ShapeMismatch {
                step,
                expected: n_profiles,
                found: self.n_rows(),
            });
        }
        Ok(())
    }

    pub fn is_set(&self, profile: usize, flag: AcqFlag) -> bool {
        self.bits[[profile, flag.bit()]]
    }

    pub fn clear(&mut self, profile: usize, flag: AcqFlag) {
        self.bits[[profile, flag.bit()]] = false;
    }

    /// drops the row of a profile that was taken out of the stream
    pub fn remove_row(&mut self, profile: usize) {
        let kept: Vec<usize> = (0..self.n_rows()).filter(|&i| i != profile).collect();
        self.bits = self.bits.select(Axis(0), &kept);
    }

    pub fn first_with(&self, flag: AcqFlag) -> Option<usize> {
        self.bits.column(flag.bit()).iter().position(|&b| b)
    }

    pub fn rows_with(&self, flag: AcqFlag) -> Vec<usize> {
        self.bits
            .column(flag.bit())
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }
}
