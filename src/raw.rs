use ndarray::Array2;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::flags::{AcqFlag, AcqFlags};

/// Encoding counters of a profile. `slice` is overwritten by slice ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileIndex {
    pub kspace_encode_step_1: usize,
    pub slice: usize,
    pub contrast: usize,
    pub repetition: usize,
}

/// One readout event
#[derive(Debug, Clone)]
pub struct RawProfile {
    /// patient-frame position of the excited slab
    pub position: [f32; 3],
    /// packed acquisition flags as delivered by the scanner
    pub flags: u64,
    pub index: ProfileIndex,
    /// samples x coils
    pub data: Array2<Complex32>,
    pub acquisition_time_stamp: u32,
}

impl RawProfile {
    pub fn new(
        position: [f32; 3],
        flags: u64,
        index: ProfileIndex,
        data: Array2<Complex32>,
        acquisition_time_stamp: u32,
    ) -> Self {
        RawProfile {
            position,
            flags,
            index,
            data,
            acquisition_time_stamp,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_coils(&self) -> usize {
        self.data.ncols()
    }

    /// `None` if the flag field is wider than 31 bits
    pub fn acq_flags(&self) -> Option<AcqFlags> {
        AcqFlags::from_raw(self.flags)
    }

    /// false for a field wider than 31 bits
    pub fn has_flag(&self, flag: AcqFlag) -> bool {
        self.acq_flags().is_some_and(|f| f.contains(flag))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub minimum: usize,
    pub maximum: usize,
    pub center: usize,
}

/// Scanner parameters carried alongside the profile stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerParams {
    pub enc_lim_slice: Limit,
    /// echo times, one per image contrast
    pub te: Vec<f32>,
    pub recon_size: [usize; 2],
}

impl ScannerParams {
    pub fn n_slices(&self) -> usize {
        self.enc_lim_slice.maximum + 1
    }

    /// image echoes plus the navigator-only pseudo echo
    pub fn n_echoes(&self) -> usize {
        self.te.len() + 1
    }
}

/// Raw profile stream in acquisition order plus the scanner parameters.
#[derive(Debug, Clone)]
pub struct RawAcquisitionData {
    pub params: ScannerParams,
    pub profiles: Vec<RawProfile>,
}

impl RawAcquisitionData {
    pub fn new(params: ScannerParams, profiles: Vec<RawProfile>) -> Self {
        RawAcquisitionData { params, profiles }
    }

    pub fn n_profiles(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
impl RawProfile {
    /// 4 samples x 2 coils, sample `i` of coil `c` holds `i + 1 + 10c`
    pub(crate) fn test_profile(z: f32, line: usize, contrast: usize) -> Self {
        let data = Array2::from_shape_fn((4, 2), |(i, c)| Complex32::new((i + 1 + 10 * c) as f32, 0.));
        RawProfile::new(
            [0., 0., z],
            0,
            ProfileIndex {
                kspace_encode_step_1: line,
                contrast,
                ..Default::default()
            },
            data,
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_from_params() {
        let params = ScannerParams {
            enc_lim_slice: Limit { minimum: 0, maximum: 2, center: 1 },
            te: vec![2.5e-3, 5.0e-3],
            recon_size: [64, 64],
        };
        assert_eq!(params.n_slices(), 3);
        assert_eq!(params.n_echoes(), 3);
    }

    #[test]
    fn flag_lookup_on_profile() {
        let mut p = RawProfile::test_profile(0., 0, 0);
        p.flags = AcqFlag::IsReverse.mask() | AcqFlag::LastInSlice.mask();
        assert!(p.has_flag(AcqFlag::IsReverse));
        assert!(!p.has_flag(AcqFlag::IsNoiseMeasurement));
        assert_eq!(p.acq_flags().map(|f| f.raw()), Some(p.flags));

        p.flags |= 1 << 35;
        assert!(p.acq_flags().is_none());
        assert!(!p.has_flag(AcqFlag::IsReverse));
    }

    #[test]
    fn params_from_json() {
        let params: ScannerParams = serde_json::from_str(
            r#"{"enc_lim_slice":{"minimum":0,"maximum":4,"center":2},"te":[0.002],"recon_size":[128,96]}"#,
        )
        .unwrap();
        assert_eq!(params.n_slices(), 5);
        assert_eq!(params.recon_size, [128, 96]);
    }
}
