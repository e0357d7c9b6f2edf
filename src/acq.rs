//! Converted acquisition data and the metadata that has to be carried over from the raw
//! stream after conversion.

use log::debug;
use ndarray::Array2;
use num_complex::Complex32;

use crate::error::{PrepError, Result};
use crate::raw::ScannerParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// echo time of this contrast
    pub te: f32,
    pub n_profiles: usize,
    pub n_samples: usize,
}

/// Acquisition data as produced by the converter, one k-space matrix per contrast and slice.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionData {
    /// `kdata[contrast][slice]`, samples x coils
    pub kdata: Vec<Vec<Array2<Complex32>>>,
    /// one per contrast
    pub trajectory: Vec<Trajectory>,
    /// sampled k-space positions, one set per slice
    pub subsample_indices: Vec<Vec<usize>>,
    pub encoding_size: [usize; 2],
}

impl AcquisitionData {
    pub fn n_contrasts(&self) -> usize {
        self.trajectory.len()
    }

    pub fn n_slices(&self) -> usize {
        self.subsample_indices.len()
    }
}

/// Writes the scanner echo time of each contrast into its trajectory.
pub fn copy_te(acq: &mut AcquisitionData, params: &ScannerParams) -> Result<()> {
    let n = acq.n_contrasts();
    if params.te.len() < n {
        return Err(PrepError::IndexOutOfRange {
            step: "copy_te",
            what: "contrast",
            index: n - 1,
            len: params.te.len(),
        });
    }
    acq.trajectory.iter_mut().zip(&params.te).for_each(|(traj, &te)| traj.te = te);
    Ok(())
}

/// Fills every slice with the full sample index set `0..N` when the converter left the first
/// slice empty (data not starting at the first repetition). `N` is the sample count of the
/// first contrast/slice matrix. A partially populated structure is left alone. Returns true
/// if indices were written.
pub fn adjust_subsample_indices(acq: &mut AcquisitionData) -> Result<bool> {
    match acq.subsample_indices.first() {
        Some(first) if first.is_empty() => {}
        _ => return Ok(false),
    }

    let n = acq
        .kdata
        .first()
        .and_then(|c| c.first())
        .map(|k| k.nrows())
        .ok_or(PrepError::IndexOutOfRange {
            step: "adjust_subsample_indices",
            what: "kdata",
            index: 0,
            len: 0,
        })?;

    acq.subsample_indices.iter_mut().for_each(|idx| *idx = (0..n).collect());
    debug!("filled subsample indices 0..{n} for {} slices", acq.n_slices());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acq(n_contrasts: usize, n_slices: usize, n_samples: usize) -> AcquisitionData {
        AcquisitionData {
            kdata: vec![vec![Array2::zeros((n_samples, 2)); n_slices]; n_contrasts],
            trajectory: vec![Trajectory::default(); n_contrasts],
            subsample_indices: vec![vec![]; n_slices],
            encoding_size: [8, 8],
        }
    }

    fn params(te: &[f32]) -> ScannerParams {
        ScannerParams {
            te: te.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn te_copied_per_contrast() {
        let mut a = acq(2, 1, 4);
        copy_te(&mut a, &params(&[1.5e-3, 3.0e-3, 4.5e-3])).unwrap();
        assert_eq!(a.trajectory[0].te, 1.5e-3);
        assert_eq!(a.trajectory[1].te, 3.0e-3);
    }

    #[test]
    fn short_te_list() {
        let mut a = acq(3, 1, 4);
        assert!(matches!(
            copy_te(&mut a, &params(&[1e-3, 2e-3])),
            Err(PrepError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn empty_indices_filled_once() {
        let mut a = acq(2, 3, 6);
        assert!(adjust_subsample_indices(&mut a).unwrap());
        for idx in &a.subsample_indices {
            assert_eq!(idx, &(0..6).collect::<Vec<usize>>());
        }
        let once = a.subsample_indices.clone();
        assert!(!adjust_subsample_indices(&mut a).unwrap());
        assert_eq!(a.subsample_indices, once);
    }

    #[test]
    fn partial_structure_not_repaired() {
        let mut a = acq(1, 3, 6);
        a.subsample_indices[0] = vec![0, 2, 4];
        assert!(!adjust_subsample_indices(&mut a).unwrap());
        assert!(a.subsample_indices[1].is_empty());
    }

    #[test]
    fn empty_first_slice_without_kdata() {
        let mut a = acq(0, 2, 4);
        assert!(adjust_subsample_indices(&mut a).is_err());
    }
}
