//! Seams to the downstream collaborators: conversion of the processed raw stream into
//! [AcquisitionData] and the iterative solver. Neither is implemented here.

use ndarray::{Array2, Array4, ArrayD, IxDyn};
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::acq::AcquisitionData;
use crate::error::{PrepError, Result};
use crate::raw::RawAcquisitionData;

/// Fixed solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconParams {
    pub solver: String,
    /// quadratic regularization weight
    pub lambda: f32,
    pub iterations: usize,
}

impl Default for ReconParams {
    fn default() -> Self {
        ReconParams {
            solver: "cgnr".to_string(),
            lambda: 1e-2,
            iterations: 20,
        }
    }
}

pub trait AcquisitionConverter {
    fn convert(&self, raw: &RawAcquisitionData, encoding_size: [usize; 2]) -> Result<AcquisitionData>;
}

pub trait Reconstructor {
    fn reconstruct(
        &self,
        acq: &AcquisitionData,
        params: &ReconParams,
        sensitivity: Option<&Array4<Complex32>>,
        noise_covariance: Option<&Array2<Complex32>>,
    ) -> Result<ArrayD<Complex32>>;
}

/// drop singleton axes
pub fn squeeze(x: ArrayD<Complex32>) -> Result<ArrayD<Complex32>> {
    let dims: Vec<usize> = x.shape().iter().copied().filter(|&d| d != 1).collect();
    // removing length-1 axes keeps the logical element order
    let data: Vec<Complex32> = x.iter().copied().collect();
    let n = data.len();
    ArrayD::from_shape_vec(IxDyn(&dims), data).map_err(|_| PrepError::ShapeMismatch {
        step: "squeeze",
        expected: dims.iter().product(),
        found: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_axes_removed() {
        let x = ArrayD::from_shape_fn(IxDyn(&[3, 1, 2, 1]), |i| Complex32::new((i[0] * 2 + i[2]) as f32, 0.));
        let y = squeeze(x.clone()).unwrap();
        assert_eq!(y.shape(), &[3, 2]);
        assert_eq!(y[[2, 1]], Complex32::new(5., 0.));
        assert_eq!(x.iter().collect::<Vec<_>>(), y.iter().collect::<Vec<_>>());
    }

    #[test]
    fn all_singleton() {
        let x = ArrayD::from_elem(IxDyn(&[1, 1]), Complex32::new(2., 1.));
        let y = squeeze(x).unwrap();
        assert_eq!(y.ndim(), 0);
        assert_eq!(y.len(), 1);
    }
}
