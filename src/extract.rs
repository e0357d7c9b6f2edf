//! Removal of non-image profiles from the raw stream: the noise calibration readout and
//! the phase-stabilization reference block.

use std::collections::BTreeSet;

use log::{debug, warn};
use ndarray::Array2;
use num_complex::Complex32;

use crate::error::{PrepError, Result};
use crate::flags::{AcqFlag, FlagTable};
use crate::raw::RawAcquisitionData;

/// Takes the first noise-flagged profile out of the stream and returns its samples x coils
/// matrix. The scanner acquires exactly one such profile (slice 0, contrast 0, repetition 0).
/// `table` must describe the current stream and has the removed row dropped as well.
pub(crate) fn extract_noise(raw: &mut RawAcquisitionData, table: &mut FlagTable) -> Result<Array2<Complex32>> {
    table.ensure_rows("extract_noise", raw.n_profiles())?;

    let idx = table
        .first_with(AcqFlag::IsNoiseMeasurement)
        .ok_or(PrepError::MissingNoiseProfile)?;

    let noise = raw.profiles.remove(idx);
    table.remove_row(idx);
    debug!(
        "noise profile at position {idx}: {} samples x {} coils",
        noise.n_samples(),
        noise.n_coils()
    );
    Ok(noise.data)
}

/// Drops the leading `n_slices * n_echoes` profiles. Reference data is assumed to be one
/// contiguous sweep over all slices and echoes at the head of the stream. This is
/// positional and does not survive recalls or reordered acquisitions.
pub(crate) fn remove_reference_block(
    raw: &mut RawAcquisitionData,
    n_slices: usize,
    n_echoes: usize,
) -> Result<usize> {
    let prefix = n_slices.checked_mul(n_echoes).ok_or(PrepError::IndexOutOfRange {
        step: "remove_reference_block",
        what: "reference slice count",
        index: n_slices,
        len: usize::MAX / n_echoes.max(1),
    })?;
    if prefix > raw.n_profiles() {
        return Err(PrepError::IndexOutOfRange {
            step: "remove_reference_block",
            what: "reference prefix",
            index: prefix,
            len: raw.n_profiles(),
        });
    }

    let prefix_slices: BTreeSet<usize> = raw.profiles[..prefix].iter().map(|p| p.index.slice).collect();
    if prefix_slices.len() != n_slices {
        warn!(
            "reference block of {prefix} profiles spans {} slices, expected {n_slices}",
            prefix_slices.len()
        );
    }

    raw.profiles.drain(..prefix);
    debug!("removed {prefix} reference profiles, {} remain", raw.n_profiles());
    Ok(prefix)
}

/// Coil noise covariance `X^H X / (N - 1)` of a samples x coils noise matrix.
pub fn noise_covariance(noise: &Array2<Complex32>) -> Result<Array2<Complex32>> {
    let n = noise.nrows();
    if n < 2 {
        return Err(PrepError::ShapeMismatch {
            step: "noise_covariance",
            expected: 2,
            found: n,
        });
    }
    let xh = noise.t().mapv(|x| x.conj());
    let mut cov = xh.dot(noise);
    let scale = 1. / (n - 1) as f32;
    cov.mapv_inplace(|x| x * scale);
    Ok(cov)
}
