//! Separation of interleaved image/navigator readouts.
//!
//! Within contrast 0 the scanner alternates a first-echo image readout with a navigator
//! readout at the same slice and line. Pairing is by acquisition order only, there is no
//! tag on the navigator profile itself.

use std::collections::BTreeSet;

use log::debug;
use ndarray::{s, Array2, Array4};
use num_complex::Complex32;

use crate::error::{PrepError, Result};
use crate::raw::{RawAcquisitionData, RawProfile};

/// Navigator readouts arranged as samples x coils x lines x slices
#[derive(Debug, Clone)]
pub struct NavigatorData {
    pub nav: Array4<Complex32>,
    /// lines x slices
    pub nav_time: Array2<u32>,
    /// k-space line of each entry along the line axis, ascending
    pub lines: Vec<usize>,
}

impl NavigatorData {
    pub fn n_lines(&self) -> usize {
        self.lines.len()
    }
}

/// Collects the navigator half of every contrast-0 pair into a dense volume. Only lines that
/// received a navigator are kept. A trailing unpaired readout is ignored.
pub(crate) fn extract_navigator(raw: &RawAcquisitionData) -> Result<NavigatorData> {
    let contrast0: Vec<&RawProfile> = raw.profiles.iter().filter(|p| p.index.contrast == 0).collect();

    // second of every pair
    let navigators: Vec<&RawProfile> = contrast0.chunks_exact(2).map(|pair| pair[1]).collect();

    let n_slices = raw.params.n_slices();
    let (n_samples, n_coils) = navigators.first().map(|p| p.data.dim()).unwrap_or((0, 0));

    // only lines that receive a navigator get an entry along the line axis
    let lines: Vec<usize> = navigators
        .iter()
        .map(|p| p.index.kspace_encode_step_1)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut nav = Array4::<Complex32>::zeros((n_samples, n_coils, lines.len(), n_slices));
    let mut nav_time = Array2::<u32>::zeros((lines.len(), n_slices));

    for p in &navigators {
        // every navigator line was collected above, so the search cannot miss
        let line = lines
            .binary_search(&p.index.kspace_encode_step_1)
            .unwrap_or_else(|i| i);
        let slice = p.index.slice;
        if slice >= n_slices {
            return Err(PrepError::IndexOutOfRange {
                step: "extract_navigator",
                what: "slice",
                index: slice,
                len: n_slices,
            });
        }
        if p.data.dim() != (n_samples, n_coils) {
            return Err(PrepError::ShapeMismatch {
                step: "extract_navigator",
                expected: n_samples * n_coils,
                found: p.data.len(),
            });
        }
        nav.slice_mut(s![.., .., line, slice]).assign(&p.data);
        nav_time[[line, slice]] = p.acquisition_time_stamp;
    }

    debug!(
        "{} navigator readouts from {} contrast-0 profiles over {} lines",
        navigators.len(),
        contrast0.len(),
        lines.len()
    );

    Ok(NavigatorData { nav, nav_time, lines })
}
