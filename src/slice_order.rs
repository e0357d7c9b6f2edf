use log::debug;

use crate::config::SliceAxis;
use crate::raw::{RawAcquisitionData, RawProfile};

/// Relabels `index.slice` of every profile with the ascending rank of its slice-axis
/// position among the distinct positions in the stream. Repeated excitations of the same
/// position share a label. Returns the number of distinct slices.
pub(crate) fn order_slices(raw: &mut RawAcquisitionData, axis: SliceAxis) -> usize {
    let c = axis.component();
    // adding +0.0 folds -0.0 onto 0.0, total_cmp would otherwise keep them apart
    let key = |p: &RawProfile| p.position[c] + 0.0;

    let mut positions: Vec<f32> = raw.profiles.iter().map(key).collect();
    positions.sort_by(|a, b| a.total_cmp(b));
    positions.dedup_by(|a, b| a.total_cmp(b).is_eq());

    raw.profiles.iter_mut().for_each(|profile| {
        // every coordinate was collected above, so the search cannot miss
        let z = key(profile);
        let rank = positions
            .binary_search_by(|x| x.total_cmp(&z))
            .unwrap_or_else(|i| i);
        profile.index.slice = rank;
    });

    debug!("{} distinct slice positions over {} profiles", positions.len(), raw.n_profiles());
    positions.len()
}
