use log::debug;
use ndarray::Axis;

use crate::error::Result;
use crate::flags::{AcqFlag, FlagTable};
use crate::raw::RawAcquisitionData;

/// Reverses the readout axis of every profile flagged as acquired on the returning gradient
/// lobe, then clears the flag so the reversal cannot be applied twice. Returns the number of
/// profiles reversed. `table` must describe the current stream and is kept in step with it.
pub(crate) fn correct_bipolar(raw: &mut RawAcquisitionData, table: &mut FlagTable) -> Result<usize> {
    table.ensure_rows("correct_bipolar", raw.n_profiles())?;

    let reversed = table.rows_with(AcqFlag::IsReverse);
    for &i in &reversed {
        let profile = &mut raw.profiles[i];

        for mut lane in profile.data.lanes_mut(Axis(0)) {
            let n = lane.len();
            for k in 0..n / 2 {
                lane.swap(k, n - 1 - k);
            }
        }

        // set according to the table, so this clears exactly one bit
        profile.flags -= AcqFlag::IsReverse.mask();
        table.clear(i, AcqFlag::IsReverse);
    }

    debug!("reversed {} of {} profiles", reversed.len(), raw.n_profiles());
    Ok(reversed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use crate::raw::{RawProfile, ScannerParams};
    use ndarray::{array, Array2};
    use num_complex::Complex32;

    fn c(re: f32) -> Complex32 {
        Complex32::new(re, 0.)
    }

    fn reverse(raw: &mut RawAcquisitionData) -> Result<usize> {
        let mut table = FlagTable::decode(&raw.profiles)?;
        correct_bipolar(raw, &mut table)
    }

    fn stream() -> RawAcquisitionData {
        let mut profiles = vec![RawProfile::test_profile(0., 0, 0), RawProfile::test_profile(0., 1, 0)];
        profiles[0].flags = AcqFlag::IsReverse.mask() | AcqFlag::LastInSlice.mask();
        profiles[1].flags = AcqFlag::LastInSlice.mask();
        RawAcquisitionData::new(ScannerParams::default(), profiles)
    }

    #[test]
    fn reverse_flagged_readouts() {
        let mut raw = stream();
        let n = reverse(&mut raw).unwrap();
        assert_eq!(n, 1);

        let expected: Array2<Complex32> = array![[4., 14.], [3., 13.], [2., 12.], [1., 11.]].mapv(c);
        assert_eq!(raw.profiles[0].data, expected);
        assert!(!raw.profiles[0].has_flag(AcqFlag::IsReverse));
        assert!(raw.profiles[0].has_flag(AcqFlag::LastInSlice));

        // untouched
        assert_eq!(raw.profiles[1].data, RawProfile::test_profile(0., 1, 0).data);
        assert_eq!(raw.profiles[1].flags, AcqFlag::LastInSlice.mask());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut raw = stream();
        reverse(&mut raw).unwrap();
        let once: Vec<_> = raw.profiles.iter().map(|p| (p.data.clone(), p.flags)).collect();
        assert_eq!(reverse(&mut raw).unwrap(), 0);
        let twice: Vec<_> = raw.profiles.iter().map(|p| (p.data.clone(), p.flags)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn table_cleared_with_profile() {
        let mut raw = stream();
        let mut table = FlagTable::decode(&raw.profiles).unwrap();
        correct_bipolar(&mut raw, &mut table).unwrap();
        assert!(!table.is_set(0, AcqFlag::IsReverse));
        assert!(table.is_set(0, AcqFlag::LastInSlice));
    }

    #[test]
    fn stale_table_is_rejected() {
        let mut raw = stream();
        let mut table = FlagTable::decode(&raw.profiles).unwrap();
        raw.profiles.remove(1);
        assert!(matches!(
            correct_bipolar(&mut raw, &mut table),
            Err(PrepError::ShapeMismatch { step: "correct_bipolar", expected: 1, found: 2 })
        ));
        // nothing reversed
        assert!(raw.profiles[0].has_flag(AcqFlag::IsReverse));
    }

    #[test]
    fn odd_length_readout() {
        let mut raw = stream();
        raw.profiles[0].data = array![[1.], [2.], [3.], [4.], [5.]].mapv(c);
        reverse(&mut raw).unwrap();
        assert_eq!(raw.profiles[0].data, array![[5.], [4.], [3.], [2.], [1.]].mapv(c));
    }
}
