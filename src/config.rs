use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::recon::ReconParams;

/// Component of the profile position that distinguishes slices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    X,
    Y,
    #[default]
    Z,
}

impl SliceAxis {
    pub fn component(self) -> usize {
        match self {
            SliceAxis::X => 0,
            SliceAxis::Y => 1,
            SliceAxis::Z => 2,
        }
    }
}

/// Pipeline settings. Slice and echo counts fall back to the scanner parameters when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub slice_axis: SliceAxis,
    /// slices in the phase-stabilization reference block
    pub n_slices: Option<usize>,
    /// echoes in the reference block, navigator pseudo echo included
    pub n_echoes: Option<usize>,
    pub recon: ReconParams,
}

impl PrepConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let c = PrepConfig::from_json("{}").unwrap();
        assert_eq!(c, PrepConfig::default());
        assert_eq!(c.slice_axis, SliceAxis::Z);
    }

    #[test]
    fn partial_override() {
        let c = PrepConfig::from_json(r#"{"slice_axis":"x","n_echoes":4,"recon":{"iterations":5}}"#).unwrap();
        assert_eq!(c.slice_axis.component(), 0);
        assert_eq!(c.n_echoes, Some(4));
        assert_eq!(c.n_slices, None);
        assert_eq!(c.recon.iterations, 5);
        assert_eq!(c.recon.solver, ReconParams::default().solver);
    }

    #[test]
    fn bad_document_is_config_error() {
        assert!(matches!(
            PrepConfig::from_json(r#"{"slice_axis":"w"}"#),
            Err(crate::error::PrepError::Config(_))
        ));
    }
}
