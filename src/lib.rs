//! Preprocessing of raw MR k-space profiles ahead of reconstruction: slice ordering,
//! noise and reference profile removal, bipolar readout correction, navigator extraction
//! and echo-time/subsampling metadata for the converted acquisition.
//!
//! The steps only make sense in one order, which [pipeline::Preprocessor] enforces.

pub mod acq;
mod bipolar;
pub mod config;
pub mod error;
mod extract;
pub mod flags;
pub mod navigator;
pub mod pipeline;
pub mod raw;
pub mod recon;
mod slice_order;

pub use acq::{adjust_subsample_indices, copy_te, AcquisitionData, Trajectory};
pub use config::{PrepConfig, SliceAxis};
pub use error::{PrepError, Result};
pub use extract::noise_covariance;
pub use flags::{AcqFlag, AcqFlags};
pub use navigator::NavigatorData;
pub use pipeline::{Prepared, Preprocessor};
pub use raw::{Limit, ProfileIndex, RawAcquisitionData, RawProfile, ScannerParams};
pub use recon::{AcquisitionConverter, ReconParams, Reconstructor};
