//! Ordered preprocessing of a raw profile stream.
//!
//! Each step mutates the stream in place and relies on the ones before it (slice labels
//! before navigator extraction, noise removal before the positional reference cut), so the
//! stage is part of the type. A [Preprocessor] can only advance, one stage at a time.
//!
//! ```text
//! Loaded -> SlicesOrdered -> NoiseExtracted -> BipolarCorrected -> ReferenceRemoved -> Prepared
//! ```

use log::{info, warn};
use ndarray::{Array2, Array4, ArrayD};
use num_complex::Complex32;

use crate::acq::{adjust_subsample_indices, copy_te, AcquisitionData};
use crate::bipolar::correct_bipolar;
use crate::config::PrepConfig;
use crate::error::Result;
use crate::extract::{extract_noise, noise_covariance, remove_reference_block};
use crate::flags::FlagTable;
use crate::navigator::{extract_navigator, NavigatorData};
use crate::raw::RawAcquisitionData;
use crate::recon::{squeeze, AcquisitionConverter, Reconstructor};
use crate::slice_order::order_slices;

pub struct Loaded;

pub struct SlicesOrdered;

pub struct NoiseExtracted {
    noise: Array2<Complex32>,
    flags: FlagTable,
}

pub struct BipolarCorrected {
    noise: Array2<Complex32>,
}

pub struct ReferenceRemoved {
    noise: Array2<Complex32>,
}

/// Sole owner of the raw stream while it is being processed
pub struct Preprocessor<S> {
    raw: RawAcquisitionData,
    config: PrepConfig,
    stage: S,
}

impl<S> Preprocessor<S> {
    pub fn raw(&self) -> &RawAcquisitionData {
        &self.raw
    }

    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    fn advance<T>(self, stage: T) -> Preprocessor<T> {
        Preprocessor {
            raw: self.raw,
            config: self.config,
            stage,
        }
    }
}

impl Preprocessor<Loaded> {
    pub fn new(raw: RawAcquisitionData, config: PrepConfig) -> Self {
        Preprocessor {
            raw,
            config,
            stage: Loaded,
        }
    }

    /// Runs every stage in order.
    pub fn run(raw: RawAcquisitionData, config: PrepConfig) -> Result<Prepared> {
        Self::new(raw, config)
            .order_slices()
            .extract_noise()?
            .correct_bipolar()?
            .remove_reference()?
            .extract_navigator()
    }

    pub fn order_slices(mut self) -> Preprocessor<SlicesOrdered> {
        let n = order_slices(&mut self.raw, self.config.slice_axis);
        info!("slices ordered: {n} positions, {} profiles", self.raw.n_profiles());
        self.advance(SlicesOrdered)
    }
}

impl Preprocessor<SlicesOrdered> {
    /// Decodes the flag table that the noise and bipolar steps share. Both keep it in step
    /// with the stream as they edit it.
    pub fn extract_noise(mut self) -> Result<Preprocessor<NoiseExtracted>> {
        let mut flags = FlagTable::decode(&self.raw.profiles)?;
        let noise = extract_noise(&mut self.raw, &mut flags)?;
        info!("noise profile extracted, {} profiles", self.raw.n_profiles());
        Ok(self.advance(NoiseExtracted { noise, flags }))
    }
}

impl Preprocessor<NoiseExtracted> {
    pub fn noise(&self) -> &Array2<Complex32> {
        &self.stage.noise
    }

    pub fn correct_bipolar(mut self) -> Result<Preprocessor<BipolarCorrected>> {
        let n = correct_bipolar(&mut self.raw, &mut self.stage.flags)?;
        info!("bipolar readouts corrected: {n} reversed");
        let NoiseExtracted { noise, .. } = self.stage;
        Ok(Preprocessor {
            raw: self.raw,
            config: self.config,
            stage: BipolarCorrected { noise },
        })
    }
}

impl Preprocessor<BipolarCorrected> {
    pub fn noise(&self) -> &Array2<Complex32> {
        &self.stage.noise
    }

    /// Slice and echo counts come from the config when set, otherwise from the scanner
    /// parameters (navigator pseudo echo included).
    pub fn remove_reference(mut self) -> Result<Preprocessor<ReferenceRemoved>> {
        let n_slices = self.config.n_slices.unwrap_or_else(|| self.raw.params.n_slices());
        let n_echoes = self.config.n_echoes.unwrap_or_else(|| self.raw.params.n_echoes());
        let removed = remove_reference_block(&mut self.raw, n_slices, n_echoes)?;
        info!(
            "reference block removed: {removed} profiles ({n_slices} slices x {n_echoes} echoes), {} remain",
            self.raw.n_profiles()
        );
        let BipolarCorrected { noise } = self.stage;
        Ok(Preprocessor {
            raw: self.raw,
            config: self.config,
            stage: ReferenceRemoved { noise },
        })
    }
}

impl Preprocessor<ReferenceRemoved> {
    pub fn noise(&self) -> &Array2<Complex32> {
        &self.stage.noise
    }

    pub fn extract_navigator(self) -> Result<Prepared> {
        let navigator = extract_navigator(&self.raw)?;
        info!("navigator extracted: {} lines", navigator.n_lines());

        let noise = self.stage.noise;
        let noise_cov = match noise_covariance(&noise) {
            Ok(cov) => Some(cov),
            Err(e) => {
                warn!("no noise covariance: {e}");
                None
            }
        };

        Ok(Prepared {
            raw: self.raw,
            config: self.config,
            noise,
            noise_covariance: noise_cov,
            navigator,
        })
    }
}

/// Fully processed stream, ready for conversion and reconstruction
#[derive(Debug, Clone)]
pub struct Prepared {
    pub raw: RawAcquisitionData,
    pub config: PrepConfig,
    pub noise: Array2<Complex32>,
    /// `None` when the noise readout is too short to estimate it
    pub noise_covariance: Option<Array2<Complex32>>,
    pub navigator: NavigatorData,
}

impl Prepared {
    /// Converts the stream at the scanner's reconstruction size and carries over echo times
    /// and default subsampling.
    pub fn convert<C: AcquisitionConverter>(&self, converter: &C) -> Result<AcquisitionData> {
        let mut acq = converter.convert(&self.raw, self.raw.params.recon_size)?;
        copy_te(&mut acq, &self.raw.params)?;
        adjust_subsample_indices(&mut acq)?;
        Ok(acq)
    }

    pub fn reconstruct<R: Reconstructor>(
        &self,
        acq: &AcquisitionData,
        solver: &R,
        sensitivity: Option<&Array4<Complex32>>,
    ) -> Result<ArrayD<Complex32>> {
        let img = solver.reconstruct(acq, &self.config.recon, sensitivity, self.noise_covariance.as_ref())?;
        squeeze(img)
    }
}
