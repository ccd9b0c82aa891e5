//! Implementation of materials

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// A refractive surface
///
/// `refractive_index` is applied directly as eta when a beam enters the
/// medium and inverted when it exits, after scaling by the channel's
/// dispersion factor. `thickness` is how far an inside beam advances
/// before looking for its exit face, so it should cover the medium's
/// extent along the beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrismMaterial {
    refractive_index: f64,
    transmittance: f64,
    thickness: f64,
}
impl PrismMaterial {
    pub fn new(refractive_index: f64, transmittance: f64, thickness: f64) -> SimResult<Self> {
        if !refractive_index.is_finite() || refractive_index <= 0.0 {
            return Err(SimError::config(format!(
                "refractive index must be positive, got {refractive_index}"
            )));
        }
        if !transmittance.is_finite() || !(0.0..=1.0).contains(&transmittance) {
            return Err(SimError::config(format!(
                "transmittance must be within [0, 1], got {transmittance}"
            )));
        }
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(SimError::config(format!(
                "thickness must be non-negative, got {thickness}"
            )));
        }
        Ok(Self {
            refractive_index,
            transmittance,
            thickness,
        })
    }

    pub fn from_config(config: MaterialConfig) -> SimResult<Self> {
        Self::new(config.refractive_index, config.transmittance, config.thickness)
    }

    /// Plain glass, the usual demo medium
    pub fn glass() -> Self {
        Self {
            refractive_index: 1.5,
            transmittance: 0.9,
            thickness: 1.0,
        }
    }

    pub fn refractive_index(&self) -> f64 {
        self.refractive_index
    }

    pub fn transmittance(&self) -> f64 {
        self.transmittance
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }
}

/// Prism material config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub refractive_index: f64,
    pub transmittance: f64,
    pub thickness: f64,
}
