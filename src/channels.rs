//! Per-wavelength simulation channels

use crate::error::{SimError, SimResult};
use crate::utils::SerdeVector;
use crate::Color;
use serde::{Deserialize, Serialize};

/// Dispersion scales for the default rainbow, red through violet
const RAINBOW_SCALES: [f64; 7] = [0.91, 0.94, 0.97, 1.0, 1.03, 1.06, 1.09];
const RAINBOW_COLORS: [[f64; 3]; 7] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.29, 0.0, 0.51],
    [0.56, 0.0, 1.0],
];

/// One tracked wavelength
///
/// `refract_scale` multiplies the material's refractive index for this
/// channel, which is what spreads white light into a fan.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    refract_scale: f64,
    color: Color,
}
impl Channel {
    pub fn new(refract_scale: f64, color: Color) -> SimResult<Self> {
        if !refract_scale.is_finite() || refract_scale <= 0.0 {
            return Err(SimError::config(format!(
                "channel refract scale must be positive, got {refract_scale}"
            )));
        }
        Ok(Self {
            refract_scale,
            color,
        })
    }

    pub fn from_config(config: ChannelConfig) -> SimResult<Self> {
        Self::new(config.refract_scale, config.color.into())
    }

    /// The classic seven-color spread
    pub fn rainbow() -> Vec<Channel> {
        RAINBOW_SCALES
            .iter()
            .zip(RAINBOW_COLORS.iter())
            .map(|(&scale, c)| Channel {
                refract_scale: scale,
                color: Color::new(c[0], c[1], c[2]),
            })
            .collect()
    }

    pub fn refract_scale(&self) -> f64 {
        self.refract_scale
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Channel config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub refract_scale: f64,
    pub color: SerdeVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rainbow_has_seven_ordered_channels() {
        let channels = Channel::rainbow();
        assert_eq!(channels.len(), 7);
        assert_eq!(channels[0].refract_scale(), 0.91);
        assert_eq!(channels[3].refract_scale(), 1.0);
        assert_eq!(channels[6].refract_scale(), 1.09);
        for pair in channels.windows(2) {
            assert!(pair[0].refract_scale() < pair[1].refract_scale());
        }
    }

    #[test]
    fn rejects_non_positive_scale() {
        let red = Color::new(1.0, 0.0, 0.0);
        assert!(Channel::new(0.0, red).is_err());
        assert!(Channel::new(-0.9, red).is_err());
        assert!(Channel::new(f64::NAN, red).is_err());
    }
}
