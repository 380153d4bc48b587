//! Mapping from segment duration to note velocity.
//!
//! Longer consonant bursts map to softer notes. The curve is monotone
//! non-increasing and always lands in `1..=127`.

use crate::defaults;
use serde::{Deserialize, Serialize};

pub const MIN_VELOCITY: u8 = 1;
pub const MAX_VELOCITY: u8 = 127;

/// Shape of the duration → velocity transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurveShape {
    /// Straight line from the loudest to the softest velocity.
    Linear,
    /// Logarithmic: short durations already lose loudness quickly.
    #[default]
    Logarithmic,
}

/// Tunable velocity curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCurve {
    pub shape: CurveShape,
    /// Duration (seconds) at or below which the velocity is 127.
    pub duration_at_max: f64,
    /// Duration (seconds) at or above which the velocity is 1.
    pub duration_at_min: f64,
    /// Bend of the logarithmic shape; larger is steeper near zero.
    pub curvature: f64,
}

impl Default for VelocityCurve {
    fn default() -> Self {
        Self {
            shape: CurveShape::default(),
            duration_at_max: defaults::DURATION_AT_MAX_VELOCITY,
            duration_at_min: defaults::DURATION_AT_MIN_VELOCITY,
            curvature: defaults::VELOCITY_CURVATURE,
        }
    }
}

impl VelocityCurve {
    pub fn linear() -> Self {
        Self {
            shape: CurveShape::Linear,
            ..Self::default()
        }
    }

    /// Velocity for a duration in seconds.
    pub fn velocity(&self, duration: f64) -> u8 {
        if duration.is_nan() {
            return MAX_VELOCITY;
        }
        let span = self.duration_at_min - self.duration_at_max;
        if span <= 0.0 {
            return if duration >= self.duration_at_min {
                MIN_VELOCITY
            } else {
                MAX_VELOCITY
            };
        }

        match self.shape {
            CurveShape::Linear => {
                let raw = 127.0 - ((duration - self.duration_at_max) * 127.0 / span).round();
                raw.clamp(MIN_VELOCITY as f64, MAX_VELOCITY as f64) as u8
            }
            CurveShape::Logarithmic => {
                let t = ((duration - self.duration_at_max) / span).clamp(0.0, 1.0);
                let k = self.curvature.max(f64::EPSILON);
                let x = (1.0 + k * t).ln() / (1.0 + k).ln();
                let raw = (MAX_VELOCITY as f64 - (MAX_VELOCITY - MIN_VELOCITY) as f64 * x).round();
                raw.clamp(MIN_VELOCITY as f64, MAX_VELOCITY as f64) as u8
            }
        }
    }
}
