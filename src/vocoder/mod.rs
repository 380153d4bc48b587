//! Fundamental-frequency estimation.

pub mod mcleod;

pub use mcleod::McLeodVocoder;

use crate::defaults;
use crate::error::{Result, TalkseqError};
use std::sync::Arc;

/// Trait for per-frame f0 extraction.
///
/// This trait allows swapping implementations (real detector vs mock).
pub trait Vocoder: Send + Sync {
    /// Estimate f0 for every frame of `samples`.
    ///
    /// # Returns
    /// One frequency in Hz per frame; `0.0` marks an unvoiced frame.
    fn f0(&self, samples: &[f64], sample_rate: u32) -> Result<Vec<f64>>;

    /// Seconds between frames.
    fn frame_period(&self) -> f64;

    fn name(&self) -> &str;

    /// Every setting that changes the output, used to key cached f0 tracks.
    fn fingerprint(&self) -> String {
        format!("{} frame_period={}", self.name(), self.frame_period())
    }
}

impl<T: Vocoder> Vocoder for Arc<T> {
    fn f0(&self, samples: &[f64], sample_rate: u32) -> Result<Vec<f64>> {
        (**self).f0(samples, sample_rate)
    }

    fn frame_period(&self) -> f64 {
        (**self).frame_period()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn fingerprint(&self) -> String {
        (**self).fingerprint()
    }
}

/// Mock vocoder for testing
#[derive(Debug, Clone)]
pub struct MockVocoder {
    series: Vec<f64>,
    frame_period: f64,
    should_fail: bool,
}

impl MockVocoder {
    /// Returns `series` regardless of the input audio.
    pub fn new(series: Vec<f64>) -> Self {
        Self {
            series,
            frame_period: defaults::F0_FRAME_PERIOD,
            should_fail: false,
        }
    }

    /// A constant pitch for `frames` frames.
    pub fn constant(freq: f64, frames: usize) -> Self {
        Self::new(vec![freq; frames])
    }

    pub fn with_frame_period(mut self, frame_period: f64) -> Self {
        self.frame_period = frame_period;
        self
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Vocoder for MockVocoder {
    fn f0(&self, _samples: &[f64], _sample_rate: u32) -> Result<Vec<f64>> {
        if self.should_fail {
            return Err(TalkseqError::Vocoder {
                message: "mock vocoder failure".to_string(),
            });
        }
        Ok(self.series.clone())
    }

    fn frame_period(&self) -> f64 {
        self.frame_period
    }

    fn name(&self) -> &str {
        "mock"
    }
}
