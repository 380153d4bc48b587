//! Conversion between seconds and output-document ticks.

use crate::defaults;

/// Quantizes time to the tick grid of the output document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    resolution: u32,
    bpm: f64,
    tick_duration: f64,
}

impl TickClock {
    /// Creates a clock for `resolution` ticks per quarter note at `bpm`.
    pub fn new(resolution: u32, bpm: f64) -> Self {
        Self {
            resolution,
            bpm,
            tick_duration: 60.0 / bpm / resolution as f64,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of one tick in seconds.
    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// `round(time / tick_duration)`.
    pub fn to_tick(&self, time: f64) -> i64 {
        (time / self.tick_duration).round() as i64
    }

    /// Start of `tick` in seconds.
    pub fn to_seconds(&self, tick: i64) -> f64 {
        tick as f64 * self.tick_duration
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(defaults::RESOLUTION, defaults::BPM)
    }
}
