//! Pitch-bend encoding of a processed contour.

use crate::defaults;
use crate::sequence::sink::NoteSink;
use crate::sequence::timing::TickClock;
use crate::sequence::types::Control;

pub const BEND_MIN: i16 = -8192;
pub const BEND_MAX: i16 = 8191;

/// Bend value for a deviation of `delta` semitones at the given range.
pub fn bend_value(delta: f64, sensitivity: u8) -> i16 {
    if delta.is_nan() || sensitivity == 0 {
        return 0;
    }
    let raw = (8192.0 * delta / sensitivity as f64).round();
    raw.clamp(BEND_MIN as f64, BEND_MAX as f64) as i16
}

/// Emits a bend-sensitivity control followed by one bend point per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BendEncoder {
    /// Full-scale range in semitones.
    pub sensitivity: u8,
    /// Drop points whose value repeats the last emitted one.
    pub skip_repeats: bool,
}

impl Default for BendEncoder {
    fn default() -> Self {
        Self {
            sensitivity: defaults::BEND_SENSITIVITY,
            skip_repeats: true,
        }
    }
}

impl BendEncoder {
    pub fn new(sensitivity: u8) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }

    pub fn with_skip_repeats(mut self, skip: bool) -> Self {
        self.skip_repeats = skip;
        self
    }

    /// Encodes `notes` (one sample every `frame_period` seconds starting at
    /// `offset`) relative to `center`. Returns the number of bend points.
    pub fn encode(
        &self,
        notes: &[f64],
        center: i32,
        frame_period: f64,
        offset: f64,
        clock: &TickClock,
        sink: &mut dyn NoteSink,
    ) -> usize {
        sink.add_control(0, Control::BendSensitivity(self.sensitivity));

        let mut emitted = 0;
        let mut last: Option<i16> = None;
        for (i, note) in notes.iter().enumerate() {
            let tick = clock.to_tick(offset + i as f64 * frame_period);
            if tick < 0 {
                continue;
            }
            let value = bend_value(note - center as f64, self.sensitivity);
            if self.skip_repeats && last == Some(value) {
                continue;
            }
            sink.add_control(tick, Control::PitchBend(value));
            last = Some(value);
            emitted += 1;
        }

        tracing::debug!(
            samples = notes.len(),
            points = emitted,
            sensitivity = self.sensitivity,
            "pitch bend encoded"
        );
        emitted
    }
}
