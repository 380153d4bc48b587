//! Data types produced by the assembler and the bend encoder.

use serde::Serialize;

/// One note of the output track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub begin_tick: i64,
    pub end_tick: i64,
    /// Absolute note number (A3 = 69).
    pub note_number: i32,
    /// 1..=127.
    pub velocity: u8,
    pub lyric: String,
    /// Synthesizer phoneme written instead of the lyric's dictionary entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phoneme: Option<String>,
}

impl NoteEvent {
    pub fn duration_ticks(&self) -> i64 {
        self.end_tick - self.begin_tick
    }
}

/// Controller event on the track timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Control {
    /// Full-scale pitch-bend range in semitones.
    BendSensitivity(u8),
    /// Signed bend value in `-8192..=8191`.
    PitchBend(i16),
}

impl Control {
    /// Controller id in the output document.
    pub fn id(&self) -> &'static str {
        match self {
            Control::BendSensitivity(_) => "PBS",
            Control::PitchBend(_) => "PIT",
        }
    }

    pub fn value(&self) -> i32 {
        match *self {
            Control::BendSensitivity(v) => v as i32,
            Control::PitchBend(v) => v as i32,
        }
    }
}

/// A control positioned on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlEvent {
    pub tick: i64,
    pub control: Control,
}
