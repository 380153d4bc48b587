use crate::sequence::types::{Control, ControlEvent, NoteEvent};

/// Receiver of assembled notes and controller points.
///
/// Calls arrive in time order. The assembler only talks to this trait, so
/// tests can count emissions and the document writer can stay opaque.
pub trait NoteSink {
    /// Append a note.
    fn add_note(&mut self, note: NoteEvent);

    /// Move the last note's end to `to_tick` when its end is at or past
    /// `if_after_tick`. Returns whether a note was changed.
    fn extend_last_note(&mut self, to_tick: i64, if_after_tick: i64) -> bool;

    /// Append a controller point.
    fn add_control(&mut self, tick: i64, control: Control);

    /// Number of notes added so far.
    fn note_count(&self) -> usize;
}

/// Collecting sink: one track of notes plus its controller points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    notes: Vec<NoteEvent>,
    controls: Vec<ControlEvent>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn controls(&self) -> &[ControlEvent] {
        &self.controls
    }

    /// Tick just past the last note, or 0 for an empty track.
    pub fn end_tick(&self) -> i64 {
        self.notes.iter().map(|n| n.end_tick).max().unwrap_or(0)
    }

    /// Pull the last note's end back to `tick` if it runs past it.
    fn limit_last_note(&mut self, tick: i64) {
        if let Some(last) = self.notes.last_mut()
            && last.end_tick > tick
        {
            last.end_tick = tick.max(last.begin_tick);
        }
    }
}

impl NoteSink for Sequence {
    fn add_note(&mut self, note: NoteEvent) {
        self.limit_last_note(note.begin_tick);
        self.notes.push(note);
    }

    fn extend_last_note(&mut self, to_tick: i64, if_after_tick: i64) -> bool {
        match self.notes.last_mut() {
            Some(last) if last.end_tick >= if_after_tick => {
                last.end_tick = to_tick;
                true
            }
            _ => false,
        }
    }

    fn add_control(&mut self, tick: i64, control: Control) {
        self.controls.push(ControlEvent { tick, control });
    }

    fn note_count(&self) -> usize {
        self.notes.len()
    }
}
