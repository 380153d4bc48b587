//! Segment-to-note assembler.
//!
//! A single-pass state machine over the segment list. Consonants are held
//! in a [`PendingPair`] until a vowel (or something that forces a flush)
//! arrives; every flush resolves the pending state into zero or one note.
//!
//! Flush outcomes:
//!
//! | pending            | note                                                     |
//! |--------------------|----------------------------------------------------------|
//! | nothing            | none                                                     |
//! | vowel              | vowel span + extension, default velocity, pure-vowel kana |
//! | consonant          | consonant span + extension, phoneme override             |
//! | consonant + vowel  | consonant begin to vowel end + extension, merged kana    |
//!
//! All table lookups finish before anything is written to the sink, so a
//! failed lookup never leaves a partial note behind.

use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::phonetic::{
    ConsonantDef, GLOTTAL_STOP_LYRIC, PhoneticTable, SILENCE_PHONEME, UnitClass,
};
use crate::segment::Segment;
use crate::sequence::sink::NoteSink;
use crate::sequence::timing::TickClock;
use crate::sequence::types::NoteEvent;
use crate::sequence::velocity::VelocityCurve;

/// Tunables of the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    /// Always emit a pending consonant as its own note.
    pub split_consonant: bool,
    /// Seconds added to the end of every vowel and consonant note.
    pub extend_note_time: f64,
    /// Extra seconds added to notes ending in a lengthened vowel.
    pub long_vowel_extension: f64,
    /// Velocity of vowel-only, special and glottal-stop notes.
    pub default_velocity: u8,
    pub velocity: VelocityCurve,
    /// Note number written on every note.
    pub note_number: i32,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            split_consonant: false,
            extend_note_time: defaults::EXTEND_NOTE_TIME,
            long_vowel_extension: defaults::LONG_VOWEL_EXTENSION,
            default_velocity: defaults::DEFAULT_VELOCITY,
            velocity: VelocityCurve::default(),
            note_number: defaults::A3_NOTE as i32,
        }
    }
}

/// Sentinel time of an empty slot.
const UNSET: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVowel {
    pub index: usize,
    pub long: bool,
}

/// Consonant/vowel accumulator between flushes.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPair {
    pub consonant: String,
    pub consonant_begin: f64,
    pub consonant_end: f64,
    pub vowel: Option<PendingVowel>,
    pub vowel_begin: f64,
    pub vowel_end: f64,
}

impl Default for PendingPair {
    fn default() -> Self {
        Self {
            consonant: String::new(),
            consonant_begin: UNSET,
            consonant_end: UNSET,
            vowel: None,
            vowel_begin: UNSET,
            vowel_end: UNSET,
        }
    }
}

impl PendingPair {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.active_consonant().is_none() && self.active_vowel().is_none()
    }

    fn active_consonant(&self) -> Option<&str> {
        (!self.consonant.is_empty() && self.consonant_begin >= 0.0)
            .then_some(self.consonant.as_str())
    }

    fn active_vowel(&self) -> Option<PendingVowel> {
        self.vowel.filter(|_| self.vowel_begin >= 0.0)
    }

    fn set_consonant(&mut self, label: &str, begin: f64, end: f64) {
        self.consonant = label.to_string();
        self.consonant_begin = begin;
        self.consonant_end = end;
    }

    fn set_vowel(&mut self, vowel: PendingVowel, begin: f64, end: f64) {
        self.vowel = Some(vowel);
        self.vowel_begin = begin;
        self.vowel_end = end;
    }
}

/// What a flush is going to emit, fully resolved.
enum Resolved {
    Nothing,
    Vowel {
        lyric: &'static str,
        long: bool,
    },
    Consonant {
        def: &'static ConsonantDef,
    },
    Pair {
        lyric: &'static str,
        long: bool,
    },
}

/// Turns an ordered segment list into notes on a [`NoteSink`].
pub struct Assembler<'a> {
    table: &'static PhoneticTable,
    sink: &'a mut dyn NoteSink,
    clock: TickClock,
    config: AssemblerConfig,
    time_offset: f64,
    pending: PendingPair,
    fed: usize,
    last_begin: Option<f64>,
}

impl<'a> Assembler<'a> {
    pub fn new(table: &'static PhoneticTable, sink: &'a mut dyn NoteSink) -> Self {
        Self {
            table,
            sink,
            clock: TickClock::default(),
            config: AssemblerConfig::default(),
            time_offset: 0.0,
            pending: PendingPair::default(),
            fed: 0,
            last_begin: None,
        }
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: TickClock) -> Self {
        self.clock = clock;
        self
    }

    /// Seconds added to every segment time (contour filter delay).
    pub fn with_time_offset(mut self, offset: f64) -> Self {
        self.time_offset = offset;
        self
    }

    pub fn pending(&self) -> &PendingPair {
        &self.pending
    }

    /// Runs a complete pass: every segment, then the final flush.
    pub fn assemble(&mut self, segments: &[Segment]) -> Result<()> {
        for segment in segments {
            self.feed(segment)?;
        }
        self.finish()?;
        tracing::debug!(
            segments = segments.len(),
            notes = self.sink.note_count(),
            "assembly complete"
        );
        Ok(())
    }

    /// Processes one segment.
    pub fn feed(&mut self, segment: &Segment) -> Result<()> {
        if let Some(previous) = self.last_begin
            && segment.begin_time < previous
        {
            return Err(TalkseqError::SegmentOrder {
                index: self.fed,
                begin_time: segment.begin_time,
                previous,
            });
        }
        self.last_begin = Some(segment.begin_time);
        self.fed += 1;

        let begin = segment.begin_time + self.time_offset;
        let end = segment.end_time + self.time_offset;

        match self.table.classify(&segment.unit) {
            UnitClass::GlottalStop => {
                self.flush()?;
                let note = self.note(
                    begin,
                    end + self.config.extend_note_time,
                    self.config.default_velocity,
                    GLOTTAL_STOP_LYRIC,
                    Some(SILENCE_PHONEME),
                );
                self.sink.add_note(note);
            }
            UnitClass::Special(lyric) => {
                self.flush()?;
                if !lyric.is_empty() {
                    let note = self.note(begin, end, self.config.default_velocity, lyric, None);
                    self.sink.add_note(note);
                }
                self.pending.reset();
            }
            UnitClass::Consonant("") => {
                return Err(TalkseqError::Alignment {
                    consonant: segment.unit.clone(),
                    vowel: String::new(),
                });
            }
            UnitClass::Consonant(label) => {
                if !self.pending.consonant.is_empty() {
                    tracing::trace!(stale = %self.pending.consonant, next = label, "consonant run");
                    self.flush()?;
                }
                self.pending.set_consonant(label, begin, end);
            }
            UnitClass::Vowel { index, long } => {
                if self.config.split_consonant {
                    self.flush()?;
                }
                self.pending
                    .set_vowel(PendingVowel { index, long }, begin, end);
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Drains trailing pending state.
    pub fn finish(&mut self) -> Result<()> {
        self.flush()
    }

    /// Resolves the pending pair into at most one note, then resets it.
    pub fn flush(&mut self) -> Result<()> {
        let resolved = self.resolve()?;
        let p = &self.pending;
        let cfg = &self.config;

        let note = match resolved {
            Resolved::Nothing => None,
            Resolved::Vowel { lyric, long } => Some(self.note(
                p.vowel_begin,
                p.vowel_end + cfg.extend_note_time + self.long_extension(long),
                cfg.default_velocity,
                lyric,
                None,
            )),
            Resolved::Consonant { def } => Some(self.note(
                p.consonant_begin,
                p.consonant_end + cfg.extend_note_time,
                cfg.velocity.velocity(p.consonant_end - p.consonant_begin),
                &p.consonant,
                Some(def.phoneme),
            )),
            Resolved::Pair { lyric, long } => {
                let begin_tick = self.clock.to_tick(p.consonant_begin);
                self.sink.extend_last_note(begin_tick, begin_tick);
                Some(self.note(
                    p.consonant_begin,
                    p.vowel_end + cfg.extend_note_time + self.long_extension(long),
                    cfg.velocity.velocity(p.vowel_begin - p.consonant_begin),
                    lyric,
                    None,
                ))
            }
        };

        if let Some(note) = note {
            tracing::trace!(
                lyric = %note.lyric,
                begin = note.begin_tick,
                end = note.end_tick,
                velocity = note.velocity,
                "note"
            );
            self.sink.add_note(note);
        }
        self.pending.reset();
        Ok(())
    }

    fn resolve(&self) -> Result<Resolved> {
        let consonant = self.pending.active_consonant();
        let vowel = self.pending.active_vowel();

        let alignment_error = || TalkseqError::Alignment {
            consonant: self.pending.consonant.clone(),
            vowel: vowel
                .and_then(|v| self.table.vowel_name(v.index))
                .unwrap_or_default()
                .to_string(),
        };

        match (consonant, vowel) {
            (None, None) => Ok(Resolved::Nothing),
            (None, Some(v)) => {
                let lyric = self.table.vowel_lyric(v.index).ok_or_else(alignment_error)?;
                Ok(Resolved::Vowel {
                    lyric,
                    long: v.long,
                })
            }
            (Some(label), None) => {
                let def = self
                    .table
                    .lookup_consonant(label)
                    .ok_or_else(alignment_error)?;
                Ok(Resolved::Consonant { def })
            }
            (Some(label), Some(v)) => {
                let lyric = self
                    .table
                    .lookup_consonant(label)
                    .and_then(|def| def.kana.get(v.index).copied())
                    .ok_or_else(alignment_error)?;
                Ok(Resolved::Pair {
                    lyric,
                    long: v.long,
                })
            }
        }
    }

    fn long_extension(&self, long: bool) -> f64 {
        if long {
            self.config.long_vowel_extension
        } else {
            0.0
        }
    }

    fn note(
        &self,
        begin: f64,
        end: f64,
        velocity: u8,
        lyric: &str,
        phoneme: Option<&str>,
    ) -> NoteEvent {
        NoteEvent {
            begin_tick: self.clock.to_tick(begin),
            end_tick: self.clock.to_tick(end),
            note_number: self.config.note_number,
            velocity,
            lyric: lyric.to_string(),
            phoneme: phoneme.map(str::to_string),
        }
    }
}
