//! Phone labels: lookup tables for the assembler and kana transcription
//! for the aligner.

pub mod kana;
pub mod table;

pub use kana::{phones_to_kana, to_phonetic, transcript_to_words};
pub use table::{
    ConsonantDef, GLOTTAL_STOP, GLOTTAL_STOP_LYRIC, LENGTH_MARKER, PhoneticTable,
    SILENCE_PHONEME, UnitClass, split_length,
};
