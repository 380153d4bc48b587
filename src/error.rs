//! Error types for talkseq.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalkseqError {
    // Assembly errors
    #[error("Cannot resolve pronunciation of [{consonant}] [{vowel}]")]
    Alignment { consonant: String, vowel: String },

    #[error("Segment {index} begins at {begin_time:.4}s, before the previous segment at {previous:.4}s")]
    SegmentOrder {
        index: usize,
        begin_time: f64,
        previous: f64,
    },

    // Pitch contour errors
    #[error("Invalid pitch contour input: {message}")]
    ContourInput { message: String },

    #[error("Unknown low-pass cutoff '{value}' (expected one of 0.5, 1.0, 1.5, 2.0, 2.5, 3.0)")]
    UnknownCutoff { value: String },

    // Collaborator errors
    #[error("Audio decoding failed: {message}")]
    Audio { message: String },

    #[error("Pitch estimation failed: {message}")]
    Vocoder { message: String },

    #[error("Aligner not found: {tool}")]
    AlignerNotFound { tool: String },

    #[error("Segmentation failed: {message}")]
    Segmenter { message: String },

    #[error("Dictation failed: {message}")]
    Dictation { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TalkseqError>;
