//! talkseq - Turn recorded speech into a singable VOCALOID3 sequence
//!
//! Aligns a recording with its kana transcript, follows the speaker's pitch,
//! and writes notes plus a pitch-bend curve as a `.vsqx` document.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod contour;
pub mod defaults;
pub mod error;
pub mod phonetic;
pub mod pipeline;
pub mod segment;
pub mod sequence;
pub mod vocoder;
pub mod vsqx;

// L4 composition root - needs everything
#[cfg(feature = "cli")]
pub mod app;

// Core traits (source → process → sink)
pub use segment::Segmenter;
pub use sequence::NoteSink;
pub use vocoder::Vocoder;

// Pipeline
pub use pipeline::{GenerateReport, GenerateRequest, Orchestrator, OrchestratorConfig};

// Error handling
pub use error::{Result, TalkseqError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
