//! Default configuration constants for talkseq.
//!
//! Shared by the config sections and the core modules so that a value like the
//! tick resolution is defined exactly once.

/// Sample rate the analysis pipeline works at, in Hz.
///
/// Julius acoustic models are trained on 16kHz mono, so every recording is
/// resampled to this rate before pitch estimation and alignment.
pub const SAMPLE_RATE: u32 = 16000;

/// Frame period of the raw f0 contour in seconds (5 ms).
pub const F0_FRAME_PERIOD: f64 = 0.005;

/// Integer factor used to upsample the f0 contour before bend emission.
///
/// 5 ms / 5 = 1 ms, which matches one tick at the default tempo.
pub const RESAMPLE_RATE: usize = 5;

/// Frequencies below this are treated as unvoiced by the contour processor.
pub const F0_FLOOR_HZ: f64 = 100.0;

/// Search range of the pitch estimator.
pub const VOCODER_F0_FLOOR_HZ: f64 = 71.0;
pub const VOCODER_F0_CEIL_HZ: f64 = 800.0;

/// Analysis window of the pitch estimator, in samples at [`SAMPLE_RATE`].
pub const VOCODER_WINDOW: usize = 2048;

/// Reference pitch: A3 = 440 Hz = note number 69.
pub const A3_FREQ: f64 = 440.0;
pub const A3_NOTE: f64 = 69.0;

/// Default number of FIR taps for the contour low-pass filter.
///
/// 221 taps at the 5 ms grid, scaled to the 1 ms grid the filter runs on.
pub const FIR_TAPS: usize = 221 * RESAMPLE_RATE;

/// Ticks per quarter note in the output document.
pub const RESOLUTION: u32 = 480;

/// Tempo of the output document; with [`RESOLUTION`] one tick lasts 1 ms.
pub const BPM: f64 = 125.0;

/// Seconds added to the end of every note so that consecutive notes overlap.
pub const EXTEND_NOTE_TIME: f64 = 0.05;

/// Additional seconds given to notes whose vowel carries the length marker.
pub const LONG_VOWEL_EXTENSION: f64 = 0.05;

/// Velocity for notes whose loudness is not derived from a duration.
pub const DEFAULT_VELOCITY: u8 = 64;

/// Consonant durations mapped to the loudest and softest velocity.
pub const DURATION_AT_MAX_VELOCITY: f64 = 0.0;
pub const DURATION_AT_MIN_VELOCITY: f64 = 0.20;

/// Bend of the logarithmic velocity curve.
pub const VELOCITY_CURVATURE: f64 = 9.0;

/// Bend sensitivity in semitones (full-scale pitch-bend deflection).
pub const BEND_SENSITIVITY: u8 = 24;

/// Default singer written into the voice table.
pub const DEFAULT_SINGER: &str = "Yukari_Onn";

/// Name of the Julius executable looked up on `PATH`.
pub const JULIUS_BIN: &str = "julius";

/// Extension of the per-recording cache directory.
pub const CACHE_DIR_EXTENSION: &str = "tlo";
