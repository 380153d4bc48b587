use crate::contour::{ContourProcessor, LeadingFill, LowPassCutoff};
use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::pipeline::OrchestratorConfig;
use crate::sequence::{AssemblerConfig, BendEncoder, CurveShape, TickClock, VelocityCurve};
use crate::vocoder::McLeodVocoder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub contour: ContourConfig,
    pub vocoder: VocoderConfig,
    pub notes: NotesConfig,
    pub bend: BendConfig,
    pub aligner: AlignerConfig,
    pub output: OutputConfig,
}

/// Tick grid of the output document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub resolution: u32,
    pub bpm: f64,
}

/// Pitch contour processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContourConfig {
    /// Seconds between f0 frames.
    pub frame_period: f64,
    pub f0_floor: f64,
    pub resample_rate: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowpass: Option<LowPassCutoff>,
    pub leading_fill: LeadingFill,
    pub transpose_cents: i32,
    pub fir_taps: usize,
}

/// Pitch estimator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VocoderConfig {
    pub f0_floor: f64,
    pub f0_ceil: f64,
    /// Analysis window in samples.
    pub window: usize,
    pub power_threshold: f64,
    pub clarity_threshold: f64,
}

/// Note assembly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotesConfig {
    pub split_consonant: bool,
    pub extend_note_time: f64,
    pub long_vowel_extension: f64,
    pub default_velocity: u8,
    pub velocity_curve: CurveShape,
    /// Bend of the logarithmic curve; larger is steeper near zero.
    pub velocity_curvature: f64,
    pub duration_at_max_velocity: f64,
    pub duration_at_min_velocity: f64,
}

/// Pitch bend emission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BendConfig {
    pub sensitivity: u8,
    /// Seconds added to every bend point.
    pub shift: f64,
    pub skip_repeats: bool,
}

/// Forced alignment with julius
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignerConfig {
    pub julius: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmm_defs: Option<PathBuf>,
    /// Main jconf of a julius dictation kit; used when no transcript exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictation_model: Option<PathBuf>,
    /// Extra julius arguments for dictation. `./` paths are relative to the
    /// jconf's directory.
    pub dictation_args: Vec<String>,
}

/// Output document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub singer: String,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resolution: defaults::RESOLUTION,
            bpm: defaults::BPM,
        }
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            frame_period: defaults::F0_FRAME_PERIOD,
            f0_floor: defaults::F0_FLOOR_HZ,
            resample_rate: defaults::RESAMPLE_RATE,
            lowpass: None,
            leading_fill: LeadingFill::default(),
            transpose_cents: 0,
            fir_taps: defaults::FIR_TAPS,
        }
    }
}

impl Default for VocoderConfig {
    fn default() -> Self {
        let vocoder = McLeodVocoder::default();
        Self {
            f0_floor: vocoder.f0_floor,
            f0_ceil: vocoder.f0_ceil,
            window: vocoder.window,
            power_threshold: vocoder.power_threshold,
            clarity_threshold: vocoder.clarity_threshold,
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            split_consonant: false,
            extend_note_time: defaults::EXTEND_NOTE_TIME,
            long_vowel_extension: defaults::LONG_VOWEL_EXTENSION,
            default_velocity: defaults::DEFAULT_VELOCITY,
            velocity_curve: CurveShape::default(),
            velocity_curvature: defaults::VELOCITY_CURVATURE,
            duration_at_max_velocity: defaults::DURATION_AT_MAX_VELOCITY,
            duration_at_min_velocity: defaults::DURATION_AT_MIN_VELOCITY,
        }
    }
}

impl Default for BendConfig {
    fn default() -> Self {
        Self {
            sensitivity: defaults::BEND_SENSITIVITY,
            shift: 0.0,
            skip_repeats: true,
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            julius: defaults::JULIUS_BIN.to_string(),
            hmm_defs: None,
            dictation_model: None,
            dictation_args: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            singer: defaults::DEFAULT_SINGER.to_string(),
        }
    }
}

fn invalid(key: &str, message: impl Into<String>) -> TalkseqError {
    TalkseqError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file yields defaults; invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TALKSEQ_SINGER → output.singer
    /// - TALKSEQ_JULIUS → aligner.julius
    /// - TALKSEQ_HMM_DEFS → aligner.hmm_defs
    /// - TALKSEQ_DICTATION_MODEL → aligner.dictation_model
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(singer) = std::env::var("TALKSEQ_SINGER")
            && !singer.is_empty()
        {
            self.output.singer = singer;
        }

        if let Ok(julius) = std::env::var("TALKSEQ_JULIUS")
            && !julius.is_empty()
        {
            self.aligner.julius = julius;
        }

        if let Ok(hmm) = std::env::var("TALKSEQ_HMM_DEFS")
            && !hmm.is_empty()
        {
            self.aligner.hmm_defs = Some(PathBuf::from(hmm));
        }

        if let Ok(model) = std::env::var("TALKSEQ_DICTATION_MODEL")
            && !model.is_empty()
        {
            self.aligner.dictation_model = Some(PathBuf::from(model));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/talkseq/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("talkseq").join("config.toml"))
    }

    /// Check value ranges the core modules rely on.
    pub fn validate(&self) -> Result<()> {
        if self.timing.resolution == 0 {
            return Err(invalid("timing.resolution", "must be positive"));
        }
        if !self.timing.bpm.is_finite() || self.timing.bpm <= 0.0 {
            return Err(invalid("timing.bpm", "must be positive"));
        }
        if self.contour.frame_period.is_nan() || self.contour.frame_period <= 0.0 {
            return Err(invalid("contour.frame_period", "must be positive"));
        }
        if self.contour.resample_rate < 1 {
            return Err(invalid("contour.resample_rate", "must be at least 1"));
        }
        if self.contour.fir_taps % 2 == 0 {
            return Err(invalid(
                "contour.fir_taps",
                format!("must be odd, got {}", self.contour.fir_taps),
            ));
        }
        if self.vocoder.f0_floor >= self.vocoder.f0_ceil {
            return Err(invalid("vocoder.f0_floor", "must be below vocoder.f0_ceil"));
        }
        if !(1..=127).contains(&self.notes.default_velocity) {
            return Err(invalid("notes.default_velocity", "must be in 1..=127"));
        }
        if self.notes.duration_at_min_velocity <= self.notes.duration_at_max_velocity {
            return Err(invalid(
                "notes.duration_at_min_velocity",
                "must exceed notes.duration_at_max_velocity",
            ));
        }
        if !self.notes.velocity_curvature.is_finite() || self.notes.velocity_curvature <= 0.0 {
            return Err(invalid(
                "notes.velocity_curvature",
                format!("must be positive, got {}", self.notes.velocity_curvature),
            ));
        }
        if !(1..=24).contains(&self.bend.sensitivity) {
            return Err(invalid(
                "bend.sensitivity",
                format!("must be in 1..=24, got {}", self.bend.sensitivity),
            ));
        }
        Ok(())
    }

    pub fn clock(&self) -> TickClock {
        TickClock::new(self.timing.resolution, self.timing.bpm)
    }

    pub fn contour_processor(&self) -> ContourProcessor {
        ContourProcessor {
            frame_period: self.contour.frame_period,
            f0_floor: self.contour.f0_floor,
            leading_fill: self.contour.leading_fill,
            transpose: self.contour.transpose_cents as f64 / 100.0,
            resample_rate: self.contour.resample_rate,
            lowpass: self.contour.lowpass,
            fir_taps: self.contour.fir_taps,
        }
    }

    pub fn vocoder(&self) -> McLeodVocoder {
        McLeodVocoder {
            frame_period: self.contour.frame_period,
            window: self.vocoder.window,
            ..McLeodVocoder::default()
        }
        .with_range(self.vocoder.f0_floor, self.vocoder.f0_ceil)
        .with_thresholds(self.vocoder.power_threshold, self.vocoder.clarity_threshold)
    }

    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            split_consonant: self.notes.split_consonant,
            extend_note_time: self.notes.extend_note_time,
            long_vowel_extension: self.notes.long_vowel_extension,
            default_velocity: self.notes.default_velocity,
            velocity: VelocityCurve {
                shape: self.notes.velocity_curve,
                duration_at_max: self.notes.duration_at_max_velocity,
                duration_at_min: self.notes.duration_at_min_velocity,
                curvature: self.notes.velocity_curvature,
            },
            ..AssemblerConfig::default()
        }
    }

    pub fn bend_encoder(&self) -> BendEncoder {
        BendEncoder::new(self.bend.sensitivity).with_skip_repeats(self.bend.skip_repeats)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            contour: self.contour_processor(),
            assembler: self.assembler_config(),
            clock: self.clock(),
            bend: self.bend_encoder(),
            bend_shift: self.bend.shift,
        }
    }
}
