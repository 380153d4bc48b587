//! WAV decoding into normalized mono samples at the analysis rate.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, TalkseqError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// A decoded recording: mono, 16 kHz, samples in `-1.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInput {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    /// File the audio came from, when it came from one.
    pub path: Option<PathBuf>,
}

impl AudioInput {
    /// Wraps samples that are already mono at `sample_rate`.
    pub fn from_samples(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            path: None,
        }
    }

    /// Decode WAV data from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| TalkseqError::Audio {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        if spec.channels == 0 {
            return Err(TalkseqError::Audio {
                message: "WAV file declares zero channels".to_string(),
            });
        }

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<std::result::Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| TalkseqError::Audio {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

        let mono = downmix(&interleaved, spec.channels as usize);
        let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

        tracing::debug!(
            source_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            samples = samples.len(),
            "decoded wav"
        );

        Ok(Self {
            samples,
            sample_rate: SAMPLE_RATE,
            path: None,
        })
    }

    /// Decode a WAV file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut input = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            TalkseqError::Audio { message } => TalkseqError::Audio {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })?;
        input.path = Some(path.to_path_buf());
        Ok(input)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Average interleaved frames down to one channel.
fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Vec<f64> {
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}
