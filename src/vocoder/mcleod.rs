//! f0 extraction with the McLeod pitch method.

use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::vocoder::Vocoder;
use pitch_detection::detector::PitchDetector;
use pitch_detection::detector::mcleod::McLeodDetector;

/// Frame-wise McLeod pitch detector.
#[derive(Debug, Clone, PartialEq)]
pub struct McLeodVocoder {
    pub frame_period: f64,
    /// Analysis window length in samples.
    pub window: usize,
    pub f0_floor: f64,
    pub f0_ceil: f64,
    pub power_threshold: f64,
    pub clarity_threshold: f64,
}

impl Default for McLeodVocoder {
    fn default() -> Self {
        Self {
            frame_period: defaults::F0_FRAME_PERIOD,
            window: defaults::VOCODER_WINDOW,
            f0_floor: defaults::VOCODER_F0_FLOOR_HZ,
            f0_ceil: defaults::VOCODER_F0_CEIL_HZ,
            power_threshold: 0.0,
            clarity_threshold: 0.6,
        }
    }
}

impl McLeodVocoder {
    pub fn with_range(mut self, floor: f64, ceil: f64) -> Self {
        self.f0_floor = floor;
        self.f0_ceil = ceil;
        self
    }

    pub fn with_thresholds(mut self, power: f64, clarity: f64) -> Self {
        self.power_threshold = power;
        self.clarity_threshold = clarity;
        self
    }

    /// Samples between frame centers.
    fn hop(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.frame_period).floor() as usize
    }
}

impl Vocoder for McLeodVocoder {
    fn f0(&self, samples: &[f64], sample_rate: u32) -> Result<Vec<f64>> {
        let hop = self.hop(sample_rate);
        if hop == 0 {
            return Err(TalkseqError::Vocoder {
                message: format!(
                    "frame period {}s is shorter than one sample at {} Hz",
                    self.frame_period, sample_rate
                ),
            });
        }
        if self.window < 4 {
            return Err(TalkseqError::Vocoder {
                message: format!("analysis window of {} samples is too short", self.window),
            });
        }

        let frames = samples.len() / hop;
        let half = self.window / 2;
        let mut detector = McLeodDetector::<f64>::new(self.window, half);
        let mut buffer = vec![0.0; self.window];
        let mut result = Vec::with_capacity(frames);

        for frame in 0..frames {
            let center = frame * hop;
            buffer.iter_mut().for_each(|v| *v = 0.0);
            let start = center.saturating_sub(half);
            let offset = half.saturating_sub(center);
            let end = (center + half).min(samples.len());
            buffer[offset..offset + (end - start)].copy_from_slice(&samples[start..end]);

            let silent = buffer.iter().all(|v| *v == 0.0);
            let freq = if silent {
                0.0
            } else {
                detector
                    .get_pitch(
                        &buffer,
                        sample_rate as usize,
                        self.power_threshold,
                        self.clarity_threshold,
                    )
                    .map(|p| p.frequency)
                    .filter(|f| f.is_finite() && *f >= self.f0_floor && *f <= self.f0_ceil)
                    .unwrap_or(0.0)
            };
            result.push(freq);
        }

        let voiced = result.iter().filter(|f| **f > 0.0).count();
        tracing::debug!(frames, voiced, window = self.window, "f0 estimated");
        Ok(result)
    }

    fn frame_period(&self) -> f64 {
        self.frame_period
    }

    fn name(&self) -> &str {
        "mcleod"
    }

    fn fingerprint(&self) -> String {
        format!(
            "mcleod frame_period={} window={} range={}-{} power={} clarity={}",
            self.frame_period,
            self.window,
            self.f0_floor,
            self.f0_ceil,
            self.power_threshold,
            self.clarity_threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, secs: f64, rate: u32) -> Vec<f64> {
        let n = (secs * rate as f64) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn frame_count_follows_hop() {
        let vocoder = McLeodVocoder::default();
        let f0 = vocoder.f0(&vec![0.0; 16000], 16000).unwrap();
        assert_eq!(f0.len(), 200);
    }

    #[test]
    fn silence_is_unvoiced() {
        let f0 = McLeodVocoder::default().f0(&vec![0.0; 8000], 16000).unwrap();
        assert!(f0.iter().all(|f| *f == 0.0));
    }

    #[test]
    fn steady_tone_is_detected() {
        let f0 = McLeodVocoder::default()
            .f0(&sine(220.0, 0.5, 16000), 16000)
            .unwrap();
        let middle = &f0[20..80];
        let detected = middle.iter().filter(|f| (**f - 220.0).abs() < 5.0).count();
        assert!(
            detected * 10 >= middle.len() * 9,
            "only {detected}/{} frames near 220 Hz: {middle:?}",
            middle.len()
        );
    }

    #[test]
    fn tones_outside_range_are_rejected() {
        let vocoder = McLeodVocoder::default().with_range(500.0, 800.0);
        let f0 = vocoder.f0(&sine(440.0, 0.3, 16000), 16000).unwrap();
        assert!(f0[10..50].iter().all(|f| *f == 0.0));
    }

    #[test]
    fn empty_audio_gives_no_frames() {
        assert!(McLeodVocoder::default().f0(&[], 16000).unwrap().is_empty());
    }

    #[test]
    fn zero_hop_is_an_error() {
        let result = McLeodVocoder::default().f0(&[0.0; 10], 100);
        assert!(matches!(result, Err(TalkseqError::Vocoder { .. })));
    }

    #[test]
    fn fingerprint_covers_every_setting() {
        let base = McLeodVocoder::default();
        let tuned = [
            base.clone().with_thresholds(0.1, 0.6),
            base.clone().with_thresholds(0.0, 0.8),
            base.clone().with_range(60.0, defaults::VOCODER_F0_CEIL_HZ),
            McLeodVocoder {
                window: base.window * 2,
                ..base.clone()
            },
            McLeodVocoder {
                frame_period: 0.01,
                ..base.clone()
            },
        ];
        for vocoder in &tuned {
            assert_ne!(vocoder.fingerprint(), base.fingerprint());
        }
        assert_eq!(base.fingerprint(), McLeodVocoder::default().fingerprint());
    }
}
