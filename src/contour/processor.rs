//! Raw f0 frames to a smooth note-number contour on the bend grid.

use crate::contour::fir::{self, LowPassCutoff};
use crate::defaults;
use crate::error::{Result, TalkseqError};
use serde::{Deserialize, Serialize};

/// Value given to unvoiced frames before the first voiced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LeadingFill {
    /// The reference pitch (A3, 440 Hz).
    #[default]
    Reference,
    /// The first voiced frequency in the series.
    FirstVoiced,
}

/// Replace unvoiced frames (below `floor` or not finite) with the most
/// recent voiced frequency.
pub fn interpolate(f0: &[f64], floor: f64, fill: LeadingFill) -> Vec<f64> {
    let voiced = |f: f64| f.is_finite() && f >= floor;
    let mut last = match fill {
        LeadingFill::Reference => defaults::A3_FREQ,
        LeadingFill::FirstVoiced => f0
            .iter()
            .copied()
            .find(|f| voiced(*f))
            .unwrap_or(defaults::A3_FREQ),
    };
    f0.iter()
        .map(|&f| {
            if voiced(f) {
                last = f;
            }
            last
        })
        .collect()
}

/// Continuous note number of a frequency (A3 = 440 Hz = 69).
pub fn freq_to_note(freq: f64) -> f64 {
    12.0 * (freq / defaults::A3_FREQ).log2() + defaults::A3_NOTE
}

pub fn transpose(series: &mut [f64], semitones: f64) {
    if semitones != 0.0 {
        for v in series.iter_mut() {
            *v += semitones;
        }
    }
}

/// `round((max + min) / 2)`; A3 for an empty series.
pub fn note_center(series: &[f64]) -> i32 {
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min.is_finite() && max.is_finite() {
        ((max + min) / 2.0).round() as i32
    } else {
        defaults::A3_NOTE as i32
    }
}

/// Linear upsampling by an integer factor. Output length is
/// `(n - 1) * factor + 1`; the last sample is kept exactly.
pub fn resample(series: &[f64], factor: usize) -> Vec<f64> {
    let factor = factor.max(1);
    let Some(&last) = series.last() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity((series.len() - 1) * factor + 1);
    for pair in series.windows(2) {
        let (begin, end) = (pair[0], pair[1]);
        for j in 0..factor {
            out.push((begin * (factor - j) as f64 + end * j as f64) / factor as f64);
        }
    }
    out.push(last);
    out
}

/// Output of [`ContourProcessor::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedContour {
    /// Note numbers on the fine grid.
    pub notes: Vec<f64>,
    pub center: i32,
    /// Seconds by which `notes` lag the source timeline.
    pub delay: f64,
    /// Seconds between consecutive `notes`.
    pub frame_period: f64,
}

/// Contour pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourProcessor {
    pub frame_period: f64,
    pub f0_floor: f64,
    pub leading_fill: LeadingFill,
    pub transpose: f64,
    pub resample_rate: usize,
    pub lowpass: Option<LowPassCutoff>,
    pub fir_taps: usize,
}

impl Default for ContourProcessor {
    fn default() -> Self {
        Self {
            frame_period: defaults::F0_FRAME_PERIOD,
            f0_floor: defaults::F0_FLOOR_HZ,
            leading_fill: LeadingFill::default(),
            transpose: 0.0,
            resample_rate: defaults::RESAMPLE_RATE,
            lowpass: None,
            fir_taps: defaults::FIR_TAPS,
        }
    }
}

impl ContourProcessor {
    pub fn with_lowpass(mut self, cutoff: Option<LowPassCutoff>) -> Self {
        self.lowpass = cutoff;
        self
    }

    pub fn with_transpose(mut self, semitones: f64) -> Self {
        self.transpose = semitones;
        self
    }

    /// Seconds between samples after resampling.
    pub fn fine_period(&self) -> f64 {
        self.frame_period / self.resample_rate.max(1) as f64
    }

    pub fn process(&self, raw_f0: &[f64]) -> Result<ProcessedContour> {
        if raw_f0.is_empty() {
            return Err(TalkseqError::ContourInput {
                message: "empty f0 series".to_string(),
            });
        }
        if self.frame_period.is_nan() || self.frame_period <= 0.0 {
            return Err(TalkseqError::ContourInput {
                message: format!("frame period must be positive, got {}", self.frame_period),
            });
        }

        let voiced = raw_f0
            .iter()
            .filter(|f| f.is_finite() && **f >= self.f0_floor)
            .count();

        let mut notes: Vec<f64> = interpolate(raw_f0, self.f0_floor, self.leading_fill)
            .into_iter()
            .map(freq_to_note)
            .collect();
        transpose(&mut notes, self.transpose);
        let center = note_center(&notes);

        let fine_period = self.fine_period();
        let mut notes = resample(&notes, self.resample_rate);
        let mut delay = 0.0;
        if let Some(cutoff) = self.lowpass {
            let kernel = fir::design_lowpass(cutoff, 1.0 / fine_period, self.fir_taps);
            notes = fir::convolve(&notes, &kernel);
            delay = fir::group_delay(&kernel) as f64 * fine_period;
        }

        tracing::debug!(
            frames = raw_f0.len(),
            voiced,
            center,
            samples = notes.len(),
            delay,
            "contour processed"
        );

        Ok(ProcessedContour {
            notes,
            center,
            delay,
            frame_period: fine_period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_voiced_series_is_unchanged() {
        let f0 = [220.0, 230.5, 250.0, 100.0, 410.0];
        for fill in [LeadingFill::Reference, LeadingFill::FirstVoiced] {
            assert_eq!(interpolate(&f0, 100.0, fill), f0);
        }
    }

    #[test]
    fn gaps_hold_the_last_voiced_value() {
        let f0 = [0.0, 0.0, 200.0, 0.0, 50.0, 300.0, 0.0];
        assert_eq!(
            interpolate(&f0, 100.0, LeadingFill::Reference),
            [440.0, 440.0, 200.0, 200.0, 200.0, 300.0, 300.0]
        );
        assert_eq!(
            interpolate(&f0, 100.0, LeadingFill::FirstVoiced),
            [200.0, 200.0, 200.0, 200.0, 200.0, 300.0, 300.0]
        );
    }

    #[test]
    fn all_unvoiced_falls_back_to_reference() {
        let f0 = [0.0, f64::NAN, 10.0];
        for fill in [LeadingFill::Reference, LeadingFill::FirstVoiced] {
            assert_eq!(interpolate(&f0, 100.0, fill), [440.0, 440.0, 440.0]);
        }
    }

    #[test]
    fn freq_to_note_uses_a3_reference() {
        assert!((freq_to_note(440.0) - 69.0).abs() < 1e-12);
        assert!((freq_to_note(880.0) - 81.0).abs() < 1e-12);
        assert!((freq_to_note(220.0) - 57.0).abs() < 1e-12);
        assert!((freq_to_note(261.625_565) - 60.0).abs() < 1e-6);
    }

    #[test]
    fn center_is_rounded_midpoint() {
        assert_eq!(note_center(&[57.0, 64.2, 60.0]), 61);
        assert_eq!(note_center(&[60.0]), 60);
        assert_eq!(note_center(&[]), 69);
    }

    #[test]
    fn resample_keeps_both_endpoints() {
        let series = [1.0, 3.0, 2.0, 7.5];
        for n in 1..8 {
            let out = resample(&series, n);
            assert_eq!(out.len(), (series.len() - 1) * n + 1);
            assert_eq!(out[0], series[0]);
            assert_eq!(*out.last().unwrap(), series[3]);
        }
    }

    #[test]
    fn resample_interpolates_linearly() {
        assert_eq!(resample(&[0.0, 4.0], 4), [0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(resample(&[5.0], 5), [5.0]);
        assert!(resample(&[], 5).is_empty());
        assert_eq!(resample(&[1.0, 2.0], 0), [1.0, 2.0], "factor 0 acts as 1");
    }

    #[test]
    fn transpose_shifts_every_sample() {
        let mut s = vec![60.0, 61.5];
        transpose(&mut s, -0.25);
        assert_eq!(s, [59.75, 61.25]);
    }

    #[test]
    fn process_rejects_empty_input() {
        let err = ContourProcessor::default().process(&[]).unwrap_err();
        assert!(matches!(err, TalkseqError::ContourInput { .. }));
    }

    #[test]
    fn process_without_filter_has_no_delay() {
        let f0 = [220.0, 440.0, 880.0];
        let contour = ContourProcessor::default().process(&f0).unwrap();

        assert_eq!(contour.notes.len(), 11);
        assert_eq!(contour.center, 69);
        assert_eq!(contour.delay, 0.0);
        assert!((contour.frame_period - 0.001).abs() < 1e-12);
        assert!((contour.notes[0] - 57.0).abs() < 1e-9);
        assert!((contour.notes[10] - 81.0).abs() < 1e-9);
    }

    #[test]
    fn transpose_moves_center() {
        let f0 = [440.0; 4];
        let contour = ContourProcessor::default()
            .with_transpose(2.0)
            .process(&f0)
            .unwrap();
        assert_eq!(contour.center, 71);
        assert!((contour.notes[0] - 71.0).abs() < 1e-9);
    }

    #[test]
    fn filtering_records_group_delay() {
        let f0 = vec![440.0; 400];
        let contour = ContourProcessor::default()
            .with_lowpass(Some(LowPassCutoff::Hz2_0))
            .process(&f0)
            .unwrap();

        let resampled = (400 - 1) * 5 + 1;
        assert_eq!(contour.notes.len(), resampled + 1105 - 1);
        assert!((contour.delay - 0.552).abs() < 1e-9, "delay {}", contour.delay);
        let settled = contour.notes[1500];
        assert!((settled - 69.0).abs() < 1e-6, "got {settled}");
    }
}
