//! Windowed-sinc low-pass filters for smoothing the pitch contour.

use crate::error::{Result, TalkseqError};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Available low-pass cutoffs, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LowPassCutoff {
    Hz0_5,
    Hz1_0,
    Hz1_5,
    Hz2_0,
    Hz2_5,
    Hz3_0,
}

impl LowPassCutoff {
    pub const ALL: [LowPassCutoff; 6] = [
        LowPassCutoff::Hz0_5,
        LowPassCutoff::Hz1_0,
        LowPassCutoff::Hz1_5,
        LowPassCutoff::Hz2_0,
        LowPassCutoff::Hz2_5,
        LowPassCutoff::Hz3_0,
    ];

    pub fn hz(&self) -> f64 {
        match self {
            LowPassCutoff::Hz0_5 => 0.5,
            LowPassCutoff::Hz1_0 => 1.0,
            LowPassCutoff::Hz1_5 => 1.5,
            LowPassCutoff::Hz2_0 => 2.0,
            LowPassCutoff::Hz2_5 => 2.5,
            LowPassCutoff::Hz3_0 => 3.0,
        }
    }

    /// Names accepted on the command line and in the config file.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.to_string()).collect()
    }
}

impl fmt::Display for LowPassCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.hz())
    }
}

impl FromStr for LowPassCutoff {
    type Err = TalkseqError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let value: f64 = trimmed.parse().map_err(|_| TalkseqError::UnknownCutoff {
            value: s.to_string(),
        })?;
        Self::ALL
            .iter()
            .copied()
            .find(|c| (c.hz() - value).abs() < 1e-9)
            .ok_or_else(|| TalkseqError::UnknownCutoff {
                value: s.to_string(),
            })
    }
}

impl serde::Serialize for LowPassCutoff {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for LowPassCutoff {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hamming-windowed sinc low-pass with unit gain at DC.
///
/// `taps` is forced odd so the kernel has a center sample.
pub fn design_lowpass(cutoff: LowPassCutoff, sample_rate: f64, taps: usize) -> Vec<f64> {
    let taps = if taps % 2 == 0 { taps + 1 } else { taps };
    let m = (taps - 1) as f64 / 2.0;
    let fc = cutoff.hz() / sample_rate;

    let mut kernel: Vec<f64> = (0..taps)
        .map(|n| {
            let x = n as f64 - m;
            let sinc = if x == 0.0 {
                2.0 * fc
            } else {
                (2.0 * PI * fc * x).sin() / (PI * x)
            };
            let window = if taps == 1 {
                1.0
            } else {
                0.54 - 0.46 * (2.0 * PI * n as f64 / (taps - 1) as f64).cos()
            };
            sinc * window
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    if sum.abs() > f64::EPSILON {
        for k in &mut kernel {
            *k /= sum;
        }
    }
    kernel
}

/// Full linear convolution; output length is `signal + kernel - 1`.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; signal.len() + kernel.len() - 1];
    for (i, s) in signal.iter().enumerate() {
        for (j, k) in kernel.iter().enumerate() {
            out[i + j] += s * k;
        }
    }
    out
}

/// Group delay of a symmetric kernel, in samples.
pub fn group_delay(kernel: &[f64]) -> usize {
    kernel.len().saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs_parse_from_their_names() {
        for name in ["0.5", "1.0", "1.5", "2.0", "2.5", "3.0"] {
            let cutoff: LowPassCutoff = name.parse().unwrap();
            assert_eq!(cutoff.to_string(), name);
        }
        assert_eq!("1".parse::<LowPassCutoff>().unwrap(), LowPassCutoff::Hz1_0);
        assert_eq!(" 2.50 ".parse::<LowPassCutoff>().unwrap(), LowPassCutoff::Hz2_5);
    }

    #[test]
    fn unknown_cutoff_is_rejected() {
        for bad in ["0.7", "abc", "", "-1.0"] {
            assert!(
                matches!(bad.parse::<LowPassCutoff>(), Err(TalkseqError::UnknownCutoff { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn names_are_listed_in_ascending_order() {
        assert_eq!(
            LowPassCutoff::names(),
            ["0.5", "1.0", "1.5", "2.0", "2.5", "3.0"]
        );
    }

    #[test]
    fn kernel_is_symmetric_with_unit_dc_gain() {
        let kernel = design_lowpass(LowPassCutoff::Hz2_0, 1000.0, 1105);
        assert_eq!(kernel.len(), 1105);
        let sum: f64 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-12);
        }
        assert_eq!(group_delay(&kernel), 552);
    }

    #[test]
    fn even_tap_count_is_made_odd() {
        assert_eq!(design_lowpass(LowPassCutoff::Hz1_0, 200.0, 220).len(), 221);
    }

    #[test]
    fn constant_signal_passes_through_after_settling() {
        let kernel = design_lowpass(LowPassCutoff::Hz3_0, 200.0, 221);
        let signal = vec![60.0; 1000];
        let out = convolve(&signal, &kernel);
        assert_eq!(out.len(), 1000 + 221 - 1);
        let mid = out[500];
        assert!((mid - 60.0).abs() < 1e-6, "got {mid}");
    }

    #[test]
    fn fast_wobble_is_attenuated() {
        let rate = 200.0;
        let kernel = design_lowpass(LowPassCutoff::Hz1_0, rate, 221);
        let signal: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 20.0 * i as f64 / rate).sin())
            .collect();
        let out = convolve(&signal, &kernel);
        let peak = out[500..1500].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak < 0.01, "20 Hz wobble leaked through: {peak}");
    }

    #[test]
    fn convolve_with_identity_kernel_delays_nothing() {
        assert_eq!(convolve(&[1.0, 2.0, 3.0], &[1.0]), [1.0, 2.0, 3.0]);
        assert!(convolve(&[], &[1.0]).is_empty());
    }
}
