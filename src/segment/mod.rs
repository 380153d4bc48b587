//! Time-aligned phone segments and the aligners that produce them.

pub mod dictation;
pub mod julius;
pub mod label;

pub use dictation::{DictatingSegmenter, Dictation, JuliusDictation, parse_dictation};
pub use julius::{JuliusSegmenter, parse_alignment};
pub use label::{LabelFileSegmenter, parse_labels, write_labels};

use crate::audio::AudioInput;
use crate::error::{Result, TalkseqError};
use serde::{Deserialize, Serialize};

/// One phone of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Seconds from the start of the recording.
    pub begin_time: f64,
    pub end_time: f64,
    /// Phone label, e.g. `k`, `a`, `a:`, `silB`.
    pub unit: String,
    /// Aligner score, when the aligner reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Segment {
    pub fn new(begin_time: f64, end_time: f64, unit: impl Into<String>) -> Self {
        Self {
            begin_time,
            end_time,
            unit: unit.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.begin_time
    }
}

/// Produces an ordered segment list for a recording and its transcript.
pub trait Segmenter: Send + Sync {
    fn segment(&self, audio: &AudioInput, text: &str) -> Result<Vec<Segment>>;

    /// Name for logging.
    fn name(&self) -> &str;

    /// Whether results may be stored in the artifact cache.
    fn cacheable(&self) -> bool {
        true
    }

    /// Settings that change the alignment, used to key cached segments.
    fn fingerprint(&self) -> String {
        self.name().to_string()
    }
}

/// Checks that begin times never go backwards.
pub fn validate_order(segments: &[Segment]) -> Result<()> {
    for (index, pair) in segments.windows(2).enumerate() {
        if pair[1].begin_time < pair[0].begin_time {
            return Err(TalkseqError::SegmentOrder {
                index: index + 1,
                begin_time: pair[1].begin_time,
                previous: pair[0].begin_time,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmenter_is_object_safe() {
        let _s: Box<dyn Segmenter> = Box::new(LabelFileSegmenter::from_segments(Vec::new()));
    }

    #[test]
    fn sorted_segments_pass_validation() {
        let segments = vec![
            Segment::new(0.0, 0.1, "silB"),
            Segment::new(0.1, 0.1, "k"),
            Segment::new(0.1, 0.3, "a"),
        ];
        assert!(validate_order(&segments).is_ok());
        assert!(validate_order(&[]).is_ok());
    }

    #[test]
    fn first_backwards_segment_is_reported() {
        let segments = vec![
            Segment::new(0.0, 0.1, "silB"),
            Segment::new(0.2, 0.3, "k"),
            Segment::new(0.15, 0.3, "a"),
            Segment::new(0.1, 0.3, "i"),
        ];
        match validate_order(&segments) {
            Err(TalkseqError::SegmentOrder {
                index,
                begin_time,
                previous,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(begin_time, 0.15);
                assert_eq!(previous, 0.2);
            }
            other => panic!("expected SegmentOrder, got {other:?}"),
        }
    }

    #[test]
    fn duration_and_score() {
        let seg = Segment::new(0.25, 0.5, "a").with_score(-12.5);
        assert_eq!(seg.duration(), 0.25);
        assert_eq!(seg.score, Some(-12.5));
    }
}
