//! Plain-text label files: one `begin end unit [score]` record per line.

use crate::audio::AudioInput;
use crate::error::{Result, TalkseqError};
use crate::segment::{Segment, Segmenter};
use std::path::{Path, PathBuf};

/// Parse label text. Blank lines and `#` comments are skipped.
pub fn parse_labels(text: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let bad = |what: &str| TalkseqError::Segmenter {
            message: format!("label line {}: {}: {:?}", line_no + 1, what, line),
        };

        let mut fields = line.split_whitespace();
        let begin_time = fields
            .next()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| bad("invalid begin time"))?;
        let end_time = fields
            .next()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| bad("invalid end time"))?;
        let unit = fields.next().ok_or_else(|| bad("missing unit"))?;
        let score = match fields.next() {
            Some(f) => Some(f.parse::<f64>().map_err(|_| bad("invalid score"))?),
            None => None,
        };
        if fields.next().is_some() {
            return Err(bad("too many fields"));
        }

        segments.push(Segment {
            begin_time,
            end_time,
            unit: unit.to_string(),
            score,
        });
    }
    Ok(segments)
}

/// Render segments in the label format (`%.7f %.7f %s`).
pub fn write_labels(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|seg| format!("{:.7} {:.7} {}\n", seg.begin_time, seg.end_time, seg.unit))
        .collect()
}

/// Segmenter that replays a prepared label list.
#[derive(Debug, Clone)]
pub struct LabelFileSegmenter {
    segments: Vec<Segment>,
    source: Option<PathBuf>,
}

impl LabelFileSegmenter {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let segments = parse_labels(&text)?;
        tracing::debug!(path = %path.display(), segments = segments.len(), "loaded labels");
        Ok(Self {
            segments,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            source: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl Segmenter for LabelFileSegmenter {
    fn segment(&self, _audio: &AudioInput, _text: &str) -> Result<Vec<Segment>> {
        Ok(self.segments.clone())
    }

    fn name(&self) -> &str {
        "labels"
    }

    // The label file is the source of truth; a cached copy could go stale.
    fn cacheable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_skips_comments() {
        let text = "# aligned by hand\n\
                    0.0000000 0.1000000 silB\n\
                    \n\
                    0.1 0.15 k -21.5\n\
                    0.15\t0.25  a\n";
        let segments = parse_labels(text).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::new(0.0, 0.1, "silB"));
        assert_eq!(segments[1].score, Some(-21.5));
        assert_eq!(segments[2].unit, "a");
        assert_eq!(segments[2].end_time, 0.25);
    }

    #[test]
    fn malformed_lines_name_the_line() {
        for (text, what) in [
            ("0.1 x a", "invalid end time"),
            ("0.1 0.2", "missing unit"),
            ("0.1 0.2 a nope", "invalid score"),
            ("0.1 0.2 a 1 2", "too many fields"),
        ] {
            let err = parse_labels(&format!("\n{text}")).unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("label line 2"), "{msg}");
            assert!(msg.contains(what), "{msg}");
        }
    }

    #[test]
    fn written_labels_read_back() {
        let segments = vec![
            Segment::new(0.0125, 0.0575, "silB"),
            Segment::new(0.0575, 0.1, "k"),
        ];
        let text = write_labels(&segments);

        assert_eq!(text, "0.0125000 0.0575000 silB\n0.0575000 0.1000000 k\n");
        assert_eq!(parse_labels(&text).unwrap(), segments);
    }

    #[test]
    fn label_segmenter_ignores_audio_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.seg");
        std::fs::write(&path, "0 0.1 a\n").unwrap();

        let segmenter = LabelFileSegmenter::open(&path).unwrap();
        let audio = AudioInput::from_samples(Vec::new(), 16000);

        assert_eq!(segmenter.source(), Some(path.as_path()));
        assert_eq!(segmenter.name(), "labels");
        assert!(!segmenter.cacheable());
        assert_eq!(
            segmenter.segment(&audio, "ignored").unwrap(),
            [Segment::new(0.0, 0.1, "a")]
        );
    }
}
