//! Forced alignment with the external `julius` recognizer.
//!
//! The transcript is turned into a one-word-per-line dictionary and a
//! linear grammar, julius runs with `-palign`, and the phoneme alignment
//! block of its output becomes the segment list.

use crate::audio::AudioInput;
use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::phonetic::transcript_to_words;
use crate::segment::{Segment, Segmenter};
use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const FRAME_SHIFT: f64 = 0.01;
const FRAME_SIZE: f64 = 0.025;
const ALIGN_OFFSET: f64 = FRAME_SIZE / 2.0;

const ALIGN_BEGIN: &str = "=== begin forced alignment ===";
const ALIGN_END: &str = "=== end forced alignment ===";

/// Recognizer dictionary: `"{i} [w_{i}] {phones}"` per word.
pub fn dictionary(words: &[String]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| format!("{i} [w_{i}] {word}\n"))
        .collect()
}

/// Linear grammar accepting exactly the words in order.
pub fn linear_dfa(word_count: usize) -> String {
    let last = word_count.saturating_sub(1);
    let mut out: String = (0..word_count)
        .map(|i| format!("{} {} {} 0 {}\n", i, last - i, i + 1, u8::from(i == 0)))
        .collect();
    out.push_str(&format!("{} -1 -1 1 0\n", word_count));
    out
}

/// Reduce a context-dependent model name to its center phone
/// (`a-k+i` → `k`, `N_e` → `N`).
pub fn center_name(name: &str) -> &str {
    let mut s = name;
    if let Some(i) = s.find('-') {
        s = &s[i + 1..];
    }
    if let Some(i) = s.rfind('+') {
        s = &s[..i];
    }
    if let Some(i) = s.find('_') {
        s = &s[..i];
    }
    s
}

/// Extract phoneme segments from julius `-palign` output.
pub fn parse_alignment(output: &str) -> Result<Vec<Segment>> {
    let Some(start) = output.find(ALIGN_BEGIN) else {
        return Err(TalkseqError::Segmenter {
            message: "julius output has no forced alignment block".to_string(),
        });
    };
    let block = &output[start + ALIGN_BEGIN.len()..];
    let block = block.find(ALIGN_END).map_or(block, |end| &block[..end]);

    let mut segments = Vec::new();
    for line in block.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('[') else {
            continue;
        };
        let Some((frames, tail)) = rest.split_once(']') else {
            continue;
        };
        let mut frames = frames.split_whitespace().map(str::parse::<i64>);
        let (Some(Ok(begin)), Some(Ok(end))) = (frames.next(), frames.next()) else {
            continue;
        };
        let mut tail = tail.split_whitespace();
        let (Some(score), Some(unit)) = (tail.next(), tail.next()) else {
            continue;
        };

        segments.push(Segment {
            begin_time: begin as f64 * FRAME_SHIFT + ALIGN_OFFSET,
            end_time: (end + 1) as f64 * FRAME_SHIFT + ALIGN_OFFSET + FRAME_SIZE,
            unit: center_name(unit).to_string(),
            score: score.parse().ok(),
        });
    }

    if segments.is_empty() {
        return Err(TalkseqError::Segmenter {
            message: "forced alignment block holds no phoneme rows".to_string(),
        });
    }
    Ok(segments)
}

/// Segmenter backed by the julius command-line recognizer.
#[derive(Debug, Clone)]
pub struct JuliusSegmenter {
    binary: PathBuf,
    hmm_defs: PathBuf,
    work_dir: Option<PathBuf>,
}

impl JuliusSegmenter {
    pub fn new(hmm_defs: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(defaults::JULIUS_BIN),
            hmm_defs: hmm_defs.into(),
            work_dir: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Directory for the dictionary, grammar and WAV handed to julius.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(default_work_dir)
    }
}

pub(crate) fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join(format!("talkseq-{}", std::process::id()))
}

/// 16-bit mono WAV at the source rate, the input format julius reads.
pub(crate) fn write_wav(audio: &AudioInput, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let audio_err = |e: hound::Error| TalkseqError::Audio {
        message: format!("Failed to write {}: {}", path.display(), e),
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(audio_err)?;
    for s in &audio.samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
        writer.write_sample(v).map_err(audio_err)?;
    }
    writer.finalize().map_err(audio_err)
}

/// Run julius with `args` in file-input mode, feeding `wav` on stdin, and
/// return its stdout.
pub(crate) fn run_julius(binary: &Path, args: &[OsString], wav: &Path) -> Result<String> {
    let tool = binary.display().to_string();
    let mut child = Command::new(binary)
        .args(args)
        .args(["-input", "file"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TalkseqError::AlignerNotFound { tool: tool.clone() }
            } else {
                TalkseqError::Segmenter {
                    message: format!("Failed to execute {}: {}", tool, e),
                }
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        writeln!(stdin, "{}", wav.display())?;
    }
    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TalkseqError::Segmenter {
            message: format!(
                "{} failed with status {:?}: {}",
                tool,
                output.status.code(),
                stderr.trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl Segmenter for JuliusSegmenter {
    fn segment(&self, audio: &AudioInput, text: &str) -> Result<Vec<Segment>> {
        let words = transcript_to_words(text);
        if words.len() <= 2 {
            return Err(TalkseqError::Segmenter {
                message: "transcript is empty".to_string(),
            });
        }

        let dir = self.work_dir();
        std::fs::create_dir_all(&dir)?;
        let dict = dir.join("align.dict");
        let dfa = dir.join("align.dfa");
        std::fs::write(&dict, dictionary(&words))?;
        std::fs::write(&dfa, linear_dfa(words.len()))?;

        // julius wants 16-bit mono at the analysis rate, whatever the source was.
        let wav = dir.join("align.wav");
        write_wav(audio, &wav)?;

        tracing::info!(
            words = words.len(),
            wav = %wav.display(),
            "running forced alignment"
        );
        let args: Vec<OsString> = vec![
            "-h".into(),
            self.hmm_defs.clone().into(),
            "-dfa".into(),
            dfa.into(),
            "-v".into(),
            dict.into(),
            "-palign".into(),
        ];
        let stdout = run_julius(&self.binary, &args, &wav)?;
        let segments = parse_alignment(&stdout)?;
        tracing::debug!(segments = segments.len(), "alignment parsed");
        Ok(segments)
    }

    fn name(&self) -> &str {
        "julius"
    }

    fn fingerprint(&self) -> String {
        format!(
            "julius binary={} hmm_defs={}",
            self.binary.display(),
            self.hmm_defs.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "\
STAT: include config
pass1_best: <s> w_1 </s>
=== begin forced alignment ===
-- phoneme alignment --
 id: from  to    n_score    unit
 ----------------------------------------
[   0   9]  -23.891525  silB
[  10  14]  -24.305178  k+a
[  15  29]  -21.113400  k-a+N
[  30  34]  -22.000000  a-N
[  35  49]  -20.500000  silE
re-computed AM score: -2155.1
=== end forced alignment ===
";

    #[test]
    fn dictionary_numbers_every_word() {
        let words: Vec<String> = ["silB", "k a N", "silE"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            dictionary(&words),
            "0 [w_0] silB\n1 [w_1] k a N\n2 [w_2] silE\n"
        );
    }

    #[test]
    fn dfa_chains_words_in_order() {
        assert_eq!(
            linear_dfa(3),
            "0 2 1 0 1\n1 1 2 0 0\n2 0 3 0 0\n3 -1 -1 1 0\n"
        );
    }

    #[test]
    fn center_name_strips_context() {
        assert_eq!(center_name("a-k+i"), "k");
        assert_eq!(center_name("k+a"), "k");
        assert_eq!(center_name("a-N"), "N");
        assert_eq!(center_name("silB"), "silB");
        assert_eq!(center_name("N_e"), "N");
    }

    #[test]
    fn alignment_block_becomes_segments() {
        let segments = parse_alignment(SAMPLE_OUTPUT).unwrap();

        let units: Vec<&str> = segments.iter().map(|s| s.unit.as_str()).collect();
        assert_eq!(units, ["silB", "k", "a", "N", "silE"]);

        let k = &segments[1];
        assert!((k.begin_time - 0.1125).abs() < 1e-9);
        assert!((k.end_time - (0.15 + 0.0125 + 0.025)).abs() < 1e-9);
        assert_eq!(k.score, Some(-24.305178));
    }

    #[test]
    fn missing_block_is_an_error() {
        let err = parse_alignment("pass1_best: w_1\n").unwrap_err();
        assert!(matches!(err, TalkseqError::Segmenter { .. }));

        let err = parse_alignment("=== begin forced alignment ===\n=== end forced alignment ===\n")
            .unwrap_err();
        assert!(err.to_string().contains("no phoneme rows"));
    }

    #[test]
    fn missing_binary_reports_aligner_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let segmenter = JuliusSegmenter::new(dir.path().join("hmmdefs"))
            .with_binary(dir.path().join("no-such-julius"))
            .with_work_dir(dir.path());
        let audio = AudioInput::from_samples(vec![0.0; 1600], 16000);

        let err = segmenter.segment(&audio, "かな").unwrap_err();
        assert!(matches!(err, TalkseqError::AlignerNotFound { .. }), "{err:?}");
        assert!(dir.path().join("align.dict").exists());
        assert!(dir.path().join("align.wav").exists());
    }

    #[test]
    fn empty_transcript_is_rejected_before_running() {
        let segmenter = JuliusSegmenter::new("hmmdefs").with_binary("/nonexistent/julius");
        let audio = AudioInput::from_samples(Vec::new(), 16000);
        let err = segmenter.segment(&audio, "\n  \n").unwrap_err();
        assert!(err.to_string().contains("transcript is empty"));
    }
}
