//! Transcript recovery with a julius dictation kit.
//!
//! When a recording comes without a transcript, a large-vocabulary julius
//! model recognizes it first. The recognized phone sequence is written back
//! as hiragana, one line per utterance, and forced alignment then runs on
//! that text as usual.

use crate::audio::AudioInput;
use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::phonetic::phones_to_kana;
use crate::segment::julius::{center_name, default_work_dir, run_julius, write_wav};
use crate::segment::{Segment, Segmenter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PHONE_SEQUENCE: &str = "phseq1:";
const WORD_BOUNDARY: &str = "|";

/// Speech-to-text for recordings without a transcript.
pub trait Dictation: Send + Sync {
    /// Recognize `audio` and return hiragana, one utterance per line.
    fn dictate(&self, audio: &AudioInput) -> Result<String>;

    fn name(&self) -> &str;

    fn fingerprint(&self) -> String {
        self.name().to_string()
    }
}

/// Phone sequences of every recognized utterance in julius output.
pub fn parse_dictation(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix(PHONE_SEQUENCE))
        .map(|phones| {
            phones
                .split_whitespace()
                .filter(|p| *p != WORD_BOUNDARY)
                .map(|p| center_name(p).to_string())
                .collect()
        })
        .collect()
}

/// Hiragana transcript of julius dictation output, or an error when nothing
/// was recognized.
pub fn dictation_text(output: &str) -> Result<String> {
    let lines: Vec<String> = parse_dictation(output)
        .iter()
        .map(|phones| {
            let phones: Vec<&str> = phones.iter().map(String::as_str).collect();
            phones_to_kana(&phones)
        })
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(TalkseqError::Dictation {
            message: "no recognizable speech in the recording".to_string(),
        });
    }
    Ok(lines.join("\n"))
}

/// Dictation with a julius kit described by its main `.jconf`.
#[derive(Debug, Clone)]
pub struct JuliusDictation {
    binary: PathBuf,
    jconf: PathBuf,
    args: Vec<String>,
    work_dir: Option<PathBuf>,
}

impl JuliusDictation {
    pub fn new(jconf: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(defaults::JULIUS_BIN),
            jconf: jconf.into(),
            args: Vec::new(),
            work_dir: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Extra julius arguments. Values starting with `./` are taken relative
    /// to the directory of the jconf.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    fn kit_dir(&self) -> &Path {
        self.jconf.parent().unwrap_or_else(|| Path::new("."))
    }

    fn command_args(&self) -> Vec<OsString> {
        let kit = self.kit_dir();
        let mut args: Vec<OsString> = vec!["-C".into(), self.jconf.clone().into()];
        args.extend(self.args.iter().map(|arg| match arg.strip_prefix("./") {
            Some(relative) => kit.join(relative).into_os_string(),
            None => OsString::from(arg),
        }));
        args
    }
}

impl Dictation for JuliusDictation {
    fn dictate(&self, audio: &AudioInput) -> Result<String> {
        let dir = self.work_dir.clone().unwrap_or_else(default_work_dir);
        std::fs::create_dir_all(&dir)?;
        let wav = dir.join("dictate.wav");
        write_wav(audio, &wav)?;

        tracing::info!(jconf = %self.jconf.display(), "dictating transcript");
        let stdout = run_julius(&self.binary, &self.command_args(), &wav)?;
        let text = dictation_text(&stdout)?;
        tracing::debug!(lines = text.lines().count(), "dictation parsed");
        Ok(text)
    }

    fn name(&self) -> &str {
        "julius-dictation"
    }

    fn fingerprint(&self) -> String {
        format!(
            "julius-dictation jconf={} args={}",
            self.jconf.display(),
            self.args.join(" ")
        )
    }
}

/// Segmenter that fills in a missing transcript by dictation before
/// delegating to the aligner.
pub struct DictatingSegmenter {
    dictation: Arc<dyn Dictation>,
    inner: Arc<dyn Segmenter>,
    transcript: Option<PathBuf>,
    always: bool,
}

impl DictatingSegmenter {
    pub fn new(dictation: Arc<dyn Dictation>, inner: Arc<dyn Segmenter>) -> Self {
        Self {
            dictation,
            inner,
            transcript: None,
            always: false,
        }
    }

    /// File the recognized text is written to.
    pub fn with_transcript(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript = Some(path.into());
        self
    }

    /// Dictate even when a transcript is present.
    pub fn always(mut self, always: bool) -> Self {
        self.always = always;
        self
    }
}

impl Segmenter for DictatingSegmenter {
    fn segment(&self, audio: &AudioInput, text: &str) -> Result<Vec<Segment>> {
        if !self.always && !text.trim().is_empty() {
            return self.inner.segment(audio, text);
        }

        let dictated = self.dictation.dictate(audio)?;
        if let Some(path) = &self.transcript {
            std::fs::write(path, format!("{dictated}\n"))?;
            tracing::info!(path = %path.display(), "transcript written");
        }
        self.inner.segment(audio, &dictated)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    // A forced redictation may change the text behind the cached key.
    fn cacheable(&self) -> bool {
        !self.always && self.inner.cacheable()
    }

    fn fingerprint(&self) -> String {
        format!(
            "{} dictation={}",
            self.inner.fingerprint(),
            self.dictation.fingerprint()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const SAMPLE_OUTPUT: &str = "\
STAT: include config
sentence1: こんにちは 。
wseq1: <s> こんにちは </s>
phseq1: silB | k o N n i ch i w a | silE
cmscore1: 1.000 0.998 1.000
sentence1: そうですね
phseq1: silB | s o: | d e s u | n e | silE
";

    /// Dictation returning fixed text.
    struct FixedDictation(&'static str);

    impl Dictation for FixedDictation {
        fn dictate(&self, _audio: &AudioInput) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Segmenter that records the text it was asked to align.
    #[derive(Default)]
    struct RecordingSegmenter {
        texts: Mutex<Vec<String>>,
    }

    impl Segmenter for RecordingSegmenter {
        fn segment(&self, _audio: &AudioInput, text: &str) -> Result<Vec<Segment>> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(vec![Segment::new(0.0, 0.1, "a")])
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn audio() -> AudioInput {
        AudioInput::from_samples(vec![0.0; 1600], 16000)
    }

    #[test]
    fn phone_sequences_are_parsed_per_utterance() {
        let utterances = parse_dictation(SAMPLE_OUTPUT);
        assert_eq!(utterances.len(), 2);
        assert_eq!(
            utterances[0],
            ["silB", "k", "o", "N", "n", "i", "ch", "i", "w", "a", "silE"]
        );
        assert_eq!(utterances[1][1..3], ["s", "o:"]);
    }

    #[test]
    fn dictation_output_becomes_kana_lines() {
        assert_eq!(
            dictation_text(SAMPLE_OUTPUT).unwrap(),
            "こんにちわ\nそーですね"
        );
    }

    #[test]
    fn context_dependent_names_are_reduced() {
        let utterances = parse_dictation("phseq1: silB | k+a k-a+N a-N | silE\n");
        assert_eq!(utterances[0], ["silB", "k", "a", "N", "silE"]);
    }

    #[test]
    fn silent_recording_is_a_dictation_error() {
        let err = dictation_text("STAT: include config\nphseq1: silB | silE\n").unwrap_err();
        match err {
            TalkseqError::Dictation { message } => {
                assert_eq!(message, "no recognizable speech in the recording")
            }
            other => panic!("Expected Dictation error, got {other:?}"),
        }
    }

    #[test]
    fn kit_relative_arguments_are_resolved() {
        let dictation = JuliusDictation::new("/opt/kit/main.jconf")
            .with_args(["-C", "./am-dnn.jconf", "-demo", "-dnnconf", "./julius.dnnconf"]);
        let args: Vec<String> = dictation
            .command_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-C",
                "/opt/kit/main.jconf",
                "-C",
                "/opt/kit/am-dnn.jconf",
                "-demo",
                "-dnnconf",
                "/opt/kit/julius.dnnconf"
            ]
        );
    }

    #[test]
    fn missing_binary_reports_aligner_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let dictation = JuliusDictation::new(dir.path().join("main.jconf"))
            .with_binary(dir.path().join("no-such-julius"))
            .with_work_dir(dir.path());

        let err = dictation.dictate(&audio()).unwrap_err();
        assert!(matches!(err, TalkseqError::AlignerNotFound { .. }), "{err:?}");
        assert!(dir.path().join("dictate.wav").exists());
    }

    #[test]
    fn blank_transcript_is_dictated_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("voice.txt");
        let inner = Arc::new(RecordingSegmenter::default());
        let segmenter = DictatingSegmenter::new(Arc::new(FixedDictation("かな")), inner.clone())
            .with_transcript(&txt);

        segmenter.segment(&audio(), " \n").unwrap();

        assert_eq!(*inner.texts.lock().unwrap(), ["かな"]);
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "かな\n");
        assert!(segmenter.cacheable());
    }

    #[test]
    fn existing_transcript_skips_dictation() {
        let inner = Arc::new(RecordingSegmenter::default());
        let segmenter = DictatingSegmenter::new(Arc::new(FixedDictation("かな")), inner.clone());

        segmenter.segment(&audio(), "そら").unwrap();

        assert_eq!(*inner.texts.lock().unwrap(), ["そら"]);
    }

    #[test]
    fn forced_redictation_replaces_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("voice.txt");
        std::fs::write(&txt, "そら\n").unwrap();
        let inner = Arc::new(RecordingSegmenter::default());
        let segmenter = DictatingSegmenter::new(Arc::new(FixedDictation("かな")), inner.clone())
            .with_transcript(&txt)
            .always(true);

        segmenter.segment(&audio(), "そら").unwrap();

        assert_eq!(*inner.texts.lock().unwrap(), ["かな"]);
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "かな\n");
        assert!(!segmenter.cacheable());
    }

    #[test]
    fn fingerprint_names_both_stages() {
        let segmenter = DictatingSegmenter::new(
            Arc::new(FixedDictation("かな")),
            Arc::new(RecordingSegmenter::default()),
        );
        assert_eq!(segmenter.fingerprint(), "recording dictation=fixed");
        assert_eq!(segmenter.name(), "recording");
    }
}
