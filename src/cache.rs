//! Per-recording cache of intermediate artifacts.
//!
//! `voice.wav` gets a sibling directory `voice.tlo/` holding the raw f0
//! series and the segment labels, so a rerun can skip pitch estimation and
//! alignment. The directory is wiped whenever the recording's content hash
//! changes.
//!
//! Each artifact also carries a `<file>.inputs` digest of everything else it
//! was computed from (estimator settings, transcript). An artifact whose
//! digest differs from the current one is stale and gets recomputed.

use crate::defaults;
use crate::error::{Result, TalkseqError};
use crate::segment::{Segment, parse_labels, write_labels};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const MANIFEST: &str = "source.sha256";

/// Kind of cached artifact; doubles as the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    F0,
    Segments,
}

impl Artifact {
    fn extension(self) -> &'static str {
        match self {
            Artifact::F0 => "f0",
            Artifact::Segments => "seg",
        }
    }
}

/// Digest of the non-audio inputs of an artifact.
pub fn inputs_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Hex sha256 of a file's content.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
    name: String,
    source_modified: SystemTime,
}

impl ArtifactCache {
    /// Prepare the cache directory next to `audio_path`.
    ///
    /// The directory is removed first when `recache` is set or when the
    /// recorded hash no longer matches the recording.
    pub fn open(audio_path: &Path, recache: bool) -> Result<Self> {
        let dir = audio_path.with_extension(defaults::CACHE_DIR_EXTENSION);
        let name = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| TalkseqError::Other(format!("no file name in {}", audio_path.display())))?;
        let source_modified = fs::metadata(audio_path)?.modified()?;
        let digest = file_sha256(audio_path)?;

        let manifest = dir.join(MANIFEST);
        if dir.exists() {
            let recorded = fs::read_to_string(&manifest).unwrap_or_default();
            if recache {
                tracing::info!(dir = %dir.display(), "clearing cache on request");
                fs::remove_dir_all(&dir)?;
            } else if recorded.trim() != digest {
                tracing::info!(dir = %dir.display(), "recording changed, clearing cache");
                fs::remove_dir_all(&dir)?;
            }
        }
        fs::create_dir_all(&dir)?;
        fs::write(&manifest, format!("{digest}\n"))?;

        Ok(Self {
            dir,
            name,
            source_modified,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.name, artifact.extension()))
    }

    fn inputs_path(&self, artifact: Artifact) -> PathBuf {
        self.dir
            .join(format!("{}.{}.inputs", self.name, artifact.extension()))
    }

    /// Whether the artifact exists, is non-empty, is not older than the
    /// recording and was computed from `inputs`.
    pub fn is_fresh(&self, artifact: Artifact, inputs: &str) -> bool {
        let Ok(meta) = fs::metadata(self.path(artifact)) else {
            return false;
        };
        if meta.len() == 0 {
            return false;
        }
        let current = meta
            .modified()
            .map(|modified| modified >= self.source_modified)
            .unwrap_or(false);
        if !current {
            return false;
        }
        let recorded = fs::read_to_string(self.inputs_path(artifact)).unwrap_or_default();
        if recorded.trim() != inputs {
            tracing::debug!(artifact = ?artifact, "inputs changed, artifact is stale");
            return false;
        }
        true
    }

    fn store(&self, artifact: Artifact, contents: String, inputs: &str) -> Result<()> {
        fs::write(self.path(artifact), contents)?;
        fs::write(self.inputs_path(artifact), format!("{inputs}\n"))?;
        Ok(())
    }

    /// Raw f0 per frame, as `"<seconds>: <hz>"` lines.
    pub fn load_f0(&self) -> Result<Vec<f64>> {
        let path = self.path(Artifact::F0);
        let text = fs::read_to_string(&path)?;
        let mut series = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = line
                .split_once(':')
                .and_then(|(_, f0)| f0.trim().parse::<f64>().ok())
                .ok_or_else(|| TalkseqError::ContourInput {
                    message: format!("{} line {}: {:?}", path.display(), line_no + 1, line),
                })?;
            series.push(value);
        }
        tracing::debug!(frames = series.len(), "loaded cached f0");
        Ok(series)
    }

    pub fn store_f0(&self, f0: &[f64], frame_period: f64, inputs: &str) -> Result<()> {
        let text: String = f0
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.7}: {:.2}\n", i as f64 * frame_period, v))
            .collect();
        self.store(Artifact::F0, text, inputs)
    }

    pub fn load_segments(&self) -> Result<Vec<Segment>> {
        let text = fs::read_to_string(self.path(Artifact::Segments))?;
        let segments = parse_labels(&text)?;
        tracing::debug!(segments = segments.len(), "loaded cached segments");
        Ok(segments)
    }

    pub fn store_segments(&self, segments: &[Segment], inputs: &str) -> Result<()> {
        self.store(Artifact::Segments, write_labels(segments), inputs)
    }
}
