//! Speech-to-sequence pipeline.
//!
//! Pitch analysis and segmentation share nothing, so they run on two scoped
//! threads. Both are always joined; the first reported failure wins. The
//! assembler and bend encoder then run sequentially on the joined results.

use crate::audio::AudioInput;
use crate::cache::{Artifact, ArtifactCache, inputs_digest};
use crate::contour::{ContourProcessor, ProcessedContour};
use crate::error::{Result, TalkseqError};
use crate::phonetic::PhoneticTable;
use crate::segment::{Segment, Segmenter, validate_order};
use crate::sequence::{Assembler, AssemblerConfig, BendEncoder, Sequence, TickClock};
use crate::vocoder::Vocoder;
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Settings for one generation run.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub contour: ContourProcessor,
    pub assembler: AssemblerConfig,
    pub clock: TickClock,
    pub bend: BendEncoder,
    /// Seconds added to every bend point.
    pub bend_shift: f64,
}

/// Input of [`Orchestrator::run`].
#[derive(Debug)]
pub struct GenerateRequest {
    pub audio: AudioInput,
    /// Kana transcript handed to the segmenter.
    pub text: String,
    /// Reuse and refresh intermediate artifacts here.
    pub cache: Option<ArtifactCache>,
}

impl GenerateRequest {
    pub fn new(audio: AudioInput, text: impl Into<String>) -> Self {
        Self {
            audio,
            text: text.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub sequence: Sequence,
    /// Note number every note was written at.
    pub center: i32,
    pub f0_frames: usize,
    pub segments: usize,
    pub bend_points: usize,
    /// Filter delay compensated on the note timeline, in seconds.
    pub delay: f64,
    pub elapsed: Duration,
}

/// Runs pitch analysis and segmentation, then assembles the sequence.
pub struct Orchestrator {
    vocoder: Arc<dyn Vocoder>,
    segmenter: Arc<dyn Segmenter>,
    table: &'static PhoneticTable,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(vocoder: Arc<dyn Vocoder>, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            vocoder,
            segmenter,
            table: PhoneticTable::japanese(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn run(&self, request: &GenerateRequest) -> Result<GenerateReport> {
        let started = Instant::now();
        let (error_tx, error_rx) = bounded::<TalkseqError>(2);
        let contour_done = AtomicBool::new(false);

        let (analysis, segments) = thread::scope(|s| {
            let analysis = s.spawn(|| {
                let result = self.analyze_pitch(request);
                contour_done.store(true, Ordering::SeqCst);
                report(result, &error_tx)
            });
            let segments = s.spawn(|| {
                let result = self.segment(request);
                if !contour_done.load(Ordering::SeqCst) {
                    tracing::info!("segmentation finished, waiting for pitch analysis");
                }
                report(result, &error_tx)
            });
            (
                join_branch(analysis.join(), "pitch analysis", &error_tx),
                join_branch(segments.join(), "segmentation", &error_tx),
            )
        });
        drop(error_tx);

        if let Ok(err) = error_rx.try_recv() {
            return Err(err);
        }
        let (Some((f0_frames, contour)), Some(segments)) = (analysis, segments) else {
            return Err(TalkseqError::Other(
                "pipeline branch ended without a result".to_string(),
            ));
        };

        let mut sequence = Sequence::new();
        let assembler_config = AssemblerConfig {
            note_number: contour.center,
            ..self.config.assembler.clone()
        };
        Assembler::new(self.table, &mut sequence)
            .with_config(assembler_config)
            .with_clock(self.config.clock)
            .with_time_offset(contour.delay)
            .assemble(&segments)?;

        let bend_points = self.config.bend.encode(
            &contour.notes,
            contour.center,
            contour.frame_period,
            self.config.bend_shift,
            &self.config.clock,
            &mut sequence,
        );

        let elapsed = started.elapsed();
        tracing::info!(
            notes = sequence.notes().len(),
            bend_points,
            center = contour.center,
            elapsed_ms = elapsed.as_millis() as u64,
            "sequence generated"
        );

        Ok(GenerateReport {
            center: contour.center,
            f0_frames,
            segments: segments.len(),
            bend_points,
            delay: contour.delay,
            elapsed,
            sequence,
        })
    }

    /// f0 extraction (or cache hit) followed by contour processing.
    fn analyze_pitch(&self, request: &GenerateRequest) -> Result<(usize, ProcessedContour)> {
        let cache = request.cache.as_ref();
        let inputs = inputs_digest(&[&self.vocoder.fingerprint()]);
        let f0 = match cache {
            Some(cache) if cache.is_fresh(Artifact::F0, &inputs) => cache.load_f0()?,
            _ => {
                tracing::info!(vocoder = self.vocoder.name(), "estimating f0");
                let f0 = self
                    .vocoder
                    .f0(&request.audio.samples, request.audio.sample_rate)?;
                if let Some(cache) = cache {
                    cache.store_f0(&f0, self.vocoder.frame_period(), &inputs)?;
                }
                f0
            }
        };

        let processor = ContourProcessor {
            frame_period: self.vocoder.frame_period(),
            ..self.config.contour.clone()
        };
        let contour = processor.process(&f0)?;
        Ok((f0.len(), contour))
    }

    fn segment(&self, request: &GenerateRequest) -> Result<Vec<Segment>> {
        let cache = request
            .cache
            .as_ref()
            .filter(|_| self.segmenter.cacheable());
        let inputs = inputs_digest(&[&self.segmenter.fingerprint(), &request.text]);
        if let Some(cache) = cache
            && cache.is_fresh(Artifact::Segments, &inputs)
        {
            return cache.load_segments();
        }

        tracing::info!(segmenter = self.segmenter.name(), "segmenting");
        let segments = self.segmenter.segment(&request.audio, &request.text)?;
        validate_order(&segments)?;
        if let Some(cache) = cache {
            cache.store_segments(&segments, &inputs)?;
        }
        Ok(segments)
    }
}

/// Forward a branch failure to the error channel.
fn report<T>(result: Result<T>, errors: &Sender<TalkseqError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            if errors.try_send(err).is_err() {
                tracing::warn!("error channel full, dropping branch error");
            }
            None
        }
    }
}

/// Turn a panicked branch into an error on the channel.
fn join_branch<T>(
    joined: thread::Result<Option<T>>,
    branch: &str,
    errors: &Sender<TalkseqError>,
) -> Option<T> {
    match joined {
        Ok(value) => value,
        Err(panic_info) => {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            report::<T>(
                Err(TalkseqError::Other(format!("{branch} panicked: {msg}"))),
                errors,
            )
        }
    }
}
