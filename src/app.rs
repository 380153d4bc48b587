//! Command implementations.
//!
//! Wires config, collaborators and the orchestrator together:
//! recording + transcript → segments + contour → notes + bends → .vsqx

use crate::audio::AudioInput;
use crate::cache::ArtifactCache;
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::contour::LowPassCutoff;
use crate::phonetic::PhoneticTable;
use crate::pipeline::{GenerateReport, GenerateRequest, Orchestrator};
use crate::segment::{
    DictatingSegmenter, JuliusDictation, JuliusSegmenter, LabelFileSegmenter, Segmenter,
    parse_labels,
};
use crate::sequence::{Assembler, Sequence};
use crate::vsqx::{VsqxWriter, resolve_singer, singer_names};
use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fold command-line overrides into the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(singer) = &args.singer {
        config.output.singer = singer.clone();
    }
    if let Some(cutoff) = args.lpf {
        config.contour.lowpass = Some(cutoff);
    }
    if args.split_consonant {
        config.notes.split_consonant = true;
    }
    if let Some(cents) = args.transpose {
        config.contour.transpose_cents = cents;
    }
    if let Some(shift) = args.bend_shift {
        config.bend.shift = shift;
    }
}

/// Result of a `generate` run, for the summary line.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub output: PathBuf,
    pub singer: &'static str,
    pub report: GenerateReport,
}

/// Label file, plain forced alignment, or alignment preceded by dictation
/// when the transcript is blank or `--redictate` is given.
fn build_segmenter(
    config: &Config,
    args: &GenerateArgs,
    text: &str,
    work_dir: &Path,
) -> Result<Arc<dyn Segmenter>> {
    if let Some(labels) = &args.segments {
        let segmenter = LabelFileSegmenter::open(labels)
            .with_context(|| format!("Failed to read labels from {}", labels.display()))?;
        return Ok(Arc::new(segmenter));
    }
    let Some(hmm_defs) = &config.aligner.hmm_defs else {
        bail!(
            "No acoustic model configured: set aligner.hmm_defs or TALKSEQ_HMM_DEFS, \
             or pass --segments"
        );
    };
    let aligner: Arc<dyn Segmenter> = Arc::new(
        JuliusSegmenter::new(hmm_defs)
            .with_binary(&config.aligner.julius)
            .with_work_dir(work_dir),
    );
    if !args.redictate && !text.trim().is_empty() {
        return Ok(aligner);
    }

    let text_path = args.text_path();
    let Some(model) = &config.aligner.dictation_model else {
        bail!(
            "No transcript in {} and no dictation model configured: write the kana \
             transcript, or set aligner.dictation_model or TALKSEQ_DICTATION_MODEL",
            text_path.display()
        );
    };
    let dictation = JuliusDictation::new(model)
        .with_binary(&config.aligner.julius)
        .with_args(config.aligner.dictation_args.clone())
        .with_work_dir(work_dir);
    Ok(Arc::new(
        DictatingSegmenter::new(Arc::new(dictation), aligner)
            .with_transcript(text_path)
            .always(args.redictate),
    ))
}

/// Blocking body of the `generate` command.
pub fn generate(mut config: Config, args: &GenerateArgs) -> Result<GenerateOutcome> {
    apply_overrides(&mut config, args);
    config.validate()?;

    let audio = AudioInput::open(&args.audio)
        .with_context(|| format!("Failed to open {}", args.audio.display()))?;
    let text_path = args.text_path();
    let text = if !text_path.exists() {
        String::new()
    } else {
        std::fs::read_to_string(&text_path)
            .with_context(|| format!("Failed to read transcript {}", text_path.display()))?
    };

    let cache = ArtifactCache::open(&args.audio, args.recache)
        .with_context(|| format!("Failed to prepare cache for {}", args.audio.display()))?;
    let segmenter = build_segmenter(&config, args, &text, cache.dir())?;

    let orchestrator = Orchestrator::new(Arc::new(config.vocoder()), segmenter)
        .with_config(config.orchestrator_config());
    let request = GenerateRequest::new(audio, text).with_cache(cache);
    let report = orchestrator.run(&request)?;

    let singer = resolve_singer(&config.output.singer);
    let output = args.output_path();
    VsqxWriter::new(singer)
        .with_timing(config.timing.resolution, config.timing.bpm)
        .save(&report.sequence, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(GenerateOutcome {
        output,
        singer: singer.name,
        report,
    })
}

/// Run the `generate` command off the async runtime.
pub async fn run_generate(config: Config, args: GenerateArgs, quiet: bool) -> Result<()> {
    let outcome = tokio::task::spawn_blocking(move || generate(config, &args))
        .await
        .context("generate task panicked")??;

    if !quiet {
        let report = &outcome.report;
        println!("{} {}", "Wrote".green(), outcome.output.display());
        println!(
            "  {}     {}",
            "Singer:".dimmed(),
            outcome.singer
        );
        println!(
            "  {}      {} ({} segments)",
            "Notes:".dimmed(),
            report.sequence.notes().len(),
            report.segments
        );
        println!(
            "  {}      {} points around note {}",
            "Bends:".dimmed(),
            report.bend_points,
            report.center
        );
        println!(
            "  {}    {:.2}s",
            "Elapsed:".dimmed(),
            report.elapsed.as_secs_f64()
        );
    }
    Ok(())
}

/// Assemble a label file with the configured note rules.
pub fn assemble_labels(config: &Config, labels: &Path) -> Result<Sequence> {
    config.validate()?;
    let text = std::fs::read_to_string(labels)
        .with_context(|| format!("Failed to read labels from {}", labels.display()))?;
    let segments = parse_labels(&text)?;

    let mut sequence = Sequence::new();
    Assembler::new(PhoneticTable::japanese(), &mut sequence)
        .with_config(config.assembler_config())
        .with_clock(config.clock())
        .assemble(&segments)?;
    Ok(sequence)
}

/// Notes as an aligned text table.
pub fn format_note_table(sequence: &Sequence) -> String {
    let mut out = format!(
        "{:>8} {:>8} {:>6} {:>4} {:>4}  {}\n",
        "begin", "end", "dur", "note", "vel", "lyric"
    );
    for note in sequence.notes() {
        let phoneme = note
            .phoneme
            .as_deref()
            .map(|p| format!(" [{p}]"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>8} {:>8} {:>6} {:>4} {:>4}  {}{}\n",
            note.begin_tick,
            note.end_tick,
            note.duration_ticks(),
            note.note_number,
            note.velocity,
            note.lyric,
            phoneme
        ));
    }
    out
}

/// The `segments` command.
pub fn run_segments(config: &Config, audio: &Path, labels: &Path, json: bool) -> Result<()> {
    tracing::debug!(audio = %audio.display(), labels = %labels.display(), "assembling labels");
    let sequence = assemble_labels(config, labels)?;
    if json {
        println!("{}", serde_json::to_string_pretty(sequence.notes())?);
    } else {
        print!("{}", format_note_table(&sequence));
    }
    Ok(())
}

pub fn print_singers(current: &str) {
    for name in singer_names() {
        if name == current {
            println!("{} {}", "●".green(), name);
        } else {
            println!("  {}", name);
        }
    }
}

pub fn print_cutoffs() {
    for name in LowPassCutoff::names() {
        println!("{name}");
    }
}
