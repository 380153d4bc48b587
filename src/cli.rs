//! Command-line interface for talkseq
//!
//! Provides argument parsing using clap derive macros.

use crate::contour::LowPassCutoff;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Turn recorded speech into a VOCALOID3 sequence
#[derive(Parser, Debug)]
#[command(
    name = "talkseq",
    version,
    about = "Turn recorded speech into a VOCALOID3 sequence"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a low-pass cutoff name such as `1.5`.
fn parse_cutoff(s: &str) -> Result<LowPassCutoff, String> {
    s.parse::<LowPassCutoff>().map_err(|e| e.to_string())
}

/// Options of the `generate` command.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    /// Recorded speech (WAV)
    pub audio: PathBuf,

    /// Kana transcript (default: <AUDIO>.txt)
    #[arg(long, value_name = "PATH")]
    pub text: Option<PathBuf>,

    /// Use a prepared label file instead of running julius
    #[arg(long, value_name = "PATH")]
    pub segments: Option<PathBuf>,

    /// Output document (default: <AUDIO>.vsqx)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Voicebank written into the document
    #[arg(long, value_name = "NAME")]
    pub singer: Option<String>,

    /// Smooth the pitch contour with a low-pass filter (Hz)
    #[arg(long, value_name = "CUTOFF", value_parser = parse_cutoff)]
    pub lpf: Option<LowPassCutoff>,

    /// Emit every consonant as its own note
    #[arg(long)]
    pub split_consonant: bool,

    /// Transpose the contour, in cents
    #[arg(long, value_name = "CENTS", allow_hyphen_values = true)]
    pub transpose: Option<i32>,

    /// Shift pitch bends in time, in seconds
    #[arg(long, value_name = "SECONDS", allow_hyphen_values = true)]
    pub bend_shift: Option<f64>,

    /// Discard cached f0 and segments before running
    #[arg(long)]
    pub recache: bool,

    /// Recognize the transcript again and overwrite the text file
    #[arg(long, conflicts_with = "segments")]
    pub redictate: bool,
}

impl GenerateArgs {
    pub fn text_path(&self) -> PathBuf {
        self.text
            .clone()
            .unwrap_or_else(|| self.audio.with_extension("txt"))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.audio.with_extension("vsqx"))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a .vsqx document from a recording
    Generate(GenerateArgs),

    /// Assemble notes from a label file and print them
    Segments {
        /// Recorded speech (WAV); only used to locate defaults
        audio: PathBuf,

        /// Label file with one `begin end unit` record per line
        #[arg(long, value_name = "PATH")]
        segments: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List usable singers
    Singers,

    /// List low-pass filter cutoffs
    Cutoffs,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Dump,
    /// Print the configuration in effect
    Show,
    /// Print the default configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(cli: Cli) -> GenerateArgs {
        match cli.command {
            Commands::Generate(args) => args,
            other => panic!("Expected Generate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_defaults() {
        let cli = Cli::try_parse_from(["talkseq", "generate", "voice.wav"]).unwrap();
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());

        let args = generate_args(cli);
        assert_eq!(args.audio, PathBuf::from("voice.wav"));
        assert_eq!(args.text_path(), PathBuf::from("voice.txt"));
        assert_eq!(args.output_path(), PathBuf::from("voice.vsqx"));
        assert!(args.segments.is_none());
        assert!(args.singer.is_none());
        assert!(args.lpf.is_none());
        assert!(!args.split_consonant);
        assert!(!args.recache);
        assert!(!args.redictate);
    }

    #[test]
    fn test_parse_generate_with_options() {
        let cli = Cli::try_parse_from([
            "talkseq",
            "generate",
            "take1.wav",
            "--text",
            "lyrics.txt",
            "--segments",
            "take1.seg",
            "-o",
            "out.vsqx",
            "--singer",
            "IA",
            "--lpf",
            "1.5",
            "--split-consonant",
            "--transpose",
            "-1200",
            "--bend-shift",
            "-0.05",
            "--recache",
        ])
        .unwrap();

        let args = generate_args(cli);
        assert_eq!(args.text_path(), PathBuf::from("lyrics.txt"));
        assert_eq!(args.segments, Some(PathBuf::from("take1.seg")));
        assert_eq!(args.output_path(), PathBuf::from("out.vsqx"));
        assert_eq!(args.singer.as_deref(), Some("IA"));
        assert_eq!(args.lpf, Some(LowPassCutoff::Hz1_5));
        assert!(args.split_consonant);
        assert_eq!(args.transpose, Some(-1200));
        assert_eq!(args.bend_shift, Some(-0.05));
        assert!(args.recache);
    }

    #[test]
    fn test_parse_redictate() {
        let cli =
            Cli::try_parse_from(["talkseq", "generate", "voice.wav", "--redictate"]).unwrap();
        assert!(generate_args(cli).redictate);

        let result = Cli::try_parse_from([
            "talkseq",
            "generate",
            "voice.wav",
            "--redictate",
            "--segments",
            "voice.seg",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_cutoff_is_rejected() {
        let result = Cli::try_parse_from(["talkseq", "generate", "a.wav", "--lpf", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["talkseq", "-vv", "singers"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from(["talkseq", "cutoffs", "-q", "--config", "/tmp/c.toml"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Cutoffs));
    }

    #[test]
    fn test_parse_segments_command() {
        let cli =
            Cli::try_parse_from(["talkseq", "segments", "a.wav", "--segments", "a.seg", "--json"])
                .unwrap();
        match cli.command {
            Commands::Segments {
                audio,
                segments,
                json,
            } => {
                assert_eq!(audio, PathBuf::from("a.wav"));
                assert_eq!(segments, PathBuf::from("a.seg"));
                assert!(json);
            }
            other => panic!("Expected Segments, got {other:?}"),
        }
    }

    #[test]
    fn test_segments_requires_label_file() {
        assert!(Cli::try_parse_from(["talkseq", "segments", "a.wav"]).is_err());
    }

    #[test]
    fn test_parse_config_dump() {
        let cli = Cli::try_parse_from(["talkseq", "config", "dump"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Dump
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["talkseq", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_missing_command_returns_error() {
        assert!(Cli::try_parse_from(["talkseq"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["talkseq", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
