use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use talkseq::app::{print_cutoffs, print_singers, run_generate, run_segments};
use talkseq::cli::{Cli, Commands, ConfigAction};
use talkseq::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Generate(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_generate(config, args, cli.quiet).await?;
        }
        Commands::Segments {
            audio,
            segments,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_segments(&config, &audio, &segments, json)?;
        }
        Commands::Singers => {
            let config = load_config(cli.config.as_deref())?;
            print_singers(&config.output.singer);
        }
        Commands::Cutoffs => {
            print_cutoffs();
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "talkseq",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/talkseq/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else if let Some(default_path) = Config::default_path() {
        Config::load_or_default(&default_path)?
    } else {
        Config::default()
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            print!("{}", toml::to_string(&Config::default())?);
        }
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string(&config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .or_else(Config::default_path);
            match path {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("Could not determine config directory"),
            }
        }
    }
    Ok(())
}
