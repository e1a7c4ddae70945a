use anyhow::{Context, Result};
use callstitch::cli::{Cli, Commands, ConfigAction, RunArgs};
use callstitch::config::Config;
use callstitch::diagnostics::check_dependencies;
use callstitch::media::{EncoderSettings, FfmpegMerger, FfprobeResolver, SystemCommandExecutor};
use callstitch::output::{print_outcome, print_summary};
use callstitch::processor::{ConversationProcessor, ProcessorSettings};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref(), &cli.run)?;
            run_command(config, cli.run.json, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Run { args }) => {
            let config = load_config(cli.config.as_deref(), &args)?;
            run_command(config, args.json, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref(), &cli.run)?;
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Dump => {
                let config = load_config(cli.config.as_deref(), &cli.run)?;
                print!("{}", config.to_toml()?);
            }
            ConfigAction::Path => {
                println!("{}", Config::default_path().display());
            }
        },
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "callstitch", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order (later wins):
/// 1. Built-in defaults
/// 2. Config file (--config, or ~/.config/callstitch/config.toml if present)
/// 3. Environment variables
/// 4. Command-line flags
fn load_config(custom_path: Option<&std::path::Path>, args: &RunArgs) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let default_path = Config::default_path();
            Config::load_or_default(&default_path)
                .with_context(|| format!("Failed to load config from {}", default_path.display()))?
        }
    };

    let mut config = config.with_env_overrides();
    if let Some(input) = &args.input {
        config.paths.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.paths.output_dir = output.clone();
    }
    if let Some(jobs) = args.jobs {
        config.run.jobs = jobs;
    }
    if let Some(timeout) = &args.timeout {
        config.tools.timeout = Some(timeout.clone());
    }
    if let Some(sample_rate) = args.sample_rate {
        config.audio.sample_rate = sample_rate;
    }

    config.validate()?;
    Ok(config)
}

/// Stitch every conversation and exit non-zero if any of them failed.
async fn run_command(config: Config, json: bool, quiet: bool, verbose: u8) -> Result<()> {
    let executor = SystemCommandExecutor::new().with_timeout(config.tools.timeout_duration()?);
    let resolver = FfprobeResolver::new(executor.clone(), config.tools.ffprobe.clone());
    let merger = FfmpegMerger::new(
        executor,
        config.tools.ffmpeg.clone(),
        EncoderSettings {
            codec: config.audio.codec.clone(),
            quality: config.audio.quality,
        },
    )
    .with_verbose(verbose >= 2);
    let processor = Arc::new(ConversationProcessor::new(
        resolver,
        merger,
        ProcessorSettings {
            sample_rate: config.audio.sample_rate,
            output_dir: config.paths.output_dir.clone(),
            extension: config.audio.extension.clone(),
            probe_jobs: config.run.probe_jobs,
            verbose,
        },
    ));

    if verbose >= 1 {
        eprintln!(
            "{} {} → {} ({} jobs, {} Hz)",
            "callstitch".bold(),
            config.paths.input_dir.display(),
            config.paths.output_dir.display(),
            config.run.jobs,
            config.audio.sample_rate
        );
    }

    let report = callstitch::runner::run(
        &config.paths.input_dir,
        processor,
        config.run.jobs,
        |outcome| {
            if !json {
                print_outcome(outcome, quiet);
            }
        },
    )
    .await?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report, quiet);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
