//! Command-line interface for callstitch
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Rebuild two-party stereo call recordings from per-turn speaker clips
#[derive(Parser, Debug)]
#[command(
    name = "callstitch",
    version,
    about = "Rebuild two-party stereo call recordings from per-turn speaker clips"
)]
pub struct Cli {
    /// Subcommand to execute (default: run)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only report failures
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-conversation plan, -vv: per-turn durations and ffmpeg command)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options for a stitching run
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct RunArgs {
    /// Directory containing one subdirectory per conversation
    #[arg(long, short = 'i', value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory to write stereo files to
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Conversations processed in parallel (default: CPU count)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Kill ffprobe/ffmpeg after this long. Examples: 30s, 10m, 1h
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Output sample rate in Hz (default: 48000)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stitch every conversation under the input directory
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Check that ffmpeg and ffprobe are installed
    Check,

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

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Dump,
    /// Print the default configuration file path
    Path,
}
