//! callstitch - rebuild two-party stereo call recordings
//!
//! Takes a directory of per-turn, single-speaker clips and writes one stereo
//! file with the agent on the left channel and the customer on the right,
//! padding each channel with silence while the other party speaks.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod conversation;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod media;
#[cfg(feature = "cli")]
pub mod output;
pub mod processor;
pub mod report;
pub mod runner;

// Timeline core
pub use conversation::{MergeGraph, MergeStep, Role, Segment, Timelines, Turn, compile};

// External tool seams
pub use media::{CommandExecutor, DurationResolver, MergeExecutor, SystemCommandExecutor};

// Orchestration
pub use processor::{ConversationProcessor, ProcessorSettings};
pub use report::{ConversationOutcome, OutcomeStatus, RunReport};

// Error handling
pub use error::{CallstitchError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
