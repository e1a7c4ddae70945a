//! Error types for callstitch.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallstitchError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Run-level errors
    #[error("Input directory not found: {path}")]
    InputDirNotFound { path: String },

    #[error("No conversation directories found in {path}")]
    NoConversations { path: String },

    // Conversation errors
    #[error("Conversation has no turns")]
    EmptyConversation,

    #[error("Channel timelines are misaligned: agent has {agent} segments, customer has {customer}")]
    MisalignedTimelines { agent: usize, customer: usize },

    #[error("Channel timelines disagree at turn {index}: agent {agent}, customer {customer}")]
    MisalignedSegment {
        index: usize,
        agent: String,
        customer: String,
    },

    #[error("Could not read duration for {path}: {message}")]
    DurationUnavailable { path: String, message: String },

    #[error("Merge failed: {message}")]
    MergeExecutionFailed { message: String },

    // External tool errors
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{command} failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{command} timed out after {}", human(.timeout))]
    CommandTimedOut { command: String, timeout: Duration },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

fn human(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

pub type Result<T> = std::result::Result<T, CallstitchError>;
