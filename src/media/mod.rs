//! External media tools: process execution, duration probing, merging.

pub mod executor;
pub mod ffmpeg;
pub mod merge;
pub mod probe;

pub use executor::{CommandExecutor, SystemCommandExecutor};
pub use ffmpeg::EncoderSettings;
pub use merge::{FfmpegMerger, MergeExecutor};
pub use probe::{DurationResolver, FfprobeResolver};
