//! Clip duration lookup.

use crate::error::{CallstitchError, Result};
use crate::media::executor::CommandExecutor;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;

/// Resolves the playback duration of a clip in seconds.
#[async_trait]
pub trait DurationResolver: Send + Sync {
    /// Returns a positive, finite duration or `DurationUnavailable`.
    async fn duration(&self, clip: &Path) -> Result<f64>;
}

/// Duration resolver backed by `ffprobe`.
pub struct FfprobeResolver<E: CommandExecutor> {
    executor: E,
    binary: String,
}

impl<E: CommandExecutor> FfprobeResolver<E> {
    pub fn new(executor: E, binary: impl Into<String>) -> Self {
        Self {
            executor,
            binary: binary.into(),
        }
    }

    fn args(clip: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(clip.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl<E: CommandExecutor> DurationResolver for FfprobeResolver<E> {
    async fn duration(&self, clip: &Path) -> Result<f64> {
        let unavailable = |message: String| CallstitchError::DurationUnavailable {
            path: clip.display().to_string(),
            message,
        };

        let stdout = self
            .executor
            .execute(&self.binary, &Self::args(clip))
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        parse_seconds(&stdout)
            .ok_or_else(|| unavailable(format!("ffprobe output: \"{}\"", stdout.trim())))
    }
}

/// Parse probe output into a positive, finite number of seconds.
pub fn parse_seconds(output: &str) -> Option<f64> {
    output
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}
