use crate::defaults;
use crate::error::{CallstitchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub audio: AudioConfig,
    pub tools: ToolsConfig,
    pub run: RunConfig,
}

/// Input and output roots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory whose subdirectories are conversations
    pub input_dir: PathBuf,
    /// Directory the stereo artifacts are written to
    pub output_dir: PathBuf,
}

/// Output audio format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub codec: String,
    pub quality: u8,
    pub extension: String,
}

/// External tool locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Per-command time limit, e.g. "30s" or "10m". Unset means no limit.
    pub timeout: Option<String>,
}

/// Scheduling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Conversations processed at the same time
    pub jobs: usize,
    /// ffprobe processes running at once within one conversation
    pub probe_jobs: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(defaults::INPUT_DIR),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            codec: defaults::CODEC.to_string(),
            quality: defaults::QUALITY,
            extension: defaults::EXTENSION.to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG.to_string(),
            ffprobe: defaults::FFPROBE.to_string(),
            timeout: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            jobs: defaults::jobs(),
            probe_jobs: defaults::PROBE_JOBS,
        }
    }
}

impl ToolsConfig {
    /// Parsed command timeout.
    pub fn timeout_duration(&self) -> Result<Option<Duration>> {
        match self.timeout.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_timeout(text).map(Some),
        }
    }
}

/// Parse a timeout string: bare seconds or any `humantime` duration.
pub fn parse_timeout(text: &str) -> Result<Duration> {
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(text).map_err(|e| CallstitchError::ConfigInvalidValue {
        key: "tools.timeout".to_string(),
        message: e.to_string(),
    })
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CallstitchError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                CallstitchError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(CallstitchError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CALLSTITCH_INPUT_DIR → paths.input_dir
    /// - CALLSTITCH_OUTPUT_DIR → paths.output_dir
    /// - CALLSTITCH_FFMPEG → tools.ffmpeg
    /// - CALLSTITCH_FFPROBE → tools.ffprobe
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("CALLSTITCH_INPUT_DIR")
            && !dir.is_empty()
        {
            self.paths.input_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("CALLSTITCH_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.paths.output_dir = PathBuf::from(dir);
        }

        if let Ok(ffmpeg) = std::env::var("CALLSTITCH_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.tools.ffmpeg = ffmpeg;
        }

        if let Ok(ffprobe) = std::env::var("CALLSTITCH_FFPROBE")
            && !ffprobe.is_empty()
        {
            self.tools.ffprobe = ffprobe;
        }

        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| CallstitchError::ConfigInvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be positive"));
        }
        if self.audio.codec.trim().is_empty() {
            return Err(invalid("audio.codec", "must not be empty"));
        }
        if self.audio.extension.trim().is_empty() || self.audio.extension.contains('/') {
            return Err(invalid("audio.extension", "must be a plain file extension"));
        }
        if self.tools.ffmpeg.trim().is_empty() {
            return Err(invalid("tools.ffmpeg", "must not be empty"));
        }
        if self.tools.ffprobe.trim().is_empty() {
            return Err(invalid("tools.ffprobe", "must not be empty"));
        }
        if self.run.jobs == 0 {
            return Err(invalid("run.jobs", "must be at least 1"));
        }
        if self.run.probe_jobs == 0 {
            return Err(invalid("run.probe_jobs", "must be at least 1"));
        }
        self.tools.timeout_duration()?;

        Ok(())
    }

    /// Serialize to TOML for `config dump`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CallstitchError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/callstitch/config.toml on Linux, or a relative
    /// `callstitch.toml` when no config directory is known.
    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("callstitch").join("config.toml"),
            None => PathBuf::from("callstitch.toml"),
        }
    }
}
