//! Default configuration constants for callstitch.
//!
//! Shared between the config layer, the graph compiler and the ffmpeg encoder
//! so the three never disagree about formats.

/// Default output sample rate in Hz.
///
/// Every speech clip is resampled to this rate and every silence gap is
/// generated at it, so the two channels concatenate without drift.
pub const SAMPLE_RATE: u32 = 48000;

/// Sample format every speech clip is converted to before concatenation.
pub const SAMPLE_FORMAT: &str = "s16";

/// Decimal places used when writing silence durations into the filter graph.
///
/// Microseconds, matching ffmpeg's internal time base for durations.
pub const SILENCE_DURATION_DECIMALS: usize = 6;

/// Default audio encoder for the stereo artifact.
pub const CODEC: &str = "libmp3lame";

/// Default VBR quality passed as `-q:a` (0 = best, 9 = worst for LAME).
pub const QUALITY: u8 = 2;

/// Default output file extension.
pub const EXTENSION: &str = "mp3";

/// Extension a clip must carry to be considered a turn.
pub const CLIP_EXTENSION: &str = "mp3";

/// Default ffmpeg binary.
pub const FFMPEG: &str = "ffmpeg";

/// Default ffprobe binary.
pub const FFPROBE: &str = "ffprobe";

/// Default input root, relative to the working directory.
pub const INPUT_DIR: &str = "audio";

/// Default output root, relative to the working directory.
pub const OUTPUT_DIR: &str = "out";

/// Suffix appended to the conversation id in output file names.
pub const OUTPUT_SUFFIX: &str = "stereo";

/// Timestamp layout used as output file name prefix (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// ffprobe processes run at once for one conversation.
///
/// Each child holds a few pipes, so an unbounded fan-out over a long
/// conversation exhausts the open-file limit.
pub const PROBE_JOBS: usize = 8;

/// Number of conversations processed concurrently when not configured.
pub fn jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
