//! Execution of a compiled merge graph.

use crate::conversation::graph::MergeGraph;
use crate::error::{CallstitchError, Result};
use crate::media::executor::CommandExecutor;
use crate::media::ffmpeg::{EncoderSettings, encode_filter_complex, ffmpeg_args};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Runs a merge graph and writes one stereo artifact.
#[async_trait]
pub trait MergeExecutor: Send + Sync {
    /// `inputs[i]` is the clip for `ClipId(i)`. Any failure is reported as
    /// `MergeExecutionFailed` and leaves no file at `output`.
    async fn merge(&self, graph: &MergeGraph, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Merge executor backed by `ffmpeg`.
///
/// The filtergraph is written to a temporary script file for each merge and
/// removed once ffmpeg exits.
pub struct FfmpegMerger<E: CommandExecutor> {
    executor: E,
    binary: String,
    encoder: EncoderSettings,
    verbose: bool,
}

impl<E: CommandExecutor> FfmpegMerger<E> {
    pub fn new(executor: E, binary: impl Into<String>, encoder: EncoderSettings) -> Self {
        Self {
            executor,
            binary: binary.into(),
            encoder,
            verbose: false,
        }
    }

    /// Print the full ffmpeg command line before each merge.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The full command line this merger would run, for diagnostics.
    pub fn command_line(
        &self,
        graph: &MergeGraph,
        script: &Path,
        inputs: &[PathBuf],
        output: &Path,
    ) -> String {
        let args: Vec<String> = ffmpeg_args(graph, script, inputs, output, &self.encoder)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        format!("{} {}", self.binary, args.join(" "))
    }
}

#[async_trait]
impl<E: CommandExecutor> MergeExecutor for FfmpegMerger<E> {
    async fn merge(&self, graph: &MergeGraph, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.len() != graph.clip_count() {
            return Err(CallstitchError::MergeExecutionFailed {
                message: format!(
                    "graph reads {} clips but {} inputs were given",
                    graph.clip_count(),
                    inputs.len()
                ),
            });
        }

        let script = write_filter_script(graph).map_err(|e| {
            CallstitchError::MergeExecutionFailed {
                message: format!("Could not write filtergraph script: {}", e),
            }
        })?;

        if self.verbose {
            eprintln!(
                "  {}",
                self.command_line(graph, script.path(), inputs, output)
            );
        }
        let args = ffmpeg_args(graph, script.path(), inputs, output, &self.encoder);
        if let Err(e) = self.executor.execute(&self.binary, &args).await {
            discard_partial(output);
            return Err(CallstitchError::MergeExecutionFailed {
                message: e.to_string(),
            });
        }

        Ok(())
    }
}

/// Write the encoded graph to a fresh temporary file.
fn write_filter_script(graph: &MergeGraph) -> std::io::Result<NamedTempFile> {
    let mut script = tempfile::Builder::new()
        .prefix("callstitch-")
        .suffix(".filtergraph")
        .tempfile()?;
    script.write_all(encode_filter_complex(graph).as_bytes())?;
    script.flush()?;
    Ok(script)
}

/// Remove a half-written artifact after a failed merge.
fn discard_partial(output: &Path) {
    if let Err(e) = std::fs::remove_file(output)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        eprintln!(
            "Could not remove partial output {}: {}",
            output.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::graph::compile;
    use crate::conversation::timeline::Timelines;
    use crate::conversation::turn::{Role, Turn};
    use crate::media::executor::SystemCommandExecutor;
    use crate::media::executor::mock::MockCommandExecutor;
    use std::ffi::OsString;
    use std::fs;
    use std::sync::Mutex;

    fn graph_and_inputs() -> (MergeGraph, Vec<PathBuf>) {
        let turns = vec![
            Turn {
                sort_key: "001".to_string(),
                role: Role::Agent,
                path: PathBuf::from("/c/001_agent.mp3"),
                duration: 1.0,
            },
            Turn {
                sort_key: "002".to_string(),
                role: Role::Customer,
                path: PathBuf::from("/c/002_customer.mp3"),
                duration: 2.0,
            },
        ];
        let graph = compile(&Timelines::build(&turns).unwrap(), 48000).unwrap();
        let inputs = turns.into_iter().map(|t| t.path).collect();
        (graph, inputs)
    }

    #[tokio::test]
    async fn test_merge_runs_ffmpeg_once() {
        let (graph, inputs) = graph_and_inputs();
        let merger = FfmpegMerger::new(MockCommandExecutor::new(), "ffmpeg", EncoderSettings::default());

        merger
            .merge(&graph, &inputs, Path::new("/out/x_stereo.mp3"))
            .await
            .unwrap();

        let calls = merger.executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        assert_eq!(calls[0].1.first().map(String::as_str), Some("-y"));
        assert_eq!(
            calls[0].1.last().map(String::as_str),
            Some("/out/x_stereo.mp3")
        );
    }

    #[tokio::test]
    async fn test_merge_failure_is_reported_and_partial_output_removed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("partial_stereo.mp3");
        fs::write(&output, b"half an mp3").unwrap();

        let (graph, inputs) = graph_and_inputs();
        let merger = FfmpegMerger::new(
            MockCommandExecutor::new().with_error(CallstitchError::CommandFailed {
                command: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Conversion failed!".to_string(),
            }),
            "ffmpeg",
            EncoderSettings::default(),
        );

        match merger.merge(&graph, &inputs, &output).await {
            Err(CallstitchError::MergeExecutionFailed { message }) => {
                assert!(message.contains("Conversion failed!"));
            }
            other => panic!("Expected MergeExecutionFailed, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_merge_rejects_input_count_mismatch() {
        let (graph, mut inputs) = graph_and_inputs();
        inputs.pop();
        let merger = FfmpegMerger::new(MockCommandExecutor::new(), "ffmpeg", EncoderSettings::default());

        let result = merger.merge(&graph, &inputs, Path::new("out.mp3")).await;
        assert!(matches!(
            result,
            Err(CallstitchError::MergeExecutionFailed { .. })
        ));
        assert_eq!(merger.executor.call_count(), 0);
    }

    #[test]
    fn test_command_line_starts_with_binary() {
        let (graph, inputs) = graph_and_inputs();
        let merger = FfmpegMerger::new(MockCommandExecutor::new(), "/usr/bin/ffmpeg", EncoderSettings::default());
        let line = merger.command_line(&graph, Path::new("/tmp/g"), &inputs, Path::new("o.mp3"));
        assert!(line.starts_with("/usr/bin/ffmpeg -y -i /c/001_agent.mp3"));
        assert!(line.contains("-filter_complex_script /tmp/g -map [st]"));
        assert!(line.ends_with("-q:a 2 o.mp3"));
    }

    /// Reads the filtergraph script while "ffmpeg" is running.
    #[derive(Default)]
    struct ScriptReader {
        seen: Mutex<Vec<(PathBuf, String)>>,
    }

    #[async_trait]
    impl CommandExecutor for ScriptReader {
        async fn execute(&self, _command: &str, args: &[OsString]) -> Result<String> {
            let flag = args
                .iter()
                .position(|a| a == "-filter_complex_script")
                .unwrap();
            let path = PathBuf::from(&args[flag + 1]);
            let text = fs::read_to_string(&path).unwrap();
            self.seen.lock().unwrap().push((path, text));
            Ok(String::new())
        }
    }

    fn long_conversation(turn_count: usize) -> (MergeGraph, Vec<PathBuf>) {
        let turns: Vec<Turn> = (0..turn_count)
            .map(|i| Turn {
                sort_key: format!("{:04}", i),
                role: if i % 2 == 0 { Role::Agent } else { Role::Customer },
                path: PathBuf::from(format!("/c/{:04}.mp3", i)),
                duration: 1.25,
            })
            .collect();
        let graph = compile(&Timelines::build(&turns).unwrap(), 48000).unwrap();
        let inputs = turns.into_iter().map(|t| t.path).collect();
        (graph, inputs)
    }

    #[tokio::test]
    async fn test_filtergraph_is_passed_as_script_and_cleaned_up() {
        let (graph, inputs) = long_conversation(1000);
        let merger = FfmpegMerger::new(ScriptReader::default(), "ffmpeg", EncoderSettings::default());

        merger
            .merge(&graph, &inputs, Path::new("/out/long_stereo.mp3"))
            .await
            .unwrap();

        let seen = merger.executor.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, text) = &seen[0];
        assert_eq!(text, &encode_filter_complex(&graph));
        assert!(!path.exists(), "script should be removed after the merge");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_thousand_turn_merge_fits_in_argument_limits() {
        let (graph, inputs) = long_conversation(1000);
        let merger = FfmpegMerger::new(SystemCommandExecutor::new(), "true", EncoderSettings::default());

        let result = merger
            .merge(&graph, &inputs, Path::new("/nonexistent/long_stereo.mp3"))
            .await;
        assert!(result.is_ok(), "{:?}", result);
    }
}
