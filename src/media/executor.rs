//! External command execution with testable seams.
//!
//! `CommandExecutor` is the only place callstitch spawns processes. The probe
//! and merge layers take it as a generic so tests can record calls and queue
//! responses without ffmpeg installed.

use crate::error::{CallstitchError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Trait for executing external commands.
///
/// Object-safe, Send + Sync so one executor can be shared by concurrent
/// conversations.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` with `args` and return its stdout.
    ///
    /// Arguments are OS strings so paths reach the tool byte for byte.
    /// Returns an error if the command cannot be spawned, exits unsuccessfully
    /// or exceeds the executor's timeout.
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String>;
}

/// Production executor backed by `tokio::process`.
///
/// The child is killed if the timeout elapses or the future is dropped.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Abort commands that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String> {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let spawned = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
                CallstitchError::CommandTimedOut {
                    command: command.to_string(),
                    timeout: limit,
                }
            })?,
            None => child.await,
        };

        let output = spawned.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CallstitchError::ToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                CallstitchError::Other(format!("Failed to execute {}: {}", command, e))
            }
        })?;

        if !output.status.success() {
            return Err(CallstitchError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockCommandExecutor;
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_command_executor_is_object_safe() {
        let _executor: Box<dyn CommandExecutor> = Box::new(MockCommandExecutor::new());
    }

    #[test]
    fn test_command_executor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn CommandExecutor>>();
    }

    #[test]
    fn test_with_timeout_sets_limit() {
        let executor = SystemCommandExecutor::new().with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(executor.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(SystemCommandExecutor::new().timeout(), None);
    }

    #[tokio::test]
    async fn test_mock_executor_records_calls_and_replays_responses() {
        let mock = MockCommandExecutor::new()
            .with_response("1.5\n")
            .with_error(CallstitchError::ToolNotFound {
                tool: "ffprobe".to_string(),
            });

        assert_eq!(mock.execute("ffprobe", &args(&["a"])).await.unwrap(), "1.5\n");
        assert!(matches!(
            mock.execute("ffprobe", &args(&["b"])).await,
            Err(CallstitchError::ToolNotFound { .. })
        ));
        assert_eq!(mock.execute("ffmpeg", &[]).await.unwrap(), "");

        let calls = mock.calls();
        assert_eq!(mock.call_count(), 3);
        assert_eq!(calls[0], ("ffprobe".to_string(), vec!["a".to_string()]));
        assert_eq!(calls[2].0, "ffmpeg");
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let executor = SystemCommandExecutor::new();
        let result = executor
            .execute("callstitch-definitely-not-installed", &[])
            .await;
        assert!(matches!(result, Err(CallstitchError::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_command_failed() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("false", &[]).await;
        assert!(matches!(result, Err(CallstitchError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_returned() {
        let executor = SystemCommandExecutor::new();
        let out = executor.execute("echo", &args(&["3.25"])).await.unwrap();
        assert_eq!(out.trim(), "3.25");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_slow_command() {
        let executor =
            SystemCommandExecutor::new().with_timeout(Some(Duration::from_millis(100)));
        let result = executor.execute("sleep", &args(&["5"])).await;
        match result {
            Err(error @ CallstitchError::CommandTimedOut { .. }) => {
                assert_eq!(error.to_string(), "sleep timed out after 100ms");
            }
            other => panic!("Expected CommandTimedOut, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_argument_is_passed_unchanged() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"caf\xe9_agent.mp3".to_vec());
        let executor = SystemCommandExecutor::new();
        let out = executor
            .execute(
                "sh",
                &[
                    OsString::from("-c"),
                    OsString::from("printf %s \"$1\" | wc -c"),
                    OsString::from("sh"),
                    raw,
                ],
            )
            .await
            .unwrap();
        // 14 raw bytes; a lossy conversion would have sent 16.
        assert_eq!(out.trim(), "14");
    }
}
