//! A tool for executing the 'yt-dlp' process.

use crate::error::{Error, Result};
use derive_more::Constructor;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Represents a command executor.
///
/// # Example
///
/// ```rust,no_run
/// # use std::path::PathBuf;
/// # use ytgrab_dlp::executor::Executor;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = Executor::new(PathBuf::from("yt-dlp"), vec!["--version".to_string()]);
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Constructor, Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process. Empty when stdout was streamed.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.executable_path);
        command
            .env("PYTHONIOENCODING", "UTF-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        command
    }

    /// Executes the command and returns its whole output.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be executed,
    /// or [`Error::Download`] if it exited with a non-zero code.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Executing command: {:?}", self);

        let mut child = self.command().spawn()?;

        // Both pipes are drained concurrently, stdout can carry a large JSON document.
        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stderr".to_string()))?;

        let stdout_task = tokio::spawn(read_to_string(stdout_handle));
        let stderr_task = tokio::spawn(read_to_string(stderr_handle));

        let exit_status = child.wait().await?;
        let stdout = stdout_task.await??;
        let stderr = stderr_task.await??;

        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            return Ok(ProcessOutput {
                stdout,
                stderr,
                code,
            });
        }

        Err(Error::Download(failure_message(&stderr, code)))
    }

    /// Executes the command, handing every stdout line to `on_line` as soon as it is read.
    ///
    /// The callback runs on the calling task, in the order the lines were printed.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be executed,
    /// or [`Error::Download`] if it exited with a non-zero code.
    pub async fn stream<F>(&self, mut on_line: F) -> Result<ProcessOutput>
    where
        F: FnMut(&str),
    {
        #[cfg(feature = "tracing")]
        tracing::debug!("Streaming command: {:?}", self);

        let mut child = self.command().spawn()?;

        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stdout".to_string()))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| Error::Command("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(read_to_string(stderr_handle));

        let mut reader = BufReader::new(stdout_handle);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).await? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buffer);
            on_line(line.trim_end_matches(['\r', '\n']));
        }

        let exit_status = child.wait().await?;
        let stderr = stderr_task.await??;

        let code = exit_status.code().unwrap_or(-1);
        if exit_status.success() {
            return Ok(ProcessOutput {
                stdout: String::new(),
                stderr,
                code,
            });
        }

        Err(Error::Download(failure_message(&stderr, code)))
    }
}

async fn read_to_string(handle: impl AsyncRead + Unpin) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    BufReader::new(handle).read_to_end(&mut buffer).await?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Extracts the message 'yt-dlp' printed for a failed run.
///
/// The `ERROR:` lines are preferred, then the last non-empty stderr line.
pub fn failure_message(stderr: &str, code: i32) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ERROR:"))
        .map(str::trim)
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("yt-dlp exited with code {}", code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_prefers_error_lines() {
        let stderr = "WARNING: [youtube] falling back\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            failure_message(stderr, 1),
            "[youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn failure_message_falls_back_to_last_line() {
        assert_eq!(failure_message("first\nlast\n\n", 2), "last");
        assert_eq!(failure_message("", 2), "yt-dlp exited with code 2");
    }
}
