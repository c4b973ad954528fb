//! Child process execution with timeouts

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Errors running a local tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process did not exit in time and was killed
    #[error("Scan timed out after {0:?}")]
    Timeout(Duration),

    /// The process could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Work-directory preparation or result collection failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured output of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, -1 if terminated by a signal
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout, or stderr when stdout is empty
    pub fn text(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Run `program` with `args`, killing it if it outlives `timeout`
pub async fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput, ToolError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    tracing::debug!("Running {} {}", program, args.join(" "));
    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?,
        // Dropping the output future kills the child
        Err(_) => return Err(ToolError::Timeout(timeout)),
    };

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Whether `program` is installed and answers `args` successfully
pub async fn probe(program: &str, args: &[&str], timeout: Duration) -> bool {
    match run_command(program, args, None, timeout).await {
        Ok(output) => output.success(),
        Err(e) => {
            tracing::debug!("{} unavailable: {}", program, e);
            false
        }
    }
}
