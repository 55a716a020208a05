//! Blocking execution of external tool invocations.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::tools::ToolInvocation;

/// How often a running tool is polled when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Executable '{program}' not found; install it or set {env_var}")]
    NotFound { program: String, env_var: String },

    #[error("Could not run '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed with {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },

    #[error("'{command}' did not finish within {seconds}s and was killed")]
    TimedOut { command: String, seconds: u64 },

    #[error("'{command}' finished but did not produce {}", .path.display())]
    MissingOutput { command: String, path: PathBuf },
}

#[allow(clippy::ref_option)] // Called from the error attribute with a field reference
fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}

/// Runs tool invocations one at a time, blocking until each finishes.
///
/// Tools inherit stdout/stderr so their own progress output stays visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolRunner {
    timeout: Option<Duration>,
}

impl ToolRunner {
    /// A runner with an optional wall-clock bound per invocation
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run an invocation and check that its expected outputs exist.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::NotFound` if the executable does not exist,
    /// `ToolError::Io` if it cannot be started or waited on,
    /// `ToolError::Failed` on a non-zero exit, `ToolError::TimedOut` if the
    /// timeout elapses, or `ToolError::MissingOutput` for the first expected
    /// output that is absent afterwards.
    pub fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        let command = invocation.command_line();
        info!("Running {}", invocation.name);
        debug!("{command}");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ToolError::NotFound {
                        program: invocation.program.to_string_lossy().to_string(),
                        env_var: invocation.env_var.to_string(),
                    }
                } else {
                    ToolError::Io {
                        command: command.clone(),
                        source: e,
                    }
                }
            })?;

        let status = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit, &command)?,
            None => child.wait().map_err(|e| ToolError::Io {
                command: command.clone(),
                source: e,
            })?,
        };

        if !status.success() {
            return Err(ToolError::Failed {
                command,
                code: status.code(),
            });
        }

        for path in &invocation.expected_outputs {
            if !path.exists() {
                return Err(ToolError::MissingOutput {
                    command,
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }
}

fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    command: &str,
) -> Result<ExitStatus, ToolError> {
    let io_error = |source| ToolError::Io {
        command: command.to_string(),
        source,
    };
    let deadline = Instant::now() + limit;

    loop {
        if let Some(status) = child.try_wait().map_err(io_error)? {
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            warn!("Killing '{command}' after {}s", limit.as_secs());
            // The child may exit on its own between try_wait and kill
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::TimedOut {
                command: command.to_string(),
                seconds: limit.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
