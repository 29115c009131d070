//! Subprocess advisor.
//!
//! Runs a configured command (by default `claude -p`), writes the prompt to
//! its stdin and returns everything it printed to stdout.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::trait_def::{Advisor, AdvisorError};

/// Default advisor binary, looked up on `$PATH`.
pub const DEFAULT_COMMAND: &str = "claude";

/// Default arguments for [`DEFAULT_COMMAND`]: print mode, prompt on stdin.
pub const DEFAULT_ARGS: &[&str] = &["-p"];

/// Advisor backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandAdvisor {
    program: String,
    args: Vec<String>,
}

impl CommandAdvisor {
    /// Advisor running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for CommandAdvisor {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND).with_args(DEFAULT_ARGS.iter().copied())
    }
}

#[async_trait]
impl Advisor for CommandAdvisor {
    fn name(&self) -> &str {
        "command"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Abandoning the call must not leave the process running.
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| AdvisorError::Spawn {
            command: self.program.clone(),
            source,
        })?;
        debug!(program = %self.program, pid = child.id(), "advisor process started");

        let mut stdin = child.stdin.take().ok_or_else(|| {
            AdvisorError::Io(std::io::Error::other("advisor stdin was not captured"))
        })?;
        let input = prompt.to_owned();
        let write = async move {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AdvisorError::Exit {
                command: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        if let Err(e) = written {
            // A command that answers without reading its input is fine.
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(AdvisorError::Io(e));
            }
            warn!(program = %self.program, "advisor exited before reading the whole prompt");
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }
        debug!(bytes = text.len(), "advisor response received");
        Ok(text)
    }
}
