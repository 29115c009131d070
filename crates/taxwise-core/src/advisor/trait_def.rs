//! The `Advisor` trait -- the adapter interface for LLM services.
//!
//! The trait is object-safe so callers can hold a `Box<dyn Advisor>` chosen
//! at runtime (subprocess, canned file, test stub).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why an advisor call produced no text.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// The advisor process could not be started.
    #[error("failed to spawn advisor command '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O with a running advisor process failed.
    #[error("advisor I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The advisor process exited with a non-zero status.
    #[error("advisor command '{command}' failed (exit {code}): {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// A canned response file could not be read.
    #[error("failed to read response file {path}")]
    ResponseFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The advisor answered with nothing.
    #[error("advisor returned an empty response")]
    EmptyResponse,

    /// The caller's deadline expired before the advisor answered.
    #[error("advisor did not answer within {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Text-completion service used to obtain tax advice.
///
/// # Object Safety
///
/// Every method returns a concrete type, so `Box<dyn Advisor>` works.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short name for logs (e.g. "command", "file").
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw response text.
    ///
    /// Dropping the returned future must abort any in-flight work.
    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError>;
}

// Compile-time assertion: Advisor must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Advisor) {}
};
