//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for lazypy
//!
//! Every collaborator (cache, scanner, package index, subprocess runner)
//! returns `Result<T, AppError>`. The state machine never sees these values
//! directly: tasks render them into the message that resolves the task.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all lazypy operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O error bound to a specific path.
    #[error("Failed to access {path:?}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parse error (project manifest or config file).
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport or status error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// External process failure (package manager, interpreter).
    #[error("External command failed: {cmd} (exit code: {code:?})\n{stderr}")]
    ExternalCmd {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Index cache layer error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Bind an I/O error to the path it happened on.
    pub fn path_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Create an external command failure.
    pub fn external_cmd<S1, S2>(cmd: S1, code: Option<i32>, stderr: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::ExternalCmd {
            cmd: cmd.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Text shown to the user for this error.
    ///
    /// External command failures surface their stderr verbatim so the log
    /// table shows what the package manager said.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExternalCmd { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_cmd_user_message_is_stderr() {
        let err = AppError::external_cmd("pip install nope", Some(1), "No matching distribution\n");
        assert_eq!(err.user_message(), "No matching distribution");
    }

    #[test]
    fn test_external_cmd_without_stderr_falls_back_to_display() {
        let err = AppError::external_cmd("pip freeze", Some(2), "  ");
        assert!(err.user_message().contains("pip freeze"));
    }

    #[test]
    fn test_with_context() {
        let err = AppError::Cache("corrupt".into()).with_context("loading index");
        assert_eq!(err.to_string(), "Unexpected error: loading index: Cache error: corrupt");
    }
}
