//! Common types for remote-probe.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{ProbeError, Result};

/// The captured outcome of one remote command execution.
///
/// Produced by a single invocation and immutable once returned. Both streams
/// are canonicalized: trailing whitespace trimmed per line, lines joined by
/// `\n`. A command that produces no output is not an error; empty strings
/// are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Remote exit status, when the transport reported one before closing.
    pub exit_status: Option<u32>,
}

impl CommandResult {
    /// Create a result from already-normalized output.
    #[must_use]
    pub fn new(
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        exit_status: Option<u32>,
    ) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_status,
        }
    }

    /// Check whether the command reported a zero exit status.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }

    /// Turn a non-zero exit into a [`ProbeError::CommandFailed`], passing a
    /// successful result through unchanged.
    ///
    /// A missing exit status is treated as failure: the channel closed before
    /// the remote process reported one.
    pub fn ensure_success(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(ProbeError::command_failed(
                self.exit_status.unwrap_or(1),
                self.stderr,
            ))
        }
    }

    /// Decode stdout as JSON.
    ///
    /// Cluster CLIs emit machine-readable output under `--format json`; this
    /// is the structured alternative to substring-matching on stdout.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    /// Decode stdout as JSON into a typed value.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_status {
            Some(status) => write!(f, "[exit {status}] {}", self.stdout),
            None => write!(f, "[no exit status] {}", self.stdout),
        }
    }
}
