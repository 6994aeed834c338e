//! Error types for remote-probe.
//!
//! Every failure carries structured fields rather than a message to be
//! substring-matched: callers branch on the variant (or the kind predicates
//! below), never on error text.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// The main error type for remote-probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Establishing the transport connection failed.
    #[error("failed to connect to {host}:{port}: {reason}")]
    Connection {
        /// The host that could not be connected to.
        host: String,
        /// The port that was used.
        port: u16,
        /// The underlying transport error message.
        reason: String,
    },

    /// Authentication against the remote host failed.
    #[error("authentication failed for user '{user}': {reason}")]
    Authentication {
        /// The user that failed to authenticate.
        user: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The transport raised while a command was in flight.
    #[error("command execution failed: {reason}")]
    Execution {
        /// The underlying transport error message.
        reason: String,
    },

    /// A bounded wait expired before the remote process completed.
    #[error("command did not complete within {duration:?}")]
    Timeout {
        /// The duration that elapsed.
        duration: Duration,
    },

    /// The remote command ran to completion with a non-zero exit status.
    #[error("command exited with status {status}: {stderr}")]
    CommandFailed {
        /// The remote exit status.
        status: u32,
        /// Captured standard error.
        stderr: String,
    },

    /// Command output could not be decoded as JSON.
    #[error("failed to decode command output as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for remote-probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Create a connection error.
    pub fn connection(host: impl Into<String>, port: u16, reason: impl Into<String>) -> Self {
        Self::Connection {
            host: host.into(),
            port,
            reason: reason.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(user: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Authentication {
            user: user.into(),
            reason: reason.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub const fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create a command-failed error.
    pub fn command_failed(status: u32, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            status,
            stderr: stderr.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if retrying the failed operation could plausibly succeed.
    ///
    /// Connection, timeout, execution, and I/O failures are transient from the
    /// transport's point of view. Authentication failures, non-zero exits, and
    /// configuration problems are not: retrying them repeats the same outcome.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::Execution { .. } | Self::Io(_)
        )
    }
}
