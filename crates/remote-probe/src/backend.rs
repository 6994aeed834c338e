//! Backend module for command transports.
//!
//! A transport produces channels that carry one remote command's lifetime:
//! output bytes, an exit status, and channel end-of-stream. The runner drives
//! any [`CommandChannel`] the same way, so the SSH implementation and the
//! scripted mock share every code path above this seam.

use crate::error::Result;

// SSH backend is conditionally compiled
#[cfg(feature = "ssh")]
pub mod ssh;

/// One event observed on a command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A chunk of standard output.
    Stdout(Vec<u8>),
    /// A chunk of standard error.
    Stderr(Vec<u8>),
    /// The remote process reported its exit status.
    Exit(u32),
    /// The remote side will send no more data.
    Eof,
}

/// A channel carrying the lifetime of one remote command.
///
/// Implementations deliver events in arrival order and return `None` once
/// the channel has closed. A channel is owned by a single caller; it is not
/// meant to be shared across tasks.
pub trait CommandChannel: Send {
    /// Receive the next event, waiting until one arrives.
    ///
    /// Returns `Ok(None)` once the channel is closed. Transport failures
    /// surface as [`ProbeError::Execution`](crate::error::ProbeError).
    fn recv(&mut self) -> impl Future<Output = Result<Option<ChannelEvent>>> + Send;
}

/// Available transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// SSH transport for remote hosts.
    Ssh,
    /// Scripted mock transport for testing.
    Mock,
}

impl BackendType {
    /// Check if this transport is compiled in.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Ssh => cfg!(feature = "ssh"),
            Self::Mock => cfg!(feature = "mock"),
        }
    }

    /// Get the transport name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Mock => "mock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(BackendType::Ssh.name(), "ssh");
        assert_eq!(BackendType::Mock.name(), "mock");
    }

    #[test]
    fn mock_availability_tracks_feature() {
        assert_eq!(BackendType::Mock.is_available(), cfg!(feature = "mock"));
    }
}
