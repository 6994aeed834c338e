//! Convenient re-exports for common remote-probe usage.
//!
//! This module provides a single import to access the most commonly used
//! types from remote-probe.
//!
//! # Example
//!
//! ```ignore
//! use remote_probe::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut runner = Runner::connect(SshConfig::new("osd3.lab").username("qa")).await?;
//!     let result = runner.run("uname -a", Duration::from_secs(10)).await?;
//!     println!("{}", result.stdout);
//!     Ok(())
//! }
//! ```

// Error handling
pub use crate::error::{ProbeError, Result};

// Common types
pub use crate::types::CommandResult;

// Polling
pub use crate::poll::{BoundedPoll, PollOutcome, Tick};

// Retry policy
pub use crate::retry::{RetryState, RetryStrategy, retry_with};

// Configuration
pub use crate::config::{HostEntry, ProbeConfig};

// Channel seam
pub use crate::backend::{BackendType, ChannelEvent, CommandChannel};

// SSH transport
#[cfg(feature = "ssh")]
pub use crate::backend::ssh::{AuthMethod, Credentials, HostVerification, SshConfig, SshSession};

// Runners
#[cfg(feature = "ssh")]
pub use crate::runner::Runner;
pub use crate::runner::{collect_output, poll_output};
#[cfg(feature = "ssh")]
pub use crate::sync::SyncRunner;
