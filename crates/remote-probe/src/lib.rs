//! remote-probe: remote command execution and bounded polling for cluster
//! test harnesses.
//!
//! Test suites for distributed storage systems spend their time doing two
//! things: running commands on cluster nodes over SSH, and waiting (bounded,
//! at intervals) for asynchronous cluster state to settle. This crate
//! provides exactly those two primitives and deliberately nothing else.
//! Retry policy, cluster knowledge, and success conditions belong to the
//! calling test logic.
//!
//! # Features
//!
//! - **Async-first design** with Tokio runtime
//! - **SSH transport** via russh (feature: `ssh`, default)
//! - **Scripted mock channel** for testing (feature: `mock`)
//! - **Blocking wrapper** for thread-per-test callers
//!
//! # Example
//!
//! ```ignore
//! use remote_probe::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SshConfig::new("mon0.lab")
//!         .username("qa")
//!         .credentials(Credentials::new("qa").with_defaults());
//!     let mut runner = Runner::connect(config).await?;
//!
//!     let health = runner
//!         .run("ceph health detail --format json", Duration::from_secs(30))
//!         .await?;
//!
//!     let mut poll = BoundedPoll::new(Duration::from_secs(300), Duration::from_secs(10));
//!     while poll.tick().await.is_some() {
//!         let status = runner.run("ceph orch host ls", Duration::from_secs(30)).await?;
//!         if !status.stdout.contains("draining") {
//!             break;
//!         }
//!     }
//!     assert!(!poll.expired(), "host never finished draining: {health}");
//!     Ok(())
//! }
//! ```

// Core types
pub mod config;
pub mod error;
pub mod prelude;
pub mod types;
pub mod util;

// Core modules
pub mod backend;
pub mod poll;
pub mod retry;
pub mod runner;

/// Blocking wrapper for synchronous callers.
#[cfg(feature = "ssh")]
pub mod sync;

/// Scripted mock channel for testing.
#[cfg(feature = "mock")]
pub mod mock;

// Re-export commonly used items
pub use backend::{BackendType, ChannelEvent, CommandChannel};
#[cfg(feature = "ssh")]
pub use backend::ssh::{
    AuthMethod, Credentials, ExecChannel, HostVerification, SshConfig, SshSession, SshSessionState,
};
pub use config::{HostEntry, ProbeConfig};
pub use error::{ProbeError, Result};
// Conditional re-exports
#[cfg(feature = "mock")]
pub use mock::{MockChannel, MockScript};
pub use poll::{BoundedPoll, PollOutcome, Tick};
pub use retry::{RetryState, RetryStrategy, retry_with};
#[cfg(feature = "ssh")]
pub use runner::Runner;
pub use runner::{collect_output, poll_output};
#[cfg(feature = "ssh")]
pub use sync::SyncRunner;
pub use types::CommandResult;
pub use util::normalize_output;
