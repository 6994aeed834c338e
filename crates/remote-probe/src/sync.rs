//! Blocking wrapper for synchronous callers.
//!
//! Test modules that drive everything from a plain thread wrap a runner in
//! [`SyncRunner`], which owns a current-thread tokio runtime and blocks on
//! each operation. Each thread owns its own `SyncRunner`; sessions are never
//! shared across threads.

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::backend::ssh::SshConfig;
use crate::error::Result;
use crate::runner::Runner;
use crate::types::CommandResult;

/// A synchronous command runner.
#[derive(Debug)]
pub struct SyncRunner {
    /// The tokio runtime.
    runtime: Runtime,
    /// The inner async runner.
    inner: Runner,
}

impl SyncRunner {
    /// Connect to the host described by `config`, blocking until the session
    /// is established.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created or the connection
    /// fails.
    pub fn connect(config: SshConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = runtime.block_on(Runner::connect(config))?;
        Ok(Self { runtime, inner })
    }

    /// Execute `command`, blocking up to `timeout` for completion.
    pub fn run(&mut self, command: &str, timeout: Duration) -> Result<CommandResult> {
        self.runtime.block_on(self.inner.run(command, timeout))
    }

    /// Execute `command`, polling for completion every `interval` for at
    /// most `timeout`.
    pub fn run_polled(
        &mut self,
        command: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<CommandResult> {
        self.runtime
            .block_on(self.inner.run_polled(command, interval, timeout))
    }

    /// Execute `command` and fail unless it exits zero.
    pub fn run_checked(&mut self, command: &str, timeout: Duration) -> Result<CommandResult> {
        self.runtime
            .block_on(self.inner.run_checked(command, timeout))
    }

    /// Gracefully close the underlying session.
    pub fn close(&mut self) {
        self.runtime.block_on(self.inner.close());
    }
}
