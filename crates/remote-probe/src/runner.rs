//! Remote command execution.
//!
//! Two execution modes cover every call-site in a cluster test suite:
//!
//! - [`Runner::run`] awaits the command to completion, bounded by a single
//!   timeout. This is the right shape for short cluster CLI invocations.
//! - [`Runner::run_polled`] drives a [`BoundedPoll`] instead: on every tick
//!   it drains whatever output is immediately available, and gives up with a
//!   timeout error if the remote process has not finished when the poll
//!   expires. This is the right shape for long operations (drains, rebuilds)
//!   where output trickles out over minutes.
//!
//! Neither mode retries anything: failed connects and failed commands surface
//! to the caller, which owns retry policy (see [`crate::retry`]).

use std::time::Duration;

use crate::backend::{ChannelEvent, CommandChannel};
use crate::error::{ProbeError, Result};
use crate::poll::BoundedPoll;
use crate::types::CommandResult;
use crate::util::normalize_output;

#[cfg(feature = "ssh")]
use crate::backend::ssh::{SshConfig, SshSession};

/// Accumulates channel events into a [`CommandResult`].
///
/// An event is pushed exactly once, so repeated partial drains can never
/// duplicate output.
#[derive(Debug, Default)]
struct OutputSink {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
    finished: bool,
}

impl OutputSink {
    fn push(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Stdout(bytes) => self.stdout.extend_from_slice(&bytes),
            ChannelEvent::Stderr(bytes) => self.stderr.extend_from_slice(&bytes),
            ChannelEvent::Exit(status) => {
                self.exit_status = Some(status);
                self.finished = true;
            }
            ChannelEvent::Eof => {}
        }
    }

    fn into_result(self) -> CommandResult {
        CommandResult::new(
            normalize_output(&self.stdout),
            normalize_output(&self.stderr),
            self.exit_status,
        )
    }
}

/// Collect every event from `channel` until it closes, bounded by `timeout`.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] if the channel has not closed within
/// `timeout`, and [`ProbeError::Execution`] if the transport raises.
pub async fn collect_output<C: CommandChannel>(
    channel: &mut C,
    timeout: Duration,
) -> Result<CommandResult> {
    let mut sink = OutputSink::default();

    let drained = tokio::time::timeout(timeout, async {
        while let Some(event) = channel.recv().await? {
            sink.push(event);
        }
        Ok::<(), ProbeError>(())
    })
    .await;

    match drained {
        Ok(result) => {
            result?;
            Ok(sink.into_result())
        }
        Err(_) => Err(ProbeError::timeout(timeout)),
    }
}

/// Poll `channel` at `interval` until the remote process finishes or
/// `timeout` expires, draining available output opportunistically on every
/// tick.
///
/// A read that would block means "no more data right now" and never ends the
/// drain early; the next tick picks up where this one left off. Once the
/// process reports its exit status (or the channel closes), any remaining
/// buffered events are drained before the accumulated result is returned,
/// since stderr typically arrives last.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] if the poll expires before the remote
/// process finishes; no partial [`CommandResult`] is returned.
pub async fn poll_output<C: CommandChannel>(
    channel: &mut C,
    interval: Duration,
    timeout: Duration,
) -> Result<CommandResult> {
    let mut sink = OutputSink::default();
    let mut poll = BoundedPoll::new(timeout, interval);

    while poll.tick().await.is_some() {
        drain_available(channel, &mut sink).await?;
        if sink.finished {
            break;
        }
    }

    if !sink.finished {
        tracing::debug!(elapsed = ?poll.elapsed(), "command still running at poll expiry");
        return Err(ProbeError::timeout(timeout));
    }

    // The exit status can arrive ahead of the tail of stderr.
    drain_available(channel, &mut sink).await?;

    Ok(sink.into_result())
}

/// Drain events that are immediately available, stopping at the first read
/// that would block.
async fn drain_available<C: CommandChannel>(channel: &mut C, sink: &mut OutputSink) -> Result<()> {
    loop {
        match tokio::time::timeout(Duration::ZERO, channel.recv()).await {
            // Nothing more available right now.
            Err(_) => return Ok(()),
            Ok(Ok(Some(event))) => sink.push(event),
            Ok(Ok(None)) => {
                sink.finished = true;
                return Ok(());
            }
            Ok(Err(e)) => return Err(e),
        }
    }
}

/// A command runner bound to one SSH session.
///
/// Construct one per target host. A runner is exclusively owned by its
/// caller; threads that need the same host concurrently each connect their
/// own runner.
#[cfg(feature = "ssh")]
#[derive(Debug)]
pub struct Runner {
    session: SshSession,
}

#[cfg(feature = "ssh")]
impl Runner {
    /// Connect to the host described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Connection`] or [`ProbeError::Authentication`]
    /// when the session cannot be established. Connection failures are not
    /// retried here; wrap the call with [`crate::retry`] if the call-site
    /// wants retries.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let mut session = SshSession::new(config);
        session.connect().await?;
        Ok(Self { session })
    }

    /// Wrap an already-connected session.
    #[must_use]
    pub const fn from_session(session: SshSession) -> Self {
        Self { session }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &SshSession {
        &self.session
    }

    /// Execute `command`, waiting up to `timeout` for it to complete.
    ///
    /// Stdout and stderr are captured separately, trimmed of trailing
    /// whitespace per line and newline-joined. Empty output is valid.
    pub async fn run(&mut self, command: &str, timeout: Duration) -> Result<CommandResult> {
        let mut channel = self.session.exec(command).await?;
        let result = collect_output(&mut channel, timeout).await?;
        tracing::debug!(
            host = %self.session.config().host,
            command = %command,
            exit_status = ?result.exit_status,
            "command completed"
        );
        Ok(result)
    }

    /// Execute `command`, polling for completion every `interval` for at
    /// most `timeout`.
    pub async fn run_polled(
        &mut self,
        command: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<CommandResult> {
        let mut channel = self.session.exec(command).await?;
        let result = poll_output(&mut channel, interval, timeout).await?;
        tracing::debug!(
            host = %self.session.config().host,
            command = %command,
            exit_status = ?result.exit_status,
            "polled command completed"
        );
        Ok(result)
    }

    /// Execute `command` and fail with [`ProbeError::CommandFailed`] unless
    /// it exits zero.
    pub async fn run_checked(&mut self, command: &str, timeout: Duration) -> Result<CommandResult> {
        self.run(command, timeout).await?.ensure_success()
    }

    /// Gracefully close the underlying session.
    pub async fn close(&mut self) {
        self.session.close().await;
    }
}
