//! SSH exec channels.
//!
//! An [`ExecChannel`] carries one command's lifetime, translating the wire
//! protocol messages into [`ChannelEvent`]s. Stdout and stderr are kept
//! separate (stderr arrives as extended data stream 1), and payloads larger
//! than the configured chunk size are buffered and handed out in fixed-size
//! pieces.

use std::collections::VecDeque;

use russh::ChannelMsg;

use crate::backend::{ChannelEvent, CommandChannel};
use crate::error::Result;

/// A channel on which a single remote command is executing.
pub struct ExecChannel {
    channel: russh::Channel<russh::client::Msg>,
    pending: VecDeque<ChannelEvent>,
    max_chunk: usize,
    exit_status: Option<u32>,
    closed: bool,
}

impl std::fmt::Debug for ExecChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecChannel")
            .field("pending", &self.pending.len())
            .field("max_chunk", &self.max_chunk)
            .field("exit_status", &self.exit_status)
            .field("closed", &self.closed)
            .finish()
    }
}

impl ExecChannel {
    /// Wrap a channel that has already had its exec request issued.
    #[must_use]
    pub fn new(channel: russh::Channel<russh::client::Msg>, max_chunk: usize) -> Self {
        Self {
            channel,
            pending: VecDeque::new(),
            max_chunk: max_chunk.max(1),
            exit_status: None,
            closed: false,
        }
    }

    /// The exit status, once the remote process has reported it.
    #[must_use]
    pub const fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }

    /// Whether the channel has closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn push_chunks(&mut self, stderr: bool, data: &[u8]) {
        for chunk in data.chunks(self.max_chunk) {
            let chunk = chunk.to_vec();
            self.pending.push_back(if stderr {
                ChannelEvent::Stderr(chunk)
            } else {
                ChannelEvent::Stdout(chunk)
            });
        }
    }
}

impl CommandChannel for ExecChannel {
    async fn recv(&mut self) -> Result<Option<ChannelEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.closed {
                return Ok(None);
            }

            let Some(msg) = self.channel.wait().await else {
                self.closed = true;
                return Ok(None);
            };

            match msg {
                ChannelMsg::Data { data } => self.push_chunks(false, data.as_ref()),
                ChannelMsg::ExtendedData { data, ext } if ext == 1 => {
                    self.push_chunks(true, data.as_ref());
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    self.exit_status = Some(exit_status);
                    self.pending.push_back(ChannelEvent::Exit(exit_status));
                }
                ChannelMsg::Eof => {
                    self.pending.push_back(ChannelEvent::Eof);
                }
                ChannelMsg::Close => {
                    self.closed = true;
                }
                other => {
                    tracing::trace!(msg = ?other, "ignoring channel message");
                }
            }
        }
    }
}
