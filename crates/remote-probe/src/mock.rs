//! Scripted mock channel for testing.
//!
//! A [`MockScript`] describes one command's observable behavior (output
//! chunks, delays, an exit status, injected transport failures) and
//! [`MockChannel`] plays it back through the same [`CommandChannel`] seam
//! the SSH transport uses, so runner logic is exercised unchanged and
//! without a network.
//!
//! Delays are measured from the first `recv` call, which makes playback
//! deterministic under tokio's paused test clock.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::{ChannelEvent, CommandChannel};
use crate::error::{ProbeError, Result};

#[derive(Debug, Clone)]
enum MockItem {
    Event(ChannelEvent),
    Error(String),
}

/// Builder for a scripted command playback.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    items: Vec<(Duration, MockItem)>,
    offset: Duration,
}

impl MockScript {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stdout chunk.
    #[must_use]
    pub fn stdout(mut self, data: impl AsRef<[u8]>) -> Self {
        self.items.push((
            self.offset,
            MockItem::Event(ChannelEvent::Stdout(data.as_ref().to_vec())),
        ));
        self
    }

    /// Append a stderr chunk.
    #[must_use]
    pub fn stderr(mut self, data: impl AsRef<[u8]>) -> Self {
        self.items.push((
            self.offset,
            MockItem::Event(ChannelEvent::Stderr(data.as_ref().to_vec())),
        ));
        self
    }

    /// Append the exit status report.
    #[must_use]
    pub fn exit(mut self, status: u32) -> Self {
        self.items
            .push((self.offset, MockItem::Event(ChannelEvent::Exit(status))));
        self
    }

    /// Append an end-of-stream marker.
    #[must_use]
    pub fn eof(mut self) -> Self {
        self.items
            .push((self.offset, MockItem::Event(ChannelEvent::Eof)));
        self
    }

    /// Delay every subsequent item by `duration`.
    #[must_use]
    pub fn delay(mut self, duration: Duration) -> Self {
        self.offset += duration;
        self
    }

    /// Append an injected transport failure.
    #[must_use]
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.items
            .push((self.offset, MockItem::Error(message.into())));
        self
    }

    /// Finish the script and produce a playable channel.
    #[must_use]
    pub fn channel(self) -> MockChannel {
        MockChannel {
            timeline: self.items.into(),
            started: None,
        }
    }
}

/// A channel that plays back a [`MockScript`].
///
/// Once the script is exhausted the channel reports closed (`recv` returns
/// `Ok(None)`), like a real channel after the remote side hangs up.
#[derive(Debug)]
pub struct MockChannel {
    timeline: VecDeque<(Duration, MockItem)>,
    started: Option<Instant>,
}

impl MockChannel {
    /// Number of items not yet played back.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.timeline.len()
    }
}

impl CommandChannel for MockChannel {
    async fn recv(&mut self) -> Result<Option<ChannelEvent>> {
        let started = *self.started.get_or_insert_with(Instant::now);

        let Some((offset, _)) = self.timeline.front() else {
            return Ok(None);
        };

        // Items are popped only after their ready time, so a cancelled recv
        // loses nothing.
        tokio::time::sleep_until(started + *offset).await;

        let (_, item) = self.timeline.pop_front().expect("front checked above");
        match item {
            MockItem::Event(event) => Ok(Some(event)),
            MockItem::Error(message) => Err(ProbeError::execution(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn plays_back_in_order() {
        let mut channel = MockScript::new()
            .stdout("one")
            .stderr("two")
            .exit(0)
            .channel();

        assert_eq!(
            channel.recv().await.unwrap(),
            Some(ChannelEvent::Stdout(b"one".to_vec()))
        );
        assert_eq!(
            channel.recv().await.unwrap(),
            Some(ChannelEvent::Stderr(b"two".to_vec()))
        );
        assert_eq!(channel.recv().await.unwrap(), Some(ChannelEvent::Exit(0)));
        assert_eq!(channel.recv().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_holds_back_later_items() {
        let mut channel = MockScript::new()
            .stdout("early")
            .delay(Duration::from_secs(5))
            .stdout("late")
            .channel();

        let before = Instant::now();
        channel.recv().await.unwrap();
        assert_eq!(before.elapsed(), Duration::ZERO);

        channel.recv().await.unwrap();
        assert_eq!(before.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn injected_error_surfaces_once() {
        let mut channel = MockScript::new().error("connection reset").channel();

        let err = channel.recv().await.unwrap_err();
        assert!(matches!(err, ProbeError::Execution { .. }));
        assert_eq!(channel.recv().await.unwrap(), None);
    }
}
