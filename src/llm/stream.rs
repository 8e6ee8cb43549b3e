// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Raw stream fragments and the producer-side sender
//!
//! A producer pushes text with [`FragmentSender::send_text`] and ends the
//! stream with [`FragmentSender::finish`] or [`FragmentSender::fail`]. Both
//! take `self`, so a stream can be terminated only once. Dropping the sender
//! without terminating closes the channel abnormally, which the batcher
//! reports as an interruption.

use tokio::sync::mpsc;

use crate::error::{ErrorInfo, NyronError, Result};

/// One raw delta from a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFragment {
    pub text: String,
    pub error: Option<ErrorInfo>,
    pub is_terminal: bool,
}

impl StreamFragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
            is_terminal: false,
        }
    }

    pub fn error(error: ErrorInfo) -> Self {
        Self {
            text: String::new(),
            error: Some(error),
            is_terminal: false,
        }
    }

    pub fn terminal() -> Self {
        Self {
            text: String::new(),
            error: None,
            is_terminal: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True for the fragment that ends a stream.
    pub fn ends_stream(&self) -> bool {
        self.is_terminal || self.is_error()
    }
}

/// Create a bounded fragment channel.
pub fn fragment_channel(capacity: usize) -> (FragmentSender, mpsc::Receiver<StreamFragment>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FragmentSender { tx }, rx)
}

/// Producer half of a fragment channel
#[derive(Debug)]
pub struct FragmentSender {
    tx: mpsc::Sender<StreamFragment>,
}

impl FragmentSender {
    /// Send a text delta. Empty deltas are skipped.
    ///
    /// Fails once the consumer is gone, so producers can stop early.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.is_empty() {
            return Ok(());
        }
        self.tx
            .send(StreamFragment::text(text))
            .await
            .map_err(|_| NyronError::ChannelClosed("stream consumer dropped".to_string()))
    }

    /// End the stream normally.
    pub async fn finish(self) {
        let _ = self.tx.send(StreamFragment::terminal()).await;
    }

    /// End the stream with an error.
    pub async fn fail(self, error: ErrorInfo) {
        let _ = self.tx.send(StreamFragment::error(error)).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_finish_sends_single_terminal_and_closes() {
        let (sender, mut rx) = fragment_channel(8);
        sender.send_text("hello").await.unwrap();
        sender.send_text("").await.unwrap();
        sender.finish().await;

        assert_eq!(rx.recv().await, Some(StreamFragment::text("hello")));
        let last = rx.recv().await.unwrap();
        assert!(last.is_terminal);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fail_sends_error() {
        let (sender, mut rx) = fragment_channel(8);
        sender
            .fail(ErrorInfo::new(ErrorKind::Transport, "boom"))
            .await;
        let fragment = rx.recv().await.unwrap();
        assert!(fragment.is_error());
        assert!(fragment.ends_stream());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped_fails() {
        let (sender, rx) = fragment_channel(8);
        drop(rx);
        assert!(sender.is_closed());
        assert!(sender.send_text("late").await.is_err());
    }

    #[tokio::test]
    async fn test_drop_without_terminal_closes_channel() {
        let (sender, mut rx) = fragment_channel(8);
        sender.send_text("partial").await.unwrap();
        drop(sender);
        assert_eq!(rx.recv().await.unwrap().text, "partial");
        assert!(rx.recv().await.is_none());
    }
}
