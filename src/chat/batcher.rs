// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Stream batching
//!
//! Providers emit many tiny deltas at irregular intervals. Redrawing the
//! terminal for each one is wasteful, so the batcher coalesces them: text is
//! buffered until the debounce timer expires (reset on every fragment) or
//! the buffer reaches the size threshold, then republished as one fragment.
//!
//! The output stream always ends with exactly one terminal or error
//! fragment, because the batcher owns a [`FragmentSender`] and ends it
//! through its consuming `finish`/`fail` methods. A producer that goes away
//! without terminating is reported as [`ErrorKind::Interrupted`].
//!
//! [`ErrorKind::Interrupted`]: crate::error::ErrorKind::Interrupted

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::StreamingConfig;
use crate::error::ErrorInfo;
use crate::llm::stream::{fragment_channel, FragmentSender, StreamFragment};

/// Fragments leaving the batcher have the same shape as raw ones.
pub type BatchedFragment = StreamFragment;

/// When buffered text is flushed downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Quiet period after the last fragment before a flush
    pub debounce: Duration,
    /// Flush as soon as the buffer holds at least this many bytes
    pub max_batch_bytes: usize,
    /// Flush buffered text before forwarding an error; otherwise drop it
    pub flush_on_error: bool,
    /// Capacity of the output channel
    pub output_buffer: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            max_batch_bytes: 1024,
            flush_on_error: true,
            output_buffer: 64,
        }
    }
}

impl From<&StreamingConfig> for BatchPolicy {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            max_batch_bytes: config.max_batch_bytes.max(1),
            flush_on_error: config.flush_on_error,
            output_buffer: config.fragment_buffer.max(1),
        }
    }
}

/// Coalesces raw fragments into batches
#[derive(Debug, Clone, Default)]
pub struct StreamBatcher {
    policy: BatchPolicy,
}

impl StreamBatcher {
    pub fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    /// Run the batcher as its own task and return the batched stream.
    pub fn spawn(self, input: mpsc::Receiver<StreamFragment>) -> mpsc::Receiver<BatchedFragment> {
        let (output, rx) = fragment_channel(self.policy.output_buffer);
        tokio::spawn(self.run(input, output));
        rx
    }

    /// Drain `input` into `output` until the stream ends.
    pub async fn run(self, mut input: mpsc::Receiver<StreamFragment>, output: FragmentSender) {
        let policy = self.policy;
        let mut buffer = String::new();
        let mut batches = 0usize;

        let timer = tokio::time::sleep(policy.debounce);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                fragment = input.recv() => match fragment {
                    Some(StreamFragment { error: Some(error), .. }) => {
                        if policy.flush_on_error {
                            if !flush(&mut buffer, &output, &mut batches).await {
                                return;
                            }
                        } else if !buffer.is_empty() {
                            tracing::debug!(
                                target: "nyron.chat.batcher",
                                dropped_bytes = buffer.len(),
                                "dropping buffered text before error"
                            );
                        }
                        tracing::debug!(target: "nyron.chat.batcher", batches, error = %error, "stream failed");
                        output.fail(error).await;
                        return;
                    }
                    Some(StreamFragment { text, is_terminal: true, .. }) => {
                        buffer.push_str(&text);
                        if !flush(&mut buffer, &output, &mut batches).await {
                            return;
                        }
                        tracing::debug!(target: "nyron.chat.batcher", batches, "stream finished");
                        output.finish().await;
                        return;
                    }
                    Some(StreamFragment { text, .. }) => {
                        buffer.push_str(&text);
                        if buffer.len() >= policy.max_batch_bytes {
                            if !flush(&mut buffer, &output, &mut batches).await {
                                return;
                            }
                        } else {
                            timer.as_mut().reset(Instant::now() + policy.debounce);
                        }
                    }
                    None => {
                        if !flush(&mut buffer, &output, &mut batches).await {
                            return;
                        }
                        tracing::info!(target: "nyron.chat.batcher", batches, "producer closed without terminal fragment");
                        output.fail(ErrorInfo::interrupted()).await;
                        return;
                    }
                },

                () = &mut timer, if !buffer.is_empty() => {
                    if !flush(&mut buffer, &output, &mut batches).await {
                        return;
                    }
                }
            }
        }
    }
}

/// Send buffered text as one fragment. Returns false once the consumer is
/// gone.
async fn flush(buffer: &mut String, output: &FragmentSender, batches: &mut usize) -> bool {
    if buffer.is_empty() {
        return true;
    }
    let text = std::mem::take(buffer);
    match output.send_text(text).await {
        Ok(()) => {
            *batches += 1;
            true
        }
        Err(_) => {
            tracing::debug!(target: "nyron.chat.batcher", "consumer dropped, stopping");
            false
        }
    }
}
