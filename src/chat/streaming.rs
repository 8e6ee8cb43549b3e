// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming request driver
//!
//! Wires one streaming request together: a producer task that runs the
//! provider under a deadline and a cancellation token, feeding a batcher
//! task whose output the UI consumes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ErrorInfo;
use crate::llm::provider::{LlmProvider, StreamRequest};
use crate::llm::stream::fragment_channel;

use super::batcher::{BatchPolicy, BatchedFragment, StreamBatcher};

/// Parameters shared by every streaming request of a session
#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub policy: BatchPolicy,
    /// Capacity of the raw producer channel
    pub producer_buffer: usize,
    /// Deadline for the whole stream
    pub timeout: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            policy: BatchPolicy::default(),
            producer_buffer: 64,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Start a streaming request and return the batched fragments.
///
/// The returned stream always ends with one terminal or error fragment:
/// a provider error, the deadline and cancellation all end it with an
/// error carrying the matching kind.
pub fn start_stream(
    provider: Arc<dyn LlmProvider>,
    request: StreamRequest,
    options: &StreamOptions,
    cancel: CancellationToken,
) -> mpsc::Receiver<BatchedFragment> {
    let (sink, raw_rx) = fragment_channel(options.producer_buffer);
    let timeout = options.timeout;

    tokio::spawn(async move {
        tracing::debug!(
            target: "nyron.chat.streaming",
            provider = provider.name(),
            model = %request.model,
            "stream start"
        );

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(ErrorInfo::cancelled()),
            result = tokio::time::timeout(timeout, provider.stream_chat(request, &sink)) => {
                match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(ErrorInfo::from(&e)),
                    Err(_) => Err(ErrorInfo::timeout("stream", timeout.as_secs())),
                }
            }
        };

        match outcome {
            Ok(()) => sink.finish().await,
            Err(error) => {
                tracing::info!(target: "nyron.chat.streaming", error = %error, "stream ended with error");
                sink.fail(error).await;
            }
        }
    });

    StreamBatcher::new(options.policy).spawn(raw_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::llm::mock_provider::{MockProvider, MockStreamStep};

    async fn drain(mut rx: mpsc::Receiver<BatchedFragment>) -> Vec<BatchedFragment> {
        let mut out = Vec::new();
        while let Some(fragment) = rx.recv().await {
            out.push(fragment);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_completes() {
        let provider = MockProvider::new().with_stream(vec![
            MockStreamStep::Text("Hello, ".to_string()),
            MockStreamStep::Text("world".to_string()),
        ]);
        let rx = start_stream(
            Arc::new(provider.clone()),
            StreamRequest::new("m", "hi"),
            &StreamOptions::default(),
            CancellationToken::new(),
        );

        let fragments = drain(rx).await;
        let text: String = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(text, "Hello, world");
        assert!(fragments.last().unwrap().is_terminal);
        assert_eq!(provider.recorded_streams()[0].prompt, "hi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_error_mid_stream() {
        let provider = MockProvider::new().with_stream(vec![
            MockStreamStep::Text("Hel".to_string()),
            MockStreamStep::Fail("connection reset".to_string()),
        ]);
        let fragments = drain(start_stream(
            Arc::new(provider),
            StreamRequest::new("m", "hi"),
            &StreamOptions::default(),
            CancellationToken::new(),
        ))
        .await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "Hel");
        assert_eq!(fragments[1].error.as_ref().unwrap().kind, ErrorKind::Transport);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_deadline() {
        let provider = MockProvider::new().with_stream(vec![
            MockStreamStep::Text("slow".to_string()),
            MockStreamStep::Delay(Duration::from_secs(10)),
        ]);
        let options = StreamOptions {
            timeout: Duration::from_secs(1),
            ..StreamOptions::default()
        };
        let fragments = drain(start_stream(
            Arc::new(provider),
            StreamRequest::new("m", "hi"),
            &options,
            CancellationToken::new(),
        ))
        .await;

        let last = fragments.last().unwrap();
        assert_eq!(last.error.as_ref().unwrap().kind, ErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_cancelled() {
        let provider = MockProvider::new().with_stream(vec![MockStreamStep::Delay(
            Duration::from_secs(10),
        )]);
        let cancel = CancellationToken::new();
        let rx = start_stream(
            Arc::new(provider),
            StreamRequest::new("m", "hi"),
            &StreamOptions::default(),
            cancel.clone(),
        );
        cancel.cancel();

        let fragments = drain(rx).await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].error.as_ref().unwrap().kind, ErrorKind::Cancelled);
    }
}
