// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Provides a configurable mock implementation of the LlmProvider trait
//! that can be used in tests without making real API calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::llm::message::ToolCallRequest;
use crate::llm::provider::{ChatCompletion, ChatRequest, LlmProvider, StreamRequest};
use crate::llm::stream::FragmentSender;

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    /// Provider name
    name: String,
    /// Configured completion responses
    responses: Arc<Mutex<Vec<MockResponse>>>,
    /// Scripted stream steps
    stream_script: Arc<Mutex<Vec<MockStreamStep>>>,
    /// Call counter for complete_chat
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<ChatRequest>>>,
    /// Recorded stream requests
    recorded_streams: Arc<Mutex<Vec<StreamRequest>>>,
    /// Delay before each completion
    latency: Duration,
}

/// A pre-configured response for the mock provider
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this completion
    Completion(ChatCompletion),
    /// Fail with a network error carrying this message
    NetworkError(String),
    /// Fail with an invalid response error carrying this message
    InvalidResponse(String),
}

/// One step of a scripted stream
#[derive(Clone, Debug)]
pub enum MockStreamStep {
    /// Push a text delta
    Text(String),
    /// Wait before the next step
    Delay(Duration),
    /// Fail the stream with a network error
    Fail(String),
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock provider lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(vec![MockResponse::Completion(
                ChatCompletion::text("Mock response"),
            )])),
            stream_script: Arc::new(Mutex::new(vec![MockStreamStep::Text(
                "Mock response".to_string(),
            )])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
            recorded_streams: Arc::new(Mutex::new(vec![])),
            latency: Duration::ZERO,
        }
    }

    /// Create a mock provider with a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut provider = Self::new();
        provider.name = name.into();
        provider
    }

    /// Set a single text response
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_script(vec![MockResponse::Completion(ChatCompletion::text(text))])
    }

    /// Queue multiple responses (returned in order, the last one repeats)
    pub fn with_script(self, script: Vec<MockResponse>) -> Self {
        *lock(&self.responses) = script;
        self
    }

    /// Set a single tool call response
    pub fn with_tool_call(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        let call = ToolCallRequest::new(id, name, arguments.to_string());
        self.with_script(vec![MockResponse::Completion(ChatCompletion::tool_calls(
            vec![call],
        ))])
    }

    /// Set the steps played back by stream_chat
    pub fn with_stream(self, steps: Vec<MockStreamStep>) -> Self {
        *lock(&self.stream_script) = steps;
        self
    }

    /// Delay every completion by this long
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Get the number of times complete_chat() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        lock(&self.recorded_requests).clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<ChatRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    /// Get all recorded stream requests
    pub fn recorded_streams(&self) -> Vec<StreamRequest> {
        lock(&self.recorded_streams).clone()
    }

    fn next_response(&self) -> MockResponse {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = lock(&self.responses);
        match responses.get(count).or_else(|| responses.last()) {
            Some(response) => response.clone(),
            None => MockResponse::Completion(ChatCompletion::text("Mock response")),
        }
    }
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        MockResponse::Completion(ChatCompletion::text(text))
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        MockResponse::Completion(ChatCompletion::tool_calls(vec![ToolCallRequest::new(
            id,
            name,
            arguments.to_string(),
        )]))
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete_chat(&self, request: ChatRequest) -> Result<ChatCompletion> {
        lock(&self.recorded_requests).push(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.next_response() {
            MockResponse::Completion(completion) => Ok(completion),
            MockResponse::NetworkError(message) => Err(ApiError::Network(message).into()),
            MockResponse::InvalidResponse(message) => {
                Err(ApiError::InvalidResponse(message).into())
            }
        }
    }

    async fn stream_chat(&self, request: StreamRequest, sink: &FragmentSender) -> Result<()> {
        lock(&self.recorded_streams).push(request);
        let steps = lock(&self.stream_script).clone();

        for step in steps {
            match step {
                MockStreamStep::Text(text) => sink.send_text(text).await?,
                MockStreamStep::Delay(delay) => tokio::time::sleep(delay).await,
                MockStreamStep::Fail(message) => return Err(ApiError::Network(message).into()),
            }
        }
        Ok(())
    }
}
