// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Agentic turn controller
//!
//! One turn starts with a user prompt and ends with a final answer or a
//! failure. In between, the controller sends the history to the provider,
//! runs any requested tools in order, appends their results and asks again,
//! up to `max_turns` provider round-trips.
//!
//! The conversation history lives only for the duration of a turn and is
//! cleared whatever the outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{ModelSelection, Settings};
use crate::error::{ErrorInfo, ErrorKind};
use crate::llm::factory::ProviderSet;
use crate::llm::message::{ConversationHistory, HistoryError, ToolCallRequest};
use crate::llm::provider::{ChatCompletion, ChatRequest, LlmProvider};
use crate::tools::{error_envelope, ToolError, ToolExecutor, ToolResult};

use super::prompts;

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingResponse,
    ToolsRequested,
    ExecutingTools,
    Finalized,
    Failed,
}

impl TurnState {
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::AwaitingResponse => "Thinking",
            TurnState::ToolsRequested => "Tools requested",
            TurnState::ExecutingTools => "Running tools",
            TurnState::Finalized => "Done",
            TurnState::Failed => "Failed",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, TurnState::Finalized | TurnState::Failed)
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Finalized {
        thinking_text: String,
        final_text: String,
        /// Provider calls made during the turn
        round_trips: usize,
    },
    Failed {
        error: ErrorInfo,
    },
}

impl TurnOutcome {
    pub fn is_finalized(&self) -> bool {
        matches!(self, TurnOutcome::Finalized { .. })
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            TurnOutcome::Failed { error } => Some(error),
            TurnOutcome::Finalized { .. } => None,
        }
    }
}

/// Progress hooks for the turn loop.
///
/// Frontends implement this to show state changes and tool activity.
pub trait TurnObserver: Send {
    fn on_state(&mut self, _state: TurnState) {}

    /// Called with the calls about to run, before any of them executes.
    fn on_tool_calls(&mut self, _calls: &[ToolCallRequest]) {}

    fn on_tool_result(&mut self, _call: &ToolCallRequest, _result: &ToolResult) {}
}

/// Observer for callers that don't need progress hooks.
#[derive(Debug, Default)]
pub struct NoopTurnObserver;

impl TurnObserver for NoopTurnObserver {}

/// Limits and prompt for the turn loop
#[derive(Debug, Clone)]
pub struct TurnConfig {
    pub max_turns: usize,
    pub request_timeout: Duration,
    pub tool_timeout: Duration,
    pub system_prompt: String,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_turns: 25,
            request_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(60),
            system_prompt: prompts::SYSTEM_PROMPT.to_string(),
        }
    }
}

impl TurnConfig {
    pub fn from_settings(settings: &Settings, system_prompt: impl Into<String>) -> Self {
        Self {
            max_turns: settings.conversation.max_turns,
            request_timeout: settings.conversation.request_timeout(),
            tool_timeout: settings.conversation.tool_timeout(),
            system_prompt: system_prompt.into(),
        }
    }
}

struct FinalAnswer {
    thinking: String,
    text: String,
    round_trips: usize,
}

/// Drives the request / tool-call loop for one prompt at a time
pub struct TurnController {
    providers: ProviderSet,
    tools: Arc<dyn ToolExecutor>,
    config: TurnConfig,
    history: ConversationHistory,
}

impl TurnController {
    pub fn new(providers: ProviderSet, tools: Arc<dyn ToolExecutor>, config: TurnConfig) -> Self {
        Self {
            providers,
            tools,
            config,
            history: ConversationHistory::new(),
        }
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Run one turn to completion.
    pub async fn run(
        &mut self,
        prompt: &str,
        selection: &ModelSelection,
        observer: &mut dyn TurnObserver,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        tracing::info!(
            target: "nyron.chat.turn",
            model = %selection,
            max_turns = self.config.max_turns,
            "turn start"
        );

        let outcome = match self.drive(prompt, selection, observer, cancel).await {
            Ok(answer) => {
                tracing::info!(
                    target: "nyron.chat.turn",
                    round_trips = answer.round_trips,
                    "turn finalized"
                );
                observer.on_state(TurnState::Finalized);
                TurnOutcome::Finalized {
                    thinking_text: answer.thinking,
                    final_text: answer.text,
                    round_trips: answer.round_trips,
                }
            }
            Err(error) => {
                tracing::warn!(target: "nyron.chat.turn", error = %error, "turn failed");
                observer.on_state(TurnState::Failed);
                TurnOutcome::Failed { error }
            }
        };

        self.history.clear();
        outcome
    }

    async fn drive(
        &mut self,
        prompt: &str,
        selection: &ModelSelection,
        observer: &mut dyn TurnObserver,
        cancel: &CancellationToken,
    ) -> Result<FinalAnswer, ErrorInfo> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ErrorInfo::new(ErrorKind::InvalidInput, "prompt is empty"));
        }

        let provider = self.providers.get(&selection.provider).map_err(ErrorInfo::from)?;

        let seeded = if self.history.is_empty() {
            self.history.seed(&self.config.system_prompt, prompt)
        } else {
            self.history.push_user(prompt)
        };
        seeded.map_err(history_error)?;

        let definitions = self.tools.definitions();

        for round_trip in 1..=self.config.max_turns {
            observer.on_state(TurnState::AwaitingResponse);
            tracing::debug!(
                target: "nyron.chat.turn",
                round_trip,
                messages = self.history.len(),
                "requesting completion"
            );

            let request = ChatRequest::new(&selection.model, self.history.messages().to_vec())
                .with_tools(definitions.clone());
            let completion = self.complete(provider.as_ref(), request, cancel).await?;

            if !completion.has_tool_calls() {
                self.history
                    .push_assistant(completion.text.clone(), Vec::new())
                    .map_err(history_error)?;
                return Ok(FinalAnswer {
                    thinking: completion.thinking,
                    text: completion.text,
                    round_trips: round_trip,
                });
            }

            observer.on_state(TurnState::ToolsRequested);
            if round_trip == self.config.max_turns {
                tracing::warn!(
                    target: "nyron.chat.turn",
                    round_trip,
                    requested = completion.tool_calls.len(),
                    "turn cap reached with tool calls outstanding"
                );
                break;
            }

            let calls = completion.tool_calls;
            observer.on_tool_calls(&calls);
            self.history
                .push_assistant(completion.text, calls.clone())
                .map_err(history_error)?;

            observer.on_state(TurnState::ExecutingTools);
            tracing::info!(
                target: "nyron.chat.turn",
                round_trip,
                tool_calls = calls.len(),
                "executing tools"
            );
            for call in &calls {
                let result = self.execute_tool(call, cancel).await?;
                observer.on_tool_result(call, &result);
                self.history
                    .push_tool_result(&call.id, result.payload)
                    .map_err(history_error)?;
            }
        }

        Err(ErrorInfo::turn_limit_exceeded(self.config.max_turns))
    }

    async fn complete(
        &self,
        provider: &dyn LlmProvider,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatCompletion, ErrorInfo> {
        let timeout = self.config.request_timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(ErrorInfo::cancelled()),
            result = tokio::time::timeout(timeout, provider.complete_chat(request)) => match result {
                Ok(Ok(completion)) => Ok(completion),
                Ok(Err(e)) => Err(ErrorInfo::from(&e)),
                Err(_) => Err(ErrorInfo::timeout("provider request", timeout.as_secs())),
            },
        }
    }

    /// Run one tool. Only cancellation is an error; everything else,
    /// including the deadline, becomes a failed result for the model.
    async fn execute_tool(
        &self,
        call: &ToolCallRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolResult, ErrorInfo> {
        let timeout = self.config.tool_timeout;
        let payload = tokio::select! {
            _ = cancel.cancelled() => return Err(ErrorInfo::cancelled()),
            result = tokio::time::timeout(timeout, self.tools.execute(&call.name, &call.arguments)) => {
                match result {
                    Ok(payload) => payload,
                    Err(_) => {
                        tracing::warn!(target: "nyron.chat.turn", tool = %call.name, "tool timed out");
                        error_envelope(
                            ToolError::Timeout {
                                tool: call.name.clone(),
                                secs: timeout.as_secs(),
                            }
                            .to_string(),
                        )
                    }
                }
            }
        };
        Ok(ToolResult::new(&call.id, &call.name, payload))
    }
}

fn history_error(error: HistoryError) -> ErrorInfo {
    ErrorInfo::new(ErrorKind::Protocol, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::message::Role;
    use crate::llm::mock_provider::{MockProvider, MockResponse};
    use crate::llm::provider::ToolDefinition;
    use crate::tools::success_envelope;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Executor that answers every call with a canned envelope
    #[derive(Default)]
    struct CannedTools {
        calls: Mutex<Vec<(String, String)>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ToolExecutor for CannedTools {
        fn definitions(&self) -> Vec<ToolDefinition> {
            crate::tools::builtin_definitions()
        }

        async fn execute(&self, tool_name: &str, arguments: &str) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((tool_name.to_string(), arguments.to_string()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if tool_name == "fail_me" {
                return error_envelope("it broke");
            }
            success_envelope("ok", serde_json::json!({}))
        }
    }

    #[derive(Default)]
    struct Recorder {
        states: Vec<TurnState>,
        tool_batches: Vec<Vec<String>>,
        results: Vec<ToolResult>,
    }

    impl TurnObserver for Recorder {
        fn on_state(&mut self, state: TurnState) {
            self.states.push(state);
        }

        fn on_tool_calls(&mut self, calls: &[ToolCallRequest]) {
            self.tool_batches
                .push(calls.iter().map(|c| c.id.clone()).collect());
        }

        fn on_tool_result(&mut self, _call: &ToolCallRequest, result: &ToolResult) {
            self.results.push(result.clone());
        }
    }

    fn controller(provider: MockProvider, tools: Arc<CannedTools>, max_turns: usize) -> TurnController {
        TurnController::new(
            ProviderSet::single("mock", Arc::new(provider)),
            tools,
            TurnConfig {
                max_turns,
                ..TurnConfig::default()
            },
        )
    }

    fn selection() -> ModelSelection {
        ModelSelection::new("mock", "mock-model")
    }

    #[tokio::test]
    async fn test_plain_answer_finalizes_and_clears_history() {
        let provider = MockProvider::new().with_script(vec![MockResponse::Completion(
            ChatCompletion::text("4").with_thinking("adding"),
        )]);
        let mut turn = controller(provider.clone(), Arc::new(CannedTools::default()), 25);
        let mut recorder = Recorder::default();

        let outcome = turn
            .run("2+2?", &selection(), &mut recorder, &CancellationToken::new())
            .await;

        assert_eq!(
            outcome,
            TurnOutcome::Finalized {
                thinking_text: "adding".to_string(),
                final_text: "4".to_string(),
                round_trips: 1,
            }
        );
        assert!(turn.history().is_empty());
        assert_eq!(
            recorder.states,
            vec![TurnState::AwaitingResponse, TurnState::Finalized]
        );

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "2+2?");
        assert_eq!(request.tools.len(), 9);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = MockProvider::new().with_script(vec![
            MockResponse::tool_call("t1", "list_directory", serde_json::json!({})),
            MockResponse::text("Found 3 files."),
        ]);
        let tools = Arc::new(CannedTools::default());
        let mut turn = controller(provider.clone(), tools.clone(), 25);
        let mut recorder = Recorder::default();

        let outcome = turn
            .run("what's here?", &selection(), &mut recorder, &CancellationToken::new())
            .await;

        match outcome {
            TurnOutcome::Finalized { final_text, round_trips, .. } => {
                assert_eq!(final_text, "Found 3 files.");
                assert_eq!(round_trips, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(tools.calls.lock().unwrap().len(), 1);
        assert_eq!(recorder.tool_batches, vec![vec!["t1".to_string()]]);
        assert_eq!(
            recorder.states,
            vec![
                TurnState::AwaitingResponse,
                TurnState::ToolsRequested,
                TurnState::ExecutingTools,
                TurnState::AwaitingResponse,
                TurnState::Finalized,
            ]
        );

        let second = provider.last_request().unwrap();
        let tool_message = second.messages.last().unwrap();
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_turn_cap_fails_without_running_last_tools() {
        let provider = MockProvider::new().with_tool_call("loop", "list_directory", serde_json::json!({}));
        let tools = Arc::new(CannedTools::default());
        let mut turn = controller(provider.clone(), tools.clone(), 3);

        let outcome = turn
            .run("go", &selection(), &mut NoopTurnObserver, &CancellationToken::new())
            .await;

        assert_eq!(outcome.error().unwrap().kind, ErrorKind::TurnLimitExceeded);
        assert_eq!(provider.call_count(), 3);
        assert_eq!(tools.calls.lock().unwrap().len(), 2);
        assert!(turn.history().is_empty());
    }

    #[tokio::test]
    async fn test_tool_failure_is_fed_back() {
        let provider = MockProvider::new().with_script(vec![
            MockResponse::tool_call("t1", "fail_me", serde_json::json!({})),
            MockResponse::text("sorry"),
        ]);
        let mut turn = controller(provider.clone(), Arc::new(CannedTools::default()), 25);
        let mut recorder = Recorder::default();

        let outcome = turn
            .run("try", &selection(), &mut recorder, &CancellationToken::new())
            .await;

        assert!(outcome.is_finalized());
        assert!(!recorder.results[0].success);
        let fed_back = &provider.last_request().unwrap().messages;
        assert!(fed_back.last().unwrap().content.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn test_provider_error_fails_and_clears() {
        let provider = MockProvider::new()
            .with_script(vec![MockResponse::NetworkError("connection refused".to_string())]);
        let mut turn = controller(provider, Arc::new(CannedTools::default()), 25);

        let outcome = turn
            .run("hi", &selection(), &mut NoopTurnObserver, &CancellationToken::new())
            .await;

        assert_eq!(outcome.error().unwrap().kind, ErrorKind::Transport);
        assert!(turn.history().is_empty());
    }

    #[tokio::test]
    async fn test_protocol_error_kind() {
        let provider = MockProvider::new()
            .with_script(vec![MockResponse::InvalidResponse("No choices in response".to_string())]);
        let mut turn = controller(provider, Arc::new(CannedTools::default()), 25);

        let outcome = turn
            .run("hi", &selection(), &mut NoopTurnObserver, &CancellationToken::new())
            .await;
        assert_eq!(outcome.error().unwrap().kind, ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_provider_call() {
        let provider = MockProvider::new();
        let mut turn = controller(provider.clone(), Arc::new(CannedTools::default()), 25);

        let outcome = turn
            .run("   ", &selection(), &mut NoopTurnObserver, &CancellationToken::new())
            .await;

        assert_eq!(outcome.error().unwrap().kind, ErrorKind::InvalidInput);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let mut turn = controller(MockProvider::new(), Arc::new(CannedTools::default()), 25);
        let outcome = turn
            .run(
                "hi",
                &ModelSelection::new("openai", "gpt-4o"),
                &mut NoopTurnObserver,
                &CancellationToken::new(),
            )
            .await;
        assert!(outcome.error().unwrap().message.contains("openai"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_deadline() {
        let provider = MockProvider::new().with_latency(Duration::from_secs(600));
        let mut turn = controller(provider, Arc::new(CannedTools::default()), 25);

        let outcome = turn
            .run("hi", &selection(), &mut NoopTurnObserver, &CancellationToken::new())
            .await;
        assert_eq!(outcome.error().unwrap().kind, ErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_deadline_becomes_failed_result() {
        let provider = MockProvider::new().with_script(vec![
            MockResponse::tool_call("t1", "list_directory", serde_json::json!({})),
            MockResponse::text("done"),
        ]);
        let tools = Arc::new(CannedTools {
            delay: Some(Duration::from_secs(600)),
            ..CannedTools::default()
        });
        let mut turn = controller(provider, tools, 25);
        let mut recorder = Recorder::default();

        let outcome = turn
            .run("hi", &selection(), &mut recorder, &CancellationToken::new())
            .await;

        assert!(outcome.is_finalized());
        assert!(!recorder.results[0].success);
        assert!(recorder.results[0].message().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation() {
        let provider = MockProvider::new().with_latency(Duration::from_secs(30));
        let mut turn = controller(provider, Arc::new(CannedTools::default()), 25);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let outcome = turn
            .run("hi", &selection(), &mut NoopTurnObserver, &cancel)
            .await;
        assert_eq!(outcome.error().unwrap().kind, ErrorKind::Cancelled);
        assert!(turn.history().is_empty());
    }
}
