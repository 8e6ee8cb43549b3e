// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use nyron::chat::{TurnConfig, TurnController, TurnObserver, TurnOutcome, TurnState};
use nyron::config::ModelSelection;
use nyron::error::ErrorKind;
use nyron::llm::mock_provider::{MockProvider, MockResponse};
use nyron::llm::{ChatCompletion, ProviderSet, Role, ToolCallRequest};
use nyron::tools::{LocalToolExecutor, ToolContext, ToolResult};

#[derive(Default)]
struct Recorder {
    states: Vec<TurnState>,
    requested: Vec<ToolCallRequest>,
    results: Vec<ToolResult>,
}

impl TurnObserver for Recorder {
    fn on_state(&mut self, state: TurnState) {
        self.states.push(state);
    }

    fn on_tool_calls(&mut self, calls: &[ToolCallRequest]) {
        self.requested.extend_from_slice(calls);
    }

    fn on_tool_result(&mut self, _call: &ToolCallRequest, result: &ToolResult) {
        self.results.push(result.clone());
    }
}

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        std::fs::write(temp_dir.path().join(name), name).unwrap();
    }
    temp_dir
}

fn controller(provider: &MockProvider, workspace: &TempDir, max_turns: usize) -> TurnController {
    let tools = LocalToolExecutor::new(ToolContext::new(workspace.path().to_path_buf()));
    TurnController::new(
        ProviderSet::single("mock", Arc::new(provider.clone())),
        Arc::new(tools),
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
async fn test_plain_question_single_round_trip() {
    let temp_dir = workspace();
    let provider = MockProvider::new().with_response("4");
    let mut turn = controller(&provider, &temp_dir, 25);
    let mut recorder = Recorder::default();

    let outcome = turn
        .run("2+2?", &selection(), &mut recorder, &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        TurnOutcome::Finalized {
            thinking_text: String::new(),
            final_text: "4".to_string(),
            round_trips: 1,
        }
    );
    assert_eq!(provider.call_count(), 1);
    assert!(recorder.requested.is_empty());
    assert!(turn.history().is_empty());
}

#[tokio::test]
async fn test_directory_listing_through_real_tools() {
    let temp_dir = workspace();
    let dir = temp_dir.path().display().to_string();
    let provider = MockProvider::new().with_script(vec![
        MockResponse::tool_call("t1", "list_directory", json!({ "DirectoryPath": dir })),
        MockResponse::Completion(
            ChatCompletion::text("Found 3 files.")
                .with_thinking("The listing shows three entries."),
        ),
    ]);
    let mut turn = controller(&provider, &temp_dir, 25);
    let mut recorder = Recorder::default();

    let outcome = turn
        .run("list files in the workspace", &selection(), &mut recorder, &CancellationToken::new())
        .await;

    match outcome {
        TurnOutcome::Finalized {
            thinking_text,
            final_text,
            round_trips,
        } => {
            assert_eq!(final_text, "Found 3 files.");
            assert_eq!(thinking_text, "The listing shows three entries.");
            assert_eq!(round_trips, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(recorder.results.len(), 1);
    let result = &recorder.results[0];
    assert!(result.success);
    let payload: Value = serde_json::from_str(&result.payload).unwrap();
    let names: Vec<&str> = payload["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);

    let second = &provider.recorded_requests()[1];
    let roles: Vec<Role> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::Tool]);
    assert_eq!(second.messages[2].tool_calls[0].id, "t1");
    assert_eq!(second.messages[3].tool_call_id.as_deref(), Some("t1"));
    assert_eq!(second.messages[3].content, result.payload);
}

#[tokio::test]
async fn test_several_calls_in_one_response_run_in_order() {
    let temp_dir = workspace();
    let provider = MockProvider::new().with_script(vec![
        MockResponse::Completion(ChatCompletion::tool_calls(vec![
            ToolCallRequest::new(
                "a",
                "write_content",
                json!({ "FilePath": "new.txt", "Content": "hi", "Mode": "overwrite" }).to_string(),
            ),
            ToolCallRequest::new(
                "b",
                "read_file",
                json!({ "FilePath": "new.txt" }).to_string(),
            ),
        ])),
        MockResponse::text("Wrote and read it back."),
    ]);
    let mut turn = controller(&provider, &temp_dir, 25);
    let mut recorder = Recorder::default();

    let outcome = turn
        .run("write then read", &selection(), &mut recorder, &CancellationToken::new())
        .await;
    assert!(outcome.is_finalized());

    let ids: Vec<&str> = recorder.requested.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(recorder.results.iter().all(|r| r.success));

    let second = &provider.recorded_requests()[1];
    let roles: Vec<Role> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Tool]
    );
    let answered: Vec<Option<&str>> = second.messages[3..]
        .iter()
        .map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(answered, vec![Some("a"), Some("b")]);

    // The read ran after the write finished.
    let read: Value = serde_json::from_str(&second.messages[4].content).unwrap();
    assert_eq!(read["success"], true);
    assert_eq!(read["content"], "hi");
}

#[tokio::test]
async fn test_failing_tool_does_not_abort_turn() {
    let temp_dir = workspace();
    let provider = MockProvider::new().with_script(vec![
        MockResponse::tool_call("call_1", "read_file", json!({ "FilePath": "missing.txt" })),
        MockResponse::tool_call("call_2", "no_such_tool", json!({})),
        MockResponse::text("I could not read it."),
    ]);
    let mut turn = controller(&provider, &temp_dir, 25);
    let mut recorder = Recorder::default();

    let outcome = turn
        .run("read missing.txt", &selection(), &mut recorder, &CancellationToken::new())
        .await;

    assert!(outcome.is_finalized());
    assert_eq!(recorder.results.len(), 2);
    assert!(recorder.results.iter().all(|r| !r.success));
    assert!(recorder.results[0]
        .message()
        .unwrap()
        .starts_with("Error reading file"));
    assert!(recorder.results[1]
        .message()
        .unwrap()
        .starts_with("Unknown tool or invalid parameters"));
}

#[tokio::test]
async fn test_turn_limit_exceeded() {
    let temp_dir = workspace();
    let provider =
        MockProvider::new().with_tool_call("again", "get_current_directory", json!({}));
    let mut turn = controller(&provider, &temp_dir, 25);
    let mut recorder = Recorder::default();

    let outcome = turn
        .run("loop forever", &selection(), &mut recorder, &CancellationToken::new())
        .await;

    let error = outcome.error().unwrap();
    assert_eq!(error.kind, ErrorKind::TurnLimitExceeded);
    assert_eq!(provider.call_count(), 25);
    assert_eq!(recorder.results.len(), 24);
    assert_eq!(recorder.states.last(), Some(&TurnState::Failed));
    assert!(turn.history().is_empty());
}

#[tokio::test]
async fn test_every_request_is_well_formed_and_turns_start_fresh() {
    let temp_dir = workspace();
    let provider = MockProvider::new().with_script(vec![
        MockResponse::tool_call("call_1", "get_current_directory", json!({})),
        MockResponse::tool_call("call_2", "search_files", json!({ "Pattern": "*.txt" })),
        MockResponse::text("done"),
        MockResponse::text("second answer"),
    ]);
    let mut turn = controller(&provider, &temp_dir, 25);

    let first = turn
        .run("explore", &selection(), &mut Recorder::default(), &CancellationToken::new())
        .await;
    assert!(first.is_finalized());
    assert!(turn.history().is_empty());

    let second = turn
        .run("next", &selection(), &mut Recorder::default(), &CancellationToken::new())
        .await;
    assert!(second.is_finalized());

    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), 4);
    for request in &requests {
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        // Every tool message answers a call from the assistant message
        // before it.
        let mut open: Vec<String> = Vec::new();
        for message in &request.messages[2..] {
            match message.role {
                Role::Assistant => {
                    assert!(open.is_empty());
                    open = message.tool_calls.iter().map(|c| c.id.clone()).collect();
                }
                Role::Tool => {
                    let id = message.tool_call_id.clone().unwrap();
                    let position = open.iter().position(|o| *o == id).unwrap();
                    open.remove(position);
                }
                role => panic!("unexpected {role:?} message mid-turn"),
            }
        }
        assert!(open.is_empty());
    }

    assert_eq!(requests[3].messages.len(), 2);
    assert_eq!(requests[3].messages[1].content, "next");
}
