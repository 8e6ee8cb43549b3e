// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use super::*;
use crate::llm::StreamFragment;
use crate::tui::chat::state::{MessageRole, ToolCallStatus};

fn app(mode: RequestMode) -> ChatApp {
    ChatApp::new(
        ModelSelection::new("openai", "gpt-4o-2024-08-06"),
        vec!["openai".to_string(), "gemini".to_string()],
        mode,
    )
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn type_text(app: &mut ChatApp, text: &str) {
    for c in text.chars() {
        assert!(app.update(key(KeyCode::Char(c))).is_empty());
    }
}

fn submit(app: &mut ChatApp, text: &str) -> Vec<Effect> {
    type_text(app, text);
    app.update(key(KeyCode::Enter))
}

fn batch(request_id: RequestId, fragment: StreamFragment) -> AppEvent {
    AppEvent::Batch {
        request_id,
        fragment,
    }
}

// ==================== Submission ====================

#[test]
fn test_submit_in_agent_mode_starts_turn() {
    let mut app = app(RequestMode::Agent);
    let effects = submit(&mut app, "2+2?");

    assert_eq!(
        effects,
        vec![Effect::StartTurn {
            request_id: 1,
            prompt: "2+2?".to_string(),
            selection: ModelSelection::new("openai", "gpt-4o-2024-08-06"),
        }]
    );
    assert!(app.is_loading());
    assert!(app.input.is_empty());
    assert_eq!(app.messages[0].role, MessageRole::User);
    assert_eq!(app.messages[0].content, "2+2?");
}

#[test]
fn test_submit_in_stream_mode_awaits_first_batch() {
    let mut app = app(RequestMode::Stream);
    let effects = submit(&mut app, "hello");
    assert_eq!(effects.len(), 2);
    assert!(matches!(effects[0], Effect::StartStream { request_id: 1, .. }));
    assert_eq!(effects[1], Effect::AwaitBatch { request_id: 1 });
    assert!(app.messages[1].is_streaming);
}

#[test]
fn test_empty_prompt_is_not_submitted() {
    let mut app = app(RequestMode::Agent);
    assert!(submit(&mut app, "   ").is_empty());
    assert!(!app.is_loading());
    assert!(app.messages.is_empty());
}

#[test]
fn test_prompt_rejected_while_in_flight() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "first");

    let effects = submit(&mut app, "second");
    assert!(effects.is_empty());
    assert_eq!(app.in_flight().unwrap().request_id, 1);
    assert_eq!(app.input.text(), "second");
    assert!(app.status.as_ref().unwrap().is_error);
    assert_eq!(app.messages.len(), 2);
}

#[test]
fn test_multiline_prompt() {
    let mut app = app(RequestMode::Agent);
    type_text(&mut app, "line one");
    app.update(AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
    type_text(&mut app, "line two");
    assert_eq!(app.input.text(), "line one\nline two");
    assert!(!app.is_loading());
}

// ==================== Streaming ====================

#[test]
fn test_stream_fragments_append_in_order() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "hi");

    let effects = app.update(batch(1, StreamFragment::text("Hello, ")));
    assert_eq!(effects, vec![Effect::AwaitBatch { request_id: 1 }]);
    let effects = app.update(batch(1, StreamFragment::text("world")));
    assert_eq!(effects, vec![Effect::AwaitBatch { request_id: 1 }]);
    let effects = app.update(batch(1, StreamFragment::terminal()));

    assert!(effects.is_empty());
    assert!(!app.is_loading());
    assert_eq!(app.messages[1].content, "Hello, world");
    assert!(!app.messages[1].is_streaming);
}

#[test]
fn test_stream_error_mid_stream() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "tell me a story");

    app.update(batch(1, StreamFragment::text("Once upon")));
    let effects = app.update(batch(
        1,
        StreamFragment::error(ErrorInfo::new(ErrorKind::Transport, "connection reset")),
    ));

    assert!(effects.is_empty());
    assert!(!app.is_loading());
    assert_eq!(app.messages[1].content, "Once upon");
    assert!(!app.messages[1].is_streaming);
    let last = app.messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Error);
    assert!(last.content.contains("connection reset"));
    assert_eq!(app.input.text(), "tell me a story");
    assert_eq!(app.focus, Focus::Input);
}

#[test]
fn test_error_before_any_text_drops_placeholder() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "hi");
    app.update(batch(1, StreamFragment::error(ErrorInfo::interrupted())));

    assert_eq!(app.messages.len(), 2);
    assert_eq!(app.messages[0].role, MessageRole::User);
    assert_eq!(app.messages[1].role, MessageRole::Error);
}

#[test]
fn test_stale_fragments_are_ignored() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "one");
    app.update(batch(1, StreamFragment::terminal()));
    submit(&mut app, "two");

    let effects = app.update(batch(1, StreamFragment::text("late")));
    assert!(effects.is_empty());
    assert_eq!(app.messages[3].content, "");
    assert_eq!(app.in_flight().unwrap().request_id, 2);
}

#[test]
fn test_next_prompt_allowed_after_stream_ends() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "one");
    app.update(batch(1, StreamFragment::terminal()));
    let effects = submit(&mut app, "two");
    assert!(matches!(effects[0], Effect::StartStream { request_id: 2, .. }));
}

// ==================== Agent turns ====================

#[test]
fn test_turn_progress_and_final_answer() {
    let mut app = app(RequestMode::Agent);
    submit(&mut app, "list files in /tmp");

    app.update(AppEvent::TurnState {
        request_id: 1,
        state: TurnState::ExecutingTools,
    });
    assert!(app.activity_label().unwrap().contains("Running tools"));

    let call = ToolCallRequest::new("t1", "list_directory", r#"{"DirectoryPath":"/tmp"}"#);
    app.update(AppEvent::ToolCallsRequested {
        request_id: 1,
        calls: vec![call],
    });
    app.update(AppEvent::ToolCompleted {
        request_id: 1,
        result: ToolResult::new(
            "t1",
            "list_directory",
            r#"{"success":true,"message":"Listed 3 items in /tmp"}"#.to_string(),
        ),
    });
    app.update(AppEvent::TurnFinished {
        request_id: 1,
        outcome: TurnOutcome::Finalized {
            thinking_text: "checking".to_string(),
            final_text: "Found 3 files.".to_string(),
            round_trips: 2,
        },
    });

    assert!(!app.is_loading());
    let answer = &app.messages[1];
    assert_eq!(answer.content, "Found 3 files.");
    assert_eq!(answer.thinking.as_deref(), Some("checking"));
    assert_eq!(answer.tool_calls[0].status, ToolCallStatus::Success);
    assert_eq!(answer.tool_calls[0].detail, "/tmp");
}

#[test]
fn test_turn_failure_is_reported() {
    let mut app = app(RequestMode::Agent);
    submit(&mut app, "loop forever");
    app.update(AppEvent::ToolCallsRequested {
        request_id: 1,
        calls: vec![ToolCallRequest::new("t1", "get_current_directory", "{}")],
    });
    app.update(AppEvent::TurnFinished {
        request_id: 1,
        outcome: TurnOutcome::Failed {
            error: ErrorInfo::turn_limit_exceeded(25),
        },
    });

    assert!(!app.is_loading());
    assert_eq!(app.messages[1].tool_calls[0].status, ToolCallStatus::Cancelled);
    let last = app.messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Error);
    assert!(last.content.contains("turn limit exceeded"));
    assert_eq!(app.status.as_ref().unwrap().text, "turn limit exceeded");
}

#[test]
fn test_events_for_other_mode_are_ignored() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "hi");
    app.update(AppEvent::TurnFinished {
        request_id: 1,
        outcome: TurnOutcome::Finalized {
            thinking_text: String::new(),
            final_text: "nope".to_string(),
            round_trips: 1,
        },
    });
    assert!(app.is_loading());
}

// ==================== Cancellation and quitting ====================

#[test]
fn test_ctrl_c_cancels_then_quits() {
    let mut app = app(RequestMode::Agent);
    assert_eq!(app.update(ctrl('c')), vec![Effect::Quit]);

    submit(&mut app, "slow");
    assert_eq!(app.update(ctrl('c')), vec![Effect::Cancel { request_id: 1 }]);
    assert!(app.activity_label().unwrap().contains("Cancelling"));
    assert_eq!(app.update(ctrl('c')), vec![Effect::Quit]);
}

#[test]
fn test_cancelled_request_returns_to_idle() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "slow");
    app.update(ctrl('c'));
    app.update(batch(1, StreamFragment::error(ErrorInfo::cancelled())));

    assert!(!app.is_loading());
    let last = app.messages.last().unwrap();
    assert_eq!(last.role, MessageRole::System);
    assert_eq!(app.input.text(), "slow");
}

#[test]
fn test_q_quits_only_from_idle_transcript() {
    let mut app = app(RequestMode::Agent);
    app.update(key(KeyCode::Esc));
    assert_eq!(app.focus, Focus::Transcript);
    assert_eq!(app.update(key(KeyCode::Char('q'))), vec![Effect::Quit]);
}

// ==================== Focus, dialogs and modes ====================

#[test]
fn test_focus_to_input_rejected_while_busy() {
    let mut app = app(RequestMode::Stream);
    submit(&mut app, "hi");
    app.update(key(KeyCode::Tab));
    assert_eq!(app.focus, Focus::Transcript);

    app.update(key(KeyCode::Tab));
    assert_eq!(app.focus, Focus::Transcript);
    assert!(app.status.as_ref().unwrap().is_error);

    app.update(batch(1, StreamFragment::terminal()));
    app.update(key(KeyCode::Char('i')));
    assert_eq!(app.focus, Focus::Input);
}

#[test]
fn test_model_picker_changes_selection() {
    let mut app = app(RequestMode::Agent);
    app.update(ctrl('p'));
    assert!(matches!(app.overlay, Overlay::ModelPicker(_)));

    app.update(key(KeyCode::Down));
    app.update(key(KeyCode::Enter));
    assert!(matches!(app.overlay, Overlay::None));
    assert_ne!(
        app.selection,
        ModelSelection::new("openai", "gpt-4o-2024-08-06")
    );

    let effects = submit(&mut app, "hi");
    match &effects[0] {
        Effect::StartTurn { selection, .. } => assert_eq!(selection, &app.selection),
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn test_picker_without_providers() {
    let mut app = ChatApp::new(ModelSelection::new("openai", "x"), Vec::new(), RequestMode::Agent);
    app.update(ctrl('p'));
    assert!(matches!(app.overlay, Overlay::None));
    assert!(app.status.as_ref().unwrap().is_error);
}

#[test]
fn test_mode_toggle() {
    let mut app = app(RequestMode::Agent);
    app.update(ctrl('s'));
    assert_eq!(app.mode, RequestMode::Stream);
    app.update(ctrl('s'));
    assert_eq!(app.mode, RequestMode::Agent);
}

#[test]
fn test_help_overlay_swallows_keys() {
    let mut app = app(RequestMode::Agent);
    app.update(key(KeyCode::F(1)));
    assert!(matches!(app.overlay, Overlay::Help));
    app.update(key(KeyCode::Char('x')));
    assert!(app.input.is_empty());
    app.update(key(KeyCode::Esc));
    assert!(matches!(app.overlay, Overlay::None));
}

#[test]
fn test_spinner_ticks_only_while_loading() {
    let mut app = app(RequestMode::Stream);
    let idle = app.spinner();
    app.update(AppEvent::Tick);
    assert_eq!(app.spinner(), idle);

    submit(&mut app, "hi");
    app.update(AppEvent::Tick);
    assert_ne!(app.spinner(), idle);
}

#[test]
fn test_mouse_scroll() {
    let mut app = app(RequestMode::Agent);
    app.scroll.update(10, 40);
    app.update(AppEvent::Mouse(MouseEvent {
        kind: MouseEventKind::ScrollUp,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    }));
    assert_eq!(app.scroll.offset, 27);
    assert!(!app.scroll.auto_scroll);
}
