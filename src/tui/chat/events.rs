// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Event system for the chat TUI
//!
//! Everything the event loop reacts to arrives as an [`AppEvent`]: terminal
//! input, spinner ticks, batched stream fragments and turn progress. Work the
//! loop wants done comes back out of the reducer as [`Effect`]s, which the
//! runner carries out on background tasks.

use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::chat::{BatchedFragment, TurnOutcome, TurnObserver, TurnState};
use crate::config::ModelSelection;
use crate::llm::ToolCallRequest;
use crate::tools::ToolResult;

/// Identifies one submitted prompt. Events carrying another id are stale.
pub type RequestId = u64;

/// Input to the reducer
#[derive(Debug, Clone)]
pub enum AppEvent {
    // === Terminal ===
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Spinner tick
    Tick,

    // === Streaming path ===
    /// A batched fragment from the active stream
    Batch {
        request_id: RequestId,
        fragment: BatchedFragment,
    },

    // === Agent path ===
    TurnState {
        request_id: RequestId,
        state: TurnState,
    },
    ToolCallsRequested {
        request_id: RequestId,
        calls: Vec<ToolCallRequest>,
    },
    ToolCompleted {
        request_id: RequestId,
        result: ToolResult,
    },
    TurnFinished {
        request_id: RequestId,
        outcome: TurnOutcome,
    },
}

/// Follow-up work requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run an agentic turn for the prompt
    StartTurn {
        request_id: RequestId,
        prompt: String,
        selection: ModelSelection,
    },
    /// Start a streaming request for the prompt
    StartStream {
        request_id: RequestId,
        prompt: String,
        selection: ModelSelection,
    },
    /// Deliver the next batched fragment of the stream
    AwaitBatch { request_id: RequestId },
    /// Cancel the in-flight request
    Cancel { request_id: RequestId },
    Quit,
}

/// Sender half of the event channel
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Create the event channel
pub fn event_channel() -> (EventSender, mpsc::UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}

/// Forwards turn progress to the event loop.
pub struct ChannelObserver {
    request_id: RequestId,
    tx: EventSender,
}

impl ChannelObserver {
    pub fn new(request_id: RequestId, tx: EventSender) -> Self {
        Self { request_id, tx }
    }

    fn send(&self, event: AppEvent) {
        // The loop may already be gone during shutdown.
        let _ = self.tx.send(event);
    }
}

impl TurnObserver for ChannelObserver {
    fn on_state(&mut self, state: TurnState) {
        self.send(AppEvent::TurnState {
            request_id: self.request_id,
            state,
        });
    }

    fn on_tool_calls(&mut self, calls: &[ToolCallRequest]) {
        self.send(AppEvent::ToolCallsRequested {
            request_id: self.request_id,
            calls: calls.to_vec(),
        });
    }

    fn on_tool_result(&mut self, _call: &ToolCallRequest, result: &ToolResult) {
        self.send(AppEvent::ToolCompleted {
            request_id: self.request_id,
            result: result.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_tags_events() {
        let (tx, mut rx) = event_channel();
        let mut observer = ChannelObserver::new(7, tx);

        observer.on_state(TurnState::AwaitingResponse);
        let call = ToolCallRequest::new("t1", "get_current_directory", "{}");
        observer.on_tool_calls(std::slice::from_ref(&call));

        match rx.try_recv().unwrap() {
            AppEvent::TurnState { request_id, state } => {
                assert_eq!(request_id, 7);
                assert_eq!(state, TurnState::AwaitingResponse);
            }
            other => panic!("unexpected event {other:?}"),
        }
        match rx.try_recv().unwrap() {
            AppEvent::ToolCallsRequested { request_id, calls } => {
                assert_eq!(request_id, 7);
                assert_eq!(calls, vec![call]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_observer_survives_closed_channel() {
        let (tx, rx) = event_channel();
        drop(rx);
        let mut observer = ChannelObserver::new(1, tx);
        observer.on_state(TurnState::Finalized);
    }
}
