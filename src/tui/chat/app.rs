// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat application state
//!
//! `ChatApp` owns everything the screen shows. It changes only through
//! [`ChatApp::update`], which applies one event and returns the effects the
//! runner should carry out. At most one request is in flight at a time: a
//! prompt submitted while one is running is rejected, never interleaved.

pub mod keymap;
#[cfg(test)]
mod tests;

use crossterm::event::{MouseEvent, MouseEventKind};

use crate::chat::{BatchedFragment, TurnOutcome, TurnState};
use crate::config::models::model_display_name;
use crate::config::ModelSelection;
use crate::error::{ErrorInfo, ErrorKind};
use crate::llm::ToolCallRequest;
use crate::tools::ToolResult;

use super::events::{AppEvent, Effect, RequestId};
use super::state::{DisplayMessage, DisplayToolCall, InputState, ModelPicker, ScrollState};

/// Braille spinner shown while a request is in flight
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const MOUSE_SCROLL_LINES: usize = 3;

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Transcript,
}

/// Dialog drawn over the chat
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Help,
    ModelPicker(ModelPicker),
}

/// How a prompt is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Tool-calling turn loop
    Agent,
    /// Single streamed answer, no tools
    Stream,
}

impl RequestMode {
    pub fn label(&self) -> &'static str {
        match self {
            RequestMode::Agent => "agent",
            RequestMode::Stream => "stream",
        }
    }
}

/// The request currently being answered
#[derive(Debug, Clone)]
pub struct InFlight {
    pub request_id: RequestId,
    pub prompt: String,
    pub mode: RequestMode,
    /// Transcript index of the assistant message being filled
    pub message_index: usize,
    pub cancelling: bool,
}

/// A one-line notice in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct ChatApp {
    pub messages: Vec<DisplayMessage>,
    pub input: InputState,
    pub scroll: ScrollState,
    pub focus: Focus,
    pub overlay: Overlay,
    pub selection: ModelSelection,
    pub mode: RequestMode,
    pub status: Option<StatusMessage>,
    /// Provider ids with credentials, offered in the model picker
    available_providers: Vec<String>,
    in_flight: Option<InFlight>,
    next_request_id: RequestId,
    turn_state: Option<TurnState>,
    spinner_frame: usize,
}

impl ChatApp {
    pub fn new(selection: ModelSelection, available_providers: Vec<String>, mode: RequestMode) -> Self {
        Self {
            messages: Vec::new(),
            input: InputState::new(),
            scroll: ScrollState::new(),
            focus: Focus::Input,
            overlay: Overlay::None,
            selection,
            mode,
            status: None,
            available_providers,
            in_flight: None,
            next_request_id: 0,
            turn_state: None,
            spinner_frame: 0,
        }
    }

    /// Apply one event and return the follow-up effects.
    pub fn update(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Vec::new()
            }
            // The next draw re-measures the transcript.
            AppEvent::Resize(..) => Vec::new(),
            AppEvent::Tick => {
                if self.is_loading() {
                    self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                }
                Vec::new()
            }
            AppEvent::Batch {
                request_id,
                fragment,
            } => self.on_batch(request_id, fragment),
            AppEvent::TurnState { request_id, state } => {
                if self.is_current(request_id, RequestMode::Agent) {
                    self.turn_state = Some(state);
                }
                Vec::new()
            }
            AppEvent::ToolCallsRequested { request_id, calls } => {
                if self.is_current(request_id, RequestMode::Agent) {
                    self.on_tool_calls(&calls);
                }
                Vec::new()
            }
            AppEvent::ToolCompleted { request_id, result } => {
                if self.is_current(request_id, RequestMode::Agent) {
                    self.on_tool_completed(&result);
                }
                Vec::new()
            }
            AppEvent::TurnFinished {
                request_id,
                outcome,
            } => {
                if self.is_current(request_id, RequestMode::Agent) {
                    self.on_turn_finished(outcome);
                }
                Vec::new()
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn turn_state(&self) -> Option<TurnState> {
        self.turn_state
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Status bar text describing the in-flight request
    pub fn activity_label(&self) -> Option<String> {
        let in_flight = self.in_flight.as_ref()?;
        let label = if in_flight.cancelling {
            "Cancelling"
        } else {
            match (in_flight.mode, self.turn_state) {
                (RequestMode::Stream, _) => "Streaming",
                (RequestMode::Agent, Some(state)) => state.label(),
                (RequestMode::Agent, None) => TurnState::AwaitingResponse.label(),
            }
        };
        Some(format!("{} {}...", self.spinner(), label))
    }

    pub fn model_label(&self) -> String {
        model_display_name(&self.selection.provider, &self.selection.model)
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    fn is_current(&self, request_id: RequestId, mode: RequestMode) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|f| f.request_id == request_id && f.mode == mode)
    }

    fn current_message(&mut self) -> Option<&mut DisplayMessage> {
        let index = self.in_flight.as_ref()?.message_index;
        self.messages.get_mut(index)
    }

    /// Submit the input as a new prompt.
    fn submit(&mut self) -> Vec<Effect> {
        if self.in_flight.is_some() {
            self.set_status("A response is still in progress (Ctrl+C to cancel)", true);
            return Vec::new();
        }
        let prompt = self.input.text().trim().to_string();
        if prompt.is_empty() {
            return Vec::new();
        }
        self.input.submit();

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let selection = self.selection.clone();

        self.messages.push(DisplayMessage::user(prompt.clone()));
        self.messages.push(match self.mode {
            RequestMode::Stream => DisplayMessage::assistant_streaming(),
            RequestMode::Agent => DisplayMessage::assistant(""),
        });
        self.in_flight = Some(InFlight {
            request_id,
            prompt: prompt.clone(),
            mode: self.mode,
            message_index: self.messages.len() - 1,
            cancelling: false,
        });
        self.turn_state = None;
        self.status = None;
        self.spinner_frame = 0;
        self.scroll.scroll_to_bottom();

        tracing::debug!(target: "nyron.tui.app", request_id, mode = self.mode.label(), "prompt submitted");

        match self.mode {
            RequestMode::Stream => vec![
                Effect::StartStream {
                    request_id,
                    prompt,
                    selection,
                },
                Effect::AwaitBatch { request_id },
            ],
            RequestMode::Agent => vec![Effect::StartTurn {
                request_id,
                prompt,
                selection,
            }],
        }
    }

    /// Ctrl+C: cancel the request in flight, or quit when idle.
    fn cancel_or_quit(&mut self) -> Vec<Effect> {
        match self.in_flight.as_mut() {
            Some(in_flight) if !in_flight.cancelling => {
                in_flight.cancelling = true;
                vec![Effect::Cancel {
                    request_id: in_flight.request_id,
                }]
            }
            _ => vec![Effect::Quit],
        }
    }

    fn on_batch(&mut self, request_id: RequestId, fragment: BatchedFragment) -> Vec<Effect> {
        if !self.is_current(request_id, RequestMode::Stream) {
            tracing::debug!(target: "nyron.tui.app", request_id, "ignoring stale fragment");
            return Vec::new();
        }

        if let Some(message) = self.current_message() {
            if !fragment.text.is_empty() {
                message.append(&fragment.text);
            }
        }

        if let Some(error) = fragment.error {
            self.fail_request(error);
            Vec::new()
        } else if fragment.is_terminal {
            if let Some(message) = self.current_message() {
                message.set_streaming(false);
            }
            self.in_flight = None;
            Vec::new()
        } else {
            vec![Effect::AwaitBatch { request_id }]
        }
    }

    fn on_tool_calls(&mut self, calls: &[ToolCallRequest]) {
        if let Some(message) = self.current_message() {
            for call in calls {
                message.push_tool_call(DisplayToolCall::new(&call.id, &call.name, &call.arguments));
            }
        }
    }

    fn on_tool_completed(&mut self, result: &ToolResult) {
        let fallback = if result.success { "done" } else { "failed" };
        let text = result.message().unwrap_or_else(|| fallback.to_string());
        if let Some(message) = self.current_message() {
            message.complete_tool_call(&result.request_id, result.success, &text);
        }
    }

    fn on_turn_finished(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Finalized {
                thinking_text,
                final_text,
                ..
            } => {
                if let Some(message) = self.current_message() {
                    message.set_thinking(&thinking_text);
                    message.set_content(final_text);
                }
                self.in_flight = None;
                self.turn_state = None;
            }
            TurnOutcome::Failed { error } => self.fail_request(error),
        }
    }

    /// End the in-flight request with an error: report it inline, put the
    /// prompt back in the input and return to idle.
    fn fail_request(&mut self, error: ErrorInfo) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        self.turn_state = None;

        if let Some(message) = self.messages.get_mut(in_flight.message_index) {
            message.set_streaming(false);
            message.cancel_running_tools();
            if message.is_blank() && in_flight.message_index + 1 == self.messages.len() {
                self.messages.pop();
            }
        }

        if error.kind == ErrorKind::Cancelled {
            self.messages.push(DisplayMessage::system("Request cancelled."));
            self.set_status("Cancelled", false);
        } else {
            self.messages.push(DisplayMessage::error(format!(
                "{}\n\nEdit the prompt and press Enter to retry, or Ctrl+C to quit.",
                error
            )));
            self.set_status(error.kind.label(), true);
        }

        if self.input.is_empty() {
            self.input.set_buffer(in_flight.prompt);
        }
        self.focus = Focus::Input;
        self.scroll.scroll_to_bottom();
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.scroll_up(MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => self.scroll.scroll_down(MOUSE_SCROLL_LINES),
            _ => {}
        }
    }

    fn open_model_picker(&mut self) {
        let picker = ModelPicker::new(&self.available_providers, &self.selection);
        if picker.is_empty() {
            self.set_status("No providers configured", true);
        } else {
            self.overlay = Overlay::ModelPicker(picker);
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            RequestMode::Agent => RequestMode::Stream,
            RequestMode::Stream => RequestMode::Agent,
        };
        self.set_status(format!("Mode: {}", self.mode.label()), false);
    }

    fn set_focus(&mut self, focus: Focus) {
        if focus == self.focus {
            return;
        }
        if focus == Focus::Input && self.is_loading() {
            self.set_status("Input is locked while a response is in progress", true);
            return;
        }
        self.focus = focus;
    }
}
