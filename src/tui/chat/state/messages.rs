// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Message state for the chat TUI
//!
//! `DisplayMessage` is the transcript's projection of a conversation entry.
//! It is built from UI events only and never read back by the turn loop.

use ratatui::text::Line;

use crate::tools::describe_tool_call;

/// Truncate a string at a character boundary, appending "..." if truncated.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Who a transcript entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Error,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "you",
            MessageRole::Assistant => "nyron",
            MessageRole::System => "system",
            MessageRole::Error => "error",
        }
    }
}

/// Status of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStatus {
    Running,
    Success,
    Failed,
    /// The turn ended before the tool produced a result
    Cancelled,
}

impl ToolCallStatus {
    pub fn indicator(&self) -> char {
        match self {
            ToolCallStatus::Running => '⏳',
            ToolCallStatus::Success => '✓',
            ToolCallStatus::Failed => '✗',
            ToolCallStatus::Cancelled => '⊘',
        }
    }
}

/// A tool call summarized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayToolCall {
    pub id: String,
    /// Human-readable step, e.g. "Reading file"
    pub title: String,
    /// What the step acts on, e.g. the path
    pub detail: String,
    pub status: ToolCallStatus,
    /// The tool's result message once it has finished
    pub result_preview: Option<String>,
}

impl DisplayToolCall {
    pub fn new(id: impl Into<String>, name: &str, arguments: &str) -> Self {
        let (title, detail) = describe_tool_call(name, arguments);
        Self {
            id: id.into(),
            title,
            detail,
            status: ToolCallStatus::Running,
            result_preview: None,
        }
    }

    pub fn complete(&mut self, success: bool, message: impl Into<String>) {
        self.status = if success {
            ToolCallStatus::Success
        } else {
            ToolCallStatus::Failed
        };
        self.result_preview = Some(message.into());
    }
}

/// A transcript entry
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub role: MessageRole,
    pub content: String,
    /// Reasoning text shown above the answer
    pub thinking: Option<String>,
    pub tool_calls: Vec<DisplayToolCall>,
    /// Still receiving text
    pub is_streaming: bool,
    /// Rendered lines and the width they were rendered at
    rendered: Option<(u16, Vec<Line<'static>>)>,
}

impl DisplayMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            thinking: None,
            tool_calls: Vec::new(),
            is_streaming: false,
            rendered: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// An empty assistant message that text will stream into.
    pub fn assistant_streaming() -> Self {
        let mut message = Self::new(MessageRole::Assistant, "");
        message.is_streaming = true;
        message
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Error, content)
    }

    pub fn append(&mut self, text: &str) {
        self.content.push_str(text);
        self.rendered = None;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.rendered = None;
    }

    pub fn set_thinking(&mut self, thinking: &str) {
        let thinking = thinking.trim();
        self.thinking = (!thinking.is_empty()).then(|| thinking.to_string());
        self.rendered = None;
    }

    pub fn set_streaming(&mut self, streaming: bool) {
        self.is_streaming = streaming;
        self.rendered = None;
    }

    pub fn push_tool_call(&mut self, call: DisplayToolCall) {
        self.tool_calls.push(call);
        self.rendered = None;
    }

    /// Mark a tool call finished. Returns false for an unknown id.
    pub fn complete_tool_call(&mut self, id: &str, success: bool, message: &str) -> bool {
        match self.tool_calls.iter_mut().find(|call| call.id == id) {
            Some(call) => {
                call.complete(success, message);
                self.rendered = None;
                true
            }
            None => false,
        }
    }

    /// Mark any still-running tool calls as cancelled.
    pub fn cancel_running_tools(&mut self) {
        for call in &mut self.tool_calls {
            if call.status == ToolCallStatus::Running {
                call.status = ToolCallStatus::Cancelled;
            }
        }
        self.rendered = None;
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.thinking.is_none() && self.tool_calls.is_empty()
    }

    /// Cached lines, if they were rendered at this width.
    pub fn cached_lines(&self, width: u16) -> Option<&[Line<'static>]> {
        match &self.rendered {
            Some((cached_width, lines)) if *cached_width == width => Some(lines),
            _ => None,
        }
    }

    pub fn store_lines(&mut self, width: u16, lines: Vec<Line<'static>>) {
        self.rendered = Some((width, lines));
    }
}
