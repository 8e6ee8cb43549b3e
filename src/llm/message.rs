// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Message types for LLM interactions
//!
//! `ConversationHistory` is the only way the turn controller builds a
//! conversation. Its mutators keep the ordering rules the providers rely on:
//! the system prompt comes first, and every tool call requested by an
//! assistant message is answered by exactly one tool message before the
//! history can be sent again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,

    /// Text content
    pub content: String,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// Id of the call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool result
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Opaque id used to match the result
    pub id: String,
    /// Tool name
    pub name: String,
    /// Raw JSON arguments as produced by the model
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::assistant(content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text(Role::Tool, content)
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// Ordering violations rejected by `ConversationHistory`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history already seeded")]
    AlreadySeeded,

    #[error("history has not been seeded with a system and user message")]
    NotSeeded,

    #[error("tool result for unknown or already answered call {0}")]
    UnexpectedToolResult(String),

    #[error("{0} tool call(s) still unanswered")]
    PendingToolCalls(usize),
}

/// Ordered conversation owned by the turn controller
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    /// Ids requested by the last assistant message and not yet answered
    pending: Vec<String>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ids of tool calls still waiting for a result.
    pub fn pending_tool_calls(&self) -> &[String] {
        &self.pending
    }

    /// Start a conversation with the system prompt and first user message.
    pub fn seed(&mut self, system_prompt: &str, prompt: &str) -> Result<(), HistoryError> {
        if !self.messages.is_empty() {
            return Err(HistoryError::AlreadySeeded);
        }
        self.messages.push(Message::system(system_prompt));
        self.messages.push(Message::user(prompt));
        Ok(())
    }

    /// Append a follow-up user message to a seeded conversation.
    pub fn push_user(&mut self, prompt: &str) -> Result<(), HistoryError> {
        self.ensure_ready()?;
        self.messages.push(Message::user(prompt));
        Ok(())
    }

    /// Append an assistant reply; its tool calls become pending.
    pub fn push_assistant(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Result<(), HistoryError> {
        self.ensure_ready()?;
        self.pending = tool_calls.iter().map(|c| c.id.clone()).collect();
        self.messages
            .push(Message::assistant_with_tools(content, tool_calls));
        Ok(())
    }

    /// Append the result for one pending tool call.
    pub fn push_tool_result(
        &mut self,
        tool_call_id: &str,
        content: impl Into<String>,
    ) -> Result<(), HistoryError> {
        let Some(pos) = self.pending.iter().position(|id| id == tool_call_id) else {
            return Err(HistoryError::UnexpectedToolResult(tool_call_id.to_string()));
        };
        self.pending.remove(pos);
        self.messages.push(Message::tool_result(tool_call_id, content));
        Ok(())
    }

    /// Check the history can be sent to a provider.
    pub fn ensure_ready(&self) -> Result<(), HistoryError> {
        if self.messages.first().map(|m| m.role) != Some(Role::System) {
            return Err(HistoryError::NotSeeded);
        }
        if !self.pending.is_empty() {
            return Err(HistoryError::PendingToolCalls(self.pending.len()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.pending.clear();
    }
}
