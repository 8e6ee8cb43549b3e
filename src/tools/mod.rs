// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool system for Nyron
//!
//! Provides the local tools the model can call: file and directory
//! operations plus web search. Every execution produces a JSON envelope of
//! the form `{"success": bool, "message": string, ...}`; failures are
//! reported inside the envelope and never raised to the caller.

pub mod builtin;
pub mod definition;
pub mod display;
pub mod executor;
pub mod invocation;

pub use definition::*;
pub use display::describe_tool_call;
pub use executor::*;
pub use invocation::ToolInvocation;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::llm::provider::ToolDefinition;

/// Errors produced while decoding or running a tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool name is not part of the tool set
    #[error("Unknown tool or invalid parameters: {0}")]
    UnknownTool(String),

    /// The arguments could not be decoded for this tool
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The tool ran and failed
    #[error("{0}")]
    Failed(String),

    /// The tool did not finish before its deadline
    #[error("Tool {tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

impl ToolError {
    pub fn failed(message: impl Into<String>) -> Self {
        ToolError::Failed(message.into())
    }
}

/// Context provided to tools during execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Directory relative paths are resolved against
    pub working_directory: PathBuf,
    /// Serper API key for web_search
    pub serper_api_key: Option<String>,
    /// Search endpoint used by web_search
    pub search_endpoint: String,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(working_directory: PathBuf) -> Self {
        Self {
            working_directory,
            serper_api_key: None,
            search_endpoint: builtin::web_search::SERPER_ENDPOINT.to_string(),
        }
    }

    pub fn with_serper_api_key(mut self, key: Option<String>) -> Self {
        self.serper_api_key = key;
        self
    }

    pub fn with_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search_endpoint = endpoint.into();
        self
    }

    /// Resolve a tool path; empty means the working directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() || path == "." {
            return self.working_directory.clone();
        }
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.working_directory.join(candidate)
        }
    }
}

/// Result of one tool call, as fed back to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Id of the call this answers
    pub request_id: String,
    /// Tool name, for display
    pub tool_name: String,
    /// JSON envelope
    pub payload: String,
    pub success: bool,
}

impl ToolResult {
    pub fn new(request_id: impl Into<String>, tool_name: impl Into<String>, payload: String) -> Self {
        let success = serde_json::from_str::<Value>(&payload)
            .ok()
            .and_then(|v| v.get("success").and_then(Value::as_bool))
            .unwrap_or(false);
        Self {
            request_id: request_id.into(),
            tool_name: tool_name.into(),
            payload,
            success,
        }
    }

    /// The envelope's message field, if any.
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.payload)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
    }
}

/// Executes tools by name
///
/// Implementations never fail: every problem is encoded in the returned
/// envelope.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Definitions advertised to the model
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run one tool and return its JSON envelope
    async fn execute(&self, tool_name: &str, arguments: &str) -> String;
}

/// Build a success envelope from a data object.
pub fn success_envelope(message: impl Into<String>, data: Value) -> String {
    let mut object = Map::new();
    object.insert("success".to_string(), Value::Bool(true));
    object.insert("message".to_string(), Value::String(message.into()));
    if let Value::Object(fields) = data {
        for (key, value) in fields {
            object.entry(key).or_insert(value);
        }
    }
    Value::Object(object).to_string()
}

/// Build an error envelope.
pub fn error_envelope(message: impl Into<String>) -> String {
    serde_json::json!({
        "success": false,
        "message": message.into(),
    })
    .to_string()
}
