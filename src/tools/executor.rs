// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool execution engine
//!
//! Decodes a tool call into a `ToolInvocation`, runs it against the local
//! machine and turns every outcome into a JSON envelope.

use async_trait::async_trait;

use crate::llm::provider::ToolDefinition;

use super::builtin;
use super::definition::builtin_definitions;
use super::invocation::ToolInvocation;
use super::{error_envelope, ToolContext, ToolError, ToolExecutor};

/// Executor for the built-in local tools
pub struct LocalToolExecutor {
    context: ToolContext,
    client: reqwest::Client,
}

impl LocalToolExecutor {
    /// Create a new executor
    pub fn new(context: ToolContext) -> Self {
        Self {
            context,
            client: reqwest::Client::new(),
        }
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    async fn run(&self, invocation: &ToolInvocation) -> std::result::Result<String, ToolError> {
        let ctx = &self.context;
        match invocation {
            ToolInvocation::CreateFileOrFolder(p) => builtin::create_file_or_folder(p, ctx),
            ToolInvocation::EditContent(p) => builtin::edit_content(p, ctx),
            ToolInvocation::WriteContent(p) => builtin::write_content(p, ctx),
            ToolInvocation::ListDirectory(p) => builtin::list_directory(p, ctx),
            ToolInvocation::SearchFiles(p) => builtin::search_files(p, ctx),
            ToolInvocation::ReadFile(p) => builtin::read_file(p, ctx),
            ToolInvocation::GetFileInfo(p) => builtin::get_file_info(p, ctx),
            ToolInvocation::GetCurrentDirectory => builtin::get_current_directory(ctx),
            ToolInvocation::WebSearch(p) => builtin::web_search(p, ctx, &self.client).await,
        }
    }
}

#[async_trait]
impl ToolExecutor for LocalToolExecutor {
    fn definitions(&self) -> Vec<ToolDefinition> {
        builtin_definitions()
    }

    async fn execute(&self, tool_name: &str, arguments: &str) -> String {
        let invocation = match ToolInvocation::decode(tool_name, arguments) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!(target: "nyron.tools", tool = tool_name, error = %e, "rejected tool call");
                return error_envelope(e.to_string());
            }
        };

        match self.run(&invocation).await {
            Ok(payload) => {
                tracing::debug!(target: "nyron.tools", tool = tool_name, "tool succeeded");
                payload
            }
            Err(e) => {
                tracing::info!(target: "nyron.tools", tool = tool_name, error = %e, "tool failed");
                error_envelope(e.to_string())
            }
        }
    }
}
