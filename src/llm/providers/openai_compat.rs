// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI-compatible chat completions provider
//!
//! OpenRouter, OpenAI and Gemini (through its OpenAI compatibility endpoint)
//! all speak the same `/chat/completions` dialect, so one client covers them
//! with different base URLs.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, NyronError, Result};
use crate::llm::message::{Message, Role, ToolCallRequest};
use crate::llm::provider::{ChatCompletion, ChatRequest, LlmProvider, StreamRequest, ToolDefinition};
use crate::llm::stream::FragmentSender;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Provider for any OpenAI-compatible endpoint
pub struct OpenAiCompatProvider {
    name: String,
    client: Client,
    api_key: String,
    base_url: String,
    extra_headers: Vec<(&'static str, String)>,
}

impl OpenAiCompatProvider {
    /// Create a provider for a custom endpoint
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            extra_headers: Vec::new(),
        }
    }

    /// OpenRouter with its ranking headers
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", api_key, OPENROUTER_BASE_URL)
            .with_header("X-Title", "Nyron")
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", api_key, OPENAI_BASE_URL)
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::new("gemini", api_key, GEMINI_BASE_URL)
    }

    /// Replace the base URL (proxies and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra_headers.push((name, value.into()));
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Convert internal messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str().to_string(),
                content: if m.role == Role::Assistant && m.content.is_empty() {
                    None
                } else {
                    Some(m.content.clone())
                },
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|c| WireToolCall {
                                id: Some(c.id.clone()),
                                r#type: "function".to_string(),
                                function: WireFunctionCall {
                                    name: c.name.clone(),
                                    arguments: c.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tools to the wire format
    fn convert_tools(tools: &[ToolDefinition]) -> Vec<WireTool> {
        tools
            .iter()
            .map(|t| WireTool {
                r#type: "function".to_string(),
                function: WireFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: serde_json::json!({
                        "type": t.input_schema.schema_type,
                        "properties": t.input_schema.properties,
                        "required": t.input_schema.required,
                    }),
                },
            })
            .collect()
    }

    fn post(&self, body: &WireRequest) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json");
        for (name, value) in &self.extra_headers {
            req = req.header(*name, value);
        }
        req.json(body)
    }

    async fn send(&self, body: &WireRequest) -> Result<reqwest::Response> {
        let response = self.post(body).send().await.map_err(|e| {
            if e.is_timeout() {
                NyronError::Api(ApiError::Timeout)
            } else {
                NyronError::Api(ApiError::Network(e.to_string()))
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &body));
        }
        Ok(response)
    }
}

/// Parse an error response
fn parse_error(status: u16, body: &str) -> NyronError {
    let message = serde_json::from_str::<WireErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => NyronError::Api(ApiError::AuthenticationFailed),
        429 => NyronError::Api(ApiError::RateLimited(60)),
        404 => NyronError::Api(ApiError::ModelNotFound(message)),
        _ => NyronError::Api(ApiError::ServerError { status, message }),
    }
}

/// Turn a decoded response into a completion
fn into_completion(response: WireResponse) -> Result<ChatCompletion> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        NyronError::Api(ApiError::InvalidResponse(
            "No choices in response".to_string(),
        ))
    })?;

    let message = choice.message;
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let id = tc
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
            ToolCallRequest::new(id, tc.function.name, tc.function.arguments)
        })
        .collect();

    Ok(ChatCompletion {
        text: message.content.unwrap_or_default(),
        thinking: message
            .reasoning
            .or(message.reasoning_content)
            .unwrap_or_default(),
        tool_calls,
    })
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete_chat(&self, request: ChatRequest) -> Result<ChatCompletion> {
        let body = WireRequest {
            model: request.model.clone(),
            messages: Self::convert_messages(&request.messages),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(Self::convert_tools(&request.tools))
            },
            stream: None,
        };

        tracing::debug!(
            target: "nyron.llm",
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let response = self.send(&body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| NyronError::Api(ApiError::Network(e.to_string())))?;
        let decoded: WireResponse = serde_json::from_str(&text)
            .map_err(|e| NyronError::Api(ApiError::InvalidResponse(e.to_string())))?;
        into_completion(decoded)
    }

    async fn stream_chat(&self, request: StreamRequest, sink: &FragmentSender) -> Result<()> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(request.prompt.clone()));

        let body = WireRequest {
            model: request.model.clone(),
            messages: Self::convert_messages(&messages),
            tools: None,
            stream: Some(true),
        };

        let response = self.send(&body).await?;
        let mut bytes = response.bytes_stream();
        let mut lines = SseLineBuffer::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| NyronError::Api(ApiError::StreamError(e.to_string())))?;
            for line in lines.push(&chunk) {
                match parse_sse_line(&line)? {
                    SseEvent::Done => return Ok(()),
                    SseEvent::Delta(text) => sink.send_text(text).await?,
                    SseEvent::Skip => {}
                }
            }
        }

        // Some servers close the connection without sending [DONE].
        if let Some(line) = lines.finish() {
            if let SseEvent::Delta(text) = parse_sse_line(&line)? {
                sink.send_text(text).await?;
            }
        }
        Ok(())
    }
}

/// Splits a byte stream into complete lines, keeping partial UTF-8 intact
#[derive(Debug, Default)]
struct SseLineBuffer {
    buf: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).trim().to_string());
        }
        lines
    }

    fn finish(self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.buf).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

#[derive(Debug, PartialEq)]
enum SseEvent {
    Delta(String),
    Done,
    Skip,
}

/// Parse one SSE line.
fn parse_sse_line(line: &str) -> Result<SseEvent> {
    if line.is_empty() || line.starts_with(':') {
        return Ok(SseEvent::Skip);
    }
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Skip);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: WireStreamChunk = serde_json::from_str(data)
        .map_err(|e| NyronError::Api(ApiError::InvalidResponse(e.to_string())))?;

    if let Some(error) = chunk.error {
        return Err(NyronError::Api(ApiError::StreamError(error.message)));
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();
    if text.is_empty() {
        Ok(SseEvent::Skip)
    } else {
        Ok(SseEvent::Delta(text))
    }
}

// Wire types (OpenAI-compatible format)

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "default_function_type")]
    r#type: String,
    function: WireFunctionCall,
}

fn default_function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    r#type: String,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    #[serde(default)]
    choices: Vec<WireStreamChoice>,
    #[serde(default)]
    error: Option<WireErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireDelta,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAiCompatProvider::openai("key").with_base_url("http://localhost:9/v1/");
        assert_eq!(provider.endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn test_presets() {
        assert_eq!(OpenAiCompatProvider::openrouter("k").name(), "openrouter");
        assert_eq!(OpenAiCompatProvider::gemini("k").base_url, GEMINI_BASE_URL);
    }

    #[test]
    fn test_convert_messages_with_tool_calls() {
        let messages = vec![
            Message::system("sys"),
            Message::user("list"),
            Message::assistant_with_tools(
                "",
                vec![ToolCallRequest::new("t1", "list_directory", "{}")],
            ),
            Message::tool_result("t1", "{\"success\":true}"),
        ];
        let wire = OpenAiCompatProvider::convert_messages(&messages);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json[0]["role"], "system");
        assert!(json[2]["content"].is_null());
        assert_eq!(json[2]["tool_calls"][0]["id"], "t1");
        assert_eq!(json[2]["tool_calls"][0]["function"]["name"], "list_directory");
        assert_eq!(json[3]["role"], "tool");
        assert_eq!(json[3]["tool_call_id"], "t1");
    }

    #[test]
    fn test_into_completion_no_choices_is_protocol_error() {
        let err = into_completion(WireResponse { choices: vec![] }).unwrap_err();
        assert!(err.to_string().contains("No choices in response"));
    }

    #[test]
    fn test_into_completion_reads_reasoning_and_tools() {
        let response: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "content": "",
                    "reasoning": "thinking...",
                    "tool_calls": [{
                        "id": "t1",
                        "type": "function",
                        "function": {"name": "read_file", "arguments": "{\"FilePath\":\"a\"}"}
                    }]
                }
            }]
        }))
        .unwrap();
        let completion = into_completion(response).unwrap();
        assert_eq!(completion.thinking, "thinking...");
        assert_eq!(completion.tool_calls[0].id, "t1");
        assert_eq!(completion.tool_calls[0].arguments, "{\"FilePath\":\"a\"}");
    }

    #[test]
    fn test_missing_tool_call_id_is_generated() {
        let response: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"tool_calls": [
                {"function": {"name": "get_current_directory", "arguments": "{}"}}
            ]}}]
        }))
        .unwrap();
        let completion = into_completion(response).unwrap();
        assert!(completion.tool_calls[0].id.starts_with("call_"));
    }

    #[test]
    fn test_parse_error_statuses() {
        assert!(matches!(
            parse_error(401, "{}"),
            NyronError::Api(ApiError::AuthenticationFailed)
        ));
        assert!(matches!(
            parse_error(429, "{}"),
            NyronError::Api(ApiError::RateLimited(_))
        ));
        match parse_error(500, r#"{"error":{"message":"upstream down"}}"#) {
            NyronError::Api(ApiError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sse_line_buffer_handles_split_chunks() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        let lines = buffer.push(b":1}\n\ndata: [DONE]\n");
        assert_eq!(lines, vec!["data: {\"a\":1}", "", "data: [DONE]"]);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_sse_line_buffer_keeps_split_utf8() {
        let mut buffer = SseLineBuffer::default();
        let bytes = "data: é\n".as_bytes();
        assert!(buffer.push(&bytes[..7]).is_empty());
        assert_eq!(buffer.push(&bytes[7..]), vec!["data: é"]);
    }

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseEvent::Skip);
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseEvent::Done);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap(),
            SseEvent::Delta("Hi".to_string())
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{}}]}"#).unwrap(),
            SseEvent::Skip
        );
        assert!(parse_sse_line(r#"data: {"error":{"message":"overloaded"}}"#).is_err());
        assert!(parse_sse_line("data: not json").is_err());
    }
}
