// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Nyron
//!
//! Handles loading settings from ~/.nyron/settings.json. Every field has a
//! default so a missing or partial file is fine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::models::ModelSelection;

mod io;
mod keys;

pub use keys::ApiKeys;

/// Main settings structure, stored in ~/.nyron/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// LLM provider configurations
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Initial model selection and mode
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Stream batching policy
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// Turn cap and deadlines
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Configuration for LLM providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openrouter")]
    pub openrouter: ProviderConfig,

    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,

    #[serde(default = "default_gemini")]
    pub gemini: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openrouter: default_openrouter(),
            openai: default_openai(),
            gemini: default_gemini(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider_id: &str) -> Option<&ProviderConfig> {
        match provider_id {
            "openrouter" => Some(&self.openrouter),
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            _ => None,
        }
    }
}

/// Connection settings for one OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, prefer the environment variable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Base URL override (for proxies and tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn with_env(api_key_env: &str) -> Self {
        Self {
            api_key: None,
            api_key_env: api_key_env.to_string(),
            base_url: None,
        }
    }
}

/// Initial selection for a new session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Start in streaming mode instead of the tool-calling agent mode
    #[serde(default)]
    pub stream: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            stream: false,
        }
    }
}

impl DefaultsConfig {
    pub fn selection(&self) -> ModelSelection {
        ModelSelection::new(self.provider.clone(), self.model.clone())
    }
}

/// Stream batching policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Quiet period after the last fragment before a flush
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Buffered bytes that force an immediate flush
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Flush buffered text before forwarding an error
    #[serde(default = "default_true")]
    pub flush_on_error: bool,

    /// Capacity of the producer-to-batcher channel
    #[serde(default = "default_fragment_buffer")]
    pub fragment_buffer: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_batch_bytes: default_max_batch_bytes(),
            flush_on_error: true,
            fragment_buffer: default_fragment_buffer(),
        }
    }
}

/// Turn cap and deadlines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum provider round-trips per prompt in agent mode
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            request_timeout_secs: default_request_timeout_secs(),
            stream_timeout_secs: default_stream_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl ConversationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Environment variable holding the Serper API key for web_search
    #[serde(default = "default_serper_api_key_env")]
    pub serper_api_key_env: String,

    /// Search endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_endpoint: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            serper_api_key_env: default_serper_api_key_env(),
            search_endpoint: None,
        }
    }
}

// Default value functions
fn default_openrouter() -> ProviderConfig {
    ProviderConfig::with_env("OPENROUTER_API_KEY")
}

fn default_openai() -> ProviderConfig {
    ProviderConfig::with_env("OPENAI_API_KEY")
}

fn default_gemini() -> ProviderConfig {
    ProviderConfig::with_env("GEMINI_API_KEY")
}

fn default_provider() -> String {
    "openrouter".to_string()
}

fn default_model() -> String {
    "x-ai/grok-4-fast:free".to_string()
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_max_batch_bytes() -> usize {
    1024
}

fn default_fragment_buffer() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_max_turns() -> usize {
    25
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_stream_timeout_secs() -> u64 {
    300
}

fn default_tool_timeout_secs() -> u64 {
    60
}

fn default_serper_api_key_env() -> String {
    "SERPER_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.defaults.provider, "openrouter");
        assert!(!settings.defaults.stream);
        assert_eq!(settings.streaming.debounce_ms, 50);
        assert_eq!(settings.streaming.max_batch_bytes, 1024);
        assert!(settings.streaming.flush_on_error);
        assert_eq!(settings.conversation.max_turns, 25);
    }

    #[test]
    fn test_provider_env_defaults() {
        let providers = ProvidersConfig::default();
        assert_eq!(providers.openrouter.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(providers.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(providers.gemini.api_key_env, "GEMINI_API_KEY");
        assert!(providers.get("anthropic").is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"conversation": {"max_turns": 5}, "defaults": {"stream": true}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.conversation.max_turns, 5);
        assert_eq!(settings.conversation.request_timeout_secs, 120);
        assert!(settings.defaults.stream);
        assert_eq!(settings.defaults.provider, "openrouter");
        assert_eq!(settings.tools.serper_api_key_env, "SERPER_API_KEY");
    }

    #[test]
    fn test_conversation_durations() {
        let config = ConversationConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.tool_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_defaults_selection() {
        let selection = DefaultsConfig::default().selection();
        assert_eq!(selection.provider, "openrouter");
        assert_eq!(selection.model, "x-ai/grok-4-fast:free");
    }
}
