// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory for creating LLM providers
//!
//! Providers are built once at startup and handed to the components that
//! need them as a `ProviderSet`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::models;
use crate::config::{ApiKeys, Settings};
use crate::error::{NyronError, Result};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::OpenAiCompatProvider;

/// Providers available for this session, keyed by provider id
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one provider under the given id.
    pub fn single(provider_id: impl Into<String>, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new().with(provider_id, provider)
    }

    pub fn with(mut self, provider_id: impl Into<String>, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider_id.into(), provider);
        self
    }

    /// Look up a provider, failing with a configuration error naming the
    /// missing credential.
    pub fn get(&self, provider_id: &str) -> Result<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).cloned().ok_or_else(|| {
            NyronError::Config(format!(
                "provider '{provider_id}' is not configured; set its API key environment variable"
            ))
        })
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.providers.contains_key(provider_id)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Factory for creating LLM providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create one provider by id
    pub fn create(
        provider_id: &str,
        settings: &Settings,
        keys: &ApiKeys,
    ) -> Result<Arc<dyn LlmProvider>> {
        let api_key = keys.provider(provider_id).ok_or_else(|| {
            let env = settings
                .providers
                .get(provider_id)
                .map(|c| c.api_key_env.as_str())
                .unwrap_or("an API key");
            NyronError::Config(format!(
                "No API key found for {provider_id}. Set {env} in your environment."
            ))
        })?;

        let provider = match provider_id {
            "openrouter" => OpenAiCompatProvider::openrouter(api_key),
            "openai" => OpenAiCompatProvider::openai(api_key),
            "gemini" => OpenAiCompatProvider::gemini(api_key),
            other => {
                return Err(NyronError::Config(format!("Unknown provider: {other}")));
            }
        };

        let provider = match settings
            .providers
            .get(provider_id)
            .and_then(|c| c.base_url.clone())
        {
            Some(base_url) => provider.with_base_url(base_url),
            None => provider,
        };

        Ok(Arc::new(provider))
    }

    /// Create every catalog provider that has credentials.
    ///
    /// Fails when no provider is usable, since the client cannot do anything
    /// without one.
    pub fn create_all(settings: &Settings, keys: &ApiKeys) -> Result<ProviderSet> {
        let mut set = ProviderSet::new();
        for provider in models::all_providers() {
            if keys.provider(provider.id).is_none() {
                tracing::debug!(target: "nyron.llm", provider = provider.id, "no credentials, skipping");
                continue;
            }
            set = set.with(provider.id, Self::create(provider.id, settings, keys)?);
        }

        if set.is_empty() {
            return Err(NyronError::Config(
                "No provider credentials found. Set OPENROUTER_API_KEY, OPENAI_API_KEY or GEMINI_API_KEY."
                    .to_string(),
            ));
        }
        Ok(set)
    }
}
