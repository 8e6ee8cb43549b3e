// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Static model catalog
//!
//! The providers and models offered in the model picker.

use serde::{Deserialize, Serialize};

/// A provider known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
}

/// A model offered by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The provider/model pair used for the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub provider: String,
    pub model: String,
}

impl ModelSelection {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl std::fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

pub const PROVIDER_GEMINI: ProviderInfo = ProviderInfo {
    id: "gemini",
    name: "Google Gemini",
};

pub const PROVIDER_OPENAI: ProviderInfo = ProviderInfo {
    id: "openai",
    name: "OpenAI",
};

pub const PROVIDER_OPENROUTER: ProviderInfo = ProviderInfo {
    id: "openrouter",
    name: "OpenRouter",
};

const GEMINI_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
        description: "Fast and efficient model for quick responses",
    },
    ModelInfo {
        id: "gemini-2.5-pro",
        name: "Gemini 2.5 Pro",
        description: "Advanced model with superior reasoning capabilities",
    },
];

const OPENAI_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-5-2025-08-07",
        name: "GPT-5",
        description: "Latest GPT-5 model with enhanced capabilities",
    },
    ModelInfo {
        id: "gpt-5-mini-2025-08-07",
        name: "GPT-5 Mini",
        description: "Lightweight version of GPT-5 for faster responses",
    },
    ModelInfo {
        id: "gpt-4o-2024-08-06",
        name: "GPT-4o",
        description: "Optimized GPT-4 model for improved performance",
    },
];

const OPENROUTER_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "x-ai/grok-4-fast:free",
        name: "Grok-4 Fast",
        description: "xAI's Grok-4 model optimized for speed",
    },
    ModelInfo {
        id: "deepseek/deepseek-chat-v3.1:free",
        name: "Deepseek V3",
        description: "Deepseek v3 is a large hybrid model",
    },
    ModelInfo {
        id: "z-ai/glm-4.5-air:free",
        name: "GLM 4.5 Air",
        description: "GLM-4.5-Air is the lightweight variant of GLM 4.5",
    },
    ModelInfo {
        id: "moonshotai/kimi-k2:free",
        name: "Kimi K2",
        description: "Kimi K2 Instruct is a large-scale Mixture-of-Experts language model",
    },
];

/// All providers in picker order.
pub fn all_providers() -> &'static [ProviderInfo] {
    &[PROVIDER_GEMINI, PROVIDER_OPENAI, PROVIDER_OPENROUTER]
}

/// Models offered by a provider; empty for unknown ids.
pub fn models_for(provider_id: &str) -> &'static [ModelInfo] {
    match provider_id {
        "gemini" => GEMINI_MODELS,
        "openai" => OPENAI_MODELS,
        "openrouter" => OPENROUTER_MODELS,
        _ => &[],
    }
}

pub fn find_provider(provider_id: &str) -> Option<ProviderInfo> {
    all_providers().iter().copied().find(|p| p.id == provider_id)
}

/// Display name for a model id, falling back to the id itself.
pub fn model_display_name(provider_id: &str, model_id: &str) -> String {
    models_for(provider_id)
        .iter()
        .find(|m| m.id == model_id)
        .map(|m| m.name.to_string())
        .unwrap_or_else(|| model_id.to_string())
}
