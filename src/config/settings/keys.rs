// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;

use super::Settings;

/// Credentials resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    providers: HashMap<String, String>,
    serper: Option<String>,
}

impl ApiKeys {
    /// Resolve keys from the process environment, falling back to the
    /// settings file.
    pub fn from_env(settings: &Settings) -> Self {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }

    /// Resolve keys with a custom variable lookup.
    pub fn resolve<F>(settings: &Settings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut providers = HashMap::new();
        for id in ["openrouter", "openai", "gemini"] {
            let Some(config) = settings.providers.get(id) else {
                continue;
            };
            // Priority: env var > config file.
            let key = lookup(&config.api_key_env)
                .filter(|k| !k.trim().is_empty())
                .or_else(|| config.api_key.clone());
            if let Some(key) = key {
                providers.insert(id.to_string(), key);
            }
        }

        let serper = lookup(&settings.tools.serper_api_key_env).filter(|k| !k.trim().is_empty());

        Self { providers, serper }
    }

    pub fn provider(&self, provider_id: &str) -> Option<&str> {
        self.providers.get(provider_id).map(String::as_str)
    }

    pub fn serper(&self) -> Option<&str> {
        self.serper.as_deref()
    }

    /// Provider ids that have a key, sorted.
    pub fn configured_providers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn with_provider(mut self, provider_id: &str, key: &str) -> Self {
        self.providers
            .insert(provider_id.to_string(), key.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_env() {
        let mut settings = Settings::default();
        settings.providers.openai.api_key = Some("from-file".to_string());

        let keys = ApiKeys::resolve(&settings, |name| match name {
            "OPENAI_API_KEY" => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(keys.provider("openai"), Some("from-env"));
    }

    #[test]
    fn test_resolve_falls_back_to_file() {
        let mut settings = Settings::default();
        settings.providers.gemini.api_key = Some("from-file".to_string());

        let keys = ApiKeys::resolve(&settings, |_| None);
        assert_eq!(keys.provider("gemini"), Some("from-file"));
        assert_eq!(keys.provider("openrouter"), None);
        assert_eq!(keys.configured_providers(), vec!["gemini"]);
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let settings = Settings::default();
        let keys = ApiKeys::resolve(&settings, |_| Some("  ".to_string()));
        assert!(keys.configured_providers().is_empty());
        assert!(keys.serper().is_none());
    }

    #[test]
    fn test_serper_key() {
        let settings = Settings::default();
        let keys = ApiKeys::resolve(&settings, |name| {
            (name == "SERPER_API_KEY").then(|| "serper".to_string())
        });
        assert_eq!(keys.serper(), Some("serper"));
    }
}
