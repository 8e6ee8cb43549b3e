// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Nyron - a terminal chat client for LLM providers
//!
//! Entry point for the `nyron` binary.

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use nyron::chat::prompts;
use nyron::chat::{BatchPolicy, StreamOptions, TurnConfig, TurnController};
use nyron::config::models::models_for;
use nyron::config::{ApiKeys, ModelSelection, Settings};
use nyron::llm::{ProviderFactory, ProviderSet};
use nyron::tools::{LocalToolExecutor, ToolContext};
use nyron::tui::chat::{run_chat_tui, ChatSession, RequestMode};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("nyron: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_tracing()?;

    let settings = Settings::load().context("failed to load settings")?;
    let keys = ApiKeys::from_env(&settings);
    let providers =
        ProviderFactory::create_all(&settings, &keys).context("no usable LLM provider")?;

    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    let mut tool_context = ToolContext::new(cwd.clone())
        .with_serper_api_key(keys.serper().map(str::to_string));
    if let Some(endpoint) = &settings.tools.search_endpoint {
        tool_context = tool_context.with_search_endpoint(endpoint.clone());
    }

    let selection = initial_selection(&settings, &providers);
    let config = TurnConfig::from_settings(&settings, prompts::system_prompt(Some(&cwd)));
    let controller = TurnController::new(
        providers,
        Arc::new(LocalToolExecutor::new(tool_context)),
        config,
    );
    let stream_options = StreamOptions {
        policy: BatchPolicy::from(&settings.streaming),
        producer_buffer: settings.streaming.fragment_buffer.max(1),
        timeout: settings.conversation.stream_timeout(),
    };
    let mode = if settings.defaults.stream {
        RequestMode::Stream
    } else {
        RequestMode::Agent
    };

    tracing::info!(target: "nyron", model = %selection, mode = mode.label(), "starting");

    run_chat_tui(ChatSession {
        controller,
        stream_options,
        selection,
        mode,
    })
    .await
    .context("terminal error")?;

    Ok(())
}

/// Log to a file: the TUI owns the terminal.
fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_env("NYRON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let logs_dir = Settings::logs_dir();
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;
    let log_path = logs_dir.join("nyron.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// The configured default, or the first model of a provider that has
/// credentials when the default provider has none.
fn initial_selection(settings: &Settings, providers: &ProviderSet) -> ModelSelection {
    let preferred = settings.defaults.selection();
    if providers.contains(&preferred.provider) {
        return preferred;
    }
    providers
        .ids()
        .into_iter()
        .find_map(|id| {
            models_for(id)
                .first()
                .map(|model| ModelSelection::new(id, model.id))
        })
        .unwrap_or(preferred)
}
