// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Nyron - a terminal chat client for LLM providers with local tool calling.
//!
//! This crate exposes the runtime used by the `nyron` binary:
//! - `llm`: provider abstraction, the OpenAI-compatible HTTP provider and a
//!   scripted mock for tests
//! - `chat`: the agentic turn controller and the stream batcher
//! - `tools`: the built-in local tools and their JSON result envelopes
//! - `config`: settings, credentials and the model catalog
//! - `tui`: the chat screen, its event loop and markdown rendering

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod tools;
pub mod tui;

pub use error::{NyronError, Result};
