// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat pipeline
//!
//! The agentic turn controller for tool-calling conversations and the
//! streaming path (producer task plus batcher) for plain streamed answers.

pub mod batcher;
pub mod prompts;
pub mod streaming;
pub mod turn;

pub use batcher::{BatchPolicy, BatchedFragment, StreamBatcher};
pub use streaming::{start_stream, StreamOptions};
pub use turn::{
    NoopTurnObserver, TurnConfig, TurnController, TurnObserver, TurnOutcome, TurnState,
};
