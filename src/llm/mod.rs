// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for Nyron
//!
//! Provides abstraction over different LLM providers.

pub mod factory;
pub mod message;
pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod stream;

pub use factory::{ProviderFactory, ProviderSet};
pub use message::*;
pub use provider::*;
pub use stream::{fragment_channel, FragmentSender, StreamFragment};
