// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for Nyron
//!
//! Handles loading user settings and the static model catalog.

pub mod models;
pub mod settings;

pub use models::{ModelInfo, ModelSelection, ProviderInfo};
pub use settings::*;
