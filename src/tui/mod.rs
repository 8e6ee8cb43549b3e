// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Terminal interface
//!
//! The interactive chat screen and the markdown renderer it uses for
//! assistant answers. Uses ratatui for rendering and crossterm for input.

pub mod chat;
pub mod markdown;
