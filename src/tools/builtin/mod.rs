// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Built-in tools for Nyron

pub mod directory;
pub mod files;
pub mod web_search;

pub use directory::{get_current_directory, list_directory, search_files};
pub use files::{create_file_or_folder, edit_content, get_file_info, read_file, write_content};
pub use web_search::web_search;
