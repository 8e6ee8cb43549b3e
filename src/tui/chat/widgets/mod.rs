// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! UI widgets for the chat TUI

pub mod help;
pub mod input_area;
pub mod message;
pub mod model_picker;
pub mod status_bar;

pub use help::HelpOverlay;
pub use input_area::InputArea;
pub use message::transcript_lines;
pub use model_picker::ModelPickerDialog;
pub use status_bar::StatusBar;
