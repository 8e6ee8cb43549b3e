// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat TUI module
//!
//! The terminal chat: a transcript with streamed or agentic answers, a
//! multi-line prompt with history, a model picker and a help overlay.

pub mod app;
pub mod events;
pub mod runner;
pub mod state;
pub mod ui;
pub mod widgets;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::chat::{StreamOptions, TurnController};
use crate::config::ModelSelection;
use crate::error::{NyronError, Result};

pub use app::{ChatApp, Focus, Overlay, RequestMode};
pub use events::{AppEvent, ChannelObserver, Effect, EventSender, RequestId};
pub use runner::{run_event_loop, Control, Runner};

/// Everything a chat session needs
pub struct ChatSession {
    pub controller: TurnController,
    pub stream_options: StreamOptions,
    pub selection: ModelSelection,
    pub mode: RequestMode,
}

impl ChatSession {
    /// Split into the UI state and the runner that serves it.
    pub fn into_parts(self) -> (ChatApp, Runner) {
        let available = self
            .controller
            .providers()
            .ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let app = ChatApp::new(self.selection, available, self.mode);
        let runner = Runner::new(self.controller, self.stream_options);
        (app, runner)
    }
}

fn tui_error(e: impl std::fmt::Display) -> NyronError {
    NyronError::Tui(e.to_string())
}

/// Run the chat TUI until the user quits.
pub async fn run_chat_tui(session: ChatSession) -> Result<()> {
    // Restore the terminal before printing a panic.
    let original_panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_panic_hook(panic_info);
    }));

    enable_raw_mode().map_err(tui_error)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(tui_error)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(tui_error)?;

    let (mut app, mut runner) = session.into_parts();
    let stop = Arc::new(AtomicBool::new(false));
    let reader = runner::spawn_input_reader(runner.sender(), Arc::clone(&stop));

    tracing::info!(target: "nyron.tui.runner", model = %app.selection, mode = app.mode.label(), "chat started");
    let result = run_event_loop(&mut terminal, &mut app, &mut runner).await;

    stop.store(true, Ordering::Relaxed);
    let _ = reader.await;

    let _ = std::panic::take_hook();
    disable_raw_mode().map_err(tui_error)?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).map_err(tui_error)?;
    terminal.show_cursor().map_err(tui_error)?;

    tracing::info!(target: "nyron.tui.runner", "chat ended");
    result
}
