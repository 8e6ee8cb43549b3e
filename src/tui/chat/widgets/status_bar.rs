// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Status bar widget for the chat TUI

use ratatui::prelude::*;
use unicode_width::UnicodeWidthStr;

use crate::tui::chat::state::truncate_string;

/// Widget for rendering the title/status bar
pub struct StatusBar<'a> {
    title: &'a str,
    model: &'a str,
    mode: &'a str,
    activity: Option<&'a str>,
    status_message: Option<&'a str>,
    status_is_error: bool,
}

impl<'a> StatusBar<'a> {
    pub fn new(title: &'a str, model: &'a str, mode: &'a str) -> Self {
        Self {
            title,
            model,
            mode,
            activity: None,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Spinner and label of the running request
    pub fn activity(mut self, activity: Option<&'a str>) -> Self {
        self.activity = activity;
        self
    }

    pub fn status(mut self, message: Option<&'a str>, is_error: bool) -> Self {
        self.status_message = message;
        self.status_is_error = is_error;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 2 {
            return;
        }

        let bg = Style::default().bg(Color::DarkGray);
        buf.set_style(Rect { height: 1, ..area }, bg);

        let left = Line::from(vec![
            Span::styled(format!(" {} ", self.title), bg.fg(Color::White).bold()),
            Span::styled("─ ", bg.fg(Color::Gray)),
            Span::styled(self.model.to_string(), bg.fg(Color::Cyan)),
            Span::styled(format!("  [{}]", self.mode), bg.fg(Color::Gray)),
        ]);
        let left_width = left.width() as u16;
        buf.set_line(area.x, area.y, &left, area.width);

        // Right side: the running request wins over a status notice.
        let (text, style) = match (self.activity, self.status_message) {
            (Some(activity), _) => (activity.to_string(), bg.fg(Color::Green)),
            (None, Some(status)) if self.status_is_error => {
                (truncate_string(status, 48), bg.fg(Color::Red))
            }
            (None, Some(status)) => (truncate_string(status, 48), bg.fg(Color::Yellow)),
            (None, None) => return,
        };
        let text_width = text.width() as u16 + 1;
        if left_width + text_width < area.width {
            let x = area.x + area.width - text_width;
            buf.set_string(x, area.y, &text, style);
        }
    }
}
