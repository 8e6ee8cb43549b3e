// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Help overlay

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::tui::chat::app::keymap::{KeyBinding, GLOBAL_BINDINGS, INPUT_BINDINGS, TRANSCRIPT_BINDINGS};

/// Key binding reference
pub struct HelpOverlay;

fn section(lines: &mut Vec<Line<'static>>, title: &'static str, bindings: &[KeyBinding]) {
    lines.push(Line::from(Span::styled(title, Style::default().bold())));
    for binding in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", binding.keys), Style::default().fg(Color::Cyan)),
            Span::raw(binding.description),
        ]));
    }
    lines.push(Line::default());
}

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut lines = Vec::new();
        section(&mut lines, "Anywhere:", GLOBAL_BINDINGS);
        section(&mut lines, "Input:", INPUT_BINDINGS);
        section(&mut lines, "Transcript:", TRANSCRIPT_BINDINGS);
        lines.push(Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Help ")
                    .title_style(Style::default().fg(Color::White).bold()),
            )
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
