// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Input area widget for the chat TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::chat::state::InputState;

/// Most input lines shown before the area scrolls
pub const MAX_VISIBLE_LINES: u16 = 6;

/// Widget for rendering the prompt input
pub struct InputArea<'a> {
    input: &'a InputState,
    focused: bool,
    busy: bool,
    placeholder: Option<&'a str>,
}

impl<'a> InputArea<'a> {
    pub fn new(input: &'a InputState) -> Self {
        Self {
            input,
            focused: true,
            busy: false,
            placeholder: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// A request is in flight; Enter will be rejected
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = Some(text);
        self
    }

    /// Height including borders for the current input
    pub fn height(input: &InputState) -> u16 {
        (input.line_count() as u16).clamp(1, MAX_VISIBLE_LINES) + 2
    }

    /// First input line shown, keeping the cursor line visible
    fn first_visible_line(&self, inner_height: u16) -> usize {
        let visible = inner_height.max(1) as usize;
        self.input.current_line().saturating_sub(visible - 1)
    }

    /// Terminal cursor position, or None when unfocused.
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        if !self.focused || area.width < 5 || area.height < 3 {
            return None;
        }
        let inner_height = area.height - 2;
        let row = self.input.current_line() - self.first_visible_line(inner_height);

        let text = self.input.text();
        let line_start = text[..self.input.cursor()]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let column = text[line_start..self.input.cursor()].width() as u16;

        // Border (1) and prompt "> " (2)
        let x = (area.x + 3 + column).min(area.x + area.width - 2);
        let y = area.y + 1 + row as u16;
        Some(Position::new(x, y))
    }
}

impl<'a> Widget for InputArea<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.busy {
            Style::default().fg(Color::Yellow)
        } else if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);
        if self.busy {
            block = block.title(" waiting for response ").title_style(border_style);
        }

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width < 4 {
            return;
        }

        buf.set_string(inner.x, inner.y, "> ", Style::default().fg(Color::Cyan).bold());

        let text_x = inner.x + 2;
        let text_width = inner.width.saturating_sub(2);

        if self.input.is_empty() {
            if let Some(placeholder) = self.placeholder {
                buf.set_stringn(
                    text_x,
                    inner.y,
                    placeholder,
                    text_width as usize,
                    Style::default().fg(Color::DarkGray).italic(),
                );
            }
            return;
        }

        let first = self.first_visible_line(inner.height);
        for (row, line) in self
            .input
            .text()
            .split('\n')
            .skip(first)
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_stringn(
                text_x,
                inner.y + row as u16,
                line,
                text_width as usize,
                Style::default().fg(Color::White),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_grows_with_lines() {
        let mut input = InputState::new();
        assert_eq!(InputArea::height(&input), 3);
        input.insert_str("a\nb\nc");
        assert_eq!(InputArea::height(&input), 5);
        input.insert_str("\nd\ne\nf\ng\nh");
        assert_eq!(InputArea::height(&input), MAX_VISIBLE_LINES + 2);
    }

    #[test]
    fn test_cursor_position_follows_text() {
        let mut input = InputState::new();
        input.insert_str("héllo");
        let area = Rect::new(0, 10, 40, 3);
        let widget = InputArea::new(&input);
        assert_eq!(widget.cursor_position(area), Some(Position::new(8, 11)));
        assert_eq!(InputArea::new(&input).focused(false).cursor_position(area), None);
    }

    #[test]
    fn test_renders_placeholder_and_text() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let input = InputState::new();
        InputArea::new(&input)
            .placeholder("Ask anything")
            .render(area, &mut buf);
        let row: String = (0..30).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("> Ask anything"));
    }
}
