// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model picker dialog

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget},
};

use crate::tui::chat::state::ModelPicker;

/// Dialog listing the catalog models, grouped by provider
pub struct ModelPickerDialog<'a> {
    picker: &'a ModelPicker,
}

impl<'a> ModelPickerDialog<'a> {
    pub fn new(picker: &'a ModelPicker) -> Self {
        Self { picker }
    }
}

impl<'a> Widget for ModelPickerDialog<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let items: Vec<ListItem> = self
            .picker
            .entries()
            .iter()
            .map(|entry| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(entry.model_name, Style::default().bold()),
                        Span::styled(
                            format!("  {}", entry.provider_name),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", entry.description),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Select model (Enter to choose, Esc to close) ")
                    .title_style(Style::default().fg(Color::White).bold()),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::Cyan))
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(Some(self.picker.selected_index()));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}
