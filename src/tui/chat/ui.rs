// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Drawing for the chat TUI

use ratatui::{prelude::*, widgets::Paragraph};

use super::app::keymap::{INPUT_BINDINGS, TRANSCRIPT_BINDINGS};
use super::app::{ChatApp, Focus, Overlay};
use super::widgets::{transcript_lines, HelpOverlay, InputArea, ModelPickerDialog, StatusBar};

/// Layout regions
#[derive(Clone, Copy, Debug)]
struct Regions {
    title_bar: Rect,
    transcript: Rect,
    input: Rect,
    hints: Rect,
}

fn calculate_layout(area: Rect, app: &ChatApp) -> Regions {
    let [title_bar, transcript, input, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(InputArea::height(&app.input)),
        Constraint::Length(1),
    ])
    .areas(area);
    Regions {
        title_bar,
        transcript,
        input,
        hints,
    }
}

/// Draw the whole screen. Takes `&mut` to record scroll geometry and fill
/// the render caches.
pub fn draw(frame: &mut Frame, app: &mut ChatApp) {
    let regions = calculate_layout(frame.area(), app);

    render_title_bar(frame, app, regions.title_bar);
    render_transcript(frame, app, regions.transcript);
    render_input(frame, app, regions.input);
    render_hints(frame, app, regions.hints);

    match &app.overlay {
        Overlay::None => {}
        Overlay::Help => frame.render_widget(HelpOverlay, centered_rect(60, 80, frame.area())),
        Overlay::ModelPicker(picker) => frame.render_widget(
            ModelPickerDialog::new(picker),
            centered_rect(70, 70, frame.area()),
        ),
    }
}

fn render_title_bar(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let model = app.model_label();
    let activity = app.activity_label();
    let bar = StatusBar::new("nyron", &model, app.mode.label())
        .activity(activity.as_deref())
        .status(
            app.status.as_ref().map(|s| s.text.as_str()),
            app.status.as_ref().is_some_and(|s| s.is_error),
        );
    frame.render_widget(bar, area);
}

fn render_transcript(frame: &mut Frame, app: &mut ChatApp, area: Rect) {
    if app.messages.is_empty() {
        render_welcome(frame, area);
        app.scroll.update(area.height, 0);
        return;
    }

    let width = area.width.saturating_sub(1).max(1);
    let lines = transcript_lines(&mut app.messages, width);
    app.scroll.update(area.height, lines.len());

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(app.scroll.offset)
        .take(area.height as usize)
        .collect();
    frame.render_widget(Paragraph::new(visible), area);

    if !app.scroll.is_at_bottom() {
        let indicator = format!(
            "↓ {} more",
            app.scroll.content_height() - app.scroll.offset - area.height as usize
        );
        let x = area.x + area.width.saturating_sub(indicator.chars().count() as u16 + 1);
        let y = area.y + area.height.saturating_sub(1);
        frame
            .buffer_mut()
            .set_string(x, y, indicator, Style::default().fg(Color::DarkGray));
    }
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let welcome = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to Nyron", Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled("Type a prompt and press Enter.", dim)),
        Line::from(Span::styled("Ctrl+P chooses the model, Ctrl+S toggles streaming.", dim)),
        Line::from(Span::styled("F1 shows all key bindings.", dim)),
    ])
    .alignment(Alignment::Center);

    let height = area.height.min(8);
    let welcome_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 3,
        width: area.width,
        height,
    };
    frame.render_widget(welcome, welcome_area);
}

fn render_input(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let focused = app.focus == Focus::Input && matches!(app.overlay, Overlay::None);
    let widget = InputArea::new(&app.input)
        .focused(focused)
        .busy(app.is_loading())
        .placeholder("Ask anything...");
    let cursor = widget.cursor_position(area);
    frame.render_widget(widget, area);
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

fn render_hints(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let bindings = match app.focus {
        Focus::Input => INPUT_BINDINGS,
        Focus::Transcript => TRANSCRIPT_BINDINGS,
    };
    let mut spans = Vec::new();
    for binding in bindings.iter().take(4) {
        spans.push(Span::styled(format!(" {} ", binding.keys), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!("{}  ", binding.description),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A centered rect with percentage-based sizing.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width - popup_width) / 2,
        y: r.y + (r.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    }
}
