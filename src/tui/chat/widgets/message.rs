// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Message rendering
//!
//! Messages are rendered to owned lines once per width and cached on the
//! message, so redrawing while a stream is running only re-renders the
//! message that changed.

use ratatui::prelude::*;

use crate::tui::chat::state::{truncate_string, DisplayMessage, DisplayToolCall, MessageRole, ToolCallStatus};
use crate::tui::markdown::{plain_lines, render_or_plain, render_width, sanitize_partial};

const INDENT: &str = "  ";

/// Lines for the whole transcript at `width`, using and filling the caches.
pub fn transcript_lines(messages: &mut [DisplayMessage], width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages.iter_mut() {
        if message.cached_lines(width).is_none() {
            let rendered = message_lines(message, width);
            message.store_lines(width, rendered);
        }
        if let Some(cached) = message.cached_lines(width) {
            lines.extend_from_slice(cached);
        }
    }
    lines
}

/// Render one message: header, thinking, tool calls, content and a
/// trailing blank line.
pub fn message_lines(message: &DisplayMessage, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![header_line(message)];
    let text_width = (width as usize).saturating_sub(INDENT.len() * 2).max(1);

    if let Some(thinking) = &message.thinking {
        let style = Style::default().fg(Color::DarkGray).italic();
        lines.extend(indented(plain_lines(thinking, text_width), style));
    }

    for call in &message.tool_calls {
        lines.extend(tool_call_lines(call, width));
    }

    if !message.content.is_empty() {
        let body = match message.role {
            MessageRole::Assistant if message.is_streaming => {
                render_or_plain(&sanitize_partial(&message.content), render_width(width))
            }
            MessageRole::Assistant => render_or_plain(&message.content, render_width(width)),
            _ => plain_lines(&message.content, text_width),
        };
        lines.extend(indented(body, content_style(message.role)));
    }

    lines.push(Line::default());
    lines
}

fn header_line(message: &DisplayMessage) -> Line<'static> {
    let role_style = match message.role {
        MessageRole::User => Style::default().fg(Color::Cyan).bold(),
        MessageRole::Assistant => Style::default().fg(Color::White).bold(),
        MessageRole::System => Style::default().fg(Color::Yellow).bold(),
        MessageRole::Error => Style::default().fg(Color::Red).bold(),
    };
    let mut spans = vec![Span::styled(message.role.label(), role_style)];
    if message.is_streaming {
        spans.push(Span::styled(" ●", Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

fn content_style(role: MessageRole) -> Style {
    match role {
        MessageRole::User => Style::default().fg(Color::Cyan),
        MessageRole::Assistant => Style::default(),
        MessageRole::System => Style::default().fg(Color::Yellow),
        MessageRole::Error => Style::default().fg(Color::Red),
    }
}

fn indented(lines: Vec<Line<'static>>, style: Style) -> impl Iterator<Item = Line<'static>> {
    lines.into_iter().map(move |mut line| {
        line.spans.insert(0, Span::raw(INDENT));
        line.patch_style(style)
    })
}

/// Two lines per call: what it does, then how it went.
fn tool_call_lines(call: &DisplayToolCall, width: u16) -> Vec<Line<'static>> {
    let status_style = match call.status {
        ToolCallStatus::Running => Style::default().fg(Color::Yellow),
        ToolCallStatus::Success => Style::default().fg(Color::Green),
        ToolCallStatus::Failed => Style::default().fg(Color::Red),
        ToolCallStatus::Cancelled => Style::default().fg(Color::DarkGray),
    };
    let frame = Style::default().fg(Color::DarkGray);
    let budget = (width as usize).saturating_sub(12).max(8);

    let mut header = vec![
        Span::raw(INDENT),
        Span::styled("╭─ ", frame),
        Span::styled(call.title.clone(), Style::default().fg(Color::Magenta)),
    ];
    if !call.detail.is_empty() {
        header.push(Span::styled(" → ", frame));
        header.push(Span::styled(
            truncate_string(&call.detail, budget.saturating_sub(call.title.chars().count())),
            Style::default().fg(Color::Cyan),
        ));
    }

    let outcome = match (&call.result_preview, call.status) {
        (Some(preview), _) => truncate_string(preview.lines().next().unwrap_or(""), budget),
        (None, ToolCallStatus::Running) => "running...".to_string(),
        (None, ToolCallStatus::Cancelled) => "cancelled".to_string(),
        (None, _) => String::new(),
    };

    vec![
        Line::from(header),
        Line::from(vec![
            Span::raw(INDENT),
            Span::styled("╰─ ", frame),
            Span::styled(format!("{} ", call.status.indicator()), status_style),
            Span::styled(outcome, frame),
        ]),
    ]
}
