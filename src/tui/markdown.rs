// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Markdown rendering for the transcript
//!
//! Converts Markdown into width-wrapped ratatui lines. Text that is still
//! streaming in is often cut mid-construct, so it goes through
//! [`sanitize_partial`] first. Callers that cannot show an error use
//! [`render_or_plain`], which falls back to the unrendered text.

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

/// Narrowest width markdown is wrapped to
pub const MIN_RENDER_WIDTH: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("render width must be positive")]
    ZeroWidth,

    #[error("markdown ended with {0} unclosed element(s)")]
    Unbalanced(usize),
}

/// Close constructs a partial message leaves open.
///
/// An odd number of ``` or ~~~ fences (at line start) gets a closing fence,
/// and a trailing `<` gets a `>` so it is not read as an open HTML tag.
pub fn sanitize_partial(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.to_string();
    for (fence, pattern) in [("```", backtick_fence()), ("~~~", tilde_fence())] {
        if pattern.find_iter(&out).count() % 2 == 1 {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(fence);
        }
    }

    if out.trim_end().ends_with('<') {
        out.push('>');
    }
    out
}

fn backtick_fence() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^\s*```").expect("fence pattern is valid"))
}

fn tilde_fence() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^\s*~~~").expect("fence pattern is valid"))
}

/// Width used for a transcript of the given inner width.
pub fn render_width(available: u16) -> usize {
    (available as usize).saturating_sub(4).max(MIN_RENDER_WIDTH)
}

/// Render, falling back to plain wrapped text on error.
///
/// The fallback never wraps narrower than [`MIN_RENDER_WIDTH`].
pub fn render_or_plain(text: &str, width: usize) -> Vec<Line<'static>> {
    match render_markdown(text, width) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(target: "nyron.tui.markdown", error = %e, "falling back to plain text");
            plain_lines(text, width.max(MIN_RENDER_WIDTH))
        }
    }
}

/// Wrap text without interpreting it.
pub fn plain_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new(width);
    builder.push_text(text, Style::default());
    builder.finish()
}

struct LineBuilder {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    /// Prefix repeated at the start of every line (quotes, list bodies)
    indent: Vec<Span<'static>>,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            indent: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            if ch == '\n' {
                self.finish_line();
                continue;
            }
            let ch_width = ch.width().unwrap_or(0);
            if self.current_width + ch_width > self.width && self.current_width > 0 {
                self.finish_line();
            }
            self.push_char(ch, ch_width, style);
        }
    }

    fn push_char(&mut self, ch: char, ch_width: usize, style: Style) {
        if self.current.is_empty() && !self.indent.is_empty() {
            for span in self.indent.clone() {
                self.current_width += span.width();
                self.current.push(span);
            }
        }
        match self.current.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(ch),
            _ => self.current.push(Span::styled(ch.to_string(), style)),
        }
        self.current_width += ch_width;
    }

    /// End the current line if it has content.
    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.finish_line();
        }
    }

    fn finish_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
        self.current_width = 0;
    }

    /// Ensure one blank line separates blocks.
    fn blank_line(&mut self) {
        self.break_line();
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        self.lines
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base.fg(Color::Magenta),
        _ => base.fg(Color::LightBlue),
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Render markdown to styled lines wrapped at `width` columns.
pub fn render_markdown(text: &str, width: usize) -> Result<Vec<Line<'static>>, RenderError> {
    if width == 0 {
        return Err(RenderError::ZeroWidth);
    }

    let mut builder = LineBuilder::new(width);
    let mut styles = vec![Style::default()];
    // One entry per open list: the next number for ordered lists.
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut in_code_block = false;
    let mut depth = 0usize;

    let current = |styles: &[Style]| styles.last().copied().unwrap_or_default();

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(tag) => {
                depth += 1;
                match tag {
                    Tag::Paragraph => {}
                    Tag::Heading { level, .. } => {
                        builder.blank_line();
                        styles.push(heading_style(level));
                    }
                    Tag::BlockQuote(_) => {
                        builder.break_line();
                        builder
                            .indent
                            .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                        styles.push(current(&styles).fg(Color::Gray).add_modifier(Modifier::ITALIC));
                    }
                    Tag::CodeBlock(kind) => {
                        builder.blank_line();
                        if let CodeBlockKind::Fenced(info) = kind {
                            if let Some(language) = info.split_whitespace().next() {
                                builder.push_text(language, Style::default().fg(Color::DarkGray));
                                builder.finish_line();
                            }
                        }
                        builder.indent.push(Span::raw("  "));
                        in_code_block = true;
                    }
                    Tag::List(start) => {
                        if lists.is_empty() {
                            builder.blank_line();
                        } else {
                            builder.break_line();
                        }
                        lists.push(start);
                    }
                    Tag::Item => {
                        builder.break_line();
                        let marker = match lists.last_mut() {
                            Some(Some(n)) => {
                                let marker = format!("{}. ", n);
                                *n += 1;
                                marker
                            }
                            _ => "• ".to_string(),
                        };
                        builder.push_text(&marker, Style::default().fg(Color::Cyan));
                        builder.indent.push(Span::raw(" ".repeat(marker.chars().count())));
                    }
                    Tag::Emphasis => styles.push(current(&styles).add_modifier(Modifier::ITALIC)),
                    Tag::Strong => styles.push(current(&styles).add_modifier(Modifier::BOLD)),
                    Tag::Strikethrough => {
                        styles.push(current(&styles).add_modifier(Modifier::CROSSED_OUT))
                    }
                    Tag::Link { dest_url, .. } => {
                        links.push(dest_url.to_string());
                        styles.push(current(&styles).fg(Color::Blue).add_modifier(Modifier::UNDERLINED));
                    }
                    _ => {}
                }
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                match tag {
                    TagEnd::Paragraph => builder.blank_line(),
                    TagEnd::Heading(_) => {
                        styles.pop();
                        builder.blank_line();
                    }
                    TagEnd::BlockQuote(_) => {
                        styles.pop();
                        builder.break_line();
                        builder.indent.pop();
                        builder.blank_line();
                    }
                    TagEnd::CodeBlock => {
                        in_code_block = false;
                        builder.break_line();
                        builder.indent.pop();
                        builder.blank_line();
                    }
                    TagEnd::List(_) => {
                        lists.pop();
                        if lists.is_empty() {
                            builder.blank_line();
                        }
                    }
                    TagEnd::Item => {
                        builder.break_line();
                        builder.indent.pop();
                    }
                    TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                        styles.pop();
                    }
                    TagEnd::Link => {
                        styles.pop();
                        if let Some(url) = links.pop() {
                            builder.push_text(&format!(" ({})", url), Style::default().fg(Color::DarkGray));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(content) => {
                if in_code_block {
                    let body = content.strip_suffix('\n').unwrap_or(&content);
                    builder.push_text(body, code_style());
                    if content.ends_with('\n') {
                        builder.finish_line();
                    }
                } else {
                    builder.push_text(&content, current(&styles));
                }
            }
            Event::Code(content) => builder.push_text(&content, code_style()),
            Event::SoftBreak => builder.push_text(" ", current(&styles)),
            Event::HardBreak => builder.finish_line(),
            Event::Rule => {
                builder.blank_line();
                builder.push_text(
                    &"─".repeat(width.min(40)),
                    Style::default().fg(Color::DarkGray),
                );
                builder.finish_line();
            }
            Event::TaskListMarker(done) => {
                builder.push_text(if done { "[x] " } else { "[ ] " }, current(&styles));
            }
            Event::Html(content) | Event::InlineHtml(content) => {
                builder.push_text(&content, Style::default().fg(Color::DarkGray));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(RenderError::Unbalanced(depth));
    }
    Ok(builder.finish())
}
