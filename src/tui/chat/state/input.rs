// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Input state for the chat TUI
//!
//! Manages the prompt buffer, cursor position, and history navigation.
//! The cursor is a byte offset that always sits on a character boundary.

/// Input state for the prompt area
#[derive(Debug, Clone)]
pub struct InputState {
    buffer: String,
    /// Cursor position (byte offset into `buffer`)
    cursor: usize,
    /// Previously submitted prompts, oldest first
    history: Vec<String>,
    /// None = editing a new prompt, Some(i) = browsing history
    history_index: Option<usize>,
    /// Buffer saved when history browsing started
    saved_buffer: Option<String>,
    max_history: usize,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_index: None,
            saved_buffer: None,
            max_history: 100,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    /// Delete the word before the cursor, along with trailing whitespace
    pub fn delete_word(&mut self) {
        let before = &self.buffer[..self.cursor];
        let trimmed = before.trim_end_matches(char::is_whitespace);
        let start = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Move to the start of the current line
    pub fn move_home(&mut self) {
        self.cursor = self.buffer[..self.cursor]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
    }

    /// Move to the end of the current line
    pub fn move_end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map(|pos| self.cursor + pos)
            .unwrap_or(self.buffer.len());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_index = None;
        self.saved_buffer = None;
    }

    /// Take the current input, recording it in history if non-empty.
    pub fn submit(&mut self) -> String {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.history_index = None;
        self.saved_buffer = None;

        if !text.trim().is_empty() && self.history.last() != Some(&text) {
            self.history.push(text.clone());
            if self.history.len() > self.max_history {
                self.history.remove(0);
            }
        }

        text
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        match self.history_index {
            None => {
                self.saved_buffer = Some(self.buffer.clone());
                self.load_history(self.history.len() - 1);
            }
            Some(0) => {}
            Some(i) => self.load_history(i - 1),
        }
    }

    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(i) if i + 1 >= self.history.len() => {
                self.history_index = None;
                let saved = self.saved_buffer.take().unwrap_or_default();
                self.replace_buffer(saved);
            }
            Some(i) => self.load_history(i + 1),
        }
    }

    /// Replace the buffer, leaving the cursor at the end.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.replace_buffer(text.into());
        self.history_index = None;
    }

    pub fn line_count(&self) -> usize {
        self.buffer.split('\n').count()
    }

    /// Current line number (0-indexed)
    pub fn current_line(&self) -> usize {
        self.buffer[..self.cursor].matches('\n').count()
    }

    /// Cursor column within the current line, in characters
    pub fn cursor_in_line(&self) -> usize {
        let before = &self.buffer[..self.cursor];
        let line_start = before.rfind('\n').map(|pos| pos + 1).unwrap_or(0);
        before[line_start..].chars().count()
    }

    fn load_history(&mut self, index: usize) {
        self.history_index = Some(index);
        let entry = self.history[index].clone();
        self.replace_buffer(entry);
    }

    fn replace_buffer(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.buffer.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}
