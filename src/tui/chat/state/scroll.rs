// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Scroll state for the transcript view

/// Scroll position of the transcript, in rendered lines from the top.
///
/// While auto-scroll is on the view follows the newest content; scrolling
/// up turns it off and scrolling back to the bottom turns it on again.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub offset: usize,
    pub viewport_height: u16,
    pub auto_scroll: bool,
    /// Total rendered height from the last draw
    content_height: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            viewport_height: 0,
            auto_scroll: true,
            content_height: 0,
        }
    }

    fn max_offset(&self) -> usize {
        self.content_height
            .saturating_sub(self.viewport_height as usize)
    }

    /// Record the dimensions of the latest draw and clamp the offset.
    pub fn update(&mut self, viewport_height: u16, content_height: usize) {
        self.viewport_height = viewport_height;
        self.content_height = content_height;
        if self.auto_scroll {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        if lines > 0 && self.max_offset() > 0 {
            self.auto_scroll = false;
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
        if self.is_at_bottom() {
            self.auto_scroll = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_scroll = self.max_offset() == 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_scroll = true;
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn content_height(&self) -> usize {
        self.content_height
    }

    fn page(&self) -> usize {
        (self.viewport_height as usize / 2).max(1)
    }
}
