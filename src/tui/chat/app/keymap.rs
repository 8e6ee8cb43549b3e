// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::super::events::Effect;
use super::{ChatApp, Focus, Overlay};

/// Key bindings shown in the help overlay and the input hint line
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const fn binding(keys: &'static str, description: &'static str) -> KeyBinding {
    KeyBinding { keys, description }
}

pub const GLOBAL_BINDINGS: &[KeyBinding] = &[
    binding("Ctrl+C", "Cancel request / quit"),
    binding("Ctrl+P", "Choose model"),
    binding("Ctrl+S", "Toggle agent / stream mode"),
    binding("Tab", "Switch focus"),
    binding("F1", "Help"),
];

pub const INPUT_BINDINGS: &[KeyBinding] = &[
    binding("Enter", "Send"),
    binding("Alt+Enter", "New line"),
    binding("↑/↓", "Prompt history"),
    binding("Ctrl+W", "Delete word"),
    binding("Ctrl+U", "Clear input"),
    binding("Esc", "Focus transcript"),
];

pub const TRANSCRIPT_BINDINGS: &[KeyBinding] = &[
    binding("j/k ↑/↓", "Scroll"),
    binding("PgUp/PgDn", "Scroll a page"),
    binding("g/G", "Top / bottom"),
    binding("i/Enter", "Focus input"),
    binding("?", "Help"),
    binding("q", "Quit"),
];

impl ChatApp {
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }

        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return self.cancel_or_quit();
        }

        match self.overlay {
            Overlay::Help => {
                self.handle_help_key(key);
                return Vec::new();
            }
            Overlay::ModelPicker(_) => {
                self.handle_picker_key(key);
                return Vec::new();
            }
            Overlay::None => {}
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
                self.open_model_picker();
                Vec::new()
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.toggle_mode();
                Vec::new()
            }
            (_, KeyCode::F(1)) => {
                self.overlay = Overlay::Help;
                Vec::new()
            }
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                let next = match self.focus {
                    Focus::Input => Focus::Transcript,
                    Focus::Transcript => Focus::Input,
                };
                self.set_focus(next);
                Vec::new()
            }
            _ => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::Transcript => self.handle_transcript_key(key),
            },
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Enter) => return self.submit(),
            (KeyModifiers::ALT, KeyCode::Enter) | (KeyModifiers::SHIFT, KeyCode::Enter) => {
                self.input.insert_newline();
            }
            (KeyModifiers::NONE, KeyCode::Esc) => self.set_focus(Focus::Transcript),
            (KeyModifiers::NONE, KeyCode::Up) => self.input.history_prev(),
            (KeyModifiers::NONE, KeyCode::Down) => self.input.history_next(),
            (KeyModifiers::NONE, KeyCode::Left) => self.input.move_left(),
            (KeyModifiers::NONE, KeyCode::Right) => self.input.move_right(),
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.input.move_home();
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.input.move_end();
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => self.input.backspace(),
            (KeyModifiers::NONE, KeyCode::Delete) => self.input.delete(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => self.input.delete_word(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => self.input.clear(),
            (KeyModifiers::NONE, KeyCode::PageUp) => self.scroll.page_up(),
            (KeyModifiers::NONE, KeyCode::PageDown) => self.scroll.page_down(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.input.insert_char(c);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_transcript_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => self.scroll.scroll_down(1),
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => self.scroll.scroll_up(1),
            (KeyModifiers::NONE, KeyCode::PageUp) | (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.scroll.page_up();
            }
            (KeyModifiers::NONE, KeyCode::PageDown)
            | (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                self.scroll.page_down();
            }
            (KeyModifiers::NONE, KeyCode::Char('g') | KeyCode::Home) => self.scroll.scroll_to_top(),
            (KeyModifiers::SHIFT, KeyCode::Char('G'))
            | (KeyModifiers::NONE, KeyCode::Char('G') | KeyCode::End) => {
                self.scroll.scroll_to_bottom();
            }
            (KeyModifiers::NONE, KeyCode::Char('i') | KeyCode::Enter) => {
                self.set_focus(Focus::Input);
            }
            (_, KeyCode::Char('?')) => self.overlay = Overlay::Help,
            (KeyModifiers::NONE, KeyCode::Char('q')) if !self.is_loading() => {
                return vec![Effect::Quit];
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1) | KeyCode::Enter
        ) {
            self.overlay = Overlay::None;
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Overlay::ModelPicker(picker) = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => picker.move_up(),
            KeyCode::Down | KeyCode::Char('j') => picker.move_down(),
            KeyCode::Enter => {
                let chosen = picker.selected().map(|entry| entry.selection.clone());
                self.overlay = Overlay::None;
                if let Some(selection) = chosen {
                    tracing::info!(target: "nyron.tui.app", model = %selection, "model selected");
                    self.selection = selection;
                    let label = self.model_label();
                    self.set_status(format!("Model: {}", label), false);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.overlay = Overlay::None,
            _ => {}
        }
    }
}
