// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model picker dialog state

use crate::config::models::{all_providers, models_for};
use crate::config::ModelSelection;

/// One selectable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub selection: ModelSelection,
    pub provider_name: &'static str,
    pub model_name: &'static str,
    pub description: &'static str,
}

/// The catalog models of the providers this session can reach
#[derive(Debug, Clone)]
pub struct ModelPicker {
    entries: Vec<PickerEntry>,
    selected: usize,
}

impl ModelPicker {
    /// Build the picker over `available` providers with `current` highlighted.
    pub fn new(available: &[String], current: &ModelSelection) -> Self {
        let entries: Vec<PickerEntry> = all_providers()
            .iter()
            .filter(|provider| available.iter().any(|id| id == provider.id))
            .flat_map(|provider| {
                models_for(provider.id).iter().map(move |model| PickerEntry {
                    selection: ModelSelection::new(provider.id, model.id),
                    provider_name: provider.name,
                    model_name: model.name,
                    description: model.description,
                })
            })
            .collect();
        let selected = entries
            .iter()
            .position(|entry| &entry.selection == current)
            .unwrap_or(0);
        Self { entries, selected }
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn move_up(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.entries.len() - 1);
    }

    pub fn move_down(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.entries.len();
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected)
    }
}
