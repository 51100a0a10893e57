use std::collections::VecDeque;

use crate::scene::SceneState;

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const INITIAL_LABEL: &str = "initial canvas";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub snapshot: SceneState,
    pub label: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(snapshot: SceneState, label: impl Into<String>, timestamp: u64) -> Self {
        Self {
            snapshot,
            label: label.into(),
            timestamp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryPosition {
    Past,
    Current,
    Future,
}

impl HistoryPosition {
    pub fn css_class(self) -> &'static str {
        match self {
            HistoryPosition::Past => "history-item-past",
            HistoryPosition::Current => "history-item-current",
            HistoryPosition::Future => "history-item-future",
        }
    }
}

/// Row of the history panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItem<'a> {
    pub index: usize,
    pub label: &'a str,
    pub timestamp: u64,
    pub position: HistoryPosition,
}

/// Linear, bounded snapshot timeline with a cursor at the displayed state.
///
/// Never empty: it is created from an initial entry and reset to one.
#[derive(Clone, Debug)]
pub struct HistoryTimeline {
    entries: VecDeque<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl HistoryTimeline {
    pub fn new(initial: HistoryEntry, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Appends after the cursor, discarding the redo branch. At the cap the
    /// oldest entry is evicted and the cursor stays on the last slot.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(entry);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        } else {
            self.index += 1;
        }
        self.index = self.index.min(self.entries.len() - 1);
    }

    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Moves the cursor without truncating; the redo branch survives until the next push.
    pub fn jump(&mut self, index: usize) -> Option<&HistoryEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.index = index;
        Some(self.current())
    }

    /// Puts the cursor back after a failed scene load.
    pub(crate) fn restore_cursor(&mut self, index: usize) {
        if index < self.entries.len() {
            self.index = index;
        }
    }

    pub fn reset(&mut self, initial: HistoryEntry) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.index = 0;
    }

    /// Panel rows, newest first.
    pub fn items(&self) -> Vec<HistoryItem<'_>> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(index, entry)| HistoryItem {
                index,
                label: &entry.label,
                timestamp: entry.timestamp,
                position: match index.cmp(&self.index) {
                    std::cmp::Ordering::Less => HistoryPosition::Past,
                    std::cmp::Ordering::Equal => HistoryPosition::Current,
                    std::cmp::Ordering::Greater => HistoryPosition::Future,
                },
            })
            .collect()
    }
}
