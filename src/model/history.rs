use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AxisKind;

const ROOT: &str = "image_info";

/// Address of a model field, e.g. `image_info.dimensions.z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryPath(Vec<String>);

impl HistoryPath {
    fn under_root(segments: &[&str]) -> Self {
        let mut path = vec![ROOT.to_string()];
        path.extend(segments.iter().map(|segment| segment.to_string()));
        Self(path)
    }

    pub fn dimension(axis: AxisKind) -> Self {
        Self::under_root(&["dimensions", axis.code()])
    }

    pub fn projection() -> Self {
        Self::under_root(&["projection"])
    }

    pub fn projection_opts() -> Self {
        Self::under_root(&["projection_opts"])
    }

    pub fn channels() -> Self {
        Self::under_root(&["channels"])
    }

    pub fn channel_active(index: usize) -> Self {
        Self::under_root(&["channels", &index.to_string(), "active"])
    }

    pub fn channel_color(index: usize) -> Self {
        Self::under_root(&["channels", &index.to_string(), "color"])
    }

    pub fn channel_window(index: usize) -> Self {
        Self::under_root(&["channels", &index.to_string(), "window"])
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for HistoryPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryValueKind {
    Number,
    String,
    Boolean,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prop: HistoryPath,
    pub old_val: Value,
    pub new_val: Value,
    #[serde(rename = "type")]
    pub kind: HistoryValueKind,
}

impl HistoryEntry {
    pub fn new(
        prop: HistoryPath,
        old_val: impl Into<Value>,
        new_val: impl Into<Value>,
        kind: HistoryValueKind,
    ) -> Self {
        Self {
            prop,
            old_val: old_val.into(),
            new_val: new_val.into(),
            kind,
        }
    }
}

/// Undo stack owned by an image configuration.
///
/// Entries are appended and never edited. Undo moves a cursor back; adding an
/// entry after an undo discards everything past the cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit.max(1));
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len();
    }

    /// Entries that are currently applied, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries[..self.cursor]
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor - 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
