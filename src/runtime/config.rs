use std::cell::RefCell;
use std::fmt;

use log::{debug, warn};

use crate::model::{History, HistoryEntry, ImageInfo};

use super::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigId(pub u64);

impl fmt::Display for ConfigId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Per-view configuration: the image state plus its undo stack.
#[derive(Debug)]
pub struct ImageConfig {
    id: ConfigId,
    image_info: ImageInfo,
    history: RefCell<History>,
}

impl ImageConfig {
    pub fn new(id: ConfigId, image_info: ImageInfo, history_limit: Option<usize>) -> Self {
        Self {
            id,
            image_info,
            history: RefCell::new(History::with_limit(history_limit)),
        }
    }

    pub fn id(&self) -> ConfigId {
        self.id
    }

    pub fn image_info(&self) -> &ImageInfo {
        &self.image_info
    }

    pub fn add_history(&self, entry: HistoryEntry) {
        debug!(
            "config {} history: {} {} -> {}",
            self.id, entry.prop, entry.old_val, entry.new_val
        );
        self.history.borrow_mut().add(entry);
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.borrow().entries().to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    /// Reverts the most recent entry. Returns `false` when nothing is left to undo.
    pub fn undo(&self) -> Result<bool> {
        let entry = self.history.borrow_mut().undo().cloned();
        let Some(entry) = entry else {
            return Ok(false);
        };
        if let Err(error) = self.image_info.assign(&entry.prop, &entry.old_val) {
            warn!("config {} could not undo {}: {error}", self.id, entry.prop);
            self.history.borrow_mut().redo();
            return Err(error.into());
        }
        Ok(true)
    }

    pub fn redo(&self) -> Result<bool> {
        let entry = self.history.borrow_mut().redo().cloned();
        let Some(entry) = entry else {
            return Ok(false);
        };
        if let Err(error) = self.image_info.assign(&entry.prop, &entry.new_val) {
            warn!("config {} could not redo {}: {error}", self.id, entry.prop);
            self.history.borrow_mut().undo();
            return Err(error.into());
        }
        Ok(true)
    }
}
