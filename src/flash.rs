//! User-visible flash messages, at most one per view key.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub key: String,
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Flashes {
    entries: HashMap<String, Flash>,
}

impl Flashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is shown under `key` with the error.
    pub fn clear_and_add_error(&mut self, key: &str, error: &AppError) {
        self.entries.insert(
            key.to_string(),
            Flash { key: key.to_string(), kind: FlashKind::Error, message: error.to_human() },
        );
    }

    pub fn clear(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&Flash> {
        self.entries.get(key)
    }
}
