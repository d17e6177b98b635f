//! In-memory token storage scoped to the running process.

use std::sync::{PoisonError, RwLock};

use adminhub_core::traits::TokenStorage;

/// Process-lifetime storage holding at most one token.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn remove(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
