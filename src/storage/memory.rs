//! In-memory storage, used by tests and one-shot sessions

use super::{Change, Storage};
use crate::error::LaunchpadResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local storage with no persistence
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> LaunchpadResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn update(&self, changes: Vec<Change>) -> LaunchpadResult<()> {
        let mut entries = self.entries.write().await;
        for change in changes {
            match change {
                Change::Set(key, value) => {
                    entries.insert(key.to_string(), value);
                }
                Change::Remove(key) => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
