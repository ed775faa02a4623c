//! Client-side key-value storage
//!
//! Holds the small amount of durable client state: the token pair and the
//! theme preference, each under a fixed key.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::LaunchpadResult;
use async_trait::async_trait;

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "access";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh";

/// Storage key of the UI theme preference
pub const THEME_KEY: &str = "theme";

/// A single write in an atomic storage update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Set(&'static str, String),
    Remove(&'static str),
}

/// Durable string key-value store
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> LaunchpadResult<Option<String>>;

    /// Apply all changes as one write; readers never observe a partial update
    async fn update(&self, changes: Vec<Change>) -> LaunchpadResult<()>;

    /// Store a single value
    async fn set(&self, key: &'static str, value: String) -> LaunchpadResult<()> {
        self.update(vec![Change::Set(key, value)]).await
    }

    /// Remove a single value
    async fn remove(&self, key: &'static str) -> LaunchpadResult<()> {
        self.update(vec![Change::Remove(key)]).await
    }
}
