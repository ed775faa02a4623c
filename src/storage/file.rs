//! File-backed storage persisted as a JSON object

use super::{Change, Storage};
use crate::config::ConfigManager;
use crate::error::{LaunchpadError, LaunchpadResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Storage persisted to a single JSON file with owner-only permissions.
///
/// Every read goes to the file, so writes from other processes (a `logout`
/// in another terminal) are seen by long-running commands.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    writer: Mutex<()>,
}

impl FileStorage {
    /// Open the default storage file in the state directory
    pub async fn open_default() -> LaunchpadResult<Self> {
        ConfigManager::ensure_state_dir().await?;
        Self::open(ConfigManager::storage_path()).await
    }

    /// Open storage at `path`, checking that existing content is readable
    pub async fn open(path: PathBuf) -> LaunchpadResult<Self> {
        let entries = read_entries(&path).await?;
        debug!("Opened client storage {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> LaunchpadResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LaunchpadError::io("creating storage directory", e))?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&staging, content)
            .await
            .map_err(|e| LaunchpadError::StoragePersist {
                path: staging.clone(),
                reason: e.to_string(),
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&staging, perms)
                .map_err(|e| LaunchpadError::io("setting storage file permissions", e))?;
        }

        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| LaunchpadError::StoragePersist {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

async fn read_entries(path: &Path) -> LaunchpadResult<BTreeMap<String, String>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(LaunchpadError::io(
                format!("reading storage file {}", path.display()),
                e,
            ))
        }
    };
    if content.trim().is_empty() {
        Ok(BTreeMap::new())
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> LaunchpadResult<Option<String>> {
        let mut entries = read_entries(&self.path).await?;
        Ok(entries.remove(key))
    }

    async fn update(&self, changes: Vec<Change>) -> LaunchpadResult<()> {
        // Changes apply to what is on disk now, not to what was read at open.
        let _writer = self.writer.lock().await;
        let current = read_entries(&self.path).await?;
        let mut next = current.clone();
        for change in changes {
            match change {
                Change::Set(key, value) => {
                    next.insert(key.to_string(), value);
                }
                Change::Remove(key) => {
                    next.remove(key);
                }
            }
        }

        if next == current {
            return Ok(());
        }

        self.persist(&next).await
    }
}
