//! Configuration management for Launchpad

pub mod schema;

pub use schema::Config;

use crate::error::{LaunchpadError, LaunchpadResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "LAUNCHPAD_API_URL";

/// Locates, layers and persists the configuration file.
///
/// Effective configuration is the file (or defaults), then
/// `LAUNCHPAD_API_URL`, then `--api-url`. Only the file layer is ever saved.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `explicit` if given, otherwise `~/.config/launchpad/config.toml`
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("launchpad")
                .join("config.toml")
        });
        Self { config_path }
    }

    /// Config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Directory for client storage and the audit log
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("launchpad")
    }

    /// Client storage file (tokens, theme)
    pub fn storage_path() -> PathBuf {
        Self::state_dir().join("storage.json")
    }

    /// Audit log file
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Effective configuration with environment and flag overrides applied
    pub async fn load(&self, api_url: Option<&str>) -> LaunchpadResult<Config> {
        let mut config = self.load_file().await?;

        let from_env = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
        if let Some(url) = api_url.map(str::to_string).or(from_env) {
            debug!("API URL overridden: {}", url);
            config.api.base_url = normalize_base_url(&url);
        }
        Ok(config)
    }

    /// Configuration as written in the file; defaults if there is none
    pub async fn load_file(&self) -> LaunchpadResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(LaunchpadError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let mut config: Config =
            toml::from_str(&content).map_err(|e| LaunchpadError::ConfigInvalid {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    /// Write `config` through a staging file so a failed write keeps the old one
    pub async fn save(&self, config: &Config) -> LaunchpadResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LaunchpadError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        let staging = self.config_path.with_extension("toml.tmp");
        fs::write(&staging, content).await.map_err(|e| {
            LaunchpadError::io(format!("writing config to {}", staging.display()), e)
        })?;
        fs::rename(&staging, &self.config_path).await.map_err(|e| {
            LaunchpadError::io(
                format!("replacing config at {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Create the state directory, owner-only
    pub async fn ensure_state_dir() -> LaunchpadResult<()> {
        let dir = Self::state_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LaunchpadError::io(format!("creating directory {}", dir.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&dir, perms)
                .map_err(|e| LaunchpadError::io("setting state dir permissions", e))?;
        }

        Ok(())
    }
}

/// Request paths start with `/`, so the base carries no trailing slash
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn manager(temp: &TempDir) -> ConfigManager {
        ConfigManager::locate(Some(temp.path().join("config.toml")))
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = manager(&temp).load_file().await.unwrap();
        assert_eq!(config.api.refresh_path, "/login/token/refresh/");
    }

    #[tokio::test]
    async fn saved_file_is_read_back() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);

        let mut config = Config::default();
        config.api.base_url = "http://localhost:8000".to_string();
        config.poll.interval_secs = 12;
        manager.save(&config).await.unwrap();

        let loaded = manager.load_file().await.unwrap();
        assert_eq!(loaded.api.base_url, "http://localhost:8000");
        assert_eq!(loaded.poll.interval_secs, 12);
        assert!(!temp.path().join("config.toml.tmp").exists());
    }

    #[tokio::test]
    async fn trailing_slash_is_dropped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "[api]\nbase_url = \"https://deploy.example/\"\n",
        )
        .unwrap();

        let config = manager(&temp).load_file().await.unwrap();
        assert_eq!(config.api.base_url, "https://deploy.example");
    }

    #[tokio::test]
    async fn invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = 1").unwrap();

        let err = manager(&temp).load_file().await.unwrap_err();
        assert!(matches!(err, LaunchpadError::ConfigInvalid { path: p, .. } if p == path));
    }

    #[tokio::test]
    #[serial]
    async fn env_overrides_file() {
        let temp = TempDir::new().unwrap();

        std::env::set_var(API_URL_ENV, "http://127.0.0.1:9000/");
        let config = manager(&temp).load(None).await;
        std::env::remove_var(API_URL_ENV);

        assert_eq!(config.unwrap().api.base_url, "http://127.0.0.1:9000");
    }

    #[tokio::test]
    #[serial]
    async fn flag_overrides_env() {
        let temp = TempDir::new().unwrap();

        std::env::set_var(API_URL_ENV, "http://env.example");
        let config = manager(&temp).load(Some("http://flag.example")).await;
        std::env::remove_var(API_URL_ENV);

        assert_eq!(config.unwrap().api.base_url, "http://flag.example");
    }

    #[tokio::test]
    #[serial]
    async fn overrides_stay_out_of_file_layer() {
        let temp = TempDir::new().unwrap();

        std::env::set_var(API_URL_ENV, "http://env.example");
        let file = manager(&temp).load_file().await;
        std::env::remove_var(API_URL_ENV);

        assert_eq!(file.unwrap().api.base_url, Config::default().api.base_url);
    }
}
