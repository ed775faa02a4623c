//! UI theme preference

use crate::error::{LaunchpadError, LaunchpadResult};
use crate::storage::{Storage, THEME_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color theme for terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(name)
    }
}

impl FromStr for Theme {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(LaunchpadError::User(format!(
                "Unknown theme: {}. Use light, dark or system",
                other
            ))),
        }
    }
}

/// Read the stored theme, falling back to the default for unknown values
pub async fn load_theme(storage: &dyn Storage) -> LaunchpadResult<Theme> {
    let stored = storage.get(THEME_KEY).await?;
    Ok(stored
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

/// Persist the theme preference
pub async fn save_theme(storage: &dyn Storage, theme: Theme) -> LaunchpadResult<()> {
    storage.set(THEME_KEY, theme.to_string()).await
}
