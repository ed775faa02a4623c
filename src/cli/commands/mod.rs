//! CLI command implementations

pub mod completions;
pub mod config;
pub mod deploys;
pub mod login;
pub mod logout;
pub mod networks;
pub mod plans;
pub mod services;
pub mod theme;
pub mod watch;
pub mod whoami;

pub use completions::execute as completions;
pub use config::execute as config;
pub use deploys::execute as deploys;
pub use login::execute as login;
pub use logout::execute as logout;
pub use networks::execute as networks;
pub use plans::execute as plans;
pub use services::execute as services;
pub use theme::execute as theme;
pub use watch::execute as watch;
pub use whoami::execute as whoami;

use crate::api::PlatformApi;
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::http::RequestClient;
use crate::session::SessionState;
use crate::storage::FileStorage;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// API client over the on-disk session
pub(crate) async fn connect(config: &Config) -> LaunchpadResult<PlatformApi> {
    let storage = FileStorage::open_default().await?;
    let session = SessionState::load(Arc::new(storage)).await?;
    let client = RequestClient::from_config(&config.api, session)?;
    debug!("Using API at {}", config.api.base_url);
    Ok(PlatformApi::new(Arc::new(client)))
}

/// Like [`connect`], but fails early when no credentials are stored
pub(crate) async fn connect_signed_in(config: &Config) -> LaunchpadResult<PlatformApi> {
    let api = connect(config).await?;
    if api.session().tokens().await?.is_empty() {
        return Err(LaunchpadError::AuthenticationRequired);
    }
    Ok(api)
}

/// Format from the flag, else from `output.format`, else table
pub(crate) fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.unwrap_or_else(|| match config.output.format.as_str() {
        "json" => OutputFormat::Json,
        "plain" => OutputFormat::Plain,
        _ => OutputFormat::Table,
    })
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> LaunchpadResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Placeholder for absent optional fields in tables
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
