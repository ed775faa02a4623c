//! Logout command - forget stored credentials

use super::connect;
use crate::audit::{AuditEvent, AuditLog};
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, UiContext};
use serde_json::json;

pub async fn execute(config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let api = connect(config).await?;

    if api.session().tokens().await?.is_empty() {
        ui::step_info(&ctx, "Not logged in");
        return Ok(());
    }

    api.logout().await?;
    AuditLog::new(config)
        .record(AuditEvent::Logout, json!({ "api": config.api.base_url }))
        .await;

    ui::step_ok(&ctx, "Logged out");
    Ok(())
}
