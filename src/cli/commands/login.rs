//! Login command - exchange credentials for an API token

use super::connect;
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::LoginArgs;
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, TaskSpinner, UiContext};
use serde_json::json;

pub async fn execute(args: LoginArgs, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Launchpad Login");

    let username = match args.username {
        Some(username) => username,
        None => ui::input(&ctx, "Username", "--username").await?,
    };
    let password = match args.password {
        Some(password) => password,
        None => ui::password(&ctx, "Password", "LAUNCHPAD_PASSWORD").await?,
    };

    let api = connect(config).await?;
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Logging in to {}...", config.api.base_url));

    if let Err(e) = api.login(&username, &password).await {
        spinner.stop_error("Login failed");
        return Err(e);
    }
    spinner.stop(&format!("Logged in as {}", username));

    AuditLog::new(config)
        .record(
            AuditEvent::Login,
            json!({ "username": username, "api": config.api.base_url }),
        )
        .await;

    ui::outro_success(&ctx, "Ready to deploy");
    Ok(())
}
