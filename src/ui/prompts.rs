//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{LaunchpadError, LaunchpadResult};

/// Ask for confirmation; auto-yes approves, non-interactive returns `default`
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> LaunchpadResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
}

/// Ask for a line of text.
///
/// Without a terminal there is nobody to ask, so this fails with a message
/// naming the flag that supplies the value instead.
pub async fn input(ctx: &UiContext, message: &str, flag: &str) -> LaunchpadResult<String> {
    if !ctx.is_interactive() {
        return Err(LaunchpadError::User(format!(
            "{} is required in non-interactive mode (use {})",
            message, flag
        )));
    }

    let message = message.to_string();
    blocking(move || {
        cliclack::input(&message)
            .validate(|value: &String| {
                if value.trim().is_empty() {
                    Err("Value is required")
                } else {
                    Ok(())
                }
            })
            .interact()
    })
    .await
}

/// Ask for a secret without echoing it
pub async fn password(ctx: &UiContext, message: &str, env: &str) -> LaunchpadResult<String> {
    if !ctx.is_interactive() {
        return Err(LaunchpadError::User(format!(
            "{} is required in non-interactive mode (set {})",
            message, env
        )));
    }

    let message = message.to_string();
    blocking(move || cliclack::password(&message).mask('▪').interact()).await
}

async fn blocking<T, F>(prompt: F) -> LaunchpadResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| LaunchpadError::User(format!("Prompt task failed: {}", e)))?
        .map_err(|e| LaunchpadError::User(format!("Prompt failed: {}", e)))
}
