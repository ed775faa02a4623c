//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{normalize_base_url, Config, ConfigManager};
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::ui::{self, UiContext};

/// Keys accepted by `config set`
const VALID_KEYS: [&str; 8] = [
    "general.log_format",
    "general.audit_log",
    "api.base_url",
    "api.request_timeout_secs",
    "api.mutation_timeout_secs",
    "api.refresh_path",
    "poll.interval_secs",
    "output.format",
];

pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> LaunchpadResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }
    Ok(())
}

fn show_config(config: &Config) -> LaunchpadResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    // Overrides from the environment or flags must not end up in the file
    let mut config = manager.load_file().await?;

    if let Err(e) = apply(&mut config, key, value) {
        if matches!(e, LaunchpadError::User(ref msg) if msg.starts_with("Unknown config key")) {
            ui::step_error_detail(&ctx, "Unknown config key", key);
            ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        }
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
    Ok(())
}

/// Assign `value` to the dotted `key`, validating both
fn apply(config: &mut Config, key: &str, value: &str) -> LaunchpadResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => {
            config.general.log_format = one_of(value, &["text", "json"])?
        }
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["api", "base_url"] => config.api.base_url = parse_url(value)?,
        ["api", "request_timeout_secs"] => config.api.request_timeout_secs = parse_secs(value)?,
        ["api", "mutation_timeout_secs"] => config.api.mutation_timeout_secs = parse_secs(value)?,
        ["api", "refresh_path"] => config.api.refresh_path = value.to_string(),

        ["poll", "interval_secs"] => config.poll.interval_secs = parse_secs(value)?,

        ["output", "format"] => {
            config.output.format = one_of(value, &["table", "json", "plain"])?
        }

        _ => return Err(LaunchpadError::User(format!("Unknown config key: {}", key))),
    }
    Ok(())
}

fn parse_bool(value: &str) -> LaunchpadResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(LaunchpadError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_secs(value: &str) -> LaunchpadResult<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(LaunchpadError::User(format!(
            "Invalid duration: {}. Use a positive number of seconds",
            value
        ))),
    }
}

fn parse_url(value: &str) -> LaunchpadResult<String> {
    let url = normalize_base_url(value);
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(LaunchpadError::User(format!(
            "Invalid URL: {}. Expected http:// or https://",
            value
        )))
    }
}

fn one_of(value: &str, allowed: &[&str]) -> LaunchpadResult<String> {
    let lower = value.to_lowercase();
    if allowed.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(LaunchpadError::User(format!(
            "Invalid value: {}. Use one of: {}",
            value,
            allowed.join(", ")
        )))
    }
}
