//! Whoami command - show the logged-in account

use super::{connect_signed_in, print_json, resolve_format};
use crate::cli::args::{FormatArgs, OutputFormat};
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, UiContext};
use serde_json::Value;

/// Profile fields shown in table output, in order
const PROFILE_FIELDS: [&str; 5] = ["username", "email", "first_name", "last_name", "plan"];

pub async fn execute(args: FormatArgs, config: &Config) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let profiles = api.profiles().await?;
    let format = resolve_format(args.format, config);
    let ctx = UiContext::detect().plain_if(format != OutputFormat::Table);

    let Some(profile) = profiles.first() else {
        ui::step_info(&ctx, "Logged in, but no profile is available");
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(profile)?,
        OutputFormat::Plain => {
            if let Some(username) = profile.get("username").and_then(Value::as_str) {
                println!("{}", username);
            }
        }
        OutputFormat::Table => {
            ui::intro(&ctx, "Account");
            for field in PROFILE_FIELDS {
                if let Some(value) = profile.get(field).and_then(display_value) {
                    ui::key_value(&ctx, field, &value);
                }
            }
            ui::key_value(&ctx, "api", &config.api.base_url);
        }
    }
    Ok(())
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(display_value),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_skips_empty_values() {
        assert_eq!(display_value(&json!(null)), None);
        assert_eq!(display_value(&json!("")), None);
        assert_eq!(display_value(&json!("ada")), Some("ada".into()));
        assert_eq!(display_value(&json!(7)), Some("7".into()));
    }

    #[test]
    fn nested_plan_shows_its_name() {
        assert_eq!(
            display_value(&json!({"id": 2, "name": "pro"})),
            Some("pro".into())
        );
    }
}
