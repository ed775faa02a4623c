//! Error types for Launchpad
//!
//! All modules use `LaunchpadResult<T>` as their return type.

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Launchpad operations
pub type LaunchpadResult<T> = Result<T, LaunchpadError>;

/// All errors that can occur in Launchpad
#[derive(Error, Debug)]
pub enum LaunchpadError {
    // API errors
    #[error("Cannot reach the Launchpad API: {0}")]
    NetworkUnavailable(String),

    #[error("Not logged in")]
    AuthenticationRequired,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Username or password was not accepted")]
    CredentialsRejected,

    #[error("Request rejected: {}", messages.join("; "))]
    ValidationFailed { messages: Vec<String> },

    #[error("{operation} did not complete within {after_secs}s; the change may or may not have been applied")]
    Timeout { operation: String, after_secs: u64 },

    #[error("API error (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    Decode(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Storage errors
    #[error("Failed to persist client storage at {path}: {reason}")]
    StoragePersist { path: PathBuf, reason: String },

    // Artifact errors
    #[error("Invalid deployment artifact {path}: {reason}")]
    ArtifactInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl LaunchpadError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a validation error from a server error payload
    pub fn validation(payload: &Value) -> Self {
        let mut messages = flatten_messages(payload);
        if messages.is_empty() {
            messages.push("the server rejected the request".to_string());
        }
        Self::ValidationFailed { messages }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_) | Self::Timeout { .. })
    }

    /// Whether the user has to log in again to continue
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationRequired | Self::SessionExpired)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationRequired | Self::SessionExpired => Some("Run: launchpad login"),
            Self::CredentialsRejected => {
                Some("Check the username and password, then run: launchpad login")
            }
            Self::NetworkUnavailable(_) => {
                Some("Check your connection or api.base_url, then retry")
            }
            Self::Timeout { .. } => Some("Check the current state before retrying the action"),
            Self::ConfigInvalid { .. } => Some("Run: launchpad config init --force"),
            _ => None,
        }
    }
}

/// Flatten an arbitrarily nested error payload into readable lines.
///
/// Object keys become `field: message` prefixes (nested keys joined with
/// `.`); `detail` and `non_field_errors` are reported without a prefix.
pub fn flatten_messages(payload: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_messages(payload, None, &mut out);
    out
}

fn collect_messages(value: &Value, field: Option<&str>, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(with_field(field, s)),
        Value::Bool(_) | Value::Number(_) => out.push(with_field(field, &value.to_string())),
        Value::Array(items) => {
            for item in items {
                collect_messages(item, field, out);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                let path = if matches!(key.as_str(), "detail" | "non_field_errors") {
                    field.map(str::to_string)
                } else {
                    Some(match field {
                        Some(parent) => format!("{}.{}", parent, key),
                        None => key.clone(),
                    })
                };
                collect_messages(nested, path.as_deref(), out);
            }
        }
    }
}

fn with_field(field: Option<&str>, message: &str) -> String {
    match field {
        Some(field) => format!("{}: {}", field, message),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_display() {
        let err = LaunchpadError::SessionExpired;
        assert!(err.to_string().contains("Session expired"));
    }

    #[test]
    fn error_hint() {
        assert_eq!(
            LaunchpadError::AuthenticationRequired.hint(),
            Some("Run: launchpad login")
        );
        assert!(LaunchpadError::Internal("x".into()).hint().is_none());
        assert!(!LaunchpadError::CredentialsRejected.is_auth_failure());
    }

    #[test]
    fn error_retryable() {
        assert!(LaunchpadError::NetworkUnavailable("refused".into()).is_retryable());
        assert!(!LaunchpadError::SessionExpired.is_retryable());
        assert!(LaunchpadError::SessionExpired.is_auth_failure());
    }

    #[test]
    fn timeout_reports_ambiguous_outcome() {
        let err = LaunchpadError::Timeout {
            operation: "POST /services/".into(),
            after_secs: 30,
        };
        assert!(err.to_string().contains("may or may not have been applied"));
    }

    #[test]
    fn flattens_nested_payload() {
        let payload = json!({
            "name": ["This field is required."],
            "plan": {"id": ["Invalid pk \"7\"."]},
            "non_field_errors": ["Service limit reached."]
        });
        let messages = flatten_messages(&payload);
        assert!(messages.contains(&"name: This field is required.".to_string()));
        assert!(messages.contains(&"plan.id: Invalid pk \"7\".".to_string()));
        assert!(messages.contains(&"Service limit reached.".to_string()));
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn flattens_bare_string_and_detail() {
        assert_eq!(flatten_messages(&json!("Nope")), vec!["Nope"]);
        assert_eq!(
            flatten_messages(&json!({"detail": "Not allowed"})),
            vec!["Not allowed"]
        );
    }

    #[test]
    fn validation_never_empty() {
        match LaunchpadError::validation(&json!({})) {
            LaunchpadError::ValidationFailed { messages } => assert_eq!(messages.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
