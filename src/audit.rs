//! Audit trail of account and deploy actions
//!
//! Appends JSON lines to `<state_dir>/launchpad/audit.log`. Never records
//! credentials or tokens.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Actions that leave a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    Login,
    Logout,
    SessionExpired,
    PlanSelect,
    ServiceCreate,
    ServiceDelete,
    NetworkAttach,
    NetworkDetach,
    DeployUpload,
    DeployStart,
    DeployStop,
}

impl AuditEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::Login => "auth.login",
            AuditEvent::Logout => "auth.logout",
            AuditEvent::SessionExpired => "auth.expired",
            AuditEvent::PlanSelect => "plan.select",
            AuditEvent::ServiceCreate => "service.create",
            AuditEvent::ServiceDelete => "service.delete",
            AuditEvent::NetworkAttach => "network.attach",
            AuditEvent::NetworkDetach => "network.detach",
            AuditEvent::DeployUpload => "deploy.upload",
            AuditEvent::DeployStart => "deploy.start",
            AuditEvent::DeployStop => "deploy.stop",
        }
    }
}

/// Append-only JSON lines logger
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Record `event`. Write failures are logged and otherwise ignored.
    pub async fn record(&self, event: AuditEvent, data: Value) {
        if !self.enabled {
            return;
        }

        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event.name(),
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
