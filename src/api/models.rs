//! Platform resources as returned by the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub max_services: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Lifecycle state of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Created,
    Deploying,
    Running,
    Stopped,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A service owning deploys and network attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: u64,
    pub name: String,
    #[serde(default = "unknown_service")]
    pub status: ServiceStatus,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn unknown_service() -> ServiceStatus {
    ServiceStatus::Unknown
}

/// Network resource that can be attached to services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub cidr: Option<String>,
}

/// Lifecycle state of a deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Uploaded,
    Building,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
    #[serde(other)]
    Unknown,
}

/// One uploaded artifact and its runtime state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deploy {
    pub id: u64,
    pub service: u64,
    #[serde(default = "unknown_deploy")]
    pub status: DeployStatus,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub artifact: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn unknown_deploy() -> DeployStatus {
    DeployStatus::Unknown
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceStatus::Created => "created",
            ServiceStatus::Deploying => "deploying",
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Failed => "failed",
            ServiceStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployStatus::Uploaded => "uploaded",
            DeployStatus::Building => "building",
            DeployStatus::Starting => "starting",
            DeployStatus::Running => "running",
            DeployStatus::Stopping => "stopping",
            DeployStatus::Stopped => "stopped",
            DeployStatus::Failed => "failed",
            DeployStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
