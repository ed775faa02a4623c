//! Platform API: resource models, listings and endpoint calls

mod listing;
mod models;
mod platform;

pub use listing::{Listing, Page};
pub use models::{Deploy, DeployStatus, Network, Plan, Service, ServiceStatus};
pub use platform::{
    deploy_path, deploys_path, service_path, PlatformApi, ServiceSpec, LOGIN_PATH, PROFILES_PATH,
};
