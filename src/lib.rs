//! Launchpad - client for a service deployment platform
//!
//! Authenticated API access with transparent token refresh, client-side
//! caching that merges polled data without churn, and a CLI on top.

pub mod api;
pub mod artifact;
pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod poll;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod sync;
pub mod ui;

pub use error::{LaunchpadError, LaunchpadResult};
