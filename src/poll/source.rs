//! Poll sources backed by the platform API

use super::{Fetched, PollSource};
use crate::api::{deploys_path, service_path, Listing, PlatformApi};
use crate::error::LaunchpadResult;
use crate::http::ApiRequest;
use async_trait::async_trait;
use serde_json::Value;

/// A single service
pub struct ServiceSource {
    api: PlatformApi,
    service_id: u64,
}

impl ServiceSource {
    pub fn new(api: PlatformApi, service_id: u64) -> Self {
        Self { api, service_id }
    }
}

#[async_trait]
impl PollSource for ServiceSource {
    fn resource(&self) -> String {
        format!("service:{}", self.service_id)
    }

    async fn fetch(&self) -> LaunchpadResult<Fetched> {
        let body = self
            .api
            .fetch_json(ApiRequest::get(service_path(self.service_id)))
            .await?;
        Ok(Fetched::Entity(body))
    }
}

/// First page of a service's deploys
pub struct DeployListSource {
    api: PlatformApi,
    service_id: u64,
}

impl DeployListSource {
    pub fn new(api: PlatformApi, service_id: u64) -> Self {
        Self { api, service_id }
    }
}

#[async_trait]
impl PollSource for DeployListSource {
    fn resource(&self) -> String {
        format!("service:{}:deploys", self.service_id)
    }

    async fn fetch(&self) -> LaunchpadResult<Fetched> {
        let body = self
            .api
            .fetch_json(ApiRequest::get(deploys_path(self.service_id)))
            .await?;
        let listing: Listing<Value> = serde_json::from_value(body)?;
        Ok(Fetched::List(listing.into_items()))
    }
}
