//! Typed surface of the deployment platform API

use super::listing::Listing;
use super::models::{Deploy, Network, Plan, Service};
use crate::artifact::Artifact;
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::http::{ApiRequest, MultipartForm, RequestClient};
use crate::session::{IssuedTokens, SessionState};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Login endpoint
pub const LOGIN_PATH: &str = "/login/token/";

/// Profile listing, touched after login to warm the server-side cache
pub const PROFILES_PATH: &str = "/profiles/";

/// Fields accepted when creating or updating a service
#[derive(Debug, Clone, Default)]
pub struct ServiceSpec {
    pub name: Option<String>,
    pub plan: Option<u64>,
}

impl ServiceSpec {
    fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), json!(name));
        }
        if let Some(plan) = self.plan {
            body.insert("plan".into(), json!(plan));
        }
        Value::Object(body)
    }
}

/// Client for the platform's REST endpoints
#[derive(Clone)]
pub struct PlatformApi {
    client: Arc<RequestClient>,
}

impl PlatformApi {
    pub fn new(client: Arc<RequestClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    pub fn session(&self) -> &SessionState {
        self.client.session()
    }

    // Authentication

    /// Exchange credentials for a token pair and store it
    pub async fn login(&self, username: &str, password: &str) -> LaunchpadResult<()> {
        let response = self
            .client
            .execute_anonymous(
                ApiRequest::post(LOGIN_PATH)
                    .json(json!({ "username": username, "password": password })),
            )
            .await
            .map_err(|e| match e {
                LaunchpadError::AuthenticationRequired => LaunchpadError::CredentialsRejected,
                other => other,
            })?;
        let issued: IssuedTokens = response.json()?;
        self.session().store(issued).await?;
        info!("Logged in as {}", username);

        // Non-critical: only warms the profile cache.
        if let Err(e) = self.client.execute(ApiRequest::get(PROFILES_PATH)).await {
            debug!("Profile warm-up failed: {}", e);
        }
        Ok(())
    }

    /// Forget the stored credentials
    pub async fn logout(&self) -> LaunchpadResult<()> {
        self.session().clear().await
    }

    /// Raw profile listing of the current user
    pub async fn profiles(&self) -> LaunchpadResult<Vec<Value>> {
        let listing: Listing<Value> = self.client.execute_json(ApiRequest::get(PROFILES_PATH)).await?;
        Ok(listing.into_items())
    }

    // Plans

    pub async fn list_plans(&self) -> LaunchpadResult<Listing<Plan>> {
        self.client.execute_json(ApiRequest::get("/plans/")).await
    }

    pub async fn select_plan(&self, plan_id: u64) -> LaunchpadResult<Value> {
        self.client
            .execute(ApiRequest::post(format!("/plans/{}/select/", plan_id)))
            .await?
            .json_value()
    }

    // Services

    pub async fn list_services(&self, page: Option<u32>) -> LaunchpadResult<Listing<Service>> {
        self.client.execute_json(with_page(ApiRequest::get("/services/"), page)).await
    }

    pub async fn get_service(&self, id: u64) -> LaunchpadResult<Service> {
        self.client.execute_json(ApiRequest::get(service_path(id))).await
    }

    pub async fn create_service(&self, spec: &ServiceSpec) -> LaunchpadResult<Service> {
        self.client
            .execute_json(ApiRequest::post("/services/").json(spec.to_json()))
            .await
    }

    pub async fn update_service(&self, id: u64, spec: &ServiceSpec) -> LaunchpadResult<Service> {
        self.client
            .execute_json(ApiRequest::patch(service_path(id)).json(spec.to_json()))
            .await
    }

    pub async fn delete_service(&self, id: u64) -> LaunchpadResult<()> {
        self.client.execute(ApiRequest::delete(service_path(id))).await?;
        Ok(())
    }

    // Networks

    pub async fn list_networks(&self) -> LaunchpadResult<Listing<Network>> {
        self.client.execute_json(ApiRequest::get("/networks/")).await
    }

    pub async fn create_network(&self, name: &str) -> LaunchpadResult<Network> {
        self.client
            .execute_json(ApiRequest::post("/networks/").json(json!({ "name": name })))
            .await
    }

    pub async fn attach_network(&self, service_id: u64, network_id: u64) -> LaunchpadResult<()> {
        self.client
            .execute(
                ApiRequest::post(format!("{}networks/", service_path(service_id)))
                    .json(json!({ "network": network_id })),
            )
            .await?;
        Ok(())
    }

    pub async fn detach_network(&self, service_id: u64, network_id: u64) -> LaunchpadResult<()> {
        self.client
            .execute(ApiRequest::delete(format!(
                "{}networks/{}/",
                service_path(service_id),
                network_id
            )))
            .await?;
        Ok(())
    }

    // Deploys

    pub async fn list_deploys(
        &self,
        service_id: u64,
        page: Option<u32>,
    ) -> LaunchpadResult<Listing<Deploy>> {
        self.client
            .execute_json(with_page(ApiRequest::get(deploys_path(service_id)), page))
            .await
    }

    pub async fn get_deploy(&self, id: u64) -> LaunchpadResult<Deploy> {
        self.client.execute_json(ApiRequest::get(deploy_path(id))).await
    }

    /// Upload a zip artifact as a new deploy of `service_id`
    pub async fn upload_deploy(
        &self,
        service_id: u64,
        artifact: &Artifact,
        comment: Option<&str>,
    ) -> LaunchpadResult<Deploy> {
        let mut form = MultipartForm::new().file(artifact.to_part());
        if let Some(comment) = comment {
            form = form.text("comment", comment);
        }
        self.client
            .execute_json(ApiRequest::post(deploys_path(service_id)).multipart(form))
            .await
    }

    pub async fn start_deploy(&self, id: u64) -> LaunchpadResult<Deploy> {
        self.client
            .execute_json(ApiRequest::post(format!("{}start/", deploy_path(id))))
            .await
    }

    pub async fn stop_deploy(&self, id: u64) -> LaunchpadResult<Deploy> {
        self.client
            .execute_json(ApiRequest::post(format!("{}stop/", deploy_path(id))))
            .await
    }

    // Untyped access for polling

    /// Fetch any resource as raw JSON
    pub async fn fetch_json(&self, request: ApiRequest) -> LaunchpadResult<Value> {
        self.client.execute(request).await?.json_value()
    }
}

pub fn service_path(id: u64) -> String {
    format!("/services/{}/", id)
}

pub fn deploys_path(service_id: u64) -> String {
    format!("/services/{}/deploys/", service_id)
}

pub fn deploy_path(id: u64) -> String {
    format!("/deploys/{}/", id)
}

fn with_page(request: ApiRequest, page: Option<u32>) -> ApiRequest {
    match page {
        Some(page) if page > 1 => request.query("page", page.to_string()),
        _ => request,
    }
}
