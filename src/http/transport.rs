//! Transport seam between the request client and the network

use super::request::{ApiRequest, ApiResponse, Method, RequestBody};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// The request never produced an HTTP response
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one request and returns whatever HTTP response came back.
///
/// Implementations must not interpret status codes; a 401 or 500 is a
/// successful transport round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError>;
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("launchpad/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url(&request.path))
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => {
                let mut multipart = reqwest::multipart::Form::new();
                for (name, value) in &form.fields {
                    multipart = multipart.text(name.clone(), value.clone());
                }
                for file in &form.files {
                    let part = reqwest::multipart::Part::bytes(file.data.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)
                        .map_err(|e| TransportError(e.to_string()))?;
                    multipart = multipart.part(file.field.clone(), part);
                }
                builder.multipart(multipart)
            }
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let request_id = Uuid::new_v4();
        let mut builder = self.build(request)?.header("X-Request-Id", request_id.to_string());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        debug!(%request_id, authenticated = bearer.is_some(), "{}", request.label());
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("reading response body: {}", e)))?;
        debug!(%request_id, status, "{} completed", request.label());

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::MultipartForm;
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::new("https://api.example.test/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn joins_paths_onto_base() {
        let t = transport();
        assert_eq!(t.url("/services/"), "https://api.example.test/services/");
        assert_eq!(t.url("plans/"), "https://api.example.test/plans/");
        assert_eq!(
            t.url("https://other.test/services/?page=2"),
            "https://other.test/services/?page=2"
        );
    }

    #[test]
    fn json_requests_declare_content_type() {
        let request = ApiRequest::post("/services/").json(json!({"name": "web"}));
        let built = transport().build(&request).unwrap().build().unwrap();
        assert_eq!(
            built.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(body).unwrap(),
            json!({"name": "web"})
        );
    }

    #[test]
    fn multipart_requests_use_form_content_type() {
        let request = ApiRequest::post("/services/1/deploys/")
            .multipart(MultipartForm::new().text("comment", "v2"));
        let built = transport().build(&request).unwrap().build().unwrap();
        let content_type = built.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[test]
    fn query_parameters_are_encoded() {
        let request = ApiRequest::get("/services/").query("page", "2");
        let built = transport().build(&request).unwrap().build().unwrap();
        assert_eq!(built.url().query(), Some("page=2"));
    }
}
