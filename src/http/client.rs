//! Token-aware request client
//!
//! Attaches the stored access token to every call, and on a 401 exchanges
//! the refresh token once and re-issues the call. The flow is driven by the
//! decision table in [`super::flow`].

use super::flow::{transition, Action, Event, Phase};
use super::request::{ApiRequest, ApiResponse};
use super::transport::{HttpTransport, Transport, TransportError};
use crate::config::schema::ApiConfig;
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::session::{IssuedTokens, SessionState};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default refresh endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/login/token/refresh/";

/// Default deadline for mutating calls
pub const DEFAULT_MUTATION_TIMEOUT: Duration = Duration::from_secs(30);

enum RefreshOutcome {
    Refreshed(String),
    Missing,
    Rejected,
    Unreachable(TransportError),
}

/// HTTP client that owns the token refresh cycle
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    session: SessionState,
    refresh_path: String,
    mutation_timeout: Duration,
    refresh_gate: Mutex<()>,
}

impl RequestClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionState) -> Self {
        Self {
            transport,
            session,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            mutation_timeout: DEFAULT_MUTATION_TIMEOUT,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Build a client talking HTTP to the configured API
    pub fn from_config(config: &ApiConfig, session: SessionState) -> LaunchpadResult<Self> {
        let transport = HttpTransport::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
        .map_err(|e| LaunchpadError::Internal(format!("building HTTP client: {}", e)))?;

        Ok(Self::new(Arc::new(transport), session)
            .with_refresh_path(config.refresh_path.clone())
            .with_mutation_timeout(Duration::from_secs(config.mutation_timeout_secs)))
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_mutation_timeout(mut self, timeout: Duration) -> Self {
        self.mutation_timeout = timeout;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Perform an authenticated request.
    ///
    /// Returns 2xx responses as-is; auth failures come back as
    /// `AuthenticationRequired` or `SessionExpired`.
    pub async fn execute(&self, request: ApiRequest) -> LaunchpadResult<ApiResponse> {
        self.with_deadline(&request, self.run(&request)).await
    }

    /// Perform an authenticated request and decode the JSON body
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> LaunchpadResult<T> {
        self.execute(request).await?.json()
    }

    /// Perform a request without credentials or refresh handling
    pub async fn execute_anonymous(&self, request: ApiRequest) -> LaunchpadResult<ApiResponse> {
        let call = async {
            let response = self
                .transport
                .send(&request, None)
                .await
                .map_err(|e| LaunchpadError::NetworkUnavailable(e.0))?;
            if response.is_success() {
                Ok(response)
            } else {
                Err(response.into_error())
            }
        };
        self.with_deadline(&request, call).await
    }

    async fn with_deadline<F>(&self, request: &ApiRequest, call: F) -> LaunchpadResult<ApiResponse>
    where
        F: Future<Output = LaunchpadResult<ApiResponse>>,
    {
        if !request.method.is_mutating() {
            return call.await;
        }

        match tokio::time::timeout(self.mutation_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} timed out after {:?}; outcome unknown",
                    request.label(),
                    self.mutation_timeout
                );
                Err(LaunchpadError::Timeout {
                    operation: request.label(),
                    after_secs: self.mutation_timeout.as_secs(),
                })
            }
        }
    }

    async fn run(&self, request: &ApiRequest) -> LaunchpadResult<ApiResponse> {
        let mut token = self.session.access_token().await?;
        let mut last: Option<ApiResponse> = None;
        let mut unreachable: Option<TransportError> = None;
        let (mut phase, mut action) = step(Phase::Idle, Event::Begin)?;

        loop {
            let event = match action {
                Action::Send | Action::Resend => {
                    match self.transport.send(request, token.as_deref()).await {
                        Ok(response) => {
                            let event = if response.is_success() {
                                Event::Succeeded
                            } else if response.is_unauthorized() {
                                Event::Unauthorized
                            } else {
                                Event::Rejected
                            };
                            last = Some(response);
                            event
                        }
                        Err(err) => {
                            unreachable = Some(err);
                            Event::Unreachable
                        }
                    }
                }
                Action::Refresh => match self.refresh(token.as_deref()).await? {
                    RefreshOutcome::Refreshed(access) => {
                        token = Some(access);
                        Event::Refreshed
                    }
                    RefreshOutcome::Missing => Event::NoRefreshToken,
                    RefreshOutcome::Rejected => Event::RefreshRejected,
                    RefreshOutcome::Unreachable(err) => {
                        unreachable = Some(err);
                        Event::Unreachable
                    }
                },
                Action::Return => {
                    return last.ok_or_else(|| {
                        LaunchpadError::Internal("request finished without a response".into())
                    });
                }
                Action::Propagate => {
                    return Err(match (unreachable, last) {
                        (Some(err), _) => LaunchpadError::NetworkUnavailable(err.0),
                        (None, Some(response)) => response.into_error(),
                        (None, None) => {
                            LaunchpadError::Internal("request failed without a response".into())
                        }
                    });
                }
                Action::RequireLogin => return Err(LaunchpadError::AuthenticationRequired),
                Action::ExpireSession => {
                    warn!("Session expired during {}", request.label());
                    self.session.clear().await?;
                    return Err(LaunchpadError::SessionExpired);
                }
            };

            debug!(?phase, ?event, "{}", request.label());
            (phase, action) = step(phase, event)?;
        }
    }

    /// Exchange the refresh token, at most one exchange in flight.
    ///
    /// `rejected` is the access token the failed call used; if storage
    /// already holds a different one, another call refreshed first.
    async fn refresh(&self, rejected: Option<&str>) -> LaunchpadResult<RefreshOutcome> {
        let _gate = self.refresh_gate.lock().await;

        let tokens = self.session.tokens().await?;
        if let Some(current) = tokens.access.as_deref() {
            if Some(current) != rejected {
                debug!("Access token was refreshed by a concurrent call");
                return Ok(RefreshOutcome::Refreshed(current.to_string()));
            }
        }

        let Some(refresh) = tokens.refresh else {
            debug!("No refresh token stored");
            return Ok(RefreshOutcome::Missing);
        };

        let exchange = ApiRequest::post(self.refresh_path.as_str()).json(json!({ "refresh": refresh }));
        let response = match self.transport.send(&exchange, None).await {
            Ok(response) => response,
            Err(err) => return Ok(RefreshOutcome::Unreachable(err)),
        };

        if !response.is_success() {
            warn!(status = response.status, "Refresh token rejected");
            return Ok(RefreshOutcome::Rejected);
        }

        let issued: IssuedTokens = match response.json() {
            Ok(issued) => issued,
            Err(e) => {
                warn!("Unreadable refresh response: {}", e);
                return Ok(RefreshOutcome::Rejected);
            }
        };

        let access = issued.access.clone();
        self.session.store(issued).await?;
        info!("Access token refreshed");
        Ok(RefreshOutcome::Refreshed(access))
    }
}

fn step(phase: Phase, event: Event) -> LaunchpadResult<(Phase, Action)> {
    transition(phase, event).ok_or_else(|| {
        LaunchpadError::Internal(format!("no transition from {:?} on {:?}", phase, event))
    })
}
