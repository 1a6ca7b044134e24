//! Authenticated HTTP transport with transparent token refresh.
//!
//! Every outbound request carries the current access token as a bearer
//! credential. When the server answers 401, the transport performs one
//! coordinated refresh, replays the original request once with the new
//! token, and hands the replay's outcome back to the caller. If the refresh
//! is impossible (no refresh token, refresh rejected, or the replay is still
//! unauthorized), the token store is cleared, the injected auth-failure
//! handler runs, and the caller gets the authorization error.
//!
//! Concurrent 401s share a single refresh: the refresh gate serializes
//! attempts, and a handler that waited on the gate reuses the token the
//! first attempt produced instead of issuing its own refresh call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invoked when an authorization failure is unrecoverable. The application
/// supplies navigation to its login surface here; the transport itself knows
/// nothing about UI.
pub type AuthFailureHandler = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// An outbound request. Immutable: the transport rebuilds the wire request
/// for each dispatch, so a replay after refresh reuses the same descriptor
/// with a different bearer token.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

#[derive(Debug)]
enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Owned file bytes; multipart forms are single-use in reqwest, so the
    /// form is rebuilt from these on every dispatch.
    Multipart {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn upload(
        path: impl Into<String>,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart {
                field: field.into(),
                file_name: file_name.into(),
                bytes,
            },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Credential-aware transport shared by all API calls.
pub struct AuthTransport {
    http: Client,
    base_url: String,
    store: Arc<TokenStore>,
    /// Serializes refresh attempts across in-flight requests.
    refresh_gate: Mutex<()>,
    on_auth_failure: Option<AuthFailureHandler>,
}

impl AuthTransport {
    pub fn new(base_url: impl Into<String>, store: Arc<TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            store,
            refresh_gate: Mutex::new(()),
            on_auth_failure: None,
        })
    }

    /// Install the handler run on unrecoverable authorization failure.
    pub fn with_auth_failure_handler(mut self, handler: AuthFailureHandler) -> Self {
        self.on_auth_failure = Some(handler);
        self
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Send a request through the authenticated pipeline.
    ///
    /// At most one refresh-and-replay cycle happens per call. Network
    /// failures propagate unchanged at every stage with no retry and no
    /// store mutation.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let sent_with = self.store.access_token();
        let response = self.dispatch(request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Access token rejected, attempting refresh");
        let fresh = match self.refreshed_access(sent_with.as_deref()).await {
            Ok(token) => token,
            Err(_) => return Err(self.fail_auth()),
        };

        let replay = self.dispatch(request, Some(&fresh)).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            // Still unauthorized after a fresh token: give up rather than
            // loop on a permanently invalid credential.
            return Err(self.fail_auth());
        }
        Ok(replay)
    }

    /// Send a request without credentials and without 401 recovery.
    ///
    /// Login and register use this path: a rejected login is an ordinary
    /// error, not a reason to clear the store and navigate away.
    pub async fn execute_unauthenticated(
        &self,
        request: &ApiRequest,
    ) -> Result<Response, ApiError> {
        self.dispatch(request, None).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart {
                field,
                file_name,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                builder.multipart(reqwest::multipart::Form::new().part(field.clone(), part))
            }
        };

        Ok(builder.send().await?)
    }

    /// Obtain a usable access token after a 401, issuing at most one refresh
    /// call across all concurrent handlers.
    ///
    /// `stale` is the token the failed dispatch carried. If the store holds a
    /// different token by the time the gate is acquired, another request
    /// already refreshed and that token is reused.
    async fn refreshed_access(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_gate.lock().await;

        if let Some(current) = self.store.access_token() {
            if stale != Some(current.as_str()) {
                debug!("Reusing access token from a concurrent refresh");
                return Ok(current);
            }
        }

        let Some(refresh) = self.store.refresh_token() else {
            return Err(ApiError::Unauthorized);
        };

        match self.request_refresh(&refresh).await {
            Ok(access) => {
                self.store.set_access(&access);
                debug!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                // Cleared while still holding the gate, so requests waiting
                // on it observe the failure instead of refreshing again.
                self.store.clear();
                Err(e)
            }
        }
    }

    /// The refresh call itself bypasses the 401 pipeline; a recursive retry
    /// here could never terminate.
    async fn request_refresh(&self, refresh: &str) -> Result<String, ApiError> {
        let url = format!("{}/auth/refresh/", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Bad refresh response: {}", e)))?;
        Ok(body.access)
    }

    /// Terminal authorization failure: clear credentials, notify the
    /// application, and hand the caller the authorization error. The caller
    /// still receives a normal error result; the handler is a side effect,
    /// not a substitute.
    fn fail_auth(&self) -> ApiError {
        warn!("Unrecoverable authorization failure, clearing credentials");
        self.store.clear();
        if let Some(ref handler) = self.on_auth_failure {
            handler();
        }
        ApiError::Unauthorized
    }
}
