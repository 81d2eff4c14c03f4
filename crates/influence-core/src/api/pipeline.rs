//! Outbound request pipeline.
//!
//! Every API call goes through [`Pipeline::execute`], which:
//! 1. reads the access token from the credential store and attaches it as
//!    a bearer credential (requests go out unauthenticated when none is stored)
//! 2. sends the request with the configured timeout
//! 3. on a 401, refreshes the token pair once and replays the request with
//!    the new access token
//!
//! A request is replayed at most once. If the refresh fails, both stored
//! tokens are deleted and the caller sees the original 401. Timeouts and
//! connection failures surface as their own error kinds and never trigger
//! a refresh.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, Result};
use crate::auth::{CredentialStore, StorageResult};
use crate::models::auth::RefreshRequest;
use crate::models::TokenPair;

/// Token refresh endpoint. Called without a bearer credential.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Capacity of the auth event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Credential lifecycle changes made by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A refresh succeeded and a new token pair was stored.
    TokensRefreshed,
    /// A refresh failed and both stored tokens were deleted.
    CredentialsRevoked,
}

/// One logical request plus its per-request pipeline state.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    bearer: Option<String>,
    retried: bool,
    refreshable: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retried: false,
            refreshable: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn put<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::PUT, path).with_json(body)
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Opt out of the refresh flow. Used for the credential-issuing
    /// endpoints, where a 401 means the submitted credentials were wrong.
    pub fn without_refresh(mut self) -> Self {
        self.refreshable = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this request has already been replayed after a refresh
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Shared request pipeline. Clone is cheap; clones share the connection
/// pool, credential store and event channel.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    http: Client,
    base_url: Url,
    credentials: CredentialStore,
    events: broadcast::Sender<AuthEvent>,
}

impl Pipeline {
    pub fn new(base_url: &str, timeout: Duration, credentials: CredentialStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        let base_url = Url::parse(base_url)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(PipelineInner {
                http,
                base_url,
                credentials,
                events,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Receive credential lifecycle events from this pipeline
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Send a request through attach → send → (on 401) refresh → replay.
    /// Returns the successful response, or the error the caller should see.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Response> {
        request.bearer = self.stored_access_token().await;

        loop {
            let response = self.send(&request).await?;

            if response.status() != StatusCode::UNAUTHORIZED || !request.refreshable {
                return Self::check_response(response).await;
            }

            let failure = Self::error_from(response).await;
            if request.retried {
                debug!(path = %request.path, "Replayed request still unauthorized");
                return Err(failure);
            }
            request.retried = true;

            match self.renew_credentials().await {
                Some(access_token) => request.bearer = Some(access_token),
                None => return Err(failure),
            }
        }
    }

    /// Exchange a refresh token for a new pair. Never carries a bearer
    /// credential and never recurses into the refresh flow.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let url = self.url(REFRESH_PATH)?;
        let response = self
            .inner
            .http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Refresh and persist the stored pair. Returns the new access token,
    /// or `None` when the caller should give up with the original 401.
    async fn renew_credentials(&self) -> Option<String> {
        let Some(refresh_token) = self.stored_refresh_token().await else {
            debug!("No refresh token stored, not attempting refresh");
            return None;
        };

        let tokens = match self.refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing credentials");
                self.revoke().await;
                return None;
            }
        };

        if let Err(e) = self.inner.credentials.save(&tokens).await {
            warn!(error = %e, "Failed to store refreshed credentials");
            self.revoke().await;
            return None;
        }

        info!("Access token refreshed");
        let _ = self.inner.events.send(AuthEvent::TokensRefreshed);
        Some(tokens.access_token)
    }

    async fn revoke(&self) {
        if let Err(e) = self.inner.credentials.clear().await {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        // No subscribers is fine
        let _ = self.inner.events.send(AuthEvent::CredentialsRevoked);
    }

    async fn stored_access_token(&self) -> Option<String> {
        Self::or_absent(self.inner.credentials.access_token().await)
    }

    async fn stored_refresh_token(&self) -> Option<String> {
        Self::or_absent(self.inner.credentials.refresh_token().await)
    }

    /// Storage failures are treated as "not stored".
    fn or_absent(result: StorageResult<Option<String>>) -> Option<String> {
        result.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read credential store");
            None
        })
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.url(&request.path)?;
        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = request.bearer.is_some(),
            retried = request.retried,
            "Sending request"
        );

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.send().await?)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }
}

// ============================================================================
// Tests
// ============================================================================
