use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, AuthEvent, Result};
use crate::models::{Profile, RegistrationExtras, Role, TokenPair, User};

/// Immutable snapshot of the session.
///
/// `is_authenticated()` is derived from the user, so a snapshot can never
/// claim authentication without an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    user: Option<User>,
    profile: Option<Profile>,
    is_loading: bool,
}

impl SessionState {
    /// Startup state before the stored session has been checked
    pub fn loading() -> Self {
        Self {
            user: None,
            profile: None,
            is_loading: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            profile: None,
            is_loading: false,
        }
    }

    pub fn authenticated(user: User, profile: Option<Profile>) -> Self {
        Self {
            user: Some(user),
            profile,
            is_loading: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_brand(&self) -> bool {
        self.role() == Some(Role::Brand)
    }

    pub fn is_influencer(&self) -> bool {
        self.role() == Some(Role::Influencer)
    }
}

/// Process-wide session. Clone is cheap; clones share one state.
///
/// State changes only through `login`, `register`, `logout`, `load_user`
/// and the revocation handler. Each transition holds a lock for its whole
/// duration, so observers never see an interleaved partial update.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    transition: Mutex<()>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            inner: Arc::new(SessionInner {
                api,
                state,
                transition: Mutex::new(()),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Current state
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// On failure the session is left as it was and the error is returned;
    /// a rejected password surfaces as `ApiError::Unauthorized` with the
    /// server's detail message.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState> {
        let _guard = self.inner.transition.lock().await;
        let tokens = self.inner.api.login(email, password).await?;
        self.establish(&tokens).await
    }

    /// Create an account and sign in to it
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        extra: &RegistrationExtras,
    ) -> Result<SessionState> {
        let _guard = self.inner.transition.lock().await;
        let tokens = self.inner.api.register(email, password, role, extra).await?;
        self.establish(&tokens).await
    }

    /// Forget stored credentials and reset to signed out. Never fails and
    /// makes no server call.
    pub async fn logout(&self) {
        let _guard = self.inner.transition.lock().await;
        if let Err(e) = self.inner.api.credentials().clear().await {
            warn!(error = %e, "Failed to clear stored credentials on logout");
        }
        self.inner.state.send_replace(SessionState::unauthenticated());
        info!("Signed out");
    }

    /// Restore the session at startup.
    ///
    /// With no stored access token this resolves to signed out without any
    /// network call. Any failure fetching the identity also resolves to
    /// signed out; this never returns an error.
    pub async fn load_user(&self) -> SessionState {
        let _guard = self.inner.transition.lock().await;

        let token = match self.inner.api.credentials().access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credentials");
                None
            }
        };

        let state = match token {
            None => {
                debug!("No stored session");
                SessionState::unauthenticated()
            }
            Some(_) => match self.inner.api.me().await {
                Ok((user, profile)) => {
                    info!(user_id = %user.id, role = %user.role, "Restored session");
                    SessionState::authenticated(user, profile)
                }
                Err(e) => {
                    warn!(error = %e, "Could not restore session");
                    SessionState::unauthenticated()
                }
            },
        };

        self.inner.state.send_replace(state.clone());
        state
    }

    /// React to a credential lifecycle event from the request pipeline.
    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::TokensRefreshed => debug!("Session tokens refreshed"),
            AuthEvent::CredentialsRevoked => {
                let _guard = self.inner.transition.lock().await;
                // A newer login may have stored fresh credentials since the
                // revocation was queued.
                if self.inner.api.credentials().has_credentials().await {
                    debug!("Ignoring stale revocation, credentials present");
                    return;
                }
                if self.inner.state.borrow().is_authenticated() {
                    info!("Session expired, signing out");
                }
                self.inner.state.send_replace(SessionState::unauthenticated());
            }
        }
    }

    /// Forward pipeline events to [`SessionStore::handle_event`] until the
    /// session or its pipeline is dropped.
    pub fn spawn_event_listener(&self) -> JoinHandle<()> {
        let events = self.inner.api.subscribe();
        let session = Arc::downgrade(&self.inner);
        tokio::spawn(Self::listen(session, events))
    }

    async fn listen(session: Weak<SessionInner>, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(inner) = session.upgrade() else { break };
                    SessionStore { inner }.handle_event(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Auth event listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Persist the issued pair, fetch the identity, and publish the new state.
    async fn establish(&self, tokens: &TokenPair) -> Result<SessionState> {
        self.inner.api.credentials().save(tokens).await?;
        let (user, profile) = self.inner.api.me().await?;
        info!(user_id = %user.id, role = %user.role, "Signed in");

        let state = SessionState::authenticated(user, profile);
        self.inner.state.send_replace(state.clone());
        Ok(state)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::auth::{CredentialStore, MemoryStorage};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStorage::new()))
    }

    fn session(server: &MockServer, credentials: CredentialStore) -> SessionStore {
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5), credentials).unwrap();
        SessionStore::new(api)
    }

    fn tokens(access: &str, refresh: &str) -> Value {
        json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer" })
    }

    fn brand_me() -> Value {
        json!({
            "user": {
                "id": "u-brand-1",
                "email": "brand1@example.com",
                "role": "brand",
                "is_active": true,
                "created_at": "2025-01-01T00:00:00Z"
            },
            "profile": {
                "id": "b1",
                "user_id": "u-brand-1",
                "company_name": "GlowUp Cosmetics",
                "industry": "Beauty"
            }
        })
    }

    fn influencer_me() -> Value {
        json!({
            "user": {
                "id": "u-inf-1",
                "email": "maya@example.com",
                "role": "influencer",
                "is_active": true,
                "created_at": "2025-01-01T00:00:00Z"
            },
            "profile": {
                "id": "i1",
                "user_id": "u-inf-1",
                "display_name": "Maya",
                "follower_count": 1000
            }
        })
    }

    async fn mount_me(server: &MockServer, bearer: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .and(header("authorization", format!("Bearer {}", bearer).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let server = MockServer::start().await;
        let state = session(&server, store()).snapshot();
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_tokens_and_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(json!({ "email": "brand1@example.com", "password": "password123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
            .expect(1)
            .mount(&server)
            .await;
        mount_me(&server, "access-1", brand_me(), 1).await;

        let credentials = store();
        let session = session(&server, credentials.clone());
        let state = session.login("brand1@example.com", "password123").await.unwrap();

        assert!(state.is_authenticated());
        assert!(!state.is_loading());
        assert!(state.is_brand());
        assert_eq!(state.user().unwrap().role, Role::Brand);
        assert_eq!(state.profile().unwrap().display_name(), "GlowUp Cosmetics");
        assert_eq!(session.snapshot(), state);

        assert_eq!(credentials.access_token().await.unwrap().as_deref(), Some("access-1"));
        assert_eq!(credentials.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let credentials = store();
        let session = session(&server, credentials.clone());
        let before = session.snapshot();

        let err = session.login("brand1@example.com", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(session.snapshot(), before);
        assert!(!credentials.has_credentials().await);
    }

    #[tokio::test]
    async fn test_login_transport_failure_is_distinct() {
        let api = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2), store()).unwrap();
        let session = SessionStore::new(api);

        let err = session.login("brand1@example.com", "password123").await.unwrap_err();
        assert!(err.is_transport());
        assert!(!session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_register_sends_role_and_extras() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/register"))
            .and(body_json(json!({
                "email": "maya@example.com",
                "password": "secret",
                "role": "influencer",
                "display_name": "Maya"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(tokens("access-i", "refresh-i")))
            .expect(1)
            .mount(&server)
            .await;
        mount_me(&server, "access-i", influencer_me(), 1).await;

        let session = session(&server, store());
        let state = session
            .register(
                "maya@example.com",
                "secret",
                Role::Influencer,
                &RegistrationExtras::influencer("Maya"),
            )
            .await
            .unwrap();

        assert!(state.is_influencer());
        assert_eq!(state.profile().unwrap().as_influencer().unwrap().follower_count, 1000);
    }

    #[tokio::test]
    async fn test_logout_always_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
            .mount(&server)
            .await;
        mount_me(&server, "access-1", brand_me(), 1).await;

        let credentials = store();
        let session = session(&server, credentials.clone());
        session.login("brand1@example.com", "password123").await.unwrap();

        session.logout().await;
        let state = session.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.profile().is_none());
        assert_eq!(credentials.access_token().await.unwrap(), None);
        assert_eq!(credentials.refresh_token().await.unwrap(), None);

        // Logging out again from a signed-out state is the same
        session.logout().await;
        assert_eq!(session.snapshot(), SessionState::unauthenticated());
    }

    #[tokio::test]
    async fn test_load_user_without_token_makes_no_request() {
        let server = MockServer::start().await;
        let session = session(&server, store());

        let state = session.load_user().await;

        assert!(!state.is_loading());
        assert!(!state.is_authenticated());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_user_with_valid_token_restores_session() {
        let server = MockServer::start().await;
        mount_me(&server, "access-1", brand_me(), 1).await;

        let credentials = store();
        credentials
            .save(&serde_json::from_value(tokens("access-1", "refresh-1")).unwrap())
            .await
            .unwrap();
        let session = session(&server, credentials);

        let state = session.load_user().await;
        assert!(state.is_authenticated());
        assert!(!state.is_loading());
        assert_eq!(state.user().unwrap().email, "brand1@example.com");
    }

    #[tokio::test]
    async fn test_load_user_identity_failure_resolves_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = store();
        credentials
            .save(&serde_json::from_value(tokens("access-1", "refresh-1")).unwrap())
            .await
            .unwrap();
        let session = session(&server, credentials);

        let state = session.load_user().await;
        assert_eq!(state, SessionState::unauthenticated());
    }

    #[tokio::test]
    async fn test_load_user_with_dead_credentials_clears_them() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid token" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid refresh token" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let credentials = store();
        credentials
            .save(&serde_json::from_value(tokens("expired", "also-expired")).unwrap())
            .await
            .unwrap();
        let session = session(&server, credentials.clone());

        let state = session.load_user().await;
        assert!(!state.is_authenticated());
        assert!(!credentials.has_credentials().await);
    }

    #[tokio::test]
    async fn test_load_user_restores_session_after_token_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .and(header("authorization", "Bearer expired"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .and(body_json(json!({ "refresh_token": "r1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens("a2", "r2")))
            .expect(1)
            .mount(&server)
            .await;
        mount_me(&server, "a2", influencer_me(), 1).await;

        let credentials = store();
        credentials
            .save(&serde_json::from_value(tokens("expired", "r1")).unwrap())
            .await
            .unwrap();
        let session = session(&server, credentials.clone());

        let state = session.load_user().await;
        assert!(state.is_authenticated());
        assert!(state.is_influencer());
        assert_eq!(session.snapshot(), state);
        assert_eq!(credentials.access_token().await.unwrap().as_deref(), Some("a2"));
        assert_eq!(credentials.refresh_token().await.unwrap().as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_revocation_signs_out_authenticated_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
            .mount(&server)
            .await;
        mount_me(&server, "access-1", brand_me(), 1).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/campaigns/mine"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server, store());
        let listener = session.spawn_event_listener();
        session.login("brand1@example.com", "password123").await.unwrap();

        let mut changes = session.subscribe();
        changes.borrow_and_update();

        let err = session.api().my_campaigns().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));

        tokio::time::timeout(Duration::from_secs(2), changes.changed())
            .await
            .expect("session state did not change")
            .unwrap();
        assert!(!session.snapshot().is_authenticated());

        listener.abort();
    }

    #[tokio::test]
    async fn test_stale_revocation_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
            .mount(&server)
            .await;
        mount_me(&server, "access-1", brand_me(), 1).await;

        let session = session(&server, store());
        session.login("brand1@example.com", "password123").await.unwrap();

        session.handle_event(AuthEvent::CredentialsRevoked).await;
        assert!(session.snapshot().is_authenticated());
    }
}
