//! Authentication session.
//!
//! [`SessionStore`] owns the token and user, mirrors both to local storage,
//! and republishes the navigation view after every mutation.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;

use crate::error::ApiError;
use crate::http::{decode_response, ApiRequest, Transport};
use crate::navigation::{Navigator, Redirect};
use crate::notifier::Notifier;
use crate::storage::{log_storage_error, LocalStore, TOKEN_KEY, USER_KEY};
use crate::types::{AuthResponse, User, UserEnvelope};

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Token and user travel together: a session has both or neither.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated { token: String, user: User },
}

/// What the navigation bar shows for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationView {
    Anonymous,
    Member {
        username: String,
        avatar_url: String,
        is_admin: bool,
    },
}

impl NavigationView {
    pub fn for_state(state: &SessionState) -> Self {
        match state {
            SessionState::Anonymous => NavigationView::Anonymous,
            SessionState::Authenticated { user, .. } => NavigationView::Member {
                username: user.username.clone(),
                avatar_url: avatar_url(user, 24),
                is_admin: user.is_admin(),
            },
        }
    }
}

/// Uploaded avatar, or a generated initials placeholder of `size` pixels.
pub fn avatar_url(user: &User, size: u32) -> String {
    match user.profile_image.as_deref() {
        Some(image) if !image.is_empty() && image != "default_avatar.png" => {
            format!("/static/uploads/avatars/{}", image)
        }
        _ => {
            let name = if user.username.is_empty() {
                "User"
            } else {
                user.username.as_str()
            };
            let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
            format!(
                "https://ui-avatars.com/api/?name={}&background=007bff&color=fff&size={}",
                encoded, size
            )
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    store: Arc<dyn LocalStore>,
    transport: Arc<dyn Transport>,
    navigation: watch::Sender<NavigationView>,
}

impl SessionStore {
    /// Restore the persisted session, if any.
    ///
    /// A token without a user (or an undecodable user) counts as anonymous
    /// and the leftovers are removed.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn LocalStore>) -> Self {
        let token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = store
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());

        let state = match (token, user) {
            (Some(token), Some(user)) => SessionState::Authenticated { token, user },
            (None, None) => SessionState::Anonymous,
            _ => {
                tracing::warn!("discarding half-persisted session");
                log_storage_error("remove", TOKEN_KEY, store.remove(TOKEN_KEY));
                log_storage_error("remove", USER_KEY, store.remove(USER_KEY));
                SessionState::Anonymous
            }
        };

        let (navigation, _) = watch::channel(NavigationView::for_state(&state));
        Self {
            state: RwLock::new(state),
            store,
            transport,
            navigation,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(|e| e.into_inner()),
            SessionState::Authenticated { .. }
        )
    }

    pub fn is_admin(&self) -> bool {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            SessionState::Authenticated { user, .. } => user.is_admin(),
            SessionState::Anonymous => false,
        }
    }

    pub fn token(&self) -> Option<String> {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            SessionState::Authenticated { token, .. } => Some(token.clone()),
            SessionState::Anonymous => None,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            SessionState::Authenticated { user, .. } => Some(user.clone()),
            SessionState::Anonymous => None,
        }
    }

    /// Default request headers: bearer auth plus JSON content type with a
    /// session, only the content type without one.
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = self.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers
    }

    /// Current navigation view.
    pub fn navigation(&self) -> NavigationView {
        self.navigation.borrow().clone()
    }

    /// Receiver that observes every navigation change.
    pub fn subscribe(&self) -> watch::Receiver<NavigationView> {
        self.navigation.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = ApiRequest::post("/api/auth/login")
            .header("Content-Type", "application/json")
            .json(serde_json::json!({ "email": email, "password": password }));
        let auth = self.authenticate(request).await?;
        tracing::info!(username = %auth.user.username, "logged in");
        Ok(self.establish(auth))
    }

    pub async fn register(&self, profile: &RegisterRequest) -> Result<User, ApiError> {
        let body = serde_json::to_value(profile).map_err(|e| ApiError::Decode(e.to_string()))?;
        let request = ApiRequest::post("/api/auth/register")
            .header("Content-Type", "application/json")
            .json(body);
        let auth = self.authenticate(request).await?;
        tracing::info!(username = %auth.user.username, "registered");
        Ok(self.establish(auth))
    }

    async fn authenticate(&self, request: ApiRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_response(response)
    }

    fn establish(&self, auth: AuthResponse) -> User {
        let user = auth.user.clone();
        self.replace(SessionState::Authenticated {
            token: auth.access_token,
            user: auth.user,
        });
        user
    }

    /// Clear the session everywhere. Safe to call repeatedly.
    pub fn logout(&self) {
        if self.is_authenticated() {
            tracing::info!("logged out");
        }
        self.replace(SessionState::Anonymous);
    }

    /// Refresh the user from the server; any failure ends the session.
    pub async fn verify_token(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        let request = ApiRequest::get("/api/auth/verify-token")
            .header("Authorization", &format!("Bearer {}", token))
            .header("Content-Type", "application/json");

        let verified = match self.transport.send(request).await {
            Ok(response) => decode_response::<UserEnvelope>(response),
            Err(e) => Err(ApiError::Network(e.to_string())),
        };

        match verified {
            Ok(envelope) => {
                // A logout that raced the verification wins.
                if self.token().as_deref() == Some(token.as_str()) {
                    self.replace(SessionState::Authenticated {
                        token,
                        user: envelope.user,
                    });
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                self.logout();
                false
            }
        }
    }

    /// Replace the signed-in user (after a profile edit). No-op when anonymous.
    pub fn update_user(&self, user: User) {
        let Some(token) = self.token() else {
            return;
        };
        self.replace(SessionState::Authenticated { token, user });
    }

    /// Redirect anonymous visitors to the login page, returning to `path`.
    pub fn require_auth(&self, navigator: &dyn Navigator, path: &str) -> bool {
        if self.is_authenticated() {
            return true;
        }
        navigator.navigate(Redirect::to_login(path));
        false
    }

    pub fn require_admin(&self, navigator: &dyn Navigator, notifier: &Notifier) -> bool {
        if self.is_admin() {
            return true;
        }
        notifier.error("Access denied. Admin privileges required.");
        navigator.navigate(Redirect::now("/"));
        false
    }

    fn replace(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        self.persist(&next);
        let view = NavigationView::for_state(&next);
        *state = next;
        drop(state);
        self.navigation.send_replace(view);
    }

    fn persist(&self, state: &SessionState) {
        match state {
            SessionState::Authenticated { token, user } => {
                log_storage_error("set", TOKEN_KEY, self.store.set(TOKEN_KEY, token));
                match serde_json::to_string(user) {
                    Ok(json) => log_storage_error("set", USER_KEY, self.store.set(USER_KEY, &json)),
                    Err(e) => tracing::warn!(error = %e, "failed to encode session user"),
                }
            }
            SessionState::Anonymous => {
                log_storage_error("remove", TOKEN_KEY, self.store.remove(TOKEN_KEY));
                log_storage_error("remove", USER_KEY, self.store.remove(USER_KEY));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, MockTransport};
    use crate::navigation::RecordingNavigator;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn admin_auth() -> serde_json::Value {
        json!({
            "access_token": "tok-1",
            "user": {"id": 1, "username": "admin", "role": "admin"}
        })
    }

    fn store_with(mock: MockTransport, local: Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(Arc::new(mock), local)
    }

    #[tokio::test]
    async fn test_login_persists_token_and_user() {
        let local = Arc::new(MemoryStore::new());
        let session = store_with(
            MockTransport::new().with_json(Method::Post, "/api/auth/login", 200, admin_auth()),
            local.clone(),
        );
        let mut nav = session.subscribe();

        let user = session.login("admin@tastyshare.com", "admin123").await.unwrap();

        assert_eq!(user.username, "admin");
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(local.get(TOKEN_KEY).as_deref(), Some("tok-1"));
        assert!(local.get(USER_KEY).unwrap().contains("\"admin\""));
        assert!(nav.has_changed().unwrap());
        assert!(matches!(
            &*nav.borrow_and_update(),
            NavigationView::Member { is_admin: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let local = Arc::new(MemoryStore::with_entries(&[
            (TOKEN_KEY, "old"),
            (USER_KEY, r#"{"id": 5, "username": "cook"}"#),
        ]));
        let session = store_with(
            MockTransport::new().with_json(
                Method::Post,
                "/api/auth/login",
                401,
                json!({"error": "Invalid email or password"}),
            ),
            local.clone(),
        );

        let err = session.login("cook@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.message_or(LOGIN_FALLBACK), "Invalid email or password");
        assert_eq!(session.token().as_deref(), Some("old"));
        assert_eq!(local.get(TOKEN_KEY).as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback_message() {
        let session = store_with(
            MockTransport::new().with_unreachable(Method::Post, "/api/auth/register"),
            Arc::new(MemoryStore::new()),
        );
        let err = session
            .register(&RegisterRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.message_or(REGISTER_FALLBACK), REGISTER_FALLBACK);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_half_persisted_session_is_discarded() {
        let local = Arc::new(MemoryStore::with_entries(&[(TOKEN_KEY, "orphan")]));
        let session = store_with(MockTransport::new(), local.clone());
        assert!(!session.is_authenticated());
        assert_eq!(local.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let local = Arc::new(MemoryStore::with_entries(&[
            (TOKEN_KEY, "t"),
            (USER_KEY, r#"{"id": 1, "username": "a"}"#),
        ]));
        let session = store_with(MockTransport::new(), local.clone());
        session.logout();
        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(session.navigation(), NavigationView::Anonymous);
        assert_eq!(local.get(USER_KEY), None);
    }

    #[test]
    fn test_auth_headers() {
        let anonymous = store_with(MockTransport::new(), Arc::new(MemoryStore::new()));
        assert_eq!(
            anonymous.auth_headers(),
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );

        let signed_in = store_with(
            MockTransport::new(),
            Arc::new(MemoryStore::with_entries(&[
                (TOKEN_KEY, "abc"),
                (USER_KEY, r#"{"id": 1, "username": "a"}"#),
            ])),
        );
        assert_eq!(signed_in.auth_headers()[0].1, "Bearer abc");
    }

    #[tokio::test]
    async fn test_verify_token_failure_logs_out() {
        let session = store_with(
            MockTransport::new().with_json(Method::Get, "/api/auth/verify-token", 401, json!({})),
            Arc::new(MemoryStore::with_entries(&[
                (TOKEN_KEY, "stale"),
                (USER_KEY, r#"{"id": 1, "username": "a"}"#),
            ])),
        );
        assert!(!session.verify_token().await);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_verify_token_refreshes_user() {
        let session = store_with(
            MockTransport::new().with_json(
                Method::Get,
                "/api/auth/verify-token",
                200,
                json!({"user": {"id": 1, "username": "renamed"}}),
            ),
            Arc::new(MemoryStore::with_entries(&[
                (TOKEN_KEY, "t"),
                (USER_KEY, r#"{"id": 1, "username": "a"}"#),
            ])),
        );
        assert!(session.verify_token().await);
        assert_eq!(session.current_user().unwrap().username, "renamed");
    }

    #[test]
    fn test_require_auth_redirects_with_return_path() {
        let session = store_with(MockTransport::new(), Arc::new(MemoryStore::new()));
        let navigator = RecordingNavigator::new();
        assert!(!session.require_auth(&navigator, "/add-recipe"));
        assert_eq!(
            navigator.last().unwrap().path,
            "/login?redirect=%2Fadd-recipe"
        );
    }

    #[test]
    fn test_require_admin_rejects_members() {
        let session = store_with(
            MockTransport::new(),
            Arc::new(MemoryStore::with_entries(&[
                (TOKEN_KEY, "t"),
                (USER_KEY, r#"{"id": 2, "username": "cook", "role": "user"}"#),
            ])),
        );
        let navigator = RecordingNavigator::new();
        let notifier = Notifier::new();
        assert!(!session.require_admin(&navigator, &notifier));
        assert_eq!(navigator.last().unwrap().path, "/");
        assert_eq!(
            notifier.current().unwrap().message,
            "Access denied. Admin privileges required."
        );
    }

    #[test]
    fn test_avatar_url() {
        let mut user = User {
            id: 1,
            username: "jane doe".to_string(),
            ..Default::default()
        };
        assert_eq!(
            avatar_url(&user, 24),
            "https://ui-avatars.com/api/?name=jane+doe&background=007bff&color=fff&size=24"
        );
        user.profile_image = Some("default_avatar.png".to_string());
        assert!(avatar_url(&user, 24).starts_with("https://ui-avatars.com"));
        user.profile_image = Some("jane.png".to_string());
        assert_eq!(avatar_url(&user, 120), "/static/uploads/avatars/jane.png");
    }
}
