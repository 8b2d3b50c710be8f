//! Administrator session: login, logout and the persisted identity.

use std::sync::{Arc, Mutex};

use murales_api_types::{AdminUser, LoginRequest};
use tracing::{info, warn};

use crate::application::repos::{AuthRepo, SessionError, SessionStore};
use crate::util::lock::lock_state;

const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AdminUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct AuthService {
    repo: Arc<dyn AuthRepo>,
    session: Arc<dyn SessionStore>,
    state: Mutex<AuthState>,
}

impl AuthService {
    /// Starts from whatever identity the session store already holds.
    pub fn new(repo: Arc<dyn AuthRepo>, session: Arc<dyn SessionStore>) -> Self {
        let user = session.user();
        let state = AuthState {
            is_authenticated: user.is_some() && session.access_token().is_some(),
            user,
            ..AuthState::default()
        };
        Self {
            repo,
            session,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        lock_state(&self.state, "auth").clone()
    }

    pub fn current_user(&self) -> Option<AdminUser> {
        lock_state(&self.state, "auth").user.clone()
    }

    /// Exchange credentials for a token pair. On failure the reason is
    /// recorded in `error` and `false` is returned.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        {
            let mut state = lock_state(&self.state, "auth");
            state.is_loading = true;
            state.error = None;
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = match self.repo.login(request).await {
            Ok(payload) => self
                .persist(&payload.access_token, &payload.refresh_token, &payload.user)
                .map(|()| payload.user)
                .map_err(|err| {
                    warn!(
                        target = "murales::application::auth",
                        error = %err,
                        "Failed to persist session"
                    );
                    LOGIN_FAILED.to_string()
                }),
            Err(err) => {
                warn!(
                    target = "murales::application::auth",
                    error = %err,
                    "Login rejected"
                );
                Err(err.user_message().unwrap_or(LOGIN_FAILED).to_string())
            }
        };

        let mut state = lock_state(&self.state, "auth");
        state.is_loading = false;
        match result {
            Ok(user) => {
                info!(
                    target = "murales::application::auth",
                    user_id = %user.id,
                    role = %user.role,
                    "Administrator logged in"
                );
                state.user = Some(user);
                state.is_authenticated = true;
                true
            }
            Err(message) => {
                state.error = Some(message);
                false
            }
        }
    }

    pub fn logout(&self) {
        self.forget();
        let mut state = lock_state(&self.state, "auth");
        *state = AuthState::default();
        info!(target = "murales::application::auth", "Administrator logged out");
    }

    /// Authenticated only while both a token and a persisted user exist.
    /// A user left behind without a token is cleared.
    pub fn check_auth(&self) -> bool {
        let token = self.session.access_token();
        let user = self.session.user();
        let mut state = lock_state(&self.state, "auth");
        match (token, user) {
            (Some(_), Some(user)) => {
                state.user = Some(user);
                state.is_authenticated = true;
                true
            }
            _ => {
                if let Err(err) = self.session.set_user(None) {
                    warn!(
                        target = "murales::application::auth",
                        error = %err,
                        "Failed to clear stale user"
                    );
                }
                state.user = None;
                state.is_authenticated = false;
                false
            }
        }
    }

    fn persist(
        &self,
        access_token: &str,
        refresh_token: &str,
        user: &AdminUser,
    ) -> Result<(), SessionError> {
        self.session.set_tokens(access_token, refresh_token)?;
        self.session.set_user(Some(user))
    }

    fn forget(&self) {
        let cleared = self
            .session
            .clear_tokens()
            .and_then(|()| self.session.set_user(None));
        if let Err(err) = cleared {
            warn!(
                target = "murales::application::auth",
                error = %err,
                "Failed to clear session"
            );
        }
    }
}
