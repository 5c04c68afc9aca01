//! Session store: who is logged in, derived from the persisted token.
//!
//! Lifecycle is `Unknown -> Authenticating -> Authenticated | Anonymous`.
//! While [`SessionStore::readiness`] reports [`Readiness::Loading`] callers
//! must not branch on the user; show a neutral state instead.
//!
//! The store is an owned value shared through `Arc`. Nothing about the
//! session lives in globals.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{decode, fetch, to_body, ApiClient, ClientError, Result};
use crate::models::{LoginRequest, LoginResponse, Role, SignupRequest, StudentProfile, User};
use crate::storage::{TokenStore, ROLE_KEY, TOKEN_KEY};

pub const ME_PATH: &str = "/auth/me";
pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const STUDENT_PROFILE_PATH: &str = "/student/profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Authenticating,
    Authenticated(User),
    Anonymous,
}

/// What a consumer may rely on right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready(Option<User>),
}

pub struct SessionStore {
    api: Arc<dyn ApiClient>,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn ApiClient>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            state: RwLock::new(SessionState::Unknown),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            *self.state.read(),
            SessionState::Unknown | SessionState::Authenticating
        )
    }

    pub fn readiness(&self) -> Readiness {
        match &*self.state.read() {
            SessionState::Unknown | SessionState::Authenticating => Readiness::Loading,
            SessionState::Authenticated(user) => Readiness::Ready(Some(user.clone())),
            SessionState::Anonymous => Readiness::Ready(None),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Resolve the session from the persisted token.
    ///
    /// Runs once; later calls return the settled readiness without touching
    /// the network.
    pub async fn init(&self) -> Readiness {
        {
            let mut state = self.state.write();
            if *state != SessionState::Unknown {
                drop(state);
                return self.readiness();
            }
            if self.tokens.token().is_none() {
                debug!("No persisted token, session is anonymous");
                *state = SessionState::Anonymous;
                drop(state);
                return self.readiness();
            }
            *state = SessionState::Authenticating;
        }

        let resolved = match fetch::<User>(&*self.api, ME_PATH).await {
            Ok(user) => {
                info!("Session restored for {} ({})", user.username, user.role);
                SessionState::Authenticated(user)
            }
            Err(e) => {
                warn!("Persisted token rejected, clearing session: {}", e);
                if let Err(e) = self.tokens.clear_session() {
                    warn!("Failed to clear persisted session: {}", e);
                }
                SessionState::Anonymous
            }
        };

        *self.state.write() = resolved;
        self.readiness()
    }

    /// Create a session. On success the token and role are persisted and the
    /// state is `Authenticated` before this returns.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let body = to_body(&LoginRequest { username, password })?;
        let response: LoginResponse = decode(LOGIN_PATH, self.api.post(LOGIN_PATH, body).await?)?;

        self.persist(&response)?;

        let user = if response.role == Role::Student {
            // The profile request already carries the new token
            match fetch::<StudentProfile>(&*self.api, STUDENT_PROFILE_PATH).await {
                Ok(profile) => {
                    let mut user = profile.identity();
                    if user.role == Role::default() {
                        user.role = response.role.clone();
                    }
                    user
                }
                Err(e) => {
                    warn!("Profile lookup failed after login, rolling back: {}", e);
                    self.rollback();
                    return Err(e);
                }
            }
        } else {
            User {
                id: 0,
                username: username.to_string(),
                role: response.role.clone(),
            }
        };

        info!("Logged in as {} ({})", user.username, user.role);
        *self.state.write() = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Create an account. Never authenticates.
    pub async fn signup(&self, username: &str, password: &str, role: &Role) -> Result<()> {
        let body = to_body(&SignupRequest {
            username,
            password,
            role,
        })?;
        self.api.post(SIGNUP_PATH, body).await?;
        info!("Account {} created with role {}", username, role);
        Ok(())
    }

    /// Drop the session. No server call; the state is reset even if the
    /// storage could not be cleared.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.tokens.clear_session();
        *self.state.write() = SessionState::Anonymous;
        info!("Logged out");
        cleared
    }

    /// The current user if they hold `role`.
    pub fn require_role(&self, role: &Role) -> Result<User> {
        match self.readiness() {
            Readiness::Ready(Some(user)) if &user.role == role => Ok(user),
            Readiness::Ready(Some(user)) => Err(ClientError::WrongRole {
                expected: role.to_string(),
                actual: user.role.to_string(),
            }),
            Readiness::Ready(None) | Readiness::Loading => Err(ClientError::Unauthenticated),
        }
    }

    fn persist(&self, response: &LoginResponse) -> Result<()> {
        let written = self
            .tokens
            .set(TOKEN_KEY, &response.token)
            .and_then(|_| self.tokens.set(ROLE_KEY, &response.role.to_string()));
        if written.is_err() {
            self.rollback();
        }
        written
    }

    fn rollback(&self) {
        if let Err(e) = self.tokens.clear_session() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }
}
