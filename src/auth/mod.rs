//! Admin session state.
//!
//! Each browser session gets its own [`AuthContext`]. Handlers inject it
//! rather than reading ambient state, and observe changes through
//! [`AuthContext::subscribe`].

pub mod guard;

pub use guard::Access;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;

use crate::backend::{AuthSession, Backend, BackendError, User};
use crate::config::SiteConfig;
use crate::i18n::{t, tf, Locale};

/// Snapshot of the session as seen by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// True until the initial session check has resolved.
    pub loading: bool,
    pub session: Option<AuthSession>,
    pub is_admin: bool,
}

impl AuthState {
    fn checking() -> Self {
        Self {
            loading: true,
            session: None,
            is_admin: false,
        }
    }

    fn signed_out() -> Self {
        Self {
            loading: false,
            session: None,
            is_admin: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// Decides which signed-in users may use the admin panel.
pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, user: &User) -> bool;
}

/// Every authenticated user is an admin.
pub struct AllAuthenticated;

impl AdminPolicy for AllAuthenticated {
    fn is_admin(&self, _user: &User) -> bool {
        true
    }
}

/// Only the listed emails (case-insensitive) are admins.
pub struct AllowList {
    emails: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        }
    }
}

impl AdminPolicy for AllowList {
    fn is_admin(&self, user: &User) -> bool {
        user.email
            .as_deref()
            .map(|email| self.emails.contains(&email.to_lowercase()))
            .unwrap_or(false)
    }
}

pub fn policy_from_config(site: &SiteConfig) -> Arc<dyn AdminPolicy> {
    if site.admin_emails.is_empty() {
        Arc::new(AllAuthenticated)
    } else {
        Arc::new(AllowList::new(&site.admin_emails))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Backend(String),
}

impl AuthError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            AuthError::InvalidCredentials => t(locale, "auth.invalid_credentials").to_string(),
            AuthError::Network(message) => tf(locale, "auth.network", &[message.as_str()]),
            AuthError::Backend(message) => tf(locale, "auth.failed", &[message.as_str()]),
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::InvalidCredentials => AuthError::InvalidCredentials,
            BackendError::Transport(message) | BackendError::Timeout(message) => {
                AuthError::Network(message)
            }
            other => AuthError::Backend(other.to_string()),
        }
    }
}

/// Outcome of [`AuthContext::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restored {
    /// No stored session.
    Anonymous,
    Active,
    Expired,
    /// The backend no longer knows the token.
    Rejected,
    /// The backend could not be reached; the stored session may still be valid.
    Unverified,
}

impl Restored {
    /// Whether the stored session should be discarded.
    pub fn is_terminal(self) -> bool {
        matches!(self, Restored::Expired | Restored::Rejected)
    }
}

/// Session context for one browser.
pub struct AuthContext {
    backend: Arc<dyn Backend>,
    policy: Arc<dyn AdminPolicy>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    /// Starts in the loading state; call [`AuthContext::restore`] to resolve it.
    pub fn new(backend: Arc<dyn Backend>, policy: Arc<dyn AdminPolicy>) -> Self {
        let (state, _) = watch::channel(AuthState::checking());
        Self {
            backend,
            policy,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin
    }

    /// A backend handle acting as the signed-in user.
    pub fn authorized_backend(&self) -> Option<Arc<dyn Backend>> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| self.backend.authorized(&s.access_token))
    }

    /// Initial session check. Anything short of a confirmed session resolves
    /// to signed-out; the outcome tells the caller whether the stored session
    /// is gone for good.
    pub async fn restore(&self, stored: Option<AuthSession>) -> Restored {
        let session = match stored {
            Some(session) if !session.is_expired(Utc::now()) => session,
            Some(session) => {
                tracing::debug!(user_id = %session.user.id, "Stored session expired");
                self.publish(None);
                return Restored::Expired;
            }
            None => {
                self.publish(None);
                return Restored::Anonymous;
            }
        };

        match self.backend.get_user(&session.access_token).await {
            Ok(Some(user)) => {
                self.publish(Some(AuthSession { user, ..session }));
                Restored::Active
            }
            Ok(None) => {
                tracing::debug!(user_id = %session.user.id, "Stored session rejected by backend");
                self.publish(None);
                Restored::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                self.publish(None);
                Restored::Unverified
            }
        }
    }

    /// Check credentials with the backend. The new state is published to
    /// subscribers; the return value only reports failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Admin signed in");
                self.publish(Some(session));
                Ok(())
            }
            Err(e) => {
                tracing::info!(error = %e, "Sign-in rejected");
                Err(AuthError::from(e))
            }
        }
    }

    pub async fn sign_out(&self) {
        let token = self
            .state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(token) = token {
            if let Err(e) = self.backend.sign_out(&token).await {
                tracing::warn!(error = %e, "Backend sign-out failed");
            }
        }
        self.publish(None);
    }

    fn publish(&self, session: Option<AuthSession>) {
        let next = match session {
            Some(session) => {
                let is_admin = self.policy.is_admin(&session.user);
                AuthState {
                    loading: false,
                    session: Some(session),
                    is_admin,
                }
            }
            None => AuthState::signed_out(),
        };
        self.state.send_replace(next);
    }
}
