//! Bridges the cookie session and the per-request [`AuthContext`].

use std::sync::Arc;

use tower_sessions::Session;

use crate::auth::{AuthContext, AuthState};
use crate::backend::AuthSession;
use crate::AppState;

const AUTH_KEY: &str = "auth";

/// Resolve the browser's stored backend session into an [`AuthContext`].
/// A stored session that expired or that the backend no longer accepts is
/// dropped from the cookie session; one that could not be checked is kept.
pub async fn load_context(state: &AppState, session: &Session) -> AuthContext {
    let stored = match session.get::<AuthSession>(AUTH_KEY).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    };
    let ctx = AuthContext::new(Arc::clone(&state.backend), Arc::clone(&state.policy));
    if ctx.restore(stored).await.is_terminal() {
        if let Err(e) = session.remove::<AuthSession>(AUTH_KEY).await {
            tracing::warn!(error = %e, "Failed to clear stale session");
        }
    }
    ctx
}

/// Write the context's current state into the cookie session. Signing in
/// rotates the session id.
pub async fn persist(
    session: &Session,
    auth: &AuthState,
) -> Result<(), tower_sessions::session::Error> {
    match &auth.session {
        Some(backend_session) => {
            session.cycle_id().await?;
            session.insert(AUTH_KEY, backend_session).await
        }
        None => session.flush().await,
    }
}
