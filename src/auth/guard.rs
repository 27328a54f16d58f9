use super::AuthState;
use crate::backend::User;

/// Outcome of guarding an admin page.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Initial session check still running.
    Checking,
    /// No session. Shows the sign-in prompt; there is no redirect.
    Denied,
    /// Signed in, but the admin policy rejects the user.
    Forbidden(User),
    Granted(User),
}

impl Access {
    pub fn evaluate(state: &AuthState) -> Self {
        if state.loading {
            return Access::Checking;
        }
        match state.user() {
            None => Access::Denied,
            Some(user) if state.is_admin => Access::Granted(user.clone()),
            Some(user) => Access::Forbidden(user.clone()),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AuthSession;
    use chrono::{Duration, Utc};

    fn session() -> AuthSession {
        AuthSession {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: "u1".into(),
                email: Some("admin@brand.com".into()),
            },
        }
    }

    #[test]
    fn test_loading_is_checking() {
        let state = AuthState {
            loading: true,
            session: None,
            is_admin: false,
        };
        assert_eq!(Access::evaluate(&state), Access::Checking);
    }

    #[test]
    fn test_no_session_is_denied() {
        let state = AuthState {
            loading: false,
            session: None,
            is_admin: false,
        };
        assert_eq!(Access::evaluate(&state), Access::Denied);
    }

    #[test]
    fn test_admin_session_is_granted() {
        let state = AuthState {
            loading: false,
            session: Some(session()),
            is_admin: true,
        };
        let access = Access::evaluate(&state);
        assert!(access.is_granted());
    }

    #[test]
    fn test_non_admin_session_is_forbidden() {
        let state = AuthState {
            loading: false,
            session: Some(session()),
            is_admin: false,
        };
        assert!(matches!(Access::evaluate(&state), Access::Forbidden(_)));
    }
}
