//! In-memory session state

use trade_admin_core::{BearerToken, Identity};

/// How far a session's token has been vouched for by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Restored from durable storage, not yet used successfully
    Restored,
    /// Issued by a login in this process, or accepted by an authenticated call
    Confirmed,
}

/// An authenticated session
///
/// The identity can only exist inside a session, so "identity without
/// token" is unrepresentable. A restored session has a token but no identity
/// until the user logs in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: BearerToken,
    identity: Option<Identity>,
    trust: Trust,
}

impl Session {
    /// Session created by a successful login
    pub const fn confirmed(token: BearerToken, identity: Identity) -> Self {
        Self {
            token,
            identity: Some(identity),
            trust: Trust::Confirmed,
        }
    }

    /// Session rebuilt from a stored token
    pub const fn restored(token: BearerToken) -> Self {
        Self {
            token,
            identity: None,
            trust: Trust::Restored,
        }
    }

    /// Bearer token to attach to outbound requests
    pub const fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Identity reported at login, if this process performed the login
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Trust level
    pub const fn trust(&self) -> Trust {
        self.trust
    }

    pub(crate) fn confirm(&mut self) {
        self.trust = Trust::Confirmed;
    }
}

/// Session store state machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize()` has not settled yet
    #[default]
    Uninitialized,
    /// Nobody is logged in
    Unauthenticated,
    /// A token is held
    Authenticated(Session),
}

impl SessionState {
    /// Whether `initialize()` has settled
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    /// Whether a token is held
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Current session, if any
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Current token, if any
    pub fn token(&self) -> Option<&BearerToken> {
        self.session().map(Session::token)
    }

    /// Current identity, if known
    pub fn identity(&self) -> Option<&Identity> {
        self.session().and_then(Session::identity)
    }

    /// Short label for logs and `whoami`
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(Session {
                trust: Trust::Restored,
                ..
            }) => "authenticated (restored)",
            Self::Authenticated(Session {
                trust: Trust::Confirmed,
                ..
            }) => "authenticated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn identity() -> Identity {
        Identity {
            id: "1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_default_is_uninitialized() {
        let state = SessionState::default();
        assert!(!state.is_settled());
        assert!(state.token().is_none());
        assert_eq!(state.label(), "uninitialized");
    }

    #[test]
    fn test_restored_session_has_token_only() {
        let state =
            SessionState::Authenticated(Session::restored(BearerToken::new("abc123").unwrap()));

        assert!(state.is_authenticated());
        assert_eq!(state.token().unwrap().expose(), "abc123");
        assert!(state.identity().is_none());
        assert_eq!(state.label(), "authenticated (restored)");
    }

    #[test]
    fn test_confirmed_session_pairs_identity_and_token() {
        let state = SessionState::Authenticated(Session::confirmed(
            BearerToken::new("tok").unwrap(),
            identity(),
        ));

        assert_eq!(state.identity().unwrap().name, "Asha");
        assert_eq!(state.session().unwrap().trust(), Trust::Confirmed);
    }

    #[test]
    fn test_confirm_promotes_restored() {
        let mut session = Session::restored(BearerToken::new("tok").unwrap());
        session.confirm();
        assert_eq!(session.trust(), Trust::Confirmed);
        assert!(session.identity().is_none());
    }
}
