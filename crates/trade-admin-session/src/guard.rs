//! Route guard
//!
//! Decides, before a view renders, whether the view may render or the user
//! must be sent to the login view.

use crate::state::SessionState;
use crate::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A navigation target the guard can reason about
pub trait Guarded {
    /// Whether rendering requires an authenticated session
    fn requires_session(&self) -> bool;
}

/// Outcome of evaluating a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still initialising; render a loading indicator
    Checking,
    /// Render the requested view
    Render,
    /// Replace the navigation with the login view
    RedirectToLogin,
}

/// Pure decision function over a target and a state
pub fn decide(target: &impl Guarded, state: &SessionState) -> GuardDecision {
    if !target.requires_session() {
        return GuardDecision::Render;
    }
    match state {
        SessionState::Uninitialized => GuardDecision::Checking,
        SessionState::Unauthenticated => GuardDecision::RedirectToLogin,
        SessionState::Authenticated(_) => GuardDecision::Render,
    }
}

/// Guard bound to a session store
#[derive(Debug, Clone)]
pub struct RouteGuard {
    store: Arc<SessionStore>,
    timeout: Duration,
}

impl RouteGuard {
    /// Create a guard that waits at most `timeout` for the store to settle
    pub const fn new(store: Arc<SessionStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Evaluate against the current state without waiting
    pub fn evaluate(&self, target: &impl Guarded) -> GuardDecision {
        decide(target, &self.store.current())
    }

    /// Evaluate, waiting for initialisation to settle if necessary
    ///
    /// Never returns [`GuardDecision::Checking`]: a store that has not
    /// settled within the timeout resolves to a redirect.
    pub async fn resolve(&self, target: &impl Guarded) -> GuardDecision {
        if !target.requires_session() {
            return GuardDecision::Render;
        }

        let mut rx = self.store.subscribe();
        let settled = tokio::time::timeout(self.timeout, rx.wait_for(SessionState::is_settled)).await;

        let decision = match settled {
            Ok(Ok(state)) => decide(target, &state),
            Ok(Err(_)) => GuardDecision::RedirectToLogin,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis(),
                    "session did not settle in time; redirecting to login"
                );
                GuardDecision::RedirectToLogin
            }
        };
        debug!(?decision, "guard resolved");
        decision
    }
}
