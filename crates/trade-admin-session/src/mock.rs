//! Mock authenticator for testing

use crate::auth::{Authenticator, LoginGrant};
use crate::error::LoginError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::{oneshot, watch};
use trade_admin_core::{BearerToken, Credentials, Identity};

type Reply = oneshot::Sender<Result<LoginGrant, LoginError>>;

/// In-process authenticator with a fixed account table
///
/// In held mode every `authenticate` call parks until the test releases it,
/// which lets tests decide the order in which concurrent logins resolve.
#[derive(Debug)]
pub struct MockAuthenticator {
    accounts: Mutex<HashMap<String, (String, Identity, String)>>,
    failure: Option<LoginError>,
    held: bool,
    pending: Mutex<HashMap<String, Reply>>,
    calls: watch::Sender<usize>,
    revoked: Mutex<Vec<BearerToken>>,
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthenticator {
    /// Create a mock with no accounts
    pub fn new() -> Self {
        let (calls, _) = watch::channel(0);
        Self {
            accounts: Mutex::new(HashMap::new()),
            failure: None,
            held: false,
            pending: Mutex::new(HashMap::new()),
            calls,
            revoked: Mutex::new(Vec::new()),
        }
    }

    /// Register an account that logs in with `secret` and receives `token`
    #[must_use]
    pub fn with_account(
        self,
        identity: Identity,
        secret: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.accounts
            .lock()
            .insert(identity.email.clone(), (secret.into(), identity, token.into()));
        self
    }

    /// Fail every call with `error`
    #[must_use]
    pub fn with_failure(mut self, error: LoginError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Park every call until [`MockAuthenticator::release`] is called
    #[must_use]
    pub const fn held(mut self) -> Self {
        self.held = true;
        self
    }

    /// Resolve the parked call for `identifier` using the account table
    ///
    /// Returns `false` if no call for `identifier` is parked.
    pub fn release(&self, identifier: &str) -> bool {
        let outcome = self.lookup(identifier, None);
        self.release_with(identifier, outcome)
    }

    /// Resolve the parked call for `identifier` with an explicit outcome
    pub fn release_with(&self, identifier: &str, outcome: Result<LoginGrant, LoginError>) -> bool {
        self.pending
            .lock()
            .remove(identifier)
            .is_some_and(|reply| reply.send(outcome).is_ok())
    }

    /// Wait until at least `n` calls have been received
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.calls.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// Number of `authenticate` calls received
    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }

    /// Tokens passed to `revoke`
    pub fn revoked(&self) -> Vec<BearerToken> {
        self.revoked.lock().clone()
    }

    fn lookup(&self, identifier: &str, secret: Option<&str>) -> Result<LoginGrant, LoginError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let accounts = self.accounts.lock();
        let invalid = || LoginError::InvalidCredentials {
            message: Some("Incorrect email or password".to_string()),
        };
        let (expected, identity, token) = accounts.get(identifier).ok_or_else(invalid)?;
        if secret.is_some_and(|s| s != expected) {
            return Err(invalid());
        }
        let token = BearerToken::new(token.clone()).ok_or_else(|| LoginError::ServerError {
            status: None,
            message: "mock account has a blank token".to_string(),
        })?;
        Ok(LoginGrant {
            token,
            identity: identity.clone(),
        })
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, LoginError> {
        if self.held {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().insert(credentials.identifier.clone(), tx);
            self.calls.send_modify(|n| *n += 1);
            return rx.await.unwrap_or_else(|_| {
                Err(LoginError::NetworkFailure {
                    message: "mock call dropped".to_string(),
                })
            });
        }

        self.calls.send_modify(|n| *n += 1);
        self.lookup(&credentials.identifier, Some(&credentials.secret))
    }

    async fn revoke(&self, token: &BearerToken) {
        self.revoked.lock().push(token.clone());
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
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_checks_secret() {
        let mock = MockAuthenticator::new().with_account(identity(), "right", "tok");

        let ok = mock
            .authenticate(&Credentials::new("admin@example.com", "right"))
            .await
            .unwrap();
        assert_eq!(ok.token.expose(), "tok");

        let err = mock
            .authenticate(&Credentials::new("admin@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials { .. }));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_held_release() {
        let mock = std::sync::Arc::new(
            MockAuthenticator::new()
                .with_account(identity(), "right", "tok")
                .held(),
        );

        let task = {
            let mock = std::sync::Arc::clone(&mock);
            tokio::spawn(async move {
                mock.authenticate(&Credentials::new("admin@example.com", "right"))
                    .await
            })
        };

        mock.wait_for_calls(1).await;
        assert!(mock.release("admin@example.com"));
        assert!(task.await.unwrap().is_ok());
        assert!(!mock.release("admin@example.com"));
    }
}
