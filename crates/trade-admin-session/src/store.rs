//! Session store: the single owner of "who is logged in"
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel so views and the route guard
//! can read or await it without holding a lock. Only the transitions below
//! write to it:
//!
//! ```text
//! Uninitialized --initialize--> Unauthenticated | Authenticated(Restored)
//! Unauthenticated --login ok--> Authenticated(Confirmed)
//! Authenticated --logout / reject_token--> Unauthenticated
//! ```
//!
//! Every `login()` takes a sequence number before going to the network and
//! only applies its response if that number is still the latest when it
//! returns. `logout()` advances the sequence too. Memory and durable storage
//! are updated under one async mutex so they never disagree for long.

use crate::auth::Authenticator;
use crate::error::{LoginError, StorageError};
use crate::state::{Session, SessionState, Trust};
use crate::storage::CredentialStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use trade_admin_core::{BearerToken, Credentials, Identity, SessionConfig};
use tracing::{debug, info, warn};

/// Process-wide session state with an enumerated set of transitions
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn CredentialStorage>,
    authenticator: Arc<dyn Authenticator>,
    token_key: String,
    init_timeout: Duration,
    login_seq: AtomicU64,
    transition: Mutex<()>,
}

impl SessionStore {
    /// Create a store in the `Uninitialized` state
    pub fn new(
        storage: Arc<dyn CredentialStorage>,
        authenticator: Arc<dyn Authenticator>,
        config: &SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            state,
            storage,
            authenticator,
            token_key: config.token_key.clone(),
            init_timeout: config.init_timeout(),
            login_seq: AtomicU64::new(0),
            transition: Mutex::new(()),
        }
    }

    /// Pure read of the in-memory state
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current bearer token, if authenticated
    pub fn token(&self) -> Option<BearerToken> {
        self.state.borrow().token().cloned()
    }

    /// Read-only change feed
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Restore the session from durable storage
    ///
    /// Always settles: a missing, malformed, unreadable or slow record yields
    /// `Unauthenticated`. Calling it again after it settled is a no-op.
    pub async fn initialize(&self) -> SessionState {
        let _guard = self.transition.lock().await;
        if self.state.borrow().is_settled() {
            return self.current();
        }

        let next = match tokio::time::timeout(self.init_timeout, self.storage.get(&self.token_key))
            .await
        {
            Ok(Ok(Some(raw))) => match BearerToken::new(raw) {
                Some(token) => {
                    info!(token = %token, "restored session from storage");
                    SessionState::Authenticated(Session::restored(token))
                }
                None => {
                    warn!("stored token is blank or malformed; discarding it");
                    self.discard_record().await;
                    SessionState::Unauthenticated
                }
            },
            Ok(Ok(None)) => {
                debug!("no stored token");
                SessionState::Unauthenticated
            }
            Ok(Err(StorageError::Corrupted { reason, .. })) => {
                warn!(%reason, "stored token is corrupted; discarding it");
                self.discard_record().await;
                SessionState::Unauthenticated
            }
            Ok(Err(e)) => {
                warn!(error = %e, "could not read stored token");
                SessionState::Unauthenticated
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.init_timeout.as_millis(),
                    "timed out reading stored token"
                );
                SessionState::Unauthenticated
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    /// Exchange credentials for a session
    ///
    /// On success the token is persisted and the state becomes
    /// `Authenticated`. On any failure nothing is stored and the previous
    /// state is kept.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, LoginError> {
        let seq = self.login_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, identifier = %credentials.identifier, "login started");

        let outcome = self.authenticator.authenticate(credentials).await;

        let _guard = self.transition.lock().await;
        let latest = self.login_seq.load(Ordering::SeqCst);
        if latest != seq {
            debug!(seq, latest, "discarding stale login response");
            return Err(LoginError::Superseded);
        }

        let grant = outcome.inspect_err(|e| info!(seq, error = %e, "login failed"))?;

        let previous = self.state.borrow().token().cloned();
        if let Err(e) = self.storage.set(&self.token_key, grant.token.expose()).await {
            warn!(error = %e, "could not persist token; login aborted");
            return Err(LoginError::StorageUnavailable {
                message: e.to_string(),
            });
        }

        // A newer login or a logout may have started during the write.
        let latest = self.login_seq.load(Ordering::SeqCst);
        if latest != seq {
            debug!(seq, latest, "login superseded while persisting; restoring record");
            self.restore_record(previous.as_ref()).await;
            return Err(LoginError::Superseded);
        }

        info!(seq, user = %grant.identity.email, token = %grant.token, "logged in");
        let identity = grant.identity.clone();
        self.state
            .send_replace(SessionState::Authenticated(Session::confirmed(
                grant.token,
                grant.identity,
            )));
        Ok(identity)
    }

    /// Revoke access locally
    ///
    /// Never fails and never waits on the network: memory and storage are
    /// cleared first, the backend is notified from a detached task. Any login
    /// still in flight is invalidated.
    pub async fn logout(&self) {
        self.login_seq.fetch_add(1, Ordering::SeqCst);

        let _guard = self.transition.lock().await;
        let previous = self.state.send_replace(SessionState::Unauthenticated);
        self.discard_record().await;

        if let SessionState::Authenticated(session) = previous {
            info!(token = %session.token(), "logged out");
            let authenticator = Arc::clone(&self.authenticator);
            let token = session.token().clone();
            tokio::spawn(async move { authenticator.revoke(&token).await });
        }
    }

    /// Forced logout after the backend rejected `token`
    ///
    /// Only acts if `token` is still the session's token, so a late rejection
    /// of an older token cannot end a newer session. Returns whether the
    /// session was ended.
    pub async fn reject_token(&self, token: &BearerToken) -> bool {
        let _guard = self.transition.lock().await;
        let ended = self.state.send_if_modified(|state| {
            if state.token() == Some(token) {
                *state = SessionState::Unauthenticated;
                true
            } else {
                false
            }
        });

        if ended {
            warn!(token = %token, "token rejected by server; session ended");
            self.discard_record().await;
        } else {
            debug!(token = %token, "ignoring rejection of a token no longer in use");
        }
        ended
    }

    /// Record that the backend accepted `token` for an authenticated call
    pub fn confirm_token(&self, token: &BearerToken) {
        let confirmed = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session)
                if session.token() == token && session.trust() == Trust::Restored =>
            {
                session.confirm();
                true
            }
            _ => false,
        });
        if confirmed {
            debug!(token = %token, "restored token confirmed by server");
        }
    }

    async fn restore_record(&self, previous: Option<&BearerToken>) {
        let Some(token) = previous else {
            self.discard_record().await;
            return;
        };
        if let Err(e) = self.storage.set(&self.token_key, token.expose()).await {
            warn!(error = %e, "could not restore stored token");
        }
    }

    async fn discard_record(&self) {
        if let Err(e) = self.storage.remove(&self.token_key).await {
            warn!(error = %e, "could not remove stored token");
        }
    }
}
