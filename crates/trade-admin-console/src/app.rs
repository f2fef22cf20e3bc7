//! Console wiring
//!
//! Builds the session stack from configuration and exposes one method per
//! view. Every view goes through the route guard before touching the API.

use crate::api_client::AdminApiClient;
use crate::error::{ConsoleError, Result};
use crate::filters::{
    StatusFilter, filter_deposits, filter_tpin_requests, filter_users, filter_withdrawals,
};
use crate::routes::Route;
use crate::views;
use std::sync::Arc;
use std::time::Duration;
use trade_admin_core::{Config, Credentials, Identity};
use trade_admin_session::{
    ApiError, AuthorizedClient, CredentialStorage, FileCredentialStorage, GuardDecision,
    HttpAuthenticator, RouteGuard, SessionState, SessionStore, Trust, build_http_client,
};
use tracing::{debug, info, warn};

/// Extra time the guard allows on top of the storage read timeout
const GUARD_GRACE: Duration = Duration::from_secs(1);

/// The admin console: session store, guard and API client
#[derive(Debug)]
pub struct Console {
    config: Config,
    store: Arc<SessionStore>,
    guard: RouteGuard,
    api: AdminApiClient,
}

impl Console {
    /// Build a console that keeps its token under `session.storage_dir`
    pub fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(FileCredentialStorage::new(&config.session.storage_dir));
        Self::with_storage(config, storage)
    }

    /// Build a console over an explicit storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn CredentialStorage>) -> Result<Self> {
        config.validate()?;
        let client = build_http_client(&config.api)?;
        let authenticator = Arc::new(HttpAuthenticator::new(client.clone(), &config.api));
        let store = Arc::new(SessionStore::new(
            storage,
            authenticator,
            &config.session,
        ));
        let guard = RouteGuard::new(
            Arc::clone(&store),
            config.session.init_timeout() + GUARD_GRACE,
        );
        let api = AdminApiClient::new(AuthorizedClient::new(
            client,
            config.api.clone(),
            Arc::clone(&store),
        ));

        Ok(Self {
            config,
            store,
            guard,
            api,
        })
    }

    /// Resolved configuration
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Session store
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Admin API client
    pub const fn api(&self) -> &AdminApiClient {
        &self.api
    }

    /// Restore the session, optionally checking a restored token right away
    pub async fn start(&self) -> SessionState {
        let state = self.store.initialize().await;
        let restored = state
            .session()
            .is_some_and(|s| s.trust() == Trust::Restored);

        if restored && self.config.session.verify_on_start {
            debug!("verifying restored token");
            match self.api.dashboard_stats().await {
                Ok(_) => info!("restored token verified"),
                Err(ApiError::AuthRejected) => info!("restored token was rejected"),
                Err(e) => warn!(error = %e, "could not verify restored token"),
            }
            return self.store.current();
        }
        state
    }

    /// Pass `route` through the guard
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::LoginRequired`] when the guard redirects.
    pub async fn navigate(&self, route: Route) -> Result<()> {
        match self.guard.resolve(&route).await {
            GuardDecision::Render => {
                debug!(%route, "rendering");
                Ok(())
            }
            GuardDecision::RedirectToLogin | GuardDecision::Checking => {
                info!(%route, "redirecting to login");
                Err(ConsoleError::LoginRequired { route })
            }
        }
    }

    /// Log in and persist the token
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        Ok(self.store.login(credentials).await?)
    }

    /// Log out; never fails
    pub async fn logout(&self) {
        self.store.logout().await;
    }

    /// Current session summary
    pub fn whoami(&self) -> String {
        views::render_session(&self.store.current())
    }

    /// Dashboard view
    pub async fn dashboard(&self) -> Result<String> {
        self.navigate(Route::Dashboard).await?;
        let stats = self.api.dashboard_stats().await?;
        Ok(views::render_dashboard(&stats))
    }

    /// Users view
    pub async fn users(&self, search: &str, status: StatusFilter) -> Result<String> {
        self.navigate(Route::Users).await?;
        let users = self.api.users().await?;
        Ok(views::render_users(&filter_users(&users, search, status)))
    }

    /// Pending deposits view
    pub async fn deposits(&self, search: &str) -> Result<String> {
        self.navigate(Route::Deposits).await?;
        let requests = self.api.pending_subscriptions().await?;
        Ok(views::render_deposits(&filter_deposits(&requests, search)))
    }

    /// Approve a deposit and show what is still pending
    pub async fn approve_deposit(&self, user_id: &str, payment_id: &str) -> Result<String> {
        self.navigate(Route::Deposits).await?;
        let remaining = self.api.approve_subscription(user_id, payment_id).await?;
        Ok(views::render_deposits(&filter_deposits(&remaining, "")))
    }

    /// Pending TPIN view
    pub async fn tpin_requests(&self, search: &str) -> Result<String> {
        self.navigate(Route::TpinRequests).await?;
        let requests = self.api.pending_tpin_requests().await?;
        Ok(views::render_tpin_requests(&filter_tpin_requests(
            &requests, search,
        )))
    }

    /// Approve a TPIN and show what is still pending
    pub async fn approve_tpin(&self, user_id: &str) -> Result<String> {
        self.navigate(Route::TpinRequests).await?;
        let remaining = self.api.approve_tpin(user_id).await?;
        Ok(views::render_tpin_requests(&filter_tpin_requests(
            &remaining, "",
        )))
    }

    /// Pending withdrawals view
    pub async fn withdrawals(&self, search: &str) -> Result<String> {
        self.navigate(Route::Withdrawals).await?;
        let requests = self.api.pending_withdrawals().await?;
        Ok(views::render_withdrawals(&filter_withdrawals(
            &requests, search,
        )))
    }

    /// Approve a withdrawal and show what is still pending
    pub async fn approve_withdrawal(
        &self,
        user_id: &str,
        withdrawal_id: &str,
        transaction_id: &str,
    ) -> Result<String> {
        self.navigate(Route::Withdrawals).await?;
        let remaining = self
            .api
            .approve_withdrawal(user_id, withdrawal_id, transaction_id)
            .await?;
        Ok(views::render_withdrawals(&filter_withdrawals(
            &remaining, "",
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trade_admin_core::{ApiConfig, SessionConfig};
    use trade_admin_session::MemoryCredentialStorage;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                // Nothing listens here; these tests never reach the network.
                base_url: "http://127.0.0.1:9".to_string(),
                request_timeout: 1,
                ..ApiConfig::default()
            },
            session: SessionConfig {
                init_timeout: 1,
                ..SessionConfig::default()
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_protected_views_redirect_without_session() {
        let console =
            Console::with_storage(config(), Arc::new(MemoryCredentialStorage::new())).unwrap();
        assert_eq!(console.start().await, SessionState::Unauthenticated);

        let err = console.users("", StatusFilter::All).await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::LoginRequired {
                route: Route::Users
            }
        ));
        assert!(console.navigate(Route::Login).await.is_ok());
    }

    #[tokio::test]
    async fn test_restored_session_renders_and_reports_unverified() {
        let console = Console::with_storage(
            config(),
            Arc::new(MemoryCredentialStorage::with_value("token", "abc123")),
        )
        .unwrap();
        console.start().await;

        assert!(console.navigate(Route::Dashboard).await.is_ok());
        assert!(console.whoami().contains("not yet verified"));
    }

    #[tokio::test]
    async fn test_login_goes_straight_to_the_backend() {
        let console =
            Console::with_storage(config(), Arc::new(MemoryCredentialStorage::new())).unwrap();

        let err = console
            .login(&Credentials::new("admin@example.com", "s3cret"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Login(trade_admin_session::LoginError::NetworkFailure { .. })
        ));
        assert_eq!(console.store().current(), SessionState::Uninitialized);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config();
        bad.api.base_url = "ftp://example.com".to_string();

        let err = Console::with_storage(bad, Arc::new(MemoryCredentialStorage::new())).unwrap_err();
        assert!(matches!(err, ConsoleError::Core(_)));
    }
}
