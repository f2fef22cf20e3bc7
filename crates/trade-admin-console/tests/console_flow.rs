//! End-to-end console flows against a mock admin API

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use trade_admin_console::{Console, ConsoleError, EXIT_LOGIN_REQUIRED, Route, StatusFilter};
use trade_admin_core::{ApiConfig, Config, Credentials, SessionConfig};
use trade_admin_session::{ApiError, LoginError, SessionState, Trust};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN: &str = "admin@forlife.example";

struct Harness {
    server: MockServer,
    dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> Config {
        Config {
            api: ApiConfig {
                base_url: self.server.uri(),
                logout_path: Some("/api/admin/logout".to_string()),
                request_timeout: 2,
                ..ApiConfig::default()
            },
            session: SessionConfig {
                storage_dir: self.dir.path().to_path_buf(),
                init_timeout: 1,
                ..SessionConfig::default()
            },
            ..Config::default()
        }
    }

    fn token_file(&self) -> std::path::PathBuf {
        self.dir.path().join("token")
    }

    fn store_token(&self, token: &str) {
        std::fs::write(self.token_file(), token).unwrap();
    }

    fn stored_token(&self) -> Option<String> {
        read_token(&self.token_file())
    }

    async fn console(&self) -> Console {
        let console = Console::new(self.config()).unwrap();
        console.start().await;
        console
    }

    async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .and(body_json(json!({ "email": ADMIN, "password": "s3cret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "token": "fresh-token",
                "data": { "admin": {
                    "_id": "65f0c1", "name": "Asha Admin", "email": ADMIN, "role": "admin"
                } }
            })))
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "fail",
                "message": "Incorrect email or password"
            })))
            .mount(&self.server)
            .await;
    }

    async fn requests_to(&self, wanted: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == wanted)
            .count()
    }
}

fn read_token(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn stats_body() -> Value {
    json!({
        "status": "success",
        "data": {
            "userStats": { "totalUsers": 120, "newUsers": 4, "activeSubscriptions": 80,
                           "activeTpins": 60, "pendingSubscriptions": 3, "pendingTpins": 2 },
            "financialStats": { "totalRevenue": 10500.5, "revenueInPeriod": 900.0,
                                "transactionsInPeriod": 12 },
            "mlmStats": { "totalDirectIncome": 100.0, "totalMatrixIncome": 50.0,
                          "totalSelfIncome": 25.0 },
            "chartData": { "labels": [], "datasets": {} }
        }
    })
}

fn withdrawal(id: &str) -> Value {
    json!({
        "userId": "u1",
        "withdrawalId": id,
        "userName": "Ravi",
        "userEmail": "ravi@example.com",
        "amount": 250.0,
        "requestDate": "2024-05-02T10:00:00.000Z",
        "paymentMethod": "upi",
        "paymentDetails": { "upiId": "ravi@upi" },
        "userPaymentMethods": { "upiId": "ravi@upi" }
    })
}

#[tokio::test]
async fn test_restart_with_stored_token_renders_without_login() {
    let h = Harness::new().await;
    h.store_token("abc123");
    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/stats"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let console = h.console().await;
    let state = console.store().current();
    assert_eq!(state.token().unwrap().expose(), "abc123");
    assert_eq!(state.session().unwrap().trust(), Trust::Restored);

    let page = console.dashboard().await.unwrap();
    assert!(page.contains("Total users:            120"));
    assert!(page.contains("MLM income:             $175.00"));
    assert_eq!(
        console.store().current().session().unwrap().trust(),
        Trust::Confirmed
    );
}

#[tokio::test]
async fn test_no_stored_token_redirects_protected_views() {
    let h = Harness::new().await;
    let console = h.console().await;
    assert_eq!(console.store().current(), SessionState::Unauthenticated);

    for route in [
        Route::Dashboard,
        Route::Users,
        Route::Deposits,
        Route::TpinRequests,
        Route::Withdrawals,
    ] {
        let err = console.navigate(route).await.unwrap_err();
        assert_eq!(err.exit_code(), EXIT_LOGIN_REQUIRED);
    }
    let err = console.dashboard().await.unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::LoginRequired {
            route: Route::Dashboard
        }
    ));

    assert!(console.navigate(Route::Login).await.is_ok());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_persists_token_across_restart() {
    let h = Harness::new().await;
    h.mount_login().await;

    let console = h.console().await;
    let identity = console
        .login(&Credentials::new(ADMIN, "s3cret"))
        .await
        .unwrap();
    assert_eq!(identity.name, "Asha Admin");
    assert_eq!(h.stored_token().as_deref(), Some("fresh-token"));
    assert!(console.whoami().contains("Asha Admin <admin@forlife.example>"));

    let restarted = h.console().await;
    assert_eq!(
        restarted.store().token().unwrap().expose(),
        "fresh-token"
    );
}

#[tokio::test]
async fn test_wrong_password_stores_nothing() {
    let h = Harness::new().await;
    h.mount_login().await;
    let console = h.console().await;

    let err = console
        .login(&Credentials::new(ADMIN, "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConsoleError::Login(LoginError::InvalidCredentials { .. })
    ));
    assert_eq!(err.to_string(), "login failed: username or password incorrect");
    assert_eq!(console.store().current(), SessionState::Unauthenticated);
    assert_eq!(h.stored_token(), None);
}

#[tokio::test]
async fn test_rejected_token_forces_logout_and_clears_storage() {
    let h = Harness::new().await;
    h.store_token("expired-token");
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "fail",
            "message": "jwt expired"
        })))
        .mount(&h.server)
        .await;

    let console = h.console().await;
    assert!(console.store().current().is_authenticated());

    let err = console.users("", StatusFilter::All).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Api(ApiError::AuthRejected)));
    assert_eq!(err.exit_code(), EXIT_LOGIN_REQUIRED);
    assert_eq!(console.store().current(), SessionState::Unauthenticated);
    assert_eq!(h.stored_token(), None);
    assert!(matches!(
        console.navigate(Route::Users).await,
        Err(ConsoleError::LoginRequired { .. })
    ));
}

#[tokio::test]
async fn test_verify_on_start_drops_stale_token() {
    let h = Harness::new().await;
    h.store_token("stale-token");
    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/stats"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut config = h.config();
    config.session.verify_on_start = true;
    let console = Console::new(config).unwrap();

    assert_eq!(console.start().await, SessionState::Unauthenticated);
    assert_eq!(h.stored_token(), None);
}

#[tokio::test]
async fn test_users_are_filtered_client_side() {
    let h = Harness::new().await;
    h.store_token("abc123");
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": 3,
            "data": { "users": [
                { "_id": "u1", "name": "Ravi Kumar", "email": "ravi@example.com",
                  "subscription": { "active": true, "plan": "gold" } },
                { "_id": "u2", "name": "Priya Shah", "email": "priya@trade.in",
                  "subscription": { "active": false } },
                { "_id": "u3", "name": "Arjun Rao", "email": "arjun@example.com",
                  "subscription": { "active": false } }
            ] }
        })))
        .mount(&h.server)
        .await;

    let console = h.console().await;
    let page = console.users("EXAMPLE", StatusFilter::Inactive).await.unwrap();

    assert!(page.starts_with("Users (1)"));
    assert!(page.contains("Arjun Rao"));
    assert!(!page.contains("Ravi Kumar"));
}

#[tokio::test]
async fn test_withdrawal_approval_requires_transaction_id_then_refetches() {
    let h = Harness::new().await;
    h.store_token("abc123");
    Mock::given(method("POST"))
        .and(path("/api/admin/mlm/withdrawal/approve"))
        .and(header("authorization", "Bearer abc123"))
        .and(body_json(json!({
            "userId": "u1", "withdrawalId": "w1", "transactionId": "UTR-991"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Withdrawal approved"
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/mlm/withdrawal/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "pendingWithdrawals": [withdrawal("w2")] }
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let console = h.console().await;

    let err = console
        .approve_withdrawal("u1", "w1", "   ")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Api(ApiError::Invalid {
            field: "transactionId",
            ..
        })
    ));
    assert_eq!(h.requests_to("/api/admin/mlm/withdrawal/approve").await, 0);

    let page = console
        .approve_withdrawal("u1", "w1", " UTR-991 ")
        .await
        .unwrap();
    assert!(page.starts_with("Withdrawal Requests (1)"));
    assert!(page.contains("w2"));
    assert!(!page.contains("w1 "));
}

#[tokio::test]
async fn test_deposit_and_tpin_approvals_send_ids() {
    let h = Harness::new().await;
    h.store_token("abc123");
    Mock::given(method("POST"))
        .and(path("/api/admin/subscriptions/approve"))
        .and(body_json(json!({ "userId": "u1", "paymentId": "pay_1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/subscriptions/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "pendingRequests": [] }
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/tpin/approve"))
        .and(body_json(json!({ "userId": "u9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "TPIN already active"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let console = h.console().await;

    let page = console.approve_deposit("u1", "pay_1").await.unwrap();
    assert!(page.ends_with("No pending deposits."));

    let err = console.approve_tpin("u9").await.unwrap_err();
    assert_eq!(err.to_string(), "request rejected: TPIN already active");
    assert!(console.store().current().is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_storage_and_notifies_backend() {
    let h = Harness::new().await;
    h.store_token("abc123");
    Mock::given(method("POST"))
        .and(path("/api/admin/logout"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    let console = h.console().await;
    console.logout().await;

    assert_eq!(console.store().current(), SessionState::Unauthenticated);
    assert_eq!(h.stored_token(), None);

    let mut notified = 0;
    for _ in 0..40 {
        notified = h.requests_to("/api/admin/logout").await;
        if notified > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(notified, 1);

    // A second logout is a no-op.
    console.logout().await;
    assert_eq!(console.store().current(), SessionState::Unauthenticated);
}
