//! Remote authentication endpoint
//!
//! [`Authenticator`] is the seam between the session store and the network:
//! the store only sees a [`LoginGrant`] or a classified [`LoginError`].

use crate::error::LoginError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use trade_admin_core::{ApiConfig, BearerToken, Credentials, Identity};
use tracing::{debug, warn};

/// Successful login: the bearer token and who it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Issued bearer token
    pub token: BearerToken,
    /// Identity reported by the server
    pub identity: Identity,
}

/// Exchanges credentials for a bearer token
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Send credentials to the authentication endpoint
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, LoginError>;

    /// Tell the backend a token is no longer used. Best effort; never fails.
    async fn revoke(&self, _token: &BearerToken) {}
}

/// Build the shared HTTP client with the configured per-request timeout
///
/// # Errors
///
/// Returns a configuration error if the TLS backend cannot be initialised.
pub fn build_http_client(api: &ApiConfig) -> trade_admin_core::Result<Client> {
    Client::builder()
        .timeout(api.request_timeout())
        .user_agent(concat!("trade-admin/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| trade_admin_core::Error::configuration(format!("HTTP client: {e}")))
}

/// `reqwest`-backed authenticator for `POST {base_url}{login_path}`
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: Client,
    login_url: String,
    logout_url: Option<String>,
}

impl HttpAuthenticator {
    /// Create an authenticator for the configured endpoints
    pub fn new(client: Client, api: &ApiConfig) -> Self {
        Self {
            client,
            login_url: api.url(&api.login_path),
            logout_url: api.logout_path.as_deref().map(|p| api.url(p)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default, alias = "user", alias = "identity")]
    admin: Option<Identity>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success login status to the error taxonomy
///
/// Client errors mean the credentials were refused, except request timeouts
/// (transport problem) and rate limiting (not the user's fault).
pub fn classify_login_status(status: StatusCode, message: Option<String>) -> LoginError {
    match status {
        StatusCode::REQUEST_TIMEOUT => LoginError::NetworkFailure {
            message: message.unwrap_or_else(|| "request timed out".to_string()),
        },
        StatusCode::TOO_MANY_REQUESTS => LoginError::ServerError {
            status: Some(status.as_u16()),
            message: message.unwrap_or_else(|| "too many login attempts".to_string()),
        },
        s if s.is_client_error() => LoginError::InvalidCredentials { message },
        s => LoginError::ServerError {
            status: Some(s.as_u16()),
            message: message.unwrap_or_else(|| {
                s.canonical_reason().unwrap_or("unexpected status").to_string()
            }),
        },
    }
}

/// Map a transport failure to the error taxonomy
pub(crate) fn classify_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

fn grant_from_body(status: StatusCode, body: LoginBody) -> Result<LoginGrant, LoginError> {
    match body.status.as_deref() {
        None | Some("success") => {}
        Some("fail") => {
            return Err(LoginError::InvalidCredentials {
                message: body.message,
            });
        }
        Some(other) => {
            return Err(LoginError::ServerError {
                status: Some(status.as_u16()),
                message: body
                    .message
                    .unwrap_or_else(|| format!("login status '{other}'")),
            });
        }
    }

    let token = body
        .token
        .and_then(BearerToken::new)
        .ok_or_else(|| LoginError::ServerError {
            status: Some(status.as_u16()),
            message: "response did not contain a usable token".to_string(),
        })?;
    let identity = body
        .data
        .and_then(|d| d.admin)
        .ok_or_else(|| LoginError::ServerError {
            status: Some(status.as_u16()),
            message: "response did not contain the account".to_string(),
        })?;

    Ok(LoginGrant { token, identity })
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, LoginError> {
        debug!(url = %self.login_url, identifier = %credentials.identifier, "sending login request");

        let response = self
            .client
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| LoginError::NetworkFailure {
                message: classify_transport_error(&e),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LoginError::NetworkFailure {
                message: classify_transport_error(&e),
            })?;

        if !status.is_success() {
            let message = serde_json::from_str::<MessageBody>(&text)
                .ok()
                .and_then(|b| b.message);
            let err = classify_login_status(status, message);
            debug!(status = status.as_u16(), error = %err, "login refused");
            return Err(err);
        }

        let body: LoginBody =
            serde_json::from_str(&text).map_err(|e| LoginError::ServerError {
                status: Some(status.as_u16()),
                message: format!("malformed login response: {e}"),
            })?;
        grant_from_body(status, body)
    }

    async fn revoke(&self, token: &BearerToken) {
        let Some(url) = &self.logout_url else {
            return;
        };
        let result = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, token.header_value())
            .send()
            .await;
        match result {
            Ok(resp) => debug!(status = resp.status().as_u16(), "logout notified"),
            Err(e) => warn!(error = %e, "logout notification failed"),
        }
    }
}
