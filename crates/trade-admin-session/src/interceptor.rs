//! Authenticated request path
//!
//! Every call that needs a session goes through [`AuthorizedClient`], which
//! attaches the bearer token and is the only place where a `401` turns into
//! a forced logout.

use crate::auth::classify_transport_error;
use crate::error::{ApiError, ApiResult};
use crate::store::SessionStore;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trade_admin_core::{ApiConfig, BearerToken};
use tracing::{debug, warn};

/// Standard response wrapper used by the admin API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope<T> {
    /// `"success"` or a failure marker such as `"fail"`
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Number of items in list responses
    #[serde(default)]
    pub results: Option<u64>,
    /// Payload
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the server flagged the operation as successful
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "success")
    }

    /// Take the payload, failing if the server omitted it
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when `data` is absent.
    pub fn into_data(self) -> ApiResult<T> {
        self.data.ok_or_else(|| ApiError::Decode {
            message: "response has no data".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client bound to the session store
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    client: Client,
    api: ApiConfig,
    store: Arc<SessionStore>,
}

impl AuthorizedClient {
    /// Create a client that reads its token from `store`
    pub const fn new(client: Client, api: ApiConfig, store: Arc<SessionStore>) -> Self {
        Self { client, api, store }
    }

    /// Session store this client reports to
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// `GET {base_url}{path}`
    ///
    /// # Errors
    ///
    /// See [`ApiError`]; [`ApiError::AuthRejected`] means the session has
    /// already been ended.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Envelope<T>> {
        self.execute::<(), T>(Method::GET, path, None).await
    }

    /// `POST {base_url}{path}` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`AuthorizedClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<Envelope<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Envelope<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.store.token().ok_or(ApiError::NotAuthenticated)?;
        let url = self.api.url(path);
        debug!(%method, %url, token = %token, "authenticated request");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::AUTHORIZATION, token.header_value());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Network {
            message: classify_transport_error(&e),
        })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(self.forced_logout(&token, &url).await);
        }

        let text = response.text().await.map_err(|e| ApiError::Network {
            message: classify_transport_error(&e),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<MessageBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            debug!(status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        self.store.confirm_token(&token);

        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })?;
        if !envelope.is_success() {
            let message = envelope
                .message
                .unwrap_or_else(|| "operation failed".to_string());
            debug!(%message, "request rejected by server");
            return Err(ApiError::Rejected { message });
        }
        Ok(envelope)
    }

    async fn forced_logout(&self, token: &BearerToken, url: &str) -> ApiError {
        warn!(%url, token = %token, "server rejected the session token");
        if self.store.reject_token(token).await {
            ApiError::AuthRejected
        } else {
            // The session moved on to another token while this call was in flight.
            ApiError::Http {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                message: "token was replaced during the request".to_string(),
            }
        }
    }
}
