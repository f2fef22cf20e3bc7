//! Error types for the session layer
//!
//! Login failures and authenticated-call failures are separate enums so the
//! login view can match on [`LoginError`] without ever seeing a forced logout,
//! and page code can match on [`ApiError`] without login-only variants.

use std::io;
use thiserror::Error;

/// Failures of the durable credential storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file system error
    #[error("credential storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored value is not usable (not UTF-8, blank, ...)
    #[error("stored credential under '{key}' is corrupted: {reason}")]
    Corrupted {
        /// Storage key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Storage backend refused the operation
    #[error("credential storage unavailable: {message}")]
    Unavailable {
        /// Error message
        message: String,
    },
}

/// Outcome of a failed `login()`, discriminated so the login view can render
/// a specific message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The server rejected the credentials with a client error
    #[error("username or password incorrect")]
    InvalidCredentials {
        /// Server-provided message, if any
        message: Option<String>,
    },

    /// The request could not complete (connectivity, timeout); safe to retry
    #[error("could not reach the server: {message}")]
    NetworkFailure {
        /// Error message
        message: String,
    },

    /// The server was reachable but failed for reasons unrelated to the credentials
    #[error("the server failed to process the login{}: {message}", status_suffix(.status))]
    ServerError {
        /// HTTP status, when one was received
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// The token could not be persisted; the session was left unauthenticated
    #[error("could not store credentials locally: {message}")]
    StorageUnavailable {
        /// Error message
        message: String,
    },

    /// A newer login was issued (or the session was logged out) before this one resolved
    #[error("login superseded by a newer attempt")]
    Superseded,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl LoginError {
    /// Whether retrying the same credentials could succeed
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure { .. } | Self::ServerError { .. } | Self::StorageUnavailable { .. }
        )
    }
}

/// Failures of an authenticated API call
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session token is available; the caller must log in first
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend rejected the token; the session has already been logged out
    #[error("session expired or was revoked; please log in again")]
    AuthRejected,

    /// The request could not complete (connectivity, timeout)
    #[error("network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// The server answered with a non-success status
    #[error("server returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server-provided or canonical message
        message: String,
    },

    /// The server answered 2xx but flagged the operation as failed
    #[error("request rejected: {message}")]
    Rejected {
        /// Server-provided message
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("unexpected response body: {message}")]
    Decode {
        /// Error message
        message: String,
    },

    /// Client-side validation failed before any request was sent
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ApiError {
    /// Whether this error ended the session
    pub const fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected)
    }
}

/// Result type alias for authenticated API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
