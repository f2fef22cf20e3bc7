//! Session layer for the trade-admin console
//!
//! This crate owns everything about "who is logged in": durable storage of
//! the bearer token, the authentication endpoint, the session state machine,
//! the route guard that protects views, and the interceptor every
//! authenticated request passes through.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::significant_drop_tightening
)]

pub mod auth;
pub mod error;
pub mod guard;
pub mod interceptor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod state;
pub mod storage;
pub mod store;

pub use auth::{Authenticator, HttpAuthenticator, LoginGrant, build_http_client};
pub use error::{ApiError, ApiResult, LoginError, StorageError, StorageResult};
pub use guard::{GuardDecision, Guarded, RouteGuard};
pub use interceptor::{AuthorizedClient, Envelope};
pub use state::{Session, SessionState, Trust};
pub use storage::{CredentialStorage, FileCredentialStorage, MemoryCredentialStorage};
pub use store::SessionStore;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockAuthenticator;
