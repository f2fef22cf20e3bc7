//! trade-admin console
//!
//! Command-line admin console for the trading platform. Pages are guarded by
//! the session layer; every API call carries the session's bearer token.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod api_client;
pub mod app;
pub mod error;
pub mod filters;
#[allow(missing_docs)]
pub mod models;
pub mod routes;
pub mod views;

pub use api_client::AdminApiClient;
pub use app::Console;
pub use error::{ConsoleError, EXIT_LOGIN_REQUIRED, Result};
pub use filters::StatusFilter;
pub use routes::Route;
