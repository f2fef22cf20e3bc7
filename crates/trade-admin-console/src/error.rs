//! Error types for the console

use crate::routes::Route;
use thiserror::Error;
use trade_admin_session::{ApiError, LoginError};

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Exit status when a page needs a session and none is available
pub const EXIT_LOGIN_REQUIRED: u8 = 3;

/// Errors surfaced to the console user
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Configuration or setup failure
    #[error(transparent)]
    Core(#[from] trade_admin_core::Error),

    /// Login failed
    #[error("login failed: {0}")]
    Login(#[from] LoginError),

    /// An authenticated call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The guard redirected the navigation to the login view
    #[error("please log in to view {route}")]
    LoginRequired {
        /// Route that was requested
        route: Route,
    },

    /// Bad command-line input
    #[error("{message}")]
    Input {
        /// Error message
        message: String,
    },
}

impl ConsoleError {
    /// Create a new input error
    #[must_use]
    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Process exit status for this error
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::LoginRequired { .. } | Self::Api(ApiError::AuthRejected | ApiError::NotAuthenticated) => {
                EXIT_LOGIN_REQUIRED
            }
            Self::Input { .. } => 2,
            _ => 1,
        }
    }
}
