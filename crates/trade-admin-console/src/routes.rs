//! Console navigation targets

use std::fmt;
use std::str::FromStr;
use trade_admin_session::Guarded;

/// A view of the admin console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Credential form
    Login,
    /// Headline statistics
    Dashboard,
    /// Registered accounts
    Users,
    /// Pending subscription payments
    Deposits,
    /// Pending transaction PIN activations
    TpinRequests,
    /// Pending withdrawals
    Withdrawals,
}

impl Route {
    /// Every route, in navigation order
    pub const ALL: [Self; 6] = [
        Self::Login,
        Self::Dashboard,
        Self::Users,
        Self::Deposits,
        Self::TpinRequests,
        Self::Withdrawals,
    ];

    /// URL-style path
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::Deposits => "/deposits",
            Self::TpinRequests => "/tpin-requests",
            Self::Withdrawals => "/withdrawals",
        }
    }

    /// Heading shown above the view
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Admin Login",
            Self::Dashboard => "Dashboard",
            Self::Users => "Users",
            Self::Deposits => "Deposit Requests",
            Self::TpinRequests => "TPIN Requests",
            Self::Withdrawals => "Withdrawal Requests",
        }
    }

    /// Resolve a path; `/` lands on the dashboard
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Self::Dashboard);
        }
        Self::ALL.into_iter().find(|r| r.path() == trimmed)
    }
}

impl Guarded for Route {
    fn requires_session(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = if s.starts_with('/') {
            s.to_string()
        } else {
            format!("/{s}")
        };
        Self::from_path(&path).ok_or_else(|| format!("unknown route '{s}'"))
    }
}
