//! Client-side list filtering
//!
//! Search is a case-insensitive substring match; an empty search matches
//! everything.

use crate::models::{AdminUser, PendingSubscription, TpinRequest, UserStatus, WithdrawalRequest};
use clap::ValueEnum;

/// Status filter for the users list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    /// No status filtering
    #[default]
    All,
    /// Subscription active
    Active,
    /// Subscription inactive
    Inactive,
}

impl StatusFilter {
    const fn accepts(self, status: UserStatus) -> bool {
        matches!(
            (self, status),
            (Self::All, _)
                | (Self::Active, UserStatus::Active)
                | (Self::Inactive, UserStatus::Inactive)
        )
    }
}

struct Needle(String);

impl Needle {
    fn new(search: &str) -> Self {
        Self(search.trim().to_lowercase())
    }

    fn found_in_any(&self, fields: &[&str]) -> bool {
        self.0.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&self.0))
    }
}

/// Users whose name or email matches `search` and whose status passes `status`
pub fn filter_users<'a>(
    users: &'a [AdminUser],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a AdminUser> {
    let needle = Needle::new(search);
    users
        .iter()
        .filter(|u| needle.found_in_any(&[u.name.as_str(), u.email.as_str()]) && status.accepts(u.status()))
        .collect()
}

/// Deposits whose user name, user email or payment id matches `search`
pub fn filter_deposits<'a>(
    requests: &'a [PendingSubscription],
    search: &str,
) -> Vec<&'a PendingSubscription> {
    let needle = Needle::new(search);
    requests
        .iter()
        .filter(|r| needle.found_in_any(&[
            r.user_name.as_str(),
            r.user_email.as_str(),
            r.payment_id.as_str(),
        ]))
        .collect()
}

/// TPIN requests whose name or email matches `search`
pub fn filter_tpin_requests<'a>(requests: &'a [TpinRequest], search: &str) -> Vec<&'a TpinRequest> {
    let needle = Needle::new(search);
    requests
        .iter()
        .filter(|r| needle.found_in_any(&[r.name.as_str(), r.email.as_str()]))
        .collect()
}

/// Withdrawals whose user name or email matches `search`
pub fn filter_withdrawals<'a>(
    requests: &'a [WithdrawalRequest],
    search: &str,
) -> Vec<&'a WithdrawalRequest> {
    let needle = Needle::new(search);
    requests
        .iter()
        .filter(|r| needle.found_in_any(&[r.user_name.as_str(), r.user_email.as_str()]))
        .collect()
}
