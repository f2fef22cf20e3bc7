//! Typed client for the admin API
//!
//! Every call goes through [`AuthorizedClient`], so a rejected token ends the
//! session no matter which page made the call.

use crate::models::{
    AdminUser, DashboardStats, PendingRequestsData, PendingSubscription, PendingWithdrawalsData,
    SubscriptionApproval, TpinApproval, TpinRequest, UsersData, WithdrawalApproval,
    WithdrawalRequest,
};
use serde_json::Value;
use trade_admin_session::{ApiError, ApiResult, AuthorizedClient};
use tracing::{debug, info};

const DASHBOARD_STATS: &str = "/api/admin/dashboard/stats";
const USERS: &str = "/api/admin/users";
const SUBSCRIPTIONS_PENDING: &str = "/api/admin/subscriptions/pending";
const SUBSCRIPTIONS_APPROVE: &str = "/api/admin/subscriptions/approve";
const TPIN_PENDING: &str = "/api/admin/tpin/pending";
const TPIN_APPROVE: &str = "/api/admin/tpin/approve";
const WITHDRAWALS_PENDING: &str = "/api/admin/mlm/withdrawal/pending";
const WITHDRAWALS_APPROVE: &str = "/api/admin/mlm/withdrawal/approve";

/// API client for the admin dashboard endpoints
#[derive(Debug, Clone)]
pub struct AdminApiClient {
    http: AuthorizedClient,
}

impl AdminApiClient {
    /// Create a new API client
    pub const fn new(http: AuthorizedClient) -> Self {
        Self { http }
    }

    /// Underlying authenticated client
    pub const fn http(&self) -> &AuthorizedClient {
        &self.http
    }

    /// Headline statistics for the dashboard
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.http.get(DASHBOARD_STATS).await?.into_data()
    }

    /// Every registered account
    pub async fn users(&self) -> ApiResult<Vec<AdminUser>> {
        let data: UsersData = self.http.get(USERS).await?.into_data()?;
        debug!(count = data.users.len(), "fetched users");
        Ok(data.users)
    }

    /// Subscription payments awaiting approval
    pub async fn pending_subscriptions(&self) -> ApiResult<Vec<PendingSubscription>> {
        let data: PendingRequestsData<PendingSubscription> =
            self.http.get(SUBSCRIPTIONS_PENDING).await?.into_data()?;
        Ok(data.pending_requests)
    }

    /// Approve a subscription payment and return the refreshed pending list
    pub async fn approve_subscription(
        &self,
        user_id: &str,
        payment_id: &str,
    ) -> ApiResult<Vec<PendingSubscription>> {
        let body = SubscriptionApproval {
            user_id: required("userId", user_id)?,
            payment_id: required("paymentId", payment_id)?,
        };
        self.http
            .post::<_, Value>(SUBSCRIPTIONS_APPROVE, &body)
            .await?;
        info!(user_id = %body.user_id, payment_id = %body.payment_id, "subscription approved");
        self.pending_subscriptions().await
    }

    /// Transaction PIN activations awaiting approval
    pub async fn pending_tpin_requests(&self) -> ApiResult<Vec<TpinRequest>> {
        let data: PendingRequestsData<TpinRequest> =
            self.http.get(TPIN_PENDING).await?.into_data()?;
        Ok(data.pending_requests)
    }

    /// Approve a TPIN activation and return the refreshed pending list
    pub async fn approve_tpin(&self, user_id: &str) -> ApiResult<Vec<TpinRequest>> {
        let body = TpinApproval {
            user_id: required("userId", user_id)?,
        };
        self.http.post::<_, Value>(TPIN_APPROVE, &body).await?;
        info!(user_id = %body.user_id, "TPIN approved");
        self.pending_tpin_requests().await
    }

    /// Withdrawals awaiting payout
    pub async fn pending_withdrawals(&self) -> ApiResult<Vec<WithdrawalRequest>> {
        let data: PendingWithdrawalsData = self.http.get(WITHDRAWALS_PENDING).await?.into_data()?;
        Ok(data.pending_withdrawals)
    }

    /// Record the payout of a withdrawal and return the refreshed pending list
    ///
    /// `transaction_id` is the reference of the bank or UPI transfer and must
    /// not be blank; nothing is sent if it is.
    pub async fn approve_withdrawal(
        &self,
        user_id: &str,
        withdrawal_id: &str,
        transaction_id: &str,
    ) -> ApiResult<Vec<WithdrawalRequest>> {
        let body = WithdrawalApproval {
            user_id: required("userId", user_id)?,
            withdrawal_id: required("withdrawalId", withdrawal_id)?,
            transaction_id: required("transactionId", transaction_id)?,
        };
        self.http
            .post::<_, Value>(WITHDRAWALS_APPROVE, &body)
            .await?;
        info!(
            user_id = %body.user_id,
            withdrawal_id = %body.withdrawal_id,
            transaction_id = %body.transaction_id,
            "withdrawal approved"
        );
        self.pending_withdrawals().await
    }
}

fn required(field: &'static str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Invalid {
            field,
            message: "must not be blank".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
