//! Admin API payloads
//!
//! Field names follow the backend's camelCase JSON. Fields the console does
//! not rely on are defaulted so a sparse record still decodes.

use serde::{Deserialize, Serialize};

/// `GET /api/admin/dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub user_stats: UserStats,
    pub financial_stats: FinancialStats,
    pub mlm_stats: MlmStats,
    pub chart_data: ChartData,
}

/// User counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_users: u64,
    pub new_users: u64,
    pub active_subscriptions: u64,
    pub active_tpins: u64,
    pub pending_subscriptions: u64,
    pub pending_tpins: u64,
}

/// Revenue and withdrawal totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialStats {
    pub total_revenue: f64,
    pub revenue_in_period: f64,
    pub transactions_in_period: u64,
    pub total_withdrawals: WithdrawalTotals,
}

/// Withdrawal totals by status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalTotals {
    pub pending: AmountCount,
    pub approved: AmountCount,
    pub rejected: AmountCount,
}

/// Sum and count of a group of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmountCount {
    pub total_amount: f64,
    pub count: u64,
}

/// Referral network totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MlmStats {
    pub active_referrers: u64,
    pub total_team_size: u64,
    pub total_direct_income: f64,
    pub total_matrix_income: f64,
    pub total_self_income: f64,
    pub total_rank_rewards: f64,
    pub active_trading_packages: u64,
    pub rank_distribution: Vec<RankCount>,
}

impl MlmStats {
    /// Direct, matrix and self income combined
    pub fn total_income(&self) -> f64 {
        self.total_direct_income + self.total_matrix_income + self.total_self_income
    }
}

/// Number of users holding a rank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankCount {
    #[serde(rename = "_id")]
    pub rank: String,
    pub count: u64,
}

/// Daily series for the dashboard chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: ChartDatasets,
}

/// Values aligned with [`ChartData::labels`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartDatasets {
    pub new_users: Vec<f64>,
    pub revenue: Vec<f64>,
    pub withdrawals: Vec<f64>,
}

/// Subscription state of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    pub active: bool,
    pub plan: Option<String>,
    pub expiry_date: Option<String>,
}

/// Transaction PIN state of an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tpin {
    pub active: bool,
    pub request_date: Option<String>,
}

/// Proof of payment attached to a subscription request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentProof {
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub screenshot: String,
    pub date: String,
}

/// Entry of `GET /api/admin/users`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub subscription: Subscription,
    pub tpin: Tpin,
    pub payment_details: Vec<PaymentProof>,
    pub created_at: String,
    pub updated_at: String,
}

/// Account status as shown in the users list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
}

impl AdminUser {
    /// Active when the subscription is active
    pub const fn status(&self) -> UserStatus {
        if self.subscription.active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UsersData {
    pub users: Vec<AdminUser>,
}

/// Entry of `GET /api/admin/subscriptions/pending`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingSubscription {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub payment_id: String,
    pub payment_details: PaymentProof,
    pub subscription_plan: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PendingRequestsData<T> {
    #[serde(default = "Vec::new")]
    pub pending_requests: Vec<T>,
}

/// Entry of `GET /api/admin/tpin/pending`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TpinRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub subscription: Subscription,
    pub tpin: Tpin,
}

/// Bank account a withdrawal can be paid to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub account_number: String,
    pub ifsc_code: String,
    pub account_holder_name: String,
    pub bank_name: String,
}

/// Where a withdrawal should be paid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayoutDetails {
    pub upi_id: Option<String>,
    pub bank_details: Option<BankDetails>,
}

/// Entry of `GET /api/admin/mlm/withdrawal/pending`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WithdrawalRequest {
    pub user_id: String,
    pub withdrawal_id: String,
    pub user_name: String,
    pub user_email: String,
    pub amount: f64,
    pub request_date: String,
    pub payment_method: String,
    pub payment_details: PayoutDetails,
    pub user_payment_methods: PayoutDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PendingWithdrawalsData {
    pub pending_withdrawals: Vec<WithdrawalRequest>,
}

/// Body of `POST /api/admin/subscriptions/approve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionApproval {
    pub user_id: String,
    pub payment_id: String,
}

/// Body of `POST /api/admin/tpin/approve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TpinApproval {
    pub user_id: String,
}

/// Body of `POST /api/admin/mlm/withdrawal/approve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalApproval {
    pub user_id: String,
    pub withdrawal_id: String,
    pub transaction_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_dashboard_stats_decode() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "userStats": { "totalUsers": 120, "newUsers": 4, "activeSubscriptions": 80,
                           "activeTpins": 60, "pendingSubscriptions": 3, "pendingTpins": 2 },
            "financialStats": {
                "totalRevenue": 10500.5, "revenueInPeriod": 900.0, "transactionsInPeriod": 12,
                "totalWithdrawals": {
                    "pending": { "totalAmount": 300.0, "count": 2 },
                    "approved": { "totalAmount": 1200.0, "count": 9 },
                    "rejected": { "totalAmount": 0.0, "count": 0 }
                }
            },
            "mlmStats": { "activeReferrers": 40, "totalTeamSize": 300, "totalDirectIncome": 100.0,
                          "totalMatrixIncome": 50.0, "totalSelfIncome": 25.0, "totalRankRewards": 5.0,
                          "activeTradingPackages": 7,
                          "rankDistribution": [{ "_id": "gold", "count": 5 }] },
            "chartData": { "labels": ["2024-05-01"],
                           "datasets": { "newUsers": [4], "revenue": [900.0], "withdrawals": [0] } }
        }))
        .unwrap();

        assert_eq!(stats.user_stats.total_users, 120);
        assert_eq!(stats.financial_stats.total_withdrawals.approved.count, 9);
        assert_eq!(stats.mlm_stats.rank_distribution[0].rank, "gold");
        assert_eq!(stats.mlm_stats.total_income(), 175.0);
        assert_eq!(stats.chart_data.datasets.revenue, vec![900.0]);
    }

    #[test]
    fn test_sparse_user_decodes_with_defaults() {
        let user: AdminUser = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Ravi",
            "email": "ravi@example.com",
            "subscription": { "active": true, "plan": null, "expiryDate": null },
            "rank": "silver",
            "teamSize": 3
        }))
        .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.status(), UserStatus::Active);
        assert!(user.payment_details.is_empty());
        assert!(!user.tpin.active);
    }

    #[test]
    fn test_withdrawal_decode_with_bank_details() {
        let w: WithdrawalRequest = serde_json::from_value(json!({
            "userId": "u1",
            "withdrawalId": "w1",
            "userName": "Ravi",
            "userEmail": "ravi@example.com",
            "amount": 250.0,
            "requestDate": "2024-05-02T10:00:00Z",
            "paymentMethod": "bank",
            "paymentDetails": {
                "bankDetails": { "accountNumber": "0001", "ifscCode": "SBIN0001",
                                 "accountHolderName": "Ravi", "bankName": "SBI" }
            },
            "userPaymentMethods": { "upiId": null }
        }))
        .unwrap();

        assert_eq!(w.payment_details.bank_details.unwrap().ifsc_code, "SBIN0001");
        assert_eq!(w.user_payment_methods.upi_id, None);
    }

    #[test]
    fn test_approval_bodies_are_camel_case() {
        let body = serde_json::to_value(WithdrawalApproval {
            user_id: "u1".to_string(),
            withdrawal_id: "w1".to_string(),
            transaction_id: "UTR123".to_string(),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "userId": "u1", "withdrawalId": "w1", "transactionId": "UTR123" })
        );
    }
}
