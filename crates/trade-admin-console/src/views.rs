//! Plain-text rendering of console views

use crate::models::{
    AdminUser, DashboardStats, PendingSubscription, TpinRequest, UserStatus, WithdrawalRequest,
};
use crate::routes::Route;
use chrono::{DateTime, NaiveDate};
use trade_admin_session::{SessionState, Trust};

/// `May 2, 2024`, or the raw value when it is not a recognised date
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    if raw.is_empty() {
        "-".to_string()
    } else {
        raw.to_string()
    }
}

/// `$12,345.60`
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn heading(route: Route, count: Option<usize>) -> Vec<String> {
    let title = match count {
        Some(n) => format!("{} ({n})", route.title()),
        None => route.title().to_string(),
    };
    vec![title.clone(), "=".repeat(title.len())]
}

fn finish(mut lines: Vec<String>, empty: bool, empty_message: &str) -> String {
    if empty {
        lines.push(empty_message.to_string());
    }
    lines.join("\n")
}

/// Session summary for `whoami`
pub fn render_session(state: &SessionState) -> String {
    match state {
        SessionState::Uninitialized => "session not loaded".to_string(),
        SessionState::Unauthenticated => "not logged in".to_string(),
        SessionState::Authenticated(session) => {
            let who = session.identity().map_or_else(
                || "unknown admin (token restored from storage)".to_string(),
                |i| format!("{} <{}> role={}", i.name, i.email, i.role),
            );
            let trust = match session.trust() {
                Trust::Restored => "not yet verified",
                Trust::Confirmed => "verified",
            };
            format!(
                "logged in as {who}\ntoken {} ({trust})",
                session.token().fingerprint()
            )
        }
    }
}

/// Dashboard statistics
pub fn render_dashboard(stats: &DashboardStats) -> String {
    let u = &stats.user_stats;
    let f = &stats.financial_stats;
    let m = &stats.mlm_stats;
    let w = &f.total_withdrawals;

    let mut lines = heading(Route::Dashboard, None);
    lines.extend([
        format!("Total users:            {}", u.total_users),
        format!("New users:              {}", u.new_users),
        format!("Active subscriptions:   {}", u.active_subscriptions),
        format!("Active TPINs:           {}", u.active_tpins),
        format!("Pending subscriptions:  {}", u.pending_subscriptions),
        format!("Pending TPINs:          {}", u.pending_tpins),
        String::new(),
        format!("Total revenue:          {}", format_money(f.total_revenue)),
        format!("Revenue in period:      {}", format_money(f.revenue_in_period)),
        format!("Transactions in period: {}", f.transactions_in_period),
        format!(
            "Withdrawals pending:    {} ({})",
            format_money(w.pending.total_amount),
            w.pending.count
        ),
        format!(
            "Withdrawals approved:   {} ({})",
            format_money(w.approved.total_amount),
            w.approved.count
        ),
        format!(
            "Withdrawals rejected:   {} ({})",
            format_money(w.rejected.total_amount),
            w.rejected.count
        ),
        String::new(),
        format!("MLM income:             {}", format_money(m.total_income())),
        format!("Rank rewards:           {}", format_money(m.total_rank_rewards)),
        format!("Active referrers:       {}", m.active_referrers),
        format!("Total team size:        {}", m.total_team_size),
        format!("Trading packages:       {}", m.active_trading_packages),
    ]);

    if !m.rank_distribution.is_empty() {
        lines.push(String::new());
        lines.push("Ranks:".to_string());
        lines.extend(
            m.rank_distribution
                .iter()
                .map(|r| format!("  {:<20} {}", r.rank, r.count)),
        );
    }

    let chart = &stats.chart_data;
    if !chart.labels.is_empty() {
        lines.push(String::new());
        lines.push("Recent revenue:".to_string());
        let skip = chart.labels.len().saturating_sub(10);
        for (label, revenue) in chart
            .labels
            .iter()
            .zip(chart.datasets.revenue.iter())
            .skip(skip)
        {
            lines.push(format!("  {:<14} {}", format_date(label), format_money(*revenue)));
        }
    }

    lines.join("\n")
}

/// Users table
pub fn render_users(users: &[&AdminUser]) -> String {
    let mut lines = heading(Route::Users, Some(users.len()));
    for u in users {
        let status = match u.status() {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        };
        let plan = u.subscription.plan.as_deref().unwrap_or("-");
        let tpin = if u.tpin.active { "tpin" } else { "no-tpin" };
        lines.push(format!(
            "{:<24} {:<32} {:<8} {:<10} {:<8} joined {}",
            u.id,
            u.email,
            status,
            plan,
            tpin,
            format_date(&u.created_at)
        ));
        lines.push(format!("    {}", u.name));
    }
    finish(lines, users.is_empty(), "No users found.")
}

/// Pending subscription payments
pub fn render_deposits(requests: &[&PendingSubscription]) -> String {
    let mut lines = heading(Route::Deposits, Some(requests.len()));
    for r in requests {
        let p = &r.payment_details;
        lines.push(format!(
            "{:<24} {:<24} {:<10} {} {} on {}",
            r.user_id,
            r.payment_id,
            r.subscription_plan,
            format_money(p.amount),
            p.currency,
            format_date(&p.date)
        ));
        lines.push(format!("    {} <{}>", r.user_name, r.user_email));
    }
    finish(lines, requests.is_empty(), "No pending deposits.")
}

/// Pending TPIN activations
pub fn render_tpin_requests(requests: &[&TpinRequest]) -> String {
    let mut lines = heading(Route::TpinRequests, Some(requests.len()));
    for r in requests {
        let plan = r.subscription.plan.as_deref().unwrap_or("-");
        let requested = r.tpin.request_date.as_deref().map_or_else(|| "-".to_string(), format_date);
        lines.push(format!(
            "{:<24} {:<32} {:<10} requested {}",
            r.id, r.email, plan, requested
        ));
        lines.push(format!("    {}", r.name));
    }
    finish(lines, requests.is_empty(), "No pending TPIN requests.")
}

/// Pending withdrawals with payout details
pub fn render_withdrawals(requests: &[&WithdrawalRequest]) -> String {
    let mut lines = heading(Route::Withdrawals, Some(requests.len()));
    for r in requests {
        lines.push(format!(
            "{:<24} {:<24} {:>14} {:<6} requested {}",
            r.withdrawal_id,
            r.user_id,
            format_money(r.amount),
            r.payment_method,
            format_date(&r.request_date)
        ));
        lines.push(format!("    {} <{}>", r.user_name, r.user_email));
        if let Some(upi) = r.payment_details.upi_id.as_deref() {
            lines.push(format!("    UPI {upi}"));
        }
        if let Some(bank) = &r.payment_details.bank_details {
            lines.push(format!(
                "    {} / {} / {} / {}",
                bank.bank_name, bank.account_holder_name, bank.account_number, bank.ifsc_code
            ));
        }
    }
    if !requests.is_empty() {
        let total: f64 = requests.iter().map(|r| r.amount).sum();
        lines.push(format!("Total pending: {}", format_money(total)));
    }
    finish(lines, requests.is_empty(), "No pending withdrawals.")
}
