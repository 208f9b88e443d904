//! End-of-period reporting: date-range selection, financial and operational
//! aggregation over referrals and the ledger, and the dashboard counters.
//!
//! Period boundaries are wall-clock times in the caller's timezone; the
//! report always closes at the instant of generation (`end = now`), never at
//! a period boundary.

pub mod workbook;
pub mod zreport;

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger;
use crate::models::enums::{PaymentMethod, TransactionKind};
use crate::models::{MedicalInstitution, Referral, SafeTransaction};

/// Bucket name when a referral has no target institution.
pub const NO_INSTITUTION_LABEL: &str = "No institution selected";
/// Bucket name when the stored institution id no longer resolves.
pub const UNKNOWN_INSTITUTION_LABEL: &str = "Unknown institution";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("document error: {0}")]
    Pdf(String),
}

// ─── Period selection ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Report headline; the daily one keeps its cash-register name.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Daily => "END OF DAY REPORT (Z REPORT)",
            Self::Weekly => "WEEKLY REPORT",
            Self::Monthly => "MONTHLY REPORT",
        }
    }
}

/// Start of the selected period in wall-clock terms: today 00:00, Monday
/// 00:00 of the current week, or the first of the month 00:00.
pub fn period_start(period: ReportPeriod, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    let start_date = match period {
        ReportPeriod::Daily => today,
        ReportPeriod::Weekly => {
            let days_back = today.weekday().num_days_from_monday() as i64;
            today - Duration::days(days_back)
        }
        ReportPeriod::Monthly => today.with_day(1).unwrap_or(today),
    };
    start_date.and_time(NaiveTime::MIN)
}

// ─── Aggregation output ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PaymentBreakdown {
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PaymentStats {
    pub cash: PaymentBreakdown,
    pub pos: PaymentBreakdown,
    pub invoice: PaymentBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionStat {
    pub name: String,
    pub count: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CompanyStat {
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub period: ReportPeriod,
    /// Wall-clock range, inclusive at both ends.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Referrals dated within the range, in stored order.
    pub referrals: Vec<Referral>,
    pub total_income: f64,
    pub total_expense: f64,
    /// Derived backward: closing balance minus the period's net change.
    /// Exact only because the report always closes at `now`.
    pub opening_balance: f64,
    pub closing_balance: f64,
    pub total_referral_price: f64,
    pub total_referral_cost: f64,
    pub estimated_profit: f64,
    pub payment_stats: PaymentStats,
    /// Keyed by institution id, or `"unknown"` when absent.
    pub institution_stats: BTreeMap<String, InstitutionStat>,
    /// Keyed by the employee's company-name snapshot.
    pub company_stats: BTreeMap<String, CompanyStat>,
}

/// Aggregate a report as of `now`. The timezone of `now` decides where the
/// wall-clock period boundaries fall.
pub fn build_report<Tz: TimeZone>(
    period: ReportPeriod,
    now: DateTime<Tz>,
    referrals: &[Referral],
    transactions: &[SafeTransaction],
    institutions: &[MedicalInstitution],
) -> ReportData {
    let tz = now.timezone();
    let end = now.naive_local();
    let start = period_start(period, end);

    let in_range = |instant: &DateTime<chrono::Utc>| {
        let local = instant.with_timezone(&tz).naive_local();
        start <= local && local <= end
    };

    let filtered_referrals: Vec<Referral> = referrals
        .iter()
        .filter(|r| in_range(&r.referral_date))
        .cloned()
        .collect();
    let filtered_transactions: Vec<&SafeTransaction> =
        transactions.iter().filter(|t| in_range(&t.date)).collect();

    let total_income: f64 = filtered_transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income)
        .map(|t| t.amount)
        .sum();
    let total_expense: f64 = filtered_transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
        .map(|t| t.amount)
        .sum();

    // Running balance over the whole ledger, then walk back over the period
    let closing_balance = ledger::balance(transactions);
    let opening_balance = closing_balance - (total_income - total_expense);

    let total_referral_price: f64 = filtered_referrals.iter().map(|r| r.total_price).sum();
    let total_referral_cost: f64 = filtered_referrals.iter().map(|r| r.total_cost).sum();

    let mut payment_stats = PaymentStats::default();
    for referral in &filtered_referrals {
        let bucket = match referral.payment_method {
            PaymentMethod::Cash => &mut payment_stats.cash,
            PaymentMethod::Pos => &mut payment_stats.pos,
            PaymentMethod::Invoice => &mut payment_stats.invoice,
        };
        bucket.count += 1;
        bucket.total += referral.total_price;
    }

    let mut institution_stats: BTreeMap<String, InstitutionStat> = BTreeMap::new();
    for referral in &filtered_referrals {
        let key = referral
            .target_institution_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let stat = institution_stats.entry(key).or_insert_with(|| InstitutionStat {
            name: institution_bucket_name(referral.target_institution_id, institutions),
            count: 0,
            cost: 0.0,
        });
        stat.count += 1;
        stat.cost += referral.total_cost;
    }

    let mut company_stats: BTreeMap<String, CompanyStat> = BTreeMap::new();
    for referral in &filtered_referrals {
        let stat = company_stats
            .entry(referral.employee.company.clone())
            .or_default();
        stat.count += 1;
        stat.total += referral.total_price;
    }

    ReportData {
        period,
        start,
        end,
        referrals: filtered_referrals,
        total_income,
        total_expense,
        opening_balance,
        closing_balance,
        total_referral_price,
        total_referral_cost,
        estimated_profit: total_referral_price - total_referral_cost,
        payment_stats,
        institution_stats,
        company_stats,
    }
}

fn institution_bucket_name(id: Option<Uuid>, institutions: &[MedicalInstitution]) -> String {
    match id {
        None => NO_INSTITUTION_LABEL.to_string(),
        Some(id) => institutions
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| UNKNOWN_INSTITUTION_LABEL.to_string()),
    }
}

/// Institution display name for detail rows; `-` when the referral has none.
pub fn institution_display(id: Option<Uuid>, institutions: &[MedicalInstitution]) -> String {
    match id {
        None => "-".to_string(),
        Some(id) => institutions
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| UNKNOWN_INSTITUTION_LABEL.to_string()),
    }
}

// ─── Dashboard counters ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_referrals: usize,
    pub today_referrals: usize,
    pub total_income: f64,
}

/// Headline counters for the main screen: all-time referral count, today's
/// count and all-time ledger income.
pub fn dashboard_stats<Tz: TimeZone>(
    referrals: &[Referral],
    transactions: &[SafeTransaction],
    now: DateTime<Tz>,
) -> DashboardStats {
    let tz = now.timezone();
    let today = now.naive_local().date();
    let today_referrals = referrals
        .iter()
        .filter(|r| r.referral_date.with_timezone(&tz).naive_local().date() == today)
        .count();
    DashboardStats {
        total_referrals: referrals.len(),
        today_referrals,
        total_income: ledger::income_total(transactions),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
