use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PaymentMethod, ReferralStatus};

/// Employee identity as captured at referral time. Embedded in [`Referral`],
/// not a standalone entity; `company` is a name snapshot, not a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    /// National id, digits only, exactly 11 of them once validated.
    pub tc_no: String,
    pub birth_date: Option<NaiveDate>,
    pub company: String,
}

/// A record sending an employee for one or more medical exams.
///
/// Exam names, staff names and the price/cost totals are frozen at creation
/// time; later catalog or company edits do not retroactively change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub employee: Employee,
    pub exams: Vec<String>,
    pub status: ReferralStatus,
    pub referral_date: DateTime<Utc>,
    pub notes: Option<String>,
    /// Outcome text from the optional summarization service.
    #[serde(default)]
    pub result_summary: Option<String>,
    pub doctor_name: String,
    pub specialist_name: String,
    pub total_price: f64,
    pub total_cost: f64,
    pub payment_method: PaymentMethod,
    pub target_institution_id: Option<Uuid>,
}
