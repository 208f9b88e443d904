use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{HazardClass, PaymentMethod};

/// Staff name used when a company row does not assign a doctor/specialist.
pub const UNASSIGNED_STAFF: &str = "Unassigned";

/// Client company requesting exams for its employees.
///
/// `default_exams` holds exam ids, resolved to name snapshots when a draft
/// referral is seeded; ids that no longer resolve are dropped silently.
/// `forced_institution_id` is a contractual constraint: the referral form
/// pre-fills it and flags the lock, but accepts an override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub hazard_class: HazardClass,
    pub assigned_doctor: String,
    pub assigned_specialist: String,
    #[serde(default)]
    pub default_exams: Vec<Uuid>,
    #[serde(default)]
    pub default_payment_method: PaymentMethod,
    #[serde(default)]
    pub forced_institution_id: Option<Uuid>,
}
