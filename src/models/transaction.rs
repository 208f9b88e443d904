use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TransactionKind;

/// Cash-drawer ledger entry. Append-only; never mutated after creation,
/// removed only by a full ledger reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
}
