use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry for a medical examination. `code` is unique among exams;
/// referrals reference exams by name snapshot, companies by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDefinition {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
}

impl ExamDefinition {
    pub fn new(code: &str, name: &str, price: f64, cost: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            price,
            cost,
        }
    }
}
