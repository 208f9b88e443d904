use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Partner medical facility referrals are sent to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalInstitution {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

impl MedicalInstitution {
    pub fn new(name: &str, phone: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
        }
    }
}
