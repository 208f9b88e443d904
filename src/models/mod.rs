pub mod company;
pub mod enums;
pub mod exam;
pub mod institution;
pub mod referral;
pub mod settings;
pub mod transaction;

pub use company::{Company, UNASSIGNED_STAFF};
pub use enums::{HazardClass, PaymentMethod, ReferralStatus, TransactionKind};
pub use exam::ExamDefinition;
pub use institution::MedicalInstitution;
pub use referral::{Employee, Referral};
pub use settings::{AppSettings, DEFAULT_EKG_LIMIT_AGE};
pub use transaction::SafeTransaction;
