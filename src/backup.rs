//! Whole-vault export and restore as a single JSON document.
//!
//! A backup is valid when it carries the `companies` and `referrals`
//! sections; everything else is optional so older export files keep
//! restoring. Parsing never touches storage, which is what makes restore
//! all-or-nothing: a malformed file fails here, before any write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    AppSettings, Company, ExamDefinition, MedicalInstitution, Referral, SafeTransaction,
};

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup file is not valid: {0}")]
    Malformed(serde_json::Error),

    #[error("backup could not be serialized: {0}")]
    Serialization(serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub companies: Vec<Company>,
    pub referrals: Vec<Referral>,
    #[serde(default)]
    pub exams: Option<Vec<ExamDefinition>>,
    #[serde(default)]
    pub institutions: Option<Vec<MedicalInstitution>>,
    #[serde(default)]
    pub transactions: Option<Vec<SafeTransaction>>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
}

/// Parses a backup document. Fails on syntax errors and on documents
/// missing the required sections.
pub fn parse(json: &str) -> Result<Backup, BackupError> {
    serde_json::from_str(json).map_err(BackupError::Malformed)
}

/// Serializes a backup pretty-printed, ready to hand to the user.
pub fn render(backup: &Backup) -> Result<String, BackupError> {
    serde_json::to_string_pretty(backup).map_err(BackupError::Serialization)
}

/// Default download name, dated so repeated exports sort naturally.
pub fn suggested_filename(now: DateTime<Utc>) -> String {
    format!("osgb_backup_{}.json", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn backup_round_trips() {
        let backup = Backup {
            version: BACKUP_VERSION.to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap()),
            companies: vec![],
            referrals: vec![],
            exams: Some(vec![ExamDefinition::new("101", "Odyometri", 150.0, 70.0)]),
            institutions: None,
            transactions: None,
            settings: Some(AppSettings::default()),
        };
        let json = render(&backup).unwrap();
        let parsed = parse(&json).unwrap();
        assert_eq!(parsed, backup);
    }

    #[test]
    fn missing_companies_section_is_rejected() {
        let json = r#"{"version":"1.0","referrals":[]}"#;
        assert!(matches!(parse(json), Err(BackupError::Malformed(_))));
    }

    #[test]
    fn missing_referrals_section_is_rejected() {
        let json = r#"{"version":"1.0","companies":[]}"#;
        assert!(matches!(parse(json), Err(BackupError::Malformed(_))));
    }

    #[test]
    fn minimal_document_parses_with_optional_sections_absent() {
        let json = r#"{"companies":[],"referrals":[]}"#;
        let backup = parse(json).unwrap();
        assert!(backup.version.is_empty());
        assert!(backup.timestamp.is_none());
        assert!(backup.exams.is_none());
        assert!(backup.settings.is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse("not json"), Err(BackupError::Malformed(_))));
    }

    #[test]
    fn filename_carries_the_date() {
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap();
        assert_eq!(suggested_filename(now), "osgb_backup_2024-06-12.json");
    }
}
