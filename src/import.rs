//! Bulk company onboarding from CSV, plus the matching template so users
//! have a file with the right columns to start from.
//!
//! Imports are forgiving: header variations are ignored (columns are
//! positional), hazard class and payment method accept the Turkish terms
//! users actually type, and unknown exam codes are dropped rather than
//! failing the whole file.

use std::io::Read;

use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{HazardClass, PaymentMethod};
use crate::models::{Company, ExamDefinition, UNASSIGNED_STAFF};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("template error: {0}")]
    Template(String),
}

/// Companies parsed from the file, plus how many rows were dropped for
/// missing a name.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub companies: Vec<Company>,
    pub skipped_rows: usize,
}

/// Maps free-text hazard wording onto a class. Checks the qualifiers before
/// the bare term so "Çok Tehlikeli" and "Az Tehlikeli" do not fall into the
/// plain "Tehlikeli" bucket.
pub fn parse_hazard_class(raw: &str) -> HazardClass {
    let lowered = raw.to_lowercase();
    if lowered.contains("çok") || lowered.contains("cok") {
        HazardClass::VeryDangerous
    } else if lowered.contains("az") {
        HazardClass::Less
    } else if lowered.contains("tehlikeli") {
        HazardClass::Dangerous
    } else {
        HazardClass::Less
    }
}

/// Maps free-text payment wording onto a method; anything unrecognized is
/// billed by invoice.
pub fn parse_payment_method(raw: &str) -> PaymentMethod {
    let lowered = raw.to_lowercase();
    if lowered.contains("nakit") || lowered.contains("elden") || lowered.contains("kasa") {
        PaymentMethod::Cash
    } else if lowered.contains("pos") || lowered.contains("kredi") || lowered.contains("kart") {
        PaymentMethod::Pos
    } else {
        PaymentMethod::Invoice
    }
}

/// Resolves a comma-separated list of exam codes to catalog ids. Codes that
/// do not match any exam are dropped.
pub fn resolve_exam_codes(raw: &str, exams: &[ExamDefinition]) -> Vec<Uuid> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .filter_map(|code| {
            let found = exams.iter().find(|e| e.code == code).map(|e| e.id);
            if found.is_none() {
                tracing::debug!("dropping unknown exam code '{code}' during import");
            }
            found
        })
        .collect()
}

/// Parses a company CSV. The first row is treated as a header and skipped;
/// data columns are positional: name, hazard class, doctor, specialist,
/// payment method, exam codes.
pub fn read_company_csv<R: Read>(
    reader: R,
    exams: &[ExamDefinition],
) -> Result<ImportOutcome, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut companies = Vec::new();
    let mut skipped_rows = 0;

    for record in csv_reader.records() {
        let record = record?;
        let name = record.get(0).map(str::trim).unwrap_or("");
        if name.is_empty() {
            skipped_rows += 1;
            continue;
        }

        companies.push(Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            hazard_class: parse_hazard_class(record.get(1).unwrap_or("")),
            assigned_doctor: staff_or_default(record.get(2)),
            assigned_specialist: staff_or_default(record.get(3)),
            default_exams: resolve_exam_codes(record.get(5).unwrap_or(""), exams),
            default_payment_method: parse_payment_method(record.get(4).unwrap_or("")),
            forced_institution_id: None,
        });
    }

    Ok(ImportOutcome { companies, skipped_rows })
}

fn staff_or_default(field: Option<&str>) -> String {
    match field.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNASSIGNED_STAFF.to_string(),
    }
}

/// The downloadable import template: header row plus one filled-in example.
pub fn template_csv() -> Result<String, ImportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "Company Name",
        "Hazard Class",
        "Doctor",
        "Specialist",
        "Payment Method",
        "Exam Codes",
    ])?;
    writer.write_record([
        "Örnek İnşaat A.Ş.",
        "Çok Tehlikeli",
        "Dr. Ali Yılmaz",
        "Ayşe Demir",
        "Nakit",
        "101,102,106",
    ])?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Template(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ImportError::Template(e.to_string()))
}
