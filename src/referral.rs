//! Referral drafting: age rule, mandatory-exam enforcement, pricing from the
//! exam catalog, company defaults and final submission.
//!
//! Everything here is pure over the in-memory catalog; the created
//! [`Referral`] carries frozen snapshots (exam names, staff names, totals),
//! so later catalog or company edits never rewrite history.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{PaymentMethod, ReferralStatus};
use crate::models::{AppSettings, Company, Employee, ExamDefinition, Referral};

/// Exam name enforced by the age rule. Matched case-sensitively, like every
/// other exam-name lookup.
pub const MANDATORY_EXAM: &str = "EKG";

// ─── Pure rules ───────────────────────────────────────────────────────────────

/// Completed birthday anniversaries at `as_of`. One is subtracted when the
/// as-of month/day precedes the birth month/day; day-count division would
/// drift on boundary dates.
pub fn derive_age(birth_date: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - birth_date.year();
    if (as_of.month(), as_of.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Whether the EKG exam is mandatory at this age.
pub fn exam_mandatory(age: i32, settings: &AppSettings) -> bool {
    age >= settings.ekg_limit_age
}

/// Ensure the mandatory exam name is present in the selection.
pub fn apply_mandatory_exam(selection: &mut Vec<String>) {
    if !selection.iter().any(|name| name == MANDATORY_EXAM) {
        selection.push(MANDATORY_EXAM.to_string());
    }
}

/// Price and cost totals of an exam selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionTotals {
    pub total_price: f64,
    pub total_cost: f64,
}

/// Sum price/cost over the catalog entries whose name matches a selected
/// name (case-sensitive exact match). Names without a catalog entry
/// contribute nothing to either total.
pub fn price_selection(exam_names: &[String], catalog: &[ExamDefinition]) -> SelectionTotals {
    let mut totals = SelectionTotals::default();
    for name in exam_names {
        if let Some(exam) = catalog.iter().find(|e| &e.name == name) {
            totals.total_price += exam.price;
            totals.total_cost += exam.cost;
        }
    }
    totals
}

/// Draft seed derived from a company selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDefaults {
    pub exam_names: Vec<String>,
    pub payment_method: PaymentMethod,
    pub institution_id: Option<Uuid>,
    pub institution_locked: bool,
}

/// Resolve a company's default exam ids to current catalog names (ids that
/// no longer resolve are dropped) and carry its payment method and any
/// contractual institution.
pub fn company_defaults(company: &Company, catalog: &[ExamDefinition]) -> CompanyDefaults {
    let exam_names = company
        .default_exams
        .iter()
        .filter_map(|id| catalog.iter().find(|e| e.id == *id).map(|e| e.name.clone()))
        .collect();
    CompanyDefaults {
        exam_names,
        payment_method: company.default_payment_method.clone(),
        institution_id: company.forced_institution_id,
        institution_locked: company.forced_institution_id.is_some(),
    }
}

// ─── Validation ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("employee name must be at least 3 characters")]
    NameTooShort,

    #[error("national id must be exactly 11 digits")]
    NationalIdInvalid,

    #[error("birth date is required")]
    BirthDateMissing,

    #[error("a company must be selected")]
    CompanyMissing,
}

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("draft is not submittable ({} violation(s))", .0.len())]
    Invalid(Vec<Violation>),

    #[error("selected company does not match the draft")]
    CompanyMismatch,
}

// ─── Draft ────────────────────────────────────────────────────────────────────

/// Form state of a referral being put together.
///
/// The mandatory-exam rule is edge-triggered: the EKG exam is added when the
/// rule condition becomes newly true (birth date entered, company/settings
/// changed), and an explicit removal afterwards is honored until the
/// condition turns true again.
#[derive(Debug, Clone, Default)]
pub struct ReferralDraft {
    pub full_name: String,
    pub tc_no: String,
    pub birth_date: Option<NaiveDate>,
    pub company_id: Option<Uuid>,
    pub exams: Vec<String>,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub institution_id: Option<Uuid>,
    pub institution_locked: bool,
    ekg_mandatory: bool,
}

impl ReferralDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_full_name(&mut self, name: &str) {
        self.full_name = name.to_string();
    }

    /// National id input keeps digits only, capped at 11 characters.
    pub fn set_tc_no(&mut self, raw: &str) {
        self.tc_no = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(11)
            .collect();
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn set_institution(&mut self, id: Option<Uuid>) {
        self.institution_id = id;
    }

    pub fn set_birth_date(
        &mut self,
        birth_date: Option<NaiveDate>,
        settings: &AppSettings,
        as_of: NaiveDate,
    ) {
        self.birth_date = birth_date;
        self.refresh_mandatory_exam(settings, as_of);
    }

    /// Seed selection, payment method and institution from the company, then
    /// re-run the age rule against the new state.
    pub fn apply_company(
        &mut self,
        company: &Company,
        catalog: &[ExamDefinition],
        settings: &AppSettings,
        as_of: NaiveDate,
    ) {
        let defaults = company_defaults(company, catalog);
        self.company_id = Some(company.id);
        self.exams = defaults.exam_names;
        self.payment_method = defaults.payment_method;
        self.institution_id = defaults.institution_id;
        self.institution_locked = defaults.institution_locked;
        self.refresh_mandatory_exam(settings, as_of);
    }

    /// Add or remove an exam by name. Removal is always allowed; a removed
    /// mandatory exam is not forced back until the rule fires again.
    pub fn toggle_exam(&mut self, name: &str) {
        if let Some(pos) = self.exams.iter().position(|n| n == name) {
            self.exams.remove(pos);
        } else {
            self.exams.push(name.to_string());
        }
    }

    /// Re-evaluate the mandatory-exam rule. Call after a settings change;
    /// the birth-date and company mutators call it themselves.
    pub fn refresh_mandatory_exam(&mut self, settings: &AppSettings, as_of: NaiveDate) {
        let mandatory = self
            .age(as_of)
            .map(|age| exam_mandatory(age, settings))
            .unwrap_or(false);
        if mandatory && !self.ekg_mandatory {
            apply_mandatory_exam(&mut self.exams);
        }
        self.ekg_mandatory = mandatory;
    }

    /// Whether the rule currently holds; the UI renders the EKG entry as
    /// suggested-mandatory while true.
    pub fn ekg_mandatory(&self) -> bool {
        self.ekg_mandatory
    }

    pub fn age(&self, as_of: NaiveDate) -> Option<i32> {
        self.birth_date.map(|birth| derive_age(birth, as_of))
    }

    pub fn totals(&self, catalog: &[ExamDefinition]) -> SelectionTotals {
        price_selection(&self.exams, catalog)
    }

    /// All outstanding violations; an empty list means submittable.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.full_name.chars().count() < 3 {
            violations.push(Violation::NameTooShort);
        }
        if self.tc_no.len() != 11 || !self.tc_no.chars().all(|c| c.is_ascii_digit()) {
            violations.push(Violation::NationalIdInvalid);
        }
        if self.birth_date.is_none() {
            violations.push(Violation::BirthDateMissing);
        }
        if self.company_id.is_none() {
            violations.push(Violation::CompanyMissing);
        }
        violations
    }

    /// Turn a submittable draft into a referral: fresh id, employee and
    /// staff-name snapshots, PENDING status, totals frozen from the catalog.
    pub fn finalize(
        &self,
        company: &Company,
        catalog: &[ExamDefinition],
        now: DateTime<Utc>,
    ) -> Result<Referral, DraftError> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(DraftError::Invalid(violations));
        }
        if self.company_id != Some(company.id) {
            return Err(DraftError::CompanyMismatch);
        }

        let totals = self.totals(catalog);
        let employee = Employee {
            id: Uuid::new_v4(),
            full_name: self.full_name.clone(),
            tc_no: self.tc_no.clone(),
            birth_date: self.birth_date,
            company: company.name.clone(),
        };
        Ok(Referral {
            id: Uuid::new_v4(),
            employee,
            exams: self.exams.clone(),
            status: ReferralStatus::Pending,
            referral_date: now,
            notes: if self.notes.is_empty() {
                None
            } else {
                Some(self.notes.clone())
            },
            result_summary: None,
            doctor_name: company.assigned_doctor.clone(),
            specialist_name: company.assigned_specialist.clone(),
            total_price: totals.total_price,
            total_cost: totals.total_cost,
            payment_method: self.payment_method.clone(),
            target_institution_id: self.institution_id,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::HazardClass;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog() -> Vec<ExamDefinition> {
        vec![
            ExamDefinition::new("101", "Odyometri", 100.0, 40.0),
            ExamDefinition::new("102", "Hemogram", 50.0, 10.0),
            ExamDefinition::new("105", "EKG", 150.0, 60.0),
        ]
    }

    fn company_with(catalog: &[ExamDefinition], codes: &[&str]) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: "Mega Metal Sanayi A.Ş.".to_string(),
            hazard_class: HazardClass::VeryDangerous,
            assigned_doctor: "Dr. Mehmet Özdemir".to_string(),
            assigned_specialist: "Uzm. Ayşe Yılmaz".to_string(),
            default_exams: codes
                .iter()
                .filter_map(|code| catalog.iter().find(|e| e.code == *code).map(|e| e.id))
                .collect(),
            default_payment_method: PaymentMethod::Cash,
            forced_institution_id: None,
        }
    }

    #[test]
    fn age_counts_completed_anniversaries() {
        let birth = date(2000, 6, 15);
        assert_eq!(derive_age(birth, date(2024, 6, 14)), 23);
        assert_eq!(derive_age(birth, date(2024, 6, 15)), 24);
        assert_eq!(derive_age(birth, date(2024, 12, 1)), 24);
        assert_eq!(derive_age(birth, date(2024, 5, 31)), 23);
    }

    #[test]
    fn age_day_boundary_within_birth_month() {
        let birth = date(1980, 3, 20);
        assert_eq!(derive_age(birth, date(2020, 3, 19)), 39);
        assert_eq!(derive_age(birth, date(2020, 3, 20)), 40);
    }

    #[test]
    fn mandatory_rule_is_monotonic_in_age() {
        let settings = AppSettings::default();
        assert!(!exam_mandatory(39, &settings));
        assert!(exam_mandatory(40, &settings));
        assert!(exam_mandatory(41, &settings));
        assert!(exam_mandatory(75, &settings));
    }

    #[test]
    fn price_selection_sums_matching_entries() {
        let catalog = catalog();
        let names = vec!["Odyometri".to_string(), "Hemogram".to_string()];
        let totals = price_selection(&names, &catalog);
        assert_eq!(totals.total_price, 150.0);
        assert_eq!(totals.total_cost, 50.0);
    }

    #[test]
    fn unknown_exam_names_contribute_zero() {
        let catalog = catalog();
        let names = vec!["Hemogram".to_string(), "Silinmiş Tetkik".to_string()];
        let totals = price_selection(&names, &catalog);
        assert_eq!(totals.total_price, 50.0);
        assert_eq!(totals.total_cost, 10.0);
    }

    #[test]
    fn empty_selection_prices_to_zero() {
        let totals = price_selection(&[], &catalog());
        assert_eq!(totals.total_price, 0.0);
        assert_eq!(totals.total_cost, 0.0);
    }

    #[test]
    fn company_defaults_resolve_ids_and_drop_dangling() {
        let catalog = catalog();
        let mut company = company_with(&catalog, &["101", "105"]);
        company.default_exams.push(Uuid::new_v4()); // deleted exam
        let defaults = company_defaults(&company, &catalog);
        assert_eq!(defaults.exam_names, vec!["Odyometri", "EKG"]);
        assert_eq!(defaults.payment_method, PaymentMethod::Cash);
        assert!(defaults.institution_id.is_none());
        assert!(!defaults.institution_locked);
    }

    #[test]
    fn forced_institution_prefills_and_flags_lock() {
        let catalog = catalog();
        let mut company = company_with(&catalog, &["101"]);
        let inst = Uuid::new_v4();
        company.forced_institution_id = Some(inst);
        let defaults = company_defaults(&company, &catalog);
        assert_eq!(defaults.institution_id, Some(inst));
        assert!(defaults.institution_locked);
    }

    #[test]
    fn company_row_without_payment_method_bills_on_account() {
        let json = r#"{
            "id": "6f2d3a54-0f3e-4a2e-93a7-8d7c9e2b1c00",
            "name": "Eski Firma",
            "hazard_class": "LESS",
            "assigned_doctor": "Unassigned",
            "assigned_specialist": "Unassigned"
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.default_payment_method, PaymentMethod::Invoice);
        assert!(company.default_exams.is_empty());
    }

    #[test]
    fn tc_no_input_keeps_digits_only() {
        let mut draft = ReferralDraft::new();
        draft.set_tc_no("12 345-678 90 1x9");
        assert_eq!(draft.tc_no, "12345678901");
    }

    #[test]
    fn validate_reports_each_missing_field() {
        let draft = ReferralDraft::new();
        let violations = draft.validate();
        assert!(violations.contains(&Violation::NameTooShort));
        assert!(violations.contains(&Violation::NationalIdInvalid));
        assert!(violations.contains(&Violation::BirthDateMissing));
        assert!(violations.contains(&Violation::CompanyMissing));
    }

    #[test]
    fn complete_draft_has_no_violations() {
        let catalog = catalog();
        let company = company_with(&catalog, &["101"]);
        let settings = AppSettings::default();
        let mut draft = ReferralDraft::new();
        draft.set_full_name("Ali Veli");
        draft.set_tc_no("12345678901");
        draft.set_birth_date(Some(date(1990, 1, 1)), &settings, date(2024, 6, 15));
        draft.apply_company(&company, &catalog, &settings, date(2024, 6, 15));
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn ekg_added_when_rule_becomes_true() {
        let settings = AppSettings::default();
        let as_of = date(2024, 6, 15);
        let mut draft = ReferralDraft::new();
        draft.set_birth_date(Some(date(1980, 1, 1)), &settings, as_of);
        assert!(draft.ekg_mandatory());
        assert!(draft.exams.iter().any(|n| n == MANDATORY_EXAM));
    }

    #[test]
    fn ekg_removal_is_honored_until_rule_fires_again() {
        let settings = AppSettings::default();
        let as_of = date(2024, 6, 15);
        let mut draft = ReferralDraft::new();
        draft.set_birth_date(Some(date(1980, 1, 1)), &settings, as_of);
        draft.toggle_exam(MANDATORY_EXAM);
        assert!(!draft.exams.iter().any(|n| n == MANDATORY_EXAM));

        // Still mandatory: another birth-date edit does not re-add
        draft.set_birth_date(Some(date(1979, 1, 1)), &settings, as_of);
        assert!(!draft.exams.iter().any(|n| n == MANDATORY_EXAM));

        // Condition turns false, then true again: re-added
        draft.set_birth_date(Some(date(2000, 1, 1)), &settings, as_of);
        assert!(!draft.ekg_mandatory());
        draft.set_birth_date(Some(date(1980, 1, 1)), &settings, as_of);
        assert!(draft.exams.iter().any(|n| n == MANDATORY_EXAM));
    }

    #[test]
    fn young_employee_gets_no_forced_ekg() {
        let settings = AppSettings::default();
        let mut draft = ReferralDraft::new();
        draft.set_birth_date(Some(date(2000, 1, 1)), &settings, date(2024, 6, 15));
        assert!(!draft.ekg_mandatory());
        assert!(draft.exams.is_empty());
    }

    #[test]
    fn finalize_snapshots_company_and_freezes_totals() {
        let catalog = catalog();
        let company = company_with(&catalog, &["101", "102"]);
        let settings = AppSettings::default();
        let as_of = date(2024, 6, 15);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();

        let mut draft = ReferralDraft::new();
        draft.set_full_name("Ali Veli");
        draft.set_tc_no("12345678901");
        draft.set_birth_date(Some(date(1995, 2, 10)), &settings, as_of);
        draft.apply_company(&company, &catalog, &settings, as_of);

        let referral = draft.finalize(&company, &catalog, now).unwrap();
        assert_eq!(referral.status, ReferralStatus::Pending);
        assert_eq!(referral.referral_date, now);
        assert_eq!(referral.employee.company, company.name);
        assert_eq!(referral.doctor_name, "Dr. Mehmet Özdemir");
        assert_eq!(referral.specialist_name, "Uzm. Ayşe Yılmaz");
        assert_eq!(referral.total_price, 150.0);
        assert_eq!(referral.total_cost, 50.0);
        assert_eq!(referral.payment_method, PaymentMethod::Cash);
        assert!(referral.notes.is_none());
    }

    #[test]
    fn finalize_rejects_invalid_draft() {
        let catalog = catalog();
        let company = company_with(&catalog, &["101"]);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let draft = ReferralDraft::new();
        match draft.finalize(&company, &catalog, now) {
            Err(DraftError::Invalid(violations)) => assert!(!violations.is_empty()),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn finalize_rejects_company_mismatch() {
        let catalog = catalog();
        let company = company_with(&catalog, &["101"]);
        let other = company_with(&catalog, &["102"]);
        let settings = AppSettings::default();
        let as_of = date(2024, 6, 15);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();

        let mut draft = ReferralDraft::new();
        draft.set_full_name("Ali Veli");
        draft.set_tc_no("12345678901");
        draft.set_birth_date(Some(date(1995, 2, 10)), &settings, as_of);
        draft.apply_company(&company, &catalog, &settings, as_of);

        assert!(matches!(
            draft.finalize(&other, &catalog, now),
            Err(DraftError::CompanyMismatch)
        ));
    }
}
