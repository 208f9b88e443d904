//! Application facade: in-memory working set hydrated from the repository,
//! with every mutation mirrored back to storage before it returns.
//!
//! Collections are small (one OSGB office), so each save rewrites the whole
//! collection under its key. Referrals are kept newest-first; ledger
//! transactions append in arrival order.

use std::io::Read;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backup::{self, Backup, BackupError, BACKUP_VERSION};
use crate::config;
use crate::db::{
    open_database, Repository, SqliteStore, StoreError, KEY_COMPANIES, KEY_EXAMS,
    KEY_INSTITUTIONS, KEY_REFERRALS, KEY_SETTINGS, KEY_TRANSACTIONS,
};
use crate::import::{self, ImportError};
use crate::ledger::{self, LedgerError};
use crate::models::enums::{ReferralStatus, TransactionKind};
use crate::models::{
    AppSettings, Company, ExamDefinition, MedicalInstitution, Referral, SafeTransaction,
};
use crate::referral::{DraftError, ReferralDraft};
use crate::report::{
    self, workbook, zreport, DashboardStats, ExportError, ReportData, ReportPeriod,
};
use crate::seed;
use crate::summary::{self, Summarizer};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("an exam with code '{code}' already exists")]
    DuplicateExamCode { code: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Outcome counts of a CSV company import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

pub struct AppState {
    repo: Repository,
    exams: Vec<ExamDefinition>,
    institutions: Vec<MedicalInstitution>,
    companies: Vec<Company>,
    referrals: Vec<Referral>,
    transactions: Vec<SafeTransaction>,
    settings: AppSettings,
}

impl AppState {
    /// Hydrate from the repository. Catalog keys that have never been
    /// written fall back to the first-run seed; history starts empty.
    pub fn load(repo: Repository) -> Self {
        let seed = seed::initial_data();
        let exams = repo.load(KEY_EXAMS, seed.exams);
        let institutions = repo.load(KEY_INSTITUTIONS, seed.institutions);
        let companies = repo.load(KEY_COMPANIES, seed.companies);
        let referrals: Vec<Referral> = repo.load(KEY_REFERRALS, Vec::new());
        let transactions: Vec<SafeTransaction> = repo.load(KEY_TRANSACTIONS, Vec::new());
        let settings = repo.load(KEY_SETTINGS, AppSettings::default());

        tracing::info!(
            exams = exams.len(),
            companies = companies.len(),
            referrals = referrals.len(),
            "application state loaded"
        );

        Self {
            repo,
            exams,
            institutions,
            companies,
            referrals,
            transactions,
            settings,
        }
    }

    /// Open the SQLite-backed store under the user's data directory.
    pub fn open_default() -> Result<Self, AppError> {
        let data_dir = config::app_data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let conn = open_database(&config::database_path())?;
        Ok(Self::load(Repository::new(Box::new(SqliteStore::new(conn)))))
    }

    // ─── Accessors ────────────────────────────────────────────────────────

    pub fn exams(&self) -> &[ExamDefinition] {
        &self.exams
    }

    pub fn institutions(&self) -> &[MedicalInstitution] {
        &self.institutions
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn referrals(&self) -> &[Referral] {
        &self.referrals
    }

    pub fn transactions(&self) -> &[SafeTransaction] {
        &self.transactions
    }

    /// Ledger entries newest-first, the order the finance screen shows.
    pub fn recent_transactions(&self) -> Vec<&SafeTransaction> {
        self.transactions.iter().rev().collect()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    // ─── Exam catalog ─────────────────────────────────────────────────────

    pub fn add_exam(
        &mut self,
        code: &str,
        name: &str,
        price: f64,
        cost: f64,
    ) -> Result<Uuid, AppError> {
        if self.exams.iter().any(|e| e.code == code) {
            return Err(AppError::DuplicateExamCode {
                code: code.to_string(),
            });
        }
        let exam = ExamDefinition::new(code, name, price, cost);
        let id = exam.id;
        self.exams.push(exam);
        self.repo.save(KEY_EXAMS, &self.exams)?;
        Ok(id)
    }

    pub fn update_exam(&mut self, updated: ExamDefinition) -> Result<(), AppError> {
        if self
            .exams
            .iter()
            .any(|e| e.code == updated.code && e.id != updated.id)
        {
            return Err(AppError::DuplicateExamCode {
                code: updated.code.clone(),
            });
        }
        let exam = self
            .exams
            .iter_mut()
            .find(|e| e.id == updated.id)
            .ok_or_else(|| AppError::NotFound {
                entity: "exam",
                id: updated.id.to_string(),
            })?;
        *exam = updated;
        self.repo.save(KEY_EXAMS, &self.exams)?;
        Ok(())
    }

    /// Removes the exam from the catalog. Company default lists keep the id;
    /// it is dropped when next resolved against the catalog. Existing
    /// referrals carry name snapshots and are untouched.
    pub fn delete_exam(&mut self, id: Uuid) -> Result<(), AppError> {
        self.exams.retain(|e| e.id != id);
        self.repo.save(KEY_EXAMS, &self.exams)?;
        Ok(())
    }

    // ─── Institutions ─────────────────────────────────────────────────────

    pub fn add_institution(&mut self, name: &str, phone: Option<&str>) -> Result<Uuid, AppError> {
        let institution = MedicalInstitution::new(name, phone);
        let id = institution.id;
        self.institutions.push(institution);
        self.repo.save(KEY_INSTITUTIONS, &self.institutions)?;
        Ok(id)
    }

    /// Referrals pointing at a deleted institution keep the id; reports
    /// label it as unknown.
    pub fn delete_institution(&mut self, id: Uuid) -> Result<(), AppError> {
        self.institutions.retain(|i| i.id != id);
        self.repo.save(KEY_INSTITUTIONS, &self.institutions)?;
        Ok(())
    }

    // ─── Companies ────────────────────────────────────────────────────────

    pub fn add_company(&mut self, company: Company) -> Result<Uuid, AppError> {
        let id = company.id;
        self.companies.push(company);
        self.repo.save(KEY_COMPANIES, &self.companies)?;
        Ok(id)
    }

    pub fn update_company(&mut self, updated: Company) -> Result<(), AppError> {
        let company = self
            .companies
            .iter_mut()
            .find(|c| c.id == updated.id)
            .ok_or_else(|| AppError::NotFound {
                entity: "company",
                id: updated.id.to_string(),
            })?;
        *company = updated;
        self.repo.save(KEY_COMPANIES, &self.companies)?;
        Ok(())
    }

    pub fn delete_company(&mut self, id: Uuid) -> Result<(), AppError> {
        self.delete_companies(&[id])
    }

    /// Bulk delete from the company list screen. Referral history keeps its
    /// company-name snapshots.
    pub fn delete_companies(&mut self, ids: &[Uuid]) -> Result<(), AppError> {
        self.companies.retain(|c| !ids.contains(&c.id));
        self.repo.save(KEY_COMPANIES, &self.companies)?;
        Ok(())
    }

    /// Parse a company CSV and append every valid row.
    pub fn import_companies<R: Read>(&mut self, reader: R) -> Result<ImportSummary, AppError> {
        let outcome = import::read_company_csv(reader, &self.exams)?;
        let summary = ImportSummary {
            added: outcome.companies.len(),
            skipped: outcome.skipped_rows,
        };
        self.companies.extend(outcome.companies);
        self.repo.save(KEY_COMPANIES, &self.companies)?;
        tracing::info!(added = summary.added, skipped = summary.skipped, "companies imported");
        Ok(summary)
    }

    // ─── Settings ─────────────────────────────────────────────────────────

    pub fn update_settings(&mut self, settings: AppSettings) -> Result<(), AppError> {
        self.settings = settings;
        self.repo.save(KEY_SETTINGS, &self.settings)?;
        Ok(())
    }

    // ─── Referrals ────────────────────────────────────────────────────────

    /// Submit a draft: finalize against the current catalog, prepend to the
    /// referral list, and run the payment hook. CASH/POS referrals with a
    /// positive total create an INCOME transaction in the same call.
    pub fn create_referral(
        &mut self,
        draft: &ReferralDraft,
        now: DateTime<Utc>,
    ) -> Result<Referral, AppError> {
        let Some(company_id) = draft.company_id else {
            return Err(DraftError::Invalid(draft.validate()).into());
        };
        let company = self
            .companies
            .iter()
            .find(|c| c.id == company_id)
            .ok_or_else(|| AppError::NotFound {
                entity: "company",
                id: company_id.to_string(),
            })?;

        let referral = draft.finalize(company, &self.exams, now)?;
        self.referrals.insert(0, referral.clone());
        self.repo.save(KEY_REFERRALS, &self.referrals)?;

        if let Some(tx) = ledger::record_referral_income(&referral, now) {
            self.transactions.push(tx);
            self.repo.save(KEY_TRANSACTIONS, &self.transactions)?;
        }

        tracing::info!(referral = %referral.id, "referral created");
        Ok(referral)
    }

    pub fn update_referral_status(
        &mut self,
        id: Uuid,
        status: ReferralStatus,
    ) -> Result<(), AppError> {
        let referral = self
            .referrals
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "referral",
                id: id.to_string(),
            })?;
        referral.status = status;
        self.repo.save(KEY_REFERRALS, &self.referrals)?;
        Ok(())
    }

    /// Store the reviewed summary text on the referral; an empty string
    /// clears it.
    pub fn set_result_summary(&mut self, id: Uuid, text: &str) -> Result<(), AppError> {
        let referral = self
            .referrals
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "referral",
                id: id.to_string(),
            })?;
        referral.result_summary = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self.repo.save(KEY_REFERRALS, &self.referrals)?;
        Ok(())
    }

    /// Deleting an unknown id is a no-op.
    pub fn delete_referral(&mut self, id: Uuid) -> Result<(), AppError> {
        self.referrals.retain(|r| r.id != id);
        self.repo.save(KEY_REFERRALS, &self.referrals)?;
        Ok(())
    }

    /// Case-insensitive substring search over employee name, company name
    /// and national id. A blank query returns everything.
    pub fn search_referrals(&self, query: &str) -> Vec<&Referral> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.referrals.iter().collect();
        }
        self.referrals
            .iter()
            .filter(|r| {
                r.employee.full_name.to_lowercase().contains(&q)
                    || r.employee.company.to_lowercase().contains(&q)
                    || r.employee.tc_no.contains(&q)
            })
            .collect()
    }

    /// Generate a narrative for the referral without storing it; the user
    /// reviews the text before it is saved via [`Self::set_result_summary`].
    pub fn summarize_referral(
        &self,
        id: Uuid,
        summarizer: Option<&dyn Summarizer>,
    ) -> Result<String, AppError> {
        let referral = self
            .referrals
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound {
                entity: "referral",
                id: id.to_string(),
            })?;
        Ok(summary::summarize_or_fallback(summarizer, referral))
    }

    // ─── Ledger ───────────────────────────────────────────────────────────

    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        amount: f64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, AppError> {
        let tx = ledger::manual_entry(kind, amount, description, now)?;
        let id = tx.id;
        self.transactions.push(tx);
        self.repo.save(KEY_TRANSACTIONS, &self.transactions)?;
        Ok(id)
    }

    /// Wipe the ledger. Referral history is not touched.
    pub fn reset_ledger(&mut self) -> Result<(), AppError> {
        self.transactions.clear();
        self.repo.save(KEY_TRANSACTIONS, &self.transactions)?;
        Ok(())
    }

    pub fn balance(&self) -> f64 {
        ledger::balance(&self.transactions)
    }

    pub fn income_total(&self) -> f64 {
        ledger::income_total(&self.transactions)
    }

    pub fn expense_total(&self) -> f64 {
        ledger::expense_total(&self.transactions)
    }

    // ─── Reports ──────────────────────────────────────────────────────────

    pub fn report<Tz: TimeZone>(&self, period: ReportPeriod, now: DateTime<Tz>) -> ReportData {
        report::build_report(
            period,
            now,
            &self.referrals,
            &self.transactions,
            &self.institutions,
        )
    }

    pub fn stats<Tz: TimeZone>(&self, now: DateTime<Tz>) -> DashboardStats {
        report::dashboard_stats(&self.referrals, &self.transactions, now)
    }

    pub fn export_report_xlsx<Tz: TimeZone>(
        &self,
        period: ReportPeriod,
        now: DateTime<Tz>,
    ) -> Result<Vec<u8>, AppError> {
        let report = self.report(period, now);
        Ok(workbook::report_workbook(&report, &self.institutions)?)
    }

    pub fn export_report_pdf<Tz: TimeZone>(
        &self,
        period: ReportPeriod,
        now: DateTime<Tz>,
    ) -> Result<Vec<u8>, AppError> {
        let report = self.report(period, now);
        Ok(zreport::zreport_pdf(&report)?)
    }

    // ─── Backup ───────────────────────────────────────────────────────────

    pub fn export_backup(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let backup = Backup {
            version: BACKUP_VERSION.to_string(),
            timestamp: Some(now),
            companies: self.companies.clone(),
            referrals: self.referrals.clone(),
            exams: Some(self.exams.clone()),
            institutions: Some(self.institutions.clone()),
            transactions: Some(self.transactions.clone()),
            settings: Some(self.settings.clone()),
        };
        Ok(backup::render(&backup)?)
    }

    /// Restore from a backup document. The document is parsed and validated
    /// before the first write, so a malformed file changes nothing. Required
    /// sections replace current data; optional sections only when present.
    pub fn restore_backup(&mut self, json: &str) -> Result<(), AppError> {
        let parsed = backup::parse(json)?;

        self.repo.save(KEY_COMPANIES, &parsed.companies)?;
        self.repo.save(KEY_REFERRALS, &parsed.referrals)?;
        if let Some(exams) = &parsed.exams {
            self.repo.save(KEY_EXAMS, exams)?;
        }
        if let Some(institutions) = &parsed.institutions {
            self.repo.save(KEY_INSTITUTIONS, institutions)?;
        }
        if let Some(transactions) = &parsed.transactions {
            self.repo.save(KEY_TRANSACTIONS, transactions)?;
        }
        if let Some(settings) = &parsed.settings {
            self.repo.save(KEY_SETTINGS, settings)?;
        }

        self.companies = parsed.companies;
        self.referrals = parsed.referrals;
        if let Some(exams) = parsed.exams {
            self.exams = exams;
        }
        if let Some(institutions) = parsed.institutions {
            self.institutions = institutions;
        }
        if let Some(transactions) = parsed.transactions {
            self.transactions = transactions;
        }
        if let Some(settings) = parsed.settings {
            self.settings = settings;
        }

        tracing::info!(
            companies = self.companies.len(),
            referrals = self.referrals.len(),
            "backup restored"
        );
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
