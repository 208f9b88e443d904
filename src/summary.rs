//! Narrative result summaries for completed referrals.
//!
//! The generator is an injected capability: callers hold a `Summarizer` and
//! never care whether it is backed by a local model server or a canned
//! response. When nothing is configured, or the backend fails, the caller
//! still gets usable text instead of an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Referral;

const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Shown when a configured backend fails mid-request.
pub const SERVICE_UNAVAILABLE: &str =
    "Summary service is unavailable right now. Please try again later.";

const SYSTEM_PROMPT: &str = "You are an assistant to an occupational health physician. \
Write a short, plain-language summary of a referral outcome for the employer file. \
Stick to the information given and do not invent findings.";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("cannot reach summary backend at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("summary backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to parse backend response: {0}")]
    ResponseParsing(String),
}

/// Anything that can turn a referral into a short narrative.
pub trait Summarizer {
    fn summarize(&self, referral: &Referral) -> Result<String, SummaryError>;
}

// ─── HTTP backend ─────────────────────────────────────────────────────────────

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct HttpSummarizer {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpSummarizer {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Reads `REFERA_SUMMARY_URL` and `REFERA_SUMMARY_MODEL`. Returns `None`
    /// when no backend is configured, which callers treat as demo mode.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("REFERA_SUMMARY_URL").ok()?;
        let model = std::env::var("REFERA_SUMMARY_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&base_url, &model, DEFAULT_TIMEOUT_SECS))
    }
}

/// Request body for /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Summarizer for HttpSummarizer {
    fn summarize(&self, referral: &Referral) -> Result<String, SummaryError> {
        let url = format!("{}/api/generate", self.base_url);
        let prompt = build_prompt(referral);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: SYSTEM_PROMPT,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                SummaryError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                SummaryError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                SummaryError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummaryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| SummaryError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }
}

// ─── Static backend ───────────────────────────────────────────────────────────

/// Summarizer that always returns the same text. Used in tests and demos.
pub struct StaticSummarizer {
    response: String,
}

impl StaticSummarizer {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl Summarizer for StaticSummarizer {
    fn summarize(&self, _referral: &Referral) -> Result<String, SummaryError> {
        Ok(self.response.clone())
    }
}

// ─── Fallback wiring ──────────────────────────────────────────────────────────

/// Produce a summary no matter what: demo text when no backend is
/// configured, the canned unavailable message when the backend errors.
pub fn summarize_or_fallback(summarizer: Option<&dyn Summarizer>, referral: &Referral) -> String {
    match summarizer {
        None => demo_summary(referral),
        Some(backend) => match backend.summarize(referral) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("summary generation failed: {e}");
                SERVICE_UNAVAILABLE.to_string()
            }
        },
    }
}

fn demo_summary(referral: &Referral) -> String {
    format!(
        "(Demo mode) Exams requested for {} were reviewed. No findings preventing \
work were recorded. Configure a summary backend to generate real narratives.",
        referral.employee.full_name
    )
}

fn build_prompt(referral: &Referral) -> String {
    let exams = if referral.exams.is_empty() {
        "None".to_string()
    } else {
        referral.exams.join(", ")
    };
    format!(
        "Employee: {}\nCompany: {}\nExams: {}\nStatus: {}\nNotes: {}",
        referral.employee.full_name,
        referral.employee.company,
        exams,
        referral.status.label(),
        referral.notes.as_deref().unwrap_or("None"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{PaymentMethod, ReferralStatus};
    use crate::models::Employee;
    use chrono::Utc;
    use uuid::Uuid;

    struct FailingSummarizer;

    impl Summarizer for FailingSummarizer {
        fn summarize(&self, _referral: &Referral) -> Result<String, SummaryError> {
            Err(SummaryError::Connection("http://localhost:11434".into()))
        }
    }

    fn sample_referral() -> Referral {
        Referral {
            id: Uuid::new_v4(),
            employee: Employee {
                id: Uuid::new_v4(),
                full_name: "Ali Veli".to_string(),
                tc_no: "12345678901".to_string(),
                birth_date: None,
                company: "Mega Metal Sanayi A.Ş.".to_string(),
            },
            exams: vec!["Odyometri".to_string(), "EKG".to_string()],
            status: ReferralStatus::AwaitingResult,
            referral_date: Utc::now(),
            notes: Some("Night shift worker".to_string()),
            result_summary: None,
            doctor_name: "Dr. Ahmet Demir".to_string(),
            specialist_name: "Fatma Şahin".to_string(),
            total_price: 300.0,
            total_cost: 130.0,
            payment_method: PaymentMethod::Invoice,
            target_institution_id: None,
        }
    }

    #[test]
    fn static_summarizer_is_deterministic() {
        let backend = StaticSummarizer::new("All results within normal limits.");
        let referral = sample_referral();
        let first = backend.summarize(&referral).unwrap();
        let second = backend.summarize(&referral).unwrap();
        assert_eq!(first, "All results within normal limits.");
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_uses_demo_text_when_unconfigured() {
        let referral = sample_referral();
        let text = summarize_or_fallback(None, &referral);
        assert!(text.starts_with("(Demo mode)"));
        assert!(text.contains("Ali Veli"));
    }

    #[test]
    fn fallback_degrades_to_unavailable_message() {
        let referral = sample_referral();
        let text = summarize_or_fallback(Some(&FailingSummarizer), &referral);
        assert_eq!(text, SERVICE_UNAVAILABLE);
    }

    #[test]
    fn fallback_passes_through_backend_output() {
        let backend = StaticSummarizer::new("Fit for work.");
        let referral = sample_referral();
        assert_eq!(summarize_or_fallback(Some(&backend), &referral), "Fit for work.");
    }

    #[test]
    fn prompt_carries_the_referral_details() {
        let referral = sample_referral();
        let prompt = build_prompt(&referral);
        assert!(prompt.contains("Ali Veli"));
        assert!(prompt.contains("Odyometri, EKG"));
        assert!(prompt.contains("Night shift worker"));
        assert!(prompt.contains("Awaiting result"));
    }

    #[test]
    fn prompt_defaults_empty_fields() {
        let mut referral = sample_referral();
        referral.exams.clear();
        referral.notes = None;
        let prompt = build_prompt(&referral);
        assert!(prompt.contains("Exams: None"));
        assert!(prompt.contains("Notes: None"));
    }

    #[test]
    fn http_summarizer_trims_trailing_slash() {
        let backend = HttpSummarizer::new("http://localhost:11434/", "llama3", 60);
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.timeout_secs, 60);
    }
}
