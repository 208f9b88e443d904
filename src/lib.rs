//! Refera: back-office engine for an OSGB (occupational health and safety
//! center) referral desk. Tracks employee exam referrals for client
//! companies, prices them from the exam catalog, books cash/POS income into
//! the office ledger, and renders period reports.
//!
//! All data lives in a single local SQLite file; [`state::AppState`] is the
//! entry point embedders work against.

pub mod backup;
pub mod config;
pub mod db;
pub mod import;
pub mod ledger;
pub mod models;
pub mod referral;
pub mod report;
pub mod seed;
pub mod state;
pub mod summary;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` wins when set; otherwise the built-in
/// filter keeps this crate at debug and everything else at info.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
