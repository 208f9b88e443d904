use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Refera";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Refera/ on all platforms (user-visible, holds the database and exports)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Refera")
}

/// Path of the SQLite database file
pub fn database_path() -> PathBuf {
    app_data_dir().join("refera.db")
}

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
