use serde::{Deserialize, Serialize};

/// Age at which the electrocardiogram exam becomes mandatory, absent an
/// explicit setting.
pub const DEFAULT_EKG_LIMIT_AGE: i32 = 40;

/// Singleton application settings, replaced wholesale on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_ekg_limit_age")]
    pub ekg_limit_age: i32,
    /// Opaque image reference (data URL) used on printed documents.
    #[serde(default)]
    pub company_logo: Option<String>,
}

fn default_ekg_limit_age() -> i32 {
    DEFAULT_EKG_LIMIT_AGE
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ekg_limit_age: DEFAULT_EKG_LIMIT_AGE,
            company_logo: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_forty() {
        assert_eq!(AppSettings::default().ekg_limit_age, 40);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.ekg_limit_age, 40);
        assert!(settings.company_logo.is_none());
    }
}
