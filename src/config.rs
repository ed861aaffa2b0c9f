//! Pipeline configuration.
//!
//! Every key is optional in the TOML file; missing keys fall back to the
//! defaults below.
//!
//! ```toml
//! expiry_horizon_days = 180
//! ocr_timeout_secs = 60
//! join_column = "Passport Number"
//! file_name_pattern = "(?i)passport"
//! allowed_extensions = ["jpg", "jpeg", "png", "gif", "pdf"]
//! ```

use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::columns;
use crate::utils::{PassportError, Result};
use crate::validation::expiry::DEFAULT_HORIZON_DAYS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub expiry_horizon_days: u32,
    pub ocr_timeout_secs: u64,
    /// Column used to match roster rows against the uploaded manifest.
    pub join_column: String,
    pub copy_columns: Vec<String>,
    /// Only files whose name matches are treated as passport scans.
    pub file_name_pattern: String,
    pub allowed_extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            expiry_horizon_days: DEFAULT_HORIZON_DAYS,
            ocr_timeout_secs: 60,
            join_column: columns::PASSPORT_NUMBER.to_string(),
            copy_columns: columns::MERGE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            file_name_pattern: "(?i)passport".to_string(),
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "pdf"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Read `path` if given, otherwise use defaults. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    PassportError::ConfigError(format!("Read {} failed: {}", path.display(), e))
                })?;
                log::info!("Loaded pipeline config from {}", path.display());
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PassportError::ConfigError(format!("Parse TOML failed: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.join_column.trim().is_empty() {
            return Err(PassportError::ConfigError("join_column must not be empty".to_string()));
        }
        if self.ocr_timeout_secs == 0 {
            return Err(PassportError::ConfigError(
                "ocr_timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.file_name_regex()?;
        Ok(())
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn file_name_regex(&self) -> Result<Regex> {
        Regex::new(&self.file_name_pattern).map_err(|e| {
            PassportError::ConfigError(format!(
                "Invalid file_name_pattern '{}': {}",
                self.file_name_pattern, e
            ))
        })
    }

    pub fn copy_column_refs(&self) -> Vec<&str> {
        self.copy_columns.iter().map(String::as_str).collect()
    }

    /// Case-insensitive extension check against `allowed_extensions`.
    pub fn extension_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_roster_conventions() {
        let config = PipelineConfig::default();
        assert_eq!(config.expiry_horizon_days, 180);
        assert_eq!(config.join_column, "Passport Number");
        assert_eq!(config.copy_columns.len(), 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = PipelineConfig::from_toml("ocr_timeout_secs = 5\n").unwrap();
        assert_eq!(config.ocr_timeout(), Duration::from_secs(5));
        assert_eq!(config.expiry_horizon_days, 180);
        assert_eq!(config.file_name_pattern, "(?i)passport");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_timeout = PipelineConfig::from_toml("ocr_timeout_secs = 0").unwrap();
        assert!(matches!(zero_timeout.validate(), Err(PassportError::ConfigError(_))));

        let bad_regex = PipelineConfig::from_toml("file_name_pattern = \"(\"").unwrap();
        assert!(matches!(bad_regex.validate(), Err(PassportError::ConfigError(_))));

        assert!(matches!(
            PipelineConfig::from_toml("expiry_horizon_days = \"soon\""),
            Err(PassportError::ConfigError(_))
        ));
    }

    #[test]
    fn extension_check_ignores_case() {
        let config = PipelineConfig::default();
        assert!(config.extension_allowed(Path::new("a_passport.JPG")));
        assert!(config.extension_allowed(Path::new("a_passport.pdf")));
        assert!(!config.extension_allowed(Path::new("a_passport.xlsx")));
        assert!(!config.extension_allowed(Path::new("passport")));
    }
}
