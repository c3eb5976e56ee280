//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`QUOTE_*`)
//! 2. Config file (`QUOTE_CONFIG`, else `config.json` in the platform
//!    config directory)
//! 3. Defaults (this file)
//!
//! ## Platform Config Directory
//! - **Linux**: `~/.config/quote-desk/config.json`
//! - **macOS**: `~/Library/Application Support/com.quotedesk.quote-desk/config.json`
//! - **Windows**: `%APPDATA%\quotedesk\quote-desk\config\config.json`
//!
//! Configuration is read-only after startup. Runtime changes (tax, margin,
//! market rate) live on the quotation, not here.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use quote_core::catalog::Catalog;
use quote_core::money::{Money, CURRENCY_SYMBOL};
use quote_core::validation::{parse_amount, validate_market_rate, validate_tax_percent};
use quote_core::{DEFAULT_MARGIN_PERCENT, DEFAULT_MARKET_RATE, DEFAULT_TAX_BPS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Application configuration.
///
/// Every field has a default, so a config file may set only some of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigState {
    /// Company name printed at the top of documents
    pub company_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax percent a new quotation starts with
    pub tax_percent: f64,

    /// Global margin percent a new quotation starts with
    pub default_margin_percent: f64,

    /// Commodity price per kg a new quotation starts with
    pub market_rate: f64,

    /// Catalog JSON file; the built-in catalog when absent
    pub catalog_path: Option<PathBuf>,

    /// Where exported documents are written; the working directory when
    /// absent
    pub export_dir: Option<PathBuf>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Tax: 18%
    /// - Margin: 20%
    /// - Market rate: 1270 per kg
    /// - Currency: ₹
    fn default() -> Self {
        ConfigState {
            company_name: "Quote Desk".to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
            tax_percent: DEFAULT_TAX_BPS as f64 / 100.0,
            default_margin_percent: DEFAULT_MARGIN_PERCENT,
            market_rate: DEFAULT_MARKET_RATE,
            catalog_path: None,
            export_dir: None,
        }
    }
}

impl ConfigState {
    /// Resolves configuration from file, then environment, over defaults.
    ///
    /// A missing config file is skipped; a malformed one is a
    /// `CONFIG_ERROR`.
    pub fn load() -> Result<Self, ApiError> {
        let explicit = std::env::var("QUOTE_CONFIG").ok().map(PathBuf::from);
        let path = explicit.clone().or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => ConfigState::from_file(&path)?,
            Some(path) => {
                if explicit.is_some() {
                    warn!(path = %path.display(), "QUOTE_CONFIG points to a missing file, using defaults");
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                }
                ConfigState::default()
            }
            None => ConfigState::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ApiError::config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        let config: ConfigState = serde_json::from_str(&text).map_err(|e| {
            ApiError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies `QUOTE_*` overrides found through `lookup`.
    ///
    /// ## Environment Variables
    /// - `QUOTE_COMPANY_NAME`: Company name
    /// - `QUOTE_TAX_RATE`: Tax percent (e.g., "18")
    /// - `QUOTE_MARGIN`: Default margin percent
    /// - `QUOTE_MARKET_RATE`: Commodity price per kg
    /// - `QUOTE_CATALOG_PATH`: Catalog JSON file
    ///
    /// Numeric values that fail to parse or validate are ignored with a
    /// warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("QUOTE_COMPANY_NAME") {
            self.company_name = name;
        }

        if let Some(raw) = lookup("QUOTE_TAX_RATE") {
            match parse_amount("QUOTE_TAX_RATE", &raw)
                .and_then(|v| validate_tax_percent(v).map(|_| v))
            {
                Ok(v) => self.tax_percent = v,
                Err(e) => warn!(error = %e, "Ignoring QUOTE_TAX_RATE"),
            }
        }

        if let Some(raw) = lookup("QUOTE_MARGIN") {
            match parse_amount("QUOTE_MARGIN", &raw) {
                Ok(v) => self.default_margin_percent = v,
                Err(e) => warn!(error = %e, "Ignoring QUOTE_MARGIN"),
            }
        }

        if let Some(raw) = lookup("QUOTE_MARKET_RATE") {
            match parse_amount("QUOTE_MARKET_RATE", &raw)
                .and_then(|v| validate_market_rate(v).map(|_| v))
            {
                Ok(v) => self.market_rate = v,
                Err(e) => warn!(error = %e, "Ignoring QUOTE_MARKET_RATE"),
            }
        }

        if let Some(path) = lookup("QUOTE_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(path));
        }
    }

    /// Loads the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog, ApiError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::builtin());
        };

        let text = std::fs::read_to_string(path).map_err(|e| {
            ApiError::config(format!("Cannot read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Catalog::from_json_str(&text)?;

        info!(path = %path.display(), groups = catalog.groups().len(), "Loaded catalog file");
        Ok(catalog)
    }

    /// Directory exports are written to.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Formats a paise amount with the configured symbol and Indian digit
    /// grouping.
    ///
    /// ## Example
    /// ```rust
    /// use quote_desk_lib::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1_23_456_78), "₹1,23,456.78");
    /// ```
    pub fn format_currency(&self, paise: i64) -> String {
        Money::from_paise(paise)
            .to_string()
            .replacen(CURRENCY_SYMBOL, &self.currency_symbol, 1)
    }

    /// Formats an exact engine amount, rounded to the paisa.
    pub fn format_amount(&self, amount: f64) -> String {
        self.format_currency(Money::from_amount(amount).paise())
    }
}

/// `config.json` under the platform config directory.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "quotedesk", "quote-desk")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.tax_percent, 18.0);
        assert_eq!(config.default_margin_percent, 20.0);
        assert_eq!(config.market_rate, 1270.0);
        assert_eq!(config.currency_symbol, "₹");
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ConfigState::default();
        config.apply_env(env(&[
            ("QUOTE_COMPANY_NAME", "Acme Gases"),
            ("QUOTE_TAX_RATE", "12"),
            ("QUOTE_MARGIN", "25.5"),
            ("QUOTE_MARKET_RATE", "1300"),
            ("QUOTE_CATALOG_PATH", "/tmp/catalog.json"),
        ]));

        assert_eq!(config.company_name, "Acme Gases");
        assert_eq!(config.tax_percent, 12.0);
        assert_eq!(config.default_margin_percent, 25.5);
        assert_eq!(config.market_rate, 1300.0);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = ConfigState::default();
        config.apply_env(env(&[
            ("QUOTE_TAX_RATE", "eighteen"),
            ("QUOTE_MARGIN", ""),
            ("QUOTE_MARKET_RATE", "-5"),
        ]));
        assert_eq!(config, ConfigState::default());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "companyName": "Acme Gases", "taxPercent": 5 }"#).unwrap();

        let config = ConfigState::from_file(&path).unwrap();
        assert_eq!(config.company_name, "Acme Gases");
        assert_eq!(config.tax_percent, 5.0);
        assert_eq!(config.market_rate, 1270.0);
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigState::from_file(&path).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{ "id": 1000, "name": "Copper pipe", "items": [
                { "id": 3, "name": "15mm", "unit": "mtr", "weight": 0.357 }
            ]}]"#,
        )
        .unwrap();

        let config = ConfigState {
            catalog_path: Some(path),
            ..ConfigState::default()
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.groups().len(), 1);
    }

    #[test]
    fn test_load_missing_catalog() {
        let config = ConfigState {
            catalog_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..ConfigState::default()
        };
        assert!(config.load_catalog().is_err());
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234), "₹12.34");
        assert_eq!(config.format_currency(-1234), "-₹12.34");
        assert_eq!(config.format_amount(554.9472), "₹554.95");

        let config = ConfigState {
            currency_symbol: "Rs ".to_string(),
            ..ConfigState::default()
        };
        assert_eq!(config.format_currency(1_000_00), "Rs 1,000.00");
    }
}
