//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`AVELAR_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;
use std::time::Duration;

use avelar_core::{Money, LOW_STOCK_THRESHOLD, RECENT_LIMIT, STORE_NAME};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default ViaCEP endpoint.
pub const DEFAULT_CEP_BASE_URL: &str = "https://viacep.com.br/ws";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Explicit database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Store name (page titles, receipts)
    pub store_name: String,

    /// Directory holding the module HTML partials
    pub ui_dir: PathBuf,

    /// Base URL of the postal code service
    pub cep_base_url: String,

    /// Seconds before a CEP lookup gives up
    pub cep_timeout_secs: u64,

    /// Products below this stock are listed as low
    pub low_stock_threshold: i64,

    /// Rows in the dashboard's recent lists
    pub recent_limit: i64,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            db_path: None,
            store_name: STORE_NAME.to_string(),
            ui_dir: PathBuf::from("ui/partials"),
            cep_base_url: DEFAULT_CEP_BASE_URL.to_string(),
            cep_timeout_secs: 10,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            recent_limit: RECENT_LIMIT,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `AVELAR_DB_PATH`: database file
    /// - `AVELAR_STORE_NAME`: store name
    /// - `AVELAR_UI_DIR`: HTML partials directory
    /// - `AVELAR_CEP_BASE_URL`, `AVELAR_CEP_TIMEOUT_SECS`: CEP service
    /// - `AVELAR_LOW_STOCK_THRESHOLD`, `AVELAR_RECENT_LIMIT`: dashboard
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(path) = lookup("AVELAR_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(store_name) = lookup("AVELAR_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(ui_dir) = lookup("AVELAR_UI_DIR") {
            config.ui_dir = PathBuf::from(ui_dir);
        }

        if let Some(url) = lookup("AVELAR_CEP_BASE_URL") {
            config.cep_base_url = url.trim_end_matches('/').to_string();
        }

        config.cep_timeout_secs =
            parse_or_default(&lookup, "AVELAR_CEP_TIMEOUT_SECS", config.cep_timeout_secs);
        config.low_stock_threshold =
            parse_or_default(&lookup, "AVELAR_LOW_STOCK_THRESHOLD", config.low_stock_threshold);
        config.recent_limit = parse_or_default(&lookup, "AVELAR_RECENT_LIMIT", config.recent_limit);

        config
    }

    /// Resolves the database file.
    ///
    /// Falls back to `./avelar.db` when the platform has no data directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }

        match ProjectDirs::from("br", "avelar", "otica") {
            Some(dirs) => dirs.data_dir().join("avelar.db"),
            None => PathBuf::from("avelar.db"),
        }
    }

    pub fn cep_timeout(&self) -> Duration {
        Duration::from_secs(self.cep_timeout_secs)
    }

    /// Formats a centavo amount as `R$ 1.234,56`.
    pub fn format_currency(&self, cents: i64) -> String {
        Money::from_cents(cents).to_string()
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "Invalid configuration value, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ConfigState {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigState::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.store_name, "Óticas Avelar");
        assert_eq!(config.cep_base_url, "https://viacep.com.br/ws");
        assert_eq!(config.cep_timeout_secs, 10);
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.ui_dir, PathBuf::from("ui/partials"));
        assert!(config.database_path().ends_with("avelar.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("AVELAR_DB_PATH", "/tmp/loja.db"),
            ("AVELAR_STORE_NAME", "Avelar Centro"),
            ("AVELAR_CEP_BASE_URL", "http://localhost:8080/ws/"),
            ("AVELAR_LOW_STOCK_THRESHOLD", "3"),
        ]);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/loja.db"));
        assert_eq!(config.store_name, "Avelar Centro");
        assert_eq!(config.cep_base_url, "http://localhost:8080/ws");
        assert_eq!(config.low_stock_threshold, 3);
    }

    #[test]
    fn test_invalid_number_falls_back() {
        let config = config_from(&[
            ("AVELAR_CEP_TIMEOUT_SECS", "dez"),
            ("AVELAR_RECENT_LIMIT", "-"),
        ]);
        assert_eq!(config.cep_timeout_secs, 10);
        assert_eq!(config.recent_limit, 5);
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(123456), "R$ 1.234,56");
        assert_eq!(config.format_currency(0), "R$ 0,00");
        assert_eq!(config.format_currency(-550), "-R$ 5,50");
    }
}
