//! # Config Commands

use serde::Serialize;
use tracing::debug;

use crate::state::ConfigState;

/// Configuration as the frontend sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub store_name: String,
    pub low_stock_threshold: i64,
    pub recent_limit: i64,
}

/// Gets the current application configuration.
///
/// Paths and service URLs stay on the backend.
pub fn get_config(config: &ConfigState) -> ConfigView {
    debug!("get_config command");
    ConfigView {
        store_name: config.store_name.clone(),
        low_stock_threshold: config.low_stock_threshold,
        recent_limit: config.recent_limit,
    }
}

pub fn format_currency(config: &ConfigState, cents: i64) -> String {
    config.format_currency(cents)
}
