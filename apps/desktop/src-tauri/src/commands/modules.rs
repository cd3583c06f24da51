//! # Module Commands
//!
//! Screen switching for the single-window shell. See
//! [`crate::modules::ModuleRegistry`].

use avelar_core::DashboardData;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ApiResult;
use crate::modules::{LoadedModule, ModuleRegistry, CADASTROS};
use crate::state::DbState;

pub async fn load_module(
    registry: &ModuleRegistry,
    db: &DbState,
    name: &str,
    today: NaiveDate,
) -> ApiResult<LoadedModule> {
    debug!(module = %name, "load_module command");
    registry.load_module(name, db, today).await
}

/// Warms the partial cache. Without `names`, the registration screens.
pub async fn preload_modules(
    registry: &ModuleRegistry,
    names: Option<Vec<String>>,
) -> ApiResult<usize> {
    match names {
        Some(names) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            registry.preload(&names).await
        }
        None => registry.preload(&CADASTROS).await,
    }
}

pub async fn refresh_dashboard(
    registry: &ModuleRegistry,
    db: &DbState,
    today: NaiveDate,
) -> ApiResult<Option<DashboardData>> {
    registry.refresh_dashboard(db, today).await
}

pub fn current_module(registry: &ModuleRegistry) -> Option<String> {
    registry.current_module()
}

pub fn is_module_loaded(registry: &ModuleRegistry, name: &str) -> bool {
    registry.is_loaded(name)
}
