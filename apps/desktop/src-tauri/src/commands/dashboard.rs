//! # Dashboard Commands

use avelar_core::{AlertaEstoque, DashboardData, DashboardStats, VendaResumo};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

pub async fn dashboard_stats(db: &DbState, today: NaiveDate) -> ApiResult<DashboardStats> {
    debug!(%today, "dashboard_stats command");
    Ok(db.inner().dashboard().stats(today).await?)
}

pub async fn vendas_recentes(db: &DbState, config: &ConfigState) -> ApiResult<Vec<VendaResumo>> {
    Ok(db.inner().dashboard().vendas_recentes(config.recent_limit).await?)
}

pub async fn alertas_estoque(db: &DbState, config: &ConfigState) -> ApiResult<Vec<AlertaEstoque>> {
    Ok(db.inner().dashboard().alertas_estoque(config.recent_limit).await?)
}

/// Cards, recent sales and alerts in one call.
pub async fn dashboard_data(db: &DbState, today: NaiveDate) -> ApiResult<DashboardData> {
    Ok(db.inner().dashboard().data(today).await?)
}
