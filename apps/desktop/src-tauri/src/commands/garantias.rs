//! # Warranty Commands

use avelar_core::{
    EstatisticasGarantias, Garantia, GarantiaInput, GarantiaResumo, Ocorrencia, OcorrenciaInput,
    StatusGarantia, TipoGarantia, TipoProdutoGarantia,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::parse_filtro;
use crate::error::ApiResult;
use crate::state::DbState;

/// A warranty kind offered for a product type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcaoGarantia {
    pub tipo: TipoGarantia,
    pub label: &'static str,
    pub duracao_meses: i64,
}

/// Newest 50 with customer and product names; `status` accepts `todos`.
pub async fn list_garantias(db: &DbState, status: Option<&str>) -> ApiResult<Vec<GarantiaResumo>> {
    let status = parse_filtro::<StatusGarantia>("status", status)?;
    debug!(?status, "list_garantias command");
    Ok(db.inner().garantias().list(status).await?)
}

pub async fn get_garantia(db: &DbState, id: &str) -> ApiResult<Garantia> {
    Ok(db.inner().garantias().get(id).await?)
}

/// The kind must be offered for the product type; blank terms get the
/// default text.
pub async fn create_garantia(db: &DbState, input: GarantiaInput) -> ApiResult<Garantia> {
    debug!(tipo = ?input.tipo_garantia, "create_garantia command");
    Ok(db.inner().garantias().create(input).await?)
}

pub async fn registrar_ocorrencia(db: &DbState, input: OcorrenciaInput) -> ApiResult<Ocorrencia> {
    Ok(db.inner().garantias().registrar_ocorrencia(input).await?)
}

pub async fn list_ocorrencias(db: &DbState, garantia_id: &str) -> ApiResult<Vec<Ocorrencia>> {
    Ok(db.inner().garantias().ocorrencias(garantia_id).await?)
}

pub async fn estender_garantia(db: &DbState, id: &str, meses: i64) -> ApiResult<Garantia> {
    debug!(id = %id, meses, "estender_garantia command");
    Ok(db.inner().garantias().estender(id, meses).await?)
}

pub async fn estatisticas_garantias(
    db: &DbState,
    today: NaiveDate,
) -> ApiResult<EstatisticasGarantias> {
    Ok(db.inner().garantias().estatisticas(today).await?)
}

/// Options of the warranty kind select for a product type.
pub fn tipos_garantia(tipo_produto: TipoProdutoGarantia) -> Vec<OpcaoGarantia> {
    tipo_produto
        .tipos_garantia()
        .iter()
        .map(|tipo| OpcaoGarantia {
            tipo: *tipo,
            label: tipo.label(),
            duracao_meses: tipo.duracao_padrao_meses(),
        })
        .collect()
}
