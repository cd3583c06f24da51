//! # Quote Commands
//!
//! Quotes are built in the [`CartKind::Orcamento`] cart, which ignores
//! stock, and saved with a seven-day validity.

use avelar_core::{
    Orcamento, OrcamentoItemDetalhe, OrcamentoResumo, Produto, StatusOrcamento,
};
use chrono::NaiveDate;
use tracing::{debug, info};

use super::parse_filtro;
use crate::error::{ApiError, ApiResult};
use crate::state::{CartKind, CartState, DbState};

const SEARCH_LIMIT: i64 = 10;

/// Active products by name, brand or SKU. A blank query finds nothing.
pub async fn buscar_produtos_orcamento(db: &DbState, query: &str) -> ApiResult<Vec<Produto>> {
    Ok(db.inner().produtos().buscar(query, SEARCH_LIMIT).await?)
}

/// Saves the quote cart for `cliente_id` and empties the cart. A failed
/// save keeps the cart as it was.
pub async fn salvar_orcamento(
    db: &DbState,
    carts: &CartState,
    cliente_id: Option<String>,
    today: NaiveDate,
) -> ApiResult<Orcamento> {
    let itens = carts.with_cart(CartKind::Orcamento, |c| c.itens_orcamento());
    debug!(itens = itens.len(), "salvar_orcamento command");

    let orcamento = db
        .inner()
        .orcamentos()
        .salvar(cliente_id.as_deref(), &itens, today)
        .await?;

    carts.with_cart_mut(CartKind::Orcamento, |c| {
        c.remove_persisted(itens.iter().map(|i| (i.produto_id.as_str(), i.quantidade)))
    });
    info!(id = %orcamento.id, total = orcamento.total, "Quote handed to customer");
    Ok(orcamento)
}

pub async fn list_orcamentos(db: &DbState, limit: Option<i64>) -> ApiResult<Vec<OrcamentoResumo>> {
    Ok(db.inner().orcamentos().list(limit.unwrap_or(50)).await?)
}

pub async fn get_orcamento(db: &DbState, id: &str) -> ApiResult<Orcamento> {
    Ok(db.inner().orcamentos().get(id).await?)
}

pub async fn get_orcamento_itens(
    db: &DbState,
    orcamento_id: &str,
) -> ApiResult<Vec<OrcamentoItemDetalhe>> {
    Ok(db.inner().orcamentos().itens(orcamento_id).await?)
}

/// Sets `pendente`, `aprovado` or `rejeitado`.
pub async fn atualizar_status_orcamento(
    db: &DbState,
    id: &str,
    status: &str,
) -> ApiResult<Orcamento> {
    let status = parse_filtro::<StatusOrcamento>("status", Some(status))?
        .ok_or_else(|| ApiError::validation("status obrigatório"))?;
    Ok(db.inner().orcamentos().atualizar_status(id, status).await?)
}
