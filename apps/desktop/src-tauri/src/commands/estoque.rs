//! # Stock Commands

use avelar_core::{AjusteEstoqueInput, CategoriaProduto, Movimentacao, MovimentacaoDetalhe, Produto};
use tracing::debug;

use super::parse_filtro;
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

const MOVIMENTACOES_LIMIT: i64 = 50;

/// Products by name; `categoria` of `todos` or blank lists everything.
pub async fn list_estoque(db: &DbState, categoria: Option<&str>) -> ApiResult<Vec<Produto>> {
    let categoria = parse_filtro::<CategoriaProduto>("categoria", categoria)?;
    debug!(?categoria, "list_estoque command");
    Ok(db.inner().estoque().list(categoria).await?)
}

/// Entrada, saída or absolute ajuste, recorded as a movement.
pub async fn ajustar_estoque(db: &DbState, input: AjusteEstoqueInput) -> ApiResult<Movimentacao> {
    debug!(produto_id = %input.produto_id, tipo = ?input.tipo, "ajustar_estoque command");
    Ok(db.inner().estoque().ajustar(input).await?)
}

/// Newest 50 movements with product name and SKU.
pub async fn list_movimentacoes(db: &DbState) -> ApiResult<Vec<MovimentacaoDetalhe>> {
    Ok(db.inner().estoque().movimentacoes(MOVIMENTACOES_LIMIT).await?)
}

pub async fn movimentacoes_produto(db: &DbState, produto_id: &str) -> ApiResult<Vec<Movimentacao>> {
    Ok(db.inner().estoque().movimentacoes_produto(produto_id).await?)
}

/// Active products under the configured threshold, lowest first.
pub async fn estoque_baixo(
    db: &DbState,
    config: &ConfigState,
    limit: Option<i64>,
) -> ApiResult<Vec<Produto>> {
    Ok(db
        .inner()
        .estoque()
        .estoque_baixo(config.low_stock_threshold, limit.unwrap_or(config.recent_limit))
        .await?)
}
