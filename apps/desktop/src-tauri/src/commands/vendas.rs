//! # Sale Commands (PDV)
//!
//! Product search for the counter and sale finalization from the
//! [`CartKind::Venda`] cart.

use avelar_core::{
    FinalizarVendaInput, FormaPagamento, Produto, Venda, VendaItemDetalhe, VendaResumo,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::{CartKind, CartState, DbState};

const SEARCH_LIMIT: i64 = 10;

/// Payment details chosen at the counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalizarVendaRequest {
    pub cliente_id: Option<String>,
    #[serde(default)]
    pub forma_pagamento: FormaPagamento,
    /// Discount in centavos.
    #[serde(default)]
    pub desconto: i64,
    pub observacoes: Option<String>,
}

/// Active products with stock, by name.
pub async fn produtos_disponiveis(db: &DbState) -> ApiResult<Vec<Produto>> {
    debug!("produtos_disponiveis command");
    Ok(db.inner().produtos().disponiveis().await?)
}

/// Name, SKU or brand search, ten results. A blank query shows the
/// available products.
pub async fn buscar_produtos_venda(db: &DbState, query: &str) -> ApiResult<Vec<Produto>> {
    if query.trim().is_empty() {
        return produtos_disponiveis(db).await;
    }
    Ok(db.inner().produtos().buscar(query, SEARCH_LIMIT).await?)
}

/// Persists the PDV cart as a completed sale and empties the cart.
///
/// ## Flow
/// ```text
/// cart items ──► FinalizarVendaInput ──► VendaRepository::finalizar (one tx)
///                                              │
///                    Err (stock ran out) ◄─────┤ cart kept for correction
///                                              ▼
///                                        Ok(venda) ──► sold lines leave the cart
/// ```
pub async fn finalizar_venda(
    db: &DbState,
    carts: &CartState,
    request: FinalizarVendaRequest,
) -> ApiResult<Venda> {
    let itens = carts.with_cart(CartKind::Venda, |c| c.itens_venda());
    debug!(itens = itens.len(), "finalizar_venda command");

    let venda = db
        .inner()
        .vendas()
        .finalizar(FinalizarVendaInput {
            cliente_id: request.cliente_id.filter(|id| !id.trim().is_empty()),
            forma_pagamento: request.forma_pagamento,
            desconto: request.desconto,
            observacoes: request.observacoes,
            itens: itens.clone(),
        })
        .await?;

    carts.with_cart_mut(CartKind::Venda, |c| {
        c.remove_persisted(itens.iter().map(|i| (i.produto_id.as_str(), i.quantidade)))
    });
    info!(numero = venda.numero_venda, total = venda.total, "Sale finalized at the counter");
    Ok(venda)
}

/// Newest sales first, with the customer name.
pub async fn list_vendas(db: &DbState, limit: Option<i64>) -> ApiResult<Vec<VendaResumo>> {
    Ok(db.inner().vendas().list(limit.unwrap_or(50)).await?)
}

pub async fn get_venda_itens(db: &DbState, venda_id: &str) -> ApiResult<Vec<VendaItemDetalhe>> {
    Ok(db.inner().vendas().itens(venda_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cart, test_support};
    use crate::error::ErrorCode;
    use avelar_core::{CategoriaProduto, ProdutoInput};

    async fn produto(db: &DbState, nome: &str, preco: i64, estoque: i64) -> Produto {
        let mut input = ProdutoInput::new(nome, CategoriaProduto::Armacao, preco);
        input.estoque_atual = estoque;
        input.marca = Some("Oakley".to_string());
        db.inner().produtos().create(input).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = test_support::db().await;
        let carts = CartState::new();
        let err = finalizar_venda(&db, &carts, FinalizarVendaRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Adicione produtos ao carrinho!");
    }

    #[tokio::test]
    async fn test_finalize_clears_cart_and_takes_stock() {
        let db = test_support::db().await;
        let carts = CartState::new();
        let armacao = produto(&db, "Oakley Holbrook", 60_000, 3).await;
        cart::add_to_cart(&db, &carts, CartKind::Venda, &armacao.id, Some(2))
            .await
            .unwrap();

        let venda = finalizar_venda(
            &db,
            &carts,
            FinalizarVendaRequest {
                forma_pagamento: FormaPagamento::Pix,
                desconto: 5_000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(venda.numero_venda, 1);
        assert_eq!(venda.total, 115_000);
        assert!(carts.with_cart(CartKind::Venda, |c| c.is_empty()));
        assert_eq!(db.inner().produtos().get(&armacao.id).await.unwrap().estoque_atual, 1);

        let itens = get_venda_itens(&db, &venda.id).await.unwrap();
        assert_eq!(itens[0].quantidade, 2);
        assert_eq!(list_vendas(&db, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stock_gone_keeps_cart() {
        let db = test_support::db().await;
        let carts = CartState::new();
        let armacao = produto(&db, "Oakley Frogskins", 50_000, 1).await;
        cart::add_to_cart(&db, &carts, CartKind::Venda, &armacao.id, None)
            .await
            .unwrap();

        // Someone else sells the last unit first.
        let outro = CartState::new();
        cart::add_to_cart(&db, &outro, CartKind::Venda, &armacao.id, None)
            .await
            .unwrap();
        finalizar_venda(&db, &outro, FinalizarVendaRequest::default())
            .await
            .unwrap();

        let err = finalizar_venda(&db, &carts, FinalizarVendaRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(carts.with_cart(CartKind::Venda, |c| c.item_count()), 1);
    }

    #[tokio::test]
    async fn test_search() {
        let db = test_support::db().await;
        produto(&db, "Oakley Holbrook", 60_000, 3).await;
        produto(&db, "Sem Estoque", 10_000, 0).await;

        assert_eq!(buscar_produtos_venda(&db, "oakley").await.unwrap().len(), 2);
        let disponiveis = buscar_produtos_venda(&db, "").await.unwrap();
        assert_eq!(disponiveis.len(), 1);
        assert_eq!(disponiveis[0].nome, "Oakley Holbrook");
    }
}
