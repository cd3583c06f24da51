//! # Cart Commands
//!
//! Shared by the PDV (`CartKind::Venda`) and the quote screen
//! (`CartKind::Orcamento`).
//!
//! ## Cart Lifecycle
//! ```text
//! ┌──────────┐     ┌──────────┐                 ┌───────────────────┐
//! │  Empty   │────►│ In Cart  │────────────────►│ finalizar_venda / │
//! │  Cart    │     │          │                 │ salvar_orcamento  │
//! └──────────┘     └──────────┘                 └─────────┬─────────┘
//!      ▲            add_to_cart                           │
//!      │            update_cart_item                      │
//!      │            remove_from_cart                      │
//!      └──────────── clear_cart ◄─────────────────────────┘
//! ```

use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{CartKind, CartState, CartView, DbState};

pub fn get_cart(carts: &CartState, kind: CartKind) -> CartView {
    carts.with_cart(kind, |c| CartView::from(c))
}

/// Adds a product, `quantidade` defaulting to 1.
///
/// The product is read fresh from the database so the sale cart checks
/// the current stock.
pub async fn add_to_cart(
    db: &DbState,
    carts: &CartState,
    kind: CartKind,
    produto_id: &str,
    quantidade: Option<i64>,
) -> ApiResult<CartView> {
    let quantidade = quantidade.unwrap_or(1);
    debug!(produto_id = %produto_id, quantidade, ?kind, "add_to_cart command");

    let produto = db.inner().produtos().get(produto_id).await?;
    if !produto.ativo {
        return Err(ApiError::validation("Produto indisponível para venda"));
    }

    carts.with_cart_mut(kind, |c| {
        c.add_item(&produto, quantidade)?;
        Ok::<_, ApiError>(CartView::from(&*c))
    })
}

/// Sets a line's quantity; below 1 removes it.
pub fn update_cart_item(
    carts: &CartState,
    kind: CartKind,
    produto_id: &str,
    quantidade: i64,
) -> ApiResult<CartView> {
    debug!(produto_id = %produto_id, quantidade, ?kind, "update_cart_item command");
    carts.with_cart_mut(kind, |c| {
        c.update_quantity(produto_id, quantidade)?;
        Ok::<_, ApiError>(CartView::from(&*c))
    })
}

pub fn remove_from_cart(carts: &CartState, kind: CartKind, produto_id: &str) -> ApiResult<CartView> {
    debug!(produto_id = %produto_id, ?kind, "remove_from_cart command");
    carts.with_cart_mut(kind, |c| {
        c.remove_item(produto_id)?;
        Ok::<_, ApiError>(CartView::from(&*c))
    })
}

pub fn clear_cart(carts: &CartState, kind: CartKind) -> CartView {
    debug!(?kind, "clear_cart command");
    carts.with_cart_mut(kind, |c| {
        c.clear();
        CartView::from(&*c)
    })
}
