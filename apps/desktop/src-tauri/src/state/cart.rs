//! # Cart State
//!
//! The PDV cart and the quote cart.
//!
//! ## Thread Safety
//! Each cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may access/modify the cart
//! 2. Only one command should modify the cart at a time
//! 3. Commands can run concurrently
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Frontend Action          Command                 Cart State Change     │
//! │  ───────────────          ───────                 ─────────────────     │
//! │                                                                         │
//! │  Click Product ──────────► add_to_cart() ───────► items.push(item)     │
//! │                                                                         │
//! │  Change Quantity ────────► update_cart_item() ──► items[i].qty = n     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► items.remove(i)      │
//! │                                                                         │
//! │  Click Clear ────────────► clear_cart() ────────► items.clear()        │
//! │                                                                         │
//! │  Finalize / Save ────────► finalizar_venda() ───► remove_persisted()   │
//! │                            salvar_orcamento()                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Venda` cart never holds more units than the shelf; an `Orcamento`
//! cart is only a price list and has no stock limit.

use std::sync::{Arc, Mutex, MutexGuard};

use avelar_core::validation::validate_quantity;
use avelar_core::{
    CoreError, CoreResult, ItemOrcamentoInput, ItemVendaInput, Produto, ValidationError,
    MAX_ITEM_QUANTITY,
};
use serde::{Deserialize, Serialize};

/// Which counter the cart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    Venda,
    Orcamento,
}

/// An item in the cart.
///
/// Name and price are frozen when the product is added; the cart keeps
/// showing them even if the product changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub produto_id: String,
    pub nome: String,
    pub marca: Option<String>,
    /// Unit price in centavos.
    pub preco_unitario: i64,
    pub quantidade: i64,
    pub subtotal: i64,
    /// Stock when the product was added.
    pub estoque_disponivel: i64,
}

impl CartItem {
    pub fn from_produto(produto: &Produto, quantidade: i64) -> Self {
        CartItem {
            produto_id: produto.id.clone(),
            nome: produto.nome.clone(),
            marca: produto.marca.clone(),
            preco_unitario: produto.preco_venda,
            quantidade,
            subtotal: produto.preco_venda * quantidade,
            estoque_disponivel: produto.estoque_atual,
        }
    }

    fn set_quantidade(&mut self, quantidade: i64) {
        self.quantidade = quantidade;
        self.subtotal = self.preco_unitario * quantidade;
    }
}

/// A shopping cart.
///
/// ## Invariants
/// - Items are unique by `produto_id` (adding the same product increases quantity)
/// - Every item has quantity >= 1
/// - In a `Venda` cart, quantity <= `estoque_disponivel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub kind: CartKind,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(kind: CartKind) -> Self {
        Cart {
            kind,
            items: Vec::new(),
        }
    }

    fn limita_estoque(&self) -> bool {
        self.kind == CartKind::Venda
    }

    fn check_quantidade(&self, item_estoque: i64, nome: &str, quantidade: i64) -> CoreResult<()> {
        if quantidade > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantidade".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }
        if self.limita_estoque() && quantidade > item_estoque {
            return Err(CoreError::InsufficientStock {
                produto: nome.to_string(),
                available: item_estoque,
                requested: quantidade,
            });
        }
        Ok(())
    }

    /// Adds a product or increases the quantity of the existing line.
    ///
    /// # Errors
    /// - `OutOfRange` when the line would pass `MAX_ITEM_QUANTITY`
    /// - `InsufficientStock` (`Estoque insuficiente!`) in a sale cart when
    ///   the line would exceed the product's stock
    pub fn add_item(&mut self, produto: &Produto, quantidade: i64) -> CoreResult<()> {
        validate_quantity(quantidade)?;
        self.check_quantidade(produto.estoque_atual, &produto.nome, quantidade)?;

        let atual = self
            .items
            .iter()
            .find(|i| i.produto_id == produto.id)
            .map(|i| i.quantidade)
            .unwrap_or(0);
        let nova = atual + quantidade;
        self.check_quantidade(produto.estoque_atual, &produto.nome, nova)?;

        match self.items.iter_mut().find(|i| i.produto_id == produto.id) {
            Some(item) => {
                item.estoque_disponivel = produto.estoque_atual;
                item.set_quantidade(nova);
            }
            None => self.items.push(CartItem::from_produto(produto, quantidade)),
        }
        Ok(())
    }

    /// Sets the quantity of a line. Below 1 the line is removed.
    pub fn update_quantity(&mut self, produto_id: &str, quantidade: i64) -> CoreResult<()> {
        if quantidade < 1 {
            return self.remove_item(produto_id);
        }

        let (estoque, nome) = match self.items.iter().find(|i| i.produto_id == produto_id) {
            Some(item) => (item.estoque_disponivel, item.nome.clone()),
            None => return Err(CoreError::not_found("Item do carrinho", produto_id)),
        };
        self.check_quantidade(estoque, &nome, quantidade)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.produto_id == produto_id) {
            item.set_quantidade(quantidade);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, produto_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.produto_id != produto_id);

        if self.items.len() == initial_len {
            Err(CoreError::not_found("Item do carrinho", produto_id))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes persisted quantities off the cart after a sale or quote was
    /// saved. Units added while the save was running stay in the cart.
    pub fn remove_persisted<'a, I>(&mut self, linhas: I)
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        for (produto_id, quantidade) in linhas {
            if let Some(item) = self.items.iter_mut().find(|i| i.produto_id == produto_id) {
                let restante = item.quantidade - quantidade;
                item.set_quantidade(restante);
            }
        }
        self.items.retain(|i| i.quantidade >= 1);
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal).sum()
    }

    /// The cart carries no discount or tax; the sale discount is applied
    /// at finalization.
    pub fn total(&self) -> i64 {
        self.subtotal()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn itens_venda(&self) -> Vec<ItemVendaInput> {
        self.items
            .iter()
            .map(|i| ItemVendaInput {
                produto_id: i.produto_id.clone(),
                nome: i.nome.clone(),
                quantidade: i.quantidade,
                preco_unitario: i.preco_unitario,
            })
            .collect()
    }

    pub fn itens_orcamento(&self) -> Vec<ItemOrcamentoInput> {
        self.items
            .iter()
            .map(|i| ItemOrcamentoInput {
                produto_id: i.produto_id.clone(),
                quantidade: i.quantidade,
                preco_unitario: i.preco_unitario,
            })
            .collect()
    }
}

/// Cart contents plus totals, as returned to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub kind: CartKind,
    pub items: Vec<CartItem>,
    pub subtotal: i64,
    pub total: i64,
    pub item_count: usize,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            kind: cart.kind,
            items: cart.items.clone(),
            subtotal: cart.subtotal(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Managed cart state: one cart for the PDV, one for quotes.
#[derive(Debug)]
pub struct CartState {
    venda: Arc<Mutex<Cart>>,
    orcamento: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            venda: Arc::new(Mutex::new(Cart::new(CartKind::Venda))),
            orcamento: Arc::new(Mutex::new(Cart::new(CartKind::Orcamento))),
        }
    }

    fn lock(&self, kind: CartKind) -> MutexGuard<'_, Cart> {
        let mutex = match kind {
            CartKind::Venda => &self.venda,
            CartKind::Orcamento => &self.orcamento,
        };
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to a cart.
    pub fn with_cart<F, R>(&self, kind: CartKind, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock(kind);
        f(&cart)
    }

    /// Executes a function with write access to a cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(CartKind::Venda, |cart| cart.add_item(&produto, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, kind: CartKind, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.lock(kind);
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
