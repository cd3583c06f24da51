//! # Sales (PDV)
//!
//! A finalized sale and its line items.
//!
//! ## Sale Lifecycle
//! ```text
//! Cart (app state) ──finalizar_venda──► Venda { status: concluida }
//!                                          │
//!                                          ├── VendaItem × N
//!                                          └── Movimentacao (saida, motivo venda) × N
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Enums
// =============================================================================

/// Payment method chosen at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FormaPagamento {
    #[default]
    Dinheiro,
    CartaoCredito,
    CartaoDebito,
    Pix,
    Boleto,
}

impl FormaPagamento {
    pub fn label(&self) -> &'static str {
        match self {
            FormaPagamento::Dinheiro => "Dinheiro",
            FormaPagamento::CartaoCredito => "Cartão de Crédito",
            FormaPagamento::CartaoDebito => "Cartão de Débito",
            FormaPagamento::Pix => "PIX",
            FormaPagamento::Boleto => "Boleto",
        }
    }
}

/// Sale status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusVenda {
    Concluida,
    Pendente,
    Cancelada,
}

impl StatusVenda {
    pub fn label(&self) -> &'static str {
        match self {
            StatusVenda::Concluida => "Concluída",
            StatusVenda::Pendente => "Pendente",
            StatusVenda::Cancelada => "Cancelada",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Venda {
    pub id: String,
    /// Sequential, human-facing number (`Venda #42`).
    pub numero_venda: i64,
    pub cliente_id: Option<String>,
    pub subtotal: i64,
    pub desconto: i64,
    pub total: i64,
    pub forma_pagamento: FormaPagamento,
    pub status: StatusVenda,
    pub observacoes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Venda {
    #[inline]
    pub fn total_money(&self) -> Money {
        Money::from_cents(self.total)
    }
}

/// Sale row with the customer name, as shown in lists.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendaResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub venda: Venda,
    pub cliente_nome: Option<String>,
}

impl VendaResumo {
    /// Customer name, or `Cliente` for walk-in sales.
    pub fn cliente_display(&self) -> &str {
        self.cliente_nome.as_deref().unwrap_or("Cliente")
    }
}

/// A sale line item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendaItem {
    pub id: String,
    pub venda_id: String,
    pub produto_id: String,
    pub quantidade: i64,
    pub preco_unitario: i64,
    pub subtotal: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Sale line item joined with the product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendaItemDetalhe {
    pub produto_id: String,
    pub produto_nome: String,
    pub sku: Option<String>,
    pub quantidade: i64,
    pub preco_unitario: i64,
    pub subtotal: i64,
}

// =============================================================================
// Inputs
// =============================================================================

/// One line handed to sale finalization.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemVendaInput {
    pub produto_id: String,
    pub nome: String,
    pub quantidade: i64,
    pub preco_unitario: i64,
}

impl ItemVendaInput {
    #[inline]
    pub fn subtotal(&self) -> i64 {
        self.preco_unitario * self.quantidade
    }
}

/// Everything needed to persist a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalizarVendaInput {
    pub cliente_id: Option<String>,
    #[serde(default)]
    pub forma_pagamento: FormaPagamento,
    /// Discount in centavos.
    #[serde(default)]
    pub desconto: i64,
    pub observacoes: Option<String>,
    pub itens: Vec<ItemVendaInput>,
}

impl FinalizarVendaInput {
    pub fn subtotal(&self) -> i64 {
        self.itens.iter().map(ItemVendaInput::subtotal).sum()
    }

    /// Subtotal minus discount, never below zero.
    pub fn total(&self) -> i64 {
        (self.subtotal() - self.desconto.max(0)).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(preco: i64, qtd: i64) -> ItemVendaInput {
        ItemVendaInput {
            produto_id: "p".to_string(),
            nome: "Armação".to_string(),
            quantidade: qtd,
            preco_unitario: preco,
        }
    }

    #[test]
    fn test_forma_pagamento_default_and_labels() {
        assert_eq!(FormaPagamento::default(), FormaPagamento::Dinheiro);
        assert_eq!(FormaPagamento::CartaoCredito.label(), "Cartão de Crédito");
        assert_eq!(
            serde_json::to_string(&FormaPagamento::CartaoDebito).unwrap(),
            "\"cartao_debito\""
        );
    }

    #[test]
    fn test_finalizar_totals() {
        let input = FinalizarVendaInput {
            cliente_id: None,
            forma_pagamento: FormaPagamento::Pix,
            desconto: 1000,
            observacoes: None,
            itens: vec![item(25000, 1), item(4990, 2)],
        };
        assert_eq!(input.subtotal(), 34980);
        assert_eq!(input.total(), 33980);
    }

    #[test]
    fn test_total_never_negative() {
        let input = FinalizarVendaInput {
            cliente_id: None,
            forma_pagamento: FormaPagamento::Dinheiro,
            desconto: 50_000,
            observacoes: None,
            itens: vec![item(1000, 1)],
        };
        assert_eq!(input.total(), 0);
    }

    #[test]
    fn test_finalizar_input_defaults_from_json() {
        let input: FinalizarVendaInput =
            serde_json::from_str(r#"{"cliente_id":null,"observacoes":null,"itens":[]}"#).unwrap();
        assert_eq!(input.forma_pagamento, FormaPagamento::Dinheiro);
        assert_eq!(input.desconto, 0);
    }

    #[test]
    fn test_cliente_display() {
        let venda = Venda {
            id: "v1".to_string(),
            numero_venda: 1,
            cliente_id: None,
            subtotal: 100,
            desconto: 0,
            total: 100,
            forma_pagamento: FormaPagamento::Dinheiro,
            status: StatusVenda::Concluida,
            observacoes: None,
            created_at: Utc::now(),
        };
        let resumo = VendaResumo {
            venda,
            cliente_nome: None,
        };
        assert_eq!(resumo.cliente_display(), "Cliente");
    }
}
