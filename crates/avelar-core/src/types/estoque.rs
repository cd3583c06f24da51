//! # Stock Movements
//!
//! Every change to `produtos.estoque_atual` leaves a movement row with the
//! balance before and after.
//!
//! ## Adjustment Rules
//! ```text
//! ┌──────────┬──────────────────────────┬───────────────────────────────┐
//! │ tipo     │ new balance              │ recorded quantidade           │
//! ├──────────┼──────────────────────────┼───────────────────────────────┤
//! │ entrada  │ anterior + quantidade    │ quantidade                    │
//! │ saida    │ anterior - quantidade    │ quantidade                    │
//! │ ajuste   │ quantidade (absolute)    │ |novo - anterior|             │
//! └──────────┴──────────────────────────┴───────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoMovimentacao {
    Entrada,
    Saida,
    Ajuste,
}

impl TipoMovimentacao {
    pub fn label(&self) -> &'static str {
        match self {
            TipoMovimentacao::Entrada => "Entrada",
            TipoMovimentacao::Saida => "Saída",
            TipoMovimentacao::Ajuste => "Ajuste",
        }
    }
}

/// Why the stock changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MotivoMovimentacao {
    Venda,
    Inventario,
    Ajuste,
    Devolucao,
    Perda,
    Outro,
}

impl MotivoMovimentacao {
    pub fn label(&self) -> &'static str {
        match self {
            MotivoMovimentacao::Venda => "Venda",
            MotivoMovimentacao::Inventario => "Inventário",
            MotivoMovimentacao::Ajuste => "Ajuste",
            MotivoMovimentacao::Devolucao => "Devolução",
            MotivoMovimentacao::Perda => "Perda",
            MotivoMovimentacao::Outro => "Outro",
        }
    }
}

/// A stock movement row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movimentacao {
    pub id: String,
    pub produto_id: String,
    pub tipo: TipoMovimentacao,
    pub quantidade: i64,
    pub saldo_anterior: i64,
    pub saldo_atual: i64,
    pub motivo: Option<MotivoMovimentacao>,
    pub observacoes: Option<String>,
    /// Sale id for movements created by the PDV.
    pub referencia_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Movement joined with the product name and SKU.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MovimentacaoDetalhe {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub movimentacao: Movimentacao,
    pub produto_nome: String,
    pub produto_sku: Option<String>,
}

/// Manual stock adjustment form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AjusteEstoqueInput {
    pub produto_id: String,
    pub tipo: TipoMovimentacao,
    pub quantidade: i64,
    pub motivo: Option<MotivoMovimentacao>,
    pub observacoes: Option<String>,
}

/// Outcome of applying an adjustment to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AjusteCalculado {
    pub saldo_anterior: i64,
    pub saldo_atual: i64,
    /// Quantity written to the movement row.
    pub quantidade: i64,
}

/// Applies an adjustment to the current balance.
///
/// # Errors
/// - `InvalidQuantity` when `quantidade <= 0`
/// - `InsufficientStock` when a saida would leave the balance below zero
pub fn calcular_ajuste(
    produto: &str,
    saldo_anterior: i64,
    tipo: TipoMovimentacao,
    quantidade: i64,
) -> CoreResult<AjusteCalculado> {
    if quantidade <= 0 {
        return Err(CoreError::InvalidQuantity);
    }

    let (saldo_atual, registrada) = match tipo {
        TipoMovimentacao::Entrada => (saldo_anterior + quantidade, quantidade),
        TipoMovimentacao::Saida => {
            if quantidade > saldo_anterior {
                return Err(CoreError::InsufficientStock {
                    produto: produto.to_string(),
                    available: saldo_anterior,
                    requested: quantidade,
                });
            }
            (saldo_anterior - quantidade, quantidade)
        }
        TipoMovimentacao::Ajuste => (quantidade, (quantidade - saldo_anterior).abs()),
    };

    Ok(AjusteCalculado {
        saldo_anterior,
        saldo_atual,
        quantidade: registrada,
    })
}
