//! Quotes (orçamentos): a priced list of products for a customer, valid for
//! a week, that the customer approves or rejects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::add_days;

/// How long a quote stays valid.
pub const VALIDADE_ORCAMENTO_DIAS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrcamento {
    #[default]
    Pendente,
    Aprovado,
    Rejeitado,
}

impl StatusOrcamento {
    pub fn label(&self) -> &'static str {
        match self {
            StatusOrcamento::Pendente => "Pendente",
            StatusOrcamento::Aprovado => "Aprovado",
            StatusOrcamento::Rejeitado => "Rejeitado",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Orcamento {
    pub id: String,
    pub cliente_id: String,
    pub total: i64,
    pub status: StatusOrcamento,
    #[ts(as = "String")]
    pub data_validade: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Orcamento {
    pub fn is_expirado(&self, today: NaiveDate) -> bool {
        self.status == StatusOrcamento::Pendente && self.data_validade < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrcamentoResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub orcamento: Orcamento,
    pub cliente_nome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrcamentoItem {
    pub id: String,
    pub orcamento_id: String,
    pub produto_id: String,
    pub quantidade: i64,
    pub preco_unitario: i64,
    pub subtotal: i64,
}

/// Quote line joined with the product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrcamentoItemDetalhe {
    pub produto_id: String,
    pub produto_nome: String,
    pub marca: Option<String>,
    pub quantidade: i64,
    pub preco_unitario: i64,
    pub subtotal: i64,
}

/// Line handed to quote creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemOrcamentoInput {
    pub produto_id: String,
    pub quantidade: i64,
    pub preco_unitario: i64,
}

/// Validity date of a quote created on `today`.
pub fn validade_orcamento(today: NaiveDate) -> NaiveDate {
    add_days(today, VALIDADE_ORCAMENTO_DIAS)
}
