//! # Financial Ledger
//!
//! Receivables and payables with due dates. Monthly summaries are computed
//! here from plain rows so they can be tested without a database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::{first_day_of_month, last_day_of_month};
use crate::money::percentage_of;
use crate::validation::{
    normalize_optional, validate_max_len, validate_required, ValidationResult,
};
use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoLancamento {
    Receita,
    Despesa,
}

impl TipoLancamento {
    pub fn label(&self) -> &'static str {
        match self {
            TipoLancamento::Receita => "Receita",
            TipoLancamento::Despesa => "Despesa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusLancamento {
    #[default]
    Pendente,
    Pago,
    Vencido,
}

impl StatusLancamento {
    pub fn label(&self) -> &'static str {
        match self {
            StatusLancamento::Pendente => "Pendente",
            StatusLancamento::Pago => "Pago",
            StatusLancamento::Vencido => "Vencido",
        }
    }
}

/// A ledger entry (`financeiro_movimentacoes`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Lancamento {
    pub id: String,
    pub tipo: TipoLancamento,
    pub categoria: Option<String>,
    pub descricao: String,
    /// Amount in centavos, always positive; `tipo` gives the sign.
    pub valor: i64,
    #[ts(as = "String")]
    pub data_vencimento: NaiveDate,
    #[ts(as = "Option<String>")]
    pub data_pagamento: Option<NaiveDate>,
    pub observacoes: Option<String>,
    pub status: StatusLancamento,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Ledger entry form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LancamentoInput {
    pub tipo: TipoLancamento,
    pub categoria: Option<String>,
    pub descricao: String,
    pub valor: i64,
    #[ts(as = "String")]
    pub data_vencimento: NaiveDate,
    #[ts(as = "Option<String>")]
    pub data_pagamento: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

impl LancamentoInput {
    pub fn validate(self) -> ValidationResult<LancamentoInput> {
        let descricao = validate_required("descricao", &self.descricao)?;
        validate_max_len("descricao", &descricao, 200)?;
        if self.valor <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "valor".to_string(),
            });
        }

        Ok(LancamentoInput {
            tipo: self.tipo,
            categoria: normalize_optional(self.categoria),
            descricao,
            valor: self.valor,
            data_vencimento: self.data_vencimento,
            data_pagamento: self.data_pagamento,
            observacoes: normalize_optional(self.observacoes),
        })
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Monthly cash summary shown on top of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResumoFinanceiro {
    pub receitas_mes: i64,
    pub despesas_mes: i64,
    pub saldo_mes: i64,
    pub contas_receber: i64,
    pub contas_pagar: i64,
}

/// Paid entries of the current month, with the margin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MetricasFinanceiras {
    pub total_receitas: i64,
    pub total_despesas: i64,
    pub lucro: i64,
    /// Profit over revenue, in percent.
    pub margem: f64,
}

fn pago_no_mes(l: &Lancamento, today: NaiveDate) -> bool {
    let (inicio, fim) = (first_day_of_month(today), last_day_of_month(today));
    l.status == StatusLancamento::Pago
        && l.data_pagamento.is_some_and(|pagamento| pagamento >= inicio && pagamento <= fim)
}

fn soma(lancamentos: &[Lancamento], filtro: impl Fn(&Lancamento) -> bool) -> i64 {
    lancamentos.iter().filter(|l| filtro(l)).map(|l| l.valor).sum()
}

/// Builds the monthly summary.
///
/// - receitas/despesas: paid entries with `data_pagamento` in `today`'s month
/// - a receber / a pagar: pending entries due on or after `today`
pub fn resumo_financeiro(lancamentos: &[Lancamento], today: NaiveDate) -> ResumoFinanceiro {
    let receitas_mes = soma(lancamentos, |l| {
        l.tipo == TipoLancamento::Receita && pago_no_mes(l, today)
    });
    let despesas_mes = soma(lancamentos, |l| {
        l.tipo == TipoLancamento::Despesa && pago_no_mes(l, today)
    });
    let pendente_futuro =
        |l: &Lancamento| l.status == StatusLancamento::Pendente && l.data_vencimento >= today;

    ResumoFinanceiro {
        receitas_mes,
        despesas_mes,
        saldo_mes: receitas_mes - despesas_mes,
        contas_receber: soma(lancamentos, |l| {
            l.tipo == TipoLancamento::Receita && pendente_futuro(l)
        }),
        contas_pagar: soma(lancamentos, |l| {
            l.tipo == TipoLancamento::Despesa && pendente_futuro(l)
        }),
    }
}

/// Revenue, expenses, profit and margin of the paid entries in `today`'s month.
pub fn metricas_financeiras(lancamentos: &[Lancamento], today: NaiveDate) -> MetricasFinanceiras {
    let resumo = resumo_financeiro(lancamentos, today);
    let lucro = resumo.receitas_mes - resumo.despesas_mes;

    MetricasFinanceiras {
        total_receitas: resumo.receitas_mes,
        total_despesas: resumo.despesas_mes,
        lucro,
        margem: percentage_of(lucro, resumo.receitas_mes),
    }
}

/// A pending entry whose due date has passed.
pub fn is_lancamento_vencido(lancamento: &Lancamento, today: NaiveDate) -> bool {
    lancamento.status == StatusLancamento::Pendente && lancamento.data_vencimento < today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn lancamento(
        tipo: TipoLancamento,
        valor: i64,
        status: StatusLancamento,
        vencimento: NaiveDate,
        pagamento: Option<NaiveDate>,
    ) -> Lancamento {
        let now = Utc::now();
        Lancamento {
            id: uuid::Uuid::new_v4().to_string(),
            tipo,
            categoria: None,
            descricao: "Teste".to_string(),
            valor,
            data_vencimento: vencimento,
            data_pagamento: pagamento,
            observacoes: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resumo_financeiro() {
        let today = d(2025, 5, 15);
        let rows = vec![
            // paid this month
            lancamento(TipoLancamento::Receita, 100_000, StatusLancamento::Pago, d(2025, 5, 2), Some(d(2025, 5, 3))),
            lancamento(TipoLancamento::Despesa, 30_000, StatusLancamento::Pago, d(2025, 5, 10), Some(d(2025, 5, 10))),
            // paid last month
            lancamento(TipoLancamento::Receita, 999_999, StatusLancamento::Pago, d(2025, 4, 2), Some(d(2025, 4, 30))),
            // pending, due in the future
            lancamento(TipoLancamento::Receita, 20_000, StatusLancamento::Pendente, d(2025, 5, 15), None),
            lancamento(TipoLancamento::Despesa, 5_000, StatusLancamento::Pendente, d(2025, 6, 1), None),
            // pending but already past due
            lancamento(TipoLancamento::Despesa, 7_000, StatusLancamento::Pendente, d(2025, 5, 1), None),
        ];

        let resumo = resumo_financeiro(&rows, today);
        assert_eq!(resumo.receitas_mes, 100_000);
        assert_eq!(resumo.despesas_mes, 30_000);
        assert_eq!(resumo.saldo_mes, 70_000);
        assert_eq!(resumo.contas_receber, 20_000);
        assert_eq!(resumo.contas_pagar, 5_000);
    }

    #[test]
    fn test_metricas_margem() {
        let today = d(2025, 5, 15);
        let rows = vec![
            lancamento(TipoLancamento::Receita, 200_000, StatusLancamento::Pago, d(2025, 5, 2), Some(d(2025, 5, 2))),
            lancamento(TipoLancamento::Despesa, 50_000, StatusLancamento::Pago, d(2025, 5, 2), Some(d(2025, 5, 2))),
        ];
        let m = metricas_financeiras(&rows, today);
        assert_eq!(m.lucro, 150_000);
        assert!((m.margem - 75.0).abs() < f64::EPSILON);

        assert_eq!(metricas_financeiras(&[], today).margem, 0.0);
    }

    #[test]
    fn test_is_lancamento_vencido() {
        let today = d(2025, 5, 15);
        let l = lancamento(TipoLancamento::Despesa, 1, StatusLancamento::Pendente, d(2025, 5, 14), None);
        assert!(is_lancamento_vencido(&l, today));
        let l = lancamento(TipoLancamento::Despesa, 1, StatusLancamento::Pendente, d(2025, 5, 15), None);
        assert!(!is_lancamento_vencido(&l, today));
    }

    #[test]
    fn test_lancamento_input_validation() {
        let input = LancamentoInput {
            tipo: TipoLancamento::Despesa,
            categoria: Some(" ".to_string()),
            descricao: " Aluguel ".to_string(),
            valor: 0,
            data_vencimento: d(2025, 5, 10),
            data_pagamento: None,
            observacoes: None,
        };
        assert!(input.clone().validate().is_err());

        let ok = LancamentoInput { valor: 350_000, ..input }.validate().unwrap();
        assert_eq!(ok.descricao, "Aluguel");
        assert_eq!(ok.categoria, None);
    }
}
