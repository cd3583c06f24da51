//! # Financial Commands
//!
//! Receivables and payables. Overdue entries are marked on demand by
//! `atualizar_vencidos`; there is no background job.

use avelar_core::{Lancamento, LancamentoInput, MetricasFinanceiras, ResumoFinanceiro};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;

const LIST_LIMIT: i64 = 100;

/// Entries by due date, first 100.
pub async fn list_lancamentos(db: &DbState) -> ApiResult<Vec<Lancamento>> {
    debug!("list_lancamentos command");
    Ok(db.inner().financeiro().list(LIST_LIMIT).await?)
}

pub async fn get_lancamento(db: &DbState, id: &str) -> ApiResult<Lancamento> {
    Ok(db.inner().financeiro().get(id).await?)
}

pub async fn create_lancamento(db: &DbState, input: LancamentoInput) -> ApiResult<Lancamento> {
    debug!(tipo = ?input.tipo, valor = input.valor, "create_lancamento command");
    Ok(db.inner().financeiro().create(input).await?)
}

pub async fn update_lancamento(
    db: &DbState,
    id: &str,
    input: LancamentoInput,
) -> ApiResult<Lancamento> {
    Ok(db.inner().financeiro().update(id, input).await?)
}

pub async fn marcar_como_pago(db: &DbState, id: &str, today: NaiveDate) -> ApiResult<Lancamento> {
    Ok(db.inner().financeiro().marcar_como_pago(id, today).await?)
}

/// Marks pending entries due before `today` as vencido; returns how many.
pub async fn atualizar_vencidos(db: &DbState, today: NaiveDate) -> ApiResult<u64> {
    Ok(db.inner().financeiro().atualizar_vencidos(today).await?)
}

pub async fn resumo_financeiro(db: &DbState, today: NaiveDate) -> ApiResult<ResumoFinanceiro> {
    Ok(db.inner().financeiro().resumo(today).await?)
}

/// Month totals for the reports screen.
pub async fn metricas_financeiras(db: &DbState, today: NaiveDate) -> ApiResult<MetricasFinanceiras> {
    Ok(db.inner().financeiro().metricas(today).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use avelar_core::{StatusLancamento, TipoLancamento};

    fn lancamento(tipo: TipoLancamento, valor: i64, vencimento: NaiveDate) -> LancamentoInput {
        LancamentoInput {
            tipo,
            categoria: None,
            descricao: "Fornecedor Zeiss".to_string(),
            valor,
            data_vencimento: vencimento,
            data_pagamento: None,
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn test_pay_and_summarize() {
        let db = test_support::db().await;
        let today = test_support::today();

        let receita = create_lancamento(&db, lancamento(TipoLancamento::Receita, 50_000, today))
            .await
            .unwrap();
        assert_eq!(receita.status, StatusLancamento::Pendente);
        create_lancamento(
            &db,
            lancamento(TipoLancamento::Despesa, 20_000, today.pred_opt().unwrap()),
        )
        .await
        .unwrap();

        assert_eq!(atualizar_vencidos(&db, today).await.unwrap(), 1);

        let pago = marcar_como_pago(&db, &receita.id, today).await.unwrap();
        assert_eq!(pago.status, StatusLancamento::Pago);
        assert_eq!(pago.data_pagamento, Some(today));

        let resumo = resumo_financeiro(&db, today).await.unwrap();
        assert_eq!(resumo.receitas_mes, 50_000);
        assert_eq!(resumo.despesas_mes, 0);

        let metricas = metricas_financeiras(&db, today).await.unwrap();
        assert_eq!(metricas.total_receitas, 50_000);
        assert_eq!(list_lancamentos(&db).await.unwrap().len(), 2);
    }
}
