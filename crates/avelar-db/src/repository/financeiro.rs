//! # Financial Ledger Repository
//!
//! Receivables and payables in `financeiro_movimentacoes`. The monthly
//! summary math lives in avelar-core; this module only picks the rows.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::dates::{first_day_of_month, last_day_of_month};
use avelar_core::{
    metricas_financeiras, resumo_financeiro, Lancamento, LancamentoInput, MetricasFinanceiras,
    ResumoFinanceiro, StatusLancamento,
};

use crate::error::{DbError, DbResult};

const LANCAMENTO_COLUMNS: &str = "id, tipo, categoria, descricao, valor, data_vencimento, \
     data_pagamento, observacoes, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct FinanceiroRepository {
    pool: SqlitePool,
}

impl FinanceiroRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FinanceiroRepository { pool }
    }

    /// Entries by due date, earliest first.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<Lancamento>> {
        let sql = format!(
            "SELECT {LANCAMENTO_COLUMNS} FROM financeiro_movimentacoes
             ORDER BY data_vencimento, created_at
             LIMIT ?1"
        );
        let lancamentos = sqlx::query_as::<_, Lancamento>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = lancamentos.len(), "Listed ledger entries");
        Ok(lancamentos)
    }

    pub async fn get(&self, id: &str) -> DbResult<Lancamento> {
        let sql = format!("SELECT {LANCAMENTO_COLUMNS} FROM financeiro_movimentacoes WHERE id = ?1");
        sqlx::query_as::<_, Lancamento>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Lançamento", id))
    }

    /// New entries start as `pendente`.
    pub async fn create(&self, input: LancamentoInput) -> DbResult<Lancamento> {
        let input = input.validate()?;
        let now = Utc::now();
        let lancamento = Lancamento {
            id: Uuid::new_v4().to_string(),
            tipo: input.tipo,
            categoria: input.categoria,
            descricao: input.descricao,
            valor: input.valor,
            data_vencimento: input.data_vencimento,
            data_pagamento: input.data_pagamento,
            observacoes: input.observacoes,
            status: StatusLancamento::Pendente,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO financeiro_movimentacoes (
                id, tipo, categoria, descricao, valor, data_vencimento, data_pagamento,
                observacoes, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&lancamento.id)
        .bind(lancamento.tipo)
        .bind(&lancamento.categoria)
        .bind(&lancamento.descricao)
        .bind(lancamento.valor)
        .bind(lancamento.data_vencimento)
        .bind(lancamento.data_pagamento)
        .bind(&lancamento.observacoes)
        .bind(lancamento.status)
        .bind(lancamento.created_at)
        .bind(lancamento.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %lancamento.id, tipo = ?lancamento.tipo, "Created ledger entry");
        Ok(lancamento)
    }

    /// Edits the form fields. The status is left alone.
    pub async fn update(&self, id: &str, input: LancamentoInput) -> DbResult<Lancamento> {
        let input = input.validate()?;

        let result = sqlx::query(
            "UPDATE financeiro_movimentacoes SET
                tipo = ?2, categoria = ?3, descricao = ?4, valor = ?5,
                data_vencimento = ?6, data_pagamento = ?7, observacoes = ?8, updated_at = ?9
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.tipo)
        .bind(&input.categoria)
        .bind(&input.descricao)
        .bind(input.valor)
        .bind(input.data_vencimento)
        .bind(input.data_pagamento)
        .bind(&input.observacoes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Lançamento", id));
        }
        self.get(id).await
    }

    pub async fn marcar_como_pago(&self, id: &str, today: NaiveDate) -> DbResult<Lancamento> {
        let result = sqlx::query(
            "UPDATE financeiro_movimentacoes
             SET status = ?2, data_pagamento = ?3, updated_at = ?4
             WHERE id = ?1",
        )
        .bind(id)
        .bind(StatusLancamento::Pago)
        .bind(today)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Lançamento", id));
        }

        info!(id = %id, data_pagamento = %today, "Payment registered");
        self.get(id).await
    }

    /// Flags pending entries past their due date. Returns how many changed.
    pub async fn atualizar_vencidos(&self, today: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE financeiro_movimentacoes
             SET status = ?1, updated_at = ?2
             WHERE status = ?3 AND data_vencimento < ?4",
        )
        .bind(StatusLancamento::Vencido)
        .bind(Utc::now())
        .bind(StatusLancamento::Pendente)
        .bind(today)
        .execute(&self.pool)
        .await?;

        let count = result.rows_affected();
        if count > 0 {
            info!(count, "Ledger entries marked as overdue");
        }
        Ok(count)
    }

    pub async fn resumo(&self, today: NaiveDate) -> DbResult<ResumoFinanceiro> {
        let lancamentos = self.relevantes_no_mes(today).await?;
        Ok(resumo_financeiro(&lancamentos, today))
    }

    pub async fn metricas(&self, today: NaiveDate) -> DbResult<MetricasFinanceiras> {
        let lancamentos = self.relevantes_no_mes(today).await?;
        Ok(metricas_financeiras(&lancamentos, today))
    }

    /// Paid this month, plus everything still pending.
    async fn relevantes_no_mes(&self, today: NaiveDate) -> DbResult<Vec<Lancamento>> {
        let sql = format!(
            "SELECT {LANCAMENTO_COLUMNS} FROM financeiro_movimentacoes
             WHERE status = 'pendente'
                OR (status = 'pago' AND data_pagamento BETWEEN ?1 AND ?2)"
        );
        let lancamentos = sqlx::query_as::<_, Lancamento>(&sql)
            .bind(first_day_of_month(today))
            .bind(last_day_of_month(today))
            .fetch_all(&self.pool)
            .await?;
        Ok(lancamentos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup;
    use avelar_core::TipoLancamento;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input(tipo: TipoLancamento, valor: i64, vencimento: NaiveDate) -> LancamentoInput {
        LancamentoInput {
            tipo,
            categoria: Some("Operacional".to_string()),
            descricao: "Lançamento".to_string(),
            valor,
            data_vencimento: vencimento,
            data_pagamento: None,
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn test_list_ordered_by_vencimento() {
        let db = setup().await;
        let repo = db.financeiro();
        repo.create(input(TipoLancamento::Despesa, 100, d(2025, 3, 20))).await.unwrap();
        repo.create(input(TipoLancamento::Receita, 200, d(2025, 3, 5))).await.unwrap();

        let lista = repo.list(100).await.unwrap();
        assert_eq!(lista[0].data_vencimento, d(2025, 3, 5));
        assert_eq!(lista[0].status, StatusLancamento::Pendente);
    }

    #[tokio::test]
    async fn test_valor_must_be_positive() {
        let db = setup().await;
        let err = db
            .financeiro()
            .create(input(TipoLancamento::Receita, 0, d(2025, 3, 5)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "valor deve ser maior que zero");
    }

    #[tokio::test]
    async fn test_pagamento_vencidos_and_resumo() {
        let db = setup().await;
        let repo = db.financeiro();
        let today = d(2025, 3, 15);

        let aluguel = repo.create(input(TipoLancamento::Despesa, 300_000, d(2025, 3, 10))).await.unwrap();
        let venda = repo.create(input(TipoLancamento::Receita, 500_000, d(2025, 3, 12))).await.unwrap();
        repo.create(input(TipoLancamento::Receita, 80_000, d(2025, 3, 30))).await.unwrap();
        repo.create(input(TipoLancamento::Despesa, 20_000, d(2025, 3, 1))).await.unwrap();

        let pago = repo.marcar_como_pago(&venda.id, today).await.unwrap();
        assert_eq!(pago.status, StatusLancamento::Pago);
        assert_eq!(pago.data_pagamento, Some(today));
        repo.marcar_como_pago(&aluguel.id, today).await.unwrap();

        assert_eq!(repo.atualizar_vencidos(today).await.unwrap(), 1);

        let resumo = repo.resumo(today).await.unwrap();
        assert_eq!(resumo.receitas_mes, 500_000);
        assert_eq!(resumo.despesas_mes, 300_000);
        assert_eq!(resumo.saldo_mes, 200_000);
        assert_eq!(resumo.contas_receber, 80_000);
        assert_eq!(resumo.contas_pagar, 0);

        let metricas = repo.metricas(today).await.unwrap();
        assert_eq!(metricas.lucro, 200_000);
        assert!((metricas.margem - 40.0).abs() < 1e-9);
    }
}
