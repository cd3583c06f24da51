//! # Dashboard Repository
//!
//! Headline counters, the latest sales and the stock alerts shown on the
//! home screen.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use avelar_core::dates::first_day_of_month;
use avelar_core::{
    AlertaEstoque, DashboardData, DashboardStats, ProdutoEstoqueBaixo, StatusVenda, VendaResumo,
    LOW_STOCK_THRESHOLD, RECENT_LIMIT,
};

use crate::error::DbResult;
use crate::repository::VendaRepository;

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn stats(&self, today: NaiveDate) -> DbResult<DashboardStats> {
        let vendas_hoje: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vendas WHERE date(created_at, 'localtime') = ?1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        let total_clientes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clientes")
            .fetch_one(&self.pool)
            .await?;

        let estoque_baixo: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM produtos WHERE ativo = 1 AND estoque_atual < ?1",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;

        let faturamento_mes: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total), 0) FROM vendas
             WHERE status = ?1 AND date(created_at, 'localtime') >= ?2",
        )
        .bind(StatusVenda::Concluida)
        .bind(first_day_of_month(today))
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            vendas_hoje,
            total_clientes,
            estoque_baixo,
            faturamento_mes,
        })
    }

    pub async fn vendas_recentes(&self, limit: i64) -> DbResult<Vec<VendaResumo>> {
        VendaRepository::new(self.pool.clone()).list(limit).await
    }

    /// Active products under the low-stock threshold, lowest stock first.
    pub async fn alertas_estoque(&self, limit: i64) -> DbResult<Vec<AlertaEstoque>> {
        let produtos = sqlx::query_as::<_, ProdutoEstoqueBaixo>(
            "SELECT id, nome, estoque_atual FROM produtos
             WHERE ativo = 1 AND estoque_atual < ?1
             ORDER BY estoque_atual, nome
             LIMIT ?2",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(produtos.into_iter().map(AlertaEstoque::from).collect())
    }

    /// Everything the dashboard renders in one call.
    pub async fn data(&self, today: NaiveDate) -> DbResult<DashboardData> {
        let data = DashboardData {
            stats: self.stats(today).await?,
            vendas_recentes: self.vendas_recentes(RECENT_LIMIT).await?,
            alertas_estoque: self.alertas_estoque(RECENT_LIMIT).await?,
        };

        debug!(
            vendas_hoje = data.stats.vendas_hoje,
            alertas = data.alertas_estoque.len(),
            "Loaded dashboard"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, produto, setup, vender};
    use avelar_core::{CategoriaProduto, NivelAlerta};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = setup().await;
        let today = chrono::Local::now().date_naive();

        let data = db.dashboard().data(today).await.unwrap();
        assert_eq!(data.stats, DashboardStats::default());
        assert!(data.vendas_recentes.is_empty());
        assert!(data.alertas_estoque.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_alerts() {
        let db = setup().await;
        let today = chrono::Local::now().date_naive();

        cliente(&db, "Fernanda").await;
        cliente(&db, "Gustavo").await;
        let armacao = produto(&db, "Armação Aviador", CategoriaProduto::Armacao, 30_000, 10).await;
        let solucao = produto(&db, "Solução Opti-Free", CategoriaProduto::Solucao, 4_500, 3).await;
        produto(&db, "Lente Transitions", CategoriaProduto::Lente, 60_000, 1).await;

        vender(&db, &[(&armacao, 2)]).await;
        vender(&db, &[(&solucao, 1)]).await;

        let stats = db.dashboard().stats(today).await.unwrap();
        assert_eq!(stats.vendas_hoje, 2);
        assert_eq!(stats.total_clientes, 2);
        // solução left with 2, transitions with 1
        assert_eq!(stats.estoque_baixo, 2);
        assert_eq!(stats.faturamento_mes, 64_500);

        let alertas = db.dashboard().alertas_estoque(5).await.unwrap();
        assert_eq!(alertas[0].nome, "Lente Transitions");
        assert_eq!(alertas[0].nivel, NivelAlerta::Critico);
        assert_eq!(alertas[1].nivel, NivelAlerta::Baixo);

        let recentes = db.dashboard().vendas_recentes(5).await.unwrap();
        assert_eq!(recentes.len(), 2);
        assert_eq!(recentes[0].cliente_display(), "Cliente");
    }
}
