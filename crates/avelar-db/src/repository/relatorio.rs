//! # Report Repository
//!
//! Fetches the rows behind the Relatórios screen; the math lives in
//! `avelar_core::report`.

use sqlx::SqlitePool;
use tracing::debug;

use avelar_core::{
    relatorio_vendas, Periodo, ProdutoMaisVendido, RelatorioVendas, StatusVenda, VendaDoPeriodo,
};

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct RelatorioRepository {
    pool: SqlitePool,
}

impl RelatorioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RelatorioRepository { pool }
    }

    /// Completed sales whose local calendar day falls in the period, end
    /// day included.
    pub async fn vendas(&self, periodo: Periodo) -> DbResult<RelatorioVendas> {
        let vendas = sqlx::query_as::<_, VendaDoPeriodo>(
            "SELECT date(created_at, 'localtime') AS dia, total
             FROM vendas
             WHERE status = ?1
               AND date(created_at, 'localtime') BETWEEN ?2 AND ?3
             ORDER BY created_at",
        )
        .bind(StatusVenda::Concluida)
        .bind(periodo.inicio)
        .bind(periodo.fim)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            inicio = %periodo.inicio,
            fim = %periodo.fim,
            count = vendas.len(),
            "Built sales report"
        );
        Ok(relatorio_vendas(periodo, &vendas))
    }

    /// Best sellers by quantity, grouped by product name.
    pub async fn produtos_mais_vendidos(&self, limit: i64) -> DbResult<Vec<ProdutoMaisVendido>> {
        let produtos = sqlx::query_as::<_, ProdutoMaisVendido>(
            "SELECT p.nome AS nome,
                    SUM(vi.quantidade) AS quantidade,
                    SUM(vi.subtotal) AS total
             FROM venda_itens vi
             JOIN produtos p ON p.id = vi.produto_id
             JOIN vendas v ON v.id = vi.venda_id
             WHERE v.status = ?1
             GROUP BY p.nome
             ORDER BY quantidade DESC, p.nome
             LIMIT ?2",
        )
        .bind(StatusVenda::Concluida)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(produtos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{produto, setup, vender};
    use avelar_core::{periodo_padrao, CategoriaProduto};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_relatorio_vendas_current_month() {
        let db = setup().await;
        let today = chrono::Local::now().date_naive();
        let p = produto(&db, "Óculos de Sol Polarizado", CategoriaProduto::Armacao, 25_000, 10).await;

        vender(&db, &[(&p, 1)]).await;
        vender(&db, &[(&p, 2)]).await;

        let r = db.relatorios().vendas(periodo_padrao(today)).await.unwrap();
        assert_eq!(r.total_vendas, 2);
        assert_eq!(r.total_faturado, 75_000);
        assert_eq!(r.ticket_medio, 37_500);
        assert_eq!(r.vendas_por_dia.len(), 1);
        assert_eq!(r.vendas_por_dia[0].1, 2);

        let passado = Periodo {
            inicio: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            fim: NaiveDate::from_ymd_opt(2001, 1, 31).unwrap(),
        };
        let vazio = db.relatorios().vendas(passado).await.unwrap();
        assert_eq!(vazio.total_vendas, 0);
        assert_eq!(vazio.ticket_medio, 0);
    }

    #[tokio::test]
    async fn test_produtos_mais_vendidos() {
        let db = setup().await;
        let lente = produto(&db, "Lente Crizal", CategoriaProduto::Lente, 40_000, 20).await;
        let estojo = produto(&db, "Estojo Rígido", CategoriaProduto::Acessorio, 2_000, 20).await;
        let flanela = produto(&db, "Flanela", CategoriaProduto::Acessorio, 500, 20).await;

        vender(&db, &[(&lente, 2), (&estojo, 3)]).await;
        vender(&db, &[(&estojo, 2), (&flanela, 2)]).await;

        let top = db.relatorios().produtos_mais_vendidos(10).await.unwrap();
        let nomes: Vec<_> = top.iter().map(|p| p.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Estojo Rígido", "Flanela", "Lente Crizal"]);
        assert_eq!(top[0].quantidade, 5);
        assert_eq!(top[0].total, 10_000);

        assert_eq!(db.relatorios().produtos_mais_vendidos(1).await.unwrap().len(), 1);
    }
}
