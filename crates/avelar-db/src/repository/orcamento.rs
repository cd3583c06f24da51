//! # Quote Repository

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::validation::validate_quantity;
use avelar_core::{
    validade_orcamento, CoreError, ItemOrcamentoInput, Orcamento, OrcamentoItemDetalhe,
    OrcamentoResumo, StatusOrcamento,
};

use crate::error::{DbError, DbResult};

const ORCAMENTO_COLUMNS: &str = "o.id, o.cliente_id, o.total, o.status, o.data_validade, o.created_at";

#[derive(Debug, Clone)]
pub struct OrcamentoRepository {
    pool: SqlitePool,
}

impl OrcamentoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrcamentoRepository { pool }
    }

    /// Saves a quote and its lines in one transaction. The quote is valid
    /// for seven days from `today`.
    ///
    /// # Errors
    /// `EmptyQuote` without lines, then `MissingCustomer` without a customer.
    pub async fn salvar(
        &self,
        cliente_id: Option<&str>,
        itens: &[ItemOrcamentoInput],
        today: NaiveDate,
    ) -> DbResult<Orcamento> {
        if itens.is_empty() {
            return Err(CoreError::EmptyQuote.into());
        }
        let cliente_id = cliente_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(CoreError::MissingCustomer)?;
        for item in itens {
            validate_quantity(item.quantidade)?;
        }

        let orcamento = Orcamento {
            id: Uuid::new_v4().to_string(),
            cliente_id: cliente_id.to_string(),
            total: itens.iter().map(|i| i.preco_unitario * i.quantidade).sum(),
            status: StatusOrcamento::Pendente,
            data_validade: validade_orcamento(today),
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orcamentos (id, cliente_id, total, status, data_validade, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&orcamento.id)
        .bind(&orcamento.cliente_id)
        .bind(orcamento.total)
        .bind(orcamento.status)
        .bind(orcamento.data_validade)
        .bind(orcamento.created_at)
        .execute(&mut *tx)
        .await?;

        for item in itens {
            sqlx::query(
                "INSERT INTO orcamento_itens (
                    id, orcamento_id, produto_id, quantidade, preco_unitario, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&orcamento.id)
            .bind(&item.produto_id)
            .bind(item.quantidade)
            .bind(item.preco_unitario)
            .bind(item.preco_unitario * item.quantidade)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %orcamento.id,
            itens = itens.len(),
            total = orcamento.total,
            "Quote saved"
        );
        Ok(orcamento)
    }

    /// Quotes newest first, with the customer name.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<OrcamentoResumo>> {
        let sql = format!(
            "SELECT {ORCAMENTO_COLUMNS}, c.nome AS cliente_nome
             FROM orcamentos o
             LEFT JOIN clientes c ON c.id = o.cliente_id
             ORDER BY o.created_at DESC
             LIMIT ?1"
        );
        let orcamentos = sqlx::query_as::<_, OrcamentoResumo>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = orcamentos.len(), "Listed quotes");
        Ok(orcamentos)
    }

    pub async fn get(&self, id: &str) -> DbResult<Orcamento> {
        let sql = format!("SELECT {ORCAMENTO_COLUMNS} FROM orcamentos o WHERE o.id = ?1");
        sqlx::query_as::<_, Orcamento>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Orçamento", id))
    }

    pub async fn itens(&self, orcamento_id: &str) -> DbResult<Vec<OrcamentoItemDetalhe>> {
        let itens = sqlx::query_as::<_, OrcamentoItemDetalhe>(
            "SELECT oi.produto_id, p.nome AS produto_nome, p.marca,
                    oi.quantidade, oi.preco_unitario, oi.subtotal
             FROM orcamento_itens oi
             JOIN produtos p ON p.id = oi.produto_id
             WHERE oi.orcamento_id = ?1
             ORDER BY p.nome",
        )
        .bind(orcamento_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn atualizar_status(&self, id: &str, status: StatusOrcamento) -> DbResult<Orcamento> {
        let result = sqlx::query("UPDATE orcamentos SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Orçamento", id));
        }

        info!(id = %id, status = status.label(), "Quote status changed");
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, produto, setup};
    use avelar_core::CategoriaProduto;

    fn item(produto_id: &str, quantidade: i64, preco_unitario: i64) -> ItemOrcamentoInput {
        ItemOrcamentoInput {
            produto_id: produto_id.to_string(),
            quantidade,
            preco_unitario,
        }
    }

    #[tokio::test]
    async fn test_salvar_quote() {
        let db = setup().await;
        let c = cliente(&db, "Helena Costa").await;
        // quotes ignore stock
        let lente = produto(&db, "Varilux Comfort", CategoriaProduto::Lente, 89_000, 0).await;
        let armacao = produto(&db, "Armação Tom Ford", CategoriaProduto::Armacao, 120_000, 1).await;
        let today = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();

        let orcamento = db
            .orcamentos()
            .salvar(
                Some(&c.id),
                &[item(&lente.id, 2, 89_000), item(&armacao.id, 1, 120_000)],
                today,
            )
            .await
            .unwrap();

        assert_eq!(orcamento.total, 298_000);
        assert_eq!(orcamento.status, StatusOrcamento::Pendente);
        assert_eq!(orcamento.data_validade, NaiveDate::from_ymd_opt(2025, 7, 5).unwrap());

        let itens = db.orcamentos().itens(&orcamento.id).await.unwrap();
        assert_eq!(itens.len(), 2);
        assert_eq!(itens[0].produto_nome, "Armação Tom Ford");
        assert_eq!(itens[1].subtotal, 178_000);

        let lista = db.orcamentos().list(50).await.unwrap();
        assert_eq!(lista[0].cliente_nome.as_deref(), Some("Helena Costa"));
    }

    #[tokio::test]
    async fn test_salvar_errors() {
        let db = setup().await;
        let today = chrono::Local::now().date_naive();
        let p = produto(&db, "Estojo", CategoriaProduto::Acessorio, 2_500, 10).await;

        let err = db.orcamentos().salvar(Some("c1"), &[], today).await.unwrap_err();
        assert_eq!(err.to_string(), "Adicione produtos ao orçamento!");

        let err = db
            .orcamentos()
            .salvar(None, &[item(&p.id, 1, 2_500)], today)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Selecione um cliente!");

        assert!(db.orcamentos().list(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_atualizar_status() {
        let db = setup().await;
        let c = cliente(&db, "Igor").await;
        let p = produto(&db, "Cordão", CategoriaProduto::Acessorio, 1_500, 10).await;
        let today = chrono::Local::now().date_naive();
        let o = db
            .orcamentos()
            .salvar(Some(&c.id), &[item(&p.id, 1, 1_500)], today)
            .await
            .unwrap();

        let aprovado = db
            .orcamentos()
            .atualizar_status(&o.id, StatusOrcamento::Aprovado)
            .await
            .unwrap();
        assert_eq!(aprovado.status, StatusOrcamento::Aprovado);

        let err = db
            .orcamentos()
            .atualizar_status("nao-existe", StatusOrcamento::Rejeitado)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
