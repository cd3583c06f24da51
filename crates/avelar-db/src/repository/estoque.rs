//! # Stock Repository
//!
//! Stock levels and the movement log.
//!
//! ## Adjustment Flow
//! ```text
//! ajustar(produto, saida, 3)
//!      │
//!      ▼
//! BEGIN ── read estoque_atual (5)
//!      │
//!      ▼
//! calcular_ajuste → saldo 5 → 2, quantidade 3
//!      │
//!      ├── UPDATE produtos SET estoque_atual = 2
//!      └── INSERT estoque_movimentacoes (saida, 3, 5 → 2)
//!      │
//!      ▼
//! COMMIT
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::{
    calcular_ajuste, AjusteEstoqueInput, CategoriaProduto, Movimentacao, MovimentacaoDetalhe,
    Produto,
};

use crate::error::{DbError, DbResult};
use crate::repository::produto::PRODUTO_COLUMNS;

#[derive(Debug, Clone)]
pub struct EstoqueRepository {
    pool: SqlitePool,
}

impl EstoqueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EstoqueRepository { pool }
    }

    /// Products ordered by name, optionally of one category.
    pub async fn list(&self, categoria: Option<CategoriaProduto>) -> DbResult<Vec<Produto>> {
        let produtos = match categoria {
            Some(categoria) => {
                let sql = format!(
                    "SELECT {PRODUTO_COLUMNS} FROM produtos WHERE categoria = ?1 ORDER BY nome"
                );
                sqlx::query_as::<_, Produto>(&sql)
                    .bind(categoria)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {PRODUTO_COLUMNS} FROM produtos ORDER BY nome");
                sqlx::query_as::<_, Produto>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!(count = produtos.len(), categoria = ?categoria, "Listed stock");
        Ok(produtos)
    }

    /// Applies an entrada, saida or ajuste and records the movement.
    pub async fn ajustar(&self, input: AjusteEstoqueInput) -> DbResult<Movimentacao> {
        let mut tx = self.pool.begin().await?;

        let (nome, saldo_anterior): (String, i64) =
            sqlx::query_as("SELECT nome, estoque_atual FROM produtos WHERE id = ?1")
                .bind(&input.produto_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Produto", &input.produto_id))?;

        let ajuste = calcular_ajuste(&nome, saldo_anterior, input.tipo, input.quantidade)?;

        sqlx::query("UPDATE produtos SET estoque_atual = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&input.produto_id)
            .bind(ajuste.saldo_atual)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        let movimentacao = Movimentacao {
            id: Uuid::new_v4().to_string(),
            produto_id: input.produto_id,
            tipo: input.tipo,
            quantidade: ajuste.quantidade,
            saldo_anterior: ajuste.saldo_anterior,
            saldo_atual: ajuste.saldo_atual,
            motivo: input.motivo,
            observacoes: avelar_core::validation::normalize_optional(input.observacoes),
            referencia_id: None,
            created_at: Utc::now(),
        };
        insert_movimentacao(&mut *tx, &movimentacao).await?;

        tx.commit().await?;

        info!(
            produto_id = %movimentacao.produto_id,
            tipo = ?movimentacao.tipo,
            saldo_anterior = movimentacao.saldo_anterior,
            saldo_atual = movimentacao.saldo_atual,
            "Stock adjusted"
        );
        Ok(movimentacao)
    }

    /// Latest movements with product name and SKU.
    pub async fn movimentacoes(&self, limit: i64) -> DbResult<Vec<MovimentacaoDetalhe>> {
        let movimentacoes = sqlx::query_as::<_, MovimentacaoDetalhe>(
            "SELECT m.id, m.produto_id, m.tipo, m.quantidade, m.saldo_anterior, m.saldo_atual,
                    m.motivo, m.observacoes, m.referencia_id, m.created_at,
                    p.nome AS produto_nome, p.sku AS produto_sku
             FROM estoque_movimentacoes m
             JOIN produtos p ON p.id = m.produto_id
             ORDER BY m.created_at DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movimentacoes)
    }

    pub async fn movimentacoes_produto(&self, produto_id: &str) -> DbResult<Vec<Movimentacao>> {
        let movimentacoes = sqlx::query_as::<_, Movimentacao>(
            "SELECT id, produto_id, tipo, quantidade, saldo_anterior, saldo_atual,
                    motivo, observacoes, referencia_id, created_at
             FROM estoque_movimentacoes
             WHERE produto_id = ?1
             ORDER BY created_at DESC",
        )
        .bind(produto_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movimentacoes)
    }

    /// Active products with fewer than `threshold` units, lowest first.
    pub async fn estoque_baixo(&self, threshold: i64, limit: i64) -> DbResult<Vec<Produto>> {
        let sql = format!(
            "SELECT {PRODUTO_COLUMNS} FROM produtos
             WHERE ativo = 1 AND estoque_atual < ?1
             ORDER BY estoque_atual, nome
             LIMIT ?2"
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(threshold)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }
}

/// Inserts a movement on an open connection, so callers can include it in
/// their own transaction.
pub(crate) async fn insert_movimentacao(
    conn: &mut SqliteConnection,
    movimentacao: &Movimentacao,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO estoque_movimentacoes (
            id, produto_id, tipo, quantidade, saldo_anterior, saldo_atual,
            motivo, observacoes, referencia_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&movimentacao.id)
    .bind(&movimentacao.produto_id)
    .bind(movimentacao.tipo)
    .bind(movimentacao.quantidade)
    .bind(movimentacao.saldo_anterior)
    .bind(movimentacao.saldo_atual)
    .bind(movimentacao.motivo)
    .bind(&movimentacao.observacoes)
    .bind(&movimentacao.referencia_id)
    .bind(movimentacao.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
