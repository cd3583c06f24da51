//! # Sale Repository
//!
//! ## Sale Finalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalizar(cart items, cliente, forma_pagamento, desconto)              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── numero_venda = MAX(numero_venda) + 1                              │
//! │   ├── INSERT vendas (status concluida)                                  │
//! │   └── for each item                                                     │
//! │        ├── re-read estoque_atual, fail when short                       │
//! │        ├── INSERT venda_itens                                           │
//! │        ├── UPDATE produtos.estoque_atual                                │
//! │        └── INSERT estoque_movimentacoes (saida, motivo venda)           │
//! │  COMMIT  (any failure rolls back everything)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::validation::normalize_optional;
use avelar_core::{
    CoreError, FinalizarVendaInput, MotivoMovimentacao, Movimentacao, StatusVenda,
    TipoMovimentacao, Venda, VendaItemDetalhe, VendaResumo,
};

use crate::error::{DbError, DbResult};
use crate::repository::estoque::insert_movimentacao;

const VENDA_COLUMNS: &str = "v.id, v.numero_venda, v.cliente_id, v.subtotal, v.desconto, \
     v.total, v.forma_pagamento, v.status, v.observacoes, v.created_at";

#[derive(Debug, Clone)]
pub struct VendaRepository {
    pool: SqlitePool,
}

impl VendaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VendaRepository { pool }
    }

    /// Records a completed sale and takes its items out of stock.
    pub async fn finalizar(&self, input: FinalizarVendaInput) -> DbResult<Venda> {
        if input.itens.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        for item in &input.itens {
            avelar_core::validation::validate_quantity(item.quantidade)?;
        }

        let mut tx = self.pool.begin().await?;

        let numero_venda: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(numero_venda), 0) + 1 FROM vendas")
                .fetch_one(&mut *tx)
                .await?;

        let now = Utc::now();
        let venda = Venda {
            id: Uuid::new_v4().to_string(),
            numero_venda,
            cliente_id: normalize_optional(input.cliente_id.clone()),
            subtotal: input.subtotal(),
            desconto: input.desconto.max(0),
            total: input.total(),
            forma_pagamento: input.forma_pagamento,
            status: StatusVenda::Concluida,
            observacoes: normalize_optional(input.observacoes.clone()),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO vendas (
                id, numero_venda, cliente_id, subtotal, desconto, total,
                forma_pagamento, status, observacoes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&venda.id)
        .bind(venda.numero_venda)
        .bind(&venda.cliente_id)
        .bind(venda.subtotal)
        .bind(venda.desconto)
        .bind(venda.total)
        .bind(venda.forma_pagamento)
        .bind(venda.status)
        .bind(&venda.observacoes)
        .bind(venda.created_at)
        .execute(&mut *tx)
        .await?;

        let referencia = format!("Venda #{numero_venda}");

        for item in &input.itens {
            let (nome, estoque): (String, i64) =
                sqlx::query_as("SELECT nome, estoque_atual FROM produtos WHERE id = ?1")
                    .bind(&item.produto_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| DbError::not_found("Produto", &item.produto_id))?;

            if estoque < item.quantidade {
                return Err(CoreError::InsufficientStock {
                    produto: nome,
                    available: estoque,
                    requested: item.quantidade,
                }
                .into());
            }

            sqlx::query(
                "INSERT INTO venda_itens (
                    id, venda_id, produto_id, quantidade, preco_unitario, subtotal, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&venda.id)
            .bind(&item.produto_id)
            .bind(item.quantidade)
            .bind(item.preco_unitario)
            .bind(item.subtotal())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let saldo_atual = estoque - item.quantidade;
            sqlx::query("UPDATE produtos SET estoque_atual = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(&item.produto_id)
                .bind(saldo_atual)
                .bind(now)
                .execute(&mut *tx)
                .await?;

            let movimentacao = Movimentacao {
                id: Uuid::new_v4().to_string(),
                produto_id: item.produto_id.clone(),
                tipo: TipoMovimentacao::Saida,
                quantidade: item.quantidade,
                saldo_anterior: estoque,
                saldo_atual,
                motivo: Some(MotivoMovimentacao::Venda),
                observacoes: Some(referencia.clone()),
                referencia_id: Some(venda.id.clone()),
                created_at: now,
            };
            insert_movimentacao(&mut *tx, &movimentacao).await?;
        }

        tx.commit().await?;

        info!(
            id = %venda.id,
            numero_venda = venda.numero_venda,
            total = venda.total,
            itens = input.itens.len(),
            "Sale finalized"
        );
        Ok(venda)
    }

    /// Newest sales first, with the customer's name.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<VendaResumo>> {
        let sql = format!(
            "SELECT {VENDA_COLUMNS}, c.nome AS cliente_nome
             FROM vendas v
             LEFT JOIN clientes c ON c.id = v.cliente_id
             ORDER BY v.created_at DESC, v.numero_venda DESC
             LIMIT ?1"
        );
        let vendas = sqlx::query_as::<_, VendaResumo>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = vendas.len(), "Listed sales");
        Ok(vendas)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Venda>> {
        let sql = format!("SELECT {VENDA_COLUMNS} FROM vendas v WHERE v.id = ?1");
        let venda = sqlx::query_as::<_, Venda>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(venda)
    }

    /// Items of a sale with product name and SKU.
    pub async fn itens(&self, venda_id: &str) -> DbResult<Vec<VendaItemDetalhe>> {
        let itens = sqlx::query_as::<_, VendaItemDetalhe>(
            "SELECT i.produto_id, p.nome AS produto_nome, p.sku,
                    i.quantidade, i.preco_unitario, i.subtotal
             FROM venda_itens i
             JOIN produtos p ON p.id = i.produto_id
             WHERE i.venda_id = ?1
             ORDER BY p.nome",
        )
        .bind(venda_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, produto, setup};
    use avelar_core::{CategoriaProduto, FormaPagamento, ItemVendaInput};

    fn item(p: &avelar_core::Produto, quantidade: i64) -> ItemVendaInput {
        ItemVendaInput {
            produto_id: p.id.clone(),
            nome: p.nome.clone(),
            quantidade,
            preco_unitario: p.preco_venda,
        }
    }

    #[tokio::test]
    async fn test_finalizar_venda() {
        let db = setup().await;
        let c = cliente(&db, "Paula Ramos").await;
        let armacao = produto(&db, "Armação Vogue", CategoriaProduto::Armacao, 35_000, 3).await;
        let solucao = produto(&db, "Solução Opti-Free", CategoriaProduto::Solucao, 4_500, 10).await;

        let venda = db
            .vendas()
            .finalizar(FinalizarVendaInput {
                cliente_id: Some(c.id.clone()),
                forma_pagamento: FormaPagamento::Pix,
                desconto: 5_000,
                observacoes: None,
                itens: vec![item(&armacao, 1), item(&solucao, 2)],
            })
            .await
            .unwrap();

        assert_eq!(venda.numero_venda, 1);
        assert_eq!(venda.subtotal, 44_000);
        assert_eq!(venda.total, 39_000);
        assert_eq!(venda.status, StatusVenda::Concluida);

        assert_eq!(db.produtos().get(&armacao.id).await.unwrap().estoque_atual, 2);
        assert_eq!(db.produtos().get(&solucao.id).await.unwrap().estoque_atual, 8);

        let itens = db.vendas().itens(&venda.id).await.unwrap();
        assert_eq!(itens.len(), 2);

        let movimentos = db.estoque().movimentacoes(50).await.unwrap();
        assert_eq!(movimentos.len(), 2);
        assert!(movimentos
            .iter()
            .all(|m| m.movimentacao.observacoes.as_deref() == Some("Venda #1")));

        let vendas = db.vendas().list(10).await.unwrap();
        assert_eq!(vendas[0].cliente_nome.as_deref(), Some("Paula Ramos"));
    }

    #[tokio::test]
    async fn test_numero_venda_is_sequential() {
        let db = setup().await;
        let p = produto(&db, "Flanela", CategoriaProduto::Acessorio, 500, 10).await;

        for esperado in 1..=3 {
            let venda = db
                .vendas()
                .finalizar(FinalizarVendaInput {
                    cliente_id: None,
                    forma_pagamento: FormaPagamento::Dinheiro,
                    desconto: 0,
                    observacoes: None,
                    itens: vec![item(&p, 1)],
                })
                .await
                .unwrap();
            assert_eq!(venda.numero_venda, esperado);
        }

        let vendas = db.vendas().list(10).await.unwrap();
        assert_eq!(vendas[0].cliente_display(), "Cliente");
    }

    #[tokio::test]
    async fn test_finalizar_empty_cart() {
        let db = setup().await;
        let err = db
            .vendas()
            .finalizar(FinalizarVendaInput {
                cliente_id: None,
                forma_pagamento: FormaPagamento::Dinheiro,
                desconto: 0,
                observacoes: None,
                itens: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Adicione produtos ao carrinho!");
    }

    #[tokio::test]
    async fn test_short_stock_rolls_back_everything() {
        let db = setup().await;
        let ok = produto(&db, "Cordão", CategoriaProduto::Acessorio, 1_000, 5).await;
        let curto = produto(&db, "Lente Zeiss", CategoriaProduto::Lente, 60_000, 1).await;

        let err = db
            .vendas()
            .finalizar(FinalizarVendaInput {
                cliente_id: None,
                forma_pagamento: FormaPagamento::CartaoCredito,
                desconto: 0,
                observacoes: None,
                itens: vec![item(&ok, 2), item(&curto, 2)],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(db.produtos().get(&ok.id).await.unwrap().estoque_atual, 5);
        assert!(db.vendas().list(10).await.unwrap().is_empty());
        assert!(db.estoque().movimentacoes(10).await.unwrap().is_empty());
    }
}
