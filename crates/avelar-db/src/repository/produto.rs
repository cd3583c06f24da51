//! # Product Repository
//!
//! Products of every category share one table. The category-specific
//! attributes (bridge size, refraction index, base curve...) live in the
//! `especificacoes` JSON column.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ produtos                                                             │
//! │ id | nome            | categoria | especificacoes                      │
//! │ .. | Ray-Ban RB5154  | armacao   | {"aro":"51","ponte":"21"}           │
//! │ .. | Varilux Comfort | lente     | {"indice_refracao":"1.67"}          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use avelar_core::validation::validate_search_query;
use avelar_core::{CategoriaProduto, Produto, ProdutoInput, ValidationError};

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;

pub(crate) const PRODUTO_COLUMNS: &str = "id, sku, nome, categoria, marca, cor, material, \
     preco_custo, preco_venda, estoque_atual, estoque_minimo, observacoes, especificacoes, \
     ativo, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProdutoRepository {
    pool: SqlitePool,
}

impl ProdutoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProdutoRepository { pool }
    }

    /// Every product, grouped by category then name.
    pub async fn list(&self) -> DbResult<Vec<Produto>> {
        let sql = format!("SELECT {PRODUTO_COLUMNS} FROM produtos ORDER BY categoria, nome");
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = produtos.len(), "Listed products");
        Ok(produtos)
    }

    pub async fn list_by_categoria(&self, categoria: CategoriaProduto) -> DbResult<Vec<Produto>> {
        let sql = format!(
            "SELECT {PRODUTO_COLUMNS} FROM produtos WHERE categoria = ?1 ORDER BY nome"
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(categoria)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }

    /// Active products with units on the shelf, for the PDV grid.
    pub async fn disponiveis(&self) -> DbResult<Vec<Produto>> {
        let sql = format!(
            "SELECT {PRODUTO_COLUMNS} FROM produtos
             WHERE ativo = 1 AND estoque_atual > 0
             ORDER BY nome"
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }

    /// Active products whose name, SKU or brand contains `query`.
    ///
    /// Used by both the PDV and the quote screen. A blank query returns
    /// nothing: those screens only search once something is typed.
    pub async fn buscar(&self, query: &str, limit: i64) -> DbResult<Vec<Produto>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {PRODUTO_COLUMNS} FROM produtos
             WHERE ativo = 1 AND (nome LIKE ?1 OR sku LIKE ?1 OR marca LIKE ?1)
             ORDER BY nome
             LIMIT ?2"
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(like_pattern(&query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(query = %query, count = produtos.len(), "Searched products");
        Ok(produtos)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Produto>> {
        let sql = format!("SELECT {PRODUTO_COLUMNS} FROM produtos WHERE id = ?1");
        let produto = sqlx::query_as::<_, Produto>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(produto)
    }

    pub async fn get(&self, id: &str) -> DbResult<Produto> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Produto", id))
    }

    pub async fn create(&self, input: ProdutoInput) -> DbResult<Produto> {
        let input = input.validate()?;
        let mut conn = self.pool.acquire().await?;
        insert_produto(&mut *conn, input).await
    }

    pub async fn update(&self, id: &str, input: ProdutoInput) -> DbResult<Produto> {
        let input = input.validate()?;
        let afetados = {
            let mut conn = self.pool.acquire().await?;
            update_produto(&mut *conn, id, &input).await?
        };
        if afetados == 0 {
            return Err(DbError::not_found("Produto", id));
        }

        debug!(id = %id, "Updated product");
        self.get(id).await
    }

    pub async fn count_ativos(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produtos WHERE ativo = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Inserts an already validated product.
pub(crate) async fn insert_produto(
    conn: &mut SqliteConnection,
    input: ProdutoInput,
) -> DbResult<Produto> {
    let now = Utc::now();
    let produto = Produto {
        id: Uuid::new_v4().to_string(),
        sku: input.sku,
        nome: input.nome,
        categoria: input.categoria,
        marca: input.marca,
        cor: input.cor,
        material: input.material,
        preco_custo: input.preco_custo,
        preco_venda: input.preco_venda,
        estoque_atual: input.estoque_atual,
        estoque_minimo: input.estoque_minimo,
        observacoes: input.observacoes,
        especificacoes: input.especificacoes,
        ativo: input.ativo,
        created_at: now,
        updated_at: now,
    };

    debug!(id = %produto.id, categoria = ?produto.categoria, "Creating product");

    let result = sqlx::query(
        "INSERT INTO produtos (
            id, sku, nome, categoria, marca, cor, material,
            preco_custo, preco_venda, estoque_atual, estoque_minimo,
            observacoes, especificacoes, ativo, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(&produto.id)
    .bind(&produto.sku)
    .bind(&produto.nome)
    .bind(produto.categoria)
    .bind(&produto.marca)
    .bind(&produto.cor)
    .bind(&produto.material)
    .bind(produto.preco_custo)
    .bind(produto.preco_venda)
    .bind(produto.estoque_atual)
    .bind(produto.estoque_minimo)
    .bind(&produto.observacoes)
    .bind(Json(&produto.especificacoes))
    .bind(produto.ativo)
    .bind(produto.created_at)
    .bind(produto.updated_at)
    .execute(&mut *conn)
    .await;

    sku_duplicado(result, produto.sku.as_deref())?;
    Ok(produto)
}

/// Rewrites every column of a validated product; returns the affected rows.
pub(crate) async fn update_produto(
    conn: &mut SqliteConnection,
    id: &str,
    input: &ProdutoInput,
) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE produtos SET
            sku = ?2, nome = ?3, categoria = ?4, marca = ?5, cor = ?6, material = ?7,
            preco_custo = ?8, preco_venda = ?9, estoque_atual = ?10, estoque_minimo = ?11,
            observacoes = ?12, especificacoes = ?13, ativo = ?14, updated_at = ?15
         WHERE id = ?1",
    )
    .bind(id)
    .bind(&input.sku)
    .bind(&input.nome)
    .bind(input.categoria)
    .bind(&input.marca)
    .bind(&input.cor)
    .bind(&input.material)
    .bind(input.preco_custo)
    .bind(input.preco_venda)
    .bind(input.estoque_atual)
    .bind(input.estoque_minimo)
    .bind(&input.observacoes)
    .bind(Json(&input.especificacoes))
    .bind(input.ativo)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await;

    sku_duplicado(result, input.sku.as_deref())
}

/// Turns a UNIQUE failure on `produtos.sku` into a form error and returns
/// the number of affected rows otherwise.
fn sku_duplicado(
    result: Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>,
    sku: Option<&str>,
) -> DbResult<u64> {
    match result.map_err(DbError::from) {
        Ok(done) => Ok(done.rows_affected()),
        Err(e) if e.is_unique_violation_on("produtos.sku") => Err(ValidationError::Duplicate {
            field: "sku".to_string(),
            value: sku.unwrap_or_default().to_string(),
        }
        .into()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{produto, setup};
    use avelar_core::CoreError;

    #[tokio::test]
    async fn test_create_keeps_only_category_attributes() {
        let db = setup().await;
        let mut input = ProdutoInput::new("Ray-Ban RB5154", CategoriaProduto::Armacao, 45_990);
        input.sku = Some("ARM-001".to_string());
        input.especificacoes.insert("ponte".to_string(), "21".to_string());
        input.especificacoes.insert("aro".to_string(), " ".to_string());
        input.especificacoes.insert("curva_base".to_string(), "8.6".to_string());

        let criado = db.produtos().create(input).await.unwrap();
        let lido = db.produtos().get(&criado.id).await.unwrap();

        assert_eq!(lido.especificacoes.len(), 1);
        assert_eq!(lido.especificacoes.get("ponte").map(String::as_str), Some("21"));
        assert_eq!(lido.categoria, CategoriaProduto::Armacao);
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = setup().await;
        let mut input = ProdutoInput::new("Armação A", CategoriaProduto::Armacao, 10_000);
        input.sku = Some("ARM-010".to_string());
        db.produtos().create(input.clone()).await.unwrap();

        input.nome = "Armação B".to_string();
        let err = db.produtos().create(input).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert_eq!(err.to_string(), "sku 'ARM-010' já existe");
    }

    #[tokio::test]
    async fn test_list_order_and_disponiveis() {
        let db = setup().await;
        produto(&db, "Solução Renu", CategoriaProduto::Solucao, 3_990, 10).await;
        produto(&db, "Armação Oakley", CategoriaProduto::Armacao, 59_900, 0).await;
        produto(&db, "Acuvue Oasys", CategoriaProduto::LenteContato, 18_900, 4).await;

        let todos = db.produtos().list().await.unwrap();
        let categorias: Vec<_> = todos.iter().map(|p| p.categoria).collect();
        assert_eq!(
            categorias,
            vec![
                CategoriaProduto::Armacao,
                CategoriaProduto::LenteContato,
                CategoriaProduto::Solucao
            ]
        );

        let disponiveis = db.produtos().disponiveis().await.unwrap();
        let nomes: Vec<_> = disponiveis.iter().map(|p| p.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Acuvue Oasys", "Solução Renu"]);
    }

    #[tokio::test]
    async fn test_buscar_by_marca_and_sku() {
        let db = setup().await;
        let mut input = ProdutoInput::new("Aviador Clássico", CategoriaProduto::Armacao, 45_000);
        input.marca = Some("Ray-Ban".to_string());
        input.sku = Some("RB-3025".to_string());
        db.produtos().create(input).await.unwrap();

        let mut inativo = ProdutoInput::new("Ray-Ban antigo", CategoriaProduto::Armacao, 1_000);
        inativo.ativo = false;
        db.produtos().create(inativo).await.unwrap();

        assert_eq!(db.produtos().buscar("ray-ban", 10).await.unwrap().len(), 1);
        assert_eq!(db.produtos().buscar("rb-30", 10).await.unwrap().len(), 1);
        assert!(db.produtos().buscar("", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_product() {
        let db = setup().await;
        let p = produto(&db, "Lente Kodak", CategoriaProduto::Lente, 30_000, 5).await;

        let mut input = ProdutoInput::new("Lente Kodak Precise", CategoriaProduto::Lente, 32_000);
        input.estoque_atual = 5;
        let atualizado = db.produtos().update(&p.id, input).await.unwrap();
        assert_eq!(atualizado.nome, "Lente Kodak Precise");
        assert_eq!(atualizado.preco_venda, 32_000);

        let missing = db
            .produtos()
            .update("x", ProdutoInput::new("X", CategoriaProduto::Lente, 1))
            .await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }
}
