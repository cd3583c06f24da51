//! # Customer Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use avelar_core::validation::validate_search_query;
use avelar_core::{Cliente, ClienteInput, ClienteOption};

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;

const CLIENTE_COLUMNS: &str =
    "id, nome, cpf, email, telefone, data_nascimento, observacoes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ClienteRepository {
    pool: SqlitePool,
}

impl ClienteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClienteRepository { pool }
    }

    /// Customers ordered by name.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<Cliente>> {
        let sql = format!("SELECT {CLIENTE_COLUMNS} FROM clientes ORDER BY nome LIMIT ?1");
        let clientes = sqlx::query_as::<_, Cliente>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = clientes.len(), "Listed customers");
        Ok(clientes)
    }

    /// Matches name, CPF or e-mail. A blank query lists the first 100.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Cliente>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return self.list(100).await;
        }

        let sql = format!(
            "SELECT {CLIENTE_COLUMNS} FROM clientes
             WHERE nome LIKE ?1 OR cpf LIKE ?1 OR email LIKE ?1
             ORDER BY nome
             LIMIT ?2"
        );
        let clientes = sqlx::query_as::<_, Cliente>(&sql)
            .bind(like_pattern(&query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(query = %query, count = clientes.len(), "Searched customers");
        Ok(clientes)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cliente>> {
        let sql = format!("SELECT {CLIENTE_COLUMNS} FROM clientes WHERE id = ?1");
        let cliente = sqlx::query_as::<_, Cliente>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cliente)
    }

    pub async fn get(&self, id: &str) -> DbResult<Cliente> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Cliente", id))
    }

    pub async fn create(&self, input: ClienteInput) -> DbResult<Cliente> {
        let input = input.validate()?;
        let now = Utc::now();
        let cliente = Cliente {
            id: Uuid::new_v4().to_string(),
            nome: input.nome,
            cpf: input.cpf,
            email: input.email,
            telefone: input.telefone,
            data_nascimento: input.data_nascimento,
            observacoes: input.observacoes,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %cliente.id, "Creating customer");

        sqlx::query(
            "INSERT INTO clientes (
                id, nome, cpf, email, telefone, data_nascimento, observacoes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&cliente.id)
        .bind(&cliente.nome)
        .bind(&cliente.cpf)
        .bind(&cliente.email)
        .bind(&cliente.telefone)
        .bind(cliente.data_nascimento)
        .bind(&cliente.observacoes)
        .bind(cliente.created_at)
        .bind(cliente.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(cliente)
    }

    pub async fn update(&self, id: &str, input: ClienteInput) -> DbResult<Cliente> {
        let input = input.validate()?;

        let result = sqlx::query(
            "UPDATE clientes SET
                nome = ?2, cpf = ?3, email = ?4, telefone = ?5,
                data_nascimento = ?6, observacoes = ?7, updated_at = ?8
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.nome)
        .bind(&input.cpf)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(input.data_nascimento)
        .bind(&input.observacoes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cliente", id));
        }

        debug!(id = %id, "Updated customer");
        self.get(id).await
    }

    /// Lightweight rows for customer selects in other modules.
    pub async fn options(&self) -> DbResult<Vec<ClienteOption>> {
        let options = sqlx::query_as::<_, ClienteOption>(
            "SELECT id, nome, telefone, data_nascimento FROM clientes ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clientes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, setup};

    #[tokio::test]
    async fn test_create_and_list_ordered_by_nome() {
        let db = setup().await;
        cliente(&db, "Rafael Souza").await;
        cliente(&db, "Ana Lima").await;

        let clientes = db.clientes().list(100).await.unwrap();
        let nomes: Vec<_> = clientes.iter().map(|c| c.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Ana Lima", "Rafael Souza"]);
    }

    #[tokio::test]
    async fn test_search_by_nome_cpf_email() {
        let db = setup().await;
        let repo = db.clientes();
        repo.create(ClienteInput {
            nome: "Mariana Alves".to_string(),
            cpf: Some("529.982.247-25".to_string()),
            email: Some("mariana@email.com".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        cliente(&db, "João Pedro").await;

        assert_eq!(repo.search("mari", 50).await.unwrap().len(), 1);
        assert_eq!(repo.search("982.247", 50).await.unwrap().len(), 1);
        assert_eq!(repo.search("@email", 50).await.unwrap().len(), 1);
        assert_eq!(repo.search("   ", 50).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_cpf() {
        let db = setup().await;
        let err = db
            .clientes()
            .create(ClienteInput {
                nome: "Teste".to_string(),
                cpf: Some("111.111.111-11".to_string()),
                ..Default::default()
            })
            .await;
        assert!(err.is_err());
        assert_eq!(db.clientes().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_options() {
        let db = setup().await;
        let c = cliente(&db, "Carlos").await;

        let atualizado = db
            .clientes()
            .update(
                &c.id,
                ClienteInput {
                    nome: "Carlos Eduardo".to_string(),
                    telefone: Some("(21) 3333-4444".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(atualizado.nome, "Carlos Eduardo");

        let options = db.clientes().options().await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].telefone.as_deref(), Some("(21) 3333-4444"));

        let missing = db
            .clientes()
            .update("nao-existe", ClienteInput { nome: "X".into(), ..Default::default() })
            .await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }
}
