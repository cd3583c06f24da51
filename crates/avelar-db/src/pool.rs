//! # Store Database
//!
//! One SQLite file per store terminal (`avelar.db`), opened once at startup
//! and shared by every command through [`Database`].
//!
//! ```text
//! DbConfig::new(path) ──► Database::new ──► pool (WAL, foreign keys on)
//!                                              │
//!                                              ▼
//!                                   migrations::run_migrations
//!                                              │
//!                                              ▼
//!                     db.clientes() / db.vendas() / ... (one repository each)
//! ```
//!
//! Tests use [`DbConfig::in_memory`], which pins the pool to a single
//! connection so every query sees the same in-memory database.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    ClienteRepository, ConsultorioRepository, DashboardRepository, EstoqueRepository,
    FinanceiroRepository, FornecedorRepository, GarantiaRepository, LenteContatoRepository,
    OrcamentoRepository, OrdemServicoRepository, ProdutoRepository, ReceitaRepository,
    RelatorioRepository, UsuarioRepository, VendaRepository,
};

/// How long a command waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the store database lives and how many connections it gets.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// A single counter rarely needs more than a handful.
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
}

impl DbConfig {
    /// File-backed database; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Throwaway database for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            // each connection would get its own empty database
            max_connections: 1,
            min_connections: 1,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store database. Clones share the pool, and every
/// repository accessor hands out a repository over that same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    ///
    /// # Errors
    /// `ConnectionFailed` when the file cannot be opened, `MigrationFailed`
    /// when the embedded schema does not apply.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening store database");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // off by default in SQLite; sale items and ratings rely on it
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        migrations::run_migrations(&pool).await?;
        Ok(Database { pool })
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Local accounts (`sign_in`, `create_user`).
    pub fn usuarios(&self) -> UsuarioRepository {
        UsuarioRepository::new(self.pool.clone())
    }

    /// Customers.
    pub fn clientes(&self) -> ClienteRepository {
        ClienteRepository::new(self.pool.clone())
    }

    /// Products and their category attributes.
    pub fn produtos(&self) -> ProdutoRepository {
        ProdutoRepository::new(self.pool.clone())
    }

    /// Stock levels and movements.
    pub fn estoque(&self) -> EstoqueRepository {
        EstoqueRepository::new(self.pool.clone())
    }

    /// Sales (PDV).
    pub fn vendas(&self) -> VendaRepository {
        VendaRepository::new(self.pool.clone())
    }

    /// Financial ledger.
    pub fn financeiro(&self) -> FinanceiroRepository {
        FinanceiroRepository::new(self.pool.clone())
    }

    /// Prescriptions.
    pub fn receitas(&self) -> ReceitaRepository {
        ReceitaRepository::new(self.pool.clone())
    }

    /// Lab service orders.
    pub fn ordens_servico(&self) -> OrdemServicoRepository {
        OrdemServicoRepository::new(self.pool.clone())
    }

    /// Suppliers and their ratings.
    pub fn fornecedores(&self) -> FornecedorRepository {
        FornecedorRepository::new(self.pool.clone())
    }

    /// Warranties and claims.
    pub fn garantias(&self) -> GarantiaRepository {
        GarantiaRepository::new(self.pool.clone())
    }

    /// Contact lenses, batches and patient follow-ups.
    pub fn lentes_contato(&self) -> LenteContatoRepository {
        LenteContatoRepository::new(self.pool.clone())
    }

    /// Quotes.
    pub fn orcamentos(&self) -> OrcamentoRepository {
        OrcamentoRepository::new(self.pool.clone())
    }

    /// Professionals and appointments.
    pub fn consultorio(&self) -> ConsultorioRepository {
        ConsultorioRepository::new(self.pool.clone())
    }

    /// Dashboard cards.
    pub fn dashboard(&self) -> DashboardRepository {
        DashboardRepository::new(self.pool.clone())
    }

    /// Report queries.
    pub fn relatorios(&self) -> RelatorioRepository {
        RelatorioRepository::new(self.pool.clone())
    }

    /// Repositories fail once the pool is closed.
    pub async fn close(&self) {
        info!("Closing store database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy_until_closed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_defaults_and_builder() {
        let config = DbConfig::new("/tmp/avelar.db");
        assert_eq!(config.max_connections, 5);

        let config = config.max_connections(1).min_connections(1);
        assert_eq!(config.max_connections, 1);
        assert_eq!(DbConfig::in_memory().max_connections, 1);
    }

    #[tokio::test]
    async fn test_reopening_file_keeps_data() {
        let path = std::env::temp_dir().join(format!("avelar-pool-{}.db", uuid::Uuid::new_v4()));

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query("INSERT INTO profissionais (id, nome, ativo, created_at) \
             VALUES ('p1', 'Dra. Lúcia', 1, '2025-06-15T09:00:00Z')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let nomes: Vec<String> = sqlx::query_scalar("SELECT nome FROM profissionais")
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert_eq!(nomes, vec!["Dra. Lúcia".to_string()]);
        db.close().await;

        for sufixo in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), sufixo));
        }
    }

    #[tokio::test]
    async fn test_migrations_create_all_tables() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table'",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        for expected in [
            "clientes",
            "produtos",
            "vendas",
            "venda_itens",
            "estoque_movimentacoes",
            "financeiro_movimentacoes",
            "receitas",
            "ordens_servico",
            "fornecedores",
            "avaliacoes_fornecedor",
            "garantias",
            "lentes_contato",
            "controles_validade_lc",
            "controles_lentes_contato",
            "orcamentos",
            "orcamento_itens",
            "usuarios",
            "profissionais",
            "agendamentos",
            "garantia_ocorrencias",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }
}
