//! # avelar-db: Database Layer for Óticas Avelar
//!
//! Local SQLite storage for the store: customers, products and stock,
//! sales, the financial ledger, prescriptions, lab orders, suppliers,
//! warranties, contact lens follow-ups, quotes and appointments.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Óticas Avelar Data Flow                            │
//! │                                                                         │
//! │  Tauri Command (finalizar_venda)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     avelar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (repository/)  │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │    │ VendaRepo      │    │ 001_initial  │  │   │
//! │  │   │ Connection    │◄───│ EstoqueRepo    │    │  _schema.sql │  │   │
//! │  │   │ Management    │    │ ReceitaRepo .. │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <app data dir>/avelar.db                                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per store area
//!
//! ## Usage
//!
//! ```rust,ignore
//! use avelar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/avelar.db")).await?;
//!
//! let clientes = db.clientes().search("maria", 50).await?;
//! let painel = db.dashboard().data(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    ClienteRepository, ConsultorioRepository, DashboardRepository, EstoqueRepository,
    FinanceiroRepository, FornecedorRepository, GarantiaRepository, LenteContatoRepository,
    OrcamentoRepository, OrdemServicoRepository, ProdutoRepository, ReceitaRepository,
    RelatorioRepository, UsuarioRepository, VendaRepository,
};
