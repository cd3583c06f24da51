//! # Repository Module
//!
//! One repository per group of tables. Each holds a clone of the pool and
//! is created on demand through [`crate::Database`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tauri Command                                                          │
//! │       │                                                                 │
//! │       │  db.clientes().search("maria", 50)                              │
//! │       ▼                                                                 │
//! │  ClienteRepository                                                      │
//! │  ├── list(&self, limit)                                                 │
//! │  ├── search(&self, query, limit)                                        │
//! │  ├── get(&self, id)                                                     │
//! │  ├── create(&self, input)                                               │
//! │  └── update(&self, id, input)                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as::<_, T>` over the
//! `FromRow` records of avelar-core.

pub mod cliente;
pub mod consultorio;
pub mod dashboard;
pub mod estoque;
pub mod financeiro;
pub mod fornecedor;
pub mod garantia;
pub mod lente_contato;
pub mod orcamento;
pub mod ordem_servico;
pub mod produto;
pub mod receita;
pub mod relatorio;
pub mod usuario;
pub mod venda;

pub use cliente::ClienteRepository;
pub use consultorio::ConsultorioRepository;
pub use dashboard::DashboardRepository;
pub use estoque::EstoqueRepository;
pub use financeiro::FinanceiroRepository;
pub use fornecedor::FornecedorRepository;
pub use garantia::GarantiaRepository;
pub use lente_contato::LenteContatoRepository;
pub use orcamento::OrcamentoRepository;
pub use ordem_servico::OrdemServicoRepository;
pub use produto::ProdutoRepository;
pub use receita::ReceitaRepository;
pub use relatorio::RelatorioRepository;
pub use usuario::UsuarioRepository;
pub use venda::VendaRepository;

/// `%q%` for case-insensitive `LIKE` searches (SQLite's LIKE ignores ASCII case).
pub(crate) fn like_pattern(query: &str) -> String {
    format!("%{}%", query.trim())
}
