//! # Domain Types
//!
//! Records, enums and form inputs for every area of the store.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Balcão (front desk)        Retaguarda (back office)                    │
//! │  ─────────────────────      ────────────────────────                    │
//! │  Cliente                    Produto ── LenteContato                     │
//! │  Venda ── VendaItem         Movimentacao (estoque)                      │
//! │  Orcamento ── OrcamentoItem Lancamento (financeiro)                     │
//! │  Receita                    Fornecedor ── Avaliacao                     │
//! │  Agendamento ── Profissional                                            │
//! │                                                                         │
//! │  Pós-venda                                                              │
//! │  ─────────                                                              │
//! │  OrdemServico (laboratório)                                             │
//! │  Garantia ── Ocorrencia                                                 │
//! │  ControleLente, LoteValidade                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `id`: UUID v4 string generated by the application
//! - money fields are centavos (`i64`), see [`crate::money::Money`]
//! - enums serialize to the snake_case literals stored in the database
//!   (`concluida`, `lente_contato`, `controle_qualidade`, ...)
//! - every `*Input` has a `validate` that trims and normalizes the form

pub mod cliente;
pub mod consultorio;
pub mod dashboard;
pub mod estoque;
pub mod financeiro;
pub mod fornecedor;
pub mod garantia;
pub mod laboratorio;
pub mod lente_contato;
pub mod orcamento;
pub mod produto;
pub mod receita;
pub mod usuario;
pub mod venda;

pub use cliente::*;
pub use consultorio::*;
pub use dashboard::*;
pub use estoque::*;
pub use financeiro::*;
pub use fornecedor::*;
pub use garantia::*;
pub use laboratorio::*;
pub use lente_contato::*;
pub use orcamento::*;
pub use produto::*;
pub use receita::*;
pub use usuario::*;
pub use venda::*;
