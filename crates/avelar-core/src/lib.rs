//! # avelar-core: domain logic for Óticas Avelar
//!
//! Every rule of the store that does not need the database lives here:
//! record types, form validation, money, calendar math, lab stages,
//! warranty periods and report aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI partials (HTML)  ──►  Tauri IPC  ──►  commands (apps/desktop)       │
//! │                                              │                          │
//! │                         ┌────────────────────┴───────────────┐          │
//! │                         ▼                                    ▼          │
//! │              ★ avelar-core (THIS CRATE) ★            avelar-db          │
//! │              types, validation, money,     ◄──────   SQLite repositories│
//! │              dates, report                                              │
//! │                                                                         │
//! │              NO I/O • NO DATABASE • NO NETWORK                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - records and forms of every store module
//! - [`money`] - centavos with Brazilian formatting
//! - [`error`] - domain and validation errors
//! - [`validation`] - CPF, CNPJ, CEP and the other form rules
//! - [`dates`] - month boundaries, ages, `dd/mm/aaaa`
//! - [`report`] - sales report aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use avelar_core::money::Money;
//! use avelar_core::EtapaOs;
//!
//! let preco = Money::from_cents(45_990);
//! assert_eq!(preco.to_string(), "R$ 459,90");
//!
//! assert_eq!(EtapaOs::Recebimento.next(), Some(EtapaOs::Analise));
//! ```

pub mod dates;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{
    periodo_padrao, relatorio_vendas, Periodo, ProdutoMaisVendido, RelatorioVendas, VendaDoPeriodo,
};
pub use types::*;

/// Store name shown in page titles and receipts.
pub const STORE_NAME: &str = "Óticas Avelar";

/// Products with fewer units than this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Rows shown in the dashboard's recent sales and alert lists.
pub const RECENT_LIMIT: i64 = 5;

/// Maximum quantity of a single product in the cart.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;
