//! # Commands Module
//!
//! Every store operation exposed to the frontend, one file per screen.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (exports, filter parsing)
//! ├── auth.rs           ◄─── Sign-up, sign-in, session
//! ├── cart.rs           ◄─── PDV and quote carts
//! ├── cep.rs            ◄─── Postal code lookup
//! ├── clientes.rs       ◄─── Customers
//! ├── config.rs         ◄─── Configuration retrieval
//! ├── consultorio.rs    ◄─── Professionals and appointments
//! ├── dashboard.rs      ◄─── Headline numbers and alerts
//! ├── estoque.rs        ◄─── Stock levels and movements
//! ├── financeiro.rs     ◄─── Payables and receivables
//! ├── fornecedores.rs   ◄─── Suppliers and ratings
//! ├── garantias.rs      ◄─── Warranties and claims
//! ├── laboratorio.rs    ◄─── Service orders
//! ├── lentes_contato.rs ◄─── Contact lenses, batches, follow-ups
//! ├── modules.rs        ◄─── Module loading
//! ├── orcamentos.rs     ◄─── Quotes
//! ├── produtos.rs       ◄─── Catalogue
//! ├── receitas.rs       ◄─── Prescriptions
//! ├── relatorios.rs     ◄─── Reports
//! └── vendas.rs         ◄─── PDV search and sale finalization
//! ```
//!
//! ## How Commands Work
//! Commands are plain async functions over explicit state, so they run
//! the same under Tauri and in tests:
//! ```text
//! invoke('list_clientes')
//!         │ (IPC via WebView, feature "desktop")
//!         ▼
//! ipc::list_clientes(db: State<'_, DbState>)
//!         │
//!         ▼
//! commands::clientes::list_clientes(&db) -> Result<Vec<Cliente>, ApiError>
//! ```
//!
//! Operations that depend on the calendar take `today`/`now` as an
//! argument; the IPC layer passes the local date.

pub mod auth;
pub mod cart;
pub mod cep;
pub mod clientes;
pub mod config;
pub mod consultorio;
pub mod dashboard;
pub mod estoque;
pub mod financeiro;
pub mod fornecedores;
pub mod garantias;
pub mod laboratorio;
pub mod lentes_contato;
pub mod modules;
pub mod orcamentos;
pub mod produtos;
pub mod receitas;
pub mod relatorios;
pub mod vendas;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// Select value meaning "no filter".
pub const TODOS: &str = "todos";

/// Parses a select filter into one of the stored literals.
///
/// `None`, blank and `todos` mean no filter.
pub fn parse_filtro<T: DeserializeOwned>(field: &str, value: Option<&str>) -> ApiResult<Option<T>> {
    let value = match value.map(str::trim) {
        None | Some("") | Some(TODOS) => return Ok(None),
        Some(v) => v,
    };

    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map(Some)
        .map_err(|_| ApiError::validation(format!("{} inválido: {}", field, value)))
}

/// Serializes a module payload.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize module data");
        ApiError::internal("Erro ao preparar dados do módulo")
    })
}
