//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)         Domain rule (CoreError)             │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in desktop app) ← Serialized for frontend                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Frontend shows `message` in an alert                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use avelar_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - UPDATE touched no row
    #[error("{entity} não encontrado: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate SKU
    /// - Duplicate user e-mail
    /// - Duplicate numero_venda / numero_os
    #[error("{field} '{value}' já existe")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a customer, product or sale that doesn't exist
    #[error("Registro relacionado não existe: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Falha na conexão com o banco: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Falha na migração: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Falha na consulta: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Falha na transação: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Banco de dados ocupado, tente novamente")]
    PoolExhausted,

    /// Internal database error.
    #[error("Erro interno do banco: {0}")]
    Internal(String),

    /// A domain rule failed while the repository was working, usually
    /// inside a transaction (stock ran out, empty cart, final stage...).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for a UNIQUE failure on the given `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Registro".to_string(),
                id: "desconhecido".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("desconhecido")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "desconhecido".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool fechado".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_message_passes_through() {
        let err = DbError::from(CoreError::EmptyCart);
        assert_eq!(err.to_string(), "Adicione produtos ao carrinho!");

        let err = DbError::from(ValidationError::Required {
            field: "nome".to_string(),
        });
        assert_eq!(err.to_string(), "nome é obrigatório");
    }

    #[test]
    fn test_is_unique_violation_on() {
        let err = DbError::duplicate("produtos.sku", "ARM-001");
        assert!(err.is_unique_violation_on("produtos.sku"));
        assert!(!err.is_unique_violation_on("usuarios.email"));
    }
}
