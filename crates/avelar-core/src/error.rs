//! # Error Types
//!
//! Domain-specific error types for avelar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  avelar-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  avelar-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages of the rules the store staff hit every day (empty cart, stock,
//! final lab stage) are the exact Portuguese texts shown in the alert.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced record does not exist.
    #[error("{entity} não encontrado: {id}")]
    NotFound { entity: String, id: String },

    /// Selling or removing more units than the shelf holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to cart (qty: 3)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { produto: "Ray-Ban RB2140", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Estoque insuficiente!"
    /// ```
    #[error("Estoque insuficiente!")]
    InsufficientStock {
        produto: String,
        available: i64,
        requested: i64,
    },

    /// Sale finalization with no items.
    #[error("Adicione produtos ao carrinho!")]
    EmptyCart,

    /// Quote creation with no items.
    #[error("Adicione produtos ao orçamento!")]
    EmptyQuote,

    /// Quote creation without a customer.
    #[error("Selecione um cliente!")]
    MissingCustomer,

    /// Stock adjustment with a zero or negative amount.
    #[error("Informe uma quantidade válida!")]
    InvalidQuantity,

    /// Advancing a service order that is already `pronto`.
    #[error("Esta OS já está na etapa final!")]
    FinalStage,

    /// Supplier rating submitted without stars.
    #[error("Selecione uma avaliação!")]
    MissingRating,

    /// Appointment slot already taken for the professional.
    #[error("Horário indisponível para este profissional")]
    SlotUnavailable,

    /// The record is in a status that does not allow the operation.
    #[error("{entity} está {status}, operação não permitida")]
    InvalidStatus { entity: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} é obrigatório")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} deve ter no máximo {max} caracteres")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} deve estar entre {min} e {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} deve ser maior que zero")]
    MustBePositive { field: String },

    /// Invalid format (CPF, CNPJ, e-mail, UUID, date...).
    #[error("{field} inválido: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} deve ser um de: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' já existe")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            produto: "Ray-Ban RB2140".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(err.to_string(), "Estoque insuficiente!");
        assert_eq!(CoreError::EmptyCart.to_string(), "Adicione produtos ao carrinho!");
        assert_eq!(CoreError::FinalStage.to_string(), "Esta OS já está na etapa final!");
        assert_eq!(CoreError::MissingRating.to_string(), "Selecione uma avaliação!");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "nome".to_string(),
        };
        assert_eq!(err.to_string(), "nome é obrigatório");

        let err = ValidationError::OutOfRange {
            field: "od_eixo".to_string(),
            min: 0,
            max: 180,
        };
        assert_eq!(err.to_string(), "od_eixo deve estar entre 0 e 180");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "nome".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "nome é obrigatório");
    }
}
