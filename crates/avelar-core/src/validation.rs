//! # Validation Module
//!
//! Input validation utilities for Óticas Avelar forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Input masks (CPF, CEP, telefone)                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command (Rust)                                               │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: document numbers, ranges, required fields            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (sku, email, numero_venda)                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use avelar_core::validation::{validate_cpf, format_cpf};
//!
//! assert!(validate_cpf("529.982.247-25").is_ok());
//! assert_eq!(format_cpf("52998224725"), "529.982.247-25");
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// The 27 federative units, as (UF, name).
pub const ESTADOS_BRASILEIROS: [(&str, &str); 27] = [
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AP", "Amapá"),
    ("AM", "Amazonas"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MT", "Mato Grosso"),
    ("MS", "Mato Grosso do Sul"),
    ("MG", "Minas Gerais"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PR", "Paraná"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RS", "Rio Grande do Sul"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("SC", "Santa Catarina"),
    ("SP", "São Paulo"),
    ("SE", "Sergipe"),
    ("TO", "Tocantins"),
];

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is filled in and returns it trimmed.
///
/// ## Example
/// ```rust
/// use avelar_core::validation::validate_required;
///
/// assert_eq!(validate_required("nome", "  Maria  ").unwrap(), "Maria");
/// assert!(validate_required("nome", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Validates the maximum length of a field, counted in characters.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Trims an optional form value, turning blank input into `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (the caller falls back to its list operation)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    validate_max_len("busca", query, 100)?;
    Ok(query.to_string())
}

/// Keeps only the ASCII digits of a masked input.
///
/// ## Example
/// ```rust
/// use avelar_core::validation::only_digits;
///
/// assert_eq!(only_digits("(11) 98765-4321"), "11987654321");
/// ```
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

// =============================================================================
// Brazilian Documents
// =============================================================================

fn digit_values(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Validates a CPF (individual taxpayer number).
///
/// ## Rules
/// - 11 digits after removing the mask
/// - Not a repeated sequence (111.111.111-11)
/// - Both check digits match
pub fn validate_cpf(cpf: &str) -> ValidationResult<()> {
    let digits = digit_values(&only_digits(cpf));

    if digits.len() != 11 {
        return Err(invalid("cpf", "deve ter 11 dígitos"));
    }
    if all_same(&digits) {
        return Err(invalid("cpf", "sequência repetida"));
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 {
            0
        } else {
            rest
        }
    };

    if check(9) != digits[9] || check(10) != digits[10] {
        return Err(invalid("cpf", "dígito verificador não confere"));
    }

    Ok(())
}

/// Validates a CNPJ (company taxpayer number).
///
/// ## Rules
/// - 14 digits after removing the mask
/// - Not a repeated sequence
/// - Both check digits match
pub fn validate_cnpj(cnpj: &str) -> ValidationResult<()> {
    const FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let digits = digit_values(&only_digits(cnpj));

    if digits.len() != 14 {
        return Err(invalid("cnpj", "deve ter 14 dígitos"));
    }
    if all_same(&digits) {
        return Err(invalid("cnpj", "sequência repetida"));
    }

    let check = |weights: &[u32]| -> u32 {
        let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
        let rest = sum % 11;
        if rest < 2 {
            0
        } else {
            11 - rest
        }
    };

    if check(&FIRST) != digits[12] || check(&SECOND) != digits[13] {
        return Err(invalid("cnpj", "dígito verificador não confere"));
    }

    Ok(())
}

/// Validates a CEP (postal code): 8 digits once the mask is removed.
pub fn validate_cep(cep: &str) -> ValidationResult<()> {
    if only_digits(cep).len() != 8 {
        return Err(invalid("cep", "deve ter 8 dígitos"));
    }
    Ok(())
}

/// Validates an e-mail address.
///
/// ## Rules
/// - Exactly one `@`, no whitespace
/// - Non-empty local part
/// - Domain with at least one dot and no empty labels
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("email", "não pode conter espaços"));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid("email", "deve conter um @")),
    };

    if local.is_empty() {
        return Err(invalid("email", "usuário vazio"));
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(invalid("email", "domínio inválido"));
    }

    Ok(())
}

/// Validates a phone number: 10 (landline) or 11 (mobile) digits with DDD.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    match only_digits(phone).len() {
        10 | 11 => Ok(()),
        _ => Err(invalid("telefone", "informe DDD e número")),
    }
}

/// Validates a state abbreviation (UF).
pub fn validate_uf(uf: &str) -> ValidationResult<()> {
    let uf = uf.trim().to_uppercase();
    if ESTADOS_BRASILEIROS.iter().any(|(sigla, _)| *sigla == uf) {
        Ok(())
    } else {
        Err(ValidationError::NotAllowed {
            field: "estado".to_string(),
            allowed: ESTADOS_BRASILEIROS.iter().map(|(s, _)| s.to_string()).collect(),
        })
    }
}

/// Formats 11 digits as `000.000.000-00`; other input is returned unchanged.
pub fn format_cpf(cpf: &str) -> String {
    let d = only_digits(cpf);
    if d.len() != 11 {
        return cpf.to_string();
    }
    format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
}

/// Formats 14 digits as `00.000.000/0000-00`; other input is returned unchanged.
pub fn format_cnpj(cnpj: &str) -> String {
    let d = only_digits(cnpj);
    if d.len() != 14 {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    )
}

/// Formats 8 digits as `00000-000`; other input is returned unchanged.
pub fn format_cep(cep: &str) -> String {
    let d = only_digits(cep);
    if d.len() != 8 {
        return cep.to_string();
    }
    format!("{}-{}", &d[0..5], &d[5..8])
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (must be positive).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantidade".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in centavos.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (courtesy items such as cleaning cloths)
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a star rating (1 to 5).
pub fn validate_rating(field: &str, nota: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&nota) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: 5,
        });
    }

    Ok(())
}

/// Validates a warranty duration in months (1 to 120).
pub fn validate_duration_months(meses: i64) -> ValidationResult<()> {
    if !(1..=120).contains(&meses) {
        return Err(ValidationError::OutOfRange {
            field: "duracao_meses".to_string(),
            min: 1,
            max: 120,
        });
    }

    Ok(())
}

/// Validates a prescription axis in degrees (0 to 180) when present.
pub fn validate_eixo(field: &str, eixo: Option<i64>) -> ValidationResult<()> {
    match eixo {
        Some(e) if !(0..=180).contains(&e) => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 180,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use avelar_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| invalid("id", "deve ser um UUID válido"))?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
