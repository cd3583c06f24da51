//! Customers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::age_on;
use crate::validation::{
    normalize_optional, validate_cpf, validate_email, validate_max_len, validate_required,
    ValidationResult,
};

/// A customer of the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cliente {
    pub id: String,
    pub nome: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_nascimento: Option<NaiveDate>,
    pub observacoes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cliente {
    /// Age in full years, when the birth date is known.
    pub fn idade(&self, today: NaiveDate) -> Option<u32> {
        self.data_nascimento.map(|birth| age_on(birth, today))
    }
}

/// Slim customer row used to fill `<select>` boxes across modules.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ClienteOption {
    pub id: String,
    pub nome: String,
    pub telefone: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_nascimento: Option<NaiveDate>,
}

/// Customer form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClienteInput {
    pub nome: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_nascimento: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

impl ClienteInput {
    /// Validates and normalizes the form.
    ///
    /// ## Rules
    /// - `nome` is required (max 150 characters)
    /// - `cpf` and `email` are checked only when filled in
    /// - blank optional fields become `None`
    pub fn validate(self) -> ValidationResult<ClienteInput> {
        let nome = validate_required("nome", &self.nome)?;
        validate_max_len("nome", &nome, 150)?;

        let cpf = normalize_optional(self.cpf);
        if let Some(cpf) = &cpf {
            validate_cpf(cpf)?;
        }

        let email = normalize_optional(self.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }

        Ok(ClienteInput {
            nome,
            cpf,
            email,
            telefone: normalize_optional(self.telefone),
            data_nascimento: self.data_nascimento,
            observacoes: normalize_optional(self.observacoes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cliente_input_normalizes_blank_fields() {
        let input = ClienteInput {
            nome: "  Maria Souza ".to_string(),
            cpf: Some("".to_string()),
            email: Some("  ".to_string()),
            telefone: Some(" (11) 98765-4321 ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(input.nome, "Maria Souza");
        assert_eq!(input.cpf, None);
        assert_eq!(input.email, None);
        assert_eq!(input.telefone.as_deref(), Some("(11) 98765-4321"));
    }

    #[test]
    fn test_cliente_input_requires_nome() {
        assert!(ClienteInput::default().validate().is_err());
    }

    #[test]
    fn test_cliente_input_checks_documents_when_present() {
        let bad_cpf = ClienteInput {
            nome: "João".to_string(),
            cpf: Some("123.456.789-00".to_string()),
            ..Default::default()
        };
        assert!(bad_cpf.validate().is_err());

        let bad_email = ClienteInput {
            nome: "João".to_string(),
            email: Some("joao.com".to_string()),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_idade() {
        let now = Utc::now();
        let cliente = Cliente {
            id: "c1".to_string(),
            nome: "Ana".to_string(),
            cpf: None,
            email: None,
            telefone: None,
            data_nascimento: NaiveDate::from_ymd_opt(2000, 6, 30),
            observacoes: None,
            created_at: now,
            updated_at: now,
        };
        let today = NaiveDate::from_ymd_opt(2025, 6, 29).unwrap();
        assert_eq!(cliente.idade(today), Some(24));
    }
}
