//! Local user accounts and the signed-in session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{validate_email, validate_max_len, validate_required, ValidationResult};
use crate::ValidationError;

/// Minimum password length accepted on sign-up.
pub const SENHA_MIN_CHARS: usize = 6;

/// A user row. The password hash never leaves the database crate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Usuario {
    pub id: String,
    pub email: String,
    pub nome: String,
    pub ativo: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub usuario_id: String,
    pub email: String,
    pub nome: String,
    #[ts(as = "String")]
    pub iniciada_em: DateTime<Utc>,
}

impl Session {
    pub fn new(usuario: &Usuario) -> Self {
        Session {
            usuario_id: usuario.id.clone(),
            email: usuario.email.clone(),
            nome: usuario.nome.clone(),
            iniciada_em: Utc::now(),
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NovoUsuarioInput {
    pub email: String,
    pub nome: String,
    pub senha: String,
}

impl NovoUsuarioInput {
    /// E-mail is trimmed and lower-cased.
    pub fn validate(self) -> ValidationResult<NovoUsuarioInput> {
        let email = validate_required("email", &self.email)?.to_lowercase();
        validate_email(&email)?;
        let nome = validate_required("nome", &self.nome)?;
        validate_max_len("nome", &nome, 150)?;
        if self.senha.chars().count() < SENHA_MIN_CHARS {
            return Err(ValidationError::InvalidFormat {
                field: "senha".to_string(),
                reason: format!("mínimo de {SENHA_MIN_CHARS} caracteres"),
            });
        }

        Ok(NovoUsuarioInput {
            email,
            nome,
            senha: self.senha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novo_usuario_validation() {
        let ok = NovoUsuarioInput {
            email: "  Gerente@Avelar.com.br ".to_string(),
            nome: "Gerente".to_string(),
            senha: "segredo123".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "gerente@avelar.com.br");

        let curta = NovoUsuarioInput {
            email: "a@b.com".to_string(),
            nome: "A".to_string(),
            senha: "123".to_string(),
        };
        assert!(curta.validate().is_err());
    }
}
