//! # User Repository
//!
//! Local accounts for signing in to the store terminal. Passwords are
//! stored as argon2 PHC strings and never leave this module.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::{NovoUsuarioInput, Usuario, ValidationError};

use crate::error::{DbError, DbResult};

const USUARIO_COLUMNS: &str = "id, email, nome, ativo, created_at";

#[derive(Debug, Clone)]
pub struct UsuarioRepository {
    pool: SqlitePool,
}

impl UsuarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UsuarioRepository { pool }
    }

    /// Creates an account. A taken e-mail is a validation error.
    pub async fn create(&self, input: NovoUsuarioInput) -> DbResult<Usuario> {
        let input = input.validate()?;
        let senha_hash = hash_senha(&input.senha)?;

        let usuario = Usuario {
            id: Uuid::new_v4().to_string(),
            email: input.email,
            nome: input.nome,
            ativo: true,
            created_at: Utc::now(),
        };

        debug!(id = %usuario.id, email = %usuario.email, "Creating user");

        let result = sqlx::query(
            "INSERT INTO usuarios (id, email, nome, senha_hash, ativo, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&usuario.id)
        .bind(&usuario.email)
        .bind(&usuario.nome)
        .bind(&senha_hash)
        .bind(usuario.ativo)
        .bind(usuario.created_at)
        .execute(&self.pool)
        .await;

        match result.map_err(DbError::from) {
            Ok(_) => Ok(usuario),
            Err(e) if e.is_unique_violation_on("usuarios.email") => {
                Err(ValidationError::Duplicate {
                    field: "email".to_string(),
                    value: usuario.email,
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Usuario>> {
        let sql = format!("SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = ?1");
        let usuario = sqlx::query_as::<_, Usuario>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    /// Returns the active user when the e-mail and password match.
    ///
    /// Unknown e-mail, inactive account and wrong password all yield `None`
    /// so the caller cannot tell them apart.
    pub async fn verify_credentials(&self, email: &str, senha: &str) -> DbResult<Option<Usuario>> {
        let email = email.trim().to_lowercase();

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, senha_hash FROM usuarios WHERE email = ?1 AND ativo = 1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, senha_hash)) = row else {
            debug!(email = %email, "Sign-in for unknown e-mail");
            return Ok(None);
        };

        if !verificar_senha(senha, &senha_hash) {
            debug!(email = %email, "Sign-in with wrong password");
            return Ok(None);
        }

        info!(email = %email, "User signed in");
        self.get_by_id(&id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn hash_senha(senha: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Falha ao gerar hash da senha: {e}")))?;
    Ok(hash.to_string())
}

fn verificar_senha(senha: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(senha.as_bytes(), &parsed)
        .is_ok()
}
