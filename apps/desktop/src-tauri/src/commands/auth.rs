//! # Auth Commands
//!
//! Local accounts. A successful sign-in stores the session in
//! [`SessionState`]; wrong e-mail and wrong password give the same answer.

use avelar_core::{NovoUsuarioInput, Session, Usuario};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, SessionState};

pub const CREDENCIAIS_INVALIDAS: &str = "Email ou senha inválidos";

pub async fn create_user(db: &DbState, input: NovoUsuarioInput) -> ApiResult<Usuario> {
    debug!(email = %input.email, "create_user command");
    Ok(db.inner().usuarios().create(input).await?)
}

pub async fn sign_in(
    db: &DbState,
    session: &SessionState,
    email: &str,
    senha: &str,
) -> ApiResult<Session> {
    debug!(email = %email, "sign_in command");

    let usuario = db
        .inner()
        .usuarios()
        .verify_credentials(email, senha)
        .await?;

    match usuario {
        Some(usuario) => {
            let nova = Session::new(&usuario);
            session.set(nova.clone());
            info!(usuario_id = %usuario.id, "Session started");
            Ok(nova)
        }
        None => {
            warn!(email = %email, "Rejected sign-in");
            Err(ApiError::unauthorized(CREDENCIAIS_INVALIDAS))
        }
    }
}

pub fn sign_out(session: &SessionState) {
    if let Some(antiga) = session.clear() {
        info!(usuario_id = %antiga.usuario_id, "User signed out");
    }
}

pub fn current_session(session: &SessionState) -> Option<Session> {
    session.current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    fn novo() -> NovoUsuarioInput {
        NovoUsuarioInput {
            email: "Ana@Avelar.com.br".to_string(),
            nome: "Ana".to_string(),
            senha: "segredo1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let db = test_support::db().await;
        let session = SessionState::new();
        create_user(&db, novo()).await.unwrap();

        let s = sign_in(&db, &session, "ana@avelar.com.br", "segredo1")
            .await
            .unwrap();
        assert_eq!(s.nome, "Ana");
        assert_eq!(current_session(&session), Some(s));

        sign_out(&session);
        assert!(current_session(&session).is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let db = test_support::db().await;
        let session = SessionState::new();
        create_user(&db, novo()).await.unwrap();

        let err = sign_in(&db, &session, "ana@avelar.com.br", "errada")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, CREDENCIAIS_INVALIDAS);

        let err = sign_in(&db, &session, "ninguem@avelar.com.br", "segredo1")
            .await
            .unwrap_err();
        assert_eq!(err.message, CREDENCIAIS_INVALIDAS);
        assert!(current_session(&session).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = test_support::db().await;
        create_user(&db, novo()).await.unwrap();
        let err = create_user(&db, novo()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
