//! # Customer Commands

use avelar_core::{Cliente, ClienteInput, ClienteOption};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;

const LIST_LIMIT: i64 = 100;
const SEARCH_LIMIT: i64 = 50;

/// Customers by name, first 100.
pub async fn list_clientes(db: &DbState) -> ApiResult<Vec<Cliente>> {
    debug!("list_clientes command");
    Ok(db.inner().clientes().list(LIST_LIMIT).await?)
}

/// Name, CPF or e-mail search. A blank query lists.
pub async fn search_clientes(db: &DbState, query: &str) -> ApiResult<Vec<Cliente>> {
    debug!(query = %query, "search_clientes command");
    Ok(db.inner().clientes().search(query, SEARCH_LIMIT).await?)
}

pub async fn get_cliente(db: &DbState, id: &str) -> ApiResult<Cliente> {
    Ok(db.inner().clientes().get(id).await?)
}

pub async fn create_cliente(db: &DbState, input: ClienteInput) -> ApiResult<Cliente> {
    debug!("create_cliente command");
    Ok(db.inner().clientes().create(input).await?)
}

pub async fn update_cliente(db: &DbState, id: &str, input: ClienteInput) -> ApiResult<Cliente> {
    debug!(id = %id, "update_cliente command");
    Ok(db.inner().clientes().update(id, input).await?)
}

/// Customer picker entries for the other screens.
pub async fn cliente_options(db: &DbState) -> ApiResult<Vec<ClienteOption>> {
    Ok(db.inner().clientes().options().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    fn input(nome: &str, cpf: Option<&str>) -> ClienteInput {
        ClienteInput {
            nome: nome.to_string(),
            cpf: cpf.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_search_update() {
        let db = test_support::db().await;
        let maria = create_cliente(&db, input("Maria Souza", Some("529.982.247-25")))
            .await
            .unwrap();
        create_cliente(&db, input("João Lima", None)).await.unwrap();

        let found = search_clientes(&db, "maria").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, maria.id);

        let all = search_clientes(&db, "  ").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].nome, "João Lima");

        let updated = update_cliente(&db, &maria.id, input("Maria Souza Avelar", None))
            .await
            .unwrap();
        assert_eq!(get_cliente(&db, &maria.id).await.unwrap().nome, updated.nome);
        assert_eq!(cliente_options(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_cpf_rejected() {
        let db = test_support::db().await;
        let err = create_cliente(&db, input("Pedro", Some("111.111.111-11")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_clientes(&db).await.unwrap().is_empty());
    }
}
