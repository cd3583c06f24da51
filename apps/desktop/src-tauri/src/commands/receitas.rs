//! # Prescription Commands

use avelar_core::{Dispositivo, Receita, ReceitaInput, ReceitaResumo};
use chrono::NaiveDate;
use tracing::debug;

use super::TODOS;
use crate::error::ApiResult;
use crate::state::DbState;

const LIST_LIMIT: i64 = 100;

/// Newest 100 with the customer name.
pub async fn list_receitas(db: &DbState) -> ApiResult<Vec<ReceitaResumo>> {
    debug!("list_receitas command");
    Ok(db.inner().receitas().list(LIST_LIMIT).await?)
}

/// One customer's prescriptions; `todos` or blank lists all.
pub async fn list_receitas_cliente(db: &DbState, cliente_id: &str) -> ApiResult<Vec<ReceitaResumo>> {
    let cliente_id = cliente_id.trim();
    if cliente_id.is_empty() || cliente_id == TODOS {
        return list_receitas(db).await;
    }
    Ok(db.inner().receitas().list_cliente(cliente_id).await?)
}

pub async fn get_receita(db: &DbState, id: &str) -> ApiResult<Receita> {
    Ok(db.inner().receitas().get(id).await?)
}

/// Missing `idade` is derived from the customer's birth date.
pub async fn create_receita(
    db: &DbState,
    input: ReceitaInput,
    today: NaiveDate,
) -> ApiResult<Receita> {
    debug!(cliente_id = %input.cliente_id, "create_receita command");
    Ok(db.inner().receitas().create(input, today).await?)
}

pub async fn update_receita(
    db: &DbState,
    id: &str,
    input: ReceitaInput,
    today: NaiveDate,
) -> ApiResult<Receita> {
    Ok(db.inner().receitas().update(id, input, today).await?)
}

/// Unsaved copy dated today, valid for a year.
pub async fn renovar_receita(db: &DbState, id: &str, today: NaiveDate) -> ApiResult<ReceitaInput> {
    Ok(db.inner().receitas().renovar(id, today).await?)
}

/// Fields an instrument import fills in.
pub fn campos_dispositivo(dispositivo: Dispositivo) -> Vec<&'static str> {
    dispositivo.campos().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use avelar_core::ClienteInput;

    #[tokio::test]
    async fn test_list_by_cliente_and_renew() {
        let db = test_support::db().await;
        let today = test_support::today();
        let cliente = db
            .inner()
            .clientes()
            .create(ClienteInput {
                nome: "Beatriz".to_string(),
                data_nascimento: NaiveDate::from_ymd_opt(1990, 8, 1),
                ..Default::default()
            })
            .await
            .unwrap();

        let receita = create_receita(
            &db,
            ReceitaInput {
                cliente_id: cliente.id.clone(),
                od_esferico: Some(-1.25),
                oe_esferico: Some(-1.0),
                data_receita: NaiveDate::from_ymd_opt(2024, 6, 1),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
        assert_eq!(receita.idade, Some(33));

        assert_eq!(list_receitas_cliente(&db, &cliente.id).await.unwrap().len(), 1);
        assert_eq!(list_receitas_cliente(&db, "todos").await.unwrap().len(), 1);
        assert!(list_receitas_cliente(&db, "outro").await.unwrap().is_empty());

        let rascunho = renovar_receita(&db, &receita.id, today).await.unwrap();
        assert_eq!(rascunho.data_receita, Some(today));
        assert!(rascunho
            .observacoes
            .unwrap()
            .starts_with("Renovação da receita anterior de 01/06/2024."));
        assert_eq!(list_receitas(&db).await.unwrap().len(), 1);
    }

    #[test]
    fn test_campos_dispositivo() {
        assert_eq!(
            campos_dispositivo(Dispositivo::Keratometer),
            vec!["curva_corneana_od", "curva_corneana_oe"]
        );
    }
}
