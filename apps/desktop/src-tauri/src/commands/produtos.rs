//! # Product Commands
//!
//! Catalogue CRUD plus the category-specific attribute fields the product
//! form renders.

use avelar_core::{format_label, CategoriaProduto, Produto, ProdutoInput};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;

/// One attribute input of the product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampoEspecifico {
    pub key: &'static str,
    pub label: String,
}

/// Products by category then name.
pub async fn list_produtos(db: &DbState) -> ApiResult<Vec<Produto>> {
    debug!("list_produtos command");
    Ok(db.inner().produtos().list().await?)
}

pub async fn get_produto(db: &DbState, id: &str) -> ApiResult<Produto> {
    Ok(db.inner().produtos().get(id).await?)
}

/// A SKU already in use is a validation error.
pub async fn create_produto(db: &DbState, input: ProdutoInput) -> ApiResult<Produto> {
    debug!(nome = %input.nome, "create_produto command");
    Ok(db.inner().produtos().create(input).await?)
}

pub async fn update_produto(db: &DbState, id: &str, input: ProdutoInput) -> ApiResult<Produto> {
    debug!(id = %id, "update_produto command");
    Ok(db.inner().produtos().update(id, input).await?)
}

pub fn campos_especificos(categoria: CategoriaProduto) -> Vec<CampoEspecifico> {
    categoria
        .campos_especificos()
        .iter()
        .map(|key| CampoEspecifico {
            key,
            label: format_label(key),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    #[test]
    fn test_campos_especificos() {
        let campos = campos_especificos(CategoriaProduto::Lente);
        assert_eq!(campos[0].key, "tipo_lente");
        assert_eq!(campos[0].label, "Tipo Lente");
        assert!(campos.iter().any(|c| c.label == "Indice Refracao"));
    }

    #[tokio::test]
    async fn test_create_with_especificacoes() {
        let db = test_support::db().await;
        let mut input = ProdutoInput::new("Ray-Ban RB5154", CategoriaProduto::Armacao, 45_990);
        input.sku = Some("ARM-0001".to_string());
        input.especificacoes.insert("ponte".to_string(), "21".to_string());
        input.especificacoes.insert("indice_refracao".to_string(), "1.67".to_string());
        input.especificacoes.insert("aro".to_string(), " ".to_string());

        let produto = create_produto(&db, input).await.unwrap();
        assert_eq!(produto.especificacoes.len(), 1);
        assert_eq!(produto.especificacoes["ponte"], "21");

        let mut dup = ProdutoInput::new("Outra", CategoriaProduto::Armacao, 100);
        dup.sku = Some("ARM-0001".to_string());
        let err = create_produto(&db, dup).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
