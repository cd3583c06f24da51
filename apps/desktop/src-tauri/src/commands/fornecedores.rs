//! # Supplier Commands
//!
//! Supplier registry, star ratings and the performance report.

use avelar_core::validation::ESTADOS_BRASILEIROS;
use avelar_core::{
    render_stars, Avaliacao, AvaliacaoInput, CategoriaFornecedor, Estrela, Fornecedor,
    FornecedorInput, FornecedorResumo, RelatorioFornecedores,
};
use serde::Serialize;
use tracing::debug;

use super::parse_filtro;
use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// A UF option of the state select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estado {
    pub uf: &'static str,
    pub nome: &'static str,
}

/// Supplier row with its stars already laid out.
#[derive(Debug, Clone, Serialize)]
pub struct FornecedorCard {
    #[serde(flatten)]
    pub resumo: FornecedorResumo,
    pub estrelas: [Estrela; 5],
}

impl From<FornecedorResumo> for FornecedorCard {
    fn from(resumo: FornecedorResumo) -> Self {
        FornecedorCard {
            estrelas: render_stars(resumo.media_avaliacao),
            resumo,
        }
    }
}

fn parse_status(status: Option<&str>) -> ApiResult<Option<bool>> {
    match status.map(str::trim) {
        None | Some("") | Some(super::TODOS) => Ok(None),
        Some("ativo") => Ok(Some(true)),
        Some("inativo") => Ok(Some(false)),
        Some(other) => Err(ApiError::validation(format!("status inválido: {}", other))),
    }
}

/// Suppliers by name; `categoria` and `status` (`ativo`, `inativo`) accept
/// `todos`.
pub async fn list_fornecedores(
    db: &DbState,
    categoria: Option<&str>,
    status: Option<&str>,
) -> ApiResult<Vec<FornecedorCard>> {
    let categoria = parse_filtro::<CategoriaFornecedor>("categoria", categoria)?;
    let ativo = parse_status(status)?;
    debug!(?categoria, ?ativo, "list_fornecedores command");

    let fornecedores = db.inner().fornecedores().list(categoria, ativo).await?;
    Ok(fornecedores.into_iter().map(FornecedorCard::from).collect())
}

pub async fn get_fornecedor(db: &DbState, id: &str) -> ApiResult<Fornecedor> {
    Ok(db.inner().fornecedores().get(id).await?)
}

pub async fn create_fornecedor(db: &DbState, input: FornecedorInput) -> ApiResult<Fornecedor> {
    debug!(nome = %input.nome, "create_fornecedor command");
    Ok(db.inner().fornecedores().create(input).await?)
}

pub async fn update_fornecedor(
    db: &DbState,
    id: &str,
    input: FornecedorInput,
) -> ApiResult<Fornecedor> {
    Ok(db.inner().fornecedores().update(id, input).await?)
}

/// Rates a supplier. No star picked gives `Selecione uma avaliação!`.
pub async fn avaliar_fornecedor(
    db: &DbState,
    id: &str,
    input: AvaliacaoInput,
) -> ApiResult<Avaliacao> {
    debug!(id = %id, nota = input.nota, "avaliar_fornecedor command");
    Ok(db.inner().fornecedores().avaliar(id, input).await?)
}

pub async fn list_avaliacoes(db: &DbState, id: &str) -> ApiResult<Vec<Avaliacao>> {
    Ok(db.inner().fornecedores().avaliacoes(id).await?)
}

pub async fn relatorio_fornecedores(db: &DbState) -> ApiResult<RelatorioFornecedores> {
    Ok(db.inner().fornecedores().relatorio().await?)
}

pub fn estados_brasileiros() -> Vec<Estado> {
    ESTADOS_BRASILEIROS
        .iter()
        .map(|&(uf, nome)| Estado { uf, nome })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_filters_and_rating() {
        let db = test_support::db().await;
        let zeiss = create_fornecedor(
            &db,
            FornecedorInput::new("Zeiss", CategoriaFornecedor::LaboratorioLentes),
        )
        .await
        .unwrap();
        let mut inativo = FornecedorInput::new("Acme Estojos", CategoriaFornecedor::Acessorios);
        inativo.ativo = false;
        create_fornecedor(&db, inativo).await.unwrap();

        assert_eq!(list_fornecedores(&db, None, Some("todos")).await.unwrap().len(), 2);
        assert_eq!(list_fornecedores(&db, None, Some("ativo")).await.unwrap().len(), 1);
        assert_eq!(
            list_fornecedores(&db, Some("acessorios"), None).await.unwrap()[0]
                .resumo
                .fornecedor
                .nome,
            "Acme Estojos"
        );

        let err = avaliar_fornecedor(&db, &zeiss.id, AvaliacaoInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Selecione uma avaliação!");

        for nota in [5, 4] {
            avaliar_fornecedor(
                &db,
                &zeiss.id,
                AvaliacaoInput {
                    nota,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        let cards = list_fornecedores(&db, Some("laboratorio_lentes"), None)
            .await
            .unwrap();
        assert_eq!(cards[0].resumo.total_avaliacoes, 2);
        assert_eq!(cards[0].estrelas[3], Estrela::Cheia);
        assert_eq!(cards[0].estrelas[4], Estrela::Meia);
        assert_eq!(list_avaliacoes(&db, &zeiss.id).await.unwrap().len(), 2);

        let relatorio = relatorio_fornecedores(&db).await.unwrap();
        assert_eq!(relatorio.total_fornecedores, 2);
        assert_eq!(relatorio.fornecedores_ativos, 1);
    }

    #[tokio::test]
    async fn test_invalid_status_filter() {
        let db = test_support::db().await;
        let err = list_fornecedores(&db, None, Some("suspenso")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_estados() {
        let estados = estados_brasileiros();
        assert_eq!(estados.len(), 27);
        assert!(estados.iter().any(|e| e.uf == "SP" && e.nome == "São Paulo"));
    }
}
