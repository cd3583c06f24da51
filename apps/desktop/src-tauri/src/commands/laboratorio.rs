//! # Laboratory Commands
//!
//! Service orders moving through the nine lab stages.

use avelar_core::{
    EtapaOs, OrdemServico, OrdemServicoDetalhe, OrdemServicoInput, OrdemServicoResumo,
    RelatorioProdutividade,
};
use chrono::NaiveDate;
use tracing::debug;

use super::parse_filtro;
use crate::error::ApiResult;
use crate::state::DbState;

const LIST_LIMIT: i64 = 50;

/// Newest 50 orders, optionally of one stage (`todos` for all).
pub async fn list_ordens(db: &DbState, status: Option<&str>) -> ApiResult<Vec<OrdemServicoResumo>> {
    let status = parse_filtro::<EtapaOs>("status", status)?;
    debug!(?status, "list_ordens command");
    Ok(db.inner().ordens_servico().list(status, LIST_LIMIT).await?)
}

/// Numbered `count + 1` (`0001`) and started at recebimento.
pub async fn create_ordem(db: &DbState, input: OrdemServicoInput) -> ApiResult<OrdemServico> {
    Ok(db.inner().ordens_servico().create(input).await?)
}

pub async fn update_ordem(
    db: &DbState,
    id: &str,
    input: OrdemServicoInput,
) -> ApiResult<OrdemServico> {
    Ok(db.inner().ordens_servico().update(id, input).await?)
}

pub async fn get_ordem_detalhes(db: &DbState, id: &str) -> ApiResult<OrdemServicoDetalhe> {
    Ok(db.inner().ordens_servico().detalhes(id).await?)
}

pub async fn avancar_etapa(db: &DbState, id: &str) -> ApiResult<OrdemServico> {
    debug!(id = %id, "avancar_etapa command");
    Ok(db.inner().ordens_servico().avancar_etapa(id).await?)
}

pub async fn relatorio_produtividade(
    db: &DbState,
    today: NaiveDate,
) -> ApiResult<RelatorioProdutividade> {
    Ok(db.inner().ordens_servico().relatorio_produtividade(today).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;
    use avelar_core::{ClienteInput, TipoServico, Urgencia};

    #[tokio::test]
    async fn test_order_walks_to_pronto() {
        let db = test_support::db().await;
        let cliente = db
            .inner()
            .clientes()
            .create(ClienteInput {
                nome: "Carlos".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let ordem = create_ordem(
            &db,
            OrdemServicoInput {
                venda_id: None,
                cliente_id: cliente.id,
                receita_id: None,
                tipo_servico: TipoServico::MontagemArmacao,
                urgencia: Urgencia::Normal,
                armacao: Some("Ray-Ban RB5154".to_string()),
                lentes: None,
                observacoes_tecnicas: None,
                prazo_entrega: None,
                tecnico_responsavel: None,
                custo_servico: 3_000,
                valor_servico: 8_000,
            },
        )
        .await
        .unwrap();
        assert_eq!(ordem.numero_os, "0001");
        assert_eq!(ordem.status, EtapaOs::Recebimento);

        let detalhes = get_ordem_detalhes(&db, &ordem.id).await.unwrap();
        assert_eq!(detalhes.lucro, 5_000);

        for _ in 0..8 {
            avancar_etapa(&db, &ordem.id).await.unwrap();
        }
        let err = avancar_etapa(&db, &ordem.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Esta OS já está na etapa final!");

        assert_eq!(list_ordens(&db, Some("pronto")).await.unwrap().len(), 1);
        assert!(list_ordens(&db, Some("analise")).await.unwrap().is_empty());
        assert_eq!(list_ordens(&db, Some("todos")).await.unwrap().len(), 1);
    }
}
