//! # Contact Lens Commands
//!
//! Lens catalog with technical sheets, batch expiry tracking and patient
//! follow-up visits.

use avelar_core::{
    alerta_validade, AlertaValidade, ControleLente, ControleLenteInput, ControleLenteResumo,
    LenteContato, LenteContatoInput, LoteInput, LoteValidade, RelatorioLentes,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;

/// A batch row with its expiry badge.
#[derive(Debug, Clone, Serialize)]
pub struct LoteComAlerta {
    #[serde(flatten)]
    pub lote: LoteValidade,
    pub alerta: AlertaValidade,
}

pub async fn list_lentes(db: &DbState) -> ApiResult<Vec<LenteContato>> {
    Ok(db.inner().lentes_contato().list().await?)
}

pub async fn get_lente(db: &DbState, produto_id: &str) -> ApiResult<LenteContato> {
    Ok(db.inner().lentes_contato().get(produto_id).await?)
}

/// Creates (`id` absent) or updates a lens and its sheet in one write.
pub async fn save_lente(
    db: &DbState,
    id: Option<&str>,
    input: LenteContatoInput,
) -> ApiResult<LenteContato> {
    debug!(id = ?id, nome = %input.produto.nome, "save_lente command");
    Ok(db.inner().lentes_contato().save(id, input).await?)
}

pub async fn registrar_lote(db: &DbState, input: LoteInput) -> ApiResult<LoteValidade> {
    debug!(produto_id = %input.produto_id, lote = %input.numero_lote, "registrar_lote command");
    Ok(db.inner().lentes_contato().registrar_lote(input).await?)
}

pub async fn list_lotes(
    db: &DbState,
    produto_id: &str,
    today: NaiveDate,
) -> ApiResult<Vec<LoteComAlerta>> {
    let lotes = db.inner().lentes_contato().lotes(produto_id).await?;
    Ok(lotes
        .into_iter()
        .map(|lote| LoteComAlerta {
            alerta: alerta_validade(lote.data_validade, today),
            lote,
        })
        .collect())
}

pub async fn list_controles(db: &DbState) -> ApiResult<Vec<ControleLenteResumo>> {
    Ok(db.inner().lentes_contato().list_controles().await?)
}

pub async fn get_controle(db: &DbState, id: &str) -> ApiResult<ControleLente> {
    Ok(db.inner().lentes_contato().get_controle(id).await?)
}

pub async fn save_controle(
    db: &DbState,
    id: Option<&str>,
    input: ControleLenteInput,
) -> ApiResult<ControleLente> {
    Ok(db.inner().lentes_contato().save_controle(id, input).await?)
}

/// Marks the visit as done at `agora`.
pub async fn realizar_controle(
    db: &DbState,
    id: &str,
    agora: DateTime<Utc>,
) -> ApiResult<ControleLente> {
    debug!(id = %id, "realizar_controle command");
    Ok(db.inner().lentes_contato().realizar_controle(id, agora).await?)
}

pub async fn controles_atrasados(
    db: &DbState,
    today: NaiveDate,
) -> ApiResult<Vec<ControleLenteResumo>> {
    Ok(db.inner().lentes_contato().controles_atrasados(today).await?)
}

pub async fn relatorio_lentes(db: &DbState, today: NaiveDate) -> ApiResult<RelatorioLentes> {
    Ok(db.inner().lentes_contato().relatorio(today).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;
    use avelar_core::{
        CategoriaProduto, ClienteInput, EspecificacaoLenteInput, NivelValidade, ProdutoInput,
        StatusControle, TipoLenteContato, TipoSubstituicao,
    };

    fn lente(validade_meses: Option<i64>) -> LenteContatoInput {
        let mut produto = ProdutoInput::new("Biofinity", CategoriaProduto::Acessorio, 15_900);
        produto.estoque_atual = 12;
        LenteContatoInput {
            produto,
            especificacao: EspecificacaoLenteInput {
                tipo_lente: TipoLenteContato::Gelatinosa,
                curva_base: Some(8.6),
                diametro: Some(14.0),
                material: None,
                conteudo_agua: Some(48),
                tipo_substituicao: TipoSubstituicao::Mensal,
                transmissibilidade: None,
                grau_minimo: Some(-10.0),
                grau_maximo: Some(6.0),
                cilindro_minimo: None,
                cilindro_maximo: None,
                validade_meses,
            },
        }
    }

    #[tokio::test]
    async fn test_lotes_carry_expiry_alert() {
        let db = test_support::db().await;
        let salva = save_lente(&db, None, lente(Some(12))).await.unwrap();
        assert_eq!(salva.produto.categoria, CategoriaProduto::LenteContato);

        let lote = |numero: &str, fabricacao| LoteInput {
            produto_id: salva.produto.id.clone(),
            numero_lote: numero.to_string(),
            data_fabricacao: fabricacao,
            data_validade: None,
            quantidade_lote: 10,
            observacoes: None,
        };
        registrar_lote(&db, lote("A1", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
            .await
            .unwrap();
        registrar_lote(&db, lote("B2", NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()))
            .await
            .unwrap();

        let lotes = list_lotes(&db, &salva.produto.id, test_support::today())
            .await
            .unwrap();
        assert_eq!(lotes.len(), 2);
        let a1 = lotes.iter().find(|l| l.lote.numero_lote == "A1").unwrap();
        assert_eq!(a1.alerta.nivel, NivelValidade::Vencido);
        let b2 = lotes.iter().find(|l| l.lote.numero_lote == "B2").unwrap();
        assert_eq!(b2.alerta.nivel, NivelValidade::Ok);
    }

    #[tokio::test]
    async fn test_shelf_life_out_of_range() {
        let db = test_support::db().await;
        let err = save_lente(&db, None, lente(Some(0))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_follow_up_flow() {
        let db = test_support::db().await;
        let cliente = db
            .inner()
            .clientes()
            .create(ClienteInput {
                nome: "Otávio".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let controle = save_controle(
            &db,
            None,
            ControleLenteInput {
                cliente_id: cliente.id.clone(),
                produto_id: None,
                data_ultima_compra: None,
                data_proximo_controle: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                frequencia_uso: None,
                horas_uso_diario: Some(8),
                solucao_limpeza: None,
                observacoes: None,
            },
        )
        .await
        .unwrap();

        let today = test_support::today();
        assert_eq!(controles_atrasados(&db, today).await.unwrap().len(), 1);

        let feito = realizar_controle(&db, &controle.id, Utc::now()).await.unwrap();
        assert_eq!(feito.status, StatusControle::Realizado);
        assert!(feito.data_ultimo_controle.is_some());
        assert!(controles_atrasados(&db, today).await.unwrap().is_empty());
        assert_eq!(list_controles(&db).await.unwrap().len(), 1);
    }
}
