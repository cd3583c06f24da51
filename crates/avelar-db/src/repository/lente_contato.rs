//! # Contact Lens Repository
//!
//! A contact lens is a `lente_contato` product plus its technical sheet in
//! `lentes_contato`. This repository also keeps batch expiry records and
//! the patient follow-up visits.
//!
//! ```text
//! produtos (categoria = lente_contato)
//!    │ 1:1
//!    ├── lentes_contato          technical sheet
//!    │ 1:N
//!    ├── controles_validade_lc   batches and expiry dates
//!    │ 1:N
//!    └── controles_lentes_contato   patient follow-ups
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::dates::first_day_of_month;
use avelar_core::{
    relatorio_lentes, CategoriaProduto, ControleLente, ControleLenteInput, ControleLenteResumo,
    EspecificacaoLente, EspecificacaoLenteInput, ItemVendidoLente, LenteContato,
    LenteContatoInput, LoteInput, LoteValidade, Produto, RelatorioLentes, StatusControle,
    StatusVenda, VALIDADE_PADRAO_MESES,
};

use crate::error::{DbError, DbResult};
use crate::repository::produto::{insert_produto, update_produto, PRODUTO_COLUMNS};

const ESPECIFICACAO_COLUMNS: &str = "produto_id, tipo_lente, curva_base, diametro, material, \
     conteudo_agua, tipo_substituicao, transmissibilidade, grau_minimo, grau_maximo, \
     cilindro_minimo, cilindro_maximo, validade_meses";

const CONTROLE_COLUMNS: &str = "k.id, k.cliente_id, k.produto_id, k.data_ultima_compra, \
     k.data_proximo_controle, k.data_ultimo_controle, k.frequencia_uso, k.horas_uso_diario, \
     k.solucao_limpeza, k.observacoes, k.status, k.created_at";

#[derive(Debug, Clone)]
pub struct LenteContatoRepository {
    pool: SqlitePool,
}

impl LenteContatoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LenteContatoRepository { pool }
    }

    // =========================================================================
    // Lenses
    // =========================================================================

    /// Active lenses by name, each with its technical sheet when one exists.
    pub async fn list(&self) -> DbResult<Vec<LenteContato>> {
        let sql = format!(
            "SELECT {PRODUTO_COLUMNS} FROM produtos
             WHERE categoria = ?1 AND ativo = 1
             ORDER BY nome"
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(CategoriaProduto::LenteContato)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT {ESPECIFICACAO_COLUMNS} FROM lentes_contato");
        let mut especificacoes: HashMap<String, EspecificacaoLente> =
            sqlx::query_as::<_, EspecificacaoLente>(&sql)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|e| (e.produto_id.clone(), e))
                .collect();

        let lentes: Vec<LenteContato> = produtos
            .into_iter()
            .map(|produto| LenteContato {
                especificacao: especificacoes.remove(&produto.id),
                produto,
            })
            .collect();

        debug!(count = lentes.len(), "Listed contact lenses");
        Ok(lentes)
    }

    pub async fn get(&self, produto_id: &str) -> DbResult<LenteContato> {
        let sql = format!("SELECT {PRODUTO_COLUMNS} FROM produtos WHERE id = ?1 AND categoria = ?2");
        let produto = sqlx::query_as::<_, Produto>(&sql)
            .bind(produto_id)
            .bind(CategoriaProduto::LenteContato)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Lente de contato", produto_id))?;

        let sql = format!("SELECT {ESPECIFICACAO_COLUMNS} FROM lentes_contato WHERE produto_id = ?1");
        let especificacao = sqlx::query_as::<_, EspecificacaoLente>(&sql)
            .bind(produto_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(LenteContato {
            produto,
            especificacao,
        })
    }

    /// Creates (`id = None`) or updates a lens. Product and technical sheet
    /// are written in one transaction.
    pub async fn save(&self, id: Option<&str>, input: LenteContatoInput) -> DbResult<LenteContato> {
        let input = input.validate()?;
        let mut tx = self.pool.begin().await?;

        let produto_id = match id {
            Some(id) => {
                if update_produto(&mut *tx, id, &input.produto).await? == 0 {
                    return Err(DbError::not_found("Lente de contato", id));
                }
                id.to_string()
            }
            None => insert_produto(&mut *tx, input.produto).await?.id,
        };
        upsert_especificacao(&mut *tx, &produto_id, &input.especificacao).await?;

        tx.commit().await?;

        info!(produto_id = %produto_id, novo = id.is_none(), "Contact lens saved");
        self.get(&produto_id).await
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Records a batch. Without an explicit expiry date the lens shelf life
    /// is added to the manufacturing date.
    pub async fn registrar_lote(&self, input: LoteInput) -> DbResult<LoteValidade> {
        let input = input.validate()?;
        let lente = self.get(&input.produto_id).await?;
        let data_validade = input.resolver_validade(lente.validade_meses());

        let lote = LoteValidade {
            id: Uuid::new_v4().to_string(),
            produto_id: input.produto_id,
            numero_lote: input.numero_lote,
            data_fabricacao: input.data_fabricacao,
            data_validade,
            quantidade_lote: input.quantidade_lote,
            observacoes: input.observacoes,
            data_controle: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO controles_validade_lc (
                id, produto_id, numero_lote, data_fabricacao, data_validade,
                quantidade_lote, observacoes, data_controle
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&lote.id)
        .bind(&lote.produto_id)
        .bind(&lote.numero_lote)
        .bind(lote.data_fabricacao)
        .bind(lote.data_validade)
        .bind(lote.quantidade_lote)
        .bind(&lote.observacoes)
        .bind(lote.data_controle)
        .execute(&self.pool)
        .await?;

        info!(
            produto_id = %lote.produto_id,
            lote = %lote.numero_lote,
            validade = %lote.data_validade,
            "Lens batch registered"
        );
        Ok(lote)
    }

    /// Batches of one lens, soonest expiry first.
    pub async fn lotes(&self, produto_id: &str) -> DbResult<Vec<LoteValidade>> {
        let lotes = sqlx::query_as::<_, LoteValidade>(
            "SELECT id, produto_id, numero_lote, data_fabricacao, data_validade,
                    quantidade_lote, observacoes, data_controle
             FROM controles_validade_lc
             WHERE produto_id = ?1
             ORDER BY data_validade",
        )
        .bind(produto_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lotes)
    }

    // =========================================================================
    // Patient follow-ups
    // =========================================================================

    pub async fn list_controles(&self) -> DbResult<Vec<ControleLenteResumo>> {
        let sql = format!(
            "SELECT {CONTROLE_COLUMNS}, c.nome AS cliente_nome, p.nome AS produto_nome
             FROM controles_lentes_contato k
             LEFT JOIN clientes c ON c.id = k.cliente_id
             LEFT JOIN produtos p ON p.id = k.produto_id
             ORDER BY k.data_proximo_controle"
        );
        let controles = sqlx::query_as::<_, ControleLenteResumo>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = controles.len(), "Listed lens follow-ups");
        Ok(controles)
    }

    pub async fn get_controle(&self, id: &str) -> DbResult<ControleLente> {
        let sql = format!("SELECT {CONTROLE_COLUMNS} FROM controles_lentes_contato k WHERE k.id = ?1");
        sqlx::query_as::<_, ControleLente>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Controle", id))
    }

    /// Creates (`id = None`, status `agendado`) or updates a follow-up.
    pub async fn save_controle(
        &self,
        id: Option<&str>,
        input: ControleLenteInput,
    ) -> DbResult<ControleLente> {
        let input = input.validate()?;

        let id = match id {
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE controles_lentes_contato SET
                        cliente_id = ?2, produto_id = ?3, data_ultima_compra = ?4,
                        data_proximo_controle = ?5, frequencia_uso = ?6, horas_uso_diario = ?7,
                        solucao_limpeza = ?8, observacoes = ?9
                     WHERE id = ?1",
                )
                .bind(id)
                .bind(&input.cliente_id)
                .bind(&input.produto_id)
                .bind(input.data_ultima_compra)
                .bind(input.data_proximo_controle)
                .bind(&input.frequencia_uso)
                .bind(input.horas_uso_diario)
                .bind(&input.solucao_limpeza)
                .bind(&input.observacoes)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Controle", id));
                }
                id.to_string()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO controles_lentes_contato (
                        id, cliente_id, produto_id, data_ultima_compra, data_proximo_controle,
                        frequencia_uso, horas_uso_diario, solucao_limpeza, observacoes,
                        status, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )
                .bind(&id)
                .bind(&input.cliente_id)
                .bind(&input.produto_id)
                .bind(input.data_ultima_compra)
                .bind(input.data_proximo_controle)
                .bind(&input.frequencia_uso)
                .bind(input.horas_uso_diario)
                .bind(&input.solucao_limpeza)
                .bind(&input.observacoes)
                .bind(StatusControle::Agendado)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
                id
            }
        };

        debug!(id = %id, proximo = %input.data_proximo_controle, "Saved lens follow-up");
        self.get_controle(&id).await
    }

    /// Marks a follow-up as done at `agora`.
    pub async fn realizar_controle(&self, id: &str, agora: DateTime<Utc>) -> DbResult<ControleLente> {
        let result = sqlx::query(
            "UPDATE controles_lentes_contato
             SET status = ?1, data_ultimo_controle = ?2
             WHERE id = ?3",
        )
        .bind(StatusControle::Realizado)
        .bind(agora)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Controle", id));
        }

        info!(id = %id, "Lens follow-up done");
        self.get_controle(id).await
    }

    /// Scheduled follow-ups whose date is behind `today`.
    pub async fn controles_atrasados(&self, today: NaiveDate) -> DbResult<Vec<ControleLenteResumo>> {
        let sql = format!(
            "SELECT {CONTROLE_COLUMNS}, c.nome AS cliente_nome, p.nome AS produto_nome
             FROM controles_lentes_contato k
             LEFT JOIN clientes c ON c.id = k.cliente_id
             LEFT JOIN produtos p ON p.id = k.produto_id
             WHERE k.status = ?1 AND k.data_proximo_controle < ?2
             ORDER BY k.data_proximo_controle"
        );
        let controles = sqlx::query_as::<_, ControleLenteResumo>(&sql)
            .bind(StatusControle::Agendado)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;
        Ok(controles)
    }

    // =========================================================================
    // Report
    // =========================================================================

    /// Lens report over the active lenses and this month's completed sales.
    pub async fn relatorio(&self, today: NaiveDate) -> DbResult<RelatorioLentes> {
        let lentes = self.list().await?;

        let itens = sqlx::query_as::<_, ItemVendidoLente>(
            "SELECT vi.produto_id, vi.quantidade, vi.subtotal
             FROM venda_itens vi
             JOIN vendas v ON v.id = vi.venda_id
             JOIN produtos p ON p.id = vi.produto_id
             WHERE p.categoria = ?1
               AND v.status = ?2
               AND date(v.created_at, 'localtime') >= ?3",
        )
        .bind(CategoriaProduto::LenteContato)
        .bind(StatusVenda::Concluida)
        .bind(first_day_of_month(today))
        .fetch_all(&self.pool)
        .await?;

        Ok(relatorio_lentes(&lentes, &itens))
    }
}

/// Inserts or replaces the technical sheet of a lens.
async fn upsert_especificacao(
    conn: &mut SqliteConnection,
    produto_id: &str,
    e: &EspecificacaoLenteInput,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO lentes_contato (
            produto_id, tipo_lente, curva_base, diametro, material, conteudo_agua,
            tipo_substituicao, transmissibilidade, grau_minimo, grau_maximo,
            cilindro_minimo, cilindro_maximo, validade_meses
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT (produto_id) DO UPDATE SET
            tipo_lente = excluded.tipo_lente,
            curva_base = excluded.curva_base,
            diametro = excluded.diametro,
            material = excluded.material,
            conteudo_agua = excluded.conteudo_agua,
            tipo_substituicao = excluded.tipo_substituicao,
            transmissibilidade = excluded.transmissibilidade,
            grau_minimo = excluded.grau_minimo,
            grau_maximo = excluded.grau_maximo,
            cilindro_minimo = excluded.cilindro_minimo,
            cilindro_maximo = excluded.cilindro_maximo,
            validade_meses = excluded.validade_meses",
    )
    .bind(produto_id)
    .bind(e.tipo_lente)
    .bind(e.curva_base)
    .bind(e.diametro)
    .bind(&e.material)
    .bind(e.conteudo_agua)
    .bind(e.tipo_substituicao)
    .bind(e.transmissibilidade)
    .bind(e.grau_minimo)
    .bind(e.grau_maximo)
    .bind(e.cilindro_minimo)
    .bind(e.cilindro_maximo)
    .bind(e.validade_meses.unwrap_or(VALIDADE_PADRAO_MESES))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, setup, vender};
    use avelar_core::{ProdutoInput, TipoLenteContato, TipoSubstituicao};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn lente(nome: &str, substituicao: TipoSubstituicao, validade: Option<i64>) -> LenteContatoInput {
        let mut produto = ProdutoInput::new(nome, CategoriaProduto::Acessorio, 18_900);
        produto.estoque_atual = 20;
        produto.estoque_minimo = 5;
        LenteContatoInput {
            produto,
            especificacao: EspecificacaoLenteInput {
                tipo_lente: TipoLenteContato::Gelatinosa,
                curva_base: Some(8.6),
                diametro: Some(14.2),
                material: Some("Silicone hidrogel".to_string()),
                conteudo_agua: Some(38),
                tipo_substituicao: substituicao,
                transmissibilidade: None,
                grau_minimo: Some(-12.0),
                grau_maximo: Some(8.0),
                cilindro_minimo: None,
                cilindro_maximo: None,
                validade_meses: validade,
            },
        }
    }

    #[tokio::test]
    async fn test_save_creates_product_and_sheet() {
        let db = setup().await;
        let repo = db.lentes_contato();

        let salva = repo
            .save(None, lente("Acuvue Oasys", TipoSubstituicao::Quinzenal, None))
            .await
            .unwrap();
        assert_eq!(salva.produto.categoria, CategoriaProduto::LenteContato);
        let espec = salva.especificacao.clone().unwrap();
        assert_eq!(espec.validade_meses, 24);
        assert_eq!(espec.tipo_substituicao, TipoSubstituicao::Quinzenal);

        let mut alterada = lente("Acuvue Oasys 1-Day", TipoSubstituicao::DescarteDiario, Some(36));
        alterada.produto.preco_venda = 21_900;
        let atualizada = repo.save(Some(&salva.produto.id), alterada).await.unwrap();
        assert_eq!(atualizada.produto.nome, "Acuvue Oasys 1-Day");
        assert_eq!(atualizada.validade_meses(), 36);

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_bad_shelf_life() {
        let db = setup().await;
        let err = db
            .lentes_contato()
            .save(None, lente("Biofinity", TipoSubstituicao::Mensal, Some(61)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("validade_meses"));
        assert!(db.lentes_contato().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registrar_lote_defaults_expiry() {
        let db = setup().await;
        let l = db
            .lentes_contato()
            .save(None, lente("Air Optix", TipoSubstituicao::Mensal, Some(12)))
            .await
            .unwrap();

        let lote = db
            .lentes_contato()
            .registrar_lote(LoteInput {
                produto_id: l.produto.id.clone(),
                numero_lote: "L2025-01".to_string(),
                data_fabricacao: d(2025, 3, 15),
                data_validade: None,
                quantidade_lote: 30,
                observacoes: None,
            })
            .await
            .unwrap();
        assert_eq!(lote.data_validade, d(2026, 3, 15));
        assert_eq!(db.lentes_contato().lotes(&l.produto.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_controles() {
        let db = setup().await;
        let c = cliente(&db, "Bruna Reis").await;
        let today = d(2025, 6, 10);
        let repo = db.lentes_contato();

        let input = |proximo| ControleLenteInput {
            cliente_id: c.id.clone(),
            produto_id: None,
            data_ultima_compra: None,
            data_proximo_controle: proximo,
            frequencia_uso: Some("Diário".to_string()),
            horas_uso_diario: Some(10),
            solucao_limpeza: None,
            observacoes: None,
        };

        let atrasado = repo.save_controle(None, input(d(2025, 6, 1))).await.unwrap();
        repo.save_controle(None, input(d(2025, 7, 1))).await.unwrap();
        assert_eq!(atrasado.status, StatusControle::Agendado);

        let lista = repo.list_controles().await.unwrap();
        assert_eq!(lista[0].controle.id, atrasado.id);
        assert_eq!(lista[0].cliente_nome.as_deref(), Some("Bruna Reis"));

        assert_eq!(repo.controles_atrasados(today).await.unwrap().len(), 1);

        let feito = repo.realizar_controle(&atrasado.id, Utc::now()).await.unwrap();
        assert_eq!(feito.status, StatusControle::Realizado);
        assert!(feito.data_ultimo_controle.is_some());
        assert!(repo.controles_atrasados(today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relatorio() {
        let db = setup().await;
        let today = chrono::Local::now().date_naive();
        let repo = db.lentes_contato();

        let diaria = repo
            .save(None, lente("Dailies Total", TipoSubstituicao::DescarteDiario, None))
            .await
            .unwrap();
        let mensal = repo
            .save(None, lente("Biofinity", TipoSubstituicao::Mensal, None))
            .await
            .unwrap();

        vender(&db, &[(&diaria.produto, 3), (&mensal.produto, 1)]).await;
        vender(&db, &[(&mensal.produto, 16)]).await;

        let r = repo.relatorio(today).await.unwrap();
        assert_eq!(r.total_lentes, 2);
        assert_eq!(r.total_vendas_mes, 3);
        assert_eq!(r.faturamento_mes, 20 * 18_900);
        assert_eq!(r.lentes_mais_vendidas[0].nome, "Biofinity");
        assert_eq!(r.lentes_mais_vendidas[0].vendas, 17);
        assert_eq!(r.tipos_mais_populares.get(&TipoSubstituicao::DescarteDiario), Some(&3));
        // Biofinity left with 3 of 20, below its minimum of 5
        assert_eq!(r.lentes_estoque_baixo, 1);
    }
}
