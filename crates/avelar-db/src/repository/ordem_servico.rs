//! # Lab Service Order Repository
//!
//! ## Stage Pipeline
//! ```text
//! recebimento → analise → desmontagem → surfassagem → montagem
//!      → polimento → limpeza → controle_qualidade → pronto
//! ```
//! `avancar_etapa` moves one step and stamps `data_ultima_atualizacao`.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::dates::first_day_of_month;
use avelar_core::{
    formatar_numero_os, relatorio_produtividade, EtapaOs, OrdemServico, OrdemServicoDetalhe,
    OrdemServicoInput, OrdemServicoResumo, RelatorioProdutividade,
};

use crate::error::{DbError, DbResult};
use crate::repository::ReceitaRepository;

const ORDEM_COLUMNS: &str = "o.id, o.numero_os, o.venda_id, o.cliente_id, o.receita_id, \
     o.tipo_servico, o.urgencia, o.armacao, o.lentes, o.observacoes_tecnicas, o.prazo_entrega, \
     o.tecnico_responsavel, o.custo_servico, o.valor_servico, o.status, \
     o.data_ultima_atualizacao, o.created_at";

#[derive(Debug, Clone)]
pub struct OrdemServicoRepository {
    pool: SqlitePool,
}

impl OrdemServicoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrdemServicoRepository { pool }
    }

    /// Newest orders with the customer's name, optionally in one stage.
    pub async fn list(&self, status: Option<EtapaOs>, limit: i64) -> DbResult<Vec<OrdemServicoResumo>> {
        let sql = format!(
            "SELECT {ORDEM_COLUMNS}, c.nome AS cliente_nome
             FROM ordens_servico o
             LEFT JOIN clientes c ON c.id = o.cliente_id
             WHERE ?1 IS NULL OR o.status = ?1
             ORDER BY o.created_at DESC
             LIMIT ?2"
        );
        let ordens = sqlx::query_as::<_, OrdemServicoResumo>(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = ordens.len(), status = ?status, "Listed service orders");
        Ok(ordens)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrdemServico>> {
        let sql = format!("SELECT {ORDEM_COLUMNS} FROM ordens_servico o WHERE o.id = ?1");
        let ordem = sqlx::query_as::<_, OrdemServico>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ordem)
    }

    pub async fn get(&self, id: &str) -> DbResult<OrdemServico> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Ordem de serviço", id))
    }

    /// Opens an order at `recebimento` with the next four-digit number.
    pub async fn create(&self, input: OrdemServicoInput) -> DbResult<OrdemServico> {
        let input = input.validate()?;
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ordens_servico")
            .fetch_one(&mut *tx)
            .await?;

        let ordem = OrdemServico {
            id: Uuid::new_v4().to_string(),
            numero_os: formatar_numero_os(count),
            venda_id: input.venda_id,
            cliente_id: input.cliente_id,
            receita_id: input.receita_id,
            tipo_servico: input.tipo_servico,
            urgencia: input.urgencia,
            armacao: input.armacao,
            lentes: input.lentes,
            observacoes_tecnicas: input.observacoes_tecnicas,
            prazo_entrega: input.prazo_entrega,
            tecnico_responsavel: input.tecnico_responsavel,
            custo_servico: input.custo_servico,
            valor_servico: input.valor_servico,
            status: EtapaOs::Recebimento,
            data_ultima_atualizacao: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO ordens_servico (
                id, numero_os, venda_id, cliente_id, receita_id, tipo_servico, urgencia,
                armacao, lentes, observacoes_tecnicas, prazo_entrega, tecnico_responsavel,
                custo_servico, valor_servico, status, data_ultima_atualizacao, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )
        .bind(&ordem.id)
        .bind(&ordem.numero_os)
        .bind(&ordem.venda_id)
        .bind(&ordem.cliente_id)
        .bind(&ordem.receita_id)
        .bind(ordem.tipo_servico)
        .bind(ordem.urgencia)
        .bind(&ordem.armacao)
        .bind(&ordem.lentes)
        .bind(&ordem.observacoes_tecnicas)
        .bind(ordem.prazo_entrega)
        .bind(&ordem.tecnico_responsavel)
        .bind(ordem.custo_servico)
        .bind(ordem.valor_servico)
        .bind(ordem.status)
        .bind(ordem.data_ultima_atualizacao)
        .bind(ordem.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %ordem.id, numero_os = %ordem.numero_os, "Service order opened");
        Ok(ordem)
    }

    /// Edits the form fields. Stage changes go through [`Self::avancar_etapa`].
    pub async fn update(&self, id: &str, input: OrdemServicoInput) -> DbResult<OrdemServico> {
        let input = input.validate()?;

        let result = sqlx::query(
            "UPDATE ordens_servico SET
                venda_id = ?2, cliente_id = ?3, receita_id = ?4, tipo_servico = ?5, urgencia = ?6,
                armacao = ?7, lentes = ?8, observacoes_tecnicas = ?9, prazo_entrega = ?10,
                tecnico_responsavel = ?11, custo_servico = ?12, valor_servico = ?13,
                data_ultima_atualizacao = ?14
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.venda_id)
        .bind(&input.cliente_id)
        .bind(&input.receita_id)
        .bind(input.tipo_servico)
        .bind(input.urgencia)
        .bind(&input.armacao)
        .bind(&input.lentes)
        .bind(&input.observacoes_tecnicas)
        .bind(input.prazo_entrega)
        .bind(&input.tecnico_responsavel)
        .bind(input.custo_servico)
        .bind(input.valor_servico)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ordem de serviço", id));
        }
        self.get(id).await
    }

    /// Order with customer contact, linked prescription, profit and timeline.
    pub async fn detalhes(&self, id: &str) -> DbResult<OrdemServicoDetalhe> {
        let ordem = self.get(id).await?;

        let cliente: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT nome, telefone FROM clientes WHERE id = ?1")
                .bind(&ordem.cliente_id)
                .fetch_optional(&self.pool)
                .await?;
        let (cliente_nome, cliente_telefone) = match cliente {
            Some((nome, telefone)) => (Some(nome), telefone),
            None => (None, None),
        };

        let receita = match &ordem.receita_id {
            Some(receita_id) => {
                ReceitaRepository::new(self.pool.clone())
                    .get_by_id(receita_id)
                    .await?
            }
            None => None,
        };

        Ok(OrdemServicoDetalhe::new(ordem, cliente_nome, cliente_telefone, receita))
    }

    /// Moves the order to the next stage.
    pub async fn avancar_etapa(&self, id: &str) -> DbResult<OrdemServico> {
        let ordem = self.get(id).await?;
        let proxima = ordem.status.avancar()?;

        sqlx::query("UPDATE ordens_servico SET status = ?2, data_ultima_atualizacao = ?3 WHERE id = ?1")
            .bind(id)
            .bind(proxima)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        info!(id = %id, de = ?ordem.status, para = ?proxima, "Service order advanced");
        self.get(id).await
    }

    /// Productivity over the orders opened this month.
    pub async fn relatorio_produtividade(&self, today: NaiveDate) -> DbResult<RelatorioProdutividade> {
        let sql = format!(
            "SELECT {ORDEM_COLUMNS} FROM ordens_servico o
             WHERE date(o.created_at, 'localtime') >= ?1"
        );
        let ordens = sqlx::query_as::<_, OrdemServico>(&sql)
            .bind(first_day_of_month(today))
            .fetch_all(&self.pool)
            .await?;

        Ok(relatorio_produtividade(&ordens, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, setup};
    use avelar_core::{CoreError, EtapaStatus, ReceitaInput, TipoServico, Urgencia};
    use chrono::Local;

    fn input(cliente_id: &str) -> OrdemServicoInput {
        OrdemServicoInput {
            venda_id: None,
            cliente_id: cliente_id.to_string(),
            receita_id: None,
            tipo_servico: TipoServico::MontagemArmacao,
            urgencia: Urgencia::Normal,
            armacao: Some("Ray-Ban RB5154 preta".to_string()),
            lentes: Some("Varilux 1.67".to_string()),
            observacoes_tecnicas: None,
            prazo_entrega: None,
            tecnico_responsavel: Some("Marcos".to_string()),
            custo_servico: 12_000,
            valor_servico: 25_000,
        }
    }

    #[tokio::test]
    async fn test_create_numbers_orders() {
        let db = setup().await;
        let c = cliente(&db, "Beatriz").await;
        let repo = db.ordens_servico();

        let primeira = repo.create(input(&c.id)).await.unwrap();
        let segunda = repo.create(input(&c.id)).await.unwrap();
        assert_eq!(primeira.numero_os, "0001");
        assert_eq!(segunda.numero_os, "0002");
        assert_eq!(primeira.status, EtapaOs::Recebimento);

        let lista = repo.list(None, 50).await.unwrap();
        assert_eq!(lista.len(), 2);
        assert_eq!(lista[0].cliente_nome.as_deref(), Some("Beatriz"));
        assert!(repo.list(Some(EtapaOs::Pronto), 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_avancar_until_pronto() {
        let db = setup().await;
        let c = cliente(&db, "Caio").await;
        let repo = db.ordens_servico();
        let os = repo.create(input(&c.id)).await.unwrap();

        let mut atual = os.status;
        for _ in 0..8 {
            let avancada = repo.avancar_etapa(&os.id).await.unwrap();
            assert!(avancada.status > atual);
            assert!(avancada.data_ultima_atualizacao.is_some());
            atual = avancada.status;
        }
        assert_eq!(atual, EtapaOs::Pronto);

        let err = repo.avancar_etapa(&os.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::FinalStage)));
        assert_eq!(err.to_string(), "Esta OS já está na etapa final!");
    }

    #[tokio::test]
    async fn test_detalhes_with_receita() {
        let db = setup().await;
        let c = cliente(&db, "Diego").await;
        let today = Local::now().date_naive();
        let receita = db
            .receitas()
            .create(
                ReceitaInput {
                    cliente_id: c.id.clone(),
                    od_esferico: Some(-2.0),
                    ..Default::default()
                },
                today,
            )
            .await
            .unwrap();

        let mut form = input(&c.id);
        form.receita_id = Some(receita.id.clone());
        let os = db.ordens_servico().create(form).await.unwrap();
        db.ordens_servico().avancar_etapa(&os.id).await.unwrap();

        let detalhe = db.ordens_servico().detalhes(&os.id).await.unwrap();
        assert_eq!(detalhe.lucro, 13_000);
        assert_eq!(detalhe.cliente_telefone.as_deref(), Some("(11) 98765-4321"));
        assert_eq!(detalhe.receita.map(|r| r.id), Some(receita.id));
        assert_eq!(detalhe.etapas[0].1, EtapaStatus::Concluida);
        assert_eq!(detalhe.etapas[1].1, EtapaStatus::Atual);
    }

    #[tokio::test]
    async fn test_relatorio_produtividade() {
        let db = setup().await;
        let c = cliente(&db, "Elisa").await;
        let today = Local::now().date_naive();
        let repo = db.ordens_servico();

        let os = repo.create(input(&c.id)).await.unwrap();
        repo.create(input(&c.id)).await.unwrap();
        for _ in 0..8 {
            repo.avancar_etapa(&os.id).await.unwrap();
        }

        let r = repo.relatorio_produtividade(today).await.unwrap();
        assert_eq!(r.total_ordens, 2);
        assert_eq!(r.ordens_mes, 2);
        assert!((r.taxa_conclusao - 50.0).abs() < 1e-9);
        assert_eq!(r.ordens_atrasadas, 0);
    }
}
