//! # Warranty Repository
//!
//! Warranty certificates, their occurrences (repairs, exchanges, claims)
//! and extensions.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::dates::first_day_of_month;
use avelar_core::{
    estatisticas_garantias, EstatisticasGarantias, Garantia, GarantiaInput, GarantiaResumo,
    Ocorrencia, OcorrenciaInput, StatusGarantia,
};

use crate::error::{DbError, DbResult};

const GARANTIA_COLUMNS: &str = "g.id, g.venda_id, g.cliente_id, g.produto_id, g.tipo_produto, \
     g.tipo_garantia, g.duracao_meses, g.data_inicio, g.data_fim, g.termos, g.cobre_quebras, \
     g.cobre_riscos, g.cobre_defeitos, g.cobre_ajustes, g.observacoes, g.status, g.created_at";

/// Rows shown in the warranty list.
const LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct GarantiaRepository {
    pool: SqlitePool,
}

impl GarantiaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GarantiaRepository { pool }
    }

    /// Newest warranties with customer and product names.
    pub async fn list(&self, status: Option<StatusGarantia>) -> DbResult<Vec<GarantiaResumo>> {
        let sql = format!(
            "SELECT {GARANTIA_COLUMNS}, c.nome AS cliente_nome, p.nome AS produto_nome
             FROM garantias g
             LEFT JOIN clientes c ON c.id = g.cliente_id
             LEFT JOIN produtos p ON p.id = g.produto_id
             WHERE ?1 IS NULL OR g.status = ?1
             ORDER BY g.created_at DESC
             LIMIT ?2"
        );
        let garantias = sqlx::query_as::<_, GarantiaResumo>(&sql)
            .bind(status)
            .bind(LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = garantias.len(), "Listed warranties");
        Ok(garantias)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Garantia>> {
        let sql = format!("SELECT {GARANTIA_COLUMNS} FROM garantias g WHERE g.id = ?1");
        let garantia = sqlx::query_as::<_, Garantia>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(garantia)
    }

    pub async fn get(&self, id: &str) -> DbResult<Garantia> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Garantia", id))
    }

    /// Issues a warranty. The kind must be allowed for the product type;
    /// the end date and blank terms are derived from the form.
    pub async fn create(&self, input: GarantiaInput) -> DbResult<Garantia> {
        let validada = input.validate()?;
        let input = &validada.input;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO garantias (
                id, venda_id, cliente_id, produto_id, tipo_produto, tipo_garantia,
                duracao_meses, data_inicio, data_fim, termos, cobre_quebras, cobre_riscos,
                cobre_defeitos, cobre_ajustes, observacoes, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )
        .bind(&id)
        .bind(&input.venda_id)
        .bind(&input.cliente_id)
        .bind(&input.produto_id)
        .bind(input.tipo_produto)
        .bind(input.tipo_garantia)
        .bind(validada.duracao_meses)
        .bind(input.data_inicio)
        .bind(validada.data_fim)
        .bind(&validada.termos)
        .bind(input.cobre_quebras)
        .bind(input.cobre_riscos)
        .bind(input.cobre_defeitos)
        .bind(input.cobre_ajustes)
        .bind(&input.observacoes)
        .bind(StatusGarantia::Ativa)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            id = %id,
            tipo = input.tipo_garantia.label(),
            data_fim = %validada.data_fim,
            "Warranty issued"
        );
        self.get(&id).await
    }

    pub async fn registrar_ocorrencia(&self, input: OcorrenciaInput) -> DbResult<Ocorrencia> {
        let input = input.validate()?;
        self.get(&input.garantia_id).await?;

        let ocorrencia = Ocorrencia {
            id: Uuid::new_v4().to_string(),
            garantia_id: input.garantia_id,
            tipo: input.tipo,
            descricao: input.descricao,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO garantia_ocorrencias (id, garantia_id, tipo, descricao, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&ocorrencia.id)
        .bind(&ocorrencia.garantia_id)
        .bind(ocorrencia.tipo)
        .bind(&ocorrencia.descricao)
        .bind(ocorrencia.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            garantia_id = %ocorrencia.garantia_id,
            tipo = ocorrencia.tipo.label(),
            "Warranty occurrence registered"
        );
        Ok(ocorrencia)
    }

    pub async fn ocorrencias(&self, garantia_id: &str) -> DbResult<Vec<Ocorrencia>> {
        let ocorrencias = sqlx::query_as::<_, Ocorrencia>(
            "SELECT id, garantia_id, tipo, descricao, created_at
             FROM garantia_ocorrencias
             WHERE garantia_id = ?1
             ORDER BY created_at DESC",
        )
        .bind(garantia_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ocorrencias)
    }

    /// Pushes the end date `meses` months forward. The total duration may
    /// not pass 120 months.
    pub async fn estender(&self, id: &str, meses: i64) -> DbResult<Garantia> {
        let garantia = self.get(id).await?;
        let (data_fim, duracao_meses) = garantia.estender(meses)?;

        sqlx::query("UPDATE garantias SET data_fim = ?1, duracao_meses = ?2 WHERE id = ?3")
            .bind(data_fim)
            .bind(duracao_meses)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, meses, data_fim = %data_fim, "Warranty extended");
        self.get(id).await
    }

    pub async fn estatisticas(&self, today: NaiveDate) -> DbResult<EstatisticasGarantias> {
        let sql = format!("SELECT {GARANTIA_COLUMNS} FROM garantias g");
        let garantias = sqlx::query_as::<_, Garantia>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let ocorrencias_mes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM garantia_ocorrencias
             WHERE date(created_at, 'localtime') >= ?1",
        )
        .bind(first_day_of_month(today))
        .fetch_one(&self.pool)
        .await?;

        Ok(estatisticas_garantias(&garantias, ocorrencias_mes, today))
    }
}
