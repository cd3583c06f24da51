//! # Prescription Repository

use chrono::{NaiveDate, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use avelar_core::dates::age_on;
use avelar_core::{Receita, ReceitaInput, ReceitaResumo};

use crate::error::{DbError, DbResult};

const RECEITA_COLUMNS: &str = "r.id, r.cliente_id, r.venda_id, r.medico_nome, r.medico_crm, \
     r.data_receita, r.data_validade, r.idade, r.ocupacao, r.uso_previo, \
     r.od_esferico, r.od_cilindrico, r.od_eixo, r.od_adicao, r.od_dnp, r.od_altura, \
     r.oe_esferico, r.oe_cilindrico, r.oe_eixo, r.oe_adicao, r.oe_dnp, r.oe_altura, \
     r.tipo_lente, r.tratamento, r.observacoes, r.created_at, r.updated_at";

#[derive(Debug, Clone)]
pub struct ReceitaRepository {
    pool: SqlitePool,
}

impl ReceitaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReceitaRepository { pool }
    }

    /// Newest prescriptions with the customer's name.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<ReceitaResumo>> {
        let sql = format!(
            "SELECT {RECEITA_COLUMNS}, c.nome AS cliente_nome
             FROM receitas r
             LEFT JOIN clientes c ON c.id = r.cliente_id
             ORDER BY r.created_at DESC
             LIMIT ?1"
        );
        let receitas = sqlx::query_as::<_, ReceitaResumo>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = receitas.len(), "Listed prescriptions");
        Ok(receitas)
    }

    /// Prescriptions of one customer, newest first.
    pub async fn list_cliente(&self, cliente_id: &str) -> DbResult<Vec<ReceitaResumo>> {
        let sql = format!(
            "SELECT {RECEITA_COLUMNS}, c.nome AS cliente_nome
             FROM receitas r
             LEFT JOIN clientes c ON c.id = r.cliente_id
             WHERE r.cliente_id = ?1
             ORDER BY r.data_receita DESC, r.created_at DESC"
        );
        let receitas = sqlx::query_as::<_, ReceitaResumo>(&sql)
            .bind(cliente_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(receitas)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Receita>> {
        let sql = format!("SELECT {RECEITA_COLUMNS} FROM receitas r WHERE r.id = ?1");
        let receita = sqlx::query_as::<_, Receita>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(receita)
    }

    pub async fn get(&self, id: &str) -> DbResult<Receita> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Receita", id))
    }

    /// Saves a new prescription.
    ///
    /// `data_receita` defaults to `today`; a blank `idade` is filled from
    /// the customer's birth date on the prescription day.
    pub async fn create(&self, input: ReceitaInput, today: NaiveDate) -> DbResult<Receita> {
        let input = self.completar(input.validate()?, today).await?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let query = sqlx::query(
            "INSERT INTO receitas (
                cliente_id, venda_id, medico_nome, medico_crm, data_receita, data_validade,
                idade, ocupacao, uso_previo,
                od_esferico, od_cilindrico, od_eixo, od_adicao, od_dnp, od_altura,
                oe_esferico, oe_cilindrico, oe_eixo, oe_adicao, oe_dnp, oe_altura,
                tipo_lente, tratamento, observacoes,
                id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21,
                ?22, ?23, ?24, ?25, ?26, ?27
            )",
        );
        bind_form(query, &input)
            .bind(&id)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, cliente_id = %input.cliente_id, "Created prescription");
        self.get(&id).await
    }

    pub async fn update(&self, id: &str, input: ReceitaInput, today: NaiveDate) -> DbResult<Receita> {
        let input = self.completar(input.validate()?, today).await?;

        let query = sqlx::query(
            "UPDATE receitas SET
                cliente_id = ?1, venda_id = ?2, medico_nome = ?3, medico_crm = ?4,
                data_receita = ?5, data_validade = ?6, idade = ?7, ocupacao = ?8, uso_previo = ?9,
                od_esferico = ?10, od_cilindrico = ?11, od_eixo = ?12, od_adicao = ?13,
                od_dnp = ?14, od_altura = ?15,
                oe_esferico = ?16, oe_cilindrico = ?17, oe_eixo = ?18, oe_adicao = ?19,
                oe_dnp = ?20, oe_altura = ?21,
                tipo_lente = ?22, tratamento = ?23, observacoes = ?24, updated_at = ?26
             WHERE id = ?25",
        );
        let result = bind_form(query, &input)
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Receita", id));
        }
        self.get(id).await
    }

    /// Unsaved copy of a prescription dated today, valid for a year.
    pub async fn renovar(&self, id: &str, today: NaiveDate) -> DbResult<ReceitaInput> {
        let receita = self.get(id).await?;
        Ok(receita.renovar(today))
    }

    async fn completar(&self, mut input: ReceitaInput, today: NaiveDate) -> DbResult<ReceitaInput> {
        let data_receita = *input.data_receita.get_or_insert(today);

        if input.idade.is_none() {
            let nascimento: Option<Option<NaiveDate>> =
                sqlx::query_scalar("SELECT data_nascimento FROM clientes WHERE id = ?1")
                    .bind(&input.cliente_id)
                    .fetch_optional(&self.pool)
                    .await?;

            match nascimento {
                None => return Err(DbError::not_found("Cliente", &input.cliente_id)),
                Some(nascimento) => {
                    input.idade = nascimento.map(|n| i64::from(age_on(n, data_receita)));
                }
            }
        }

        Ok(input)
    }
}

/// Binds the 24 form columns as `?1..?24`.
fn bind_form<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    input: &'q ReceitaInput,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&input.cliente_id)
        .bind(&input.venda_id)
        .bind(&input.medico_nome)
        .bind(&input.medico_crm)
        .bind(input.data_receita)
        .bind(input.data_validade)
        .bind(input.idade)
        .bind(&input.ocupacao)
        .bind(&input.uso_previo)
        .bind(input.od_esferico)
        .bind(input.od_cilindrico)
        .bind(input.od_eixo)
        .bind(input.od_adicao)
        .bind(input.od_dnp)
        .bind(input.od_altura)
        .bind(input.oe_esferico)
        .bind(input.oe_cilindrico)
        .bind(input.oe_eixo)
        .bind(input.oe_adicao)
        .bind(input.oe_dnp)
        .bind(input.oe_altura)
        .bind(input.tipo_lente)
        .bind(input.tratamento)
        .bind(&input.observacoes)
}
