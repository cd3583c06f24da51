//! # Appointment Repository
//!
//! Professionals and the appointment book. A professional holds at most
//! one live (not cancelled) appointment per date and time.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::{
    observacao_cancelamento, Agendamento, AgendamentoDetalhe, AgendamentoInput,
    AgendamentoResumo, CoreError, Profissional, ProfissionalInput, StatusAgendamento,
};

use crate::error::{DbError, DbResult};
use crate::repository::ClienteRepository;

const PROFISSIONAL_COLUMNS: &str =
    "id, nome, especialidade, registro_profissional, telefone, email, ativo, created_at";

const AGENDAMENTO_COLUMNS: &str = "a.id, a.cliente_id, a.profissional_id, a.data, a.hora, \
     a.tipo_consulta, a.duracao, a.recurso, a.telefone_contato, a.observacoes, a.status, \
     a.created_at";

#[derive(Debug, Clone)]
pub struct ConsultorioRepository {
    pool: SqlitePool,
}

impl ConsultorioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConsultorioRepository { pool }
    }

    // =========================================================================
    // Professionals
    // =========================================================================

    /// Active professionals by name.
    pub async fn list_profissionais(&self) -> DbResult<Vec<Profissional>> {
        let sql = format!(
            "SELECT {PROFISSIONAL_COLUMNS} FROM profissionais WHERE ativo = 1 ORDER BY nome"
        );
        let profissionais = sqlx::query_as::<_, Profissional>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(profissionais)
    }

    pub async fn get_profissional(&self, id: &str) -> DbResult<Profissional> {
        let sql = format!("SELECT {PROFISSIONAL_COLUMNS} FROM profissionais WHERE id = ?1");
        sqlx::query_as::<_, Profissional>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Profissional", id))
    }

    pub async fn create_profissional(&self, input: ProfissionalInput) -> DbResult<Profissional> {
        let input = input.validate()?;
        let profissional = Profissional {
            id: Uuid::new_v4().to_string(),
            nome: input.nome,
            especialidade: input.especialidade,
            registro_profissional: input.registro_profissional,
            telefone: input.telefone,
            email: input.email,
            ativo: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO profissionais (
                id, nome, especialidade, registro_profissional, telefone, email, ativo, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&profissional.id)
        .bind(&profissional.nome)
        .bind(&profissional.especialidade)
        .bind(&profissional.registro_profissional)
        .bind(&profissional.telefone)
        .bind(&profissional.email)
        .bind(profissional.ativo)
        .bind(profissional.created_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %profissional.id, "Created professional");
        Ok(profissional)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// Appointments from `today` on, or only those of `data` when given,
    /// ordered by date and time.
    pub async fn list_agendamentos(
        &self,
        today: NaiveDate,
        data: Option<NaiveDate>,
    ) -> DbResult<Vec<AgendamentoResumo>> {
        let sql = format!(
            "SELECT {AGENDAMENTO_COLUMNS}, c.nome AS cliente_nome, p.nome AS profissional_nome
             FROM agendamentos a
             LEFT JOIN clientes c ON c.id = a.cliente_id
             LEFT JOIN profissionais p ON p.id = a.profissional_id
             WHERE (?1 IS NULL AND a.data >= ?2) OR a.data = ?1
             ORDER BY a.data, a.hora"
        );
        let agendamentos = sqlx::query_as::<_, AgendamentoResumo>(&sql)
            .bind(data)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = agendamentos.len(), "Listed appointments");
        Ok(agendamentos)
    }

    pub async fn get(&self, id: &str) -> DbResult<Agendamento> {
        let sql = format!("SELECT {AGENDAMENTO_COLUMNS} FROM agendamentos a WHERE a.id = ?1");
        sqlx::query_as::<_, Agendamento>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Agendamento", id))
    }

    /// Whether the professional is free at `data`/`hora`. Cancelled
    /// appointments free their slot; `ignorar_id` skips the appointment
    /// being edited.
    pub async fn verificar_disponibilidade(
        &self,
        data: NaiveDate,
        hora: &str,
        profissional_id: &str,
        ignorar_id: Option<&str>,
    ) -> DbResult<bool> {
        let ocupados: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM agendamentos
             WHERE data = ?1 AND hora = ?2 AND profissional_id = ?3
               AND status != ?4
               AND (?5 IS NULL OR id != ?5)",
        )
        .bind(data)
        .bind(hora)
        .bind(profissional_id)
        .bind(StatusAgendamento::Cancelado)
        .bind(ignorar_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(ocupados == 0)
    }

    /// Books (`id = None`, status `agendado`) or edits an appointment.
    ///
    /// # Errors
    /// `SlotUnavailable` when the professional already has that slot.
    pub async fn salvar(&self, id: Option<&str>, input: AgendamentoInput) -> DbResult<Agendamento> {
        let input = input.validate()?;

        if !self
            .verificar_disponibilidade(input.data, &input.hora, &input.profissional_id, id)
            .await?
        {
            return Err(CoreError::SlotUnavailable.into());
        }

        let id = match id {
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE agendamentos SET
                        cliente_id = ?2, profissional_id = ?3, data = ?4, hora = ?5,
                        tipo_consulta = ?6, duracao = ?7, recurso = ?8, telefone_contato = ?9,
                        observacoes = ?10
                     WHERE id = ?1",
                )
                .bind(id)
                .bind(&input.cliente_id)
                .bind(&input.profissional_id)
                .bind(input.data)
                .bind(&input.hora)
                .bind(input.tipo_consulta)
                .bind(input.duracao)
                .bind(input.recurso)
                .bind(&input.telefone_contato)
                .bind(&input.observacoes)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Agendamento", id));
                }
                id.to_string()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO agendamentos (
                        id, cliente_id, profissional_id, data, hora, tipo_consulta, duracao,
                        recurso, telefone_contato, observacoes, status, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )
                .bind(&id)
                .bind(&input.cliente_id)
                .bind(&input.profissional_id)
                .bind(input.data)
                .bind(&input.hora)
                .bind(input.tipo_consulta)
                .bind(input.duracao)
                .bind(input.recurso)
                .bind(&input.telefone_contato)
                .bind(&input.observacoes)
                .bind(StatusAgendamento::Agendado)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
                id
            }
        };

        info!(
            id = %id,
            data = %input.data,
            hora = %input.hora,
            tipo = input.tipo_consulta.label(),
            "Appointment saved"
        );
        self.get(&id).await
    }

    /// `agendado` → `confirmado`.
    pub async fn confirmar(&self, id: &str) -> DbResult<Agendamento> {
        let agendamento = self.get(id).await?;
        if agendamento.status != StatusAgendamento::Agendado {
            return Err(CoreError::InvalidStatus {
                entity: "Agendamento".to_string(),
                status: agendamento.status.label().to_lowercase(),
            }
            .into());
        }

        sqlx::query("UPDATE agendamentos SET status = ?1 WHERE id = ?2")
            .bind(StatusAgendamento::Confirmado)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, "Appointment confirmed");
        self.get(id).await
    }

    /// Cancels and stamps the note `Cancelado em dd/mm/aaaa`. Done and
    /// already cancelled appointments stay as they are.
    pub async fn cancelar(&self, id: &str, today: NaiveDate) -> DbResult<Agendamento> {
        let agendamento = self.get(id).await?;
        if matches!(
            agendamento.status,
            StatusAgendamento::Cancelado | StatusAgendamento::Realizado
        ) {
            return Err(CoreError::InvalidStatus {
                entity: "Agendamento".to_string(),
                status: agendamento.status.label().to_lowercase(),
            }
            .into());
        }

        sqlx::query("UPDATE agendamentos SET status = ?1, observacoes = ?2 WHERE id = ?3")
            .bind(StatusAgendamento::Cancelado)
            .bind(observacao_cancelamento(today))
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, "Appointment cancelled");
        self.get(id).await
    }

    /// Detail card with the customer age on `today`.
    pub async fn detalhes(&self, id: &str, today: NaiveDate) -> DbResult<AgendamentoDetalhe> {
        let agendamento = self.get(id).await?;
        let cliente = ClienteRepository::new(self.pool.clone())
            .get(&agendamento.cliente_id)
            .await?;
        let profissional = self.get_profissional(&agendamento.profissional_id).await?;

        Ok(AgendamentoDetalhe::new(agendamento, &cliente, &profissional, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cliente, setup};
    use avelar_core::{ClienteInput, Recurso, TipoConsulta};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn profissional(db: &crate::Database, nome: &str) -> Profissional {
        db.consultorio()
            .create_profissional(ProfissionalInput {
                nome: nome.to_string(),
                especialidade: Some("Oftalmologia".to_string()),
                registro_profissional: Some("CRM 12345".to_string()),
                telefone: None,
                email: None,
            })
            .await
            .unwrap()
    }

    fn consulta(cliente_id: &str, profissional_id: &str, data: NaiveDate, hora: &str) -> AgendamentoInput {
        AgendamentoInput {
            cliente_id: cliente_id.to_string(),
            profissional_id: profissional_id.to_string(),
            data,
            hora: hora.to_string(),
            tipo_consulta: TipoConsulta::ConsultaOftalmologica,
            duracao: None,
            recurso: Some(Recurso::Consultorio1),
            telefone_contato: None,
            observacoes: None,
        }
    }

    #[tokio::test]
    async fn test_slot_conflict() {
        let db = setup().await;
        let repo = db.consultorio();
        let c = cliente(&db, "Ana").await;
        let outro = cliente(&db, "Beto").await;
        let dra = profissional(&db, "Dra. Marta").await;
        let dia = d(2030, 5, 20);

        let primeiro = repo.salvar(None, consulta(&c.id, &dra.id, dia, "9:00")).await.unwrap();
        assert_eq!(primeiro.hora, "09:00");
        assert_eq!(primeiro.duracao, 30);
        assert_eq!(primeiro.status, StatusAgendamento::Agendado);

        let err = repo
            .salvar(None, consulta(&outro.id, &dra.id, dia, "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Horário indisponível para este profissional");

        // editing keeps its own slot
        let mut edit = consulta(&c.id, &dra.id, dia, "09:00");
        edit.observacoes = Some("Trazer óculos atuais".to_string());
        repo.salvar(Some(&primeiro.id), edit).await.unwrap();

        // a cancelled appointment frees the slot
        repo.cancelar(&primeiro.id, d(2030, 5, 1)).await.unwrap();
        assert!(repo
            .verificar_disponibilidade(dia, "09:00", &dra.id, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_from_today_or_date() {
        let db = setup().await;
        let repo = db.consultorio();
        let c = cliente(&db, "Carla").await;
        let dr = profissional(&db, "Dr. Paulo").await;

        repo.salvar(None, consulta(&c.id, &dr.id, d(2030, 1, 10), "14:00")).await.unwrap();
        repo.salvar(None, consulta(&c.id, &dr.id, d(2030, 1, 10), "08:30")).await.unwrap();
        repo.salvar(None, consulta(&c.id, &dr.id, d(2029, 12, 1), "10:00")).await.unwrap();

        let futuros = repo.list_agendamentos(d(2030, 1, 1), None).await.unwrap();
        let horas: Vec<_> = futuros.iter().map(|a| a.agendamento.hora.as_str()).collect();
        assert_eq!(horas, vec!["08:30", "14:00"]);
        assert_eq!(futuros[0].profissional_nome.as_deref(), Some("Dr. Paulo"));

        let do_dia = repo
            .list_agendamentos(d(2030, 1, 1), Some(d(2029, 12, 1)))
            .await
            .unwrap();
        assert_eq!(do_dia.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmar_cancelar() {
        let db = setup().await;
        let repo = db.consultorio();
        let c = cliente(&db, "Davi").await;
        let dr = profissional(&db, "Dr. Luiz").await;
        let a = repo.salvar(None, consulta(&c.id, &dr.id, d(2030, 3, 3), "10:30")).await.unwrap();

        let confirmado = repo.confirmar(&a.id).await.unwrap();
        assert_eq!(confirmado.status, StatusAgendamento::Confirmado);
        assert!(repo.confirmar(&a.id).await.is_err());

        let cancelado = repo.cancelar(&a.id, d(2030, 3, 1)).await.unwrap();
        assert_eq!(cancelado.status, StatusAgendamento::Cancelado);
        assert_eq!(cancelado.observacoes.as_deref(), Some("Cancelado em 01/03/2030"));

        let err = repo.cancelar(&a.id, d(2030, 3, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidStatus { .. })));
    }

    #[tokio::test]
    async fn test_detalhes_with_age() {
        let db = setup().await;
        let c = db
            .clientes()
            .create(ClienteInput {
                nome: "Eva Lima".to_string(),
                data_nascimento: Some(d(1990, 8, 15)),
                ..Default::default()
            })
            .await
            .unwrap();
        let dra = profissional(&db, "Dra. Rita").await;
        let a = db
            .consultorio()
            .salvar(None, consulta(&c.id, &dra.id, d(2030, 8, 20), "11:00"))
            .await
            .unwrap();

        let detalhe = db.consultorio().detalhes(&a.id, d(2025, 8, 14)).await.unwrap();
        assert_eq!(detalhe.cliente_nome, "Eva Lima");
        assert_eq!(detalhe.cliente_idade, Some(34));
        assert_eq!(detalhe.profissional_especialidade.as_deref(), Some("Oftalmologia"));
    }

    #[tokio::test]
    async fn test_list_profissionais() {
        let db = setup().await;
        profissional(&db, "Dr. Zeca").await;
        profissional(&db, "Dra. Alice").await;
        let nomes: Vec<_> = db
            .consultorio()
            .list_profissionais()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.nome)
            .collect();
        assert_eq!(nomes, vec!["Dr. Zeca", "Dra. Alice"]);
    }
}
