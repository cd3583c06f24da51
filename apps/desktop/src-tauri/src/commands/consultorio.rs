//! # Appointment Commands
//!
//! Professionals and the appointment book of the exam room.

use avelar_core::{
    horarios_disponiveis as slots, Agendamento, AgendamentoDetalhe, AgendamentoInput,
    AgendamentoResumo, Profissional, ProfissionalInput,
};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::DbState;

pub async fn list_profissionais(db: &DbState) -> ApiResult<Vec<Profissional>> {
    Ok(db.inner().consultorio().list_profissionais().await?)
}

pub async fn create_profissional(
    db: &DbState,
    input: ProfissionalInput,
) -> ApiResult<Profissional> {
    debug!(nome = %input.nome, "create_profissional command");
    Ok(db.inner().consultorio().create_profissional(input).await?)
}

/// 08:00 to 18:30, every 30 minutes.
pub fn horarios_disponiveis() -> Vec<String> {
    slots()
}

/// Appointments from `today`, or only those on `data`.
pub async fn list_agendamentos(
    db: &DbState,
    today: NaiveDate,
    data: Option<NaiveDate>,
) -> ApiResult<Vec<AgendamentoResumo>> {
    Ok(db.inner().consultorio().list_agendamentos(today, data).await?)
}

pub async fn get_agendamento(db: &DbState, id: &str) -> ApiResult<Agendamento> {
    Ok(db.inner().consultorio().get(id).await?)
}

pub async fn verificar_disponibilidade(
    db: &DbState,
    data: NaiveDate,
    hora: &str,
    profissional_id: &str,
    ignorar_id: Option<&str>,
) -> ApiResult<bool> {
    Ok(db
        .inner()
        .consultorio()
        .verificar_disponibilidade(data, hora, profissional_id, ignorar_id)
        .await?)
}

/// Books (`id` absent) or edits an appointment.
pub async fn salvar_agendamento(
    db: &DbState,
    id: Option<&str>,
    input: AgendamentoInput,
) -> ApiResult<Agendamento> {
    debug!(id = ?id, data = %input.data, hora = %input.hora, "salvar_agendamento command");
    Ok(db.inner().consultorio().salvar(id, input).await?)
}

pub async fn confirmar_agendamento(db: &DbState, id: &str) -> ApiResult<Agendamento> {
    Ok(db.inner().consultorio().confirmar(id).await?)
}

pub async fn cancelar_agendamento(
    db: &DbState,
    id: &str,
    today: NaiveDate,
) -> ApiResult<Agendamento> {
    debug!(id = %id, "cancelar_agendamento command");
    Ok(db.inner().consultorio().cancelar(id, today).await?)
}

pub async fn get_agendamento_detalhes(
    db: &DbState,
    id: &str,
    today: NaiveDate,
) -> ApiResult<AgendamentoDetalhe> {
    Ok(db.inner().consultorio().detalhes(id, today).await?)
}
