//! # Appointment Book
//!
//! Eye exams and follow-ups booked with a professional in 30-minute slots.
//!
//! ```text
//! agendado ──► confirmado ──► realizado
//!     │             │
//!     └─────────────┴──► cancelado | faltou
//! ```
//!
//! A slot (data, hora, profissional) holds at most one appointment that is
//! not cancelled.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::{age_on, format_br_date};
use crate::types::produto::format_label;
use crate::validation::{
    normalize_optional, validate_email, validate_max_len, validate_required, ValidationResult,
};
use crate::ValidationError;

/// Default appointment length in minutes.
pub const DURACAO_PADRAO_MINUTOS: i64 = 30;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoConsulta {
    ConsultaOftalmologica,
    ExamePrecoce,
    AdaptacaoLenteContato,
    ControlePosOperatorio,
    TesteVisao,
    ConsultaRetorno,
    Emergencia,
}

impl TipoConsulta {
    pub fn label(&self) -> &'static str {
        match self {
            TipoConsulta::ConsultaOftalmologica => "Consulta Oftalmológica",
            TipoConsulta::ExamePrecoce => "Exame de Precoce",
            TipoConsulta::AdaptacaoLenteContato => "Adaptação Lente de Contato",
            TipoConsulta::ControlePosOperatorio => "Controle Pós-Operatório",
            TipoConsulta::TesteVisao => "Teste de Visão",
            TipoConsulta::ConsultaRetorno => "Consulta de Retorno",
            TipoConsulta::Emergencia => "Emergência",
        }
    }
}

/// Room or instrument reserved with the appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Recurso {
    #[serde(rename = "consultorio_1")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "consultorio_1"))]
    Consultorio1,
    #[serde(rename = "consultorio_2")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "consultorio_2"))]
    Consultorio2,
    AparelhoTonometria,
    AparelhoCampoVisual,
}

impl Recurso {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurso::Consultorio1 => "consultorio_1",
            Recurso::Consultorio2 => "consultorio_2",
            Recurso::AparelhoTonometria => "aparelho_tonometria",
            Recurso::AparelhoCampoVisual => "aparelho_campo_visual",
        }
    }

    /// `aparelho_tonometria` → `Aparelho Tonometria`.
    pub fn label(&self) -> String {
        format_label(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusAgendamento {
    #[default]
    Agendado,
    Confirmado,
    Realizado,
    Cancelado,
    Faltou,
}

impl StatusAgendamento {
    pub fn label(&self) -> &'static str {
        match self {
            StatusAgendamento::Agendado => "Agendado",
            StatusAgendamento::Confirmado => "Confirmado",
            StatusAgendamento::Realizado => "Realizado",
            StatusAgendamento::Cancelado => "Cancelado",
            StatusAgendamento::Faltou => "Faltou",
        }
    }
}

// =============================================================================
// Professionals
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profissional {
    pub id: String,
    pub nome: String,
    pub especialidade: Option<String>,
    pub registro_profissional: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub ativo: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfissionalInput {
    pub nome: String,
    pub especialidade: Option<String>,
    pub registro_profissional: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
}

impl ProfissionalInput {
    pub fn validate(self) -> ValidationResult<ProfissionalInput> {
        let nome = validate_required("nome", &self.nome)?;
        validate_max_len("nome", &nome, 150)?;
        let email = normalize_optional(self.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }

        Ok(ProfissionalInput {
            nome,
            email,
            especialidade: normalize_optional(self.especialidade),
            registro_profissional: normalize_optional(self.registro_profissional),
            telefone: normalize_optional(self.telefone),
        })
    }
}

// =============================================================================
// Appointments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agendamento {
    pub id: String,
    pub cliente_id: String,
    pub profissional_id: String,
    #[ts(as = "String")]
    pub data: NaiveDate,
    /// `HH:MM`.
    pub hora: String,
    pub tipo_consulta: TipoConsulta,
    pub duracao: i64,
    pub recurso: Option<Recurso>,
    pub telefone_contato: Option<String>,
    pub observacoes: Option<String>,
    pub status: StatusAgendamento,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Appointment with customer and professional names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AgendamentoResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub agendamento: Agendamento,
    pub cliente_nome: Option<String>,
    pub profissional_nome: Option<String>,
}

/// Appointment detail card.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgendamentoDetalhe {
    pub agendamento: Agendamento,
    pub cliente_nome: String,
    pub cliente_telefone: Option<String>,
    /// Customer age in full years, when the birth date is known.
    pub cliente_idade: Option<u32>,
    pub profissional_nome: String,
    pub profissional_especialidade: Option<String>,
}

impl AgendamentoDetalhe {
    pub fn new(
        agendamento: Agendamento,
        cliente: &crate::types::Cliente,
        profissional: &Profissional,
        today: NaiveDate,
    ) -> Self {
        AgendamentoDetalhe {
            cliente_nome: cliente.nome.clone(),
            cliente_telefone: cliente.telefone.clone(),
            cliente_idade: cliente.data_nascimento.map(|nascimento| age_on(nascimento, today)),
            profissional_nome: profissional.nome.clone(),
            profissional_especialidade: profissional.especialidade.clone(),
            agendamento,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgendamentoInput {
    pub cliente_id: String,
    pub profissional_id: String,
    #[ts(as = "String")]
    pub data: NaiveDate,
    pub hora: String,
    pub tipo_consulta: TipoConsulta,
    pub duracao: Option<i64>,
    pub recurso: Option<Recurso>,
    pub telefone_contato: Option<String>,
    pub observacoes: Option<String>,
}

impl AgendamentoInput {
    /// Validates the form.
    ///
    /// ## Rules
    /// - customer and professional required
    /// - `hora` is `HH:MM`
    /// - duration 15..=120 minutes in steps of 15 (default 30)
    pub fn validate(self) -> ValidationResult<AgendamentoInput> {
        let cliente_id = validate_required("cliente_id", &self.cliente_id)?;
        let profissional_id = validate_required("profissional_id", &self.profissional_id)?;
        let hora = validate_hora(&self.hora)?;

        let duracao = self.duracao.unwrap_or(DURACAO_PADRAO_MINUTOS);
        if !(15..=120).contains(&duracao) || duracao % 15 != 0 {
            return Err(ValidationError::OutOfRange {
                field: "duracao".to_string(),
                min: 15,
                max: 120,
            });
        }

        Ok(AgendamentoInput {
            cliente_id,
            profissional_id,
            hora,
            duracao: Some(duracao),
            telefone_contato: normalize_optional(self.telefone_contato),
            observacoes: normalize_optional(self.observacoes),
            ..self
        })
    }
}

/// Parses `H:MM`/`HH:MM` and returns it zero-padded.
pub fn validate_hora(hora: &str) -> ValidationResult<String> {
    NaiveTime::parse_from_str(hora.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| ValidationError::InvalidFormat {
            field: "hora".to_string(),
            reason: "use HH:MM".to_string(),
        })
}

/// Bookable slots: 08:00 to 18:30 every 30 minutes.
pub fn horarios_disponiveis() -> Vec<String> {
    (8..=18)
        .flat_map(|hora| [0, 30].map(|minuto| format!("{hora:02}:{minuto:02}")))
        .collect()
}

/// Note written on an appointment cancelled on `today`.
pub fn observacao_cancelamento(today: NaiveDate) -> String {
    format!("Cancelado em {}", format_br_date(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horarios_disponiveis() {
        let slots = horarios_disponiveis();
        assert_eq!(slots.len(), 22);
        assert_eq!(slots.first().map(String::as_str), Some("08:00"));
        assert_eq!(slots[1], "08:30");
        assert_eq!(slots.last().map(String::as_str), Some("18:30"));
    }

    #[test]
    fn test_observacao_cancelamento() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        assert_eq!(observacao_cancelamento(today), "Cancelado em 03/04/2025");
    }

    #[test]
    fn test_validate_hora() {
        assert_eq!(validate_hora("9:30").unwrap(), "09:30");
        assert_eq!(validate_hora("14:00").unwrap(), "14:00");
        assert!(validate_hora("25:00").is_err());
        assert!(validate_hora("manhã").is_err());
    }

    #[test]
    fn test_agendamento_input_defaults() {
        let input = AgendamentoInput {
            cliente_id: "c1".to_string(),
            profissional_id: "p1".to_string(),
            data: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            hora: "8:00".to_string(),
            tipo_consulta: TipoConsulta::TesteVisao,
            duracao: None,
            recurso: Some(Recurso::Consultorio1),
            telefone_contato: Some("".to_string()),
            observacoes: None,
        };
        let ok = input.clone().validate().unwrap();
        assert_eq!(ok.duracao, Some(30));
        assert_eq!(ok.hora, "08:00");
        assert_eq!(ok.telefone_contato, None);

        let fora_do_passo = AgendamentoInput {
            duracao: Some(20),
            ..input
        };
        assert!(fora_do_passo.validate().is_err());
    }

    #[test]
    fn test_labels_and_literals() {
        assert_eq!(Recurso::AparelhoCampoVisual.label(), "Aparelho Campo Visual");
        assert_eq!(Recurso::Consultorio2.label(), "Consultorio 2");
        assert_eq!(serde_json::to_string(&Recurso::Consultorio1).unwrap(), "\"consultorio_1\"");
        assert_eq!(TipoConsulta::ControlePosOperatorio.label(), "Controle Pós-Operatório");
        assert_eq!(StatusAgendamento::Faltou.label(), "Faltou");
    }
}
