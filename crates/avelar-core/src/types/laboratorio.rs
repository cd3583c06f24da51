//! # Lab Service Orders
//!
//! A service order (OS) walks through the lab production line one stage at
//! a time.
//!
//! ## Production Line
//! ```text
//! recebimento ─► analise ─► desmontagem ─► surfassagem ─► montagem
//!                                                            │
//!      pronto ◄─ controle_qualidade ◄─ limpeza ◄─ polimento ◄┘
//! ```
//!
//! Stages only move forward, and `pronto` is final.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::percentage_of;
use crate::validation::{normalize_optional, validate_price_cents, validate_required, ValidationResult};

// =============================================================================
// Stages
// =============================================================================

/// Production stage, which is also the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EtapaOs {
    #[default]
    Recebimento,
    Analise,
    Desmontagem,
    Surfassagem,
    Montagem,
    Polimento,
    Limpeza,
    ControleQualidade,
    Pronto,
}

impl EtapaOs {
    /// The production line in order.
    pub const ETAPAS: [EtapaOs; 9] = [
        EtapaOs::Recebimento,
        EtapaOs::Analise,
        EtapaOs::Desmontagem,
        EtapaOs::Surfassagem,
        EtapaOs::Montagem,
        EtapaOs::Polimento,
        EtapaOs::Limpeza,
        EtapaOs::ControleQualidade,
        EtapaOs::Pronto,
    ];

    /// Stage name shown on the production timeline.
    pub fn label(&self) -> &'static str {
        match self {
            EtapaOs::Recebimento => "Recebimento",
            EtapaOs::Analise => "Análise",
            EtapaOs::Desmontagem => "Desmontagem",
            EtapaOs::Surfassagem => "Surfassagem",
            EtapaOs::Montagem => "Montagem",
            EtapaOs::Polimento => "Polimento",
            EtapaOs::Limpeza => "Limpeza",
            EtapaOs::ControleQualidade => "Controle de Qualidade",
            EtapaOs::Pronto => "Pronto",
        }
    }

    /// Order status as shown in the orders table.
    pub fn status_label(&self) -> &'static str {
        match self {
            EtapaOs::Recebimento => "Recebida",
            EtapaOs::Analise => "Em Análise",
            EtapaOs::ControleQualidade => "Controle Qualidade",
            EtapaOs::Pronto => "Pronta",
            other => other.label(),
        }
    }

    pub fn index(&self) -> usize {
        Self::ETAPAS.iter().position(|e| e == self).unwrap_or(0)
    }

    /// The following stage, or `None` at `pronto`.
    pub fn next(&self) -> Option<EtapaOs> {
        Self::ETAPAS.get(self.index() + 1).copied()
    }

    /// Advances one stage.
    ///
    /// # Errors
    /// `FinalStage` when already `pronto`.
    pub fn avancar(&self) -> CoreResult<EtapaOs> {
        self.next().ok_or(CoreError::FinalStage)
    }
}

/// Where a stage stands relative to the order's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EtapaStatus {
    Concluida,
    Atual,
    Pendente,
}

impl EtapaStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EtapaStatus::Concluida => "Concluída",
            EtapaStatus::Atual => "Em andamento",
            EtapaStatus::Pendente => "Pendente",
        }
    }
}

/// Timeline state of `etapa` for an order currently at `atual`.
pub fn etapa_status(atual: EtapaOs, etapa: EtapaOs) -> EtapaStatus {
    match etapa.index().cmp(&atual.index()) {
        std::cmp::Ordering::Less => EtapaStatus::Concluida,
        std::cmp::Ordering::Equal => EtapaStatus::Atual,
        std::cmp::Ordering::Greater => EtapaStatus::Pendente,
    }
}

// =============================================================================
// Service type and urgency
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoServico {
    MontagemArmacao,
    TrocaLentes,
    AjusteArmacao,
    Reparo,
    LimpezaProfunda,
}

impl TipoServico {
    pub fn label(&self) -> &'static str {
        match self {
            TipoServico::MontagemArmacao => "Montagem de Armação",
            TipoServico::TrocaLentes => "Troca de Lentes",
            TipoServico::AjusteArmacao => "Ajuste de Armação",
            TipoServico::Reparo => "Reparo",
            TipoServico::LimpezaProfunda => "Limpeza Profunda",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Urgencia {
    #[default]
    Normal,
    Urgente,
    MuitoUrgente,
}

impl Urgencia {
    pub fn label(&self) -> &'static str {
        match self {
            Urgencia::Normal => "Normal",
            Urgencia::Urgente => "Urgente",
            Urgencia::MuitoUrgente => "Muito Urgente",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A lab service order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrdemServico {
    pub id: String,
    /// Zero-padded sequence (`0007`).
    pub numero_os: String,
    pub venda_id: Option<String>,
    pub cliente_id: String,
    pub receita_id: Option<String>,
    pub tipo_servico: TipoServico,
    pub urgencia: Urgencia,
    pub armacao: Option<String>,
    pub lentes: Option<String>,
    pub observacoes_tecnicas: Option<String>,
    #[ts(as = "Option<String>")]
    pub prazo_entrega: Option<NaiveDate>,
    pub tecnico_responsavel: Option<String>,
    pub custo_servico: i64,
    pub valor_servico: i64,
    pub status: EtapaOs,
    #[ts(as = "Option<String>")]
    pub data_ultima_atualizacao: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrdemServico {
    /// Service price minus cost, in centavos.
    pub fn lucro(&self) -> i64 {
        self.valor_servico - self.custo_servico
    }
}

/// Order with the customer name, as listed on the lab board.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrdemServicoResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub ordem: OrdemServico,
    pub cliente_nome: Option<String>,
}

/// Order detail: the order, its customer, the linked prescription and the
/// timeline state of every stage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrdemServicoDetalhe {
    pub ordem: OrdemServico,
    pub cliente_nome: Option<String>,
    pub cliente_telefone: Option<String>,
    pub receita: Option<crate::types::Receita>,
    pub lucro: i64,
    pub etapas: Vec<(EtapaOs, EtapaStatus)>,
}

impl OrdemServicoDetalhe {
    pub fn new(
        ordem: OrdemServico,
        cliente_nome: Option<String>,
        cliente_telefone: Option<String>,
        receita: Option<crate::types::Receita>,
    ) -> Self {
        let etapas = EtapaOs::ETAPAS
            .iter()
            .map(|&etapa| (etapa, etapa_status(ordem.status, etapa)))
            .collect();

        OrdemServicoDetalhe {
            lucro: ordem.lucro(),
            ordem,
            cliente_nome,
            cliente_telefone,
            receita,
            etapas,
        }
    }
}

/// Service order form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrdemServicoInput {
    pub venda_id: Option<String>,
    pub cliente_id: String,
    pub receita_id: Option<String>,
    pub tipo_servico: TipoServico,
    #[serde(default)]
    pub urgencia: Urgencia,
    pub armacao: Option<String>,
    pub lentes: Option<String>,
    pub observacoes_tecnicas: Option<String>,
    #[ts(as = "Option<String>")]
    pub prazo_entrega: Option<NaiveDate>,
    pub tecnico_responsavel: Option<String>,
    #[serde(default)]
    pub custo_servico: i64,
    #[serde(default)]
    pub valor_servico: i64,
}

impl OrdemServicoInput {
    pub fn validate(self) -> ValidationResult<OrdemServicoInput> {
        let cliente_id = validate_required("cliente_id", &self.cliente_id)?;
        validate_price_cents("custo_servico", self.custo_servico)?;
        validate_price_cents("valor_servico", self.valor_servico)?;

        Ok(OrdemServicoInput {
            venda_id: normalize_optional(self.venda_id),
            cliente_id,
            receita_id: normalize_optional(self.receita_id),
            armacao: normalize_optional(self.armacao),
            lentes: normalize_optional(self.lentes),
            observacoes_tecnicas: normalize_optional(self.observacoes_tecnicas),
            tecnico_responsavel: normalize_optional(self.tecnico_responsavel),
            ..self
        })
    }
}

/// Next order number given how many orders exist: `count + 1`, padded to 4.
pub fn formatar_numero_os(count: i64) -> String {
    format!("{:04}", count + 1)
}

/// An order is late when its deadline day has passed and it is not `pronto`.
pub fn is_prazo_atrasado(ordem: &OrdemServico, today: NaiveDate) -> bool {
    ordem.status != EtapaOs::Pronto && ordem.prazo_entrega.is_some_and(|prazo| prazo < today)
}

// =============================================================================
// Productivity report
// =============================================================================

/// Lab productivity over a set of orders (normally those of the month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelatorioProdutividade {
    pub total_ordens: i64,
    pub ordens_mes: i64,
    /// Share of orders that reached `pronto`, in percent.
    pub taxa_conclusao: f64,
    /// Average production time (`"2d 5h"`) or `N/A`.
    pub tempo_medio: String,
    pub ordens_atrasadas: i64,
    /// Share of orders finished on time, in percent.
    pub eficiencia: f64,
}

/// Mean time from creation to the last stage change of finished orders.
pub fn tempo_medio_producao(ordens: &[OrdemServico]) -> String {
    let duracoes: Vec<TimeDelta> = ordens
        .iter()
        .filter(|os| os.status == EtapaOs::Pronto)
        .filter_map(|os| os.data_ultima_atualizacao.map(|fim| fim - os.created_at))
        .collect();

    if duracoes.is_empty() {
        return "N/A".to_string();
    }

    let total_secs: i64 = duracoes.iter().map(TimeDelta::num_seconds).sum();
    let media = total_secs / duracoes.len() as i64;
    let dias = media / 86_400;
    let horas = (media % 86_400) / 3_600;

    format!("{dias}d {horas}h")
}

/// Computes the productivity report.
pub fn relatorio_produtividade(ordens: &[OrdemServico], today: NaiveDate) -> RelatorioProdutividade {
    use chrono::Datelike;

    let total = ordens.len() as i64;
    let ordens_mes = ordens
        .iter()
        .filter(|os| {
            let criada = os.created_at.date_naive();
            criada.year() == today.year() && criada.month() == today.month()
        })
        .count() as i64;
    let concluidas = ordens.iter().filter(|os| os.status == EtapaOs::Pronto).count() as i64;
    let atrasadas = ordens.iter().filter(|os| is_prazo_atrasado(os, today)).count() as i64;
    let no_prazo = ordens
        .iter()
        .filter(|os| os.status == EtapaOs::Pronto && !is_prazo_atrasado(os, today))
        .count() as i64;

    RelatorioProdutividade {
        total_ordens: total,
        ordens_mes,
        taxa_conclusao: percentage_of(concluidas, total),
        tempo_medio: tempo_medio_producao(ordens),
        ordens_atrasadas: atrasadas,
        eficiencia: percentage_of(no_prazo, total),
    }
}
