//! # Warranties
//!
//! Warranties issued for frames, lenses, services and contact lenses, plus
//! the claims (ocorrências) registered against them.
//!
//! ## Allowed Kinds per Product Type
//! ```text
//! ┌───────────────┬─────────────────────────────────┬─────────────────────┐
//! │ tipo_produto  │ tipo_garantia                   │ default duration    │
//! ├───────────────┼─────────────────────────────────┼─────────────────────┤
//! │ armacao       │ 6_meses, 12_meses, vitalicia    │ 6, 12, 120 months   │
//! │ lente         │ 6_meses, 12_meses, 24_meses     │ 6, 12, 24 months    │
//! │ servico       │ 30_dias, 90_dias                │ 1, 3 months         │
//! │ lente_contato │ fabricante                      │ 12 months           │
//! └───────────────┴─────────────────────────────────┴─────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::add_months;
use crate::error::CoreResult;
use crate::validation::{
    normalize_optional, validate_duration_months, validate_required, ValidationResult,
};
use crate::ValidationError;

/// Longest warranty the store issues, in months.
pub const DURACAO_MAXIMA_MESES: i64 = 120;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoProdutoGarantia {
    Armacao,
    Lente,
    Servico,
    LenteContato,
}

impl TipoProdutoGarantia {
    pub fn label(&self) -> &'static str {
        match self {
            TipoProdutoGarantia::Armacao => "Armação",
            TipoProdutoGarantia::Lente => "Lente",
            TipoProdutoGarantia::Servico => "Serviço",
            TipoProdutoGarantia::LenteContato => "Lente de Contato",
        }
    }

    /// Warranty kinds that can be issued for this product type.
    pub fn tipos_garantia(&self) -> &'static [TipoGarantia] {
        match self {
            TipoProdutoGarantia::Armacao => &[
                TipoGarantia::SeisMeses,
                TipoGarantia::DozeMeses,
                TipoGarantia::Vitalicia,
            ],
            TipoProdutoGarantia::Lente => &[
                TipoGarantia::SeisMeses,
                TipoGarantia::DozeMeses,
                TipoGarantia::VinteQuatroMeses,
            ],
            TipoProdutoGarantia::Servico => &[TipoGarantia::TrintaDias, TipoGarantia::NoventaDias],
            TipoProdutoGarantia::LenteContato => &[TipoGarantia::Fabricante],
        }
    }
}

/// Warranty kind. Stored literals start with digits (`6_meses`, `30_dias`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum TipoGarantia {
    #[serde(rename = "6_meses")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "6_meses"))]
    SeisMeses,
    #[serde(rename = "12_meses")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "12_meses"))]
    DozeMeses,
    #[serde(rename = "24_meses")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "24_meses"))]
    VinteQuatroMeses,
    #[serde(rename = "vitalicia")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "vitalicia"))]
    Vitalicia,
    #[serde(rename = "30_dias")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "30_dias"))]
    TrintaDias,
    #[serde(rename = "90_dias")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "90_dias"))]
    NoventaDias,
    #[serde(rename = "fabricante")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "fabricante"))]
    Fabricante,
}

impl TipoGarantia {
    pub fn label(&self) -> &'static str {
        match self {
            TipoGarantia::SeisMeses => "6 Meses",
            TipoGarantia::DozeMeses => "12 Meses",
            TipoGarantia::VinteQuatroMeses => "24 Meses",
            TipoGarantia::Vitalicia => "Vitalícia",
            TipoGarantia::TrintaDias => "30 Dias",
            TipoGarantia::NoventaDias => "90 Dias",
            TipoGarantia::Fabricante => "Garantia do Fabricante",
        }
    }

    /// Duration pre-filled in the form, in months.
    pub fn duracao_padrao_meses(&self) -> i64 {
        match self {
            TipoGarantia::SeisMeses => 6,
            TipoGarantia::DozeMeses => 12,
            TipoGarantia::VinteQuatroMeses => 24,
            TipoGarantia::Vitalicia => DURACAO_MAXIMA_MESES,
            TipoGarantia::TrintaDias => 1,
            TipoGarantia::NoventaDias => 3,
            TipoGarantia::Fabricante => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusGarantia {
    #[default]
    Ativa,
    Vencida,
    Utilizada,
    Cancelada,
}

impl StatusGarantia {
    pub fn label(&self) -> &'static str {
        match self {
            StatusGarantia::Ativa => "Ativa",
            StatusGarantia::Vencida => "Vencida",
            StatusGarantia::Utilizada => "Utilizada",
            StatusGarantia::Cancelada => "Cancelada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoOcorrencia {
    Reparo,
    Troca,
    Ajuste,
    Reclamacao,
}

impl TipoOcorrencia {
    pub fn label(&self) -> &'static str {
        match self {
            TipoOcorrencia::Reparo => "Reparo",
            TipoOcorrencia::Troca => "Troca",
            TipoOcorrencia::Ajuste => "Ajuste",
            TipoOcorrencia::Reclamacao => "Reclamação",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Garantia {
    pub id: String,
    pub venda_id: Option<String>,
    pub cliente_id: String,
    pub produto_id: Option<String>,
    pub tipo_produto: TipoProdutoGarantia,
    pub tipo_garantia: TipoGarantia,
    pub duracao_meses: i64,
    #[ts(as = "String")]
    pub data_inicio: NaiveDate,
    #[ts(as = "String")]
    pub data_fim: NaiveDate,
    pub termos: String,
    pub cobre_quebras: bool,
    pub cobre_riscos: bool,
    pub cobre_defeitos: bool,
    pub cobre_ajustes: bool,
    pub observacoes: Option<String>,
    pub status: StatusGarantia,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Garantia {
    /// New end date and duration after extending by `meses`.
    ///
    /// # Errors
    /// Validation error when `meses < 1` or the total passes 120 months.
    pub fn estender(&self, meses: i64) -> CoreResult<(NaiveDate, i64)> {
        if meses < 1 {
            return Err(ValidationError::MustBePositive {
                field: "meses".to_string(),
            }
            .into());
        }
        let duracao = self
            .duracao_meses
            .checked_add(meses)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "duracao_meses".to_string(),
                min: 1,
                max: 120,
            })?;
        validate_duration_months(duracao)?;

        // bounded by the 120-month ceiling checked above
        Ok((add_months(self.data_fim, meses as i32), duracao))
    }
}

/// Warranty with customer and product names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct GarantiaResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub garantia: Garantia,
    pub cliente_nome: Option<String>,
    pub produto_nome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GarantiaInput {
    pub venda_id: Option<String>,
    pub cliente_id: String,
    pub produto_id: Option<String>,
    pub tipo_produto: TipoProdutoGarantia,
    pub tipo_garantia: TipoGarantia,
    /// Falls back to the kind's default duration.
    pub duracao_meses: Option<i64>,
    #[ts(as = "String")]
    pub data_inicio: NaiveDate,
    pub termos: Option<String>,
    #[serde(default)]
    pub cobre_quebras: bool,
    #[serde(default)]
    pub cobre_riscos: bool,
    #[serde(default = "default_true")]
    pub cobre_defeitos: bool,
    #[serde(default = "default_true")]
    pub cobre_ajustes: bool,
    pub observacoes: Option<String>,
}

fn default_true() -> bool {
    true
}

/// A validated warranty form with its computed end date.
#[derive(Debug, Clone)]
pub struct GarantiaValidada {
    pub input: GarantiaInput,
    pub duracao_meses: i64,
    pub data_fim: NaiveDate,
    pub termos: String,
}

impl GarantiaInput {
    pub fn new(
        cliente_id: impl Into<String>,
        tipo_produto: TipoProdutoGarantia,
        tipo_garantia: TipoGarantia,
        data_inicio: NaiveDate,
    ) -> Self {
        GarantiaInput {
            venda_id: None,
            cliente_id: cliente_id.into(),
            produto_id: None,
            tipo_produto,
            tipo_garantia,
            duracao_meses: None,
            data_inicio,
            termos: None,
            cobre_quebras: false,
            cobre_riscos: false,
            cobre_defeitos: true,
            cobre_ajustes: true,
            observacoes: None,
        }
    }

    /// Validates the form and derives duration, end date and terms.
    ///
    /// ## Rules
    /// - `tipo_garantia` must be allowed for `tipo_produto`
    /// - duration in 1..=120 months
    /// - `data_fim = data_inicio + duração`
    /// - blank terms are replaced with the standard text
    pub fn validate(self) -> ValidationResult<GarantiaValidada> {
        let cliente_id = validate_required("cliente_id", &self.cliente_id)?;

        let permitidos = self.tipo_produto.tipos_garantia();
        if !permitidos.contains(&self.tipo_garantia) {
            return Err(ValidationError::NotAllowed {
                field: "tipo_garantia".to_string(),
                allowed: permitidos.iter().map(|t| t.label().to_string()).collect(),
            });
        }

        let duracao_meses = self
            .duracao_meses
            .unwrap_or_else(|| self.tipo_garantia.duracao_padrao_meses());
        validate_duration_months(duracao_meses)?;

        // validated to 1..=120 above
        let data_fim = add_months(self.data_inicio, duracao_meses as i32);
        let termos = normalize_optional(self.termos.clone()).unwrap_or_else(|| {
            termos_padrao(
                self.tipo_produto,
                self.tipo_garantia,
                duracao_meses,
                self.cobre_quebras,
                self.cobre_riscos,
            )
        });

        let input = GarantiaInput {
            cliente_id,
            venda_id: normalize_optional(self.venda_id),
            produto_id: normalize_optional(self.produto_id),
            observacoes: normalize_optional(self.observacoes),
            duracao_meses: Some(duracao_meses),
            ..self
        };

        Ok(GarantiaValidada {
            input,
            duracao_meses,
            data_fim,
            termos,
        })
    }
}

/// Standard terms printed on the certificate when none are typed in.
pub fn termos_padrao(
    tipo_produto: TipoProdutoGarantia,
    tipo_garantia: TipoGarantia,
    duracao_meses: i64,
    cobre_quebras: bool,
    cobre_riscos: bool,
) -> String {
    let mut termos = format!(
        "Garantia {} para {} com validade de {} {}. ",
        tipo_garantia.label(),
        tipo_produto.label(),
        duracao_meses,
        if duracao_meses == 1 { "mês" } else { "meses" }
    );
    termos.push_str("Cobre defeitos de fabricação e ajustes mediante apresentação deste certificado.");
    if cobre_quebras {
        termos.push_str(" Inclui quebras acidentais.");
    }
    if cobre_riscos {
        termos.push_str(" Inclui riscos nas lentes.");
    }
    termos.push_str(" Não cobre mau uso, perda ou furto.");
    termos
}

/// A warranty is expired once its end date is behind `today`.
pub fn is_garantia_vencida(data_fim: NaiveDate, today: NaiveDate) -> bool {
    data_fim < today
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Ocorrencia {
    pub id: String,
    pub garantia_id: String,
    pub tipo: TipoOcorrencia,
    pub descricao: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OcorrenciaInput {
    pub garantia_id: String,
    pub tipo: TipoOcorrencia,
    pub descricao: String,
}

impl OcorrenciaInput {
    pub fn validate(self) -> ValidationResult<OcorrenciaInput> {
        Ok(OcorrenciaInput {
            garantia_id: validate_required("garantia_id", &self.garantia_id)?,
            descricao: validate_required("descricao", &self.descricao)?,
            tipo: self.tipo,
        })
    }
}

/// Counters shown on top of the warranty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EstatisticasGarantias {
    pub total_garantias: i64,
    pub ativas: i64,
    pub vencidas: i64,
    pub ocorrencias_mes: i64,
}

/// Counts warranties by effective state. An `ativa` warranty past its end
/// date counts as expired.
pub fn estatisticas_garantias(
    garantias: &[Garantia],
    ocorrencias_mes: i64,
    today: NaiveDate,
) -> EstatisticasGarantias {
    let ativas = garantias
        .iter()
        .filter(|g| g.status == StatusGarantia::Ativa && !is_garantia_vencida(g.data_fim, today))
        .count() as i64;
    let vencidas = garantias
        .iter()
        .filter(|g| {
            g.status == StatusGarantia::Vencida
                || (g.status == StatusGarantia::Ativa && is_garantia_vencida(g.data_fim, today))
        })
        .count() as i64;

    EstatisticasGarantias {
        total_garantias: garantias.len() as i64,
        ativas,
        vencidas,
        ocorrencias_mes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn garantia(status: StatusGarantia, duracao: i64, fim: NaiveDate) -> Garantia {
        Garantia {
            id: "g1".to_string(),
            venda_id: None,
            cliente_id: "c1".to_string(),
            produto_id: None,
            tipo_produto: TipoProdutoGarantia::Lente,
            tipo_garantia: TipoGarantia::DozeMeses,
            duracao_meses: duracao,
            data_inicio: d(2025, 1, 10),
            data_fim: fim,
            termos: String::new(),
            cobre_quebras: false,
            cobre_riscos: false,
            cobre_defeitos: true,
            cobre_ajustes: true,
            observacoes: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tipo_garantia_literals() {
        assert_eq!(serde_json::to_string(&TipoGarantia::SeisMeses).unwrap(), "\"6_meses\"");
        assert_eq!(serde_json::to_string(&TipoGarantia::TrintaDias).unwrap(), "\"30_dias\"");
        let tipo: TipoGarantia = serde_json::from_str("\"vitalicia\"").unwrap();
        assert_eq!(tipo, TipoGarantia::Vitalicia);
    }

    #[test]
    fn test_default_durations() {
        assert_eq!(TipoGarantia::SeisMeses.duracao_padrao_meses(), 6);
        assert_eq!(TipoGarantia::VinteQuatroMeses.duracao_padrao_meses(), 24);
        assert_eq!(TipoGarantia::TrintaDias.duracao_padrao_meses(), 1);
        assert_eq!(TipoGarantia::NoventaDias.duracao_padrao_meses(), 3);
        assert_eq!(TipoGarantia::Vitalicia.duracao_padrao_meses(), 120);
        assert_eq!(TipoGarantia::Fabricante.duracao_padrao_meses(), 12);
    }

    #[test]
    fn test_validate_computes_fim_and_terms() {
        let input = GarantiaInput::new(
            "c1",
            TipoProdutoGarantia::Armacao,
            TipoGarantia::DozeMeses,
            d(2025, 1, 31),
        );
        let v = input.validate().unwrap();
        assert_eq!(v.duracao_meses, 12);
        assert_eq!(v.data_fim, d(2026, 1, 31));
        assert!(v.termos.starts_with("Garantia 12 Meses para Armação"));
    }

    #[test]
    fn test_validate_rejects_kind_not_allowed() {
        let input = GarantiaInput::new(
            "c1",
            TipoProdutoGarantia::Servico,
            TipoGarantia::Vitalicia,
            d(2025, 1, 1),
        );
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_duration_range() {
        let mut input = GarantiaInput::new(
            "c1",
            TipoProdutoGarantia::Lente,
            TipoGarantia::SeisMeses,
            d(2025, 1, 1),
        );
        input.duracao_meses = Some(121);
        assert!(input.clone().validate().is_err());
        input.duracao_meses = Some(0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_custom_terms_kept() {
        let mut input = GarantiaInput::new(
            "c1",
            TipoProdutoGarantia::LenteContato,
            TipoGarantia::Fabricante,
            d(2025, 1, 1),
        );
        input.termos = Some("  Conforme fabricante  ".to_string());
        assert_eq!(input.validate().unwrap().termos, "Conforme fabricante");
    }

    #[test]
    fn test_estender() {
        let g = garantia(StatusGarantia::Ativa, 12, d(2026, 1, 10));
        assert_eq!(g.estender(6).unwrap(), (d(2026, 7, 10), 18));
        assert!(g.estender(0).is_err());
        assert!(g.estender(109).is_err());
        assert_eq!(g.estender(108).unwrap().1, 120);
    }

    #[test]
    fn test_estender_huge_months_rejected() {
        let g = garantia(StatusGarantia::Ativa, 12, d(2026, 1, 10));
        assert!(matches!(
            g.estender(i64::MAX),
            Err(crate::CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_estatisticas() {
        let today = d(2025, 6, 1);
        let garantias = vec![
            garantia(StatusGarantia::Ativa, 12, d(2026, 1, 10)),
            garantia(StatusGarantia::Ativa, 12, d(2025, 5, 31)),
            garantia(StatusGarantia::Vencida, 12, d(2025, 1, 1)),
            garantia(StatusGarantia::Utilizada, 12, d(2026, 1, 1)),
        ];
        let e = estatisticas_garantias(&garantias, 3, today);
        assert_eq!(
            e,
            EstatisticasGarantias {
                total_garantias: 4,
                ativas: 1,
                vencidas: 2,
                ocorrencias_mes: 3,
            }
        );
    }

    #[test]
    fn test_is_garantia_vencida() {
        assert!(is_garantia_vencida(d(2025, 5, 31), d(2025, 6, 1)));
        assert!(!is_garantia_vencida(d(2025, 6, 1), d(2025, 6, 1)));
    }
}
