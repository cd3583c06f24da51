//! # Prescriptions
//!
//! Ophthalmic prescriptions per customer, with per-eye refraction data.
//!
//! ```text
//!            esférico  cilíndrico  eixo  adição  DNP  altura
//!   OD (R)    -2.25      -0.75     180   +1.50   32    18
//!   OE (L)    -2.00      -0.50     175   +1.50   31    18
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::{add_months, format_br_date};
use crate::validation::{normalize_optional, validate_eixo, validate_required, ValidationResult};

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoLente {
    Monofocal,
    Bifocal,
    Multifocal,
    Ocupacional,
}

impl TipoLente {
    pub fn label(&self) -> &'static str {
        match self {
            TipoLente::Monofocal => "Monofocal",
            TipoLente::Bifocal => "Bifocal",
            TipoLente::Multifocal => "Multifocal",
            TipoLente::Ocupacional => "Ocupacional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Tratamento {
    AntiReflexo,
    Antirrisco,
    Fotossensivel,
    FiltroAzul,
}

impl Tratamento {
    pub fn label(&self) -> &'static str {
        match self {
            Tratamento::AntiReflexo => "Anti-reflexo",
            Tratamento::Antirrisco => "Antirrisco",
            Tratamento::Fotossensivel => "Fotossensível",
            Tratamento::FiltroAzul => "Filtro de Luz Azul",
        }
    }
}

/// Instruments whose readings can be imported into the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Dispositivo {
    Autorrefrator,
    Lensmeter,
    Keratometer,
    Manual,
}

impl Dispositivo {
    pub fn label(&self) -> &'static str {
        match self {
            Dispositivo::Autorrefrator => "Autorrefrator",
            Dispositivo::Lensmeter => "Lensômetro",
            Dispositivo::Keratometer => "Ceratômetro",
            Dispositivo::Manual => "Entrada Manual",
        }
    }

    /// Fields each instrument fills in.
    pub fn campos(&self) -> &'static [&'static str] {
        match self {
            Dispositivo::Autorrefrator => &[
                "od_esferico",
                "od_cilindrico",
                "od_eixo",
                "oe_esferico",
                "oe_cilindrico",
                "oe_eixo",
                "dnp",
            ],
            Dispositivo::Lensmeter => &[
                "od_esferico",
                "od_cilindrico",
                "od_eixo",
                "oe_esferico",
                "oe_cilindrico",
                "oe_eixo",
            ],
            Dispositivo::Keratometer => &["curva_corneana_od", "curva_corneana_oe"],
            Dispositivo::Manual => &[
                "od_esferico",
                "od_cilindrico",
                "od_eixo",
                "oe_esferico",
                "oe_cilindrico",
                "oe_eixo",
                "adicao",
                "dnp",
            ],
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A prescription.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Receita {
    pub id: String,
    pub cliente_id: String,
    pub venda_id: Option<String>,
    pub medico_nome: Option<String>,
    pub medico_crm: Option<String>,
    #[ts(as = "String")]
    pub data_receita: NaiveDate,
    #[ts(as = "Option<String>")]
    pub data_validade: Option<NaiveDate>,
    pub idade: Option<i64>,
    pub ocupacao: Option<String>,
    pub uso_previo: Option<String>,
    pub od_esferico: Option<f64>,
    pub od_cilindrico: Option<f64>,
    pub od_eixo: Option<i64>,
    pub od_adicao: Option<f64>,
    pub od_dnp: Option<f64>,
    pub od_altura: Option<f64>,
    pub oe_esferico: Option<f64>,
    pub oe_cilindrico: Option<f64>,
    pub oe_eixo: Option<i64>,
    pub oe_adicao: Option<f64>,
    pub oe_dnp: Option<f64>,
    pub oe_altura: Option<f64>,
    pub tipo_lente: Option<TipoLente>,
    pub tratamento: Option<Tratamento>,
    pub observacoes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Prescription with the customer name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReceitaResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub receita: Receita,
    pub cliente_nome: Option<String>,
}

/// Prescription form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceitaInput {
    pub cliente_id: String,
    pub venda_id: Option<String>,
    pub medico_nome: Option<String>,
    pub medico_crm: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_receita: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub data_validade: Option<NaiveDate>,
    pub idade: Option<i64>,
    pub ocupacao: Option<String>,
    pub uso_previo: Option<String>,
    pub od_esferico: Option<f64>,
    pub od_cilindrico: Option<f64>,
    pub od_eixo: Option<i64>,
    pub od_adicao: Option<f64>,
    pub od_dnp: Option<f64>,
    pub od_altura: Option<f64>,
    pub oe_esferico: Option<f64>,
    pub oe_cilindrico: Option<f64>,
    pub oe_eixo: Option<i64>,
    pub oe_adicao: Option<f64>,
    pub oe_dnp: Option<f64>,
    pub oe_altura: Option<f64>,
    pub tipo_lente: Option<TipoLente>,
    pub tratamento: Option<Tratamento>,
    pub observacoes: Option<String>,
}

impl ReceitaInput {
    /// Validates and normalizes the form.
    ///
    /// `cliente_id` is required; both axes must lie in 0..=180.
    pub fn validate(self) -> ValidationResult<ReceitaInput> {
        let cliente_id = validate_required("cliente_id", &self.cliente_id)?;
        validate_eixo("od_eixo", self.od_eixo)?;
        validate_eixo("oe_eixo", self.oe_eixo)?;

        Ok(ReceitaInput {
            cliente_id,
            venda_id: normalize_optional(self.venda_id),
            medico_nome: normalize_optional(self.medico_nome),
            medico_crm: normalize_optional(self.medico_crm),
            ocupacao: normalize_optional(self.ocupacao),
            uso_previo: normalize_optional(self.uso_previo),
            observacoes: normalize_optional(self.observacoes),
            ..self
        })
    }
}

impl Receita {
    /// Draft of a renewed prescription: same refraction, dated today,
    /// valid for one year. Nothing is saved.
    pub fn renovar(&self, today: NaiveDate) -> ReceitaInput {
        let anterior = format!(
            "Renovação da receita anterior de {}. {}",
            format_br_date(self.data_receita),
            self.observacoes.as_deref().unwrap_or("")
        );

        ReceitaInput {
            cliente_id: self.cliente_id.clone(),
            venda_id: None,
            medico_nome: self.medico_nome.clone(),
            medico_crm: self.medico_crm.clone(),
            data_receita: Some(today),
            data_validade: Some(add_months(today, 12)),
            idade: self.idade,
            ocupacao: self.ocupacao.clone(),
            uso_previo: self.uso_previo.clone(),
            od_esferico: self.od_esferico,
            od_cilindrico: self.od_cilindrico,
            od_eixo: self.od_eixo,
            od_adicao: self.od_adicao,
            od_dnp: self.od_dnp,
            od_altura: self.od_altura,
            oe_esferico: self.oe_esferico,
            oe_cilindrico: self.oe_cilindrico,
            oe_eixo: self.oe_eixo,
            oe_adicao: self.oe_adicao,
            oe_dnp: self.oe_dnp,
            oe_altura: self.oe_altura,
            tipo_lente: self.tipo_lente,
            tratamento: self.tratamento,
            observacoes: Some(anterior.trim_end().to_string()),
        }
    }
}

/// A prescription is expired once its validity date is behind `today`.
/// Without a validity date it never expires.
pub fn is_receita_vencida(data_validade: Option<NaiveDate>, today: NaiveDate) -> bool {
    data_validade.is_some_and(|validade| validade < today)
}

/// Diopter display: `-` when missing or zero, explicit `+` when positive.
pub fn formatar_grau(grau: Option<f64>) -> String {
    match grau {
        None => "-".to_string(),
        Some(g) if g == 0.0 => "-".to_string(),
        Some(g) if g > 0.0 => format!("+{g}"),
        Some(g) => g.to_string(),
    }
}

/// Cylinder display; blank when missing or zero.
pub fn formatar_cilindrico(cilindrico: Option<f64>) -> String {
    match cilindrico {
        None => String::new(),
        Some(c) if c == 0.0 => String::new(),
        Some(c) if c > 0.0 => format!("+{c}"),
        Some(c) => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn receita() -> Receita {
        let now = Utc::now();
        Receita {
            id: "r1".to_string(),
            cliente_id: "c1".to_string(),
            venda_id: Some("v1".to_string()),
            medico_nome: Some("Dra. Helena".to_string()),
            medico_crm: Some("CRM-SP 12345".to_string()),
            data_receita: d(2024, 3, 5),
            data_validade: Some(d(2025, 3, 5)),
            idade: Some(41),
            ocupacao: None,
            uso_previo: None,
            od_esferico: Some(-2.25),
            od_cilindrico: Some(-0.75),
            od_eixo: Some(180),
            od_adicao: Some(1.5),
            od_dnp: Some(32.0),
            od_altura: None,
            oe_esferico: Some(-2.0),
            oe_cilindrico: None,
            oe_eixo: None,
            oe_adicao: Some(1.5),
            oe_dnp: Some(31.0),
            oe_altura: None,
            tipo_lente: Some(TipoLente::Multifocal),
            tratamento: Some(Tratamento::AntiReflexo),
            observacoes: Some("Uso contínuo".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_renovar() {
        let today = d(2025, 6, 10);
        let draft = receita().renovar(today);

        assert_eq!(draft.data_receita, Some(today));
        assert_eq!(draft.data_validade, Some(d(2026, 6, 10)));
        assert_eq!(draft.od_esferico, Some(-2.25));
        assert_eq!(draft.venda_id, None);
        assert_eq!(
            draft.observacoes.as_deref(),
            Some("Renovação da receita anterior de 05/03/2024. Uso contínuo")
        );
    }

    #[test]
    fn test_renovar_without_notes() {
        let mut r = receita();
        r.observacoes = None;
        let draft = r.renovar(d(2025, 6, 10));
        assert_eq!(
            draft.observacoes.as_deref(),
            Some("Renovação da receita anterior de 05/03/2024.")
        );
    }

    #[test]
    fn test_is_receita_vencida() {
        let today = d(2025, 3, 6);
        assert!(is_receita_vencida(Some(d(2025, 3, 5)), today));
        assert!(!is_receita_vencida(Some(d(2025, 3, 6)), today));
        assert!(!is_receita_vencida(None, today));
    }

    #[test]
    fn test_formatar_grau() {
        assert_eq!(formatar_grau(None), "-");
        assert_eq!(formatar_grau(Some(0.0)), "-");
        assert_eq!(formatar_grau(Some(1.5)), "+1.5");
        assert_eq!(formatar_grau(Some(2.0)), "+2");
        assert_eq!(formatar_grau(Some(-0.75)), "-0.75");
        assert_eq!(formatar_cilindrico(None), "");
        assert_eq!(formatar_cilindrico(Some(0.5)), "+0.5");
    }

    #[test]
    fn test_validate_eixo_range() {
        let input = ReceitaInput {
            cliente_id: "c1".to_string(),
            od_eixo: Some(181),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = ReceitaInput {
            cliente_id: " ".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_dispositivo_campos() {
        assert_eq!(Dispositivo::Keratometer.campos().len(), 2);
        assert!(Dispositivo::Manual.campos().contains(&"adicao"));
        assert!(!Dispositivo::Lensmeter.campos().contains(&"dnp"));
    }
}
