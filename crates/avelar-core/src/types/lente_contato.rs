//! # Contact Lenses
//!
//! A contact lens is a [`Produto`] with categoria `lente_contato` plus a
//! technical sheet in `lentes_contato`. On top of that the store tracks
//! batch expiry dates and patient follow-up visits.
//!
//! ```text
//! Produto (lente_contato) ──1:1── EspecificacaoLente
//!        │
//!        ├──< LoteValidade      (batch, fabricação → validade)
//!        └──< ControleLente     (patient follow-up: agendado → realizado)
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::{add_months, days_until};
use crate::types::produto::{CategoriaProduto, Produto, ProdutoInput};
use crate::validation::{
    normalize_optional, validate_max_len, validate_quantity, validate_required, ValidationResult,
};
use crate::ValidationError;

/// Shelf life used when the technical sheet does not say otherwise.
pub const VALIDADE_PADRAO_MESES: i64 = 24;

/// Days before expiry when a batch starts to raise a warning.
pub const DIAS_ALERTA_VALIDADE: i64 = 30;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoLenteContato {
    Gelatinosa,
    Rigida,
    Hibrida,
    Escleral,
}

impl TipoLenteContato {
    pub fn label(&self) -> &'static str {
        match self {
            TipoLenteContato::Gelatinosa => "Gelatinosa",
            TipoLenteContato::Rigida => "Rígida",
            TipoLenteContato::Hibrida => "Híbrida",
            TipoLenteContato::Escleral => "Escleral",
        }
    }
}

/// Replacement schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TipoSubstituicao {
    DescarteDiario,
    Quinzenal,
    Mensal,
    Trimestral,
    Anual,
}

impl TipoSubstituicao {
    pub fn label(&self) -> &'static str {
        match self {
            TipoSubstituicao::DescarteDiario => "Descarte Diário",
            TipoSubstituicao::Quinzenal => "Quinzenal",
            TipoSubstituicao::Mensal => "Mensal",
            TipoSubstituicao::Trimestral => "Trimestral",
            TipoSubstituicao::Anual => "Anual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusControle {
    #[default]
    Agendado,
    Realizado,
    Cancelado,
    Reagendado,
}

impl StatusControle {
    pub fn label(&self) -> &'static str {
        match self {
            StatusControle::Agendado => "Agendado",
            StatusControle::Realizado => "Realizado",
            StatusControle::Cancelado => "Cancelado",
            StatusControle::Reagendado => "Reagendado",
        }
    }
}

// =============================================================================
// Lens + technical sheet
// =============================================================================

/// Technical sheet (`lentes_contato` row).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct EspecificacaoLente {
    pub produto_id: String,
    pub tipo_lente: TipoLenteContato,
    /// Base curve in mm.
    pub curva_base: Option<f64>,
    /// Diameter in mm.
    pub diametro: Option<f64>,
    pub material: Option<String>,
    /// Water content in percent.
    pub conteudo_agua: Option<i64>,
    pub tipo_substituicao: TipoSubstituicao,
    /// Dk/t.
    pub transmissibilidade: Option<f64>,
    pub grau_minimo: Option<f64>,
    pub grau_maximo: Option<f64>,
    pub cilindro_minimo: Option<f64>,
    pub cilindro_maximo: Option<f64>,
    pub validade_meses: i64,
}

/// A contact lens: the product with its technical sheet, when registered.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LenteContato {
    #[serde(flatten)]
    pub produto: Produto,
    pub especificacao: Option<EspecificacaoLente>,
}

impl LenteContato {
    pub fn validade_meses(&self) -> i64 {
        self.especificacao
            .as_ref()
            .map_or(VALIDADE_PADRAO_MESES, |e| e.validade_meses)
    }
}

/// Technical sheet part of the lens form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EspecificacaoLenteInput {
    pub tipo_lente: TipoLenteContato,
    pub curva_base: Option<f64>,
    pub diametro: Option<f64>,
    pub material: Option<String>,
    pub conteudo_agua: Option<i64>,
    pub tipo_substituicao: TipoSubstituicao,
    pub transmissibilidade: Option<f64>,
    pub grau_minimo: Option<f64>,
    pub grau_maximo: Option<f64>,
    pub cilindro_minimo: Option<f64>,
    pub cilindro_maximo: Option<f64>,
    pub validade_meses: Option<i64>,
}

/// Lens form: product fields plus the technical sheet, saved together.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LenteContatoInput {
    pub produto: ProdutoInput,
    pub especificacao: EspecificacaoLenteInput,
}

impl LenteContatoInput {
    /// Validates both parts. The product category is forced to
    /// `lente_contato`; ranges must be ordered and shelf life within 1..=60.
    pub fn validate(self) -> ValidationResult<LenteContatoInput> {
        let produto = ProdutoInput {
            categoria: CategoriaProduto::LenteContato,
            ..self.produto
        }
        .validate()?;

        let e = self.especificacao;
        let validade = e.validade_meses.unwrap_or(VALIDADE_PADRAO_MESES);
        if !(1..=60).contains(&validade) {
            return Err(ValidationError::OutOfRange {
                field: "validade_meses".to_string(),
                min: 1,
                max: 60,
            });
        }
        if let Some(agua) = e.conteudo_agua {
            if !(0..=100).contains(&agua) {
                return Err(ValidationError::OutOfRange {
                    field: "conteudo_agua".to_string(),
                    min: 0,
                    max: 100,
                });
            }
        }
        for (campo, min, max) in [
            ("grau", e.grau_minimo, e.grau_maximo),
            ("cilindro", e.cilindro_minimo, e.cilindro_maximo),
        ] {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(ValidationError::InvalidFormat {
                        field: campo.to_string(),
                        reason: "mínimo maior que máximo".to_string(),
                    });
                }
            }
        }

        Ok(LenteContatoInput {
            produto,
            especificacao: EspecificacaoLenteInput {
                material: normalize_optional(e.material),
                validade_meses: Some(validade),
                ..e
            },
        })
    }
}

// =============================================================================
// Batch validity
// =============================================================================

/// A batch entry (`controles_validade_lc`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LoteValidade {
    pub id: String,
    pub produto_id: String,
    pub numero_lote: String,
    #[ts(as = "String")]
    pub data_fabricacao: NaiveDate,
    #[ts(as = "String")]
    pub data_validade: NaiveDate,
    pub quantidade_lote: i64,
    pub observacoes: Option<String>,
    #[ts(as = "String")]
    pub data_controle: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoteInput {
    pub produto_id: String,
    pub numero_lote: String,
    #[ts(as = "String")]
    pub data_fabricacao: NaiveDate,
    /// Computed from the lens shelf life when absent.
    #[ts(as = "Option<String>")]
    pub data_validade: Option<NaiveDate>,
    pub quantidade_lote: i64,
    pub observacoes: Option<String>,
}

impl LoteInput {
    pub fn validate(self) -> ValidationResult<LoteInput> {
        let produto_id = validate_required("produto_id", &self.produto_id)?;
        let numero_lote = validate_required("numero_lote", &self.numero_lote)?;
        validate_max_len("numero_lote", &numero_lote, 50)?;
        validate_quantity(self.quantidade_lote)?;
        if let Some(validade) = self.data_validade {
            if validade < self.data_fabricacao {
                return Err(ValidationError::InvalidFormat {
                    field: "data_validade".to_string(),
                    reason: "anterior à fabricação".to_string(),
                });
            }
        }

        Ok(LoteInput {
            produto_id,
            numero_lote,
            observacoes: normalize_optional(self.observacoes),
            ..self
        })
    }

    /// The typed expiry date, or fabricação + the lens shelf life.
    pub fn resolver_validade(&self, validade_meses: i64) -> NaiveDate {
        self.data_validade.unwrap_or_else(|| {
            add_months(
                self.data_fabricacao,
                i32::try_from(validade_meses).unwrap_or(VALIDADE_PADRAO_MESES as i32),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NivelValidade {
    Vencido,
    Proximo,
    Ok,
}

/// Expiry warning for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertaValidade {
    pub nivel: NivelValidade,
    /// Days until expiry; negative once expired.
    pub dias: i64,
    pub mensagem: String,
}

/// Classifies a batch expiry date relative to `today`.
pub fn alerta_validade(data_validade: NaiveDate, today: NaiveDate) -> AlertaValidade {
    let dias = days_until(today, data_validade);

    let (nivel, mensagem) = if dias < 0 {
        (
            NivelValidade::Vencido,
            format!("LOTE VENCIDO! {} dias de atraso", dias.abs()),
        )
    } else if dias < DIAS_ALERTA_VALIDADE {
        (NivelValidade::Proximo, format!("Atenção: vence em {dias} dias"))
    } else {
        (NivelValidade::Ok, format!("Validade OK - Vence em {dias} dias"))
    };

    AlertaValidade {
        nivel,
        dias,
        mensagem,
    }
}

// =============================================================================
// Patient follow-up
// =============================================================================

/// Follow-up visit (`controles_lentes_contato`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ControleLente {
    pub id: String,
    pub cliente_id: String,
    pub produto_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_ultima_compra: Option<NaiveDate>,
    #[ts(as = "String")]
    pub data_proximo_controle: NaiveDate,
    #[ts(as = "Option<String>")]
    pub data_ultimo_controle: Option<DateTime<Utc>>,
    pub frequencia_uso: Option<String>,
    pub horas_uso_diario: Option<i64>,
    pub solucao_limpeza: Option<String>,
    pub observacoes: Option<String>,
    pub status: StatusControle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ControleLente {
    /// A scheduled visit whose date has passed.
    pub fn is_atrasado(&self, today: NaiveDate) -> bool {
        self.status == StatusControle::Agendado && self.data_proximo_controle < today
    }
}

/// Follow-up with customer and lens names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ControleLenteResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub controle: ControleLente,
    pub cliente_nome: Option<String>,
    pub produto_nome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ControleLenteInput {
    pub cliente_id: String,
    pub produto_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub data_ultima_compra: Option<NaiveDate>,
    #[ts(as = "String")]
    pub data_proximo_controle: NaiveDate,
    pub frequencia_uso: Option<String>,
    pub horas_uso_diario: Option<i64>,
    pub solucao_limpeza: Option<String>,
    pub observacoes: Option<String>,
}

impl ControleLenteInput {
    pub fn validate(self) -> ValidationResult<ControleLenteInput> {
        let cliente_id = validate_required("cliente_id", &self.cliente_id)?;
        if let Some(horas) = self.horas_uso_diario {
            if !(0..=24).contains(&horas) {
                return Err(ValidationError::OutOfRange {
                    field: "horas_uso_diario".to_string(),
                    min: 0,
                    max: 24,
                });
            }
        }

        Ok(ControleLenteInput {
            cliente_id,
            produto_id: normalize_optional(self.produto_id),
            frequencia_uso: normalize_optional(self.frequencia_uso),
            solucao_limpeza: normalize_optional(self.solucao_limpeza),
            observacoes: normalize_optional(self.observacoes),
            ..self
        })
    }
}

// =============================================================================
// Report
// =============================================================================

/// A sale line of a contact lens product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemVendidoLente {
    pub produto_id: String,
    pub quantidade: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LenteMaisVendida {
    pub produto_id: String,
    pub nome: String,
    pub marca: Option<String>,
    pub vendas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelatorioLentes {
    pub total_lentes: i64,
    pub lentes_estoque_baixo: i64,
    /// Sale lines of contact lenses this month.
    pub total_vendas_mes: i64,
    pub faturamento_mes: i64,
    pub lentes_mais_vendidas: Vec<LenteMaisVendida>,
    pub tipos_mais_populares: BTreeMap<TipoSubstituicao, i64>,
}

/// Builds the contact lens report from the active lenses and this month's
/// sale lines. Lines of products that are not in `lentes` are ignored.
pub fn relatorio_lentes(lentes: &[LenteContato], itens_mes: &[ItemVendidoLente]) -> RelatorioLentes {
    let por_id: HashMap<&str, &LenteContato> =
        lentes.iter().map(|l| (l.produto.id.as_str(), l)).collect();
    let itens: Vec<&ItemVendidoLente> = itens_mes
        .iter()
        .filter(|i| por_id.contains_key(i.produto_id.as_str()))
        .collect();

    let mut vendidas: HashMap<&str, i64> = HashMap::new();
    let mut tipos = BTreeMap::new();
    for item in &itens {
        *vendidas.entry(item.produto_id.as_str()).or_insert(0) += item.quantidade;
        if let Some(espec) = por_id
            .get(item.produto_id.as_str())
            .and_then(|l| l.especificacao.as_ref())
        {
            *tipos.entry(espec.tipo_substituicao).or_insert(0) += item.quantidade;
        }
    }

    let mut lentes_mais_vendidas: Vec<LenteMaisVendida> = vendidas
        .into_iter()
        .filter_map(|(id, vendas)| {
            por_id.get(id).map(|l| LenteMaisVendida {
                produto_id: l.produto.id.clone(),
                nome: l.produto.nome.clone(),
                marca: l.produto.marca.clone(),
                vendas,
            })
        })
        .collect();
    lentes_mais_vendidas.sort_by(|a, b| b.vendas.cmp(&a.vendas).then_with(|| a.nome.cmp(&b.nome)));
    lentes_mais_vendidas.truncate(5);

    RelatorioLentes {
        total_lentes: lentes.len() as i64,
        lentes_estoque_baixo: lentes
            .iter()
            .filter(|l| l.produto.estoque_atual <= l.produto.estoque_minimo)
            .count() as i64,
        total_vendas_mes: itens.len() as i64,
        faturamento_mes: itens.iter().map(|i| i.subtotal).sum(),
        lentes_mais_vendidas,
        tipos_mais_populares: tipos,
    }
}
