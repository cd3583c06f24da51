//! # Products
//!
//! Every item on the shelf: frames, ophthalmic lenses, contact lenses,
//! accessories and lens care solutions.
//!
//! ## Category-Specific Attributes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Produto (common columns)                                               │
//! │  nome, marca, cor, material, preços, estoque...                         │
//! │       │                                                                 │
//! │       └── especificacoes: { key → value }  (JSON column)               │
//! │              │                                                          │
//! │              ├── armacao:       ponte, aro, haste, calibre, ...         │
//! │              ├── lente:         indice_refracao, tratamento, ...        │
//! │              ├── lente_contato: curva_base, diametro, ...               │
//! │              ├── acessorio:     tipo_acessorio, compatibilidade, ...    │
//! │              └── solucao:       tipo_solucao, volume, ...               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the keys listed for the product's category are kept.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    normalize_optional, validate_max_len, validate_price_cents, validate_required,
    ValidationResult,
};
use crate::ValidationError;

// =============================================================================
// Category
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CategoriaProduto {
    Armacao,
    Lente,
    LenteContato,
    Acessorio,
    Solucao,
}

impl CategoriaProduto {
    /// All categories in display order.
    pub const ALL: [CategoriaProduto; 5] = [
        CategoriaProduto::Armacao,
        CategoriaProduto::Lente,
        CategoriaProduto::LenteContato,
        CategoriaProduto::Acessorio,
        CategoriaProduto::Solucao,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoriaProduto::Armacao => "Armação",
            CategoriaProduto::Lente => "Lente",
            CategoriaProduto::LenteContato => "Lente de Contato",
            CategoriaProduto::Acessorio => "Acessório",
            CategoriaProduto::Solucao => "Solução",
        }
    }

    /// The stored literal (`lente_contato`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoriaProduto::Armacao => "armacao",
            CategoriaProduto::Lente => "lente",
            CategoriaProduto::LenteContato => "lente_contato",
            CategoriaProduto::Acessorio => "acessorio",
            CategoriaProduto::Solucao => "solucao",
        }
    }

    /// Parses the stored literal.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Attribute keys accepted in `especificacoes` for this category.
    pub fn campos_especificos(&self) -> &'static [&'static str] {
        match self {
            CategoriaProduto::Armacao => &[
                "ponte",
                "aro",
                "haste",
                "calibre",
                "dm",
                "material",
                "tipo_lente",
                "genero",
                "faixa_etaria",
            ],
            CategoriaProduto::Lente => &[
                "tipo_lente",
                "tratamento",
                "fotossensivel",
                "filtro_azul",
                "indice_refracao",
                "material",
                "design",
                "protecao_uv",
            ],
            CategoriaProduto::LenteContato => &[
                "curva_base",
                "diametro",
                "raio",
                "tipo_substituicao",
                "material",
                "conteudo_agua",
                "transmissibilidade",
            ],
            CategoriaProduto::Acessorio => &["tipo_acessorio", "compatibilidade", "material", "funcao"],
            CategoriaProduto::Solucao => &["tipo_solucao", "composicao", "volume", "indicacao"],
        }
    }
}

/// Turns an attribute key into a form label: `tipo_lente` → `Tipo Lente`.
pub fn format_label(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Produto {
    pub id: String,
    pub sku: Option<String>,
    pub nome: String,
    pub categoria: CategoriaProduto,
    pub marca: Option<String>,
    pub cor: Option<String>,
    pub material: Option<String>,
    /// Cost in centavos.
    pub preco_custo: i64,
    /// Sale price in centavos.
    pub preco_venda: i64,
    pub estoque_atual: i64,
    pub estoque_minimo: i64,
    pub observacoes: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub especificacoes: BTreeMap<String, String>,
    pub ativo: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Produto {
    #[inline]
    pub fn preco(&self) -> Money {
        Money::from_cents(self.preco_venda)
    }

    /// Checks whether `quantidade` units can leave the shelf.
    pub fn tem_estoque(&self, quantidade: i64) -> bool {
        self.estoque_atual >= quantidade
    }
}

/// Product form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProdutoInput {
    pub sku: Option<String>,
    pub nome: String,
    pub categoria: CategoriaProduto,
    pub marca: Option<String>,
    pub cor: Option<String>,
    pub material: Option<String>,
    pub preco_custo: i64,
    pub preco_venda: i64,
    pub estoque_atual: i64,
    pub estoque_minimo: i64,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub especificacoes: BTreeMap<String, String>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
}

fn default_ativo() -> bool {
    true
}

impl ProdutoInput {
    /// Creates a minimal active product form.
    pub fn new(nome: impl Into<String>, categoria: CategoriaProduto, preco_venda: i64) -> Self {
        ProdutoInput {
            sku: None,
            nome: nome.into(),
            categoria,
            marca: None,
            cor: None,
            material: None,
            preco_custo: 0,
            preco_venda,
            estoque_atual: 0,
            estoque_minimo: 0,
            observacoes: None,
            especificacoes: BTreeMap::new(),
            ativo: true,
        }
    }

    /// Validates and normalizes the form.
    ///
    /// ## Rules
    /// - `nome` required, max 200 characters
    /// - prices and stock levels are not negative
    /// - `especificacoes` keeps only the category's keys with non-blank values
    pub fn validate(self) -> ValidationResult<ProdutoInput> {
        let nome = validate_required("nome", &self.nome)?;
        validate_max_len("nome", &nome, 200)?;

        let sku = normalize_optional(self.sku);
        if let Some(sku) = &sku {
            validate_max_len("sku", sku, 50)?;
        }

        validate_price_cents("preco_custo", self.preco_custo)?;
        validate_price_cents("preco_venda", self.preco_venda)?;
        for (field, value) in [
            ("estoque_atual", self.estoque_atual),
            ("estoque_minimo", self.estoque_minimo),
        ] {
            if value < 0 {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }

        let permitidos = self.categoria.campos_especificos();
        let especificacoes = self
            .especificacoes
            .into_iter()
            .filter(|(key, _)| permitidos.contains(&key.as_str()))
            .filter_map(|(key, value)| {
                let value = value.trim().to_string();
                (!value.is_empty()).then_some((key, value))
            })
            .collect();

        Ok(ProdutoInput {
            sku,
            nome,
            categoria: self.categoria,
            marca: normalize_optional(self.marca),
            cor: normalize_optional(self.cor),
            material: normalize_optional(self.material),
            preco_custo: self.preco_custo,
            preco_venda: self.preco_venda,
            estoque_atual: self.estoque_atual,
            estoque_minimo: self.estoque_minimo,
            observacoes: normalize_optional(self.observacoes),
            especificacoes,
            ativo: self.ativo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categoria_labels_and_literals() {
        assert_eq!(CategoriaProduto::LenteContato.label(), "Lente de Contato");
        assert_eq!(CategoriaProduto::Armacao.label(), "Armação");
        assert_eq!(CategoriaProduto::parse("lente_contato"), Some(CategoriaProduto::LenteContato));
        assert_eq!(CategoriaProduto::parse("todos"), None);
        assert_eq!(
            serde_json::to_string(&CategoriaProduto::LenteContato).unwrap(),
            "\"lente_contato\""
        );
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("tipo_lente"), "Tipo Lente");
        assert_eq!(format_label("indice_refracao"), "Indice Refracao");
        assert_eq!(format_label("dm"), "Dm");
    }

    #[test]
    fn test_especificacoes_filtered_by_categoria() {
        let mut input = ProdutoInput::new("Ray-Ban RB5154", CategoriaProduto::Armacao, 45000);
        input.especificacoes.insert("ponte".into(), "21".into());
        input.especificacoes.insert("aro".into(), " 51 ".into());
        input.especificacoes.insert("haste".into(), "".into());
        input.especificacoes.insert("indice_refracao".into(), "1.67".into());

        let input = input.validate().unwrap();

        assert_eq!(input.especificacoes.len(), 2);
        assert_eq!(input.especificacoes["ponte"], "21");
        assert_eq!(input.especificacoes["aro"], "51");
        assert!(!input.especificacoes.contains_key("indice_refracao"));
    }

    #[test]
    fn test_produto_input_rejects_negative_values() {
        let mut input = ProdutoInput::new("Estojo", CategoriaProduto::Acessorio, -1);
        assert!(input.clone().validate().is_err());

        input.preco_venda = 1500;
        input.estoque_atual = -3;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_produto_input_requires_nome() {
        let input = ProdutoInput::new("  ", CategoriaProduto::Solucao, 2990);
        assert!(input.validate().is_err());
    }
}
