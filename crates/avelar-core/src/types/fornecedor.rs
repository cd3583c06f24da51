//! # Suppliers
//!
//! Supplier registry with star ratings and a performance report.
//!
//! ## Ratings
//! ```text
//! Fornecedor ──< Avaliacao { nota 1..5, critérios, comentário }
//!      │
//!      └── media_avaliacoes(notas) ──► render_stars ──► ★★★⯪☆
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::{
    normalize_optional, only_digits, validate_cep, validate_cnpj, validate_email, validate_max_len,
    validate_price_cents, validate_rating, validate_required, validate_uf, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CategoriaFornecedor {
    FabricanteArmacoes,
    LaboratorioLentes,
    DistribuidorLentesContato,
    EquipamentosOftalmicos,
    ProdutosLimpeza,
    Acessorios,
    SolucoesLentesContato,
    ServicosTerceirizados,
}

impl CategoriaFornecedor {
    pub const ALL: [CategoriaFornecedor; 8] = [
        CategoriaFornecedor::FabricanteArmacoes,
        CategoriaFornecedor::LaboratorioLentes,
        CategoriaFornecedor::DistribuidorLentesContato,
        CategoriaFornecedor::EquipamentosOftalmicos,
        CategoriaFornecedor::ProdutosLimpeza,
        CategoriaFornecedor::Acessorios,
        CategoriaFornecedor::SolucoesLentesContato,
        CategoriaFornecedor::ServicosTerceirizados,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoriaFornecedor::FabricanteArmacoes => "Fabricante de Armações",
            CategoriaFornecedor::LaboratorioLentes => "Laboratório de Lentes",
            CategoriaFornecedor::DistribuidorLentesContato => "Distribuidor Lentes Contato",
            CategoriaFornecedor::EquipamentosOftalmicos => "Equipamentos Oftálmicos",
            CategoriaFornecedor::ProdutosLimpeza => "Produtos de Limpeza",
            CategoriaFornecedor::Acessorios => "Acessórios",
            CategoriaFornecedor::SolucoesLentesContato => "Soluções Lentes Contato",
            CategoriaFornecedor::ServicosTerceirizados => "Serviços Terceirizados",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Fornecedor {
    pub id: String,
    pub nome: String,
    pub categoria: CategoriaFornecedor,
    pub cnpj: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub contato_nome: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub site: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    /// Average delivery time in days.
    pub prazo_entrega_medio: Option<i64>,
    pub condicao_pagamento: Option<String>,
    pub politica_frete: Option<String>,
    /// Minimum order in centavos.
    pub valor_minimo_pedido: Option<i64>,
    pub observacoes: Option<String>,
    pub ativo: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Supplier with its rating average, as listed in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FornecedorResumo {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[serde(flatten)]
    pub fornecedor: Fornecedor,
    pub media_avaliacao: f64,
    pub total_avaliacoes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FornecedorInput {
    pub nome: String,
    pub categoria: CategoriaFornecedor,
    pub cnpj: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub contato_nome: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub site: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub prazo_entrega_medio: Option<i64>,
    pub condicao_pagamento: Option<String>,
    pub politica_frete: Option<String>,
    pub valor_minimo_pedido: Option<i64>,
    pub observacoes: Option<String>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
}

fn default_ativo() -> bool {
    true
}

impl FornecedorInput {
    pub fn new(nome: impl Into<String>, categoria: CategoriaFornecedor) -> Self {
        FornecedorInput {
            nome: nome.into(),
            categoria,
            cnpj: None,
            inscricao_estadual: None,
            contato_nome: None,
            telefone: None,
            email: None,
            site: None,
            cep: None,
            endereco: None,
            cidade: None,
            estado: None,
            prazo_entrega_medio: None,
            condicao_pagamento: None,
            politica_frete: None,
            valor_minimo_pedido: None,
            observacoes: None,
            ativo: true,
        }
    }

    /// Validates the form. Documents (CNPJ, CEP, e-mail, UF) are checked
    /// only when filled in; the UF is upper-cased.
    pub fn validate(self) -> ValidationResult<FornecedorInput> {
        let nome = validate_required("nome", &self.nome)?;
        validate_max_len("nome", &nome, 150)?;

        let cnpj = normalize_optional(self.cnpj);
        if let Some(cnpj) = &cnpj {
            validate_cnpj(cnpj)?;
        }
        let cep = normalize_optional(self.cep);
        if let Some(cep) = &cep {
            validate_cep(cep)?;
        }
        let email = normalize_optional(self.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let estado = normalize_optional(self.estado).map(|uf| uf.to_uppercase());
        if let Some(uf) = &estado {
            validate_uf(uf)?;
        }
        if let Some(valor) = self.valor_minimo_pedido {
            validate_price_cents("valor_minimo_pedido", valor)?;
        }

        Ok(FornecedorInput {
            nome,
            cnpj,
            cep,
            email,
            estado,
            inscricao_estadual: normalize_optional(self.inscricao_estadual),
            contato_nome: normalize_optional(self.contato_nome),
            telefone: normalize_optional(self.telefone),
            site: normalize_optional(self.site),
            endereco: normalize_optional(self.endereco),
            cidade: normalize_optional(self.cidade),
            condicao_pagamento: normalize_optional(self.condicao_pagamento),
            politica_frete: normalize_optional(self.politica_frete),
            observacoes: normalize_optional(self.observacoes),
            ..self
        })
    }
}

/// Whether a CEP field holds a complete masked value (`00000-000`) worth
/// looking up.
pub fn cep_pronto_para_busca(cep: &str) -> bool {
    cep.chars().count() == 9 && only_digits(cep).len() == 8
}

// =============================================================================
// Ratings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Avaliacao {
    pub id: String,
    pub fornecedor_id: String,
    pub nota: i64,
    pub criterio_qualidade: Option<i64>,
    pub criterio_entrega: Option<i64>,
    pub criterio_atendimento: Option<i64>,
    pub comentario: Option<String>,
    #[ts(as = "String")]
    pub data_avaliacao: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvaliacaoInput {
    /// 0 means no star was picked.
    pub nota: i64,
    pub criterio_qualidade: Option<i64>,
    pub criterio_entrega: Option<i64>,
    pub criterio_atendimento: Option<i64>,
    pub comentario: Option<String>,
}

impl AvaliacaoInput {
    /// # Errors
    /// `MissingRating` when no star was picked; the rating and each
    /// criterion must lie in 1..=5.
    pub fn validate(self) -> CoreResult<AvaliacaoInput> {
        if self.nota == 0 {
            return Err(CoreError::MissingRating);
        }
        validate_rating("nota", self.nota)?;
        for (campo, valor) in [
            ("criterio_qualidade", self.criterio_qualidade),
            ("criterio_entrega", self.criterio_entrega),
            ("criterio_atendimento", self.criterio_atendimento),
        ] {
            if let Some(v) = valor {
                validate_rating(campo, v)?;
            }
        }

        Ok(AvaliacaoInput {
            comentario: normalize_optional(self.comentario),
            ..self
        })
    }
}

/// Arithmetic mean of the ratings; 0 without ratings.
pub fn media_avaliacoes(notas: &[i64]) -> f64 {
    if notas.is_empty() {
        return 0.0;
    }
    notas.iter().sum::<i64>() as f64 / notas.len() as f64
}

/// One star of a five-star display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Estrela {
    Cheia,
    Meia,
    Vazia,
}

/// Five stars for an average: full up to the integer part, a half star
/// where the fractional part falls, empty for the rest.
pub fn render_stars(nota: f64) -> [Estrela; 5] {
    let inteiro = nota.floor();
    let teto = nota.ceil();
    let fracionado = nota.fract() > 0.0;

    let mut estrelas = [Estrela::Vazia; 5];
    for (i, estrela) in estrelas.iter_mut().enumerate() {
        let posicao = (i + 1) as f64;
        if posicao <= inteiro {
            *estrela = Estrela::Cheia;
        } else if posicao == teto && fracionado {
            *estrela = Estrela::Meia;
        }
    }
    estrelas
}

// =============================================================================
// Performance report
// =============================================================================

/// A supplier with all of its rating values.
#[derive(Debug, Clone)]
pub struct FornecedorAvaliado {
    pub fornecedor: Fornecedor,
    pub notas: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MelhorFornecedor {
    pub id: String,
    pub nome: String,
    pub categoria: CategoriaFornecedor,
    pub media_avaliacao: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FornecedorProblema {
    pub nome: String,
    pub problema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelatorioFornecedores {
    pub total_fornecedores: i64,
    pub fornecedores_ativos: i64,
    /// Mean over every rating of every supplier.
    pub media_avaliacao_geral: f64,
    pub melhor_fornecedor: Option<MelhorFornecedor>,
    pub fornecedores_problema: Vec<FornecedorProblema>,
    pub distribuicao_categorias: BTreeMap<CategoriaFornecedor, i64>,
}

/// Builds the supplier performance report.
///
/// - best: at least 3 ratings, highest average (first one wins ties)
/// - problems: at least 2 ratings and average below 3
pub fn relatorio_fornecedores(fornecedores: &[FornecedorAvaliado]) -> RelatorioFornecedores {
    let todas: Vec<i64> = fornecedores.iter().flat_map(|f| f.notas.iter().copied()).collect();

    let mut melhor: Option<(&FornecedorAvaliado, f64)> = None;
    for f in fornecedores.iter().filter(|f| f.notas.len() >= 3) {
        let media = media_avaliacoes(&f.notas);
        if melhor.map_or(true, |(_, m)| media > m) {
            melhor = Some((f, media));
        }
    }

    let fornecedores_problema = fornecedores
        .iter()
        .filter(|f| f.notas.len() >= 2 && media_avaliacoes(&f.notas) < 3.0)
        .map(|f| FornecedorProblema {
            nome: f.fornecedor.nome.clone(),
            problema: "Avaliação baixa".to_string(),
        })
        .collect();

    let mut distribuicao_categorias = BTreeMap::new();
    for f in fornecedores {
        *distribuicao_categorias.entry(f.fornecedor.categoria).or_insert(0) += 1;
    }

    RelatorioFornecedores {
        total_fornecedores: fornecedores.len() as i64,
        fornecedores_ativos: fornecedores.iter().filter(|f| f.fornecedor.ativo).count() as i64,
        media_avaliacao_geral: media_avaliacoes(&todas),
        melhor_fornecedor: melhor.map(|(f, media)| MelhorFornecedor {
            id: f.fornecedor.id.clone(),
            nome: f.fornecedor.nome.clone(),
            categoria: f.fornecedor.categoria,
            media_avaliacao: media,
        }),
        fornecedores_problema,
        distribuicao_categorias,
    }
}
