//! # Module Registry
//!
//! The app is a single window whose main area swaps between screens
//! ("modules"). Each module is an HTML partial plus the data its
//! initializer loads.
//!
//! ## Loading a Module
//! ```text
//! load_module("estoque")
//!       │
//!       ├─► descriptor lookup ── unknown ──► fallback page, data = null
//!       │
//!       ├─► partial: cache hit? ── no ──► tokio::fs::read_to_string(ui_dir/estoque.html)
//!       │                                       │
//!       │                                       └─► cache + mark loaded
//!       │
//!       ├─► initializer ──► commands::estoque::* ──► JSON data
//!       │
//!       └─► current = "estoque"
//! ```
//!
//! ## Thread Safety
//! The cache sits behind a `std::sync::Mutex` that is never held across an
//! `.await`; two concurrent first loads of the same partial both read the
//! file and the second insert wins with identical content.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use avelar_core::{DashboardData, STORE_NAME};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::commands::{
    clientes, consultorio, dashboard, estoque, financeiro, fornecedores, garantias, laboratorio,
    lentes_contato, orcamentos, produtos, receitas, relatorios, to_json, vendas,
};
use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// Static description of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub partial: &'static str,
}

pub const MODULES: [ModuleDescriptor; 14] = [
    ModuleDescriptor { name: "dashboard", title: "Dashboard", partial: "dashboard.html" },
    ModuleDescriptor { name: "clientes", title: "Clientes", partial: "clientes.html" },
    ModuleDescriptor { name: "vendas", title: "Vendas", partial: "vendas.html" },
    ModuleDescriptor { name: "estoque", title: "Estoque", partial: "estoque.html" },
    ModuleDescriptor { name: "financeiro", title: "Financeiro", partial: "financeiro.html" },
    ModuleDescriptor { name: "receitas", title: "Receitas", partial: "receitas.html" },
    ModuleDescriptor { name: "laboratorio", title: "Laboratório", partial: "laboratorio.html" },
    ModuleDescriptor { name: "relatorios", title: "Relatórios", partial: "relatorios.html" },
    ModuleDescriptor { name: "fornecedores", title: "Fornecedores", partial: "fornecedores.html" },
    ModuleDescriptor { name: "garantias", title: "Garantias", partial: "garantias.html" },
    ModuleDescriptor {
        name: "lentes_contato",
        title: "Lentes de Contato",
        partial: "lentes_contato.html",
    },
    ModuleDescriptor { name: "orcamentos", title: "Orçamentos", partial: "orcamentos.html" },
    ModuleDescriptor { name: "produtos", title: "Produtos", partial: "produtos.html" },
    ModuleDescriptor { name: "consultorio", title: "Consultório", partial: "consultorio.html" },
];

/// Registration screens warmed up after sign-in.
pub const CADASTROS: [&str; 4] = ["clientes", "produtos", "fornecedores", "receitas"];

pub fn descriptor(name: &str) -> Option<&'static ModuleDescriptor> {
    MODULES.iter().find(|m| m.name == name)
}

/// `"<title> - Óticas Avelar"`, or the bare store name for unknown modules.
pub fn page_title(name: &str) -> String {
    match descriptor(name) {
        Some(m) => format!("{} - {}", m.title, STORE_NAME),
        None => STORE_NAME.to_string(),
    }
}

fn fallback_html(name: &str) -> String {
    format!(
        "<div class=\"modulo-indisponivel\"><h2>Módulo {} em desenvolvimento</h2></div>",
        name
    )
}

/// What the frontend swaps into the main area.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedModule {
    pub name: String,
    pub title: String,
    pub page_title: String,
    pub html: String,
    pub data: Value,
}

#[derive(Debug, Default)]
struct Inner {
    partials: HashMap<&'static str, String>,
    loaded: HashSet<&'static str>,
    current: Option<String>,
}

/// Partial cache and current-screen tracking.
#[derive(Debug)]
pub struct ModuleRegistry {
    ui_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl ModuleRegistry {
    pub fn new(ui_dir: impl Into<PathBuf>) -> Self {
        ModuleRegistry {
            ui_dir: ui_dir.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn ui_dir(&self) -> &Path {
        &self.ui_dir
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock().loaded.contains(name)
    }

    pub fn current_module(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// Partial HTML, read from disk once.
    async fn partial(&self, module: &'static ModuleDescriptor) -> ApiResult<String> {
        if let Some(html) = self.lock().partials.get(module.name) {
            return Ok(html.clone());
        }

        let path = self.ui_dir.join(module.partial);
        let html = tokio::fs::read_to_string(&path).await.map_err(|e| {
            error!(module = module.name, path = %path.display(), error = %e, "Failed to read partial");
            ApiError::internal("Erro ao carregar módulo")
        })?;

        let mut inner = self.lock();
        inner.partials.insert(module.name, html.clone());
        inner.loaded.insert(module.name);
        debug!(module = module.name, bytes = html.len(), "Partial cached");
        Ok(html)
    }

    /// Loads a screen: partial, initializer data and current-module switch.
    pub async fn load_module(
        &self,
        name: &str,
        db: &DbState,
        today: NaiveDate,
    ) -> ApiResult<LoadedModule> {
        let Some(module) = descriptor(name) else {
            info!(module = %name, "Unknown module requested");
            self.lock().current = Some(name.to_string());
            return Ok(LoadedModule {
                name: name.to_string(),
                title: STORE_NAME.to_string(),
                page_title: page_title(name),
                html: fallback_html(name),
                data: Value::Null,
            });
        };

        let html = self.partial(module).await?;
        let data = initialize(module.name, db, today).await?;
        self.lock().current = Some(module.name.to_string());

        info!(module = module.name, "Module loaded");
        Ok(LoadedModule {
            name: module.name.to_string(),
            title: module.title.to_string(),
            page_title: page_title(module.name),
            html,
            data,
        })
    }

    /// Caches partials without running initializers. Unknown names are
    /// skipped; returns how many partials are now cached from `names`.
    pub async fn preload(&self, names: &[&str]) -> ApiResult<usize> {
        let mut count = 0;
        for name in names {
            if let Some(module) = descriptor(name) {
                self.partial(module).await?;
                count += 1;
            }
        }
        debug!(count, "Modules preloaded");
        Ok(count)
    }

    /// Fresh dashboard data while the dashboard is on screen.
    pub async fn refresh_dashboard(
        &self,
        db: &DbState,
        today: NaiveDate,
    ) -> ApiResult<Option<DashboardData>> {
        if self.current_module().as_deref() != Some("dashboard") {
            return Ok(None);
        }
        Ok(Some(dashboard::dashboard_data(db, today).await?))
    }
}

/// Data each screen shows when it opens.
async fn initialize(name: &str, db: &DbState, today: NaiveDate) -> ApiResult<Value> {
    let data = match name {
        "dashboard" => to_json(&dashboard::dashboard_data(db, today).await?)?,
        "clientes" => to_json(&clientes::list_clientes(db).await?)?,
        "vendas" => json!({
            "produtos": to_json(&vendas::produtos_disponiveis(db).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
        }),
        "estoque" => json!({
            "produtos": to_json(&estoque::list_estoque(db, None).await?)?,
            "movimentacoes": to_json(&estoque::list_movimentacoes(db).await?)?,
        }),
        "financeiro" => {
            financeiro::atualizar_vencidos(db, today).await?;
            json!({
                "lancamentos": to_json(&financeiro::list_lancamentos(db).await?)?,
                "resumo": to_json(&financeiro::resumo_financeiro(db, today).await?)?,
            })
        }
        "receitas" => json!({
            "receitas": to_json(&receitas::list_receitas(db).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
        }),
        "laboratorio" => json!({
            "ordens": to_json(&laboratorio::list_ordens(db, None).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
            "produtividade": to_json(&laboratorio::relatorio_produtividade(db, today).await?)?,
        }),
        "relatorios" => {
            let periodo = relatorios::periodo_padrao(today);
            json!({
                "periodo": to_json(&periodo)?,
                "vendas": to_json(&relatorios::relatorio_vendas(db, periodo.inicio, periodo.fim).await?)?,
                "produtosMaisVendidos": to_json(&relatorios::produtos_mais_vendidos(db, None).await?)?,
                "financeiro": to_json(&financeiro::metricas_financeiras(db, today).await?)?,
            })
        }
        "fornecedores" => json!({
            "fornecedores": to_json(&fornecedores::list_fornecedores(db, None, None).await?)?,
            "relatorio": to_json(&fornecedores::relatorio_fornecedores(db).await?)?,
            "estados": to_json(&fornecedores::estados_brasileiros())?,
        }),
        "garantias" => json!({
            "garantias": to_json(&garantias::list_garantias(db, None).await?)?,
            "estatisticas": to_json(&garantias::estatisticas_garantias(db, today).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
        }),
        "lentes_contato" => json!({
            "lentes": to_json(&lentes_contato::list_lentes(db).await?)?,
            "controles": to_json(&lentes_contato::list_controles(db).await?)?,
            "atrasados": to_json(&lentes_contato::controles_atrasados(db, today).await?)?,
            "relatorio": to_json(&lentes_contato::relatorio_lentes(db, today).await?)?,
        }),
        "orcamentos" => json!({
            "orcamentos": to_json(&orcamentos::list_orcamentos(db, None).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
        }),
        "produtos" => to_json(&produtos::list_produtos(db).await?)?,
        "consultorio" => json!({
            "agendamentos": to_json(&consultorio::list_agendamentos(db, today, None).await?)?,
            "profissionais": to_json(&consultorio::list_profissionais(db).await?)?,
            "clientes": to_json(&clientes::cliente_options(db).await?)?,
            "horarios": consultorio::horarios_disponiveis(),
        }),
        _ => Value::Null,
    };
    Ok(data)
}
