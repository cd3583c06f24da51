//! # Óticas Avelar Desktop Library
//!
//! Backend of the Óticas Avelar desktop application. Commands are plain
//! async functions over explicit state; the `desktop` feature wraps them
//! in a Tauri window.
//!
//! ## Module Organization
//! ```text
//! avelar_desktop_lib/
//! ├── lib.rs          ◄─── You are here (tracing, Tauri setup & run)
//! ├── state/
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── cart.rs     ◄─── PDV and quote carts
//! │   ├── session.rs  ◄─── Signed-in user
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── One file per screen
//! ├── modules.rs      ◄─── Screen registry and partial cache
//! ├── cep.rs          ◄─── ViaCEP client
//! ├── ipc.rs          ◄─── #[tauri::command] bindings (feature "desktop")
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! Multiple focused state types instead of a single `AppState`:
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌────────────────┐
//! │   DbState    │ │  CartState   │ │ SessionState │ │  ConfigState   │
//! │ • SQLite pool│ │ • venda      │ │ • Session    │ │ • DB path      │
//! │ • repos      │ │ • orcamento  │ │              │ │ • CEP service  │
//! └──────────────┘ └──────────────┘ └──────────────┘ └────────────────┘
//!        ┌────────────────┐ ┌──────────────┐
//!        │ ModuleRegistry │ │ ViaCepClient │
//!        └────────────────┘ └──────────────┘
//! ```
//! Each command only requests the state it needs.

pub mod cep;
pub mod commands;
pub mod error;
pub mod modules;
pub mod state;

#[cfg(feature = "desktop")]
mod ipc;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=avelar=trace` - Show trace for avelar crates only
/// - Default: `info,avelar=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,avelar=debug,sqlx=warn"));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Runs the Tauri application.
///
/// ## Startup Sequence
/// ```text
/// 1. Initialize logging ──► tracing-subscriber with env filter
/// 2. Load configuration ──► AVELAR_* variables over defaults
/// 3. Resolve DB path ─────► AVELAR_DB_PATH or the platform data dir
/// 4. Connect ─────────────► SQLite (WAL), pending migrations applied
/// 5. Manage state ────────► Db, carts, session, config, modules, CEP client
/// 6. Register commands & launch window
/// ```
#[cfg(feature = "desktop")]
pub fn run() {
    use tauri::Manager;
    use tracing::{error, info};

    use avelar_db::{Database, DbConfig};
    use cep::ViaCepClient;
    use modules::ModuleRegistry;
    use state::{CartState, ConfigState, DbState, SessionState};

    init_tracing();
    info!("Starting Óticas Avelar");

    let result = tauri::Builder::default()
        .setup(|app| {
            let config = ConfigState::from_env();

            let db_path = config.database_path();
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            info!(?db_path, "Database path determined");

            let db = tauri::async_runtime::block_on(Database::new(DbConfig::new(db_path)))?;
            info!("Database connected and migrations applied");

            let cep_client = ViaCepClient::new(config.cep_base_url.clone(), config.cep_timeout())?;
            let registry = ModuleRegistry::new(config.ui_dir.clone());

            app.manage(DbState::new(db));
            app.manage(CartState::new());
            app.manage(SessionState::new());
            app.manage(registry);
            app.manage(cep_client);
            app.manage(config);

            info!("State initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth
            ipc::create_user,
            ipc::sign_in,
            ipc::sign_out,
            ipc::current_session,
            // Modules & config
            ipc::load_module,
            ipc::preload_modules,
            ipc::refresh_dashboard,
            ipc::current_module,
            ipc::is_module_loaded,
            ipc::get_config,
            ipc::format_currency,
            ipc::buscar_cep,
            // Dashboard
            ipc::dashboard_stats,
            ipc::vendas_recentes,
            ipc::alertas_estoque,
            // Clientes
            ipc::list_clientes,
            ipc::search_clientes,
            ipc::get_cliente,
            ipc::create_cliente,
            ipc::update_cliente,
            ipc::cliente_options,
            // Produtos & estoque
            ipc::list_produtos,
            ipc::get_produto,
            ipc::create_produto,
            ipc::update_produto,
            ipc::campos_especificos,
            ipc::list_estoque,
            ipc::ajustar_estoque,
            ipc::list_movimentacoes,
            ipc::movimentacoes_produto,
            ipc::estoque_baixo,
            // Carts, PDV & quotes
            ipc::get_cart,
            ipc::add_to_cart,
            ipc::update_cart_item,
            ipc::remove_from_cart,
            ipc::clear_cart,
            ipc::produtos_disponiveis,
            ipc::buscar_produtos_venda,
            ipc::finalizar_venda,
            ipc::list_vendas,
            ipc::get_venda_itens,
            ipc::buscar_produtos_orcamento,
            ipc::salvar_orcamento,
            ipc::list_orcamentos,
            ipc::get_orcamento,
            ipc::get_orcamento_itens,
            ipc::atualizar_status_orcamento,
            // Financeiro
            ipc::list_lancamentos,
            ipc::get_lancamento,
            ipc::create_lancamento,
            ipc::update_lancamento,
            ipc::marcar_como_pago,
            ipc::atualizar_vencidos,
            ipc::resumo_financeiro,
            ipc::metricas_financeiras,
            // Receitas & laboratório
            ipc::list_receitas,
            ipc::list_receitas_cliente,
            ipc::get_receita,
            ipc::create_receita,
            ipc::update_receita,
            ipc::renovar_receita,
            ipc::campos_dispositivo,
            ipc::list_ordens,
            ipc::create_ordem,
            ipc::update_ordem,
            ipc::get_ordem_detalhes,
            ipc::avancar_etapa,
            ipc::relatorio_produtividade,
            // Fornecedores & garantias
            ipc::list_fornecedores,
            ipc::get_fornecedor,
            ipc::create_fornecedor,
            ipc::update_fornecedor,
            ipc::avaliar_fornecedor,
            ipc::list_avaliacoes,
            ipc::relatorio_fornecedores,
            ipc::estados_brasileiros,
            ipc::list_garantias,
            ipc::get_garantia,
            ipc::create_garantia,
            ipc::registrar_ocorrencia,
            ipc::list_ocorrencias,
            ipc::estender_garantia,
            ipc::estatisticas_garantias,
            ipc::tipos_garantia,
            // Lentes de contato
            ipc::list_lentes,
            ipc::get_lente,
            ipc::save_lente,
            ipc::registrar_lote,
            ipc::list_lotes,
            ipc::list_controles,
            ipc::get_controle,
            ipc::save_controle,
            ipc::realizar_controle,
            ipc::controles_atrasados,
            ipc::relatorio_lentes,
            // Consultório
            ipc::list_profissionais,
            ipc::create_profissional,
            ipc::horarios_disponiveis,
            ipc::list_agendamentos,
            ipc::get_agendamento,
            ipc::verificar_disponibilidade,
            ipc::salvar_agendamento,
            ipc::confirmar_agendamento,
            ipc::cancelar_agendamento,
            ipc::get_agendamento_detalhes,
            // Relatórios
            ipc::periodo_padrao,
            ipc::relatorio_vendas,
            ipc::produtos_mais_vendidos,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        error!(error = %e, "Application exited with an error");
        std::process::exit(1);
    }
}
