//! # Tauri IPC Bindings
//!
//! `#[tauri::command]` wrappers around [`crate::commands`]. Each wrapper
//! pulls the managed state it needs and supplies the local date for
//! calendar-dependent operations.
//!
//! ## Frontend Usage
//! ```typescript
//! const cart = await invoke('add_to_cart', { produtoId: 'abc', quantidade: 2 });
//! const modulo = await invoke('load_module', { name: 'estoque' });
//! ```

use avelar_core::{
    AgendamentoInput, AjusteEstoqueInput, AvaliacaoInput, CategoriaProduto, ClienteInput,
    ControleLenteInput, Dispositivo, FornecedorInput, GarantiaInput, LancamentoInput,
    LenteContatoInput, LoteInput, NovoUsuarioInput, OcorrenciaInput, OrdemServicoInput,
    ProdutoInput, ProfissionalInput, ReceitaInput, TipoProdutoGarantia,
};
use chrono::{Local, NaiveDate, Utc};
use tauri::State;

use crate::cep::ViaCepClient;
use crate::commands::*;
use crate::error::ApiResult;
use crate::modules::ModuleRegistry;
use crate::state::{CartKind, CartState, ConfigState, DbState, SessionState};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Auth
// =============================================================================

#[tauri::command]
pub async fn create_user(
    db: State<'_, DbState>,
    input: NovoUsuarioInput,
) -> ApiResult<avelar_core::Usuario> {
    auth::create_user(&db, input).await
}

#[tauri::command]
pub async fn sign_in(
    db: State<'_, DbState>,
    session: State<'_, SessionState>,
    email: String,
    senha: String,
) -> ApiResult<avelar_core::Session> {
    auth::sign_in(&db, &session, &email, &senha).await
}

#[tauri::command]
pub fn sign_out(session: State<'_, SessionState>) {
    auth::sign_out(&session)
}

#[tauri::command]
pub fn current_session(session: State<'_, SessionState>) -> Option<avelar_core::Session> {
    auth::current_session(&session)
}

// =============================================================================
// Modules & config
// =============================================================================

#[tauri::command]
pub async fn load_module(
    registry: State<'_, ModuleRegistry>,
    db: State<'_, DbState>,
    name: String,
) -> ApiResult<crate::modules::LoadedModule> {
    modules::load_module(&registry, &db, &name, today()).await
}

#[tauri::command]
pub async fn preload_modules(
    registry: State<'_, ModuleRegistry>,
    names: Option<Vec<String>>,
) -> ApiResult<usize> {
    modules::preload_modules(&registry, names).await
}

#[tauri::command]
pub async fn refresh_dashboard(
    registry: State<'_, ModuleRegistry>,
    db: State<'_, DbState>,
) -> ApiResult<Option<avelar_core::DashboardData>> {
    modules::refresh_dashboard(&registry, &db, today()).await
}

#[tauri::command]
pub fn current_module(registry: State<'_, ModuleRegistry>) -> Option<String> {
    modules::current_module(&registry)
}

#[tauri::command]
pub fn is_module_loaded(registry: State<'_, ModuleRegistry>, name: String) -> bool {
    modules::is_module_loaded(&registry, &name)
}

#[tauri::command]
pub fn get_config(config: State<'_, ConfigState>) -> config::ConfigView {
    config::get_config(&config)
}

#[tauri::command]
pub fn format_currency(config: State<'_, ConfigState>, cents: i64) -> String {
    config::format_currency(&config, cents)
}

#[tauri::command]
pub async fn buscar_cep(
    client: State<'_, ViaCepClient>,
    cep: String,
) -> ApiResult<Option<crate::cep::Endereco>> {
    cep::buscar_cep(&client, &cep).await
}

// =============================================================================
// Dashboard
// =============================================================================

#[tauri::command]
pub async fn dashboard_stats(db: State<'_, DbState>) -> ApiResult<avelar_core::DashboardStats> {
    dashboard::dashboard_stats(&db, today()).await
}

#[tauri::command]
pub async fn vendas_recentes(
    db: State<'_, DbState>,
    config: State<'_, ConfigState>,
) -> ApiResult<Vec<avelar_core::VendaResumo>> {
    dashboard::vendas_recentes(&db, &config).await
}

#[tauri::command]
pub async fn alertas_estoque(
    db: State<'_, DbState>,
    config: State<'_, ConfigState>,
) -> ApiResult<Vec<avelar_core::AlertaEstoque>> {
    dashboard::alertas_estoque(&db, &config).await
}

// =============================================================================
// Clientes
// =============================================================================

#[tauri::command]
pub async fn list_clientes(db: State<'_, DbState>) -> ApiResult<Vec<avelar_core::Cliente>> {
    clientes::list_clientes(&db).await
}

#[tauri::command]
pub async fn search_clientes(
    db: State<'_, DbState>,
    query: String,
) -> ApiResult<Vec<avelar_core::Cliente>> {
    clientes::search_clientes(&db, &query).await
}

#[tauri::command]
pub async fn get_cliente(db: State<'_, DbState>, id: String) -> ApiResult<avelar_core::Cliente> {
    clientes::get_cliente(&db, &id).await
}

#[tauri::command]
pub async fn create_cliente(
    db: State<'_, DbState>,
    input: ClienteInput,
) -> ApiResult<avelar_core::Cliente> {
    clientes::create_cliente(&db, input).await
}

#[tauri::command]
pub async fn update_cliente(
    db: State<'_, DbState>,
    id: String,
    input: ClienteInput,
) -> ApiResult<avelar_core::Cliente> {
    clientes::update_cliente(&db, &id, input).await
}

#[tauri::command]
pub async fn cliente_options(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::ClienteOption>> {
    clientes::cliente_options(&db).await
}

// =============================================================================
// Produtos & estoque
// =============================================================================

#[tauri::command]
pub async fn list_produtos(db: State<'_, DbState>) -> ApiResult<Vec<avelar_core::Produto>> {
    produtos::list_produtos(&db).await
}

#[tauri::command]
pub async fn get_produto(db: State<'_, DbState>, id: String) -> ApiResult<avelar_core::Produto> {
    produtos::get_produto(&db, &id).await
}

#[tauri::command]
pub async fn create_produto(
    db: State<'_, DbState>,
    input: ProdutoInput,
) -> ApiResult<avelar_core::Produto> {
    produtos::create_produto(&db, input).await
}

#[tauri::command]
pub async fn update_produto(
    db: State<'_, DbState>,
    id: String,
    input: ProdutoInput,
) -> ApiResult<avelar_core::Produto> {
    produtos::update_produto(&db, &id, input).await
}

#[tauri::command]
pub fn campos_especificos(categoria: CategoriaProduto) -> Vec<produtos::CampoEspecifico> {
    produtos::campos_especificos(categoria)
}

#[tauri::command]
pub async fn list_estoque(
    db: State<'_, DbState>,
    categoria: Option<String>,
) -> ApiResult<Vec<avelar_core::Produto>> {
    estoque::list_estoque(&db, categoria.as_deref()).await
}

#[tauri::command]
pub async fn ajustar_estoque(
    db: State<'_, DbState>,
    input: AjusteEstoqueInput,
) -> ApiResult<avelar_core::Movimentacao> {
    estoque::ajustar_estoque(&db, input).await
}

#[tauri::command]
pub async fn list_movimentacoes(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::MovimentacaoDetalhe>> {
    estoque::list_movimentacoes(&db).await
}

#[tauri::command]
pub async fn movimentacoes_produto(
    db: State<'_, DbState>,
    produto_id: String,
) -> ApiResult<Vec<avelar_core::Movimentacao>> {
    estoque::movimentacoes_produto(&db, &produto_id).await
}

#[tauri::command]
pub async fn estoque_baixo(
    db: State<'_, DbState>,
    config: State<'_, ConfigState>,
    limit: Option<i64>,
) -> ApiResult<Vec<avelar_core::Produto>> {
    estoque::estoque_baixo(&db, &config, limit).await
}

// =============================================================================
// Carts, PDV & quotes
// =============================================================================

#[tauri::command]
pub fn get_cart(carts: State<'_, CartState>, kind: Option<CartKind>) -> crate::state::CartView {
    cart::get_cart(&carts, kind.unwrap_or(CartKind::Venda))
}

#[tauri::command]
pub async fn add_to_cart(
    db: State<'_, DbState>,
    carts: State<'_, CartState>,
    kind: Option<CartKind>,
    produto_id: String,
    quantidade: Option<i64>,
) -> ApiResult<crate::state::CartView> {
    cart::add_to_cart(
        &db,
        &carts,
        kind.unwrap_or(CartKind::Venda),
        &produto_id,
        quantidade,
    )
    .await
}

#[tauri::command]
pub fn update_cart_item(
    carts: State<'_, CartState>,
    kind: Option<CartKind>,
    produto_id: String,
    quantidade: i64,
) -> ApiResult<crate::state::CartView> {
    cart::update_cart_item(&carts, kind.unwrap_or(CartKind::Venda), &produto_id, quantidade)
}

#[tauri::command]
pub fn remove_from_cart(
    carts: State<'_, CartState>,
    kind: Option<CartKind>,
    produto_id: String,
) -> ApiResult<crate::state::CartView> {
    cart::remove_from_cart(&carts, kind.unwrap_or(CartKind::Venda), &produto_id)
}

#[tauri::command]
pub fn clear_cart(carts: State<'_, CartState>, kind: Option<CartKind>) -> crate::state::CartView {
    cart::clear_cart(&carts, kind.unwrap_or(CartKind::Venda))
}

#[tauri::command]
pub async fn produtos_disponiveis(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::Produto>> {
    vendas::produtos_disponiveis(&db).await
}

#[tauri::command]
pub async fn buscar_produtos_venda(
    db: State<'_, DbState>,
    query: String,
) -> ApiResult<Vec<avelar_core::Produto>> {
    vendas::buscar_produtos_venda(&db, &query).await
}

#[tauri::command]
pub async fn finalizar_venda(
    db: State<'_, DbState>,
    carts: State<'_, CartState>,
    request: vendas::FinalizarVendaRequest,
) -> ApiResult<avelar_core::Venda> {
    vendas::finalizar_venda(&db, &carts, request).await
}

#[tauri::command]
pub async fn list_vendas(
    db: State<'_, DbState>,
    limit: Option<i64>,
) -> ApiResult<Vec<avelar_core::VendaResumo>> {
    vendas::list_vendas(&db, limit).await
}

#[tauri::command]
pub async fn get_venda_itens(
    db: State<'_, DbState>,
    venda_id: String,
) -> ApiResult<Vec<avelar_core::VendaItemDetalhe>> {
    vendas::get_venda_itens(&db, &venda_id).await
}

#[tauri::command]
pub async fn buscar_produtos_orcamento(
    db: State<'_, DbState>,
    query: String,
) -> ApiResult<Vec<avelar_core::Produto>> {
    orcamentos::buscar_produtos_orcamento(&db, &query).await
}

#[tauri::command]
pub async fn salvar_orcamento(
    db: State<'_, DbState>,
    carts: State<'_, CartState>,
    cliente_id: Option<String>,
) -> ApiResult<avelar_core::Orcamento> {
    orcamentos::salvar_orcamento(&db, &carts, cliente_id, today()).await
}

#[tauri::command]
pub async fn list_orcamentos(
    db: State<'_, DbState>,
    limit: Option<i64>,
) -> ApiResult<Vec<avelar_core::OrcamentoResumo>> {
    orcamentos::list_orcamentos(&db, limit).await
}

#[tauri::command]
pub async fn get_orcamento(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Orcamento> {
    orcamentos::get_orcamento(&db, &id).await
}

#[tauri::command]
pub async fn get_orcamento_itens(
    db: State<'_, DbState>,
    orcamento_id: String,
) -> ApiResult<Vec<avelar_core::OrcamentoItemDetalhe>> {
    orcamentos::get_orcamento_itens(&db, &orcamento_id).await
}

#[tauri::command]
pub async fn atualizar_status_orcamento(
    db: State<'_, DbState>,
    id: String,
    status: String,
) -> ApiResult<avelar_core::Orcamento> {
    orcamentos::atualizar_status_orcamento(&db, &id, &status).await
}

// =============================================================================
// Financeiro
// =============================================================================

#[tauri::command]
pub async fn list_lancamentos(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::Lancamento>> {
    financeiro::list_lancamentos(&db).await
}

#[tauri::command]
pub async fn get_lancamento(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Lancamento> {
    financeiro::get_lancamento(&db, &id).await
}

#[tauri::command]
pub async fn create_lancamento(
    db: State<'_, DbState>,
    input: LancamentoInput,
) -> ApiResult<avelar_core::Lancamento> {
    financeiro::create_lancamento(&db, input).await
}

#[tauri::command]
pub async fn update_lancamento(
    db: State<'_, DbState>,
    id: String,
    input: LancamentoInput,
) -> ApiResult<avelar_core::Lancamento> {
    financeiro::update_lancamento(&db, &id, input).await
}

#[tauri::command]
pub async fn marcar_como_pago(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Lancamento> {
    financeiro::marcar_como_pago(&db, &id, today()).await
}

#[tauri::command]
pub async fn atualizar_vencidos(db: State<'_, DbState>) -> ApiResult<u64> {
    financeiro::atualizar_vencidos(&db, today()).await
}

#[tauri::command]
pub async fn resumo_financeiro(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::ResumoFinanceiro> {
    financeiro::resumo_financeiro(&db, today()).await
}

#[tauri::command]
pub async fn metricas_financeiras(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::MetricasFinanceiras> {
    financeiro::metricas_financeiras(&db, today()).await
}

// =============================================================================
// Receitas & laboratório
// =============================================================================

#[tauri::command]
pub async fn list_receitas(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::ReceitaResumo>> {
    receitas::list_receitas(&db).await
}

#[tauri::command]
pub async fn list_receitas_cliente(
    db: State<'_, DbState>,
    cliente_id: String,
) -> ApiResult<Vec<avelar_core::ReceitaResumo>> {
    receitas::list_receitas_cliente(&db, &cliente_id).await
}

#[tauri::command]
pub async fn get_receita(db: State<'_, DbState>, id: String) -> ApiResult<avelar_core::Receita> {
    receitas::get_receita(&db, &id).await
}

#[tauri::command]
pub async fn create_receita(
    db: State<'_, DbState>,
    input: ReceitaInput,
) -> ApiResult<avelar_core::Receita> {
    receitas::create_receita(&db, input, today()).await
}

#[tauri::command]
pub async fn update_receita(
    db: State<'_, DbState>,
    id: String,
    input: ReceitaInput,
) -> ApiResult<avelar_core::Receita> {
    receitas::update_receita(&db, &id, input, today()).await
}

#[tauri::command]
pub async fn renovar_receita(db: State<'_, DbState>, id: String) -> ApiResult<ReceitaInput> {
    receitas::renovar_receita(&db, &id, today()).await
}

#[tauri::command]
pub fn campos_dispositivo(dispositivo: Dispositivo) -> Vec<&'static str> {
    receitas::campos_dispositivo(dispositivo)
}

#[tauri::command]
pub async fn list_ordens(
    db: State<'_, DbState>,
    status: Option<String>,
) -> ApiResult<Vec<avelar_core::OrdemServicoResumo>> {
    laboratorio::list_ordens(&db, status.as_deref()).await
}

#[tauri::command]
pub async fn create_ordem(
    db: State<'_, DbState>,
    input: OrdemServicoInput,
) -> ApiResult<avelar_core::OrdemServico> {
    laboratorio::create_ordem(&db, input).await
}

#[tauri::command]
pub async fn update_ordem(
    db: State<'_, DbState>,
    id: String,
    input: OrdemServicoInput,
) -> ApiResult<avelar_core::OrdemServico> {
    laboratorio::update_ordem(&db, &id, input).await
}

#[tauri::command]
pub async fn get_ordem_detalhes(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::OrdemServicoDetalhe> {
    laboratorio::get_ordem_detalhes(&db, &id).await
}

#[tauri::command]
pub async fn avancar_etapa(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::OrdemServico> {
    laboratorio::avancar_etapa(&db, &id).await
}

#[tauri::command]
pub async fn relatorio_produtividade(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::RelatorioProdutividade> {
    laboratorio::relatorio_produtividade(&db, today()).await
}

// =============================================================================
// Fornecedores & garantias
// =============================================================================

#[tauri::command]
pub async fn list_fornecedores(
    db: State<'_, DbState>,
    categoria: Option<String>,
    status: Option<String>,
) -> ApiResult<Vec<fornecedores::FornecedorCard>> {
    fornecedores::list_fornecedores(&db, categoria.as_deref(), status.as_deref()).await
}

#[tauri::command]
pub async fn get_fornecedor(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Fornecedor> {
    fornecedores::get_fornecedor(&db, &id).await
}

#[tauri::command]
pub async fn create_fornecedor(
    db: State<'_, DbState>,
    input: FornecedorInput,
) -> ApiResult<avelar_core::Fornecedor> {
    fornecedores::create_fornecedor(&db, input).await
}

#[tauri::command]
pub async fn update_fornecedor(
    db: State<'_, DbState>,
    id: String,
    input: FornecedorInput,
) -> ApiResult<avelar_core::Fornecedor> {
    fornecedores::update_fornecedor(&db, &id, input).await
}

#[tauri::command]
pub async fn avaliar_fornecedor(
    db: State<'_, DbState>,
    id: String,
    input: AvaliacaoInput,
) -> ApiResult<avelar_core::Avaliacao> {
    fornecedores::avaliar_fornecedor(&db, &id, input).await
}

#[tauri::command]
pub async fn list_avaliacoes(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<Vec<avelar_core::Avaliacao>> {
    fornecedores::list_avaliacoes(&db, &id).await
}

#[tauri::command]
pub async fn relatorio_fornecedores(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::RelatorioFornecedores> {
    fornecedores::relatorio_fornecedores(&db).await
}

#[tauri::command]
pub fn estados_brasileiros() -> Vec<fornecedores::Estado> {
    fornecedores::estados_brasileiros()
}

#[tauri::command]
pub async fn list_garantias(
    db: State<'_, DbState>,
    status: Option<String>,
) -> ApiResult<Vec<avelar_core::GarantiaResumo>> {
    garantias::list_garantias(&db, status.as_deref()).await
}

#[tauri::command]
pub async fn get_garantia(db: State<'_, DbState>, id: String) -> ApiResult<avelar_core::Garantia> {
    garantias::get_garantia(&db, &id).await
}

#[tauri::command]
pub async fn create_garantia(
    db: State<'_, DbState>,
    input: GarantiaInput,
) -> ApiResult<avelar_core::Garantia> {
    garantias::create_garantia(&db, input).await
}

#[tauri::command]
pub async fn registrar_ocorrencia(
    db: State<'_, DbState>,
    input: OcorrenciaInput,
) -> ApiResult<avelar_core::Ocorrencia> {
    garantias::registrar_ocorrencia(&db, input).await
}

#[tauri::command]
pub async fn list_ocorrencias(
    db: State<'_, DbState>,
    garantia_id: String,
) -> ApiResult<Vec<avelar_core::Ocorrencia>> {
    garantias::list_ocorrencias(&db, &garantia_id).await
}

#[tauri::command]
pub async fn estender_garantia(
    db: State<'_, DbState>,
    id: String,
    meses: i64,
) -> ApiResult<avelar_core::Garantia> {
    garantias::estender_garantia(&db, &id, meses).await
}

#[tauri::command]
pub async fn estatisticas_garantias(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::EstatisticasGarantias> {
    garantias::estatisticas_garantias(&db, today()).await
}

#[tauri::command]
pub fn tipos_garantia(tipo_produto: TipoProdutoGarantia) -> Vec<garantias::OpcaoGarantia> {
    garantias::tipos_garantia(tipo_produto)
}

// =============================================================================
// Lentes de contato
// =============================================================================

#[tauri::command]
pub async fn list_lentes(db: State<'_, DbState>) -> ApiResult<Vec<avelar_core::LenteContato>> {
    lentes_contato::list_lentes(&db).await
}

#[tauri::command]
pub async fn get_lente(
    db: State<'_, DbState>,
    produto_id: String,
) -> ApiResult<avelar_core::LenteContato> {
    lentes_contato::get_lente(&db, &produto_id).await
}

#[tauri::command]
pub async fn save_lente(
    db: State<'_, DbState>,
    id: Option<String>,
    input: LenteContatoInput,
) -> ApiResult<avelar_core::LenteContato> {
    lentes_contato::save_lente(&db, id.as_deref(), input).await
}

#[tauri::command]
pub async fn registrar_lote(
    db: State<'_, DbState>,
    input: LoteInput,
) -> ApiResult<avelar_core::LoteValidade> {
    lentes_contato::registrar_lote(&db, input).await
}

#[tauri::command]
pub async fn list_lotes(
    db: State<'_, DbState>,
    produto_id: String,
) -> ApiResult<Vec<lentes_contato::LoteComAlerta>> {
    lentes_contato::list_lotes(&db, &produto_id, today()).await
}

#[tauri::command]
pub async fn list_controles(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::ControleLenteResumo>> {
    lentes_contato::list_controles(&db).await
}

#[tauri::command]
pub async fn get_controle(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::ControleLente> {
    lentes_contato::get_controle(&db, &id).await
}

#[tauri::command]
pub async fn save_controle(
    db: State<'_, DbState>,
    id: Option<String>,
    input: ControleLenteInput,
) -> ApiResult<avelar_core::ControleLente> {
    lentes_contato::save_controle(&db, id.as_deref(), input).await
}

#[tauri::command]
pub async fn realizar_controle(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::ControleLente> {
    lentes_contato::realizar_controle(&db, &id, Utc::now()).await
}

#[tauri::command]
pub async fn controles_atrasados(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::ControleLenteResumo>> {
    lentes_contato::controles_atrasados(&db, today()).await
}

#[tauri::command]
pub async fn relatorio_lentes(
    db: State<'_, DbState>,
) -> ApiResult<avelar_core::RelatorioLentes> {
    lentes_contato::relatorio_lentes(&db, today()).await
}

// =============================================================================
// Consultório
// =============================================================================

#[tauri::command]
pub async fn list_profissionais(
    db: State<'_, DbState>,
) -> ApiResult<Vec<avelar_core::Profissional>> {
    consultorio::list_profissionais(&db).await
}

#[tauri::command]
pub async fn create_profissional(
    db: State<'_, DbState>,
    input: ProfissionalInput,
) -> ApiResult<avelar_core::Profissional> {
    consultorio::create_profissional(&db, input).await
}

#[tauri::command]
pub fn horarios_disponiveis() -> Vec<String> {
    consultorio::horarios_disponiveis()
}

#[tauri::command]
pub async fn list_agendamentos(
    db: State<'_, DbState>,
    data: Option<NaiveDate>,
) -> ApiResult<Vec<avelar_core::AgendamentoResumo>> {
    consultorio::list_agendamentos(&db, today(), data).await
}

#[tauri::command]
pub async fn get_agendamento(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Agendamento> {
    consultorio::get_agendamento(&db, &id).await
}

#[tauri::command]
pub async fn verificar_disponibilidade(
    db: State<'_, DbState>,
    data: NaiveDate,
    hora: String,
    profissional_id: String,
    ignorar_id: Option<String>,
) -> ApiResult<bool> {
    consultorio::verificar_disponibilidade(&db, data, &hora, &profissional_id, ignorar_id.as_deref())
        .await
}

#[tauri::command]
pub async fn salvar_agendamento(
    db: State<'_, DbState>,
    id: Option<String>,
    input: AgendamentoInput,
) -> ApiResult<avelar_core::Agendamento> {
    consultorio::salvar_agendamento(&db, id.as_deref(), input).await
}

#[tauri::command]
pub async fn confirmar_agendamento(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Agendamento> {
    consultorio::confirmar_agendamento(&db, &id).await
}

#[tauri::command]
pub async fn cancelar_agendamento(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::Agendamento> {
    consultorio::cancelar_agendamento(&db, &id, today()).await
}

#[tauri::command]
pub async fn get_agendamento_detalhes(
    db: State<'_, DbState>,
    id: String,
) -> ApiResult<avelar_core::AgendamentoDetalhe> {
    consultorio::get_agendamento_detalhes(&db, &id, today()).await
}

// =============================================================================
// Relatórios
// =============================================================================

#[tauri::command]
pub fn periodo_padrao() -> avelar_core::Periodo {
    relatorios::periodo_padrao(today())
}

#[tauri::command]
pub async fn relatorio_vendas(
    db: State<'_, DbState>,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> ApiResult<avelar_core::RelatorioVendas> {
    relatorios::relatorio_vendas(&db, inicio, fim).await
}

#[tauri::command]
pub async fn produtos_mais_vendidos(
    db: State<'_, DbState>,
    limit: Option<i64>,
) -> ApiResult<Vec<avelar_core::ProdutoMaisVendido>> {
    relatorios::produtos_mais_vendidos(&db, limit).await
}
