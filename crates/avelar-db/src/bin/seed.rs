//! # Seed Data Generator
//!
//! Fills a database with demo data for development: optical products of
//! every category, a few customers, suppliers and professionals.
//!
//! ## Usage
//! ```bash
//! # 60 products (default)
//! cargo run -p avelar-db --bin seed
//!
//! # Custom amount
//! cargo run -p avelar-db --bin seed -- --count 200
//!
//! # Database path
//! cargo run -p avelar-db --bin seed -- --db ./data/avelar.db
//! ```
//!
//! ## Generated Products
//! Each catalog entry is repeated in several colors until `--count` is
//! reached:
//! - Armações (ponte, aro, haste)
//! - Lentes oftálmicas (índice, tratamento)
//! - Lentes de contato (with their technical sheet)
//! - Acessórios and soluções
//!
//! SKUs follow `{CATEGORIA}-{INDEX}`; prices are in centavos.

use std::collections::BTreeMap;
use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use avelar_core::{
    CategoriaFornecedor, CategoriaProduto, ClienteInput, EspecificacaoLenteInput,
    FornecedorInput, LenteContatoInput, ProdutoInput, ProfissionalInput, TipoLenteContato,
    TipoSubstituicao,
};
use avelar_db::{Database, DbConfig};

/// (name, brand, price in centavos, attributes)
type Entrada = (&'static str, &'static str, i64, &'static [(&'static str, &'static str)]);

const ARMACOES: &[Entrada] = &[
    ("Aviador Clássico", "Ray-Ban", 59_900, &[("ponte", "14"), ("aro", "58"), ("haste", "140")]),
    ("Wayfarer", "Ray-Ban", 54_900, &[("ponte", "18"), ("aro", "50"), ("haste", "145")]),
    ("Holbrook", "Oakley", 62_000, &[("ponte", "18"), ("aro", "55"), ("haste", "137")]),
    ("Gatinho Acetato", "Vogue", 38_900, &[("ponte", "17"), ("aro", "53"), ("genero", "feminino")]),
    ("Redondo Metal", "Chilli Beans", 24_900, &[("ponte", "20"), ("aro", "49")]),
    ("Infantil Flex", "Grazi", 19_900, &[("aro", "44"), ("faixa_etaria", "infantil")]),
];

const LENTES: &[Entrada] = &[
    ("Varilux Comfort", "Essilor", 89_000, &[("tipo_lente", "multifocal"), ("indice_refracao", "1.67")]),
    ("Crizal Sapphire", "Essilor", 45_000, &[("tratamento", "antirreflexo"), ("indice_refracao", "1.59")]),
    ("Transitions Gen 8", "Transitions", 62_000, &[("fotossensivel", "sim"), ("protecao_uv", "400")]),
    ("Hoyalux iD", "Hoya", 78_000, &[("tipo_lente", "multifocal"), ("design", "free-form")]),
    ("BlueControl", "Hoya", 32_000, &[("filtro_azul", "sim"), ("indice_refracao", "1.60")]),
];

const ACESSORIOS: &[Entrada] = &[
    ("Estojo Rígido", "Avelar", 3_500, &[("tipo_acessorio", "estojo")]),
    ("Flanela Microfibra", "Avelar", 1_000, &[("tipo_acessorio", "flanela")]),
    ("Cordão de Silicone", "Avelar", 1_500, &[("tipo_acessorio", "cordão")]),
    ("Kit Chaves de Precisão", "Avelar", 2_500, &[("funcao", "ajuste")]),
];

const SOLUCOES: &[Entrada] = &[
    ("Renu Multiuso 355ml", "Bausch + Lomb", 4_990, &[("tipo_solucao", "multiuso"), ("volume", "355ml")]),
    ("Opti-Free Puremoist 300ml", "Alcon", 5_490, &[("tipo_solucao", "multiuso"), ("volume", "300ml")]),
    ("Spray Limpa Lentes 30ml", "Avelar", 1_990, &[("tipo_solucao", "limpeza"), ("volume", "30ml")]),
];

/// (name, brand, price, replacement schedule, shelf life in months)
const LENTES_CONTATO: &[(&str, &str, i64, TipoSubstituicao, i64)] = &[
    ("Acuvue Oasys", "Johnson & Johnson", 18_900, TipoSubstituicao::Quinzenal, 36),
    ("1-Day Acuvue Moist", "Johnson & Johnson", 21_900, TipoSubstituicao::DescarteDiario, 36),
    ("Biofinity", "CooperVision", 22_900, TipoSubstituicao::Mensal, 24),
    ("Air Optix Colors", "Alcon", 16_900, TipoSubstituicao::Mensal, 24),
];

const CORES: &[&str] = &["Preto", "Tartaruga", "Dourado", "Prata", "Azul", "Transparente"];

const CLIENTES: &[(&str, &str)] = &[
    ("Maria Aparecida Souza", "maria.souza@email.com"),
    ("João Pedro Almeida", "joao.almeida@email.com"),
    ("Ana Clara Ribeiro", "ana.ribeiro@email.com"),
    ("Carlos Eduardo Lima", "carlos.lima@email.com"),
    ("Fernanda Oliveira", "fernanda.oliveira@email.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./avelar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Óticas Avelar - gerador de dados de demonstração");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./avelar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, produtos = count, "Seeding database");

    // inserts run one after another
    let db = Database::new(DbConfig::new(&db_path).max_connections(1)).await?;

    let existentes = db.produtos().count_ativos().await?;
    if existentes > 0 {
        warn!(
            existentes,
            "Database already has products; delete the file to regenerate"
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let gerados = seed_produtos(&db, count).await?;
    let clientes = seed_clientes(&db).await?;
    let fornecedores = seed_fornecedores(&db).await?;
    let profissionais = seed_profissionais(&db).await?;

    info!(
        produtos = gerados,
        clientes,
        fornecedores,
        profissionais,
        elapsed = ?start.elapsed(),
        "Seed complete"
    );
    Ok(())
}

/// Round-robins the catalogs (one color variant per pass) until `count`
/// products exist.
async fn seed_produtos(db: &Database, count: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let catalogos: [(CategoriaProduto, &str, &[Entrada]); 4] = [
        (CategoriaProduto::Armacao, "ARM", ARMACOES),
        (CategoriaProduto::Lente, "LEN", LENTES),
        (CategoriaProduto::Acessorio, "ACE", ACESSORIOS),
        (CategoriaProduto::Solucao, "SOL", SOLUCOES),
    ];

    let mut gerados = 0;
    for (variante, cor) in CORES.iter().enumerate() {
        for (categoria, prefixo, entradas) in catalogos {
            for (idx, (nome, marca, preco, atributos)) in entradas.iter().enumerate() {
                if gerados >= count {
                    return Ok(gerados);
                }

                let seed = variante * 100 + idx;
                let mut input = ProdutoInput::new(format!("{nome} {cor}"), categoria, *preco);
                input.sku = Some(format!("{prefixo}-{seed:04}"));
                input.marca = Some(marca.to_string());
                input.cor = Some(cor.to_string());
                input.preco_custo = preco * (50 + (seed % 20) as i64) / 100;
                input.estoque_atual = (seed % 25) as i64;
                input.estoque_minimo = 3;
                input.especificacoes = atributos
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>();

                if let Err(e) = db.produtos().create(input).await {
                    warn!(nome, error = %e, "Failed to insert product");
                    continue;
                }
                gerados += 1;
            }
        }

        // contact lenses get their technical sheet, no color variants
        if variante == 0 {
            for (idx, (nome, marca, preco, substituicao, validade)) in LENTES_CONTATO.iter().enumerate() {
                if gerados >= count {
                    return Ok(gerados);
                }

                let mut produto = ProdutoInput::new(*nome, CategoriaProduto::LenteContato, *preco);
                produto.sku = Some(format!("LC-{idx:04}"));
                produto.marca = Some(marca.to_string());
                produto.preco_custo = preco * 55 / 100;
                produto.estoque_atual = 12 + idx as i64 * 4;
                produto.estoque_minimo = 6;

                let lente = LenteContatoInput {
                    produto,
                    especificacao: EspecificacaoLenteInput {
                        tipo_lente: TipoLenteContato::Gelatinosa,
                        curva_base: Some(8.6),
                        diametro: Some(14.2),
                        material: Some("Silicone hidrogel".to_string()),
                        conteudo_agua: Some(38 + idx as i64 * 5),
                        tipo_substituicao: *substituicao,
                        transmissibilidade: Some(147.0),
                        grau_minimo: Some(-12.0),
                        grau_maximo: Some(8.0),
                        cilindro_minimo: None,
                        cilindro_maximo: None,
                        validade_meses: Some(*validade),
                    },
                };

                if let Err(e) = db.lentes_contato().save(None, lente).await {
                    warn!(nome, error = %e, "Failed to insert contact lens");
                    continue;
                }
                gerados += 1;
            }
        }
    }

    Ok(gerados)
}

async fn seed_clientes(db: &Database) -> Result<usize, Box<dyn std::error::Error>> {
    for (idx, (nome, email)) in CLIENTES.iter().enumerate() {
        db.clientes()
            .create(ClienteInput {
                nome: nome.to_string(),
                email: Some(email.to_string()),
                telefone: Some(format!("(11) 9{:04}-{:04}", 8000 + idx, 1000 + idx * 37)),
                data_nascimento: chrono::NaiveDate::from_ymd_opt(1960 + idx as i32 * 9, 3, 12),
                ..Default::default()
            })
            .await?;
    }
    Ok(CLIENTES.len())
}

async fn seed_fornecedores(db: &Database) -> Result<usize, Box<dyn std::error::Error>> {
    let fornecedores = [
        ("Essilor do Brasil", CategoriaFornecedor::LaboratorioLentes, "Rio de Janeiro", "RJ"),
        ("Atelier Armações", CategoriaFornecedor::FabricanteArmacoes, "São Paulo", "SP"),
        ("LentesJá Distribuidora", CategoriaFornecedor::DistribuidorLentesContato, "Curitiba", "PR"),
    ];

    for (nome, categoria, cidade, estado) in fornecedores {
        let mut input = FornecedorInput::new(nome, categoria);
        input.cidade = Some(cidade.to_string());
        input.estado = Some(estado.to_string());
        input.prazo_entrega_medio = Some(7);
        db.fornecedores().create(input).await?;
    }
    Ok(fornecedores.len())
}

async fn seed_profissionais(db: &Database) -> Result<usize, Box<dyn std::error::Error>> {
    let profissionais = [
        ("Dra. Helena Martins", "Oftalmologia", "CRM-SP 123456"),
        ("Dr. Ricardo Tavares", "Optometria", "CBOO 4521"),
    ];

    for (nome, especialidade, registro) in profissionais {
        db.consultorio()
            .create_profissional(ProfissionalInput {
                nome: nome.to_string(),
                especialidade: Some(especialidade.to_string()),
                registro_profissional: Some(registro.to_string()),
                telefone: None,
                email: None,
            })
            .await?;
    }
    Ok(profissionais.len())
}
