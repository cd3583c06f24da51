//! # Supplier Repository
//!
//! Suppliers and their 1-5 star ratings.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use avelar_core::{
    relatorio_fornecedores, Avaliacao, AvaliacaoInput, CategoriaFornecedor, Fornecedor,
    FornecedorAvaliado, FornecedorInput, FornecedorResumo, RelatorioFornecedores,
};

use crate::error::{DbError, DbResult};

const FORNECEDOR_COLUMNS: &str = "f.id, f.nome, f.categoria, f.cnpj, f.inscricao_estadual, \
     f.contato_nome, f.telefone, f.email, f.site, f.cep, f.endereco, f.cidade, f.estado, \
     f.prazo_entrega_medio, f.condicao_pagamento, f.politica_frete, f.valor_minimo_pedido, \
     f.observacoes, f.ativo, f.created_at, f.updated_at";

#[derive(Debug, Clone)]
pub struct FornecedorRepository {
    pool: SqlitePool,
}

impl FornecedorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FornecedorRepository { pool }
    }

    /// Suppliers by name with their rating average and count.
    pub async fn list(
        &self,
        categoria: Option<CategoriaFornecedor>,
        ativo: Option<bool>,
    ) -> DbResult<Vec<FornecedorResumo>> {
        let sql = format!(
            "SELECT {FORNECEDOR_COLUMNS},
                    COALESCE(AVG(a.nota), 0.0) AS media_avaliacao,
                    COUNT(a.id) AS total_avaliacoes
             FROM fornecedores f
             LEFT JOIN avaliacoes_fornecedor a ON a.fornecedor_id = f.id
             WHERE (?1 IS NULL OR f.categoria = ?1)
               AND (?2 IS NULL OR f.ativo = ?2)
             GROUP BY f.id
             ORDER BY f.nome"
        );
        let fornecedores = sqlx::query_as::<_, FornecedorResumo>(&sql)
            .bind(categoria)
            .bind(ativo)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = fornecedores.len(), "Listed suppliers");
        Ok(fornecedores)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Fornecedor>> {
        let sql = format!("SELECT {FORNECEDOR_COLUMNS} FROM fornecedores f WHERE f.id = ?1");
        let fornecedor = sqlx::query_as::<_, Fornecedor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fornecedor)
    }

    pub async fn get(&self, id: &str) -> DbResult<Fornecedor> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Fornecedor", id))
    }

    pub async fn create(&self, input: FornecedorInput) -> DbResult<Fornecedor> {
        let input = input.validate()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let query = sqlx::query(
            "INSERT INTO fornecedores (
                nome, categoria, cnpj, inscricao_estadual, contato_nome, telefone, email, site,
                cep, endereco, cidade, estado, prazo_entrega_medio, condicao_pagamento,
                politica_frete, valor_minimo_pedido, observacoes, ativo,
                id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                ?19, ?20, ?21
            )",
        );
        bind_form(query, &input)
            .bind(&id)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, categoria = ?input.categoria, "Created supplier");
        self.get(&id).await
    }

    pub async fn update(&self, id: &str, input: FornecedorInput) -> DbResult<Fornecedor> {
        let input = input.validate()?;

        let query = sqlx::query(
            "UPDATE fornecedores SET
                nome = ?1, categoria = ?2, cnpj = ?3, inscricao_estadual = ?4, contato_nome = ?5,
                telefone = ?6, email = ?7, site = ?8, cep = ?9, endereco = ?10, cidade = ?11,
                estado = ?12, prazo_entrega_medio = ?13, condicao_pagamento = ?14,
                politica_frete = ?15, valor_minimo_pedido = ?16, observacoes = ?17, ativo = ?18,
                updated_at = ?20
             WHERE id = ?19",
        );
        let result = bind_form(query, &input)
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Fornecedor", id));
        }
        self.get(id).await
    }

    /// Records a rating. A form without stars is rejected.
    pub async fn avaliar(&self, fornecedor_id: &str, input: AvaliacaoInput) -> DbResult<Avaliacao> {
        let input = input.validate()?;
        self.get(fornecedor_id).await?;

        let avaliacao = Avaliacao {
            id: Uuid::new_v4().to_string(),
            fornecedor_id: fornecedor_id.to_string(),
            nota: input.nota,
            criterio_qualidade: input.criterio_qualidade,
            criterio_entrega: input.criterio_entrega,
            criterio_atendimento: input.criterio_atendimento,
            comentario: input.comentario,
            data_avaliacao: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO avaliacoes_fornecedor (
                id, fornecedor_id, nota, criterio_qualidade, criterio_entrega,
                criterio_atendimento, comentario, data_avaliacao
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&avaliacao.id)
        .bind(&avaliacao.fornecedor_id)
        .bind(avaliacao.nota)
        .bind(avaliacao.criterio_qualidade)
        .bind(avaliacao.criterio_entrega)
        .bind(avaliacao.criterio_atendimento)
        .bind(&avaliacao.comentario)
        .bind(avaliacao.data_avaliacao)
        .execute(&self.pool)
        .await?;

        info!(fornecedor_id = %fornecedor_id, nota = avaliacao.nota, "Supplier rated");
        Ok(avaliacao)
    }

    /// Ratings of one supplier, newest first.
    pub async fn avaliacoes(&self, fornecedor_id: &str) -> DbResult<Vec<Avaliacao>> {
        let avaliacoes = sqlx::query_as::<_, Avaliacao>(
            "SELECT id, fornecedor_id, nota, criterio_qualidade, criterio_entrega,
                    criterio_atendimento, comentario, data_avaliacao
             FROM avaliacoes_fornecedor
             WHERE fornecedor_id = ?1
             ORDER BY data_avaliacao DESC",
        )
        .bind(fornecedor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(avaliacoes)
    }

    pub async fn relatorio(&self) -> DbResult<RelatorioFornecedores> {
        let sql = format!("SELECT {FORNECEDOR_COLUMNS} FROM fornecedores f ORDER BY f.nome");
        let fornecedores = sqlx::query_as::<_, Fornecedor>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let notas: Vec<(String, i64)> =
            sqlx::query_as("SELECT fornecedor_id, nota FROM avaliacoes_fornecedor")
                .fetch_all(&self.pool)
                .await?;

        let mut por_fornecedor: HashMap<String, Vec<i64>> = HashMap::new();
        for (fornecedor_id, nota) in notas {
            por_fornecedor.entry(fornecedor_id).or_default().push(nota);
        }

        let avaliados: Vec<FornecedorAvaliado> = fornecedores
            .into_iter()
            .map(|fornecedor| FornecedorAvaliado {
                notas: por_fornecedor.remove(&fornecedor.id).unwrap_or_default(),
                fornecedor,
            })
            .collect();

        Ok(relatorio_fornecedores(&avaliados))
    }
}

/// Binds the 18 form columns as `?1..?18`.
fn bind_form<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    input: &'q FornecedorInput,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&input.nome)
        .bind(input.categoria)
        .bind(&input.cnpj)
        .bind(&input.inscricao_estadual)
        .bind(&input.contato_nome)
        .bind(&input.telefone)
        .bind(&input.email)
        .bind(&input.site)
        .bind(&input.cep)
        .bind(&input.endereco)
        .bind(&input.cidade)
        .bind(&input.estado)
        .bind(input.prazo_entrega_medio)
        .bind(&input.condicao_pagamento)
        .bind(&input.politica_frete)
        .bind(input.valor_minimo_pedido)
        .bind(&input.observacoes)
        .bind(input.ativo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup;
    use avelar_core::CoreError;

    fn nota(n: i64) -> AvaliacaoInput {
        AvaliacaoInput {
            nota: n,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list_with_ratings() {
        let db = setup().await;
        let repo = db.fornecedores();

        let mut input = FornecedorInput::new("Essilor do Brasil", CategoriaFornecedor::LaboratorioLentes);
        input.estado = Some("rj".to_string());
        let essilor = repo.create(input).await.unwrap();
        assert_eq!(essilor.estado.as_deref(), Some("RJ"));

        repo.create(FornecedorInput::new("Atelier Armações", CategoriaFornecedor::FabricanteArmacoes))
            .await
            .unwrap();

        repo.avaliar(&essilor.id, nota(5)).await.unwrap();
        repo.avaliar(&essilor.id, nota(4)).await.unwrap();

        let lista = repo.list(None, None).await.unwrap();
        assert_eq!(lista[0].fornecedor.nome, "Atelier Armações");
        assert_eq!(lista[0].total_avaliacoes, 0);
        assert_eq!(lista[1].total_avaliacoes, 2);
        assert!((lista[1].media_avaliacao - 4.5).abs() < 1e-9);

        let lentes = repo
            .list(Some(CategoriaFornecedor::LaboratorioLentes), Some(true))
            .await
            .unwrap();
        assert_eq!(lentes.len(), 1);
        assert_eq!(repo.avaliacoes(&essilor.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_avaliar_without_stars() {
        let db = setup().await;
        let f = db
            .fornecedores()
            .create(FornecedorInput::new("Bausch", CategoriaFornecedor::DistribuidorLentesContato))
            .await
            .unwrap();

        let err = db.fornecedores().avaliar(&f.id, nota(0)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::MissingRating)));
        assert_eq!(err.to_string(), "Selecione uma avaliação!");
    }

    #[tokio::test]
    async fn test_relatorio() {
        let db = setup().await;
        let repo = db.fornecedores();
        let bom = repo
            .create(FornecedorInput::new("Hoya", CategoriaFornecedor::LaboratorioLentes))
            .await
            .unwrap();
        let ruim = repo
            .create(FornecedorInput::new("Genérico", CategoriaFornecedor::Acessorios))
            .await
            .unwrap();

        for n in [5, 5, 4] {
            repo.avaliar(&bom.id, nota(n)).await.unwrap();
        }
        for n in [2, 1] {
            repo.avaliar(&ruim.id, nota(n)).await.unwrap();
        }

        let r = repo.relatorio().await.unwrap();
        assert_eq!(r.total_fornecedores, 2);
        assert_eq!(r.melhor_fornecedor.map(|m| m.nome), Some("Hoya".to_string()));
        assert_eq!(r.fornecedores_problema.len(), 1);
        assert_eq!(r.fornecedores_problema[0].problema, "Avaliação baixa");
    }

    #[tokio::test]
    async fn test_update_supplier() {
        let db = setup().await;
        let f = db
            .fornecedores()
            .create(FornecedorInput::new("Zeiss", CategoriaFornecedor::LaboratorioLentes))
            .await
            .unwrap();

        let mut input = FornecedorInput::new("Zeiss Vision", CategoriaFornecedor::LaboratorioLentes);
        input.ativo = false;
        let atualizado = db.fornecedores().update(&f.id, input).await.unwrap();
        assert_eq!(atualizado.nome, "Zeiss Vision");
        assert!(!atualizado.ativo);
        assert!(db.fornecedores().list(None, Some(true)).await.unwrap().is_empty());
    }
}
