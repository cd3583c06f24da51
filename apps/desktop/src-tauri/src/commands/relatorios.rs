//! # Report Commands
//!
//! Sales over a period and best sellers. Monthly financial metrics live in
//! [`super::financeiro::metricas_financeiras`].

use avelar_core::{periodo_padrao as mes_corrente, Periodo, ProdutoMaisVendido, RelatorioVendas};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::DbState;

/// The current month, pre-filled when the report screen opens.
pub fn periodo_padrao(today: NaiveDate) -> Periodo {
    mes_corrente(today)
}

/// Completed sales between `inicio` and `fim`, both days included.
pub async fn relatorio_vendas(
    db: &DbState,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> ApiResult<RelatorioVendas> {
    if fim < inicio {
        return Err(ApiError::validation("Data final anterior à data inicial"));
    }
    debug!(inicio = %inicio, fim = %fim, "relatorio_vendas command");
    Ok(db.inner().relatorios().vendas(Periodo { inicio, fim }).await?)
}

pub async fn produtos_mais_vendidos(
    db: &DbState,
    limit: Option<i64>,
) -> ApiResult<Vec<ProdutoMaisVendido>> {
    Ok(db
        .inner()
        .relatorios()
        .produtos_mais_vendidos(limit.unwrap_or(10))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cart, test_support, vendas};
    use crate::error::ErrorCode;
    use crate::state::{CartKind, CartState};
    use avelar_core::{CategoriaProduto, ProdutoInput};
    use chrono::Local;

    #[test]
    fn test_periodo_padrao() {
        let periodo = periodo_padrao(test_support::today());
        assert_eq!(periodo.inicio, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(periodo.fim, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[tokio::test]
    async fn test_reversed_period() {
        let db = test_support::db().await;
        let today = test_support::today();
        let err = relatorio_vendas(&db, today, today.pred_opt().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_sales_of_today() {
        let db = test_support::db().await;
        let carts = CartState::new();
        let mut input = ProdutoInput::new("Estojo Rígido", CategoriaProduto::Acessorio, 4_000);
        input.estoque_atual = 10;
        let estojo = db.inner().produtos().create(input).await.unwrap();

        for quantidade in [2, 1] {
            cart::add_to_cart(&db, &carts, CartKind::Venda, &estojo.id, Some(quantidade))
                .await
                .unwrap();
            vendas::finalizar_venda(&db, &carts, Default::default())
                .await
                .unwrap();
        }

        // Sales are stamped with the wall clock.
        let hoje = Local::now().date_naive();
        let relatorio = relatorio_vendas(&db, hoje, hoje).await.unwrap();
        assert_eq!(relatorio.total_vendas, 2);
        assert_eq!(relatorio.total_faturado, 12_000);
        assert_eq!(relatorio.ticket_medio, 6_000);
        assert_eq!(relatorio.vendas_por_dia.len(), 1);
        assert_eq!(relatorio.vendas_por_dia[0].1, 2);

        let top = produtos_mais_vendidos(&db, None).await.unwrap();
        assert_eq!(top[0].nome, "Estojo Rígido");
        assert_eq!(top[0].quantidade, 3);
        assert_eq!(top[0].total, 12_000);
    }
}
