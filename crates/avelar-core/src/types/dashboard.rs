//! Dashboard cards: today's numbers, latest sales and stock alerts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::venda::VendaResumo;

/// Products below this many units are critical.
pub const LIMITE_ESTOQUE_CRITICO: i64 = 2;

/// Headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    /// Sales created today.
    pub vendas_hoje: i64,
    pub total_clientes: i64,
    /// Active products under [`crate::LOW_STOCK_THRESHOLD`].
    pub estoque_baixo: i64,
    /// Completed sales since the first of the month, in centavos.
    pub faturamento_mes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NivelAlerta {
    Critico,
    Baixo,
}

impl NivelAlerta {
    /// `CRÍTICO` under 2 units, `BAIXO` otherwise.
    pub fn para_estoque(estoque: i64) -> Self {
        if estoque < LIMITE_ESTOQUE_CRITICO {
            NivelAlerta::Critico
        } else {
            NivelAlerta::Baixo
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NivelAlerta::Critico => "CRÍTICO",
            NivelAlerta::Baixo => "BAIXO",
        }
    }
}

/// A low stock row on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProdutoEstoqueBaixo {
    pub id: String,
    pub nome: String,
    pub estoque_atual: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertaEstoque {
    pub produto_id: String,
    pub nome: String,
    pub estoque_atual: i64,
    pub nivel: NivelAlerta,
}

impl From<ProdutoEstoqueBaixo> for AlertaEstoque {
    fn from(p: ProdutoEstoqueBaixo) -> Self {
        AlertaEstoque {
            nivel: NivelAlerta::para_estoque(p.estoque_atual),
            produto_id: p.id,
            nome: p.nome,
            estoque_atual: p.estoque_atual,
        }
    }
}

/// Everything the dashboard module shows at once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub vendas_recentes: Vec<VendaResumo>,
    pub alertas_estoque: Vec<AlertaEstoque>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nivel_alerta() {
        assert_eq!(NivelAlerta::para_estoque(0), NivelAlerta::Critico);
        assert_eq!(NivelAlerta::para_estoque(1), NivelAlerta::Critico);
        assert_eq!(NivelAlerta::para_estoque(2), NivelAlerta::Baixo);
        assert_eq!(NivelAlerta::para_estoque(4), NivelAlerta::Baixo);
        assert_eq!(NivelAlerta::Critico.label(), "CRÍTICO");
    }

    #[test]
    fn test_alerta_from_produto() {
        let alerta = AlertaEstoque::from(ProdutoEstoqueBaixo {
            id: "p1".to_string(),
            nome: "Solução Renu 355ml".to_string(),
            estoque_atual: 1,
        });
        assert_eq!(alerta.nivel, NivelAlerta::Critico);
        assert_eq!(serde_json::to_string(&alerta.nivel).unwrap(), "\"CRITICO\"");
    }
}
