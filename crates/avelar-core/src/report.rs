//! Sales report math for the Relatórios module.
//!
//! The database crate fetches rows for a period; everything here is pure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::{first_day_of_month, format_br_date, last_day_of_month};

/// Inclusive date range of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Periodo {
    #[ts(as = "String")]
    pub inicio: NaiveDate,
    #[ts(as = "String")]
    pub fim: NaiveDate,
}

impl Periodo {
    pub fn contem(&self, data: NaiveDate) -> bool {
        data >= self.inicio && data <= self.fim
    }
}

/// The current month, used when the report screen opens.
pub fn periodo_padrao(today: NaiveDate) -> Periodo {
    Periodo {
        inicio: first_day_of_month(today),
        fim: last_day_of_month(today),
    }
}

/// One completed sale as seen by the report: local calendar day and total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VendaDoPeriodo {
    pub dia: NaiveDate,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelatorioVendas {
    pub periodo: Periodo,
    pub total_vendas: i64,
    /// Centavos.
    pub total_faturado: i64,
    /// Centavos, rounded down.
    pub ticket_medio: i64,
    /// (dd/mm/aaaa, number of sales), in calendar order.
    pub vendas_por_dia: Vec<(String, i64)>,
}

/// Builds the sales report. Rows outside the period are ignored.
pub fn relatorio_vendas(periodo: Periodo, vendas: &[VendaDoPeriodo]) -> RelatorioVendas {
    let mut por_dia: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut total_vendas = 0;
    let mut total_faturado = 0;

    for venda in vendas.iter().filter(|v| periodo.contem(v.dia)) {
        total_vendas += 1;
        total_faturado += venda.total;
        *por_dia.entry(venda.dia).or_insert(0) += 1;
    }

    let ticket_medio = if total_vendas > 0 {
        total_faturado / total_vendas
    } else {
        0
    };

    RelatorioVendas {
        periodo,
        total_vendas,
        total_faturado,
        ticket_medio,
        vendas_por_dia: por_dia
            .into_iter()
            .map(|(dia, n)| (format_br_date(dia), n))
            .collect(),
    }
}

/// Best sellers, grouped by product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProdutoMaisVendido {
    pub nome: String,
    pub quantidade: i64,
    pub total: i64,
}
