//! Static chart of accounts shared by every agency.
//!
//! Codes are dotted and hierarchical: `1` is the root of assets, `1.1` a
//! group beneath it, `1.1.01` a leaf. Financial accounts may point at any
//! active code.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartCategory {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartAccount {
    pub code: &'static str,
    pub name: &'static str,
    pub category: ChartCategory,
    pub is_active: bool,
}

impl ChartAccount {
    pub fn parent_code(&self) -> Option<&'static str> {
        self.code.rsplit_once('.').map(|(parent, _)| parent)
    }

    pub fn depth(&self) -> usize {
        self.code.split('.').count()
    }
}

const fn entry(code: &'static str, name: &'static str, category: ChartCategory) -> ChartAccount {
    ChartAccount {
        code,
        name,
        category,
        is_active: true,
    }
}

use ChartCategory::*;

static CHART_OF_ACCOUNTS: &[ChartAccount] = &[
    entry("1", "Activo", Asset),
    entry("1.1", "Caja", Asset),
    entry("1.1.01", "Caja moneda local", Asset),
    entry("1.1.02", "Caja moneda de referencia", Asset),
    entry("1.2", "Bancos", Asset),
    entry("1.2.01", "Cuentas corrientes", Asset),
    entry("1.2.02", "Cajas de ahorro", Asset),
    entry("1.3", "Billeteras virtuales", Asset),
    entry("1.4", "Cuentas a cobrar", Asset),
    entry("1.4.01", "Clientes", Asset),
    entry("1.5", "Bienes de uso", Asset),
    ChartAccount {
        code: "1.6",
        name: "Valores a depositar",
        category: Asset,
        is_active: false,
    },
    entry("2", "Pasivo", Liability),
    entry("2.1", "Cuentas a pagar", Liability),
    entry("2.1.01", "Operadores", Liability),
    entry("2.2", "Comisiones a pagar", Liability),
    entry("2.3", "Impuestos a pagar", Liability),
    entry("3", "Patrimonio neto", Equity),
    entry("3.1", "Capital", Equity),
    entry("3.2", "Retiros de socios", Equity),
    entry("4", "Ingresos", Income),
    entry("4.1", "Ventas de servicios turisticos", Income),
    entry("4.2", "Diferencia de cambio positiva", Income),
    entry("5", "Egresos", Expense),
    entry("5.1", "Costo de operadores", Expense),
    entry("5.2", "Comisiones de vendedores", Expense),
    entry("5.3", "Gastos operativos", Expense),
    entry("5.4", "Diferencia de cambio negativa", Expense),
];

pub fn all() -> &'static [ChartAccount] {
    CHART_OF_ACCOUNTS
}

pub fn find(code: &str) -> Option<&'static ChartAccount> {
    CHART_OF_ACCOUNTS.iter().find(|account| account.code == code)
}

pub fn find_active(code: &str) -> Option<&'static ChartAccount> {
    find(code).filter(|account| account.is_active)
}

/// Direct children of `code`.
pub fn children(code: &str) -> impl Iterator<Item = &'static ChartAccount> + '_ {
    CHART_OF_ACCOUNTS
        .iter()
        .filter(move |account| account.parent_code() == Some(code))
}
