use super::{
    comparative_cells, format_amount, side_by_side, write_csv, ComparativeRow, ComparativeTotal,
};
use crate::calculator::{ComparativeFinancials, PeriodFinancials};
use crate::error::Result;
use crate::period::FinancialYear;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const MAINTENANCE_LABEL: &str = "Maintenance Charges";
pub const SURPLUS_LABEL: &str = "Surplus (excess of income over expenditure)";
pub const DEFICIT_LABEL: &str = "Deficit (excess of expenditure over income)";

/// Comparative Income & Expenditure account.
///
/// Both sides total to `max(total_income, total_expenses)` for each year: the
/// smaller side takes the surplus or deficit as its plug row, so the printed
/// statement always balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeExpenditureStatement {
    pub current_year: FinancialYear,
    pub previous_year: FinancialYear,
    pub expenditure: Vec<ComparativeRow>,
    pub income: Vec<ComparativeRow>,
    pub total: ComparativeTotal,
}

/// Union of categories across both years. A category missing from a year
/// gets a blank cell, not zero.
fn category_rows(
    current: &BTreeMap<String, Decimal>,
    previous: &BTreeMap<String, Decimal>,
) -> Vec<ComparativeRow> {
    let categories: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();
    categories
        .into_iter()
        .map(|category| {
            ComparativeRow::new(
                category.clone(),
                current.get(category).copied(),
                previous.get(category).copied(),
            )
        })
        .collect()
}

fn surplus(fy: &PeriodFinancials) -> Option<Decimal> {
    (!fy.is_deficit()).then_some(fy.net_surplus)
}

fn deficit(fy: &PeriodFinancials) -> Option<Decimal> {
    fy.is_deficit().then_some(-fy.net_surplus)
}

impl IncomeExpenditureStatement {
    pub fn from_financials(pair: &ComparativeFinancials) -> Self {
        let (current, previous) = (&pair.current, &pair.previous);

        let mut expenditure =
            category_rows(&current.expenses_by_category, &previous.expenses_by_category);
        let (surplus_now, surplus_before) = (surplus(current), surplus(previous));
        if surplus_now.is_some() || surplus_before.is_some() {
            expenditure.push(ComparativeRow::new(SURPLUS_LABEL, surplus_now, surplus_before));
        }

        let mut income = vec![ComparativeRow::both(
            MAINTENANCE_LABEL,
            current.total_billed,
            previous.total_billed,
        )];
        income.extend(category_rows(
            &current.income_by_category,
            &previous.income_by_category,
        ));
        let (deficit_now, deficit_before) = (deficit(current), deficit(previous));
        if deficit_now.is_some() || deficit_before.is_some() {
            income.push(ComparativeRow::new(DEFICIT_LABEL, deficit_now, deficit_before));
        }

        Self {
            current_year: current.year,
            previous_year: previous.year,
            expenditure,
            income,
            total: ComparativeTotal {
                current: current.total_income.max(current.total_expenses),
                previous: previous.total_income.max(previous.total_expenses),
            },
        }
    }

    pub fn expenditure_side_total(&self) -> ComparativeTotal {
        side_total(&self.expenditure)
    }

    pub fn income_side_total(&self) -> ComparativeTotal {
        side_total(&self.income)
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "## Income & Expenditure Account for {}\n\n",
            self.current_year
        ));
        output.push_str(&markdown_table(
            [&self.previous_year, &self.current_year],
            ["Expenditure", "Income"],
            &self.expenditure,
            &self.income,
            self.total,
            self.total,
        ));
        output
    }

    pub fn to_csv(&self) -> Result<String> {
        csv_table(
            [&self.previous_year, &self.current_year],
            ["Expenditure", "Income"],
            &self.expenditure,
            &self.income,
            self.total,
            self.total,
        )
    }
}

/// Comparative balance sheet. Liabilities carry a single funds row equal to
/// total assets; there is no separate liabilities ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceSheet {
    pub current_year: FinancialYear,
    pub previous_year: FinancialYear,
    pub liabilities: Vec<ComparativeRow>,
    pub assets: Vec<ComparativeRow>,
    pub total_liabilities: ComparativeTotal,
    pub total_assets: ComparativeTotal,
}

impl BalanceSheet {
    pub fn from_financials(pair: &ComparativeFinancials) -> Self {
        let (current, previous) = (&pair.current, &pair.previous);

        let liabilities = vec![ComparativeRow::both(
            "General Fund & Reserves",
            current.total_funds,
            previous.total_funds,
        )];

        let assets = vec![
            ComparativeRow::both("Fixed Assets", current.fixed_assets, previous.fixed_assets),
            ComparativeRow::both(
                "Sundry Debtors (Members)",
                current.total_receivables,
                previous.total_receivables,
            ),
            ComparativeRow::both(
                "Cash & Bank Balances",
                current.cash_in_hand,
                previous.cash_in_hand,
            ),
        ];

        Self {
            current_year: current.year,
            previous_year: previous.year,
            liabilities,
            assets,
            total_liabilities: ComparativeTotal {
                current: current.total_funds,
                previous: previous.total_funds,
            },
            total_assets: ComparativeTotal {
                current: current.total_assets,
                previous: previous.total_assets,
            },
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "## Balance Sheet as on {}\n\n",
            self.current_year.end().format("%d %B %Y")
        ));
        output.push_str(&markdown_table(
            [&self.previous_year, &self.current_year],
            ["Liabilities", "Assets"],
            &self.liabilities,
            &self.assets,
            self.total_liabilities,
            self.total_assets,
        ));
        output
    }

    pub fn to_csv(&self) -> Result<String> {
        csv_table(
            [&self.previous_year, &self.current_year],
            ["Liabilities", "Assets"],
            &self.liabilities,
            &self.assets,
            self.total_liabilities,
            self.total_assets,
        )
    }
}

fn side_total(rows: &[ComparativeRow]) -> ComparativeTotal {
    ComparativeTotal {
        current: rows.iter().filter_map(|r| r.current).sum(),
        previous: rows.iter().filter_map(|r| r.previous).sum(),
    }
}

fn header(years: [&FinancialYear; 2], sides: [&str; 2]) -> Vec<String> {
    let [previous, current] = years.map(|y| y.label());
    vec![
        previous.clone(),
        sides[0].to_string(),
        current.clone(),
        previous,
        sides[1].to_string(),
        current,
    ]
}

fn body(left: &[ComparativeRow], right: &[ComparativeRow]) -> Vec<Vec<String>> {
    side_by_side(left, right)
        .map(|(l, r)| {
            comparative_cells(l)
                .into_iter()
                .chain(comparative_cells(r))
                .collect()
        })
        .collect()
}

fn totals(left: ComparativeTotal, right: ComparativeTotal) -> Vec<String> {
    vec![
        format_amount(left.previous),
        "Total".to_string(),
        format_amount(left.current),
        format_amount(right.previous),
        "Total".to_string(),
        format_amount(right.current),
    ]
}

fn markdown_table(
    years: [&FinancialYear; 2],
    sides: [&str; 2],
    left: &[ComparativeRow],
    right: &[ComparativeRow],
    left_total: ComparativeTotal,
    right_total: ComparativeTotal,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("| {} |\n", header(years, sides).join(" | ")));
    output.push_str("|---:|---|---:|---:|---|---:|\n");
    for row in body(left, right) {
        output.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    output.push_str(&format!("| {} |\n", totals(left_total, right_total).join(" | ")));
    output
}

fn csv_table(
    years: [&FinancialYear; 2],
    sides: [&str; 2],
    left: &[ComparativeRow],
    right: &[ComparativeRow],
    left_total: ComparativeTotal,
    right_total: ComparativeTotal,
) -> Result<String> {
    let mut records = vec![header(years, sides)];
    records.extend(body(left, right));
    records.push(totals(left_total, right_total));
    write_csv(records)
}
