//! Statements built from a [`ComparativeFinancials`] pair.
//!
//! Each statement is a plain value that renders to Markdown or CSV. Nothing
//! here reads transaction records directly.

pub mod income_expenditure;
pub mod receipts_payments;
pub mod trial_balance;

pub use income_expenditure::{BalanceSheet, IncomeExpenditureStatement};
pub use receipts_payments::ReceiptsPaymentsAccount;
pub use trial_balance::{TrialBalance, TrialBalanceRow};

use crate::calculator::{ComparativeFinancials, PeriodCalculator};
use crate::error::{Result, SocietyError};
use crate::period::FinancialYear;
use crate::store::SocietyView;
use log::info;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A row with one cell per year. `None` renders blank: the row's account had
/// no activity that year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComparativeRow {
    pub label: String,
    pub current: Option<Decimal>,
    pub previous: Option<Decimal>,
}

impl ComparativeRow {
    pub fn new(label: impl Into<String>, current: Option<Decimal>, previous: Option<Decimal>) -> Self {
        Self {
            label: label.into(),
            current,
            previous,
        }
    }

    pub fn both(label: impl Into<String>, current: Decimal, previous: Decimal) -> Self {
        Self::new(label, Some(current), Some(previous))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComparativeTotal {
    pub current: Decimal,
    pub previous: Decimal,
}

/// A single-year row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatementRow {
    pub label: String,
    pub amount: Decimal,
}

impl StatementRow {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

pub fn format_cell(amount: Option<Decimal>) -> String {
    amount.map(format_amount).unwrap_or_default()
}

pub(crate) fn write_csv(records: Vec<Vec<String>>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SocietyError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lays two comparative columns side by side, padding the shorter one.
pub(crate) fn side_by_side<'r>(
    left: &'r [ComparativeRow],
    right: &'r [ComparativeRow],
) -> impl Iterator<Item = (Option<&'r ComparativeRow>, Option<&'r ComparativeRow>)> {
    let rows = left.len().max(right.len());
    (0..rows).map(move |i| (left.get(i), right.get(i)))
}

pub(crate) fn comparative_cells(row: Option<&ComparativeRow>) -> [String; 3] {
    match row {
        Some(row) => [
            format_cell(row.previous),
            row.label.clone(),
            format_cell(row.current),
        ],
        None => [String::new(), String::new(), String::new()],
    }
}

/// Every statement for one financial year of one society.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnualReport {
    pub society_id: String,
    pub year: FinancialYear,
    pub financials: ComparativeFinancials,
    pub income_expenditure: IncomeExpenditureStatement,
    pub balance_sheet: BalanceSheet,
    pub trial_balance: TrialBalance,
    pub receipts_payments: ReceiptsPaymentsAccount,
}

impl AnnualReport {
    pub fn build(view: &SocietyView<'_>, year: FinancialYear) -> Self {
        let financials = PeriodCalculator::new(view).compare(year);
        info!(
            "Building annual report for society {} ({})",
            view.society_id, year
        );

        Self {
            society_id: view.society_id.clone(),
            year,
            income_expenditure: IncomeExpenditureStatement::from_financials(&financials),
            balance_sheet: BalanceSheet::from_financials(&financials),
            trial_balance: TrialBalance::from_financials(&financials.current),
            receipts_payments: ReceiptsPaymentsAccount::from_financials(&financials),
            financials,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "# Annual Accounts - {} - {}\n\n",
            self.society_id, self.year
        ));
        output.push_str(&self.income_expenditure.to_markdown());
        output.push('\n');
        output.push_str(&self.balance_sheet.to_markdown());
        output.push('\n');
        output.push_str(&self.trial_balance.to_markdown());
        output.push('\n');
        output.push_str(&self.receipts_payments.to_markdown());
        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
