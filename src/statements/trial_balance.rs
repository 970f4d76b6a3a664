use super::{format_amount, write_csv};
use crate::calculator::PeriodFinancials;
use crate::error::Result;
use crate::period::FinancialYear;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SUNDRY_DEBTORS: &str = "Sundry Debtors (Members)";
pub const CASH_AND_BANK: &str = "Cash & Bank";
pub const MAINTENANCE_INCOME: &str = "Maintenance Income";
pub const OPENING_RESERVES: &str = "Opening Balances (Reserves)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrialBalanceRow {
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl TrialBalanceRow {
    fn debit(account_name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_name: account_name.into(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    fn credit(account_name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_name: account_name.into(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// Single-year trial balance.
///
/// The debit and credit totals are reported as computed. Without fixed-asset
/// or liability entries they are not forced to agree, see [`TrialBalance::difference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrialBalance {
    pub year: FinancialYear,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl TrialBalance {
    pub fn from_financials(fy: &PeriodFinancials) -> Self {
        let mut rows: Vec<TrialBalanceRow> = fy
            .expenses_by_category
            .iter()
            .map(|(category, amount)| TrialBalanceRow::debit(category.clone(), *amount))
            .collect();

        rows.push(TrialBalanceRow::debit(SUNDRY_DEBTORS, fy.total_receivables));
        rows.push(TrialBalanceRow::debit(CASH_AND_BANK, fy.cash_in_hand));
        rows.push(TrialBalanceRow::credit(MAINTENANCE_INCOME, fy.total_billed));

        for entry in &fy.income_entries {
            let name = if entry.description.is_empty() {
                entry.category.clone()
            } else {
                format!("{} - {}", entry.category, entry.description)
            };
            rows.push(TrialBalanceRow::credit(name, entry.amount));
        }

        if !fy.total_opening_balance.is_zero() {
            rows.push(TrialBalanceRow::credit(
                OPENING_RESERVES,
                fy.total_opening_balance,
            ));
        }

        let total_debit = rows.iter().map(|r| r.debit).sum();
        let total_credit = rows.iter().map(|r| r.credit).sum();

        Self {
            year: fy.year,
            rows,
            total_debit,
            total_credit,
        }
    }

    /// Debit total minus credit total.
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    pub fn is_balanced(&self) -> bool {
        self.difference().is_zero()
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "## Trial Balance as on {}\n\n",
            self.year.end().format("%d %B %Y")
        ));
        output.push_str("| Account | Debit | Credit |\n");
        output.push_str("|---|---:|---:|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                row.account_name,
                amount_or_blank(row.debit),
                amount_or_blank(row.credit)
            ));
        }
        output.push_str(&format!(
            "| **Total** | **{}** | **{}** |\n",
            format_amount(self.total_debit),
            format_amount(self.total_credit)
        ));
        if !self.is_balanced() {
            output.push_str(&format!(
                "\nDifference in trial balance: {}\n",
                format_amount(self.difference())
            ));
        }
        output
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut records = vec![vec![
            "Account".to_string(),
            "Debit".to_string(),
            "Credit".to_string(),
        ]];
        for row in &self.rows {
            records.push(vec![
                row.account_name.clone(),
                amount_or_blank(row.debit),
                amount_or_blank(row.credit),
            ]);
        }
        records.push(vec![
            "Total".to_string(),
            format_amount(self.total_debit),
            format_amount(self.total_credit),
        ]);
        write_csv(records)
    }
}

fn amount_or_blank(amount: Decimal) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        format_amount(amount)
    }
}
