use super::{format_amount, write_csv, StatementRow};
use crate::calculator::ComparativeFinancials;
use crate::error::Result;
use crate::period::FinancialYear;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cash-basis Receipts & Payments account for one year. The opening balance
/// is the previous year's closing cash, and the closing balance is the plug
/// that makes both sides equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReceiptsPaymentsAccount {
    pub year: FinancialYear,
    pub opening_balance: Decimal,
    pub maintenance_collections: Decimal,
    pub other_receipts: Vec<StatementRow>,
    pub payments: Vec<StatementRow>,
    pub total_receipts: Decimal,
    pub total_payments: Decimal,
    pub closing_balance: Decimal,
}

impl ReceiptsPaymentsAccount {
    pub fn from_financials(pair: &ComparativeFinancials) -> Self {
        let current = &pair.current;
        let opening_balance = pair.previous.cash_in_hand;

        let other_receipts: Vec<StatementRow> = current
            .income_by_category
            .iter()
            .map(|(category, amount)| StatementRow::new(category.clone(), *amount))
            .collect();
        let payments: Vec<StatementRow> = current
            .expenses_by_category
            .iter()
            .map(|(category, amount)| StatementRow::new(category.clone(), *amount))
            .collect();

        let total_receipts = opening_balance
            + current.maintenance_collections
            + other_receipts.iter().map(|r| r.amount).sum::<Decimal>();
        let total_payments: Decimal = payments.iter().map(|r| r.amount).sum();
        let closing_balance = total_receipts - total_payments;

        Self {
            year: current.year,
            opening_balance,
            maintenance_collections: current.maintenance_collections,
            other_receipts,
            payments,
            total_receipts,
            total_payments,
            closing_balance,
        }
    }

    /// Payments plus closing balance; always equal to `total_receipts`.
    pub fn payments_side_total(&self) -> Decimal {
        self.total_payments + self.closing_balance
    }

    fn receipt_rows(&self) -> Vec<StatementRow> {
        let mut rows = vec![
            StatementRow::new("Opening Balance (Cash & Bank)", self.opening_balance),
            StatementRow::new("Maintenance Collections", self.maintenance_collections),
        ];
        rows.extend(self.other_receipts.iter().cloned());
        rows
    }

    fn payment_rows(&self) -> Vec<StatementRow> {
        let mut rows = self.payments.clone();
        rows.push(StatementRow::new(
            "Closing Balance (Cash & Bank)",
            self.closing_balance,
        ));
        rows
    }

    fn table(&self) -> Vec<[String; 4]> {
        let receipts = self.receipt_rows();
        let payments = self.payment_rows();
        let cells = |row: Option<&StatementRow>| match row {
            Some(row) => (row.label.clone(), format_amount(row.amount)),
            None => (String::new(), String::new()),
        };

        (0..receipts.len().max(payments.len()))
            .map(|i| {
                let (r_label, r_amount) = cells(receipts.get(i));
                let (p_label, p_amount) = cells(payments.get(i));
                [r_label, r_amount, p_label, p_amount]
            })
            .collect()
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "## Receipts & Payments Account for {}\n\n",
            self.year
        ));
        output.push_str("| Receipts | Amount | Payments | Amount |\n");
        output.push_str("|---|---:|---|---:|\n");
        for row in self.table() {
            output.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        output.push_str(&format!(
            "| **Total** | **{}** | **Total** | **{}** |\n",
            format_amount(self.total_receipts),
            format_amount(self.payments_side_total())
        ));
        output
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut records = vec![vec![
            "Receipts".to_string(),
            "Amount".to_string(),
            "Payments".to_string(),
            "Amount".to_string(),
        ]];
        records.extend(self.table().into_iter().map(Vec::from));
        records.push(vec![
            "Total".to_string(),
            format_amount(self.total_receipts),
            "Total".to_string(),
            format_amount(self.payments_side_total()),
        ]);
        write_csv(records)
    }
}
