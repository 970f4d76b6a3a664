//! # Society Accounts
//!
//! Financial aggregation for cooperative housing societies: maintenance
//! billing, member ledgers and the year-end statements a society files.
//!
//! ## Core Concepts
//!
//! - **Society Books**: residents, maintenance bills, other income and expense vouchers,
//!   partitioned by society id and read through a [`SocietyView`]
//! - **Financial Year**: April to March, identified by its ending calendar year
//! - **Flows vs Stocks**: income and expenditure are bounded by the year, while cash and
//!   receivables are cumulative as of the year end
//! - **Statements**: Income & Expenditure, Balance Sheet, Trial Balance and Receipts &
//!   Payments, each rendered to Markdown and CSV
//!
//! ## Example
//!
//! ```rust,ignore
//! use society_accounts::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let mut books = SocietyBooks::new(Society::new("s1", "Green Acres CHS"));
//! let asha = Resident::new("r1", "s1", "Asha Rao", "A-101", dec!(850), dec!(0));
//! books.add_resident(asha.clone())?;
//!
//! let may = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! books.add_bill(Bill::new(
//!     "B100",
//!     &asha,
//!     vec![LineItem::fixed("Maintenance", dec!(1500))],
//!     dec!(0),
//!     may,
//!     NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
//! ))?;
//! books.record_payment(
//!     "B100",
//!     PaymentDetails::new(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(), BillPaymentMode::Upi),
//! )?;
//!
//! let report = prepare_annual_report(&books, "s1", FinancialYear::new(2025))?;
//! println!("{}", report.to_markdown());
//! ```

pub mod balance;
pub mod billing;
pub mod calculator;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod ledger;
pub mod period;
pub mod reconciliation;
pub mod schema;
pub mod statements;
pub mod store;

#[cfg(feature = "gemini")]
pub mod llm;

pub use balance::{compute_balances, BalanceAggregator, CashBankSnapshot};
pub use billing::BillGenerator;
pub use calculator::{
    compute_comparative, compute_period, ComparativeFinancials, IncomeEntry, PeriodCalculator,
    PeriodFinancials,
};
pub use config::{BillingConfig, ChargeHead, SocietyConfig};
pub use error::{Result, SocietyError};
pub use ingestion::*;
pub use ledger::{current_balance, dues_register, DuesEntry, LedgerEntry, MemberLedger};
pub use period::{parse_date, parse_financial_year, FinancialYear};
pub use reconciliation::*;
pub use schema::*;
pub use statements::{
    format_amount, format_cell, AnnualReport, BalanceSheet, IncomeExpenditureStatement,
    ReceiptsPaymentsAccount, TrialBalance,
};
pub use store::{SocietyBooks, SocietyView, TransactionStore};

use log::{debug, info, warn};

pub struct SocietyReporter;

impl SocietyReporter {
    pub fn annual_report(
        books: &SocietyBooks,
        society_id: &str,
        year: FinancialYear,
    ) -> Result<AnnualReport> {
        let society = books.society(society_id)?;
        let view = books.view(society_id)?;

        info!("Preparing {} accounts for {}", year, society.name);
        debug!(
            "Society {} has {} residents, {} bills, {} incomes and {} expenses",
            society_id,
            view.residents.len(),
            view.bills.len(),
            view.incomes.len(),
            view.expenses.len()
        );

        let report = AnnualReport::build(&view, year);
        if !report.trial_balance.is_balanced() {
            debug!(
                "Trial balance for {} differs by {}",
                year,
                report.trial_balance.difference()
            );
        }
        Ok(report)
    }

    /// Builds the report after checking that the live cash and bank balances
    /// agree with the cumulative cash position.
    pub fn annual_report_with_verification(
        books: &SocietyBooks,
        society_id: &str,
        year: FinancialYear,
    ) -> Result<AnnualReport> {
        verify_books(&books.view(society_id)?)?;
        Self::annual_report(books, society_id, year)
    }
}

pub fn prepare_annual_report(
    books: &SocietyBooks,
    society_id: &str,
    year: FinancialYear,
) -> Result<AnnualReport> {
    SocietyReporter::annual_report(books, society_id, year)
}

/// Cash plus bank must equal the cash position as of the latest transaction.
/// Memorandum vouchers reduce the latter only, so books containing them are
/// not checked.
pub fn verify_books(view: &SocietyView<'_>) -> Result<()> {
    if view
        .expenses
        .iter()
        .any(|e| e.payment_mode.is_memorandum())
    {
        warn!(
            "Society {} has memorandum vouchers, skipping cash verification",
            view.society_id
        );
        return Ok(());
    }

    let Some(latest) = view.latest_transaction_date() else {
        return Ok(());
    };

    let live = compute_balances(view).total();
    let cumulative = PeriodCalculator::new(view).cash_as_of(latest);
    if live != cumulative {
        return Err(SocietyError::VerificationFailed(format!(
            "cash and bank total {} but cash position on {} is {}",
            live, latest, cumulative
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_to_end_report() {
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres CHS"));
        let asha = Resident::new("r1", "s1", "Asha Rao", "A-101", dec!(850), dec!(0));
        books.add_resident(asha.clone()).unwrap();
        books
            .add_bill(Bill::new(
                "B100",
                &asha,
                vec![LineItem::fixed("Maintenance", dec!(1500))],
                dec!(0),
                date(2024, 5, 1),
                date(2024, 5, 10),
            ))
            .unwrap();
        books
            .record_payment("B100", PaymentDetails::new(date(2024, 5, 8), BillPaymentMode::Upi))
            .unwrap();

        let report =
            SocietyReporter::annual_report_with_verification(&books, "s1", FinancialYear::new(2025))
                .unwrap();
        assert_eq!(report.financials.current.total_billed, dec!(1500));
        assert!(report.to_markdown().contains("# Annual Accounts - s1 - FY 2024-25"));
    }

    #[test]
    fn test_unknown_society() {
        let books = SocietyBooks::new(Society::new("s1", "Green Acres CHS"));
        let result = prepare_annual_report(&books, "s9", FinancialYear::new(2025));
        assert!(matches!(result, Err(SocietyError::UnknownSociety(_))));
    }

    #[test]
    fn test_verification_skips_memorandum_vouchers() {
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres CHS"));
        books
            .add_expense(Expense::new(
                "e1",
                "s1",
                "Depreciation",
                dec!(500),
                date(2024, 6, 1),
                VoucherMode::Journal,
            ))
            .unwrap();
        assert!(verify_books(&books.view("s1").unwrap()).is_ok());
    }
}
