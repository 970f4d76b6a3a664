//! Period figures for one financial year.
//!
//! Two kinds of figures come out of [`PeriodCalculator::compute`]:
//!
//! - **Flows** (income, expenses, surplus) only count records dated inside the
//!   financial year.
//! - **Stocks** (cash in hand, receivables) are cumulative from the first
//!   record up to the last day of the year, the way a balance sheet reads
//!   "as on 31st March".
//!
//! The balance sheet has no independent liabilities ledger: `total_funds` is
//! set equal to `total_assets`.

use crate::period::FinancialYear;
use crate::store::SocietyView;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One other-income record as it appears on the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeEntry {
    pub id: String,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodFinancials {
    pub year: FinancialYear,

    /// Bills generated in the year.
    pub total_billed: Decimal,
    /// Of the bills generated in the year, those now paid.
    pub collected_amount: Decimal,
    /// Bill payments whose payment date falls in the year.
    pub maintenance_collections: Decimal,
    pub total_other_income: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Negative means a deficit.
    pub net_surplus: Decimal,

    /// Unpaid bills generated on or before the year end, whatever their year.
    pub pending_bills_amount: Decimal,
    pub total_opening_balance: Decimal,
    pub total_receivables: Decimal,
    pub cash_in_hand: Decimal,

    pub fixed_assets: Decimal,
    pub current_assets: Decimal,
    pub total_assets: Decimal,
    pub total_funds: Decimal,

    pub expenses_by_category: BTreeMap<String, Decimal>,
    pub income_by_category: BTreeMap<String, Decimal>,
    pub income_entries: Vec<IncomeEntry>,
}

impl PeriodFinancials {
    pub fn is_deficit(&self) -> bool {
        self.net_surplus < Decimal::ZERO
    }
}

/// The selected year and the year before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComparativeFinancials {
    pub current: PeriodFinancials,
    pub previous: PeriodFinancials,
}

pub struct PeriodCalculator<'v, 'a> {
    view: &'v SocietyView<'a>,
}

impl<'v, 'a> PeriodCalculator<'v, 'a> {
    pub fn new(view: &'v SocietyView<'a>) -> Self {
        Self { view }
    }

    pub fn compute(&self, year: FinancialYear) -> PeriodFinancials {
        let (start, end) = (year.start(), year.end());
        let view = self.view;

        // Flows
        let mut total_billed = Decimal::ZERO;
        let mut collected_amount = Decimal::ZERO;
        for bill in view.bills_in_period(start, end) {
            total_billed += bill.total_amount;
            if bill.is_paid() {
                collected_amount += bill.total_amount;
            }
        }

        let maintenance_collections: Decimal = view
            .payments_in_period(start, end)
            .map(|(bill, _)| bill.total_amount)
            .sum();

        let mut income_by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut income_entries = Vec::new();
        for income in view.incomes_in_period(start, end) {
            *income_by_category
                .entry(income.category.clone())
                .or_default() += income.amount;
            income_entries.push(IncomeEntry {
                id: income.id.clone(),
                category: income.category.clone(),
                description: income.description.clone(),
                date: income.date,
                amount: income.amount,
            });
        }
        let total_other_income: Decimal = income_entries.iter().map(|e| e.amount).sum();

        let mut expenses_by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for expense in view.expenses_in_period(start, end) {
            *expenses_by_category
                .entry(expense.category.clone())
                .or_default() += expense.amount;
        }
        let total_expenses: Decimal = expenses_by_category.values().copied().sum();

        let total_income = total_billed + total_other_income;
        let net_surplus = total_income - total_expenses;

        // Stocks
        let pending_bills_amount: Decimal = view
            .bills_as_of(end)
            .filter(|b| !b.is_paid())
            .map(|b| b.total_amount)
            .sum();
        let total_opening_balance = view.total_opening_balance();
        let total_receivables = pending_bills_amount + total_opening_balance;

        let cash_in_hand = self.cash_as_of(end);

        let fixed_assets = Decimal::ZERO;
        let current_assets = cash_in_hand + total_receivables;
        let total_assets = fixed_assets + current_assets;
        let total_funds = total_assets;

        debug!(
            "{} for society {}: income {}, expenses {}, surplus {}, cash {}, receivables {}",
            year,
            view.society_id,
            total_income,
            total_expenses,
            net_surplus,
            cash_in_hand,
            total_receivables
        );

        PeriodFinancials {
            year,
            total_billed,
            collected_amount,
            maintenance_collections,
            total_other_income,
            total_income,
            total_expenses,
            net_surplus,
            pending_bills_amount,
            total_opening_balance,
            total_receivables,
            cash_in_hand,
            fixed_assets,
            current_assets,
            total_assets,
            total_funds,
            expenses_by_category,
            income_by_category,
            income_entries,
        }
    }

    /// Cumulative cash and bank position on `date`: every payment, income
    /// and expense dated on or before it.
    pub fn cash_as_of(&self, date: NaiveDate) -> Decimal {
        let collected: Decimal = self
            .view
            .payments_as_of(date)
            .map(|(bill, _)| bill.total_amount)
            .sum();
        let income: Decimal = self.view.incomes_as_of(date).map(|i| i.amount).sum();
        let spent: Decimal = self.view.expenses_as_of(date).map(|e| e.amount).sum();
        collected + income - spent
    }

    pub fn compare(&self, year: FinancialYear) -> ComparativeFinancials {
        ComparativeFinancials {
            current: self.compute(year),
            previous: self.compute(year.previous()),
        }
    }
}

pub fn compute_period(view: &SocietyView<'_>, year: FinancialYear) -> PeriodFinancials {
    PeriodCalculator::new(view).compute(year)
}

pub fn compute_comparative(view: &SocietyView<'_>, year: FinancialYear) -> ComparativeFinancials {
    PeriodCalculator::new(view).compare(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;
    use crate::store::SocietyBooks;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(id: &str, resident: &Resident, amount: Decimal, generated: NaiveDate) -> Bill {
        Bill::new(
            id,
            resident,
            vec![LineItem::fixed("Maintenance", amount)],
            Decimal::ZERO,
            generated,
            generated + chrono::Days::new(10),
        )
    }

    fn sample_books() -> SocietyBooks {
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres"));
        let asha = Resident::new("r1", "s1", "Asha", "A-101", dec!(800), dec!(1000));
        let ravi = Resident::new("r2", "s1", "Ravi", "A-102", dec!(900), dec!(-200));
        books.add_resident(asha.clone()).unwrap();
        books.add_resident(ravi.clone()).unwrap();

        // FY 2023-24
        books.add_bill(bill("b1", &asha, dec!(1000), date(2023, 6, 1))).unwrap();
        books.add_bill(bill("b2", &ravi, dec!(1100), date(2024, 2, 1))).unwrap();
        // FY 2024-25
        books.add_bill(bill("b3", &asha, dec!(1500), date(2024, 5, 1))).unwrap();
        books.add_bill(bill("b4", &ravi, dec!(1600), date(2024, 5, 1))).unwrap();
        // FY 2025-26
        books.add_bill(bill("b5", &asha, dec!(1700), date(2025, 4, 1))).unwrap();

        books
            .record_payment("b1", PaymentDetails::new(date(2023, 6, 5), BillPaymentMode::Cash))
            .unwrap();
        // Paid after the year it was billed in.
        books
            .record_payment("b2", PaymentDetails::new(date(2024, 4, 10), BillPaymentMode::Upi))
            .unwrap();
        books
            .record_payment("b3", PaymentDetails::new(date(2024, 5, 8), BillPaymentMode::Upi))
            .unwrap();

        books
            .add_income(Income::new("i1", "s1", "FD Interest", dec!(300), date(2024, 9, 30), IncomeMode::BankTransfer))
            .unwrap();
        books
            .add_income(Income::new("i2", "s1", "Hall Rent", dec!(200), date(2023, 12, 1), IncomeMode::Cash))
            .unwrap();
        books
            .add_expense(Expense::new("e1", "s1", "Security", dec!(400), date(2023, 7, 1), VoucherMode::Cash))
            .unwrap();
        books
            .add_expense(Expense::new("e2", "s1", "Security", dec!(450), date(2024, 7, 1), VoucherMode::Cash))
            .unwrap();
        books
            .add_expense(Expense::new("e3", "s1", "Electricity", dec!(600), date(2024, 8, 1), VoucherMode::Online))
            .unwrap();
        books
    }

    #[test]
    fn test_flows_are_period_bounded() {
        let books = sample_books();
        let view = books.view("s1").unwrap();
        let fy = compute_period(&view, FinancialYear::new(2025));

        assert_eq!(fy.total_billed, dec!(3100));
        assert_eq!(fy.collected_amount, dec!(1500));
        assert_eq!(fy.maintenance_collections, dec!(2600));
        assert_eq!(fy.total_other_income, dec!(300));
        assert_eq!(fy.total_income, dec!(3400));
        assert_eq!(fy.total_expenses, dec!(1050));
        assert_eq!(fy.net_surplus, dec!(2350));
        assert_eq!(fy.expenses_by_category["Security"], dec!(450));
        assert_eq!(fy.expenses_by_category["Electricity"], dec!(600));
        assert_eq!(fy.income_entries.len(), 1);
    }

    #[test]
    fn test_stocks_are_cumulative() {
        let books = sample_books();
        let view = books.view("s1").unwrap();
        let fy = compute_period(&view, FinancialYear::new(2025));

        // b4 only; b5 is generated after the year end.
        assert_eq!(fy.pending_bills_amount, dec!(1600));
        assert_eq!(fy.total_opening_balance, dec!(800));
        assert_eq!(fy.total_receivables, dec!(2400));

        // 1000 + 1100 + 1500 + 300 + 200 - 400 - 450 - 600
        assert_eq!(fy.cash_in_hand, dec!(2650));
        assert_eq!(fy.current_assets, dec!(5050));
        assert_eq!(fy.total_assets, fy.current_assets);
        assert_eq!(fy.total_funds, fy.total_assets);
    }

    #[test]
    fn test_previous_year_receivables_include_later_paid_bill() {
        let books = sample_books();
        let view = books.view("s1").unwrap();
        let pair = compute_comparative(&view, FinancialYear::new(2025));

        assert_eq!(pair.previous.year, FinancialYear::new(2024));
        // b2 is paid today, so it no longer counts as pending as of March 2024.
        assert_eq!(pair.previous.pending_bills_amount, dec!(0));
        assert_eq!(pair.previous.total_billed, dec!(2100));
        assert_eq!(pair.previous.collected_amount, dec!(2100));
        assert_eq!(pair.previous.maintenance_collections, dec!(1000));
        assert_eq!(pair.previous.cash_in_hand, dec!(800));
    }

    #[test]
    fn test_deficit_year() {
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres"));
        books
            .add_expense(Expense::new("e1", "s1", "Lift Repair", dec!(5000), date(2024, 10, 1), VoucherMode::Cheque))
            .unwrap();
        let view = books.view("s1").unwrap();
        let fy = compute_period(&view, FinancialYear::new(2025));
        assert_eq!(fy.net_surplus, dec!(-5000));
        assert!(fy.is_deficit());
        assert_eq!(fy.cash_in_hand, dec!(-5000));
    }

    #[test]
    fn test_empty_society_is_all_zero() {
        let books = SocietyBooks::new(Society::new("s1", "New Society"));
        let view = books.view("s1").unwrap();
        let pair = compute_comparative(&view, FinancialYear::new(2025));
        for fy in [&pair.current, &pair.previous] {
            assert_eq!(fy.total_income, Decimal::ZERO);
            assert_eq!(fy.total_expenses, Decimal::ZERO);
            assert_eq!(fy.net_surplus, Decimal::ZERO);
            assert_eq!(fy.total_receivables, Decimal::ZERO);
            assert_eq!(fy.cash_in_hand, Decimal::ZERO);
            assert_eq!(fy.total_funds, Decimal::ZERO);
            assert!(fy.expenses_by_category.is_empty());
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let books = sample_books();
        let view = books.view("s1").unwrap();
        let first = serde_json::to_string(&compute_comparative(&view, FinancialYear::new(2025))).unwrap();
        let second = serde_json::to_string(&compute_comparative(&view, FinancialYear::new(2025))).unwrap();
        assert_eq!(first, second);
    }
}
