use crate::error::{Result, SocietyError};
use crate::schema::{Bill, BillStatus, Expense, Income, PaymentDetails, Resident, Society};
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Read-only access to transaction records, partitioned by society.
pub trait TransactionStore {
    fn bills(&self, society_id: &str) -> Vec<&Bill>;
    fn expenses(&self, society_id: &str) -> Vec<&Expense>;
    fn incomes(&self, society_id: &str) -> Vec<&Income>;
    fn residents(&self, society_id: &str) -> Vec<&Resident>;
}

/// All records of one society, with period-bounded (`*_in_period`) and
/// cumulative (`*_as_of`) queries kept apart.
#[derive(Debug, Clone)]
pub struct SocietyView<'a> {
    pub society_id: String,
    pub bills: Vec<&'a Bill>,
    pub expenses: Vec<&'a Expense>,
    pub incomes: Vec<&'a Income>,
    pub residents: Vec<&'a Resident>,
}

impl<'a> SocietyView<'a> {
    pub fn new<S: TransactionStore + ?Sized>(store: &'a S, society_id: &str) -> Self {
        let view = Self {
            society_id: society_id.to_string(),
            bills: store.bills(society_id),
            expenses: store.expenses(society_id),
            incomes: store.incomes(society_id),
            residents: store.residents(society_id),
        };
        debug!(
            "Society {} view: {} bills, {} expenses, {} incomes, {} residents",
            society_id,
            view.bills.len(),
            view.expenses.len(),
            view.incomes.len(),
            view.residents.len()
        );
        view
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
            && self.expenses.is_empty()
            && self.incomes.is_empty()
            && self.residents.is_empty()
    }

    pub fn bills_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &'a Bill> + '_ {
        self.bills
            .iter()
            .copied()
            .filter(move |b| b.generated_date >= start && b.generated_date <= end)
    }

    pub fn bills_as_of(&self, date: NaiveDate) -> impl Iterator<Item = &'a Bill> + '_ {
        self.bills
            .iter()
            .copied()
            .filter(move |b| b.generated_date <= date)
    }

    /// Paid bills with their payment details, whose payment date is in the period.
    pub fn payments_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = (&'a Bill, &'a PaymentDetails)> + '_ {
        self.bills
            .iter()
            .copied()
            .filter_map(|b| b.payment().map(|p| (b, p)))
            .filter(move |(_, p)| p.date >= start && p.date <= end)
    }

    pub fn payments_as_of(
        &self,
        date: NaiveDate,
    ) -> impl Iterator<Item = (&'a Bill, &'a PaymentDetails)> + '_ {
        self.bills
            .iter()
            .copied()
            .filter_map(|b| b.payment().map(|p| (b, p)))
            .filter(move |(_, p)| p.date <= date)
    }

    pub fn expenses_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &'a Expense> + '_ {
        self.expenses
            .iter()
            .copied()
            .filter(move |e| e.date >= start && e.date <= end)
    }

    pub fn expenses_as_of(&self, date: NaiveDate) -> impl Iterator<Item = &'a Expense> + '_ {
        self.expenses.iter().copied().filter(move |e| e.date <= date)
    }

    pub fn incomes_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &'a Income> + '_ {
        self.incomes
            .iter()
            .copied()
            .filter(move |i| i.date >= start && i.date <= end)
    }

    pub fn incomes_as_of(&self, date: NaiveDate) -> impl Iterator<Item = &'a Income> + '_ {
        self.incomes.iter().copied().filter(move |i| i.date <= date)
    }

    pub fn resident(&self, resident_id: &str) -> Option<&'a Resident> {
        self.residents.iter().copied().find(|r| r.id == resident_id)
    }

    pub fn bills_for(&self, resident_id: &str) -> Vec<&'a Bill> {
        self.bills
            .iter()
            .copied()
            .filter(|b| b.resident_id == resident_id)
            .collect()
    }

    pub fn total_opening_balance(&self) -> Decimal {
        self.residents.iter().map(|r| r.opening_balance).sum()
    }

    /// Date of the most recent bill, payment, income or expense.
    pub fn latest_transaction_date(&self) -> Option<NaiveDate> {
        let bill_dates = self
            .bills
            .iter()
            .flat_map(|b| [Some(b.generated_date), b.payment().map(|p| p.date)])
            .flatten();
        let expense_dates = self.expenses.iter().map(|e| e.date);
        let income_dates = self.incomes.iter().map(|i| i.date);
        bill_dates.chain(expense_dates).chain(income_dates).max()
    }
}

/// In-memory books for every society of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SocietyBooks {
    pub societies: Vec<Society>,
    #[serde(default)]
    pub residents: Vec<Resident>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub incomes: Vec<Income>,
}

impl SocietyBooks {
    pub fn new(society: Society) -> Self {
        Self {
            societies: vec![society],
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn view(&self, society_id: &str) -> Result<SocietyView<'_>> {
        self.society(society_id)?;
        Ok(SocietyView::new(self, society_id))
    }

    pub fn society(&self, society_id: &str) -> Result<&Society> {
        self.societies
            .iter()
            .find(|s| s.id == society_id)
            .ok_or_else(|| SocietyError::UnknownSociety(society_id.to_string()))
    }

    pub fn add_society(&mut self, society: Society) -> Result<()> {
        if self.societies.iter().any(|s| s.id == society.id) {
            return Err(SocietyError::DuplicateSociety(society.id));
        }
        info!("Adding society {} ({})", society.id, society.name);
        self.societies.push(society);
        Ok(())
    }

    /// Removes a society and every record partitioned under it. The last
    /// remaining society can never be deleted.
    pub fn delete_society(&mut self, society_id: &str) -> Result<Society> {
        let position = self
            .societies
            .iter()
            .position(|s| s.id == society_id)
            .ok_or_else(|| SocietyError::UnknownSociety(society_id.to_string()))?;

        if self.societies.len() == 1 {
            return Err(SocietyError::LastSociety(society_id.to_string()));
        }

        let removed = self.societies.remove(position);
        self.residents.retain(|r| r.society_id != society_id);
        self.bills.retain(|b| b.society_id != society_id);
        self.expenses.retain(|e| e.society_id != society_id);
        self.incomes.retain(|i| i.society_id != society_id);

        info!("Deleted society {} and its records", society_id);
        Ok(removed)
    }

    pub fn add_resident(&mut self, resident: Resident) -> Result<()> {
        self.society(&resident.society_id)?;
        if resident.sq_ft < Decimal::ZERO {
            return Err(SocietyError::NegativeAmount {
                field: format!("sq_ft of resident {}", resident.id),
                amount: resident.sq_ft,
            });
        }
        if self.residents.iter().any(|r| r.id == resident.id) {
            return Err(SocietyError::DuplicateId(resident.id));
        }
        info!(
            "Adding resident {} in unit {}",
            resident.name, resident.unit_number
        );
        self.residents.push(resident);
        Ok(())
    }

    pub fn update_resident(&mut self, resident: Resident) -> Result<()> {
        self.society(&resident.society_id)?;
        if resident.sq_ft < Decimal::ZERO {
            return Err(SocietyError::NegativeAmount {
                field: format!("sq_ft of resident {}", resident.id),
                amount: resident.sq_ft,
            });
        }
        let existing = self
            .residents
            .iter_mut()
            .find(|r| r.id == resident.id)
            .ok_or_else(|| SocietyError::UnknownResident(resident.id.clone()))?;
        *existing = resident;
        Ok(())
    }

    /// Removes a resident. Bills only reference residents, so they stay.
    pub fn remove_resident(&mut self, resident_id: &str) -> Result<Resident> {
        let position = self
            .residents
            .iter()
            .position(|r| r.id == resident_id)
            .ok_or_else(|| SocietyError::UnknownResident(resident_id.to_string()))?;
        info!("Removing resident {}", resident_id);
        Ok(self.residents.remove(position))
    }

    pub fn add_bill(&mut self, bill: Bill) -> Result<()> {
        self.society(&bill.society_id)?;
        if self.bills.iter().any(|b| b.id == bill.id) {
            return Err(SocietyError::DuplicateId(bill.id));
        }
        debug!(
            "Adding bill {} for unit {}: {}",
            bill.id, bill.unit_number, bill.total_amount
        );
        self.bills.push(bill);
        Ok(())
    }

    pub fn add_bills(&mut self, bills: Vec<Bill>) -> Result<usize> {
        let count = bills.len();
        for bill in bills {
            self.add_bill(bill)?;
        }
        info!("Added {} bills", count);
        Ok(count)
    }

    pub fn bill(&self, bill_id: &str) -> Result<&Bill> {
        self.bills
            .iter()
            .find(|b| b.id == bill_id)
            .ok_or_else(|| SocietyError::UnknownBill(bill_id.to_string()))
    }

    /// The only mutation a bill ever sees: Pending/Overdue to Paid.
    pub fn record_payment(&mut self, bill_id: &str, details: PaymentDetails) -> Result<&Bill> {
        let bill = self
            .bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or_else(|| SocietyError::UnknownBill(bill_id.to_string()))?;

        if bill.is_paid() {
            return Err(SocietyError::AlreadyPaid(bill_id.to_string()));
        }

        info!(
            "Recording {:?} payment of {} against bill {} on {}",
            details.mode, bill.total_amount, bill_id, details.date
        );
        bill.status = BillStatus::Paid(details);
        Ok(bill)
    }

    pub fn add_expense(&mut self, expense: Expense) -> Result<()> {
        self.society(&expense.society_id)?;
        if expense.amount < Decimal::ZERO {
            return Err(SocietyError::NegativeAmount {
                field: format!("expense {}", expense.id),
                amount: expense.amount,
            });
        }
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(SocietyError::DuplicateId(expense.id));
        }
        debug!(
            "Adding {:?} expense {} ({}): {}",
            expense.payment_mode, expense.id, expense.category, expense.amount
        );
        self.expenses.push(expense);
        Ok(())
    }

    pub fn add_income(&mut self, income: Income) -> Result<()> {
        self.society(&income.society_id)?;
        if income.amount < Decimal::ZERO {
            return Err(SocietyError::NegativeAmount {
                field: format!("income {}", income.id),
                amount: income.amount,
            });
        }
        if self.incomes.iter().any(|i| i.id == income.id) {
            return Err(SocietyError::DuplicateId(income.id));
        }
        debug!(
            "Adding income {} ({}): {}",
            income.id, income.category, income.amount
        );
        self.incomes.push(income);
        Ok(())
    }
}

impl TransactionStore for SocietyBooks {
    fn bills(&self, society_id: &str) -> Vec<&Bill> {
        self.bills
            .iter()
            .filter(|b| b.society_id == society_id)
            .collect()
    }

    fn expenses(&self, society_id: &str) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.society_id == society_id)
            .collect()
    }

    fn incomes(&self, society_id: &str) -> Vec<&Income> {
        self.incomes
            .iter()
            .filter(|i| i.society_id == society_id)
            .collect()
    }

    fn residents(&self, society_id: &str) -> Vec<&Resident> {
        self.residents
            .iter()
            .filter(|r| r.society_id == society_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BillPaymentMode, IncomeMode, LineItem, VoucherMode};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn books_with_two_societies() -> SocietyBooks {
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres"));
        books.add_society(Society::new("s2", "Blue Heights")).unwrap();
        for (id, society) in [("r1", "s1"), ("r2", "s2")] {
            books
                .add_resident(Resident::new(id, society, id, "A-1", dec!(500), dec!(0)))
                .unwrap();
        }
        let r1 = books.residents[0].clone();
        let r2 = books.residents[1].clone();
        let items = vec![LineItem::fixed("Maintenance", dec!(1000))];
        books
            .add_bill(Bill::new("b1", &r1, items.clone(), dec!(0), date(2024, 5, 1), date(2024, 5, 10)))
            .unwrap();
        books
            .add_bill(Bill::new("b2", &r2, items, dec!(0), date(2024, 5, 1), date(2024, 5, 10)))
            .unwrap();
        books
    }

    #[test]
    fn test_view_is_scoped_to_one_society() {
        let books = books_with_two_societies();
        let view = books.view("s1").unwrap();
        assert_eq!(view.bills.len(), 1);
        assert_eq!(view.bills[0].id, "b1");
        assert_eq!(view.residents.len(), 1);
        assert!(books.view("missing").is_err());
    }

    #[test]
    fn test_period_and_as_of_queries_differ() {
        let mut books = books_with_two_societies();
        books
            .add_expense(Expense::new("e1", "s1", "Repairs", dec!(200), date(2023, 6, 1), VoucherMode::Cash))
            .unwrap();
        books
            .add_expense(Expense::new("e2", "s1", "Repairs", dec!(300), date(2024, 6, 1), VoucherMode::Cash))
            .unwrap();

        let view = books.view("s1").unwrap();
        let in_period: Vec<_> = view
            .expenses_in_period(date(2024, 4, 1), date(2025, 3, 31))
            .collect();
        let as_of: Vec<_> = view.expenses_as_of(date(2025, 3, 31)).collect();
        assert_eq!(in_period.len(), 1);
        assert_eq!(as_of.len(), 2);
    }

    #[test]
    fn test_record_payment_only_once() {
        let mut books = books_with_two_societies();
        let details = PaymentDetails::new(date(2024, 5, 8), BillPaymentMode::Upi);

        let bill = books.record_payment("b1", details.clone()).unwrap();
        assert!(bill.is_paid());

        let again = books.record_payment("b1", details.clone());
        assert!(matches!(again, Err(SocietyError::AlreadyPaid(_))));

        let missing = books.record_payment("nope", details);
        assert!(matches!(missing, Err(SocietyError::UnknownBill(_))));
    }

    #[test]
    fn test_last_society_cannot_be_deleted() {
        let mut books = books_with_two_societies();
        let removed = books.delete_society("s2").unwrap();
        assert_eq!(removed.name, "Blue Heights");
        assert!(books.bills.iter().all(|b| b.society_id == "s1"));
        assert!(books.residents.iter().all(|r| r.society_id == "s1"));

        let result = books.delete_society("s1");
        assert!(matches!(result, Err(SocietyError::LastSociety(_))));
        assert_eq!(books.societies.len(), 1);
    }

    #[test]
    fn test_rejects_negative_amounts_and_unknown_society() {
        let mut books = books_with_two_societies();
        let negative = Expense::new("e1", "s1", "Repairs", dec!(-1), date(2024, 6, 1), VoucherMode::Cash);
        assert!(matches!(
            books.add_expense(negative),
            Err(SocietyError::NegativeAmount { .. })
        ));

        let stray = Income::new("i1", "s9", "Rent", dec!(10), date(2024, 6, 1), IncomeMode::Cash);
        assert!(matches!(
            books.add_income(stray),
            Err(SocietyError::UnknownSociety(_))
        ));

        let mut resident = books.residents[0].clone();
        resident.sq_ft = dec!(-10);
        assert!(books.update_resident(resident).is_err());
    }

    #[test]
    fn test_update_resident_keeps_partition_valid() {
        let mut books = books_with_two_societies();
        let mut moved = books.residents[0].clone();
        moved.society_id = "s9".to_string();
        assert!(matches!(
            books.update_resident(moved),
            Err(SocietyError::UnknownSociety(_))
        ));
        assert_eq!(books.residents[0].society_id, "s1");

        let mut renamed = books.residents[0].clone();
        renamed.name = "Asha Rao".to_string();
        books.update_resident(renamed).unwrap();
        assert_eq!(books.view("s1").unwrap().residents[0].name, "Asha Rao");
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut books = books_with_two_societies();
        books
            .record_payment("b2", PaymentDetails::new(date(2024, 5, 9), BillPaymentMode::Cash))
            .unwrap();
        let json = books.to_json().unwrap();
        let restored = SocietyBooks::from_json_str(&json).unwrap();
        assert_eq!(restored.bills, books.bills);
        assert_eq!(restored.societies, books.societies);
    }

    #[test]
    fn test_latest_transaction_date_includes_payments() {
        let mut books = books_with_two_societies();
        books
            .record_payment("b1", PaymentDetails::new(date(2024, 7, 15), BillPaymentMode::Cheque))
            .unwrap();
        let view = books.view("s1").unwrap();
        assert_eq!(view.latest_transaction_date(), Some(date(2024, 7, 15)));
    }
}
