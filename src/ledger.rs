use crate::schema::{Bill, Resident};
use crate::store::SocietyView;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerEntry {
    /// `None` only for the opening balance row.
    pub date: Option<NaiveDate>,
    pub particulars: String,
    pub reference: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

/// One resident's account: opening balance, then a debit per bill and a
/// credit per payment in date order, with a running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberLedger {
    pub resident_id: String,
    pub resident_name: String,
    pub unit_number: String,
    pub entries: Vec<LedgerEntry>,
}

impl MemberLedger {
    pub fn build(resident: &Resident, bills: &[&Bill]) -> Self {
        let mut movements: Vec<(NaiveDate, String, Option<String>, Decimal, Decimal)> =
            Vec::with_capacity(bills.len() * 2);

        for bill in bills.iter().filter(|b| b.resident_id == resident.id) {
            movements.push((
                bill.generated_date,
                format!("Maintenance bill {}", bill.id),
                Some(bill.id.clone()),
                bill.total_amount,
                Decimal::ZERO,
            ));
            if let Some(payment) = bill.payment() {
                movements.push((
                    payment.date,
                    format!("Payment received ({:?})", payment.mode),
                    payment.reference.clone().or_else(|| Some(bill.id.clone())),
                    Decimal::ZERO,
                    bill.total_amount,
                ));
            }
        }

        // Stable: same-day rows keep insertion order.
        movements.sort_by_key(|(date, ..)| *date);

        let mut entries = Vec::with_capacity(movements.len() + 1);
        let mut balance = resident.opening_balance;
        entries.push(LedgerEntry {
            date: None,
            particulars: "Opening Balance".to_string(),
            reference: None,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            balance,
        });

        for (date, particulars, reference, debit, credit) in movements {
            balance += debit - credit;
            entries.push(LedgerEntry {
                date: Some(date),
                particulars,
                reference,
                debit,
                credit,
                balance,
            });
        }

        debug!(
            "Ledger for {} ({}): {} rows, closing {}",
            resident.name,
            resident.unit_number,
            entries.len(),
            balance
        );

        Self {
            resident_id: resident.id.clone(),
            resident_name: resident.name.clone(),
            unit_number: resident.unit_number.clone(),
            entries,
        }
    }

    pub fn for_resident(view: &SocietyView<'_>, resident: &Resident) -> Self {
        Self::build(resident, &view.bills_for(&resident.id))
    }

    pub fn closing_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|e| e.balance)
            .unwrap_or_default()
    }

    pub fn total_debits(&self) -> Decimal {
        self.entries.iter().map(|e| e.debit).sum()
    }

    pub fn total_credits(&self) -> Decimal {
        self.entries.iter().map(|e| e.credit).sum()
    }
}

/// What a resident owes today, computed without building the ledger.
pub fn current_balance(resident: &Resident, bills: &[&Bill]) -> Decimal {
    resident.opening_balance
        + bills
            .iter()
            .filter(|b| b.resident_id == resident.id && !b.is_paid())
            .map(|b| b.total_amount)
            .sum::<Decimal>()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DuesEntry {
    pub resident_id: String,
    pub resident_name: String,
    pub unit_number: String,
    pub opening_balance: Decimal,
    pub unpaid_bills: usize,
    pub outstanding: Decimal,
    /// Unpaid bills past their due date on the register date.
    pub overdue: Decimal,
}

/// Outstanding dues of every resident with a non-zero balance, by unit.
pub fn dues_register(view: &SocietyView<'_>, as_of: NaiveDate) -> Vec<DuesEntry> {
    let mut register: Vec<DuesEntry> = view
        .residents
        .iter()
        .map(|resident| {
            let bills = view.bills_for(&resident.id);
            let unpaid: Vec<&&Bill> = bills.iter().filter(|b| !b.is_paid()).collect();
            DuesEntry {
                resident_id: resident.id.clone(),
                resident_name: resident.name.clone(),
                unit_number: resident.unit_number.clone(),
                opening_balance: resident.opening_balance,
                unpaid_bills: unpaid.len(),
                outstanding: current_balance(resident, &bills),
                overdue: unpaid
                    .iter()
                    .filter(|b| b.is_overdue(as_of))
                    .map(|b| b.total_amount)
                    .sum(),
            }
        })
        .filter(|entry| !entry.outstanding.is_zero())
        .collect();

    register.sort_by(|a, b| a.unit_number.cmp(&b.unit_number));
    register
}
