use crate::store::SocietyView;
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Live cash and bank position of one society.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CashBankSnapshot {
    pub cash: Decimal,
    pub bank: Decimal,
}

impl CashBankSnapshot {
    pub fn total(&self) -> Decimal {
        self.cash + self.bank
    }
}

/// Computes cash and bank balances from paid bills, other income and
/// expenses. Memorandum vouchers (journal, debit note, credit note) move
/// neither bucket.
pub struct BalanceAggregator<'v, 'a> {
    view: &'v SocietyView<'a>,
}

impl<'v, 'a> BalanceAggregator<'v, 'a> {
    pub fn new(view: &'v SocietyView<'a>) -> Self {
        Self { view }
    }

    pub fn snapshot(&self) -> CashBankSnapshot {
        let mut snapshot = CashBankSnapshot::default();

        let payments = self.view.bills.iter().filter_map(|b| b.payment().map(|p| (b, p)));
        for (bill, details) in payments {
            if details.mode.is_cash() {
                snapshot.cash += bill.total_amount;
            } else {
                snapshot.bank += bill.total_amount;
            }
        }

        for income in &self.view.incomes {
            if income.mode.is_cash() {
                snapshot.cash += income.amount;
            } else {
                snapshot.bank += income.amount;
            }
        }

        for expense in &self.view.expenses {
            if expense.payment_mode.moves_cash() {
                snapshot.cash -= expense.amount;
            } else if expense.payment_mode.moves_bank() {
                snapshot.bank -= expense.amount;
            }
        }

        debug!(
            "Society {} balances: cash {}, bank {}",
            self.view.society_id, snapshot.cash, snapshot.bank
        );
        snapshot
    }
}

pub fn compute_balances(view: &SocietyView<'_>) -> CashBankSnapshot {
    BalanceAggregator::new(view).snapshot()
}
