use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Society {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Society {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            registration_number: None,
            address: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum OccupancyType {
    #[default]
    Owner,
    Tenant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Resident {
    pub id: String,
    pub society_id: String,
    pub name: String,
    pub unit_number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub occupancy: OccupancyType,

    #[schemars(description = "Carpet or built-up area in square feet, used for per-area charges")]
    pub sq_ft: Decimal,

    #[schemars(
        description = "Receivable carried from before the society adopted the system. Positive means the resident owes the society."
    )]
    #[serde(default)]
    pub opening_balance: Decimal,

    #[serde(default)]
    pub share_certificate: Option<String>,
    #[serde(default)]
    pub nominee: Option<String>,
}

impl Resident {
    pub fn new(
        id: impl Into<String>,
        society_id: impl Into<String>,
        name: impl Into<String>,
        unit_number: impl Into<String>,
        sq_ft: Decimal,
        opening_balance: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            society_id: society_id.into(),
            name: name.into(),
            unit_number: unit_number.into(),
            phone: None,
            email: None,
            occupancy: OccupancyType::Owner,
            sq_ft,
            opening_balance,
            share_certificate: None,
            nominee: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ChargeType {
    #[schemars(description = "Same amount for every unit")]
    Fixed,
    #[schemars(description = "Rate multiplied by the unit's area in square feet")]
    PerArea,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LineItem {
    pub description: String,
    pub charge_type: ChargeType,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        charge_type: ChargeType,
        rate: Decimal,
        sq_ft: Decimal,
    ) -> Self {
        let amount = match charge_type {
            ChargeType::Fixed => rate,
            ChargeType::PerArea => rate * sq_ft,
        };
        Self {
            description: description.into(),
            charge_type,
            rate,
            amount,
        }
    }

    pub fn fixed(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, ChargeType::Fixed, amount, Decimal::ZERO)
    }
}

/// How a maintenance bill was settled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum BillPaymentMode {
    Cash,
    Cheque,
    #[serde(rename = "UPI")]
    Upi,
    BankTransfer,
}

impl BillPaymentMode {
    pub fn is_cash(&self) -> bool {
        matches!(self, BillPaymentMode::Cash)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PaymentDetails {
    pub date: NaiveDate,
    pub mode: BillPaymentMode,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl PaymentDetails {
    pub fn new(date: NaiveDate, mode: BillPaymentMode) -> Self {
        Self {
            date,
            mode,
            reference: None,
            remarks: None,
        }
    }
}

/// A bill is paid exactly when it carries its payment details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "status", content = "payment_details", rename_all = "PascalCase")]
pub enum BillStatus {
    Pending,
    Overdue,
    Paid(PaymentDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Bill {
    pub id: String,
    pub society_id: String,
    pub resident_id: String,
    pub resident_name: String,
    pub unit_number: String,
    pub items: Vec<LineItem>,

    #[schemars(description = "Interest or late fee added on top of the line items")]
    #[serde(default)]
    pub interest: Decimal,

    #[schemars(description = "Sum of line item amounts plus interest")]
    pub total_amount: Decimal,

    pub due_date: NaiveDate,
    pub generated_date: NaiveDate,

    #[serde(flatten)]
    pub status: BillStatus,
}

impl Bill {
    pub fn new(
        id: impl Into<String>,
        resident: &Resident,
        items: Vec<LineItem>,
        interest: Decimal,
        generated_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let total_amount = items.iter().map(|item| item.amount).sum::<Decimal>() + interest;
        Self {
            id: id.into(),
            society_id: resident.society_id.clone(),
            resident_id: resident.id.clone(),
            resident_name: resident.name.clone(),
            unit_number: resident.unit_number.clone(),
            items,
            interest,
            total_amount,
            due_date,
            generated_date,
            status: BillStatus::Pending,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.status, BillStatus::Paid(_))
    }

    pub fn payment(&self) -> Option<&PaymentDetails> {
        match &self.status {
            BillStatus::Paid(details) => Some(details),
            _ => None,
        }
    }

    /// Unpaid and past its due date on `as_of`.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        match self.status {
            BillStatus::Paid(_) => false,
            BillStatus::Overdue => true,
            BillStatus::Pending => as_of > self.due_date,
        }
    }
}

/// Payment mode of a voucher. Journal, debit-note and credit-note entries are
/// memorandum entries and never move cash or bank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum VoucherMode {
    Cash,
    Cheque,
    Online,
    Journal,
    DebitNote,
    CreditNote,
}

impl VoucherMode {
    pub fn is_memorandum(&self) -> bool {
        matches!(
            self,
            VoucherMode::Journal | VoucherMode::DebitNote | VoucherMode::CreditNote
        )
    }

    pub fn moves_cash(&self) -> bool {
        matches!(self, VoucherMode::Cash)
    }

    pub fn moves_bank(&self) -> bool {
        !self.moves_cash() && !self.is_memorandum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct AccountClassification {
    pub main_group: String,
    #[serde(default)]
    pub account_head_id: Option<String>,
    #[serde(default)]
    pub account_head_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Expense {
    pub id: String,
    pub society_id: String,
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    pub payment_mode: VoucherMode,
    #[serde(default)]
    pub reference_no: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub classification: Option<AccountClassification>,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        society_id: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        payment_mode: VoucherMode,
    ) -> Self {
        Self {
            id: id.into(),
            society_id: society_id.into(),
            category: category.into(),
            amount,
            date,
            description: String::new(),
            vendor: String::new(),
            payment_mode,
            reference_no: None,
            bank_name: None,
            classification: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum IncomeMode {
    BankTransfer,
    Cheque,
    Cash,
}

impl IncomeMode {
    pub fn is_cash(&self) -> bool {
        matches!(self, IncomeMode::Cash)
    }
}

/// Non-maintenance receipt such as interest, rent or a donation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Income {
    pub id: String,
    pub society_id: String,
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payer: String,
    pub mode: IncomeMode,
}

impl Income {
    pub fn new(
        id: impl Into<String>,
        society_id: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        mode: IncomeMode,
    ) -> Self {
        Self {
            id: id.into(),
            society_id: society_id.into(),
            category: category.into(),
            amount,
            date,
            description: String::new(),
            payer: String::new(),
            mode,
        }
    }
}
