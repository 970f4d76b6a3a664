use crate::error::Result;
use crate::period::parse_date;
use crate::schema::{Bill, BillPaymentMode, LineItem, OccupancyType, PaymentDetails, Resident};
use crate::store::SocietyView;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::str::FromStr;

/// Outcome of one CSV import. Bad rows never abort the import; they are
/// counted in `skipped` and described in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl<T> ImportReport<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn imported(&self) -> usize {
        self.records.len()
    }

    fn skip(&mut self, line: usize, reason: String) {
        warn!("Skipping CSV line {}: {}", line, reason);
        self.skipped += 1;
        self.errors.push(format!("line {}: {}", line, reason));
    }
}

/// A payment to apply with `SocietyBooks::record_payment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReceiptRow {
    pub bill_id: String,
    pub details: PaymentDetails,
}

/// One line of a bank statement. Credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BankStatementLine {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub reference: Option<String>,
}

fn rows<R: Read>(reader: R) -> Result<Vec<(usize, csv::StringRecord)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push((idx + 1, record));
    }
    Ok(rows)
}

/// Accepts `1,500.00`, `₹1500` and `Rs. 1500`.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value
        .trim()
        .trim_start_matches("Rs.")
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

fn optional(record: &csv::StringRecord, idx: usize) -> Option<String> {
    let value = field(record, idx);
    (!value.is_empty()).then(|| value.to_string())
}

/// Only the first row can be a header, and only when no field holds a digit.
/// Any other first row is data and is validated like the rest.
fn is_header(position: usize, record: &csv::StringRecord) -> bool {
    position == 0
        && !record
            .iter()
            .any(|field| field.chars().any(|c| c.is_ascii_digit()))
}

fn parse_occupancy(value: &str) -> Option<OccupancyType> {
    match value.to_lowercase().as_str() {
        "" | "owner" => Some(OccupancyType::Owner),
        "tenant" => Some(OccupancyType::Tenant),
        _ => None,
    }
}

pub fn parse_payment_mode(value: &str) -> Option<BillPaymentMode> {
    match value.to_lowercase().replace(['_', '-'], " ").as_str() {
        "cash" => Some(BillPaymentMode::Cash),
        "cheque" | "check" => Some(BillPaymentMode::Cheque),
        "upi" => Some(BillPaymentMode::Upi),
        "bank transfer" | "banktransfer" | "neft" | "rtgs" | "imps" | "online" => {
            Some(BillPaymentMode::BankTransfer)
        }
        _ => None,
    }
}

/// Columns: name, unit, sqft, opening balance, occupancy, phone, email.
/// Resident ids are `{society_id}-{unit}`. Units already in the society are
/// skipped.
pub fn import_residents<R: Read>(
    reader: R,
    view: &SocietyView<'_>,
) -> Result<ImportReport<Resident>> {
    let society_id = view.society_id.as_str();
    let mut report = ImportReport::new();
    let mut units: HashSet<String> = view
        .residents
        .iter()
        .map(|r| r.unit_number.clone())
        .collect();

    for (position, (line, record)) in rows(reader)?.into_iter().enumerate() {
        if is_header(position, &record) {
            debug!("Treating line {} as a header row", line);
            continue;
        }

        let name = field(&record, 0);
        let unit = field(&record, 1);
        if name.is_empty() || unit.is_empty() {
            report.skip(line, "name and unit are required".to_string());
            continue;
        }
        let sq_ft = match parse_amount(field(&record, 2)) {
            Some(sq_ft) if sq_ft >= Decimal::ZERO => sq_ft,
            _ => {
                report.skip(line, format!("invalid area '{}'", field(&record, 2)));
                continue;
            }
        };
        let opening = match field(&record, 3) {
            "" => Decimal::ZERO,
            raw => match parse_amount(raw) {
                Some(amount) => amount,
                None => {
                    report.skip(line, format!("invalid opening balance '{}'", raw));
                    continue;
                }
            },
        };
        let Some(occupancy) = parse_occupancy(field(&record, 4)) else {
            report.skip(line, format!("unknown occupancy '{}'", field(&record, 4)));
            continue;
        };
        if !units.insert(unit.to_string()) {
            report.skip(line, format!("unit {} is already registered", unit));
            continue;
        }

        let mut resident = Resident::new(
            format!("{}-{}", society_id, unit),
            society_id,
            name,
            unit,
            sq_ft,
            opening,
        );
        resident.occupancy = occupancy;
        resident.phone = optional(&record, 5);
        resident.email = optional(&record, 6);
        report.records.push(resident);
    }

    info!(
        "Imported {} residents for society {} ({} skipped)",
        report.imported(),
        society_id,
        report.skipped
    );
    Ok(report)
}

/// Columns: unit, description, amount, generated date, due date. Units are
/// resolved against the society's residents.
pub fn import_bills<R: Read>(reader: R, view: &SocietyView<'_>) -> Result<ImportReport<Bill>> {
    let mut report = ImportReport::new();
    let mut ids: HashSet<String> = view.bills.iter().map(|b| b.id.clone()).collect();

    for (position, (line, record)) in rows(reader)?.into_iter().enumerate() {
        if is_header(position, &record) {
            debug!("Treating line {} as a header row", line);
            continue;
        }

        let unit = field(&record, 0);
        let Some(resident) = view.residents.iter().find(|r| r.unit_number == unit) else {
            report.skip(line, format!("unknown unit '{}'", unit));
            continue;
        };
        let amount = match parse_amount(field(&record, 2)) {
            Some(amount) if amount >= Decimal::ZERO => amount,
            _ => {
                report.skip(line, format!("invalid amount '{}'", field(&record, 2)));
                continue;
            }
        };
        let (generated, due) = match (
            parse_date(field(&record, 3)),
            parse_date(field(&record, 4)),
        ) {
            (Ok(generated), Ok(due)) => (generated, due),
            (Err(e), _) | (_, Err(e)) => {
                report.skip(line, e.to_string());
                continue;
            }
        };

        let id = format!("{}-{}", unit, generated.format("%Y%m%d"));
        if !ids.insert(id.clone()) {
            report.skip(line, format!("bill {} already exists", id));
            continue;
        }

        let description = match field(&record, 1) {
            "" => "Maintenance",
            text => text,
        };
        report.records.push(Bill::new(
            id,
            resident,
            vec![LineItem::fixed(description, amount)],
            Decimal::ZERO,
            generated,
            due,
        ));
    }

    info!(
        "Imported {} bills for society {} ({} skipped)",
        report.imported(),
        view.society_id,
        report.skipped
    );
    Ok(report)
}

/// Columns: bill id, payment date, mode, reference. Rows naming an unknown
/// or already paid bill are skipped, as is a second receipt for one bill.
pub fn import_receipts<R: Read>(
    reader: R,
    view: &SocietyView<'_>,
) -> Result<ImportReport<ReceiptRow>> {
    let mut report = ImportReport::new();
    let mut settled = HashSet::new();

    for (position, (line, record)) in rows(reader)?.into_iter().enumerate() {
        if is_header(position, &record) {
            debug!("Treating line {} as a header row", line);
            continue;
        }
        let bill_id = field(&record, 0);

        match view.bills.iter().find(|b| b.id == bill_id) {
            None => {
                report.skip(line, format!("unknown bill '{}'", bill_id));
                continue;
            }
            Some(bill) if bill.is_paid() => {
                report.skip(line, format!("bill {} is already paid", bill_id));
                continue;
            }
            Some(_) => {}
        }
        if !settled.insert(bill_id.to_string()) {
            report.skip(line, format!("bill {} has more than one receipt", bill_id));
            continue;
        }

        let date = match parse_date(field(&record, 1)) {
            Ok(date) => date,
            Err(e) => {
                report.skip(line, e.to_string());
                continue;
            }
        };
        let Some(mode) = parse_payment_mode(field(&record, 2)) else {
            report.skip(line, format!("unknown payment mode '{}'", field(&record, 2)));
            continue;
        };

        let mut details = PaymentDetails::new(date, mode);
        details.reference = optional(&record, 3);
        report.records.push(ReceiptRow {
            bill_id: bill_id.to_string(),
            details,
        });
    }

    info!(
        "Matched {} receipts for society {} ({} skipped)",
        report.imported(),
        view.society_id,
        report.skipped
    );
    Ok(report)
}

/// Columns: date, description, amount (signed), reference.
pub fn import_bank_statement<R: Read>(reader: R) -> Result<ImportReport<BankStatementLine>> {
    let mut report = ImportReport::new();

    for (position, (line, record)) in rows(reader)?.into_iter().enumerate() {
        if is_header(position, &record) {
            debug!("Treating line {} as a header row", line);
            continue;
        }

        let date = match parse_date(field(&record, 0)) {
            Ok(date) => date,
            Err(e) => {
                report.skip(line, e.to_string());
                continue;
            }
        };
        let Some(amount) = parse_amount(field(&record, 2)) else {
            report.skip(line, format!("invalid amount '{}'", field(&record, 2)));
            continue;
        };

        report.records.push(BankStatementLine {
            id: format!("BANK-{}", report.records.len() + 1),
            date,
            description: field(&record, 1).to_string(),
            amount,
            reference: optional(&record, 3),
        });
    }

    info!(
        "Read {} bank statement lines ({} skipped)",
        report.imported(),
        report.skipped
    );
    Ok(report)
}
