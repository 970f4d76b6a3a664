use crate::config::BillingConfig;
use crate::schema::{Bill, LineItem, Resident};
use crate::store::SocietyView;
use chrono::{Days, NaiveDate};
use log::info;
use rust_decimal::Decimal;

/// Builds maintenance bills from the configured charge heads.
pub struct BillGenerator<'c> {
    config: &'c BillingConfig,
}

impl<'c> BillGenerator<'c> {
    pub fn new(config: &'c BillingConfig) -> Self {
        Self { config }
    }

    pub fn line_items(&self, resident: &Resident) -> Vec<LineItem> {
        self.config
            .charge_heads
            .iter()
            .map(|head| {
                LineItem::new(
                    head.description.clone(),
                    head.charge_type,
                    head.rate,
                    resident.sq_ft,
                )
            })
            .collect()
    }

    pub fn due_date(&self, generated: NaiveDate) -> NaiveDate {
        generated
            .checked_add_days(Days::new(u64::from(self.config.due_days)))
            .unwrap_or(generated)
    }

    /// `PREFIX-YYYYMM-UNIT`, unique per unit per month.
    pub fn bill_id(&self, resident: &Resident, generated: NaiveDate) -> String {
        format!(
            "{}-{}-{}",
            self.config.bill_prefix,
            generated.format("%Y%m"),
            resident.unit_number
        )
    }

    pub fn generate_for(
        &self,
        resident: &Resident,
        generated: NaiveDate,
        interest: Decimal,
    ) -> Bill {
        Bill::new(
            self.bill_id(resident, generated),
            resident,
            self.line_items(resident),
            interest,
            generated,
            self.due_date(generated),
        )
    }

    /// One bill per resident of the society. Residents with an overdue bill on
    /// `generated` are charged the configured late fee.
    pub fn generate_bulk(&self, view: &SocietyView<'_>, generated: NaiveDate) -> Vec<Bill> {
        let bills: Vec<Bill> = view
            .residents
            .iter()
            .map(|resident| {
                let in_arrears = view
                    .bills_for(&resident.id)
                    .iter()
                    .any(|b| b.is_overdue(generated));
                let interest = if in_arrears {
                    self.config.late_fee
                } else {
                    Decimal::ZERO
                };
                self.generate_for(resident, generated, interest)
            })
            .collect();

        info!(
            "Generated {} bills for society {} dated {}, total {}",
            bills.len(),
            view.society_id,
            generated,
            bills.iter().map(|b| b.total_amount).sum::<Decimal>()
        );
        bills
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChargeHead;
    use crate::schema::{ChargeType, Society};
    use crate::store::SocietyBooks;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> BillingConfig {
        BillingConfig {
            charge_heads: vec![
                ChargeHead {
                    description: "Maintenance".to_string(),
                    charge_type: ChargeType::PerArea,
                    rate: dec!(3),
                },
                ChargeHead {
                    description: "Sinking Fund".to_string(),
                    charge_type: ChargeType::Fixed,
                    rate: dec!(250),
                },
            ],
            due_days: 10,
            late_fee: dec!(100),
            bill_prefix: "GA".to_string(),
        }
    }

    #[test]
    fn test_generate_single_bill() {
        let config = config();
        let generator = BillGenerator::new(&config);
        let resident = Resident::new("r1", "s1", "Asha", "A-101", dec!(500), dec!(0));
        let bill = generator.generate_for(&resident, date(2024, 5, 1), Decimal::ZERO);

        assert_eq!(bill.id, "GA-202405-A-101");
        assert_eq!(bill.items.len(), 2);
        assert_eq!(bill.items[0].amount, dec!(1500));
        assert_eq!(bill.total_amount, dec!(1750));
        assert_eq!(bill.due_date, date(2024, 5, 11));
    }

    #[test]
    fn test_bulk_applies_late_fee_to_arrears_only() {
        let config = config();
        let generator = BillGenerator::new(&config);
        let mut books = SocietyBooks::new(Society::new("s1", "Green Acres"));
        let asha = Resident::new("r1", "s1", "Asha", "A-101", dec!(500), dec!(0));
        let ravi = Resident::new("r2", "s1", "Ravi", "A-102", dec!(600), dec!(0));
        books.add_resident(asha.clone()).unwrap();
        books.add_resident(ravi.clone()).unwrap();

        let april = generator.generate_bulk(&books.view("s1").unwrap(), date(2024, 4, 1));
        assert_eq!(april.len(), 2);
        assert!(april.iter().all(|b| b.interest.is_zero()));
        books.add_bills(april).unwrap();
        books
            .record_payment(
                "GA-202404-A-102",
                crate::schema::PaymentDetails::new(
                    date(2024, 4, 5),
                    crate::schema::BillPaymentMode::Cash,
                ),
            )
            .unwrap();

        let may = generator.generate_bulk(&books.view("s1").unwrap(), date(2024, 5, 1));
        let asha_may = may.iter().find(|b| b.resident_id == "r1").unwrap();
        let ravi_may = may.iter().find(|b| b.resident_id == "r2").unwrap();
        assert_eq!(asha_may.interest, dec!(100));
        assert_eq!(asha_may.total_amount, dec!(1850));
        assert_eq!(ravi_may.interest, dec!(0));
        assert_eq!(ravi_may.total_amount, dec!(2050));
    }
}
