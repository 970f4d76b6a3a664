use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use society_accounts::statements::income_expenditure::MAINTENANCE_LABEL;
use society_accounts::statements::trial_balance::{MAINTENANCE_INCOME, OPENING_RESERVES};
use society_accounts::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn maintenance_bill(
    id: &str,
    resident: &Resident,
    amount: Decimal,
    generated: NaiveDate,
    due: NaiveDate,
) -> Bill {
    Bill::new(
        id,
        resident,
        vec![LineItem::fixed("Maintenance", amount)],
        Decimal::ZERO,
        generated,
        due,
    )
}

/// Two years of activity for a three-flat society.
fn green_acres() -> Result<SocietyBooks> {
    let mut books = SocietyBooks::new(Society::new("ga", "Green Acres CHS"));

    let config = SocietyConfig::from_json_str(
        r#"{
            "society": { "id": "ga", "name": "Green Acres CHS" },
            "billing": {
                "charge_heads": [
                    { "description": "Maintenance", "charge_type": "PerArea", "rate": "2" },
                    { "description": "Sinking Fund", "charge_type": "Fixed", "rate": "200" }
                ],
                "due_days": 10,
                "late_fee": "50",
                "bill_prefix": "GA"
            }
        }"#,
    )?;

    let residents = import_residents(
        "Name,Unit,SqFt,Opening,Occupancy\n\
         Asha Rao,A-101,500,1000,Owner\n\
         Ravi Shah,A-102,650,0,Tenant\n\
         Meera Iyer,B-201,800,250,Owner\n"
            .as_bytes(),
        &books.view("ga")?,
    )?;
    for resident in residents.records {
        books.add_resident(resident)?;
    }

    // Each run sees the receipts recorded before it.
    let generator = BillGenerator::new(&config.billing);
    let runs = [
        (
            date(2024, 1, 1),
            "GA-202401-A-101,2024-01-05,Cash,\n\
             GA-202401-A-102,2024-01-08,UPI,UTR881\n\
             GA-202401-B-201,2024-04-02,Cheque,000123\n",
        ),
        (
            date(2024, 7, 1),
            "GA-202407-A-102,2024-07-09,NEFT,\n\
             GA-202407-B-201,2024-07-03,Cash,\n",
        ),
        (date(2024, 10, 1), ""),
    ];
    for (generated, receipts_csv) in runs {
        let bills = generator.generate_bulk(&books.view("ga")?, generated);
        books.add_bills(bills)?;

        let receipts = import_receipts(receipts_csv.as_bytes(), &books.view("ga")?)?;
        assert_eq!(receipts.skipped, 0);
        for receipt in receipts.records {
            books.record_payment(&receipt.bill_id, receipt.details)?;
        }
    }

    books.add_income(Income::new("i1", "ga", "Hall Rent", dec!(1200), date(2024, 2, 10), IncomeMode::Cash))?;
    books.add_income(Income::new("i2", "ga", "FD Interest", dec!(340.75), date(2024, 9, 30), IncomeMode::BankTransfer))?;
    books.add_expense(Expense::new("e1", "ga", "Painting", dec!(2000), date(2024, 3, 15), VoucherMode::Cheque))?;
    books.add_expense(Expense::new("e2", "ga", "Security", dec!(900), date(2024, 3, 31), VoucherMode::Cash))?;
    books.add_expense(Expense::new("e3", "ga", "Security", dec!(900), date(2024, 8, 31), VoucherMode::Cash))?;
    books.add_expense(Expense::new("e4", "ga", "Electricity", dec!(1450.50), date(2024, 9, 5), VoucherMode::Online))?;

    Ok(books)
}

#[test]
fn test_cash_and_bank_agree_with_cash_position() -> Result<()> {
    let books = green_acres()?;
    let view = books.view("ga")?;

    let snapshot = compute_balances(&view);
    let latest = view.latest_transaction_date().unwrap();
    let cumulative = PeriodCalculator::new(&view).cash_as_of(latest);

    assert_eq!(snapshot.total(), cumulative);
    verify_books(&view)?;
    Ok(())
}

#[test]
fn test_every_ledger_matches_current_balance() -> Result<()> {
    let books = green_acres()?;
    let view = books.view("ga")?;

    for resident in &view.residents {
        let ledger = MemberLedger::for_resident(&view, resident);
        let bills = view.bills_for(&resident.id);
        assert_eq!(ledger.closing_balance(), current_balance(resident, &bills));
        // Rebuilding gives the same rows.
        assert_eq!(ledger, MemberLedger::for_resident(&view, resident));
    }
    Ok(())
}

#[test]
fn test_receipts_and_payments_balance_every_year() -> Result<()> {
    let books = green_acres()?;
    let view = books.view("ga")?;

    for year in [2024, 2025] {
        let report = AnnualReport::build(&view, FinancialYear::new(year));
        let rp = &report.receipts_payments;
        assert_eq!(rp.total_receipts, rp.total_payments + rp.closing_balance);
        assert_eq!(rp.closing_balance, report.financials.current.cash_in_hand);
    }
    Ok(())
}

#[test]
fn test_category_only_in_previous_year_renders_blank() -> Result<()> {
    let books = green_acres()?;
    let report = AnnualReport::build(&books.view("ga")?, FinancialYear::new(2025));
    let ie = &report.income_expenditure;

    let painting = ie.expenditure.iter().find(|r| r.label == "Painting").unwrap();
    assert_eq!(painting.current, None);
    assert_eq!(painting.previous, Some(dec!(2000)));

    let electricity = ie.expenditure.iter().find(|r| r.label == "Electricity").unwrap();
    assert_eq!(electricity.previous, None);

    let security = ie.expenditure.iter().find(|r| r.label == "Security").unwrap();
    assert_eq!(security.current, Some(dec!(900)));
    assert_eq!(security.previous, Some(dec!(900)));

    let maintenance = ie.income.iter().find(|r| r.label == MAINTENANCE_LABEL).unwrap();
    assert!(maintenance.current.is_some() && maintenance.previous.is_some());

    let csv = ie.to_csv()?;
    assert!(csv.contains("2000.00,Painting,,"));
    assert!(!csv.contains("0.00,Painting,0.00"));
    Ok(())
}

#[test]
fn test_trial_balance_credit_side() -> Result<()> {
    let books = green_acres()?;
    let view = books.view("ga")?;

    for year in [2024, 2025] {
        let fy = compute_period(&view, FinancialYear::new(year));
        let tb = TrialBalance::from_financials(&fy);

        assert_eq!(tb.total_credit, fy.total_income + view.total_opening_balance());
        let maintenance = tb
            .rows
            .iter()
            .find(|r| r.account_name == MAINTENANCE_INCOME)
            .unwrap();
        assert_eq!(maintenance.credit, fy.total_billed);
        let reserves = tb
            .rows
            .iter()
            .find(|r| r.account_name == OPENING_RESERVES)
            .unwrap();
        assert_eq!(reserves.credit, dec!(1250));
    }
    Ok(())
}

#[test]
fn test_calculator_is_deterministic() -> Result<()> {
    let books = green_acres()?;
    let view = books.view("ga")?;
    let year = FinancialYear::new(2025);

    let first = serde_json::to_string(&compute_comparative(&view, year))?;
    let second = serde_json::to_string(&compute_comparative(&view, year))?;
    assert_eq!(first, second);

    let report = prepare_annual_report(&books, "ga", year)?;
    assert_eq!(report.to_json()?, prepare_annual_report(&books, "ga", year)?.to_json()?);
    Ok(())
}

#[test]
fn test_upi_payment_lands_in_bank() -> Result<()> {
    let mut books = SocietyBooks::new(Society::new("s1", "Sunrise CHS"));
    let resident = Resident::new("r1", "s1", "Kiran", "C-301", dec!(750), dec!(0));
    books.add_resident(resident.clone())?;
    books.add_bill(maintenance_bill(
        "B100",
        &resident,
        dec!(1500),
        date(2024, 5, 1),
        date(2024, 5, 10),
    ))?;
    books.record_payment("B100", PaymentDetails::new(date(2024, 5, 8), BillPaymentMode::Upi))?;

    let view = books.view("s1")?;
    let snapshot = compute_balances(&view);
    assert_eq!(snapshot.cash, dec!(0));
    assert_eq!(snapshot.bank, dec!(1500));

    let fy = compute_period(&view, FinancialYear::new(2025));
    assert_eq!(fy.total_billed, dec!(1500));
    assert_eq!(fy.collected_amount, dec!(1500));
    assert_eq!(fy.cash_in_hand, dec!(1500));
    assert_eq!(fy.pending_bills_amount, dec!(0));

    // A second payment on the same bill is refused.
    let again = books.record_payment("B100", PaymentDetails::new(date(2024, 5, 9), BillPaymentMode::Cash));
    assert!(matches!(again, Err(SocietyError::AlreadyPaid(_))));
    Ok(())
}

#[test]
fn test_opening_balance_plus_unpaid_bill() -> Result<()> {
    let mut books = SocietyBooks::new(Society::new("s1", "Sunrise CHS"));
    let resident = Resident::new("r1", "s1", "Kiran", "C-301", dec!(750), dec!(1000));
    books.add_resident(resident.clone())?;
    books.add_bill(maintenance_bill(
        "B1",
        &resident,
        dec!(500),
        date(2024, 6, 1),
        date(2024, 6, 10),
    ))?;

    let view = books.view("s1")?;
    let bills = view.bills_for("r1");
    assert_eq!(current_balance(&resident, &bills), dec!(1500));
    assert_eq!(MemberLedger::for_resident(&view, &resident).closing_balance(), dec!(1500));

    let register = dues_register(&view, date(2024, 6, 30));
    assert_eq!(register.len(), 1);
    assert_eq!(register[0].outstanding, dec!(1500));
    assert_eq!(register[0].overdue, dec!(500));
    Ok(())
}

#[test]
fn test_empty_society_reports_zero() -> Result<()> {
    let books = SocietyBooks::new(Society::new("new", "Fresh Start CHS"));
    let view = books.view("new")?;
    let fy = compute_period(&view, FinancialYear::new(2025));

    for amount in [
        fy.total_billed,
        fy.collected_amount,
        fy.total_other_income,
        fy.total_income,
        fy.total_expenses,
        fy.net_surplus,
        fy.pending_bills_amount,
        fy.total_receivables,
        fy.cash_in_hand,
        fy.total_assets,
        fy.total_funds,
    ] {
        assert_eq!(amount, Decimal::ZERO);
    }

    let report = prepare_annual_report(&books, "new", FinancialYear::new(2025))?;
    assert_eq!(report.trial_balance.total_debit, Decimal::ZERO);
    assert_eq!(report.trial_balance.total_credit, Decimal::ZERO);
    assert!(report.trial_balance.to_markdown().contains("| **Total** | **0.00** | **0.00** |"));
    assert_eq!(compute_balances(&view), CashBankSnapshot::default());
    Ok(())
}

#[test]
fn test_session_snapshot_round_trip() -> Result<()> {
    let books = green_acres()?;
    let restored = SocietyBooks::from_json_str(&books.to_json()?)?;
    let year = FinancialYear::new(2025);
    assert_eq!(
        compute_comparative(&books.view("ga")?, year),
        compute_comparative(&restored.view("ga")?, year)
    );
    Ok(())
}

#[test]
fn test_late_fee_charged_on_arrears() -> Result<()> {
    let books = green_acres()?;
    // Asha never paid July, so October carries the late fee.
    let october = books.bill("GA-202410-A-101")?;
    assert_eq!(october.interest, dec!(50));
    assert_eq!(october.total_amount, dec!(1250));

    // Ravi paid July before October's run.
    assert_eq!(books.bill("GA-202410-A-102")?.interest, dec!(0));
    Ok(())
}

#[test]
fn test_schema_generation() -> Result<()> {
    let schema = SocietyConfig::schema_as_json()?;
    assert!(schema.contains("charge_heads"));
    let books_schema = serde_json::to_string(&schemars::schema_for!(SocietyBooks))?;
    assert!(books_schema.contains("opening_balance"));
    Ok(())
}
