use chrono::NaiveDate;
use rust_decimal_macros::dec;
use society_accounts::*;

fn main() -> anyhow::Result<()> {
    let config = SocietyConfig::from_json_str(
        r#"{
            "society": {
                "id": "ga",
                "name": "Green Acres Co-operative Housing Society",
                "registration_number": "MUM/HSG/1234"
            },
            "billing": {
                "charge_heads": [
                    { "description": "Maintenance", "charge_type": "PerArea", "rate": "2.5" },
                    { "description": "Sinking Fund", "charge_type": "Fixed", "rate": "300" },
                    { "description": "Repair Fund", "charge_type": "Fixed", "rate": "200" }
                ],
                "due_days": 15,
                "late_fee": "100",
                "bill_prefix": "GA"
            }
        }"#,
    )?;

    let mut books = SocietyBooks::new(config.society.clone());
    for (i, (name, unit, sq_ft, opening)) in [
        ("Asha Rao", "A-101", dec!(650), dec!(1200)),
        ("Ravi Shah", "A-102", dec!(900), dec!(0)),
        ("Meera Iyer", "B-201", dec!(1100), dec!(0)),
    ]
    .into_iter()
    .enumerate()
    {
        books.add_resident(Resident::new(
            format!("r{}", i + 1),
            "ga",
            name,
            unit,
            sq_ft,
            opening,
        ))?;
    }

    let generator = BillGenerator::new(&config.billing);
    for month in [4, 7, 10, 1] {
        let year = if month < 4 { 2025 } else { 2024 };
        let generated = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        let bills = generator.generate_bulk(&books.view("ga")?, generated);

        for bill in &bills {
            println!("{} {:>8} {}", bill.id, format_amount(bill.total_amount), bill.resident_name);
        }
        let ids: Vec<String> = bills.iter().map(|b| b.id.clone()).collect();
        books.add_bills(bills)?;

        // Everyone but A-101 pays within a week, alternating cash and UPI.
        for (n, id) in ids.iter().filter(|id| !id.ends_with("A-101")).enumerate() {
            let mode = if n % 2 == 0 {
                BillPaymentMode::Cash
            } else {
                BillPaymentMode::Upi
            };
            books.record_payment(id, PaymentDetails::new(generated + chrono::Days::new(6), mode))?;
        }
    }

    books.add_income(Income::new(
        "inc-1",
        "ga",
        "Hall Rent",
        dec!(5000),
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
        IncomeMode::Cash,
    ))?;
    books.add_expense(Expense::new(
        "exp-1",
        "ga",
        "Security",
        dec!(18000),
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        VoucherMode::Online,
    ))?;
    books.add_expense(Expense::new(
        "exp-2",
        "ga",
        "Electricity",
        dec!(4250.75),
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
        VoucherMode::Cheque,
    ))?;

    let report = SocietyReporter::annual_report_with_verification(
        &books,
        "ga",
        parse_financial_year("2024-25")?,
    )?;
    println!("\n{}", report.to_markdown());

    let view = books.view("ga")?;
    let as_of = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    println!("## Dues Register as on {}\n", as_of);
    for entry in dues_register(&view, as_of) {
        println!(
            "{} {:<12} outstanding {:>10} overdue {:>10}",
            entry.unit_number,
            entry.resident_name,
            format_amount(entry.outstanding),
            format_amount(entry.overdue)
        );
    }

    if let Some(asha) = view.resident("r1") {
        println!("\n## Ledger: {} ({})\n", asha.name, asha.unit_number);
        for row in MemberLedger::for_resident(&view, asha).entries {
            println!(
                "{:<10} {:<32} {:>10} {:>10} {:>10}",
                row.date.map(|d| d.to_string()).unwrap_or_default(),
                row.particulars,
                format_cell((!row.debit.is_zero()).then_some(row.debit)),
                format_cell((!row.credit.is_zero()).then_some(row.credit)),
                format_amount(row.balance)
            );
        }
    }

    let balances = compute_balances(&view);
    println!(
        "\nCash {} | Bank {} | Total {}",
        format_amount(balances.cash),
        format_amount(balances.bank),
        format_amount(balances.total())
    );

    std::fs::write("annual_report_2024_25.csv", report.trial_balance.to_csv()?)?;
    Ok(())
}
