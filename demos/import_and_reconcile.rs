use dotenv::dotenv;
use society_accounts::llm::{DraftKind, DraftingAssistant, GeminiClient};
use society_accounts::*;
use std::error::Error;

const RESIDENTS: &str = "\
Name,Unit,SqFt,Opening,Occupancy,Phone,Email
Asha Rao,A-101,650,1200,Owner,9820000001,asha@example.com
Ravi Shah,A-102,900,0,Tenant,9820000002,
Meera Iyer,B-201,1100,0,Owner,,meera@example.com
";

const BILLS: &str = "\
Unit,Description,Amount,Generated,Due
A-101,Maintenance Apr,2125,2024-04-01,2024-04-15
A-102,Maintenance Apr,2750,2024-04-01,2024-04-15
B-201,Maintenance Apr,3250,2024-04-01,2024-04-15
C-999,Maintenance Apr,1000,2024-04-01,2024-04-15
";

const RECEIPTS: &str = "\
Bill,Date,Mode,Reference
A-102-20240401,2024-04-06,UPI,UTR5521
B-201-20240401,2024-04-09,Cheque,004512
";

const BANK: &str = "\
Date,Narration,Amount,Ref
06-04-2024,UPI/RAVI SHAH/MAINT,2750,UTR5521
10-04-2024,CLG/MEERA IYER,3250,004512
12-04-2024,NEFT/UNKNOWN,1800,
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");

    let mut books = SocietyBooks::new(Society::new("ga", "Green Acres CHS"));

    let residents = import_residents(RESIDENTS.as_bytes(), &books.view("ga")?)?;
    for resident in residents.records {
        books.add_resident(resident)?;
    }

    let bills = import_bills(BILLS.as_bytes(), &books.view("ga")?)?;
    println!("Bills: {} imported, {} skipped", bills.imported(), bills.skipped);
    for error in &bills.errors {
        println!("  {}", error);
    }
    books.add_bills(bills.records)?;

    let receipts = import_receipts(RECEIPTS.as_bytes(), &books.view("ga")?)?;
    for receipt in receipts.records {
        books.record_payment(&receipt.bill_id, receipt.details)?;
    }

    let statement = import_bank_statement(BANK.as_bytes())?;
    let view = books.view("ga")?;
    let start = parse_date("2024-04-01")?;
    let end = parse_date("2024-04-30")?;
    let book_side = book_transactions(&view, start, end);

    let assistant = DraftingAssistant::new(GeminiClient::new(api_key));

    println!("Asking the model to match {} book entries...", book_side.len());
    let suggestions = assistant
        .suggest_reconciliation(&book_side, &statement.records)
        .await?;
    for m in &suggestions.suggested_matches {
        println!(
            "  {} <-> {} ({:.0}%): {}",
            m.system_id,
            m.bank_id,
            m.confidence * 100.0,
            m.reason
        );
    }
    for anomaly in &suggestions.anomalies {
        println!("  anomaly {} [{:?}]: {}", anomaly.id, anomaly.source, anomaly.note);
    }
    println!("{}", suggestions.summary);

    let defaulters: Vec<String> = dues_register(&view, end)
        .into_iter()
        .filter(|d| !d.overdue.is_zero())
        .map(|d| format!("{} ({}): {}", d.unit_number, d.resident_name, format_amount(d.outstanding)))
        .collect();
    let notice = assistant
        .draft(
            DraftKind::Notice,
            &format!(
                "Remind the following members to clear their maintenance dues by 15 May 2024:\n{}",
                defaulters.join("\n")
            ),
        )
        .await;
    println!("\n{}", notice);

    Ok(())
}
