use crate::error::{Result, SocietyError};
use crate::ingestion::BankStatementLine;
use crate::statements::format_amount;
use crate::store::SocietyView;
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A cash or bank movement as recorded in the society's books. Receipts are
/// positive, payments negative, matching bank statement signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

/// Bank-side movements recorded between `start` and `end`: collections on
/// bills and non-cash income as credits, bank-paid expenses as debits.
pub fn book_transactions(
    view: &SocietyView<'_>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<BookTransaction> {
    let mut transactions: Vec<BookTransaction> = view
        .payments_in_period(start, end)
        .filter(|(_, payment)| !payment.mode.is_cash())
        .map(|(bill, payment)| BookTransaction {
            id: bill.id.clone(),
            date: payment.date,
            description: format!("Bill {} ({})", bill.id, bill.unit_number),
            amount: bill.total_amount,
        })
        .collect();

    transactions.extend(
        view.incomes_in_period(start, end)
            .filter(|income| !income.mode.is_cash())
            .map(|income| BookTransaction {
                id: income.id.clone(),
                date: income.date,
                description: format!("{} {}", income.category, income.description)
                    .trim()
                    .to_string(),
                amount: income.amount,
            }),
    );

    transactions.extend(
        view.expenses_in_period(start, end)
            .filter(|expense| expense.payment_mode.moves_bank())
            .map(|expense| BookTransaction {
                id: expense.id.clone(),
                date: expense.date,
                description: format!("{} {}", expense.category, expense.vendor)
                    .trim()
                    .to_string(),
                amount: -expense.amount,
            }),
    );

    transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    transactions
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMatch {
    pub system_id: String,
    pub bank_id: String,
    pub reason: String,
    #[schemars(description = "Between 0 and 1")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySource {
    #[serde(alias = "System", alias = "SYSTEM")]
    System,
    #[serde(alias = "Bank", alias = "BANK")]
    Bank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Anomaly {
    pub id: String,
    pub source: AnomalySource,
    pub note: String,
}

/// Matching proposal returned by the text model for a bank reconciliation.
/// Advisory only: nothing here is applied to the books automatically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSuggestions {
    #[serde(default)]
    pub suggested_matches: Vec<SuggestedMatch>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub summary: String,
}

impl ReconciliationSuggestions {
    /// Parses model output, tolerating a ```json fence or prose around the
    /// object.
    pub fn from_model_output(text: &str) -> Result<Self> {
        let body = extract_json_object(text).ok_or_else(|| {
            SocietyError::InvalidResponse("model output contains no JSON object".to_string())
        })?;
        let mut suggestions: Self = serde_json::from_str(body)?;
        for m in &mut suggestions.suggested_matches {
            m.confidence = m.confidence.clamp(0.0, 1.0);
        }
        debug!(
            "Parsed {} suggested matches and {} anomalies",
            suggestions.suggested_matches.len(),
            suggestions.anomalies.len()
        );
        Ok(suggestions)
    }

    pub fn response_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(ReconciliationSuggestions))
            .unwrap_or(serde_json::Value::Null)
    }

    /// Drops matches naming ids that are not in either list, and any match
    /// reusing an id already matched.
    pub fn retain_known(&mut self, books: &[BookTransaction], bank: &[BankStatementLine]) {
        let system_ids: HashSet<&str> = books.iter().map(|t| t.id.as_str()).collect();
        let bank_ids: HashSet<&str> = bank.iter().map(|l| l.id.as_str()).collect();
        let mut used_system = HashSet::new();
        let mut used_bank = HashSet::new();

        let before = self.suggested_matches.len();
        self.suggested_matches.retain(|m| {
            system_ids.contains(m.system_id.as_str())
                && bank_ids.contains(m.bank_id.as_str())
                && used_system.insert(m.system_id.clone())
                && used_bank.insert(m.bank_id.clone())
        });
        let dropped = before - self.suggested_matches.len();
        if dropped > 0 {
            warn!("Discarded {} suggested matches with unknown or reused ids", dropped);
        }
    }
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Prompt asking the model to pair book entries with bank lines.
pub fn reconciliation_prompt(books: &[BookTransaction], bank: &[BankStatementLine]) -> String {
    let mut prompt = String::from(
        "Match the society's book entries to the bank statement lines below.\n\
         Pair entries with the same amount and a close date. Report unmatched \
         entries on either side as anomalies.\n\
         Reply with JSON only: {\"suggestedMatches\": [{\"systemId\", \"bankId\", \
         \"reason\", \"confidence\"}], \"anomalies\": [{\"id\", \"source\": \
         \"system\"|\"bank\", \"note\"}], \"summary\"}.\n\n",
    );

    prompt.push_str("BOOK ENTRIES\n");
    for t in books {
        prompt.push_str(&format!(
            "{} | {} | {} | {}\n",
            t.id,
            t.date,
            format_amount(t.amount),
            t.description
        ));
    }

    prompt.push_str("\nBANK STATEMENT\n");
    for line in bank {
        prompt.push_str(&format!(
            "{} | {} | {} | {}{}\n",
            line.id,
            line.date,
            format_amount(line.amount),
            line.description,
            line.reference
                .as_deref()
                .map(|r| format!(" (ref {})", r))
                .unwrap_or_default()
        ));
    }
    prompt
}
