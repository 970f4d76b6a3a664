use crate::error::Result;
use crate::ingestion::BankStatementLine;
use crate::llm::client::{GeminiClient, DEFAULT_MODEL};
use crate::llm::types::DraftKind;
use crate::reconciliation::{reconciliation_prompt, BookTransaction, ReconciliationSuggestions};
use log::{error, info};

pub const DRAFT_UNAVAILABLE: &str =
    "Sorry, the drafting assistant is unavailable right now. Please try again later.";

/// Writes notices, minutes and letters, and proposes bank reconciliation
/// matches. Never touches the books.
pub struct DraftingAssistant {
    client: GeminiClient,
    model: String,
}

impl DraftingAssistant {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Always returns text. A failed request yields [`DRAFT_UNAVAILABLE`].
    pub async fn draft(&self, kind: DraftKind, details: &str) -> String {
        let prompt = format!("{}\n\n{}", kind.instruction(), details);
        match self.client.generate_text(&prompt, &self.model).await {
            Ok(text) => text,
            Err(e) => {
                error!("Drafting {:?} failed: {}", kind, e);
                DRAFT_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn suggest_reconciliation(
        &self,
        books: &[BookTransaction],
        bank: &[BankStatementLine],
    ) -> Result<ReconciliationSuggestions> {
        let prompt = reconciliation_prompt(books, bank);
        let reply = self.client.generate_json(&prompt, &self.model).await?;
        let mut suggestions = ReconciliationSuggestions::from_model_output(&reply)?;
        suggestions.retain_known(books, bank);
        info!(
            "Model proposed {} matches and {} anomalies",
            suggestions.suggested_matches.len(),
            suggestions.anomalies.len()
        );
        Ok(suggestions)
    }
}
