use crate::error::{Result, SocietyError};
use crate::llm::types::*;
use log::debug;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Sends one prompt and returns the first text part of the first candidate.
    pub async fn generate_text(&self, prompt: &str, model: &str) -> Result<String> {
        self.generate(prompt, model, None).await
    }

    /// Same as [`generate_text`](Self::generate_text) but asks for a JSON reply.
    pub async fn generate_json(&self, prompt: &str, model: &str) -> Result<String> {
        self.generate(prompt, model, Some("application/json")).await
    }

    async fn generate(&self, prompt: &str, model: &str, mime: Option<&str>) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config: GenerationConfig {
                response_mime_type: mime.map(str::to_string),
            },
        };

        debug!("Requesting {} ({} prompt chars)", model, prompt.len());
        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(SocietyError::ServiceFailed(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;

        body.candidates
            .ok_or_else(|| SocietyError::ServiceFailed("No candidates returned".to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| SocietyError::ServiceFailed("Empty candidates list".to_string()))?
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
            .ok_or_else(|| SocietyError::ServiceFailed("No parts in content".to_string()))
    }
}
