use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocietyError {
    #[error("Unknown society: {0}")]
    UnknownSociety(String),

    #[error("Society already exists: {0}")]
    DuplicateSociety(String),

    #[error("Cannot delete society {0}: at least one society must remain")]
    LastSociety(String),

    #[error("Unknown resident: {0}")]
    UnknownResident(String),

    #[error("Unknown bill: {0}")]
    UnknownBill(String),

    #[error("Bill {0} is already paid")]
    AlreadyPaid(String),

    #[error("Duplicate record id: {0}")]
    DuplicateId(String),

    #[error("Invalid amount {amount} for {field}: must not be negative")]
    NegativeAmount { field: String, amount: Decimal },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Books do not reconcile: {0}")]
    VerificationFailed(String),

    #[error("Unreadable model response: {0}")]
    InvalidResponse(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("Generative text service failed: {0}")]
    ServiceFailed(String),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SocietyError>;
