use crate::error::{Result, SocietyError};
use crate::schema::{ChargeType, Society};
use log::{debug, info};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ChargeHead {
    #[schemars(description = "Line item text printed on the bill, e.g. 'Maintenance' or 'Sinking Fund'")]
    pub description: String,

    pub charge_type: ChargeType,

    #[schemars(
        description = "Amount per bill for Fixed heads, or amount per square foot for PerArea heads. Must not be negative."
    )]
    pub rate: Decimal,
}

fn default_due_days() -> u32 {
    15
}

fn default_bill_prefix() -> String {
    "BILL".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BillingConfig {
    #[schemars(description = "Charge heads in the order they appear on every bill")]
    pub charge_heads: Vec<ChargeHead>,

    #[schemars(description = "Days between the bill date and its due date")]
    #[serde(default = "default_due_days")]
    pub due_days: u32,

    #[schemars(
        description = "Flat late fee added as interest to a new bill when the resident has an overdue bill"
    )]
    #[serde(default)]
    pub late_fee: Decimal,

    #[serde(default = "default_bill_prefix")]
    pub bill_prefix: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            charge_heads: Vec::new(),
            due_days: default_due_days(),
            late_fee: Decimal::ZERO,
            bill_prefix: default_bill_prefix(),
        }
    }
}

/// Profile and billing rules of one society.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SocietyConfig {
    pub society: Society,
    #[serde(default)]
    pub billing: BillingConfig,
}

impl SocietyConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            "Loaded configuration for society {} with {} charge heads",
            config.society.id,
            config.billing.charge_heads.len()
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading society configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.society.id.trim().is_empty() {
            return Err(SocietyError::InvalidConfig(
                "society id must not be empty".to_string(),
            ));
        }
        if self.society.name.trim().is_empty() {
            return Err(SocietyError::InvalidConfig(format!(
                "society {} has an empty name",
                self.society.id
            )));
        }

        let mut seen = HashSet::new();
        for (idx, head) in self.billing.charge_heads.iter().enumerate() {
            if head.description.trim().is_empty() {
                return Err(SocietyError::InvalidConfig(format!(
                    "charge head #{} has an empty description",
                    idx
                )));
            }
            if head.rate < Decimal::ZERO {
                return Err(SocietyError::InvalidConfig(format!(
                    "charge head '{}' has negative rate {}",
                    head.description, head.rate
                )));
            }
            if !seen.insert(head.description.to_lowercase()) {
                return Err(SocietyError::InvalidConfig(format!(
                    "charge head '{}' is listed more than once",
                    head.description
                )));
            }
        }

        if self.billing.late_fee < Decimal::ZERO {
            return Err(SocietyError::InvalidConfig(format!(
                "late fee {} must not be negative",
                self.billing.late_fee
            )));
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SocietyConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
