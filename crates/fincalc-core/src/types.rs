use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rupee amounts, kept in Decimal end to end.
pub type Money = Decimal;

/// Annual rates expressed as percentages (8.5 = 8.5% p.a.), the way the
/// calculators take them from users.
pub type Percent = Decimal;

/// Tenures in years, fractional where a calculator allows it (1.5 = 18 months).
pub type Years = Decimal;

/// Envelope every calculator returns: the result plus how it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a calculator result; `assumptions` is usually the input itself.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
