pub mod investments;
pub mod loan;

use serde_json::Value;

/// What a command hands back to `main` for printing.
pub enum Rendered {
    /// Structured output routed through `--output`
    Value(Value),
    /// Pre-formatted text printed as-is
    Text(String),
}

impl From<Value> for Rendered {
    fn from(value: Value) -> Self {
        Rendered::Value(value)
    }
}
