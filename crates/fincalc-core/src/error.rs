use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinCalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Degenerate amortization in month {month}: EMI {emi} does not cover interest {interest}")]
    DegenerateAmortization {
        month: u32,
        emi: Decimal,
        interest: Decimal,
    },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinCalcError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        FinCalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinCalcError {
    fn from(e: serde_json::Error) -> Self {
        FinCalcError::SerializationError(e.to_string())
    }
}

pub(crate) fn overflow(context: impl Into<String>) -> FinCalcError {
    FinCalcError::NumericOverflow {
        context: context.into(),
    }
}

/// Whole-year period in `1..=max`.
pub(crate) fn ensure_years(field: &str, years: u32, max: u32) -> Result<(), FinCalcError> {
    if years == 0 || years > max {
        return Err(FinCalcError::InvalidInput {
            field: field.into(),
            reason: format!("must be between 1 and {max} years"),
        });
    }
    Ok(())
}

pub(crate) fn ensure_positive(field: &str, value: Decimal) -> Result<(), FinCalcError> {
    if value <= Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "must be positive"));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), FinCalcError> {
    if value < Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "must not be negative"));
    }
    Ok(())
}
