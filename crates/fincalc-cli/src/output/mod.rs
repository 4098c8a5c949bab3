pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use fincalc_core::format::format_amount;
use rust_decimal::Decimal;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Round decimal strings carrying more than two places to paise.
///
/// Dates, integers and already-rounded amounts pass through untouched.
pub(crate) fn tidy_decimal(raw: &str) -> String {
    match raw.parse::<Decimal>() {
        Ok(d) if d.scale() > 2 => format_amount(d),
        _ => raw.to_string(),
    }
}

/// Render a scalar JSON value for table and CSV cells.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => tidy_decimal(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tidy_decimal_rounds_long_amounts() {
        assert_eq!(tidy_decimal("8333.333333333333"), "8333.33");
        assert_eq!(tidy_decimal("0.3648"), "0.36");
        assert_eq!(tidy_decimal("21247.04"), "21247.04");
        assert_eq!(tidy_decimal("60"), "60");
        assert_eq!(tidy_decimal("2024-01-01"), "2024-01-01");
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(&json!(null)), "");
        assert_eq!(cell(&json!(12)), "12");
        assert_eq!(cell(&json!("12.345")), "12.35");
    }
}
