//! Display formatting for rupee amounts and percentages.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Percent};

/// Format an amount as whole rupees with Indian digit grouping,
/// e.g. `1234567.8` -> `₹12,34,568`.
pub fn format_inr(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{}", group_indian(&digits))
}

/// Format a percentage with two decimals, e.g. `8.5` -> `8.50%`.
pub fn format_percentage(value: Percent) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    format!("{rounded}%")
}

// Last three digits form the first group, every two digits after that.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Plain decimal rendering rounded to paise, used in text exports.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
