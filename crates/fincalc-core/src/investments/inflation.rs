use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{ensure_non_negative, ensure_positive, FinCalcError};
use crate::investments::MAX_YEARS;
use crate::time_value::{checked_mul, fraction, growth_factor};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationInput {
    pub current_amount: Money,
    pub inflation_rate: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationYear {
    pub year: u32,
    /// Cost of today's basket in that year
    pub future_cost: Money,
    /// What today's amount buys in that year, in today's money
    pub purchasing_power: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationOutput {
    pub future_value: Money,
    pub purchasing_power_loss: Money,
    pub real_value: Money,
    /// Year 0 through `years`
    pub yearly: Vec<InflationYear>,
}

/// Project what `current_amount` of spending will cost after `years`.
pub fn calculate_inflation(input: &InflationInput) -> FinCalcResult<ComputationOutput<InflationOutput>> {
    let start = Instant::now();
    ensure_positive("current_amount", input.current_amount)?;
    ensure_non_negative("inflation_rate", input.inflation_rate)?;
    if input.years > MAX_YEARS {
        return Err(FinCalcError::InvalidInput {
            field: "years".into(),
            reason: format!("must not exceed {MAX_YEARS} years"),
        });
    }

    let rate = fraction(input.inflation_rate);
    let yearly = (0..=input.years)
        .map(|year| {
            let factor = growth_factor(rate, year)?;
            Ok(InflationYear {
                year,
                future_cost: checked_mul(input.current_amount, factor, "future cost")?,
                purchasing_power: input.current_amount / factor,
            })
        })
        .collect::<FinCalcResult<Vec<_>>>()?;

    let future_value = yearly.last().map_or(input.current_amount, |y| y.future_cost);
    let output = InflationOutput {
        future_value,
        purchasing_power_loss: future_value - input.current_amount,
        real_value: input.current_amount,
        yearly,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound inflation projection",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inflation_ten_years() {
        let input = InflationInput {
            current_amount: dec!(50_000),
            inflation_rate: dec!(6),
            years: 10,
        };
        let out = calculate_inflation(&input).unwrap().result;
        assert!((out.future_value - dec!(89542.38)).abs() < dec!(0.01));
        assert_eq!(out.yearly.len(), 11);
        assert_eq!(out.yearly[0].future_cost, dec!(50_000));
        assert!(out.yearly[10].purchasing_power < dec!(28_000));
        assert_eq!(out.real_value, dec!(50_000));
    }

    #[test]
    fn test_zero_years_is_identity() {
        let input = InflationInput {
            current_amount: dec!(1000),
            inflation_rate: dec!(5),
            years: 0,
        };
        let out = calculate_inflation(&input).unwrap().result;
        assert_eq!(out.future_value, dec!(1000));
        assert!(out.purchasing_power_loss.is_zero());
    }

    #[test]
    fn test_years_capped() {
        let input = InflationInput {
            current_amount: dec!(1000),
            inflation_rate: dec!(5),
            years: MAX_YEARS + 1,
        };
        assert!(matches!(
            calculate_inflation(&input),
            Err(FinCalcError::InvalidInput { .. })
        ));
    }
}
