use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{ensure_non_negative, ensure_positive, ensure_years};
use crate::investments::MAX_YEARS;
use crate::time_value::{checked_mul, fraction, growth_factor, real_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumInput {
    pub investment: Money,
    pub expected_return_rate: Percent,
    pub years: u32,
    #[serde(default)]
    pub inflation_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumYear {
    pub year: u32,
    pub value: Money,
    pub gains: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumOutput {
    pub future_value: Money,
    pub total_returns: Money,
    pub inflation_adjusted_value: Money,
    pub yearly_breakdown: Vec<LumpsumYear>,
}

/// One-time investment compounded annually: `P(1+R)^t`.
pub fn calculate_lumpsum(input: &LumpsumInput) -> FinCalcResult<ComputationOutput<LumpsumOutput>> {
    let start = Instant::now();
    ensure_positive("investment", input.investment)?;
    ensure_non_negative("expected_return_rate", input.expected_return_rate)?;
    ensure_non_negative("inflation_rate", input.inflation_rate)?;
    ensure_years("years", input.years, MAX_YEARS)?;

    let annual = fraction(input.expected_return_rate);
    let mut yearly_breakdown = Vec::with_capacity(input.years as usize);
    for year in 1..=input.years {
        let value = checked_mul(input.investment, growth_factor(annual, year)?, "future value")?;
        yearly_breakdown.push(LumpsumYear {
            year,
            value,
            gains: value - input.investment,
        });
    }

    let future_value = yearly_breakdown.last().map_or(input.investment, |y| y.value);
    let inflation_adjusted_value = if input.inflation_rate > Decimal::ZERO {
        let real = real_rate(input.expected_return_rate, input.inflation_rate);
        checked_mul(input.investment, growth_factor(real, input.years)?, "inflation-adjusted value")?
    } else {
        future_value
    };

    let output = LumpsumOutput {
        future_value,
        total_returns: future_value - input.investment,
        inflation_adjusted_value,
        yearly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual compounding of a single investment",
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
    fn test_lumpsum_ten_years() {
        let input = LumpsumInput {
            investment: dec!(500_000),
            expected_return_rate: dec!(12),
            years: 10,
            inflation_rate: Decimal::ZERO,
        };
        let out = calculate_lumpsum(&input).unwrap().result;
        assert!((out.future_value - dec!(1552924.10)).abs() < dec!(0.01));
        assert_eq!(out.yearly_breakdown.len(), 10);
        assert_eq!(out.yearly_breakdown[0].value, dec!(560000));
        assert_eq!(out.yearly_breakdown[0].gains, dec!(60000));
    }

    #[test]
    fn test_inflation_adjustment() {
        let input = LumpsumInput {
            investment: dec!(100_000),
            expected_return_rate: dec!(6),
            years: 5,
            inflation_rate: dec!(6),
        };
        let out = calculate_lumpsum(&input).unwrap().result;
        // Real rate is zero when return equals inflation
        assert_eq!(out.inflation_adjusted_value, dec!(100_000));
    }

    #[test]
    fn test_growth_past_decimal_range_is_an_error() {
        let input = LumpsumInput {
            investment: dec!(1_000_000_000_000_000_000_000_000_000),
            expected_return_rate: dec!(50),
            years: MAX_YEARS,
            inflation_rate: Decimal::ZERO,
        };
        assert!(matches!(
            calculate_lumpsum(&input),
            Err(crate::FinCalcError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_years_out_of_range() {
        for years in [0, MAX_YEARS + 1] {
            let input = LumpsumInput {
                investment: dec!(1000),
                expected_return_rate: dec!(8),
                years,
                inflation_rate: Decimal::ZERO,
            };
            assert!(calculate_lumpsum(&input).is_err());
        }
    }
}
