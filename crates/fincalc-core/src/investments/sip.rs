use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{ensure_non_negative, ensure_positive, ensure_years, overflow};
use crate::investments::MAX_YEARS;
use crate::time_value::{add_months, annuity_due_fv, checked_mul, growth_factor, monthly_rate, real_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipInput {
    pub monthly_investment: Money,
    pub expected_return_rate: Percent,
    pub years: u32,
    #[serde(default)]
    pub inflation_rate: Percent,
    /// Date of the first installment
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipMonth {
    pub month: u32,
    pub date: NaiveDate,
    pub investment: Money,
    pub total_investment: Money,
    pub interest_earned: Money,
    pub total_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipOutput {
    pub total_investment: Money,
    pub total_returns: Money,
    pub maturity_value: Money,
    pub inflation_adjusted_value: Money,
    pub schedule: Vec<SipMonth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipTargetInput {
    pub target_amount: Money,
    pub expected_return_rate: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipTargetOutput {
    pub monthly_investment: Money,
    pub total_investment: Money,
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Maturity value of a monthly SIP, `M × (((1+r)^n − 1)/r) × (1+r)`, with a
/// month-by-month growth schedule.
pub fn calculate_sip(input: &SipInput) -> FinCalcResult<ComputationOutput<SipOutput>> {
    let start = Instant::now();
    validate(input.monthly_investment, input.expected_return_rate, input.years)?;
    ensure_non_negative("inflation_rate", input.inflation_rate)?;

    let months = input.years * 12;
    let r = monthly_rate(input.expected_return_rate);
    let maturity_value = annuity_due_fv(input.monthly_investment, r, months)?;
    let total_investment = checked_mul(input.monthly_investment, Decimal::from(months), "total investment")?;

    // Real-return growth on the amount invested, as the calculator reports it.
    let inflation_adjusted_value = if input.inflation_rate > Decimal::ZERO {
        let real = real_rate(input.expected_return_rate, input.inflation_rate);
        checked_mul(total_investment, growth_factor(real, input.years)?, "inflation-adjusted value")?
    } else {
        maturity_value
    };

    let schedule = sip_schedule(input.monthly_investment, r, months, input.start_date)?;

    let output = SipOutput {
        total_investment,
        total_returns: maturity_value - total_investment,
        maturity_value,
        inflation_adjusted_value,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP future value (annuity due, monthly compounding)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

// Installments are made at the start of each month, so each one earns a full
// month of growth before the month closes.
fn sip_schedule(installment: Money, r: Decimal, months: u32, first: NaiveDate) -> FinCalcResult<Vec<SipMonth>> {
    let mut schedule = Vec::with_capacity(months as usize);
    let mut total_investment = Decimal::ZERO;
    let mut value = Decimal::ZERO;
    for month in 1..=months {
        total_investment = total_investment
            .checked_add(installment)
            .ok_or_else(|| overflow(format!("investment to month {month}")))?;
        value = value
            .checked_add(installment)
            .and_then(|v| v.checked_mul(Decimal::ONE + r))
            .ok_or_else(|| overflow(format!("SIP value in month {month}")))?;
        schedule.push(SipMonth {
            month,
            date: add_months(first, month - 1)?,
            investment: installment,
            total_investment,
            interest_earned: value - total_investment,
            total_value: value,
        });
    }
    Ok(schedule)
}

/// Monthly installment needed to reach `target_amount`.
pub fn monthly_investment_for_target(input: &SipTargetInput) -> FinCalcResult<ComputationOutput<SipTargetOutput>> {
    let start = Instant::now();
    validate(input.target_amount, input.expected_return_rate, input.years)?;

    let months = input.years * 12;
    let per_unit = annuity_due_fv(Decimal::ONE, monthly_rate(input.expected_return_rate), months)?;
    let monthly_investment = input.target_amount / per_unit;

    let output = SipTargetOutput {
        monthly_investment,
        total_investment: checked_mul(monthly_investment, Decimal::from(months), "total investment")?,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inverse SIP future value",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

fn validate(amount: Money, rate: Percent, years: u32) -> FinCalcResult<()> {
    ensure_positive("amount", amount)?;
    ensure_non_negative("expected_return_rate", rate)?;
    ensure_years("years", years, MAX_YEARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> SipInput {
        SipInput {
            monthly_investment: dec!(10_000),
            expected_return_rate: dec!(12),
            years: 10,
            inflation_rate: Decimal::ZERO,
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        }
    }

    #[test]
    fn test_sip_maturity_value() {
        let out = calculate_sip(&input()).unwrap().result;
        assert_eq!(out.total_investment, dec!(1_200_000));
        // 10,000 * ((1.01^120 - 1) / 0.01) * 1.01 ≈ 23,23,391
        assert!((out.maturity_value - dec!(2323390.76)).abs() < dec!(1));
        assert_eq!(out.total_returns, out.maturity_value - out.total_investment);
        assert_eq!(out.inflation_adjusted_value, out.maturity_value);
    }

    #[test]
    fn test_schedule_ends_at_maturity_value() {
        let out = calculate_sip(&input()).unwrap().result;
        assert_eq!(out.schedule.len(), 120);
        let last = out.schedule.last().unwrap();
        assert!((last.total_value - out.maturity_value).abs() < dec!(0.01));
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2034, 3, 1).unwrap());
    }

    #[test]
    fn test_inflation_adjusted_value_is_lower() {
        let mut inp = input();
        inp.inflation_rate = dec!(6);
        let out = calculate_sip(&inp).unwrap().result;
        assert!(out.inflation_adjusted_value < out.maturity_value);
        assert!(out.inflation_adjusted_value > out.total_investment);
    }

    #[test]
    fn test_zero_return_sip() {
        let mut inp = input();
        inp.expected_return_rate = Decimal::ZERO;
        let out = calculate_sip(&inp).unwrap().result;
        assert_eq!(out.maturity_value, dec!(1_200_000));
        assert!(out.total_returns.is_zero());
    }

    #[test]
    fn test_target_inverts_maturity() {
        let target = SipTargetInput {
            target_amount: dec!(2323390.76),
            expected_return_rate: dec!(12),
            years: 10,
        };
        let out = monthly_investment_for_target(&target).unwrap().result;
        assert!((out.monthly_investment - dec!(10_000)).abs() < dec!(0.01));
    }

    #[test]
    fn test_invalid_sip_inputs() {
        let mut inp = input();
        inp.years = 0;
        assert!(calculate_sip(&inp).is_err());
        let mut inp = input();
        inp.monthly_investment = dec!(-1);
        assert!(calculate_sip(&inp).is_err());
    }

    #[test]
    fn test_years_beyond_horizon_rejected() {
        let mut inp = input();
        inp.years = u32::MAX;
        match calculate_sip(&inp) {
            Err(crate::FinCalcError::InvalidInput { field, .. }) => assert_eq!(field, "years"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        let target = SipTargetInput {
            target_amount: dec!(1_000_000),
            expected_return_rate: dec!(12),
            years: MAX_YEARS + 1,
        };
        assert!(monthly_investment_for_target(&target).is_err());
    }

    #[test]
    fn test_huge_installment_overflows_cleanly() {
        let mut inp = input();
        inp.monthly_investment = Decimal::MAX;
        assert!(matches!(
            calculate_sip(&inp),
            Err(crate::FinCalcError::NumericOverflow { .. })
        ));
    }
}
