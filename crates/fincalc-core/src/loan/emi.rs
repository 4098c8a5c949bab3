use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ensure_years, FinCalcError};
use crate::time_value::{growth_factor, growth_factor_frac, monthly_rate, round_currency};
use crate::types::{Money, Percent, Years};
use crate::FinCalcResult;

/// Longest loan tenure accepted, in years.
pub const MAX_TENURE_YEARS: u32 = 50;

/// Immutable inputs to a single amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    /// Annual rate in percent (8.5 = 8.5% p.a.)
    pub annual_interest_rate: Percent,
    pub tenure_years: u32,
    pub start_date: NaiveDate,
}

impl LoanParameters {
    pub fn validate(&self) -> FinCalcResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_interest_rate", self.annual_interest_rate)?;
        ensure_years("tenure_years", self.tenure_years, MAX_TENURE_YEARS)
    }

    /// Nominal number of monthly installments.
    pub fn tenure_months(&self) -> u32 {
        self.tenure_years.saturating_mul(12)
    }
}

/// Fixed monthly installment for a tenure given in (possibly fractional) years.
///
/// `emi = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate and
/// `n = tenure_years * 12`, rounded to the cent. A 0% loan amortizes
/// linearly as `P / n`.
pub fn compute_emi(principal: Money, annual_rate: Percent, tenure_years: Years) -> FinCalcResult<Money> {
    ensure_positive("tenure_years", tenure_years)?;
    if tenure_years > Decimal::from(MAX_TENURE_YEARS) {
        return Err(FinCalcError::invalid(
            "tenure_years",
            &format!("must not exceed {MAX_TENURE_YEARS} years"),
        ));
    }
    let months = tenure_years * dec!(12);
    emi_over(principal, annual_rate, months, || growth_factor_frac(monthly_rate(annual_rate), months))
}

/// Same as [`compute_emi`] with the tenure expressed as a whole number of months.
pub fn compute_emi_for_months(principal: Money, annual_rate: Percent, months: u32) -> FinCalcResult<Money> {
    if months == 0 || months > MAX_TENURE_YEARS * 12 {
        return Err(FinCalcError::invalid(
            "months",
            &format!("must be between 1 and {} months", MAX_TENURE_YEARS * 12),
        ));
    }
    emi_over(principal, annual_rate, Decimal::from(months), || {
        growth_factor(monthly_rate(annual_rate), months)
    })
}

fn emi_over(
    principal: Money,
    annual_rate: Percent,
    months: Decimal,
    factor: impl FnOnce() -> FinCalcResult<Decimal>,
) -> FinCalcResult<Money> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("annual_interest_rate", annual_rate)?;

    if annual_rate.is_zero() {
        return Ok(round_currency(principal / months));
    }

    let r = monthly_rate(annual_rate);
    let compound = factor()?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        // (1+r)^n rounds to exactly 1 only for vanishingly small rates
        return Ok(round_currency(principal / months));
    }

    let emi = principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| FinCalcError::NumericOverflow {
            context: "EMI numerator".into(),
        })?
        / denominator;
    Ok(round_currency(emi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emi_home_loan() {
        let emi = compute_emi(dec!(2_500_000), dec!(8.5), dec!(10)).unwrap();
        assert_eq!(emi, dec!(30996.42));
    }

    #[test]
    fn test_emi_five_year_loan() {
        let emi = compute_emi(dec!(1_000_000), dec!(10), dec!(5)).unwrap();
        assert_eq!(emi, dec!(21247.04));
    }

    #[test]
    fn test_emi_zero_rate_is_linear() {
        let emi = compute_emi(dec!(1_200_000), Decimal::ZERO, dec!(10)).unwrap();
        assert_eq!(emi, dec!(10000));
    }

    #[test]
    fn test_emi_months_matches_years() {
        let by_years = compute_emi(dec!(500_000), dec!(9.25), dec!(15)).unwrap();
        let by_months = compute_emi_for_months(dec!(500_000), dec!(9.25), 180).unwrap();
        assert_eq!(by_years, by_months);
    }

    #[test]
    fn test_emi_fractional_tenure() {
        // 18 months expressed as 1.5 years
        let by_years = compute_emi(dec!(100_000), dec!(12), dec!(1.5)).unwrap();
        let by_months = compute_emi_for_months(dec!(100_000), dec!(12), 18).unwrap();
        assert_eq!(by_years, by_months);
    }

    #[test]
    fn test_emi_rejects_non_positive_inputs() {
        assert!(compute_emi(Decimal::ZERO, dec!(8), dec!(10)).is_err());
        assert!(compute_emi(dec!(-5), dec!(8), dec!(10)).is_err());
        assert!(compute_emi(dec!(1000), dec!(-1), dec!(10)).is_err());
        assert!(compute_emi(dec!(1000), dec!(8), Decimal::ZERO).is_err());
        assert!(compute_emi_for_months(dec!(1000), dec!(8), 0).is_err());
    }

    #[test]
    fn test_loan_parameters_validation() {
        let params = LoanParameters {
            principal: dec!(100_000),
            annual_interest_rate: dec!(9),
            tenure_years: 0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        match params.validate() {
            Err(FinCalcError::InvalidInput { field, .. }) => assert_eq!(field, "tenure_years"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_tenure_above_cap_rejected() {
        // 0% skips the compounding step, so the cap is the only guard here
        let params = LoanParameters {
            principal: dec!(1_000_000),
            annual_interest_rate: Decimal::ZERO,
            tenure_years: 300_000_000,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        match params.validate() {
            Err(FinCalcError::InvalidInput { field, .. }) => assert_eq!(field, "tenure_years"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let at_cap = LoanParameters {
            tenure_years: MAX_TENURE_YEARS,
            ..params.clone()
        };
        assert!(at_cap.validate().is_ok());
        assert!(compute_emi(dec!(1_000_000), Decimal::ZERO, dec!(50.5)).is_err());
        assert!(compute_emi_for_months(dec!(1_000_000), Decimal::ZERO, 601).is_err());
    }
}
