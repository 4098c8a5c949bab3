use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{overflow, FinCalcError};
use crate::types::{Money, Percent};
use crate::FinCalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

/// Monthly periodic rate for an annual percentage (8.5 -> 0.0070833...).
pub fn monthly_rate(annual: Percent) -> Decimal {
    annual / MONTHS_PER_YEAR / HUNDRED
}

/// Annual percentage as a plain fraction (8.5 -> 0.085).
pub fn fraction(annual: Percent) -> Decimal {
    annual / HUNDRED
}

/// Round to currency-cent precision, halves away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compound growth factor `(1 + rate)^periods` for whole periods.
pub fn growth_factor(rate: Decimal, periods: u32) -> FinCalcResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| FinCalcError::NumericOverflow {
            context: format!("(1 + {rate})^{periods}"),
        })
}

/// Compound growth factor for a fractional number of periods.
pub fn growth_factor_frac(rate: Decimal, periods: Decimal) -> FinCalcResult<Decimal> {
    if periods.fract().is_zero() {
        if let Some(whole) = periods.to_u32() {
            return growth_factor(rate, whole);
        }
    }
    (Decimal::ONE + rate)
        .checked_powd(periods)
        .ok_or_else(|| FinCalcError::NumericOverflow {
            context: format!("(1 + {rate})^{periods}"),
        })
}

/// Future value of an annuity due: `pmt * (((1+r)^n - 1) / r) * (1+r)`.
/// Zero rate degrades to `pmt * n`.
pub fn annuity_due_fv(pmt: Money, rate: Decimal, periods: u32) -> FinCalcResult<Money> {
    if rate.is_zero() {
        return checked_mul(pmt, Decimal::from(periods), "annuity future value");
    }
    let factor = growth_factor(rate, periods)?;
    (factor - Decimal::ONE)
        .checked_div(rate)
        .and_then(|q| pmt.checked_mul(q))
        .and_then(|v| v.checked_mul(Decimal::ONE + rate))
        .ok_or_else(|| overflow("annuity future value"))
}

/// `a * b`, with overflow reported as `NumericOverflow { context }`.
pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> FinCalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

/// Inflation-adjusted (real) annual rate as a fraction.
pub fn real_rate(nominal: Percent, inflation: Percent) -> Decimal {
    (Decimal::ONE + fraction(nominal)) / (Decimal::ONE + fraction(inflation)) - Decimal::ONE
}

/// Calendar month arithmetic, clamping to the last day of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> FinCalcResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| FinCalcError::DateError(format!("{date} + {months} months is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_round_currency_midpoint() {
        assert_eq!(round_currency(dec!(10.005)), dec!(10.01));
        assert_eq!(round_currency(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn test_growth_factor_whole_and_fractional_agree() {
        let whole = growth_factor(dec!(0.01), 12).unwrap();
        let frac = growth_factor_frac(dec!(0.01), dec!(12)).unwrap();
        assert_eq!(whole, frac);
        let half = growth_factor_frac(dec!(0.21), dec!(0.5)).unwrap();
        assert!((half - dec!(1.1)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_annuity_due_zero_rate() {
        assert_eq!(annuity_due_fv(dec!(500), Decimal::ZERO, 24).unwrap(), dec!(12000));
    }

    #[test]
    fn test_annuity_overflow_is_an_error() {
        let err = annuity_due_fv(Decimal::MAX, dec!(0.01), 12).unwrap_err();
        assert!(matches!(err, FinCalcError::NumericOverflow { .. }));
    }

    #[test]
    fn test_checked_mul_reports_context() {
        assert_eq!(checked_mul(dec!(2), dec!(3), "x").unwrap(), dec!(6));
        match checked_mul(Decimal::MAX, dec!(2), "future value") {
            Err(FinCalcError::NumericOverflow { context }) => assert_eq!(context, "future value"),
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(jan31, 1).unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
