use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{ensure_non_negative, ensure_positive, ensure_years, FinCalcError};
use crate::investments::MAX_YEARS;
use crate::time_value::{annuity_due_fv, checked_mul, fraction, growth_factor_frac, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Years};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Fixed deposit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    Monthly,
    #[default]
    Quarterly,
    HalfYearly,
    Yearly,
}

impl Compounding {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Compounding::Monthly => 12,
            Compounding::Quarterly => 4,
            Compounding::HalfYearly => 2,
            Compounding::Yearly => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureUnit {
    #[default]
    Years,
    Months,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDepositInput {
    pub principal: Money,
    pub interest_rate: Percent,
    pub tenure: Decimal,
    #[serde(default)]
    pub tenure_unit: TenureUnit,
    #[serde(default)]
    pub compounding: Compounding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDepositOutput {
    pub maturity_amount: Money,
    pub interest_earned: Money,
    pub time_in_years: Years,
}

/// Fixed deposit maturity, `P(1 + R/k)^(k·t)`.
pub fn calculate_fixed_deposit(input: &FixedDepositInput) -> FinCalcResult<ComputationOutput<FixedDepositOutput>> {
    let start = Instant::now();
    ensure_positive("principal", input.principal)?;
    ensure_non_negative("interest_rate", input.interest_rate)?;
    ensure_positive("tenure", input.tenure)?;

    let time_in_years = match input.tenure_unit {
        TenureUnit::Years => input.tenure,
        TenureUnit::Months => input.tenure / dec!(12),
    };
    if time_in_years > Decimal::from(MAX_YEARS) {
        return Err(FinCalcError::InvalidInput {
            field: "tenure".into(),
            reason: format!("must not exceed {MAX_YEARS} years"),
        });
    }
    let k = Decimal::from(input.compounding.periods_per_year());
    let factor = growth_factor_frac(fraction(input.interest_rate) / k, k * time_in_years)?;
    let maturity_amount = checked_mul(input.principal, factor, "maturity amount")?;

    let output = FixedDepositOutput {
        maturity_amount,
        interest_earned: maturity_amount - input.principal,
        time_in_years,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Periodic compound interest",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Recurring deposit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDepositInput {
    pub monthly_deposit: Money,
    pub interest_rate: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDepositYear {
    pub year: u32,
    pub deposited: Money,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDepositOutput {
    pub maturity_amount: Money,
    pub total_investment: Money,
    pub total_returns: Money,
    pub yearly: Vec<RecurringDepositYear>,
}

/// Recurring deposit maturity with monthly deposits at the start of each month.
pub fn calculate_recurring_deposit(
    input: &RecurringDepositInput,
) -> FinCalcResult<ComputationOutput<RecurringDepositOutput>> {
    let start = Instant::now();
    ensure_positive("monthly_deposit", input.monthly_deposit)?;
    ensure_non_negative("interest_rate", input.interest_rate)?;
    ensure_years("years", input.years, MAX_YEARS)?;

    let r = monthly_rate(input.interest_rate);
    let yearly = (1..=input.years)
        .map(|year| {
            let months = year * 12;
            Ok(RecurringDepositYear {
                year,
                deposited: checked_mul(input.monthly_deposit, Decimal::from(months), "amount deposited")?,
                value: annuity_due_fv(input.monthly_deposit, r, months)?,
            })
        })
        .collect::<FinCalcResult<Vec<_>>>()?;

    let maturity_amount = yearly.last().map_or(Decimal::ZERO, |y| y.value);
    let total_investment = yearly.last().map_or(Decimal::ZERO, |y| y.deposited);

    let output = RecurringDepositOutput {
        maturity_amount,
        total_investment,
        total_returns: maturity_amount - total_investment,
        yearly,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Recurring deposit future value (monthly compounding)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}
