use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{overflow, FinCalcError};
use crate::loan::emi::{compute_emi_for_months, LoanParameters};
use crate::loan::events::{EmiChange, EventBook, EventKind, Prepayment, PrepaymentPolicy, RateChange, ScheduledEvent};
use crate::time_value::{add_months, monthly_rate};
use crate::types::{Money, Percent};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Number of months an EMI recompute amortizes over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeHorizon {
    /// Always the nominal `tenure_years * 12` months.
    #[default]
    FullTenure,
    /// Months left in the nominal tenure, counting the current month.
    RemainingTenure,
}

/// Handling of months where the EMI does not cover the interest due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateEmiPolicy {
    /// Keep simulating (the balance grows) and report the months.
    #[default]
    Warn,
    /// Stop with `FinCalcError::DegenerateAmortization`.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub recompute_horizon: RecomputeHorizon,
    #[serde(default)]
    pub degenerate_emi: DegenerateEmiPolicy,
    /// Also simulate the event-free loan and report the savings.
    #[serde(default = "default_true")]
    pub compare_with_baseline: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            recompute_horizon: RecomputeHorizon::default(),
            degenerate_emi: DegenerateEmiPolicy::default(),
            compare_with_baseline: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the amortization ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub month: u32,
    pub date: NaiveDate,
    pub opening_balance: Money,
    /// Annual rate in force for this month
    pub rate_percent: Percent,
    pub emi: Money,
    pub interest: Money,
    pub principal: Money,
    pub prepayment: Money,
    pub total_payment: Money,
    pub cumulative_principal_paid: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Termination {
    /// Balance reached zero in `month`.
    PaidOff { month: u32 },
    /// Nominal tenure ran out with a balance left.
    TenureExhausted { outstanding: Money },
}

/// Everything one simulation run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub rows: Vec<LedgerRow>,
    pub termination: Termination,
    /// Months whose EMI was below the interest due
    pub degenerate_months: Vec<u32>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

struct SimulationState {
    outstanding: Money,
    annual_rate: Percent,
    emi: Money,
    date: NaiveDate,
    cumulative_principal: Money,
}

/// Run the month-by-month amortization of `params` under the given events.
///
/// Each month, in order: the latest due rate change (EMI recomputed), the
/// latest due EMI override, interest and principal for the month, the latest
/// due prepayment (EMI recomputed under `ReduceEmi`), then the balance update.
/// At most one event of each kind is consumed per month. Caller-owned event
/// slices are never mutated, so they can be reused across runs.
pub fn simulate(
    params: &LoanParameters,
    prepayments: &[Prepayment],
    rate_changes: &[RateChange],
    emi_changes: &[EmiChange],
    options: &ScheduleOptions,
) -> FinCalcResult<Simulation> {
    params.validate()?;
    let mut book = EventBook::new(prepayments, rate_changes, emi_changes)?;

    let tenure_months = params.tenure_months();
    let mut state = SimulationState {
        outstanding: params.principal,
        annual_rate: params.annual_interest_rate,
        emi: compute_emi_for_months(params.principal, params.annual_interest_rate, tenure_months)?,
        date: params.start_date,
        cumulative_principal: Decimal::ZERO,
    };

    let mut rows = Vec::with_capacity(tenure_months as usize);
    let mut degenerate_months = Vec::new();
    let mut warnings = Vec::new();

    for month in 1..=tenure_months {
        let horizon = match options.recompute_horizon {
            RecomputeHorizon::FullTenure => tenure_months,
            RecomputeHorizon::RemainingTenure => tenure_months - month + 1,
        };
        let opening = state.outstanding;

        if let Some(ScheduledEvent::RateChange(change)) = book.take_latest_due(EventKind::RateChange, state.date) {
            state.annual_rate = change.new_annual_rate;
            state.emi = compute_emi_for_months(state.outstanding, state.annual_rate, horizon)?;
            debug!(month, rate = %state.annual_rate, emi = %state.emi, "rate change applied");
        }

        if let Some(ScheduledEvent::EmiChange(change)) = book.take_latest_due(EventKind::EmiChange, state.date) {
            state.emi = change.new_emi_amount;
            debug!(month, emi = %state.emi, "EMI override applied");
        }

        let interest = state
            .outstanding
            .checked_mul(monthly_rate(state.annual_rate))
            .ok_or_else(|| balance_overflow(month))?;
        let scheduled_principal = state
            .emi
            .checked_sub(interest)
            .ok_or_else(|| balance_overflow(month))?
            .min(state.outstanding);

        if state.emi < interest {
            match options.degenerate_emi {
                DegenerateEmiPolicy::Reject => {
                    return Err(FinCalcError::DegenerateAmortization {
                        month,
                        emi: state.emi,
                        interest,
                    });
                }
                DegenerateEmiPolicy::Warn => {
                    debug!(month, emi = %state.emi, interest = %interest, "EMI below interest due");
                    degenerate_months.push(month);
                }
            }
        }

        let mut prepaid = Decimal::ZERO;
        if let Some(ScheduledEvent::Prepayment(prepayment)) = book.take_latest_due(EventKind::Prepayment, state.date) {
            prepaid = prepayment.amount.min(state.outstanding);
            state.outstanding -= prepaid;
            if prepayment.policy == PrepaymentPolicy::ReduceEmi && !state.outstanding.is_zero() {
                state.emi = compute_emi_for_months(state.outstanding, state.annual_rate, horizon)?;
            }
            debug!(month, amount = %prepaid, policy = ?prepayment.policy, "prepayment applied");
        }

        // In the payoff month the prepayment may leave less than the scheduled principal.
        // A negative principal (EMI below interest) grows the balance.
        let principal = scheduled_principal.min(state.outstanding);
        state.outstanding = state
            .outstanding
            .checked_sub(principal)
            .ok_or_else(|| balance_overflow(month))?;
        state.cumulative_principal = state
            .cumulative_principal
            .checked_add(principal)
            .ok_or_else(|| balance_overflow(month))?;
        let total_payment = principal
            .checked_add(interest)
            .and_then(|v| v.checked_add(prepaid))
            .ok_or_else(|| balance_overflow(month))?;

        rows.push(LedgerRow {
            month,
            date: state.date,
            opening_balance: opening,
            rate_percent: state.annual_rate,
            emi: state.emi,
            interest,
            principal,
            prepayment: prepaid,
            total_payment,
            cumulative_principal_paid: state.cumulative_principal,
            closing_balance: state.outstanding,
        });

        state.date = add_months(state.date, 1)?;

        if state.outstanding <= Decimal::ZERO {
            break;
        }
    }

    let termination = if state.outstanding <= Decimal::ZERO {
        Termination::PaidOff {
            month: rows.last().map_or(0, |r| r.month),
        }
    } else {
        Termination::TenureExhausted {
            outstanding: state.outstanding,
        }
    };
    debug!(months = rows.len(), ?termination, "simulation finished");

    if let Termination::TenureExhausted { outstanding } = &termination {
        warnings.push(format!(
            "Loan not repaid within {tenure_months} months; {outstanding} outstanding"
        ));
    }
    if !degenerate_months.is_empty() {
        warn!(
            months = degenerate_months.len(),
            first = degenerate_months[0],
            "EMI below interest due; balance grew"
        );
        warnings.push(format!(
            "EMI did not cover interest in {} month(s), starting month {}; balance increased",
            degenerate_months.len(),
            degenerate_months[0]
        ));
    }
    for event in book.unconsumed() {
        warnings.push(format!("{} was never applied", event.describe()));
    }

    Ok(Simulation {
        rows,
        termination,
        degenerate_months,
        warnings,
    })
}

fn balance_overflow(month: u32) -> FinCalcError {
    overflow(format!("balance in month {month}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::emi::MAX_TENURE_YEARS;
    use rust_decimal_macros::dec;

    fn params(principal: Decimal, rate: Decimal, years: u32) -> LoanParameters {
        LoanParameters {
            principal,
            annual_interest_rate: rate,
            tenure_years: years,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn run(p: &LoanParameters) -> Simulation {
        simulate(p, &[], &[], &[], &ScheduleOptions::default()).unwrap()
    }

    #[test]
    fn test_plain_loan_runs_full_tenure() {
        let sim = run(&params(dec!(1_000_000), dec!(10), 5));
        assert_eq!(sim.rows.len(), 60);
        let first = &sim.rows[0];
        assert_eq!(first.emi, dec!(21247.04));
        assert!((first.interest - dec!(8333.33)).abs() < dec!(0.01));
        assert!((first.principal - dec!(12913.71)).abs() < dec!(0.01));
        let last = sim.rows.last().unwrap();
        assert!(last.closing_balance <= dec!(1));
        assert!(sim.warnings.iter().all(|w| !w.contains("never applied")));
    }

    #[test]
    fn test_rows_are_dated_monthly() {
        let sim = run(&params(dec!(100_000), dec!(12), 1));
        assert_eq!(sim.rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(sim.rows[11].date, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }

    #[test]
    fn test_emi_rounded_up_pays_off_in_last_month() {
        // 8884.878... rounds to 8884.88 so the last month clears the balance
        let sim = run(&params(dec!(100_000), dec!(12), 1));
        assert_eq!(sim.termination, Termination::PaidOff { month: 12 });
        assert_eq!(sim.rows[11].closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_opening_equals_previous_closing() {
        let sim = run(&params(dec!(750_000), dec!(9.5), 3));
        for pair in sim.rows.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
    }

    #[test]
    fn test_zero_rate_loan() {
        let sim = run(&params(dec!(120_000), Decimal::ZERO, 1));
        assert_eq!(sim.rows.len(), 12);
        assert!(sim.rows.iter().all(|r| r.interest.is_zero() && r.principal == dec!(10000)));
        assert_eq!(sim.termination, Termination::PaidOff { month: 12 });
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = params(Decimal::ZERO, dec!(10), 5);
        assert!(simulate(&bad, &[], &[], &[], &ScheduleOptions::default()).is_err());
    }

    #[test]
    fn test_runaway_balance_is_an_error() {
        // A token EMI at 36% lets the balance compound until Decimal overflows.
        let loan = LoanParameters {
            principal: dec!(10_000_000_000_000_000_000_000),
            annual_interest_rate: dec!(36),
            tenure_years: MAX_TENURE_YEARS,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let token = [EmiChange {
            new_emi_amount: dec!(1),
            effective_date: loan.start_date,
        }];
        match simulate(&loan, &[], &[], &token, &ScheduleOptions::default()) {
            Err(FinCalcError::NumericOverflow { context }) => assert!(context.starts_with("balance in month")),
            other => panic!("expected NumericOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: ScheduleOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.recompute_horizon, RecomputeHorizon::FullTenure);
        assert_eq!(opts.degenerate_emi, DegenerateEmiPolicy::Warn);
        assert!(opts.compare_with_baseline);
    }
}
