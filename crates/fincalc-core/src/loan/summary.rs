use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::overflow;
use crate::format::{format_inr, format_percentage};
use crate::loan::emi::LoanParameters;
use crate::loan::events::{EmiChange, Prepayment, RateChange};
use crate::loan::schedule::{simulate, LedgerRow, ScheduleOptions, Simulation, Termination};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Full request for an amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan: LoanParameters,
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
    #[serde(default)]
    pub emi_changes: Vec<EmiChange>,
    #[serde(default)]
    pub options: ScheduleOptions,
}

/// Headline totals for a finished schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_amount: Money,
    pub initial_emi: Money,
    pub final_emi: Money,
    pub total_interest: Money,
    pub total_prepayment: Money,
    pub total_principal_paid: Money,
    /// Sum of every month's cash outflow
    pub total_payment: Money,
    /// Loan amount plus total interest
    pub total_amount: Money,
    pub months: u32,
    pub first_payment_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub final_balance: Money,
    pub termination: Termination,
}

/// Principal/interest split for one calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyBreakdown {
    pub year: i32,
    pub principal: Money,
    pub interest: Money,
    pub prepayment: Money,
    pub closing_balance: Money,
}

/// Savings relative to the same loan without any events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline_months: u32,
    pub baseline_interest: Money,
    pub interest_saved: Money,
    pub months_saved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub summary: LoanSummary,
    pub schedule: Vec<LedgerRow>,
    pub yearly: Vec<YearlyBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineComparison>,
    pub degenerate_months: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build the schedule, totals and yearly split for a loan with its events.
pub fn generate_amortization_schedule(
    input: &AmortizationInput,
) -> FinCalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();

    let simulation = simulate(
        &input.loan,
        &input.prepayments,
        &input.rate_changes,
        &input.emi_changes,
        &input.options,
    )?;

    let has_events =
        !(input.prepayments.is_empty() && input.rate_changes.is_empty() && input.emi_changes.is_empty());
    let baseline = if input.options.compare_with_baseline && has_events {
        let plain = simulate(&input.loan, &[], &[], &[], &input.options)?;
        Some(compare(&simulation, &plain)?)
    } else {
        None
    };

    let Simulation {
        rows,
        termination,
        degenerate_months,
        warnings,
    } = simulation;

    let summary = summarize(&input.loan, &rows, termination)?;
    let yearly = yearly_breakdown(&rows)?;

    let output = AmortizationSchedule {
        summary,
        schedule: rows,
        yearly,
        baseline,
        degenerate_months,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly reducing-balance amortization with dated prepayment, rate and EMI events",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "annual_interest_rate": input.loan.annual_interest_rate.to_string(),
            "tenure_years": input.loan.tenure_years,
            "start_date": input.loan.start_date,
            "prepayments": input.prepayments.len(),
            "rate_changes": input.rate_changes.len(),
            "emi_changes": input.emi_changes.len(),
            "options": input.options,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Totals over the ledger rows of one run.
pub fn summarize(loan: &LoanParameters, rows: &[LedgerRow], termination: Termination) -> FinCalcResult<LoanSummary> {
    let total_interest = total(rows.iter().map(|r| r.interest), "total interest")?;
    let total_prepayment = total(rows.iter().map(|r| r.prepayment), "total prepayment")?;
    let total_payment = total(rows.iter().map(|r| r.total_payment), "total payment")?;
    let total_amount = loan
        .principal
        .checked_add(total_interest)
        .ok_or_else(|| overflow("total amount"))?;

    Ok(LoanSummary {
        loan_amount: loan.principal,
        initial_emi: rows.first().map_or(Decimal::ZERO, |r| r.emi),
        final_emi: rows.last().map_or(Decimal::ZERO, |r| r.emi),
        total_interest,
        total_prepayment,
        total_principal_paid: rows.last().map_or(Decimal::ZERO, |r| r.cumulative_principal_paid),
        total_payment,
        total_amount,
        months: rows.len() as u32,
        first_payment_date: rows.first().map(|r| r.date),
        last_payment_date: rows.last().map(|r| r.date),
        final_balance: rows.last().map_or(loan.principal, |r| r.closing_balance),
        termination,
    })
}

fn total(mut amounts: impl Iterator<Item = Money>, context: &str) -> FinCalcResult<Money> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or_else(|| overflow(context))
    })
}

/// Group ledger rows by calendar year, in schedule order.
pub fn yearly_breakdown(rows: &[LedgerRow]) -> FinCalcResult<Vec<YearlyBreakdown>> {
    let mut years: Vec<YearlyBreakdown> = Vec::new();
    for row in rows {
        let year = row.date.year();
        match years.last_mut() {
            Some(current) if current.year == year => {
                let add = |a: Money, b: Money| a.checked_add(b).ok_or_else(|| overflow(format!("{year} totals")));
                current.principal = add(current.principal, row.principal)?;
                current.interest = add(current.interest, row.interest)?;
                current.prepayment = add(current.prepayment, row.prepayment)?;
                current.closing_balance = row.closing_balance;
            }
            _ => years.push(YearlyBreakdown {
                year,
                principal: row.principal,
                interest: row.interest,
                prepayment: row.prepayment,
                closing_balance: row.closing_balance,
            }),
        }
    }
    Ok(years)
}

fn compare(with_events: &Simulation, plain: &Simulation) -> FinCalcResult<BaselineComparison> {
    let interest = |sim: &Simulation| total(sim.rows.iter().map(|r| r.interest), "baseline interest");
    let baseline_interest = interest(plain)?;
    let interest_saved = baseline_interest
        .checked_sub(interest(with_events)?)
        .ok_or_else(|| overflow("interest saved"))?;
    Ok(BaselineComparison {
        baseline_months: plain.rows.len() as u32,
        baseline_interest,
        interest_saved,
        months_saved: plain.rows.len() as i64 - with_events.rows.len() as i64,
    })
}

/// Plain-text loan summary suitable for download or sharing.
pub fn render_summary_text(loan: &LoanParameters, schedule: &AmortizationSchedule) -> String {
    let s = &schedule.summary;
    let mut lines = vec![
        "Loan Summary".to_string(),
        format!("Loan Amount: {}", format_inr(s.loan_amount)),
        format!("Interest Rate: {}", format_percentage(loan.annual_interest_rate)),
        format!("Loan Tenure: {} years", loan.tenure_years),
        format!("EMI: {}", format_inr(s.initial_emi)),
        format!("Total Interest: {}", format_inr(s.total_interest)),
    ];
    if !s.total_prepayment.is_zero() {
        lines.push(format!("Total Prepayment: {}", format_inr(s.total_prepayment)));
    }
    lines.push(format!("Total Amount: {}", format_inr(s.total_amount)));
    lines.push(format!("Start Date: {}", loan.start_date.format("%b %d, %Y")));
    if let Some(last) = s.last_payment_date {
        lines.push(format!("Last Payment: {}", last.format("%b %d, %Y")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> AmortizationInput {
        AmortizationInput {
            loan: LoanParameters {
                principal: dec!(1_000_000),
                annual_interest_rate: dec!(10),
                tenure_years: 5,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            prepayments: vec![],
            rate_changes: vec![],
            emi_changes: vec![],
            options: ScheduleOptions::default(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let out = generate_amortization_schedule(&input()).unwrap();
        let s = &out.result.summary;
        assert_eq!(s.months, 60);
        assert_eq!(s.initial_emi, dec!(21247.04));
        assert!((s.total_interest - dec!(274822.76)).abs() < dec!(0.01));
        assert_eq!(s.total_amount, s.loan_amount + s.total_interest);
        assert!(out.result.baseline.is_none());
    }

    #[test]
    fn test_yearly_breakdown_five_years() {
        let out = generate_amortization_schedule(&input()).unwrap();
        let yearly = &out.result.yearly;
        assert_eq!(yearly.len(), 5);
        assert_eq!(yearly[0].year, 2024);
        assert_eq!(yearly[4].year, 2028);
        // Interest share falls every year on a reducing balance
        for pair in yearly.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
            assert!(pair[1].principal > pair[0].principal);
        }
    }

    #[test]
    fn test_summary_text() {
        let inp = input();
        let out = generate_amortization_schedule(&inp).unwrap();
        let text = render_summary_text(&inp.loan, &out.result);
        assert!(text.starts_with("Loan Summary\n"));
        assert!(text.contains("Loan Amount: ₹10,00,000"));
        assert!(text.contains("Interest Rate: 10.00%"));
        assert!(text.contains("EMI: ₹21,247"));
        assert!(text.contains("Start Date: Jan 01, 2024"));
        assert!(text.contains("Last Payment: Dec 01, 2028"));
        assert!(!text.contains("Total Prepayment"));
        assert_eq!(text.lines().count(), 9);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let inp = input();
        let row = |month: u32| LedgerRow {
            month,
            date: inp.loan.start_date,
            opening_balance: Decimal::MAX,
            rate_percent: dec!(10),
            emi: dec!(1),
            interest: Decimal::MAX,
            principal: Decimal::ZERO,
            prepayment: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            cumulative_principal_paid: Decimal::ZERO,
            closing_balance: Decimal::MAX,
        };
        let rows = vec![row(1), row(2)];
        let termination = Termination::TenureExhausted {
            outstanding: Decimal::MAX,
        };
        assert!(matches!(
            summarize(&inp.loan, &rows, termination),
            Err(crate::FinCalcError::NumericOverflow { .. })
        ));
        assert!(yearly_breakdown(&rows).is_err());
    }
}
