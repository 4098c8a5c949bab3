use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use fincalc_core::loan::emi::{compute_emi, LoanParameters};
use fincalc_core::loan::events::{EmiChange, Prepayment, PrepaymentPolicy, RateChange};
use fincalc_core::loan::schedule::{DegenerateEmiPolicy, RecomputeHorizon, ScheduleOptions};
use fincalc_core::loan::summary::{generate_amortization_schedule, render_summary_text, AmortizationInput};

use crate::commands::Rendered;
use crate::input;

/// Arguments for a plain EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Decimal,

    /// Tenure in years, fractions allowed (e.g. 2.5)
    #[arg(long)]
    pub tenure_years: Decimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HorizonArg {
    /// Recompute over the full nominal tenure
    Full,
    /// Recompute over the months left in the tenure
    Remaining,
}

impl From<HorizonArg> for RecomputeHorizon {
    fn from(arg: HorizonArg) -> Self {
        match arg {
            HorizonArg::Full => RecomputeHorizon::FullTenure,
            HorizonArg::Remaining => RecomputeHorizon::RemainingTenure,
        }
    }
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Path to a JSON or YAML file holding the full amortization input
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long)]
    pub tenure_years: Option<u32>,

    /// First installment date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Prepayment as AMOUNT:DATE[:reduce_tenure|reduce_emi], repeatable
    #[arg(long = "prepayment", value_parser = parse_prepayment)]
    pub prepayments: Vec<Prepayment>,

    /// Rate change as RATE:DATE, repeatable
    #[arg(long = "rate-change", value_parser = parse_rate_change)]
    pub rate_changes: Vec<RateChange>,

    /// EMI override as AMOUNT:DATE, repeatable
    #[arg(long = "emi-change", value_parser = parse_emi_change)]
    pub emi_changes: Vec<EmiChange>,

    /// Months an EMI recompute amortizes over
    #[arg(long, value_enum, default_value = "full")]
    pub horizon: HorizonArg,

    /// Fail when an EMI no longer covers the month's interest
    #[arg(long)]
    pub reject_degenerate: bool,

    /// Skip the event-free comparison run
    #[arg(long)]
    pub no_baseline: bool,

    /// Print the plain-text loan summary instead of structured output
    #[arg(long)]
    pub summary_text: bool,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let emi = compute_emi(args.principal, args.rate, args.tenure_years)?;
    let months = (args.tenure_years * Decimal::from(12)).round();
    let total_payment = emi
        .checked_mul(months)
        .ok_or("total payment exceeds the supported decimal range")?;

    Ok(json!({
        "result": {
            "emi": emi,
            "months": months,
            "total_payment": total_payment,
            "total_interest": total_payment - args.principal,
        },
        "methodology": "Reducing-balance EMI, P*r*(1+r)^n / ((1+r)^n - 1)",
        "warnings": [],
    }))
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Rendered, Box<dyn std::error::Error>> {
    let summary_text = args.summary_text;
    let amortization_input = match input::load::<AmortizationInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => from_flags(args)?,
    };

    tracing::info!(
        principal = %amortization_input.loan.principal,
        rate = %amortization_input.loan.annual_interest_rate,
        tenure_years = amortization_input.loan.tenure_years,
        events = amortization_input.prepayments.len()
            + amortization_input.rate_changes.len()
            + amortization_input.emi_changes.len(),
        "generating amortization schedule"
    );

    let output = generate_amortization_schedule(&amortization_input)?;
    if summary_text {
        return Ok(Rendered::Text(render_summary_text(
            &amortization_input.loan,
            &output.result,
        )));
    }
    Ok(Rendered::Value(serde_json::to_value(output)?))
}

fn from_flags(args: AmortizationArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    let loan = LoanParameters {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
        tenure_years: args
            .tenure_years
            .ok_or("--tenure-years is required (or provide --input)")?,
        start_date: args
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    Ok(AmortizationInput {
        loan,
        prepayments: args.prepayments,
        rate_changes: args.rate_changes,
        emi_changes: args.emi_changes,
        options: ScheduleOptions {
            recompute_horizon: args.horizon.into(),
            degenerate_emi: if args.reject_degenerate {
                DegenerateEmiPolicy::Reject
            } else {
                DegenerateEmiPolicy::Warn
            },
            compare_with_baseline: !args.no_baseline,
        },
    })
}

// ---------------------------------------------------------------------------
// Event flag parsers
// ---------------------------------------------------------------------------

fn split_amount_date(raw: &str) -> Result<(Decimal, NaiveDate, Option<&str>), String> {
    let mut parts = raw.splitn(3, ':');
    let amount = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing amount in '{raw}'"))?;
    let date = parts
        .next()
        .ok_or_else(|| format!("missing date in '{raw}', expected AMOUNT:YYYY-MM-DD"))?;

    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{date}': {e}"))?;
    Ok((amount, date, parts.next()))
}

fn parse_prepayment(raw: &str) -> Result<Prepayment, String> {
    let (amount, effective_date, policy) = split_amount_date(raw)?;
    let policy = match policy.map(str::trim) {
        None | Some("reduce_tenure") | Some("tenure") => PrepaymentPolicy::ReduceTenure,
        Some("reduce_emi") | Some("emi") => PrepaymentPolicy::ReduceEmi,
        Some(other) => return Err(format!("unknown prepayment policy '{other}'")),
    };
    Ok(Prepayment {
        amount,
        effective_date,
        policy,
    })
}

fn parse_rate_change(raw: &str) -> Result<RateChange, String> {
    match split_amount_date(raw)? {
        (new_annual_rate, effective_date, None) => Ok(RateChange {
            new_annual_rate,
            effective_date,
        }),
        (_, _, Some(_)) => Err(format!("expected RATE:YYYY-MM-DD, got '{raw}'")),
    }
}

fn parse_emi_change(raw: &str) -> Result<EmiChange, String> {
    match split_amount_date(raw)? {
        (new_emi_amount, effective_date, None) => Ok(EmiChange {
            new_emi_amount,
            effective_date,
        }),
        (_, _, Some(_)) => Err(format!("expected AMOUNT:YYYY-MM-DD, got '{raw}'")),
    }
}
