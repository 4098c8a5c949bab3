use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::investments::deposits::{
    calculate_fixed_deposit, calculate_recurring_deposit, Compounding, FixedDepositInput,
    RecurringDepositInput, TenureUnit,
};
use fincalc_core::investments::inflation::{calculate_inflation, InflationInput};
use fincalc_core::investments::lumpsum::{calculate_lumpsum, LumpsumInput};
use fincalc_core::investments::sip::{
    calculate_sip, monthly_investment_for_target, SipInput, SipTargetInput,
};

use crate::input;

/// Arguments for a SIP projection
#[derive(Args)]
pub struct SipArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested every month
    #[arg(long)]
    pub monthly_investment: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Investment period in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Annual inflation in percent, for the real-terms value
    #[arg(long, default_value = "0")]
    pub inflation: Decimal,

    /// Date of the first installment (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the monthly SIP needed to reach a target
#[derive(Args)]
pub struct SipTargetArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Corpus to accumulate
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Investment period in years
    #[arg(long)]
    pub years: Option<u32>,
}

/// Arguments for a one-time investment
#[derive(Args)]
pub struct LumpsumArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested today
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub years: Option<u32>,

    /// Annual inflation in percent
    #[arg(long, default_value = "0")]
    pub inflation: Decimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompoundingArg {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl From<CompoundingArg> for Compounding {
    fn from(arg: CompoundingArg) -> Self {
        match arg {
            CompoundingArg::Monthly => Compounding::Monthly,
            CompoundingArg::Quarterly => Compounding::Quarterly,
            CompoundingArg::HalfYearly => Compounding::HalfYearly,
            CompoundingArg::Yearly => Compounding::Yearly,
        }
    }
}

/// Arguments for a fixed deposit
#[derive(Args)]
pub struct FdArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Deposit amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure length, in years unless --months is given
    #[arg(long)]
    pub tenure: Option<Decimal>,

    /// Read --tenure as months
    #[arg(long)]
    pub months: bool,

    #[arg(long, value_enum, default_value = "quarterly")]
    pub compounding: CompoundingArg,
}

/// Arguments for a recurring deposit
#[derive(Args)]
pub struct RdArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Amount deposited every month
    #[arg(long)]
    pub monthly_deposit: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub years: Option<u32>,
}

/// Arguments for an inflation projection
#[derive(Args)]
pub struct InflationArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Today's cost
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual inflation in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub years: Option<u32>,
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sip_input = match input::load::<SipInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => SipInput {
            monthly_investment: args
                .monthly_investment
                .ok_or("--monthly-investment is required (or provide --input)")?,
            expected_return_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            inflation_rate: args.inflation,
            start_date: args
                .start_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        },
    };
    let output = calculate_sip(&sip_input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_sip_target(args: SipTargetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let target_input = match input::load::<SipTargetInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => SipTargetInput {
            target_amount: args.target.ok_or("--target is required (or provide --input)")?,
            expected_return_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        },
    };
    let output = monthly_investment_for_target(&target_input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_lumpsum(args: LumpsumArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lumpsum_input = match input::load::<LumpsumInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LumpsumInput {
            investment: args.amount.ok_or("--amount is required (or provide --input)")?,
            expected_return_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            inflation_rate: args.inflation,
        },
    };
    let output = calculate_lumpsum(&lumpsum_input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_fd(args: FdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fd_input = match input::load::<FixedDepositInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => FixedDepositInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure: args.tenure.ok_or("--tenure is required (or provide --input)")?,
            tenure_unit: if args.months {
                TenureUnit::Months
            } else {
                TenureUnit::Years
            },
            compounding: args.compounding.into(),
        },
    };
    let output = calculate_fixed_deposit(&fd_input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_rd(args: RdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rd_input = match input::load::<RecurringDepositInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RecurringDepositInput {
            monthly_deposit: args
                .monthly_deposit
                .ok_or("--monthly-deposit is required (or provide --input)")?,
            interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        },
    };
    let output = calculate_recurring_deposit(&rd_input)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_inflation(args: InflationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inflation_input = match input::load::<InflationInput>(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => InflationInput {
            current_amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            inflation_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        },
    };
    let output = calculate_inflation(&inflation_input)?;
    Ok(serde_json::to_value(output)?)
}
