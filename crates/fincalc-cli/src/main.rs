mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::investments::{FdArgs, InflationArgs, LumpsumArgs, RdArgs, SipArgs, SipTargetArgs};
use commands::loan::{AmortizationArgs, EmiArgs};

/// Loan amortization and savings calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Loan amortization and savings calculators",
    long_about = "Decimal-precision EMI and amortization schedules with prepayments, \
                  rate changes and EMI overrides, plus SIP, lumpsum, fixed deposit, \
                  recurring deposit and inflation projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log simulation steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly installment for a loan
    Emi(EmiArgs),
    /// Month-by-month loan schedule with prepayments and rate/EMI changes
    Amortization(AmortizationArgs),
    /// Systematic investment plan maturity value and schedule
    Sip(SipArgs),
    /// Monthly SIP needed to reach a target corpus
    SipTarget(SipTargetArgs),
    /// One-time investment growth
    Lumpsum(LumpsumArgs),
    /// Fixed deposit maturity
    Fd(FdArgs),
    /// Recurring deposit maturity
    Rd(RdArgs),
    /// Future cost of today's spending
    Inflation(InflationArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<commands::Rendered, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args).map(Into::into),
        Commands::Amortization(args) => commands::loan::run_amortization(args),
        Commands::Sip(args) => commands::investments::run_sip(args).map(Into::into),
        Commands::SipTarget(args) => commands::investments::run_sip_target(args).map(Into::into),
        Commands::Lumpsum(args) => commands::investments::run_lumpsum(args).map(Into::into),
        Commands::Fd(args) => commands::investments::run_fd(args).map(Into::into),
        Commands::Rd(args) => commands::investments::run_rd(args).map(Into::into),
        Commands::Inflation(args) => commands::investments::run_inflation(args).map(Into::into),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(commands::Rendered::Text(text)) => {
            println!("{text}");
            process::exit(0);
        }
        Ok(commands::Rendered::Value(value)) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
