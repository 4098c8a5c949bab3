use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

/// EMI for a principal, annual rate in percent and tenure in years.
/// Amounts travel as decimal strings to keep precision across the boundary.
#[napi]
pub fn compute_emi(principal: String, annual_rate: String, tenure_years: String) -> NapiResult<String> {
    let emi = fincalc_core::loan::emi::compute_emi(
        parse_decimal("principal", &principal)?,
        parse_decimal("annual_rate", &annual_rate)?,
        parse_decimal("tenure_years", &tenure_years)?,
    )
    .map_err(to_napi_error)?;
    Ok(emi.to_string())
}

#[napi]
pub fn generate_amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::loan::summary::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::loan::summary::generate_amortization_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Plain-text loan summary for download.
#[napi]
pub fn loan_summary_text(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::loan::summary::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::loan::summary::generate_amortization_schedule(&input)
        .map_err(to_napi_error)?;
    Ok(fincalc_core::loan::summary::render_summary_text(
        &input.loan,
        &output.result,
    ))
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_sip(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::sip::SipInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investments::sip::calculate_sip(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sip_for_target(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::sip::SipTargetInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investments::sip::monthly_investment_for_target(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_lumpsum(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::lumpsum::LumpsumInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::investments::lumpsum::calculate_lumpsum(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_fixed_deposit(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::deposits::FixedDepositInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investments::deposits::calculate_fixed_deposit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_recurring_deposit(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::deposits::RecurringDepositInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::investments::deposits::calculate_recurring_deposit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_inflation(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::investments::inflation::InflationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::investments::inflation::calculate_inflation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[napi]
pub fn format_inr(amount: String) -> NapiResult<String> {
    Ok(fincalc_core::format::format_inr(parse_decimal("amount", &amount)?))
}

#[napi]
pub fn format_percentage(value: String) -> NapiResult<String> {
    Ok(fincalc_core::format::format_percentage(parse_decimal("value", &value)?))
}
