use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use dealsnap_core::time_value::{self, DEFAULT_IRR_GUESS};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Underwriting
// ---------------------------------------------------------------------------

#[napi]
pub fn underwrite_deal(input_json: String) -> NapiResult<String> {
    let input: dealsnap_core::underwrite::DealInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dealsnap_core::underwrite::underwrite_deal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn snap_deal(input_json: String) -> NapiResult<String> {
    let input: dealsnap_core::quick::QuickModeInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dealsnap_core::quick::snap_deal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IrrRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    guess: Option<Decimal>,
}

#[napi]
pub fn solve_irr(input_json: String) -> NapiResult<String> {
    let request: IrrRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let solution = time_value::solve_irr(
        &request.cash_flows,
        request.guess.unwrap_or(DEFAULT_IRR_GUESS),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&solution).map_err(to_napi_error)
}
