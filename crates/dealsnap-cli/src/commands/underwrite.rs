use clap::Args;
use serde_json::Value;

use dealsnap_core::underwrite::{self, DealInputs};

use crate::input;

/// Arguments for full underwriting
#[derive(Args)]
pub struct UnderwriteArgs {
    /// Path to a JSON deal file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Emit only the year-by-year pro forma rows
    #[arg(long)]
    pub pro_forma: bool,
}

pub fn run_underwrite(args: UnderwriteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealInputs = input::load(args.input.as_deref())?
        .ok_or("--input <deal.json> or stdin required for underwriting")?;

    let result = underwrite::underwrite_deal(&deal)?;
    log::info!(
        "underwrote {} over {} years: {:?}",
        deal.property_name.as_deref().unwrap_or("deal"),
        deal.hold_years,
        result.result.verdict.status
    );

    if args.pro_forma {
        return Ok(serde_json::to_value(&result.result.pro_forma)?);
    }
    Ok(serde_json::to_value(result)?)
}
