use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use dealsnap_core::debt::{build_schedule, monthly_payment, LoanTerms, MAX_AMORT_YEARS};
use dealsnap_core::time_value::{self, IrrSolution, DEFAULT_IRR_GUESS};

use crate::input;

/// Arguments for loan payment and debt service
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate, percent
    #[arg(long)]
    pub rate_pct: Decimal,

    /// Amortisation period in years
    #[arg(long, default_value_t = 30)]
    pub amort_years: u32,

    /// Interest-only months before amortisation starts
    #[arg(long, default_value_t = 0)]
    pub interest_only_months: u32,

    /// Number of loan years to roll up (at most 40)
    #[arg(long, default_value_t = 1)]
    pub years: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = LoanTerms {
        principal: args.principal,
        annual_rate_pct: args.rate_pct,
        amort_years: args.amort_years,
        interest_only_months: args.interest_only_months,
        entire_loan_interest_only: false,
    };

    let level_payment = monthly_payment(args.principal, args.rate_pct, args.amort_years)?;
    if args.years == 0 || args.years > MAX_AMORT_YEARS {
        return Err(format!("--years must be between 1 and {MAX_AMORT_YEARS}").into());
    }
    let year_count = args.years;
    let schedule = build_schedule(&terms, year_count * 12)?;
    let years: Vec<_> = (1..=year_count).map(|y| schedule.year(y)).collect();

    Ok(json!({
        "result": {
            "monthly_payment": level_payment,
            "interest_only_payment": schedule.interest_only_payment,
            "amortizing_payment": schedule.amortizing_payment,
            "annual_debt_service": years,
        },
        "methodology": "Fixed-rate amortisation; full principal amortises after any interest-only months",
        "warnings": [],
    }))
}

/// JSON form of the `irr` command.
#[derive(Debug, Deserialize)]
struct IrrInput {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    guess: Option<Decimal>,
}

/// Arguments for IRR
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON input file with `cash_flows` and optional `guess`
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows from t = 0 (comma-separated, e.g. "-100,30,30,130")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Newton-Raphson starting rate as a decimal
    #[arg(long, allow_hyphen_values = true)]
    pub guess: Option<Decimal>,

    /// Skip Newton-Raphson and bisect the bracket directly
    #[arg(long)]
    pub bisection: bool,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = match input::load(args.input.as_deref())? {
        Some(record) => record,
        None => IrrInput {
            cash_flows: args
                .cash_flows
                .clone()
                .ok_or("--cash-flows is required (or provide --input)")?,
            guess: args.guess,
        },
    };

    let guess = irr_input.guess.unwrap_or(DEFAULT_IRR_GUESS);
    let solution: IrrSolution = if args.bisection {
        time_value::bisect_irr(&irr_input.cash_flows)?
    } else {
        time_value::solve_irr(&irr_input.cash_flows, guess)?
    };
    let residual = time_value::npv(solution.rate, &irr_input.cash_flows)?;

    Ok(json!({
        "result": {
            "irr_pct": solution.rate * Decimal::ONE_HUNDRED,
            "rate": solution.rate,
            "method": solution.method,
            "iterations": solution.iterations,
            "npv_at_irr": residual,
        },
        "methodology": "Newton-Raphson with bisection fallback over [-0.99, 10]",
        "warnings": [],
    }))
}
