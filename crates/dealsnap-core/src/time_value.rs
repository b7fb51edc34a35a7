use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DealSnapError;
use crate::types::{Money, Rate};
use crate::DealSnapResult;

/// Starting point for Newton-Raphson when the caller has no better estimate.
pub const DEFAULT_IRR_GUESS: Rate = dec!(0.10);

const STEP_TOLERANCE: Decimal = dec!(0.000001);
const MAX_NEWTON_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 100;
const NEWTON_CEILING: Rate = dec!(100);

// Candidate bracket ends, widest first. Long streams overflow the decimal range
// near -99%, so the first endpoint whose NPV can be evaluated is used.
const LOWER_BRACKET: [Rate; 7] = [
    dec!(-0.99),
    dec!(-0.95),
    dec!(-0.9),
    dec!(-0.8),
    dec!(-0.7),
    dec!(-0.5),
    dec!(0),
];
const UPPER_BRACKET: [Rate; 5] = [dec!(10), dec!(5), dec!(3), dec!(2), dec!(1)];

/// Which phase of the solver produced the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    NewtonRaphson,
    Bisection,
}

/// A solved internal rate of return with solver diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic rate as a decimal (0.12 = 12%)
    pub rate: Rate,
    pub method: IrrMethod,
    /// Iterations spent in the phase that converged
    pub iterations: u32,
}

/// Net Present Value of a series of cash flows, `cash_flows[0]` at t = 0.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> DealSnapResult<Money> {
    if rate <= dec!(-1) {
        return Err(DealSnapError::invalid(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }

    npv_and_derivative(rate, cash_flows)
        .map(|(value, _)| value)
        .ok_or_else(|| {
            DealSnapError::invalid("rate", format!("Discount factors at {rate} exceed decimal range"))
        })
}

/// Internal Rate of Return, returning only the rate.
pub fn irr(cash_flows: &[Money], guess: Rate) -> DealSnapResult<Rate> {
    solve_irr(cash_flows, guess).map(|s| s.rate)
}

/// Internal Rate of Return using Newton-Raphson, falling back to bisection.
///
/// Phase 1 iterates Newton-Raphson from `guess` until the step is below 1e-6.
/// A zero or non-finite slope, a step leaving (-100%, 10 000%), or exhausting the
/// iteration cap moves the solver to phase 2: bisection over the widest evaluable
/// bracket inside [-0.99, 10]. Phase 2 fails with `RootNotBracketed` when the NPV
/// has the same sign at both ends.
pub fn solve_irr(cash_flows: &[Money], guess: Rate) -> DealSnapResult<IrrSolution> {
    validate_stream(cash_flows)?;
    run(
        cash_flows,
        SolverPhase::Newton {
            rate: guess,
            iteration: 0,
        },
    )
}

/// Bisection phase on its own, for callers that want a bracketed answer.
pub fn bisect_irr(cash_flows: &[Money]) -> DealSnapResult<IrrSolution> {
    validate_stream(cash_flows)?;
    let start = enter_bisection(cash_flows)?;
    run(cash_flows, start)
}

fn validate_stream(cash_flows: &[Money]) -> DealSnapResult<()> {
    if cash_flows.len() < 2 {
        return Err(DealSnapError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Solver state machine
// ---------------------------------------------------------------------------

enum SolverPhase {
    Newton {
        rate: Rate,
        iteration: u32,
    },
    Bisection {
        lower: Rate,
        upper: Rate,
        npv_lower: Money,
        iteration: u32,
    },
    Converged(IrrSolution),
}

fn run(cash_flows: &[Money], start: SolverPhase) -> DealSnapResult<IrrSolution> {
    let mut phase = start;
    loop {
        phase = match phase {
            SolverPhase::Newton { rate, iteration } => newton_step(cash_flows, rate, iteration)?,
            SolverPhase::Bisection {
                lower,
                upper,
                npv_lower,
                iteration,
            } => bisection_step(cash_flows, lower, upper, npv_lower, iteration)?,
            SolverPhase::Converged(solution) => return Ok(solution),
        };
    }
}

fn newton_step(cash_flows: &[Money], rate: Rate, iteration: u32) -> DealSnapResult<SolverPhase> {
    if iteration >= MAX_NEWTON_ITERATIONS {
        debug!("IRR: Newton-Raphson hit {MAX_NEWTON_ITERATIONS} iterations at {rate}");
        return enter_bisection(cash_flows);
    }

    let Some((value, slope)) = npv_and_derivative(rate, cash_flows) else {
        debug!("IRR: NPV not evaluable at {rate}");
        return enter_bisection(cash_flows);
    };

    if value.is_zero() {
        return Ok(converged(rate, IrrMethod::NewtonRaphson, iteration));
    }

    if slope.is_zero() {
        debug!("IRR: zero derivative at {rate}");
        return enter_bisection(cash_flows);
    }

    let next = value
        .checked_div(slope)
        .and_then(|step| rate.checked_sub(step));
    let Some(next) = next else {
        debug!("IRR: Newton step overflowed at {rate}");
        return enter_bisection(cash_flows);
    };

    if next <= dec!(-1) || next > NEWTON_CEILING {
        debug!("IRR: Newton-Raphson diverged to {next}");
        return enter_bisection(cash_flows);
    }

    if (next - rate).abs() < STEP_TOLERANCE {
        return Ok(converged(next, IrrMethod::NewtonRaphson, iteration + 1));
    }

    Ok(SolverPhase::Newton {
        rate: next,
        iteration: iteration + 1,
    })
}

fn enter_bisection(cash_flows: &[Money]) -> DealSnapResult<SolverPhase> {
    let lower = first_evaluable(cash_flows, &LOWER_BRACKET);
    let upper = first_evaluable(cash_flows, &UPPER_BRACKET);

    let (Some((lower, npv_lower)), Some((upper, npv_upper))) = (lower, upper) else {
        return Err(DealSnapError::RootNotBracketed {
            function: "IRR".into(),
            lower: LOWER_BRACKET[0],
            upper: UPPER_BRACKET[0],
        });
    };

    debug!("IRR: bisection over [{lower}, {upper}]");

    if npv_lower.is_zero() {
        return Ok(converged(lower, IrrMethod::Bisection, 0));
    }
    if npv_upper.is_zero() {
        return Ok(converged(upper, IrrMethod::Bisection, 0));
    }
    if npv_lower.is_sign_positive() == npv_upper.is_sign_positive() {
        return Err(DealSnapError::RootNotBracketed {
            function: "IRR".into(),
            lower,
            upper,
        });
    }

    Ok(SolverPhase::Bisection {
        lower,
        upper,
        npv_lower,
        iteration: 0,
    })
}

fn bisection_step(
    cash_flows: &[Money],
    lower: Rate,
    upper: Rate,
    npv_lower: Money,
    iteration: u32,
) -> DealSnapResult<SolverPhase> {
    let mid = (lower + upper) / dec!(2);

    if upper - lower < STEP_TOLERANCE {
        return Ok(converged(mid, IrrMethod::Bisection, iteration));
    }

    if iteration >= MAX_BISECTION_ITERATIONS {
        return Err(DealSnapError::ConvergenceFailure {
            function: "IRR (bisection)".into(),
            iterations: iteration,
            last_delta: upper - lower,
        });
    }

    let npv_mid = npv_and_derivative(mid, cash_flows)
        .map(|(value, _)| value)
        .ok_or_else(|| DealSnapError::ConvergenceFailure {
            function: "IRR (bisection)".into(),
            iterations: iteration,
            last_delta: upper - lower,
        })?;

    if npv_mid.is_zero() {
        return Ok(converged(mid, IrrMethod::Bisection, iteration + 1));
    }

    if npv_mid.is_sign_positive() == npv_lower.is_sign_positive() {
        Ok(SolverPhase::Bisection {
            lower: mid,
            upper,
            npv_lower: npv_mid,
            iteration: iteration + 1,
        })
    } else {
        Ok(SolverPhase::Bisection {
            lower,
            upper: mid,
            npv_lower,
            iteration: iteration + 1,
        })
    }
}

fn converged(rate: Rate, method: IrrMethod, iterations: u32) -> SolverPhase {
    debug!("IRR: {method:?} converged to {rate} after {iterations} iterations");
    SolverPhase::Converged(IrrSolution {
        rate,
        method,
        iterations,
    })
}

fn first_evaluable(cash_flows: &[Money], candidates: &[Rate]) -> Option<(Rate, Money)> {
    candidates.iter().find_map(|&rate| {
        npv_and_derivative(rate, cash_flows).map(|(value, _)| (rate, value))
    })
}

/// NPV(r) = sum CF_t / (1+r)^t and its derivative d(NPV)/dr.
/// `None` when a discount factor or a term leaves the decimal range.
fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Money, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut value = Decimal::ZERO;
    let mut slope = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_div(one_plus_r)?;
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = cf
                .checked_mul(discount)?
                .checked_mul(Decimal::from(t as u64))?
                .checked_div(one_plus_r)?;
            slope = slope.checked_sub(term)?;
        }
        value = value.checked_add(cf.checked_mul(discount)?)?;
    }

    Some((value, slope))
}
