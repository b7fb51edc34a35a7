use std::time::Instant;

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::income::IncomeProjector;
use super::inputs::{validate_deal_inputs, DealInputs};
use super::pro_forma::{build_pro_forma, ProFormaYear};
use super::returns::{capital_stack, compute_returns};
use super::verdict::{evaluate, Verdict, VerdictMetrics};
use crate::debt::{build_schedule, LoanTerms};
use crate::error::DealSnapError;
use crate::signals::{value_reality_check, ValueRealityCheck};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percent};
use crate::DealSnapResult;

/// DSCR below which year one is flagged even when it clears the investor's target.
const DSCR_WARNING_FLOOR: Decimal = dec!(1.20);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Year-one expense ratios, each as a percent of EGI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingRatios {
    /// Total opex (owner line items + management) / EGI
    pub expense_ratio_pct: Percent,
    pub management_pct: Percent,
    pub repairs_pct: Percent,
    pub capex_pct: Percent,
}

/// Loan figures a reviewer needs to re-derive the debt service by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditData {
    pub purchase_price: Money,
    pub down_payment_pct: Percent,
    pub loan_amount: Money,
    /// First payment of the loan (interest-only if the loan opens IO)
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
    pub exit_cap_rate_pct: Percent,
    pub interest_only_months: u32,
    pub io_monthly_payment: Money,
    pub amort_monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealResults {
    pub irr_pct: Option<Percent>,
    pub cash_on_cash_year1_pct: Percent,
    /// `None` for an all-cash deal
    pub dscr_year1: Option<Decimal>,
    pub cap_rate_year1_pct: Percent,
    pub equity_multiple: Multiple,
    pub equity_invested: Money,
    pub loan_amount: Money,
    pub loan_fees: Money,
    pub total_acquisition_cost: Money,
    pub noi_year1: Money,
    pub cash_flow_year1: Money,
    pub sale_price: Money,
    pub selling_costs: Money,
    pub remaining_loan_balance: Money,
    pub net_sale_proceeds: Money,
    /// Mean DSCR over the levered years of the hold
    pub avg_dscr: Option<Decimal>,
    pub pro_forma: Vec<ProFormaYear>,
    pub value_check: ValueRealityCheck,
    pub operating_ratios: OperatingRatios,
    pub audit_data: AuditData,
    pub warnings: Vec<String>,
    pub verdict: Verdict,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Underwrite a deal over its full hold period.
///
/// Validation failures abort. A missing IRR, an all-cash DSCR and other numeric
/// degeneracies are reported through `warnings` and the result is still returned.
pub fn underwrite_deal(input: &DealInputs) -> DealSnapResult<ComputationOutput<DealResults>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_deal_inputs(input, &mut warnings)?;

    // --- Capital stack and loan ---
    let stack = capital_stack(input);
    let terms = LoanTerms {
        principal: stack.loan_amount,
        annual_rate_pct: input.interest_rate_pct,
        amort_years: input.amort_years,
        interest_only_months: input.interest_only_months,
        entire_loan_interest_only: input.entire_loan_interest_only,
    };
    // One year past the hold so the exit balance and forward NOI line up.
    let schedule = build_schedule(&terms, (input.hold_years + 1) * 12)?;
    debug!(
        "loan {} at {}%: io payment {} amortising payment {}",
        stack.loan_amount,
        input.interest_rate_pct,
        schedule.interest_only_payment,
        schedule.amortizing_payment
    );

    // --- Operations ---
    let projector = IncomeProjector::new(input);
    for label in projector.skipped_management_items() {
        warnings.push(format!(
            "Expense '{label}' is categorised as management and was ignored; management is modelled as {}% of EGI",
            input.management_pct_of_egi
        ));
    }

    let pro_forma = build_pro_forma(
        &projector,
        &schedule,
        input.hold_years,
        stack.equity_invested,
        input.exit_cap_rate_pct,
    );
    let first = pro_forma.first().cloned().ok_or_else(|| {
        DealSnapError::InsufficientData("No pro forma years generated".into())
    })?;

    // --- Exit and returns ---
    let returns = compute_returns(input, &projector, &schedule, &pro_forma, &stack, &mut warnings)?;

    let levered: Vec<Decimal> = pro_forma.iter().filter_map(|y| y.dscr).collect();
    let avg_dscr = if levered.is_empty() {
        None
    } else {
        Some(levered.iter().copied().sum::<Decimal>() / Decimal::from(levered.len()))
    };

    let cap_rate_year1_pct = first.noi / input.purchase_price * dec!(100);

    // --- Diagnostics ---
    if stack.equity_invested <= Decimal::ZERO {
        warnings.push(
            "Equity invested is zero or negative; cash-on-cash and equity multiple are reported as 0"
                .into(),
        );
    }
    match first.dscr {
        Some(d) if d < DSCR_WARNING_FLOOR => warnings.push(format!(
            "Year-1 DSCR of {d:.2} is below {DSCR_WARNING_FLOOR}; most lenders will require a larger down payment"
        )),
        Some(_) => {}
        None => warnings.push(
            "No debt service (all-cash purchase); DSCR is undefined and reported as null".into(),
        ),
    }
    let negative_years: Vec<String> = pro_forma
        .iter()
        .filter(|y| y.cash_flow < Decimal::ZERO)
        .map(|y| y.year.to_string())
        .collect();
    if !negative_years.is_empty() {
        warnings.push(format!(
            "Negative cash flow in year(s) {}",
            negative_years.join(", ")
        ));
    }
    if first.capex_reserve > Decimal::ZERO {
        warnings.push(format!(
            "CapEx reserve of {:.0} in year 1 is not deducted from NOI; cash flow after reserves is {:.0}",
            first.capex_reserve,
            first.cash_flow - first.capex_reserve
        ));
    }

    // --- Ratios and audit trail ---
    let operating_ratios = operating_ratios(&projector, first.egi);
    let io_months_total = if input.entire_loan_interest_only {
        (input.hold_years + 1) * 12
    } else {
        input.interest_only_months
    };
    let audit_data = AuditData {
        purchase_price: input.purchase_price,
        down_payment_pct: input.down_payment_pct,
        loan_amount: stack.loan_amount,
        monthly_payment: schedule.months.first().map_or(Decimal::ZERO, |m| m.payment),
        annual_debt_service: first.debt_service,
        exit_cap_rate_pct: input.exit_cap_rate_pct,
        interest_only_months: io_months_total,
        io_monthly_payment: schedule.interest_only_payment,
        amort_monthly_payment: schedule.amortizing_payment,
    };

    let verdict = evaluate(
        &VerdictMetrics {
            irr_pct: returns.irr_pct,
            cash_on_cash_year1_pct: first.cash_on_cash_pct,
            dscr_year1: first.dscr,
            equity_invested: stack.equity_invested,
        },
        &input.targets,
    );
    debug!("verdict {:?}: {}", verdict.status, verdict.summary);

    let output = DealResults {
        irr_pct: returns.irr_pct,
        cash_on_cash_year1_pct: first.cash_on_cash_pct,
        dscr_year1: first.dscr,
        cap_rate_year1_pct,
        equity_multiple: returns.equity_multiple,
        equity_invested: stack.equity_invested,
        loan_amount: stack.loan_amount,
        loan_fees: stack.loan_fees,
        total_acquisition_cost: stack.total_acquisition_cost,
        noi_year1: first.noi,
        cash_flow_year1: first.cash_flow,
        sale_price: returns.sale_price,
        selling_costs: returns.selling_costs,
        remaining_loan_balance: returns.remaining_loan_balance,
        net_sale_proceeds: returns.net_sale_proceeds,
        avg_dscr,
        value_check: value_reality_check(first.noi, input.purchase_price),
        pro_forma,
        operating_ratios,
        audit_data,
        warnings: warnings.clone(),
        verdict,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Multi-year pro forma with levered IRR (Newton-Raphson, bisection fallback)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn operating_ratios(projector: &IncomeProjector, egi: Money) -> OperatingRatios {
    let y1 = projector.year(1);
    let pct_of_egi = |amount: Money| {
        if egi.is_zero() {
            Decimal::ZERO
        } else {
            amount / egi * dec!(100)
        }
    };
    OperatingRatios {
        expense_ratio_pct: pct_of_egi(y1.total_opex),
        management_pct: pct_of_egi(y1.management_fee),
        repairs_pct: pct_of_egi(y1.repairs),
        capex_pct: pct_of_egi(y1.capex_reserve),
    }
}
