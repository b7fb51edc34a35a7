use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::income::IncomeProjector;
use super::inputs::DealInputs;
use super::pro_forma::ProFormaYear;
use crate::debt::AmortizationSchedule;
use crate::error::DealSnapError;
use crate::time_value::{solve_irr, IrrMethod, DEFAULT_IRR_GUESS};
use crate::types::{Money, Multiple, Percent};
use crate::DealSnapResult;

/// Sources and uses at acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalStack {
    pub total_acquisition_cost: Money,
    pub loan_amount: Money,
    pub loan_fees: Money,
    pub equity_invested: Money,
}

/// Exit and whole-hold return figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// NOI of the year after the hold, which a buyer prices off
    pub exit_noi: Money,
    pub sale_price: Money,
    pub selling_costs: Money,
    pub remaining_loan_balance: Money,
    pub net_sale_proceeds: Money,
    /// (sum of cash flows + net sale proceeds) / equity invested
    pub equity_multiple: Multiple,
    /// Levered IRR; `None` when the cash-flow stream has no root
    pub irr_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr_method: Option<IrrMethod>,
    /// t = 0 equity outflow, yearly cash flows, sale proceeds added to the final year
    pub equity_cash_flows: Vec<Money>,
}

/// Loan, fees and equity required to close.
///
/// Loan fees are paid from equity unless `finance_loan_fees` rolls them into the loan.
pub fn capital_stack(input: &DealInputs) -> CapitalStack {
    let price = input.purchase_price;
    let loan_fees = price * input.loan_fees_pct / dec!(100);
    let base_loan = price * (Decimal::ONE - input.down_payment_pct / dec!(100));
    let down_payment = price * input.down_payment_pct / dec!(100);

    let (loan_amount, cash_fees) = if input.finance_loan_fees {
        (base_loan + loan_fees, Decimal::ZERO)
    } else {
        (base_loan, loan_fees)
    };

    CapitalStack {
        total_acquisition_cost: price + input.renovation_budget + input.closing_costs + loan_fees,
        loan_amount,
        loan_fees,
        equity_invested: down_payment + input.closing_costs + input.renovation_budget + cash_fees,
    }
}

/// Price the exit and solve the equity IRR.
///
/// A stream with no IRR is not an error: `irr_pct` is `None` and a warning is pushed.
pub fn compute_returns(
    input: &DealInputs,
    projector: &IncomeProjector,
    schedule: &AmortizationSchedule,
    pro_forma: &[ProFormaYear],
    stack: &CapitalStack,
    warnings: &mut Vec<String>,
) -> DealSnapResult<ReturnMetrics> {
    let hold = input.hold_years;

    // Buyers pay for next year's income, so the exit is priced on year hold+1.
    let exit_noi = projector.year(hold + 1).noi;
    let sale_price = exit_noi / (input.exit_cap_rate_pct / dec!(100));
    let selling_costs = sale_price * input.selling_costs_pct / dec!(100);
    let remaining_loan_balance = schedule.balance_after(hold * 12);
    let net_sale_proceeds = sale_price - selling_costs - remaining_loan_balance;

    let mut equity_cash_flows = Vec::with_capacity(pro_forma.len() + 1);
    equity_cash_flows.push(-stack.equity_invested);
    equity_cash_flows.extend(pro_forma.iter().map(|y| y.cash_flow));
    if let Some(last) = equity_cash_flows.last_mut() {
        *last += net_sale_proceeds;
    }

    let total_returned: Money = equity_cash_flows.iter().skip(1).copied().sum();
    let equity_multiple = if stack.equity_invested > Decimal::ZERO {
        total_returned / stack.equity_invested
    } else {
        Decimal::ZERO
    };

    let (irr_pct, irr_method) = match solve_irr(&equity_cash_flows, DEFAULT_IRR_GUESS) {
        Ok(solution) => (Some(solution.rate * dec!(100)), Some(solution.method)),
        Err(e @ DealSnapError::RootNotBracketed { .. })
        | Err(e @ DealSnapError::ConvergenceFailure { .. }) => {
            warnings.push(format!("IRR could not be determined: {e}"));
            (None, None)
        }
        Err(e) => return Err(e),
    };

    if net_sale_proceeds < Decimal::ZERO {
        warnings.push(format!(
            "Net sale proceeds of {net_sale_proceeds:.0} are negative: the sale does not retire the loan"
        ));
    }

    Ok(ReturnMetrics {
        exit_noi,
        sale_price,
        selling_costs,
        remaining_loan_balance,
        net_sale_proceeds,
        equity_multiple,
        irr_pct,
        irr_method,
        equity_cash_flows,
    })
}
