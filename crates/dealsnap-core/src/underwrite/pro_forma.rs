use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::income::IncomeProjector;
use crate::debt::AmortizationSchedule;
use crate::signals::dscr;
use crate::types::{Money, Percent};

/// One year of the hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProFormaYear {
    pub year: u32,
    pub gpr: Money,
    pub other_income: Money,
    pub vacancy_loss: Money,
    pub egi: Money,
    pub operating_expenses: Money,
    pub management_fee: Money,
    pub capex_reserve: Money,
    pub total_opex: Money,
    pub noi: Money,
    pub debt_service: Money,
    pub cash_flow: Money,
    pub cash_on_cash_pct: Percent,
    /// NOI / debt service; `None` when there is no debt service
    pub dscr: Option<Decimal>,
    pub principal_paydown: Money,
    pub beginning_loan_balance: Money,
    pub ending_loan_balance: Money,
    /// NOI capitalised at the exit cap rate
    pub property_value: Money,
    pub is_interest_only_year: bool,
    pub interest_only_months_in_year: u32,
}

/// Build years 1..=hold_years in chronological order.
pub fn build_pro_forma(
    projector: &IncomeProjector,
    schedule: &AmortizationSchedule,
    hold_years: u32,
    equity_invested: Money,
    exit_cap_rate_pct: Percent,
) -> Vec<ProFormaYear> {
    (1..=hold_years)
        .map(|year| {
            let ops = projector.year(year);
            let debt = schedule.year(year);

            let cash_flow = ops.noi - debt.debt_service;
            let cash_on_cash_pct = if equity_invested > Decimal::ZERO {
                cash_flow / equity_invested * dec!(100)
            } else {
                Decimal::ZERO
            };

            let row = ProFormaYear {
                year,
                gpr: ops.gross_potential_rent,
                other_income: ops.other_income,
                vacancy_loss: ops.vacancy_loss,
                egi: ops.effective_gross_income,
                operating_expenses: ops.operating_expenses,
                management_fee: ops.management_fee,
                capex_reserve: ops.capex_reserve,
                total_opex: ops.total_opex,
                noi: ops.noi,
                debt_service: debt.debt_service,
                cash_flow,
                cash_on_cash_pct,
                dscr: dscr(ops.noi, debt.debt_service),
                principal_paydown: debt.principal_paid,
                beginning_loan_balance: debt.beginning_balance,
                ending_loan_balance: debt.ending_balance,
                property_value: ops.noi / (exit_cap_rate_pct / dec!(100)),
                is_interest_only_year: debt.is_interest_only_year(),
                interest_only_months_in_year: debt.interest_only_months,
            };
            trace!(
                "pro forma year {}: NOI {} debt service {} cash flow {}",
                row.year,
                row.noi,
                row.debt_service,
                row.cash_flow
            );
            row
        })
        .collect()
}
