use std::time::Instant;

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::defaults::{
    capex_reserve_pct, estimate_taxes, expense_ratio_pct, insurance_per_unit,
    ExpenseResponsibility, InsuranceRisk, PropertyCondition, PropertyType,
};
use super::triage::{score_triage, TriageScore, TriageVerdict};
use crate::debt::{monthly_payment, MAX_AMORT_YEARS};
use crate::error::DealSnapError;
use crate::signals::{dscr, dscr_note, dscr_signal, value_reality_check, ValuationPoint, ValueRealityCheck};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percent, Signal};
use crate::validation::{amount, in_range, unit_count, years_in_range};
use crate::DealSnapResult;

/// Coverage a lender typically underwrites to.
const LENDER_DSCR: Decimal = dec!(1.25);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Minimal inputs for a first-pass screen. Everything not supplied comes from
/// the smart-default matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickModeInputs {
    #[serde(default)]
    pub property_name: Option<String>,
    pub units: u32,
    pub avg_monthly_rent: Money,
    pub purchase_price: Money,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub property_condition: PropertyCondition,
    #[serde(default = "default_vacancy")]
    pub vacancy_pct: Percent,
    #[serde(default)]
    pub expense_responsibility: ExpenseResponsibility,
    #[serde(default)]
    pub insurance_risk: InsuranceRisk,
    #[serde(default = "default_down_payment")]
    pub down_payment_pct: Percent,
    #[serde(default = "default_interest_rate")]
    pub interest_rate_pct: Percent,
    #[serde(default = "default_amort_years")]
    pub amort_years: u32,
    /// Known annual tax bill; wins over `tax_rate_pct`
    #[serde(default)]
    pub annual_taxes: Option<Money>,
    #[serde(default)]
    pub tax_rate_pct: Option<Percent>,
    /// Monthly rent bump per unit in dollars; wins over `rent_lift_pct`
    #[serde(default)]
    pub rent_lift_amount: Option<Money>,
    #[serde(default)]
    pub rent_lift_pct: Option<Percent>,
    #[serde(default = "default_target_cap")]
    pub target_cap_rate_pct: Percent,
}

fn default_vacancy() -> Percent {
    dec!(8)
}
fn default_down_payment() -> Percent {
    dec!(25)
}
fn default_interest_rate() -> Percent {
    dec!(7)
}
fn default_amort_years() -> u32 {
    25
}
fn default_target_cap() -> Percent {
    dec!(8)
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeAnalysis {
    pub gross_scheduled_rent: Money,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
}

/// Ratio-driven expenses. Taxes and insurance are reference estimates inside
/// `operating_expenses`, not additions to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    pub expense_ratio_pct: Percent,
    pub operating_expenses: Money,
    pub noi: Money,
    pub capex_reserve_pct: Percent,
    /// Reported only; not deducted from NOI
    pub capex_reserve: Money,
    pub estimated_taxes: Money,
    pub estimated_insurance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceRealityCheck {
    pub loan_amount: Money,
    /// Down payment
    pub cash_required: Money,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
    /// `None` with no debt
    pub dscr: Option<Decimal>,
    pub dscr_signal: Signal,
    pub dscr_note: String,
    pub noi_after_debt_service: Money,
}

/// What has to be true for the deal to work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseEngineering {
    pub target_cap_rate_pct: Percent,
    pub expense_ratio_pct: Percent,
    /// Rent per unit at which NOI just covers debt service
    pub breakeven_rent_per_unit: Option<Money>,
    /// NOI / target cap rate
    pub max_price_at_target_cap: Money,
    /// 1.25 × annual debt service
    pub noi_for_dscr_1_25: Money,
    /// NOI the asking price implies at the target cap rate
    pub required_noi: Money,
    pub required_egi: Option<Money>,
    pub required_avg_rent: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentLiftSensitivity {
    pub current_rent: Money,
    pub lifted_rent: Money,
    pub lift_amount: Money,
    pub lift_pct: Percent,
    pub new_gsr: Money,
    pub new_egi: Money,
    pub new_noi: Money,
    pub new_cap_rate_pct: Percent,
    pub new_dscr: Option<Decimal>,
    pub new_dscr_signal: Signal,
    pub new_value_range: Vec<ValuationPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickModeResults {
    pub income: IncomeAnalysis,
    pub expenses: ExpenseAnalysis,
    pub value_check: ValueRealityCheck,
    pub finance_check: FinanceRealityCheck,
    pub reverse_engineering: ReverseEngineering,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_sensitivity: Option<RentLiftSensitivity>,
    pub triage: TriageScore,
    pub purchase_cap_rate_pct: Percent,
    /// Price / annual gross scheduled rent
    pub grm: Multiple,
    pub price_per_unit: Money,
    pub investor_notes: Vec<String>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Single-year screen of a deal from a handful of inputs.
pub fn snap_deal(input: &QuickModeInputs) -> DealSnapResult<ComputationOutput<QuickModeResults>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_quick_inputs(input)?;

    let units = Decimal::from(input.units);
    let price = input.purchase_price;

    // --- Income ---
    let income = income_at_rent(input, input.avg_monthly_rent);

    // --- Expenses ---
    let ratio = expense_ratio_pct(
        input.property_type,
        input.property_condition,
        input.expense_responsibility,
    );
    let operating_expenses = income.effective_gross_income * ratio / dec!(100);
    let noi = income.effective_gross_income - operating_expenses;
    let capex_pct = capex_reserve_pct(input.property_type, input.property_condition);
    let estimated_taxes = estimate_taxes(price, input.annual_taxes, input.tax_rate_pct);
    let estimated_insurance = insurance_per_unit(input.insurance_risk) * units;

    if estimated_taxes + estimated_insurance > operating_expenses {
        warnings.push(format!(
            "Estimated taxes ({:.0}) and insurance ({:.0}) exceed the {}% expense ratio allowance of {:.0}; the ratio likely understates costs",
            estimated_taxes, estimated_insurance, ratio, operating_expenses
        ));
    }

    let expenses = ExpenseAnalysis {
        expense_ratio_pct: ratio,
        operating_expenses,
        noi,
        capex_reserve_pct: capex_pct,
        capex_reserve: income.effective_gross_income * capex_pct / dec!(100),
        estimated_taxes,
        estimated_insurance,
    };

    // --- Finance ---
    let loan_amount = price * (Decimal::ONE - input.down_payment_pct / dec!(100));
    let payment = monthly_payment(loan_amount, input.interest_rate_pct, input.amort_years)?;
    let annual_debt_service = payment * dec!(12);
    let dscr = dscr(noi, annual_debt_service);
    let finance_check = FinanceRealityCheck {
        loan_amount,
        cash_required: price - loan_amount,
        monthly_payment: payment,
        annual_debt_service,
        dscr,
        dscr_signal: dscr_signal(dscr),
        dscr_note: dscr_note(dscr).to_string(),
        noi_after_debt_service: noi - annual_debt_service,
    };
    if dscr.is_none() {
        warnings.push("No loan (100% down); DSCR is undefined and reported as null".into());
    }

    // --- Reverse engineering ---
    let reverse_engineering =
        reverse_engineer(input, ratio, noi, annual_debt_service);

    // --- Rent lift ---
    let rent_sensitivity = rent_lift(input, ratio, annual_debt_service, &mut warnings);

    // --- Headline ratios and triage ---
    let purchase_cap_rate_pct = noi / price * dec!(100);
    let grm = price / income.gross_scheduled_rent;
    let price_per_unit = price / units;
    let triage = score_triage(
        purchase_cap_rate_pct,
        dscr,
        ratio,
        grm,
        finance_check.dscr_signal,
    );
    debug!(
        "triage {:?}: {} points (cap {}, dscr {}, expense {}, grm {}, signal {})",
        triage.verdict,
        triage.total_score,
        triage.cap_rate_score,
        triage.dscr_score,
        triage.expense_ratio_score,
        triage.grm_score,
        triage.dscr_signal_score
    );

    let investor_notes = investor_notes(
        input,
        &triage,
        purchase_cap_rate_pct,
        grm,
        &finance_check,
        &reverse_engineering,
        rent_sensitivity.as_ref(),
    );

    let output = QuickModeResults {
        value_check: value_reality_check(noi, price),
        income,
        expenses,
        finance_check,
        reverse_engineering,
        rent_sensitivity,
        triage,
        purchase_cap_rate_pct,
        grm,
        price_per_unit,
        investor_notes,
        warnings: warnings.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Single-year quick screen with smart-default expense ratios and points triage",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_quick_inputs(input: &QuickModeInputs) -> DealSnapResult<()> {
    unit_count(input.units)?;
    if input.avg_monthly_rent <= Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "avg_monthly_rent",
            "Average rent must be positive",
        ));
    }
    if input.purchase_price <= Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "purchase_price",
            "Purchase price must be positive",
        ));
    }
    amount("avg_monthly_rent", input.avg_monthly_rent)?;
    amount("purchase_price", input.purchase_price)?;
    in_range("vacancy_pct", input.vacancy_pct, dec!(0), dec!(100))?;
    in_range("down_payment_pct", input.down_payment_pct, dec!(0), dec!(100))?;
    in_range("interest_rate_pct", input.interest_rate_pct, dec!(0), dec!(30))?;
    years_in_range("amort_years", input.amort_years, 1, MAX_AMORT_YEARS)?;
    if let Some(taxes) = input.annual_taxes {
        amount("annual_taxes", taxes)?;
    }
    if let Some(rate) = input.tax_rate_pct {
        in_range("tax_rate_pct", rate, dec!(0), dec!(10))?;
    }
    if input.target_cap_rate_pct <= Decimal::ZERO || input.target_cap_rate_pct > dec!(20) {
        return Err(DealSnapError::invalid(
            "target_cap_rate_pct",
            "Target cap rate must be greater than 0% and at most 20%",
        ));
    }
    if let Some(lift) = input.rent_lift_amount {
        amount("rent_lift_amount", lift.abs())?;
        if input.avg_monthly_rent + lift <= Decimal::ZERO {
            return Err(DealSnapError::invalid(
                "rent_lift_amount",
                "Rent lift cannot take rent to zero or below",
            ));
        }
    }
    if let Some(pct) = input.rent_lift_pct {
        if pct <= dec!(-100) {
            return Err(DealSnapError::invalid(
                "rent_lift_pct",
                "Rent lift cannot take rent to zero or below",
            ));
        }
        if pct > dec!(1000) {
            return Err(DealSnapError::invalid(
                "rent_lift_pct",
                "Rent lift cannot exceed 1000%",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn income_at_rent(input: &QuickModeInputs, rent: Money) -> IncomeAnalysis {
    let gross_scheduled_rent = Decimal::from(input.units) * rent * dec!(12);
    let vacancy_loss = gross_scheduled_rent * input.vacancy_pct / dec!(100);
    IncomeAnalysis {
        gross_scheduled_rent,
        vacancy_loss,
        effective_gross_income: gross_scheduled_rent - vacancy_loss,
    }
}

/// NOI retained per dollar of gross scheduled rent.
fn retention(input: &QuickModeInputs, ratio: Percent) -> Decimal {
    (Decimal::ONE - input.vacancy_pct / dec!(100)) * (Decimal::ONE - ratio / dec!(100))
}

fn reverse_engineer(
    input: &QuickModeInputs,
    ratio: Percent,
    noi: Money,
    annual_debt_service: Money,
) -> ReverseEngineering {
    let units = Decimal::from(input.units);
    let retained = retention(input, ratio);

    // units × rent × 12 × retained = debt service
    let breakeven_rent_per_unit = if retained > Decimal::ZERO {
        Some(annual_debt_service / (units * dec!(12) * retained))
    } else {
        None
    };

    let required_noi = input.purchase_price * input.target_cap_rate_pct / dec!(100);
    let expense_keep = Decimal::ONE - ratio / dec!(100);
    let required_egi = if expense_keep > Decimal::ZERO {
        Some(required_noi / expense_keep)
    } else {
        None
    };
    let occupancy = Decimal::ONE - input.vacancy_pct / dec!(100);
    let required_avg_rent = match required_egi {
        Some(egi) if occupancy > Decimal::ZERO => Some(egi / occupancy / (units * dec!(12))),
        _ => None,
    };

    ReverseEngineering {
        target_cap_rate_pct: input.target_cap_rate_pct,
        expense_ratio_pct: ratio,
        breakeven_rent_per_unit,
        max_price_at_target_cap: noi / (input.target_cap_rate_pct / dec!(100)),
        noi_for_dscr_1_25: LENDER_DSCR * annual_debt_service,
        required_noi,
        required_egi,
        required_avg_rent,
    }
}

fn rent_lift(
    input: &QuickModeInputs,
    ratio: Percent,
    annual_debt_service: Money,
    warnings: &mut Vec<String>,
) -> Option<RentLiftSensitivity> {
    let current = input.avg_monthly_rent;
    let lift_amount = match (input.rent_lift_amount, input.rent_lift_pct) {
        (Some(amount), Some(pct)) => {
            warnings.push(format!(
                "Both a dollar ({amount}) and a percent ({pct}%) rent lift were given; the dollar amount was used"
            ));
            amount
        }
        (Some(amount), None) => amount,
        (None, Some(pct)) => current * pct / dec!(100),
        (None, None) => return None,
    };

    let lifted_rent = current + lift_amount;
    let income = income_at_rent(input, lifted_rent);
    let new_noi = income.effective_gross_income * (Decimal::ONE - ratio / dec!(100));
    let new_dscr = dscr(new_noi, annual_debt_service);

    Some(RentLiftSensitivity {
        current_rent: current,
        lifted_rent,
        lift_amount,
        lift_pct: lift_amount / current * dec!(100),
        new_gsr: income.gross_scheduled_rent,
        new_egi: income.effective_gross_income,
        new_noi,
        new_cap_rate_pct: new_noi / input.purchase_price * dec!(100),
        new_dscr,
        new_dscr_signal: dscr_signal(new_dscr),
        new_value_range: value_reality_check(new_noi, input.purchase_price).valuations,
    })
}

fn investor_notes(
    input: &QuickModeInputs,
    triage: &TriageScore,
    cap_rate_pct: Percent,
    grm: Multiple,
    finance: &FinanceRealityCheck,
    reverse: &ReverseEngineering,
    lift: Option<&RentLiftSensitivity>,
) -> Vec<String> {
    let mut notes = Vec::new();

    notes.push(
        match triage.verdict {
            TriageVerdict::Pursue => "PURSUE: Deal metrics align well across key factors.",
            TriageVerdict::Watch => {
                "WATCH: Some metrics are favorable but others need validation."
            }
            TriageVerdict::Pass => {
                "PASS: Metrics suggest the deal does not meet investment criteria."
            }
        }
        .to_string(),
    );

    notes.push(match triage.cap_rate_score {
        3 => format!("Cap rate {cap_rate_pct:.1}% is strong for the asset class."),
        2 => format!("Cap rate {cap_rate_pct:.1}% is moderate. Check comps."),
        1 => format!("Cap rate {cap_rate_pct:.1}% is thin. Verify value-add potential."),
        _ => format!("Cap rate {cap_rate_pct:.1}% is below minimum threshold."),
    });

    match triage.dscr_score {
        2 => notes.push("DSCR is adequate but tight. Budget conservatively.".into()),
        1 => notes.push("DSCR near breakeven. Consider higher down payment.".into()),
        0 => notes.push("Negative leverage. NOI does not cover debt service.".into()),
        _ => {}
    }

    if triage.expense_ratio_score == 0 {
        notes.push(format!(
            "Expense ratio {:.0}% is above average. Review cost structure.",
            reverse.expense_ratio_pct
        ));
    }
    if triage.grm_score == 0 {
        notes.push(format!("GRM of {grm:.1}x is high. Rents may not support price."));
    }

    if finance.dscr_signal != Signal::Green {
        notes.push(format!("Finance: {}", finance.dscr_note));
    }

    if let Some(lift) = lift {
        notes.push(format!(
            "With ${}/unit rent lift, NOI increases to ${}.",
            group_thousands(lift.lift_amount),
            group_thousands(lift.new_noi)
        ));
    }

    if let Some(required) = reverse.required_avg_rent {
        let gap = required - input.avg_monthly_rent;
        if gap > Decimal::ZERO {
            notes.push(format!(
                "To hit {:.0}% cap, avg rent needs to be ${}/mo (+${} from current).",
                input.target_cap_rate_pct,
                group_thousands(required),
                group_thousands(gap)
            ));
        } else {
            notes.push(format!(
                "Current rents already exceed the ${}/mo needed for a {:.0}% cap rate.",
                group_thousands(required),
                input.target_cap_rate_pct
            ));
        }
    }

    notes
}

/// Whole dollars with comma grouping, e.g. 1234567.8 -> "1,234,568".
fn group_thousands(amount: Money) -> String {
    let rounded = amount.round();
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(extra: &str) -> QuickModeInputs {
        let json = format!(
            r#"{{ "units": 4, "avg_monthly_rent": "1200", "purchase_price": "400000"{extra} }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let q = quick("");
        assert_eq!(q.vacancy_pct, dec!(8));
        assert_eq!(q.down_payment_pct, dec!(25));
        assert_eq!(q.interest_rate_pct, dec!(7));
        assert_eq!(q.amort_years, 25);
        assert_eq!(q.target_cap_rate_pct, dec!(8));
        assert_eq!(q.property_type, PropertyType::Multifamily);
    }

    #[test]
    fn test_income_and_noi() {
        let out = snap_deal(&quick("")).unwrap().result;
        assert_eq!(out.income.gross_scheduled_rent, dec!(57600));
        assert_eq!(out.income.vacancy_loss, dec!(4608));
        assert_eq!(out.income.effective_gross_income, dec!(52992));
        // 48% expense ratio for an average, owner-paid multifamily
        assert_eq!(out.expenses.operating_expenses, dec!(25436.16));
        assert_eq!(out.expenses.noi, dec!(27555.84));
        assert_eq!(out.grm, dec!(400000) / dec!(57600));
        assert_eq!(out.price_per_unit, dec!(100000));
    }

    #[test]
    fn test_breakeven_rent_reproduces_debt_service() {
        let out = snap_deal(&quick("")).unwrap().result;
        let rent = out.reverse_engineering.breakeven_rent_per_unit.unwrap();
        let gsr = dec!(4) * rent * dec!(12);
        let noi = gsr * dec!(0.92) * dec!(0.52);
        let diff = (noi - out.finance_check.annual_debt_service).abs();
        assert!(diff < dec!(0.0001), "diff {diff}");
    }

    #[test]
    fn test_rent_lift_dollar_wins() {
        let out = snap_deal(&quick(r#", "rent_lift_amount": "100", "rent_lift_pct": "50""#))
            .unwrap()
            .result;
        let lift = out.rent_sensitivity.unwrap();
        assert_eq!(lift.lift_amount, dec!(100));
        assert_eq!(lift.lifted_rent, dec!(1300));
        assert!(out.warnings.iter().any(|w| w.contains("dollar amount was used")));
    }

    #[test]
    fn test_rent_lift_percent() {
        let out = snap_deal(&quick(r#", "rent_lift_pct": "10""#)).unwrap().result;
        let lift = out.rent_sensitivity.unwrap();
        assert_eq!(lift.lift_amount, dec!(120));
        assert_eq!(lift.new_gsr, dec!(4) * dec!(1320) * dec!(12));
        assert!(lift.new_noi > out.expenses.noi);
        assert!(lift.new_dscr.unwrap() > out.finance_check.dscr.unwrap());
    }

    #[test]
    fn test_all_cash_quick_deal() {
        let out = snap_deal(&quick(r#", "down_payment_pct": "100""#)).unwrap().result;
        assert_eq!(out.finance_check.loan_amount, Decimal::ZERO);
        assert_eq!(out.finance_check.dscr, None);
        assert_eq!(out.finance_check.dscr_signal, Signal::Green);
        assert_eq!(out.triage.dscr_score, 3);
        assert_eq!(out.reverse_engineering.breakeven_rent_per_unit, Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_rent_rejected() {
        let mut q = quick("");
        q.avg_monthly_rent = Decimal::ZERO;
        assert!(snap_deal(&q).is_err());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec!(1234567.8)), "1,234,568");
        assert_eq!(group_thousands(dec!(999)), "999");
        assert_eq!(group_thousands(dec!(-4500)), "-4,500");
    }
}
