use dealsnap_core::quick::{
    score_triage, snap_deal, ExpenseResponsibility, PropertyCondition, PropertyType,
    QuickModeInputs, TriageVerdict,
};
use dealsnap_core::Signal;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn fourplex() -> QuickModeInputs {
    serde_json::from_str(
        r#"{ "units": 4, "avg_monthly_rent": "1200", "purchase_price": "400000" }"#,
    )
    .unwrap()
}

// ===========================================================================
// Single-year figures
// ===========================================================================

#[test]
fn test_fourplex_snapshot() {
    let out = snap_deal(&fourplex()).unwrap();
    let r = &out.result;

    assert_eq!(r.income.effective_gross_income, dec!(52992));
    assert_eq!(r.expenses.expense_ratio_pct, dec!(48));
    assert_eq!(r.expenses.noi, dec!(27555.84));
    assert_eq!(r.expenses.capex_reserve_pct, dec!(6));
    assert_eq!(r.finance_check.loan_amount, dec!(300000));
    assert_eq!(r.finance_check.cash_required, dec!(100000));
    assert!((r.finance_check.monthly_payment - dec!(2120.34)).abs() < dec!(0.01));
    assert_eq!(
        r.finance_check.annual_debt_service,
        r.finance_check.monthly_payment * dec!(12)
    );
    assert_eq!(
        r.finance_check.noi_after_debt_service,
        r.expenses.noi - r.finance_check.annual_debt_service
    );
}

#[test]
fn test_fourplex_triage_is_watch() {
    let r = snap_deal(&fourplex()).unwrap().result;

    // cap 6.89% -> 2, DSCR 1.08 -> 1, 48% expenses -> 1, GRM 6.9 -> 2, orange -> 1
    assert_eq!(r.triage.cap_rate_score, 2);
    assert_eq!(r.triage.dscr_score, 1);
    assert_eq!(r.triage.expense_ratio_score, 1);
    assert_eq!(r.triage.grm_score, 2);
    assert_eq!(r.triage.dscr_signal_score, 1);
    assert_eq!(r.triage.total_score, 7);
    assert_eq!(r.triage.verdict, TriageVerdict::Watch);
    assert_eq!(r.finance_check.dscr_signal, Signal::Orange);
    assert!(r.investor_notes[0].starts_with("WATCH"));
}

#[test]
fn test_value_check_ladder() {
    let r = snap_deal(&fourplex()).unwrap().result;
    let caps: Vec<Decimal> = r.value_check.valuations.iter().map(|v| v.cap_rate_pct).collect();
    assert_eq!(caps, vec![dec!(8.5), dec!(8.0), dec!(7.5), dec!(7.0)]);

    let signals: Vec<Signal> = r.value_check.valuations.iter().map(|v| v.signal).collect();
    // 400k against 324k / 344k / 367k / 394k of implied value
    assert_eq!(
        signals,
        vec![Signal::Red, Signal::Red, Signal::Red, Signal::Orange]
    );
}

#[test]
fn test_reverse_engineering() {
    let r = snap_deal(&fourplex()).unwrap().result;
    let rev = &r.reverse_engineering;

    assert_eq!(rev.max_price_at_target_cap, dec!(344448));
    assert_eq!(rev.required_noi, dec!(32000));
    assert_eq!(
        rev.noi_for_dscr_1_25,
        dec!(1.25) * r.finance_check.annual_debt_service
    );
    let needed = rev.required_avg_rent.unwrap();
    assert!(needed > dec!(1393) && needed < dec!(1394), "rent {needed}");
    assert!(r.investor_notes.iter().any(|n| n.starts_with("To hit 8% cap")));
}

#[test]
fn test_strong_deal_is_pursue() {
    let mut input = fourplex();
    input.avg_monthly_rent = dec!(1500);
    input.purchase_price = dec!(300000);
    input.property_condition = PropertyCondition::Newer;
    input.expense_responsibility = ExpenseResponsibility::MostlyTenant;

    let r = snap_deal(&input).unwrap().result;
    assert_eq!(r.expenses.expense_ratio_pct, dec!(25));
    assert_eq!(r.triage.total_score, 12);
    assert_eq!(r.triage.verdict, TriageVerdict::Pursue);
    assert!(r
        .investor_notes
        .iter()
        .any(|n| n.starts_with("Current rents already exceed")));
}

#[test]
fn test_single_family_older_uses_matrix() {
    let mut input = fourplex();
    input.units = 1;
    input.property_type = PropertyType::SingleFamily;
    input.property_condition = PropertyCondition::Older;
    let r = snap_deal(&input).unwrap().result;
    assert_eq!(r.expenses.expense_ratio_pct, dec!(52));
    assert_eq!(r.expenses.capex_reserve_pct, dec!(8));
    assert_eq!(r.triage.expense_ratio_score, 0);
}

#[test]
fn test_heavy_taxes_raise_warning() {
    let mut input = fourplex();
    input.annual_taxes = Some(dec!(30000));
    let out = snap_deal(&input).unwrap();
    assert_eq!(out.result.expenses.estimated_taxes, dec!(30000));
    assert!(out.warnings.iter().any(|w| w.contains("understates costs")));
}

#[test]
fn test_rent_lift_improves_metrics() {
    let mut input = fourplex();
    input.rent_lift_amount = Some(dec!(150));
    let r = snap_deal(&input).unwrap().result;
    let lift = r.rent_sensitivity.as_ref().unwrap();

    assert_eq!(lift.lifted_rent, dec!(1350));
    assert_eq!(lift.lift_pct, dec!(12.5));
    assert!(lift.new_noi > r.expenses.noi);
    assert!(lift.new_cap_rate_pct > r.purchase_cap_rate_pct);
    assert_eq!(lift.new_value_range.len(), 4);
}

#[test]
fn test_rent_sensitivity_absent_without_lift() {
    let r = snap_deal(&fourplex()).unwrap().result;
    assert!(r.rent_sensitivity.is_none());
    let json = serde_json::to_value(&r).unwrap();
    assert!(json.get("rent_sensitivity").is_none());
}

#[test]
fn test_triage_matches_standalone_scoring() {
    let r = snap_deal(&fourplex()).unwrap().result;
    let again = score_triage(
        r.purchase_cap_rate_pct,
        r.finance_check.dscr,
        r.expenses.expense_ratio_pct,
        r.grm,
        r.finance_check.dscr_signal,
    );
    assert_eq!(r.triage, again);
}

#[test]
fn test_invalid_quick_inputs() {
    let mut input = fourplex();
    input.units = 0;
    assert!(snap_deal(&input).is_err());

    let mut input = fourplex();
    input.target_cap_rate_pct = dec!(25);
    assert!(snap_deal(&input).is_err());

    let mut input = fourplex();
    input.rent_lift_amount = Some(dec!(-1500));
    assert!(snap_deal(&input).is_err());
}

#[test]
fn test_oversized_quick_inputs_are_rejected() {
    let mut input = fourplex();
    input.avg_monthly_rent = dec!(10000000000000000000000000);
    assert!(snap_deal(&input).is_err());

    let mut input = fourplex();
    input.purchase_price = dec!(10000000000000000000000000);
    assert!(snap_deal(&input).is_err());

    let mut input = fourplex();
    input.rent_lift_pct = Some(dec!(100000));
    assert!(snap_deal(&input).is_err());
}

#[test]
fn test_all_cash_quick_deal_has_no_dscr() {
    let mut input = fourplex();
    input.down_payment_pct = dec!(100);
    let r = snap_deal(&input).unwrap().result;

    assert_eq!(r.finance_check.loan_amount, Decimal::ZERO);
    assert_eq!(r.finance_check.dscr, None);
    assert_eq!(r.finance_check.dscr_signal, Signal::Green);
    assert_eq!(r.triage.dscr_score, 3);
}
