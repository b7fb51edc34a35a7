use dealsnap_core::debt::{build_schedule, monthly_payment, year_debt_service, LoanTerms};
use dealsnap_core::time_value::{bisect_irr, npv, solve_irr, IrrMethod, DEFAULT_IRR_GUESS};
use dealsnap_core::DealSnapError;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

// ===========================================================================
// IRR round trips
// ===========================================================================

/// Equity outflow equal to the PV of `flows` at `rate`, followed by the flows.
fn stream_at(rate: Decimal, flows: &[Decimal]) -> Vec<Decimal> {
    let pv: Decimal = flows
        .iter()
        .enumerate()
        .map(|(i, cf)| *cf / (Decimal::ONE + rate).powi(i as i64 + 1))
        .sum();
    let mut stream = vec![-pv];
    stream.extend_from_slice(flows);
    stream
}

#[test]
fn test_round_trip_recovers_rate() {
    for r0 in [dec!(0.03), dec!(0.15), dec!(0.42)] {
        let stream = stream_at(
            r0,
            &[dec!(200), dec!(210), dec!(220), dec!(230), dec!(240) + dec!(1500)],
        );
        let solved = solve_irr(&stream, DEFAULT_IRR_GUESS).unwrap();
        assert!(
            (solved.rate - r0).abs() < dec!(0.0001),
            "expected {r0}, got {}",
            solved.rate
        );
    }
}

#[test]
fn test_round_trip_negative_rate() {
    let r0 = dec!(-0.2);
    let stream = stream_at(r0, &[dec!(50), dec!(50), dec!(400)]);
    let solved = solve_irr(&stream, DEFAULT_IRR_GUESS).unwrap();
    assert!((solved.rate - r0).abs() < dec!(0.0001));
}

#[test]
fn test_par_bond_is_its_coupon() {
    let stream = vec![dec!(-1000), dec!(80), dec!(80), dec!(80), dec!(80), dec!(1080)];
    let solved = solve_irr(&stream, DEFAULT_IRR_GUESS).unwrap();
    assert_eq!(solved.method, IrrMethod::NewtonRaphson);
    assert!((solved.rate - dec!(0.08)).abs() < dec!(0.000001));
    assert!(npv(solved.rate, &stream).unwrap().abs() < dec!(0.01));
}

#[test]
fn test_bisection_alone_agrees_with_newton() {
    let stream = stream_at(dec!(0.11), &[dec!(30), dec!(30), dec!(30), dec!(130)]);
    let newton = solve_irr(&stream, DEFAULT_IRR_GUESS).unwrap();
    let bisected = bisect_irr(&stream).unwrap();
    assert_eq!(bisected.method, IrrMethod::Bisection);
    assert!((newton.rate - bisected.rate).abs() < dec!(0.00001));
}

#[test]
fn test_all_negative_stream_has_no_root() {
    let stream = vec![dec!(-100), dec!(-10), dec!(-10)];
    match solve_irr(&stream, DEFAULT_IRR_GUESS) {
        Err(DealSnapError::RootNotBracketed { .. }) => {}
        other => panic!("expected RootNotBracketed, got {other:?}"),
    }
}

// ===========================================================================
// Debt service
// ===========================================================================

#[test]
fn test_zero_rate_payment_is_straight_line() {
    let payment = monthly_payment(dec!(360000), Decimal::ZERO, 30).unwrap();
    assert_eq!(payment, dec!(1000));
}

#[test]
fn test_invalid_financing_rejected() {
    assert!(monthly_payment(dec!(100000), dec!(5), 0).is_err());
    assert!(monthly_payment(dec!(-1), dec!(5), 30).is_err());
}

#[test]
fn test_year_debt_service_matches_schedule() {
    let terms = LoanTerms {
        principal: dec!(375000),
        annual_rate_pct: dec!(6.5),
        amort_years: 30,
        interest_only_months: 6,
        entire_loan_interest_only: false,
    };
    let schedule = build_schedule(&terms, 60).unwrap();
    for year in 1..=5 {
        let standalone = year_debt_service(&terms, year).unwrap();
        let from_schedule = schedule.year(year);
        assert_eq!(standalone.debt_service, from_schedule.debt_service);
        assert_eq!(standalone.ending_balance, from_schedule.ending_balance);
    }
    assert_eq!(schedule.year(1).interest_only_months, 6);
    // Balances only fall once amortisation starts
    let mut last = dec!(375000);
    for year in 1..=5 {
        let y = schedule.year(year);
        assert!(y.ending_balance <= last);
        assert!(y.ending_balance >= Decimal::ZERO);
        last = y.ending_balance;
    }
}
