use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::inputs::Targets;
use crate::types::{Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Borderline,
    Fail,
}

/// The four hurdles, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Irr,
    CashOnCash,
    Dscr,
    Equity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictCheck {
    /// Measured value; `None` when undefined (no IRR, no debt service)
    pub value: Option<Decimal>,
    pub threshold: Decimal,
    pub pass: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub summary: String,
    pub checks: BTreeMap<CheckName, VerdictCheck>,
}

/// Metrics the verdict is judged on.
#[derive(Debug, Clone, Copy)]
pub struct VerdictMetrics {
    pub irr_pct: Option<Percent>,
    pub cash_on_cash_year1_pct: Percent,
    pub dscr_year1: Option<Decimal>,
    pub equity_invested: Money,
}

/// Judge the deal against the investor's targets.
///
/// All four checks passing is `Pass`, exactly one failing is `Borderline`, two or more
/// is `Fail`. A missing IRR fails its check; a missing DSCR (no debt) passes.
pub fn evaluate(metrics: &VerdictMetrics, targets: &Targets) -> Verdict {
    let mut checks = BTreeMap::new();

    checks.insert(
        CheckName::Irr,
        VerdictCheck {
            value: metrics.irr_pct,
            threshold: targets.min_irr_pct,
            pass: metrics.irr_pct.is_some_and(|irr| irr >= targets.min_irr_pct),
        },
    );
    checks.insert(
        CheckName::CashOnCash,
        VerdictCheck {
            value: Some(metrics.cash_on_cash_year1_pct),
            threshold: targets.min_cash_on_cash_pct,
            pass: metrics.cash_on_cash_year1_pct >= targets.min_cash_on_cash_pct,
        },
    );
    checks.insert(
        CheckName::Dscr,
        VerdictCheck {
            value: metrics.dscr_year1,
            threshold: targets.min_dscr,
            pass: metrics.dscr_year1.map_or(true, |d| d >= targets.min_dscr),
        },
    );
    checks.insert(
        CheckName::Equity,
        VerdictCheck {
            value: Some(metrics.equity_invested),
            threshold: targets.max_equity,
            pass: metrics.equity_invested <= targets.max_equity,
        },
    );

    let failed: Vec<CheckName> = checks
        .iter()
        .filter(|(_, c)| !c.pass)
        .map(|(name, _)| *name)
        .collect();

    let status = match failed.len() {
        0 => VerdictStatus::Pass,
        1 => VerdictStatus::Borderline,
        _ => VerdictStatus::Fail,
    };

    let summary = match status {
        VerdictStatus::Pass => "This deal meets all your investment criteria.".to_string(),
        VerdictStatus::Borderline | VerdictStatus::Fail => {
            let reasons: Vec<String> = failed
                .iter()
                .map(|name| describe_failure(*name, metrics, targets))
                .collect();
            let status_text = if status == VerdictStatus::Borderline {
                "is borderline"
            } else {
                "fails targets"
            };
            format!("This deal {status_text} due to {}.", reasons.join(" and "))
        }
    };

    Verdict {
        status,
        summary,
        checks,
    }
}

fn describe_failure(name: CheckName, metrics: &VerdictMetrics, targets: &Targets) -> String {
    match name {
        CheckName::Irr => match metrics.irr_pct {
            Some(irr) => format!("IRR ({irr:.2}% < {}%)", targets.min_irr_pct),
            None => "IRR (undefined)".to_string(),
        },
        CheckName::CashOnCash => format!(
            "Year-1 CoC ({:.2}% < {}%)",
            metrics.cash_on_cash_year1_pct, targets.min_cash_on_cash_pct
        ),
        CheckName::Dscr => format!(
            "DSCR ({:.2} < {})",
            metrics.dscr_year1.unwrap_or_default(),
            targets.min_dscr
        ),
        CheckName::Equity => format!(
            "Equity Req (${:.0}k > ${:.0}k)",
            metrics.equity_invested / dec!(1000),
            targets.max_equity / dec!(1000)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> VerdictMetrics {
        VerdictMetrics {
            irr_pct: Some(dec!(15)),
            cash_on_cash_year1_pct: dec!(8),
            dscr_year1: Some(dec!(1.4)),
            equity_invested: dec!(150000),
        }
    }

    #[test]
    fn test_all_pass() {
        let v = evaluate(&metrics(), &Targets::default());
        assert_eq!(v.status, VerdictStatus::Pass);
        assert!(v.checks.values().all(|c| c.pass));
        assert_eq!(v.summary, "This deal meets all your investment criteria.");
    }

    #[test]
    fn test_one_failure_is_borderline() {
        let mut m = metrics();
        m.cash_on_cash_year1_pct = dec!(4);
        let v = evaluate(&m, &Targets::default());
        assert_eq!(v.status, VerdictStatus::Borderline);
        assert!(v.summary.contains("Year-1 CoC"));
        assert!(!v.checks[&CheckName::CashOnCash].pass);
    }

    #[test]
    fn test_two_failures_fail() {
        let mut m = metrics();
        m.dscr_year1 = Some(dec!(1.1));
        m.equity_invested = dec!(600000);
        let v = evaluate(&m, &Targets::default());
        assert_eq!(v.status, VerdictStatus::Fail);
        assert!(v.summary.starts_with("This deal fails targets due to DSCR"));
        assert!(v.summary.contains("Equity Req ($600k > $500k)"));
    }

    #[test]
    fn test_missing_irr_fails_check() {
        let mut m = metrics();
        m.irr_pct = None;
        let v = evaluate(&m, &Targets::default());
        assert_eq!(v.status, VerdictStatus::Borderline);
        assert!(v.summary.contains("IRR (undefined)"));
    }

    #[test]
    fn test_all_cash_dscr_passes() {
        let mut m = metrics();
        m.dscr_year1 = None;
        let v = evaluate(&m, &Targets::default());
        assert!(v.checks[&CheckName::Dscr].pass);
        assert_eq!(v.checks[&CheckName::Dscr].value, None);
    }

    #[test]
    fn test_exact_threshold_passes() {
        let mut m = metrics();
        m.irr_pct = Some(dec!(12));
        m.dscr_year1 = Some(dec!(1.25));
        m.equity_invested = dec!(500000);
        let v = evaluate(&m, &Targets::default());
        assert_eq!(v.status, VerdictStatus::Pass);
    }

    #[test]
    fn test_checks_serialise_with_snake_case_keys() {
        let v = evaluate(&metrics(), &Targets::default());
        let json = serde_json::to_value(&v).unwrap();
        assert!(json["checks"]["cash_on_cash"]["pass"].as_bool().unwrap());
        assert_eq!(json["status"], "pass");
    }
}
