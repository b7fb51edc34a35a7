use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Multiple, Percent, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageVerdict {
    Pursue,
    Watch,
    Pass,
}

/// Points awarded per signal; `total_score` is out of 12.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageScore {
    /// 0-3
    pub cap_rate_score: u8,
    /// 0-3
    pub dscr_score: u8,
    /// 0-2
    pub expense_ratio_score: u8,
    /// 0-2
    pub grm_score: u8,
    /// 0-2
    pub dscr_signal_score: u8,
    pub total_score: u8,
    pub verdict: TriageVerdict,
}

pub const MAX_TRIAGE_SCORE: u8 = 12;

/// Score a single-year snapshot. Bands are fixed:
///
/// | signal        | 3      | 2          | 1         | 0      |
/// |---------------|--------|------------|-----------|--------|
/// | cap rate      | >= 8%  | 6-8%       | 5-6%      | < 5%   |
/// | DSCR          | >= 1.25| 1.10-1.25  | 1.00-1.10 | < 1.00 |
/// | expense ratio |        | <= 40%     | <= 50%    | > 50%  |
/// | GRM           |        | <= 10      | <= 14     | > 14   |
/// | DSCR signal   |        | green      | orange    | red    |
///
/// No debt (`dscr == None`) scores the full 3 DSCR points.
/// Pursue at 9 or more, Watch at 5-8, Pass below 5.
pub fn score_triage(
    cap_rate_pct: Percent,
    dscr: Option<Decimal>,
    expense_ratio_pct: Percent,
    grm: Multiple,
    dscr_signal: Signal,
) -> TriageScore {
    let cap_rate_score = match cap_rate_pct {
        c if c >= dec!(8) => 3,
        c if c >= dec!(6) => 2,
        c if c >= dec!(5) => 1,
        _ => 0,
    };

    let dscr_score = match dscr {
        None => 3,
        Some(d) if d >= dec!(1.25) => 3,
        Some(d) if d >= dec!(1.10) => 2,
        Some(d) if d >= dec!(1.00) => 1,
        Some(_) => 0,
    };

    let expense_ratio_score = match expense_ratio_pct {
        e if e <= dec!(40) => 2,
        e if e <= dec!(50) => 1,
        _ => 0,
    };

    let grm_score = match grm {
        g if g <= dec!(10) => 2,
        g if g <= dec!(14) => 1,
        _ => 0,
    };

    let dscr_signal_score = match dscr_signal {
        Signal::Green => 2,
        Signal::Orange => 1,
        Signal::Red => 0,
    };

    let total_score =
        cap_rate_score + dscr_score + expense_ratio_score + grm_score + dscr_signal_score;

    let verdict = match total_score {
        9.. => TriageVerdict::Pursue,
        5..=8 => TriageVerdict::Watch,
        _ => TriageVerdict::Pass,
    };

    TriageScore {
        cap_rate_score,
        dscr_score,
        expense_ratio_score,
        grm_score,
        dscr_signal_score,
        total_score,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_score_is_pursue() {
        let s = score_triage(dec!(9), Some(dec!(1.5)), dec!(35), dec!(8), Signal::Green);
        assert_eq!(s.total_score, MAX_TRIAGE_SCORE);
        assert_eq!(s.verdict, TriageVerdict::Pursue);
    }

    #[test]
    fn test_band_edges() {
        let s = score_triage(dec!(8), Some(dec!(1.10)), dec!(40), dec!(10), Signal::Orange);
        assert_eq!(s.cap_rate_score, 3);
        assert_eq!(s.dscr_score, 2);
        assert_eq!(s.expense_ratio_score, 2);
        assert_eq!(s.grm_score, 2);
        assert_eq!(s.dscr_signal_score, 1);

        let s = score_triage(dec!(5), Some(dec!(1.0)), dec!(50), dec!(14), Signal::Red);
        assert_eq!(s.cap_rate_score, 1);
        assert_eq!(s.dscr_score, 1);
        assert_eq!(s.expense_ratio_score, 1);
        assert_eq!(s.grm_score, 1);
        assert_eq!(s.total_score, 4);
        assert_eq!(s.verdict, TriageVerdict::Pass);
    }

    #[test]
    fn test_verdict_cut_offs() {
        // 2 + 2 + 1 + 0 + 0 = 5
        let watch = score_triage(dec!(6), Some(dec!(1.10)), dec!(45), dec!(20), Signal::Red);
        assert_eq!(watch.total_score, 5);
        assert_eq!(watch.verdict, TriageVerdict::Watch);

        // 3 + 2 + 1 + 1 + 1 = 8
        let still_watch =
            score_triage(dec!(8), Some(dec!(1.2)), dec!(45), dec!(12), Signal::Orange);
        assert_eq!(still_watch.total_score, 8);
        assert_eq!(still_watch.verdict, TriageVerdict::Watch);

        // 3 + 3 + 1 + 0 + 2 = 9
        let pursue = score_triage(dec!(8), Some(dec!(1.3)), dec!(45), dec!(15), Signal::Green);
        assert_eq!(pursue.total_score, 9);
        assert_eq!(pursue.verdict, TriageVerdict::Pursue);
    }

    #[test]
    fn test_no_debt_scores_full_dscr() {
        let s = score_triage(dec!(4), None, dec!(60), dec!(20), Signal::Green);
        assert_eq!(s.dscr_score, 3);
        assert_eq!(s.dscr_signal_score, 2);
        assert_eq!(s.total_score, 5);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a = score_triage(dec!(6.5), Some(dec!(1.15)), dec!(48), dec!(11), Signal::Orange);
        let b = score_triage(dec!(6.5), Some(dec!(1.15)), dec!(48), dec!(11), Signal::Orange);
        assert_eq!(a, b);
    }
}
