//! Fixed-band traffic lights shared by the quick screen and the full underwrite.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Signal};

/// Cap rates the value reality check prices the deal at, highest first.
pub const VALUE_CHECK_CAP_RATES_PCT: [Percent; 4] = [dec!(8.5), dec!(8.0), dec!(7.5), dec!(7.0)];

/// Half-width of the orange band around implied value, as a fraction (0.03 = ±3%).
pub const VALUE_SIGNAL_BAND: Decimal = dec!(0.03);

pub const DSCR_GREEN: Decimal = dec!(1.25);
pub const DSCR_ORANGE: Decimal = dec!(1.00);

/// Valuation of the deal's NOI at one cap rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationPoint {
    pub cap_rate_pct: Percent,
    pub implied_value: Money,
    /// (price - implied value) / implied value, as a percent; `None` when value is not positive
    pub price_premium_pct: Option<Percent>,
    pub signal: Signal,
}

/// Purchase price set against NOI capitalised at the fixed cap-rate ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRealityCheck {
    pub purchase_price: Money,
    pub valuations: Vec<ValuationPoint>,
}

/// NOI / debt service, or `None` when there is no debt to cover.
pub fn dscr(noi: Money, debt_service: Money) -> Option<Decimal> {
    if debt_service.is_zero() {
        None
    } else {
        Some(noi / debt_service)
    }
}

/// DSCR band: green >= 1.25, orange >= 1.00, red below. No debt reads green.
pub fn dscr_signal(dscr: Option<Decimal>) -> Signal {
    match dscr {
        None => Signal::Green,
        Some(d) if d >= DSCR_GREEN => Signal::Green,
        Some(d) if d >= DSCR_ORANGE => Signal::Orange,
        Some(_) => Signal::Red,
    }
}

/// Plain-language reading of a DSCR signal.
pub fn dscr_note(dscr: Option<Decimal>) -> &'static str {
    match (dscr, dscr_signal(dscr)) {
        (None, _) => "No debt service. All-cash purchase carries no coverage risk.",
        (Some(_), Signal::Green) => "Strong debt coverage. Most lenders comfortable.",
        (Some(_), Signal::Orange) => {
            "Thin coverage. Lender may require additional reserves or higher down payment."
        }
        (Some(_), Signal::Red) => "Negative leverage. NOI does not cover debt service.",
    }
}

/// Signal for buying at `purchase_price` something worth `implied_value`.
///
/// Green when the price sits more than 3% below value, red when more than 3% above,
/// orange inside the band. A non-positive implied value is always red.
pub fn value_signal(purchase_price: Money, implied_value: Money) -> Signal {
    match price_premium(purchase_price, implied_value) {
        None => Signal::Red,
        Some(p) if p < -VALUE_SIGNAL_BAND => Signal::Green,
        Some(p) if p > VALUE_SIGNAL_BAND => Signal::Red,
        Some(_) => Signal::Orange,
    }
}

/// Capitalise `noi` at each rung of the cap-rate ladder and flag the price against it.
pub fn value_reality_check(noi: Money, purchase_price: Money) -> ValueRealityCheck {
    let valuations = VALUE_CHECK_CAP_RATES_PCT
        .iter()
        .map(|&cap_rate_pct| valuation_point(noi, purchase_price, cap_rate_pct))
        .collect();

    ValueRealityCheck {
        purchase_price,
        valuations,
    }
}

pub(crate) fn valuation_point(
    noi: Money,
    purchase_price: Money,
    cap_rate_pct: Percent,
) -> ValuationPoint {
    let implied_value = noi / (cap_rate_pct / dec!(100));
    ValuationPoint {
        cap_rate_pct,
        implied_value,
        price_premium_pct: price_premium(purchase_price, implied_value).map(|p| p * dec!(100)),
        signal: value_signal(purchase_price, implied_value),
    }
}

fn price_premium(purchase_price: Money, implied_value: Money) -> Option<Decimal> {
    if implied_value <= Decimal::ZERO {
        return None;
    }
    Some((purchase_price - implied_value) / implied_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dscr_is_none_without_debt() {
        assert_eq!(dscr(dec!(38720), Decimal::ZERO), None);
        assert_eq!(dscr(dec!(30000), dec!(24000)), Some(dec!(1.25)));
    }

    #[test]
    fn test_dscr_bands() {
        assert_eq!(dscr_signal(Some(dec!(1.25))), Signal::Green);
        assert_eq!(dscr_signal(Some(dec!(1.2499))), Signal::Orange);
        assert_eq!(dscr_signal(Some(dec!(1.00))), Signal::Orange);
        assert_eq!(dscr_signal(Some(dec!(0.99))), Signal::Red);
        assert_eq!(dscr_signal(None), Signal::Green);
    }

    #[test]
    fn test_value_band_is_symmetric() {
        // exactly 3% either side stays orange
        assert_eq!(value_signal(dec!(97), dec!(100)), Signal::Orange);
        assert_eq!(value_signal(dec!(103), dec!(100)), Signal::Orange);
        assert_eq!(value_signal(dec!(96.9), dec!(100)), Signal::Green);
        assert_eq!(value_signal(dec!(103.1), dec!(100)), Signal::Red);
    }

    #[test]
    fn test_negative_value_is_red() {
        assert_eq!(value_signal(dec!(100), dec!(-5)), Signal::Red);
        assert_eq!(value_signal(dec!(100), Decimal::ZERO), Signal::Red);
    }

    #[test]
    fn test_value_reality_check_ladder() {
        // NOI 40,000 at 8% = 500,000
        let check = value_reality_check(dec!(40000), dec!(500000));
        assert_eq!(check.valuations.len(), 4);

        let caps: Vec<_> = check.valuations.iter().map(|v| v.cap_rate_pct).collect();
        assert_eq!(caps, vec![dec!(8.5), dec!(8.0), dec!(7.5), dec!(7.0)]);

        let at_8 = &check.valuations[1];
        assert_eq!(at_8.implied_value, dec!(500000));
        assert_eq!(at_8.price_premium_pct, Some(Decimal::ZERO));
        assert_eq!(at_8.signal, Signal::Orange);

        // 40,000 / 0.085 = 470,588 -> price 6.25% above value
        assert_eq!(check.valuations[0].signal, Signal::Red);
        // 40,000 / 0.07 = 571,428 -> price 12.5% below value
        assert_eq!(check.valuations[3].signal, Signal::Green);
    }
}
