//! Threshold evaluation.
//!
//! [`classify`] checks one quote against one asset configuration in a fixed
//! priority order and stops at the first condition that holds:
//!
//! | Order | Classification | Condition |
//! |-------|----------------|-----------|
//! | 1 | [`Classification::TargetZone`] | `|target - bid| < target_zone` |
//! | 2 | [`Classification::AboveHighBand`] | `bid > high_band` |
//! | 3 | [`Classification::BelowLowBand`] | `bid < low_band` |
//! | 4 | [`Classification::HighVolatilityRange`] | `high_bid - low_bid > large_move` |
//! | 5 | [`Classification::LargeDayMove`] | `|day_change| > large_move` |
//!
//! Every comparison is strict, so a value sitting exactly on a threshold
//! never fires that check.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AssetConfig, Quote};

/// Verdict for one (quote, asset) pair. At most one condition is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    TargetZone,
    AboveHighBand,
    BelowLowBand,
    HighVolatilityRange,
    LargeDayMove,
    None,
}

impl Classification {
    /// All firing classifications in evaluation order.
    pub const PRIORITY_ORDER: [Self; 5] = [
        Self::TargetZone,
        Self::AboveHighBand,
        Self::BelowLowBand,
        Self::HighVolatilityRange,
        Self::LargeDayMove,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TargetZone => "target_zone",
            Self::AboveHighBand => "above_high_band",
            Self::BelowLowBand => "below_low_band",
            Self::HighVolatilityRange => "high_volatility_range",
            Self::LargeDayMove => "large_day_move",
            Self::None => "none",
        }
    }

    pub const fn is_alert(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether this condition holds on its own, ignoring priority.
    pub fn holds(self, quote: &Quote, config: &AssetConfig) -> bool {
        match self {
            Self::TargetZone => (config.target - quote.bid).abs() < config.target_zone,
            Self::AboveHighBand => quote.bid > config.high_band,
            Self::BelowLowBand => quote.bid < config.low_band,
            Self::HighVolatilityRange => quote.day_range() > config.large_move,
            Self::LargeDayMove => quote.day_change.abs() > config.large_move,
            Self::None => false,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a quote against an asset configuration.
pub fn classify(quote: &Quote, config: &AssetConfig) -> Classification {
    Classification::PRIORITY_ORDER
        .into_iter()
        .find(|candidate| candidate.holds(quote, config))
        .unwrap_or(Classification::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn config(high: f64, low: f64, target: f64, zone: f64, large_move: f64) -> AssetConfig {
        AssetConfig::new(
            Symbol::parse("FW20").expect("valid"),
            high,
            low,
            target,
            zone,
            large_move,
            None,
            chrono_tz::UTC,
        )
        .expect("valid config")
    }

    fn quote(bid: f64, high: f64, low: f64, change: f64) -> Quote {
        Quote::new(
            Symbol::parse("FW20").expect("valid"),
            bid,
            high,
            low,
            change,
            "+0.10%",
            UtcDateTime::parse("2024-01-02T10:00:00Z").expect("ts"),
            None,
            None,
        )
        .expect("valid quote")
    }

    #[test]
    fn bid_inside_tolerance_is_target_zone() {
        let verdict = classify(&quote(101.5, 101.5, 101.5, 0.0), &config(200.0, 0.0, 100.0, 2.0, 50.0));
        assert_eq!(verdict, Classification::TargetZone);
    }

    #[test]
    fn tolerance_boundary_falls_through() {
        let verdict = classify(&quote(98.0, 98.0, 98.0, 0.0), &config(200.0, 0.0, 100.0, 2.0, 50.0));
        assert_eq!(verdict, Classification::None);

        let verdict = classify(&quote(98.0, 98.0, 98.0, 0.0), &config(200.0, 99.0, 100.0, 2.0, 50.0));
        assert_eq!(verdict, Classification::BelowLowBand);
    }

    #[test]
    fn target_zone_preempts_band_breach() {
        // Bid is both above the high band and within the target zone.
        let verdict = classify(&quote(51.0, 51.0, 51.0, 0.0), &config(50.0, 40.0, 51.5, 1.0, 50.0));
        assert_eq!(verdict, Classification::TargetZone);
    }

    #[test]
    fn high_band_requires_strictly_greater_bid() {
        let cfg = config(50.0, 10.0, 0.0, 0.0, 100.0);
        assert_eq!(classify(&quote(50.01, 50.01, 50.01, 0.0), &cfg), Classification::AboveHighBand);
        assert_eq!(classify(&quote(50.0, 50.0, 50.0, 0.0), &cfg), Classification::None);
    }

    #[test]
    fn low_band_requires_strictly_lower_bid() {
        let cfg = config(50.0, 10.0, 0.0, 0.0, 100.0);
        assert_eq!(classify(&quote(9.99, 9.99, 9.99, 0.0), &cfg), Classification::BelowLowBand);
        assert_eq!(classify(&quote(10.0, 10.0, 10.0, 0.0), &cfg), Classification::None);
    }

    #[test]
    fn collapsed_bands_fire_above_first() {
        let cfg = config(30.0, 30.0, 0.0, 0.0, 100.0);
        assert_eq!(classify(&quote(30.5, 30.5, 30.5, 0.0), &cfg), Classification::AboveHighBand);
        assert_eq!(classify(&quote(29.5, 29.5, 29.5, 0.0), &cfg), Classification::BelowLowBand);
        assert_eq!(classify(&quote(30.0, 30.0, 30.0, 0.0), &cfg), Classification::None);
    }

    #[test]
    fn wide_range_is_volatility_even_with_small_change() {
        let verdict = classify(&quote(8.0, 10.0, 7.0, 0.1), &config(100.0, 0.0, 500.0, 1.0, 2.0));
        assert_eq!(verdict, Classification::HighVolatilityRange);
    }

    #[test]
    fn range_equal_to_threshold_does_not_fire() {
        let verdict = classify(&quote(8.0, 10.0, 8.0, 0.1), &config(100.0, 0.0, 500.0, 1.0, 2.0));
        assert_eq!(verdict, Classification::None);
    }

    #[test]
    fn negative_day_change_counts_by_magnitude() {
        let cfg = config(100.0, 0.0, 500.0, 1.0, 2.0);
        assert_eq!(classify(&quote(8.0, 8.5, 7.5, -2.5), &cfg), Classification::LargeDayMove);
        assert_eq!(classify(&quote(8.0, 8.5, 7.5, 2.0), &cfg), Classification::None);
    }

    #[test]
    fn zero_tolerance_never_fires_target() {
        let cfg = config(100.0, 0.0, 42.0, 0.0, 100.0);
        assert_eq!(classify(&quote(42.0, 42.0, 42.0, 0.0), &cfg), Classification::None);
    }

    #[test]
    fn each_condition_fires_in_priority_order() {
        let cfg = config(50.0, 40.0, 45.0, 0.5, 1.0);
        let cases = [
            (quote(45.2, 46.0, 44.0, 3.0), Classification::TargetZone),
            (quote(55.0, 56.0, 44.0, 3.0), Classification::AboveHighBand),
            (quote(35.0, 46.0, 30.0, -3.0), Classification::BelowLowBand),
            (quote(42.0, 46.0, 41.0, 3.0), Classification::HighVolatilityRange),
            (quote(42.0, 42.5, 41.9, -3.0), Classification::LargeDayMove),
            (quote(42.0, 42.5, 41.9, 0.2), Classification::None),
        ];

        for (quote, expected) in &cases {
            assert_eq!(classify(quote, &cfg), *expected, "bid {}", quote.bid);
        }
    }
}
