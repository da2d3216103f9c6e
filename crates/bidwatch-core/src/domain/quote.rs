use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// One instrument's market snapshot at a single instant.
///
/// Built once per fetch and never mutated afterwards; the evaluator only
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub bid: f64,
    pub high_bid: f64,
    pub low_bid: f64,
    /// Signed absolute change from the prior close.
    pub day_change: f64,
    /// Percent change exactly as the source rendered it.
    pub day_change_pct: String,
    pub as_of: UtcDateTime,
    pub month_min: Option<f64>,
    pub month_max: Option<f64>,
}

impl Quote {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        bid: f64,
        high_bid: f64,
        low_bid: f64,
        day_change: f64,
        day_change_pct: impl Into<String>,
        as_of: UtcDateTime,
        month_min: Option<f64>,
        month_max: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_finite("bid", bid)?;
        validate_finite("high_bid", high_bid)?;
        validate_finite("low_bid", low_bid)?;
        validate_finite("day_change", day_change)?;
        validate_optional_finite("month_min", month_min)?;
        validate_optional_finite("month_max", month_max)?;

        Ok(Self {
            symbol,
            bid,
            high_bid,
            low_bid,
            day_change,
            day_change_pct: day_change_pct.into(),
            as_of,
            month_min,
            month_max,
        })
    }

    /// Quote for sources that only publish the current bid.
    pub fn bid_only(symbol: Symbol, bid: f64, as_of: UtcDateTime) -> Result<Self, ValidationError> {
        Self::new(symbol, bid, bid, bid, 0.0, String::new(), as_of, None, None)
    }

    /// Today's high-low bid range.
    pub fn day_range(&self) -> f64 {
        self.high_bid - self.low_bid
    }

    /// One-line status, e.g. `14:30:05 - Bid: 2301.50 Change: -4.50 -0.19%`.
    pub fn summary(&self, zone: Tz) -> String {
        format!(
            "{} - Bid: {:.2} Change: {:.2} {}",
            self.as_of.format_clock(zone),
            self.bid,
            self.day_change,
            self.day_change_pct
        )
    }
}

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_finite(field, value)?;
    }
    Ok(())
}
