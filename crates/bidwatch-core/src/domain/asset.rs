use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::domain::quote::{validate_finite, validate_non_negative};
use crate::{Symbol, UtcDateTime, ValidationError};

/// Evaluation parameters for one instrument, fixed for the life of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub symbol: Symbol,
    pub high_band: f64,
    pub low_band: f64,
    pub target: f64,
    pub target_zone: f64,
    pub large_move: f64,
    /// Local time of day from which the asset is no longer evaluated.
    pub cutoff: Option<NaiveTime>,
    pub timezone: Tz,
}

impl AssetConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        high_band: f64,
        low_band: f64,
        target: f64,
        target_zone: f64,
        large_move: f64,
        cutoff: Option<NaiveTime>,
        timezone: Tz,
    ) -> Result<Self, ValidationError> {
        validate_finite("high_band", high_band)?;
        validate_finite("low_band", low_band)?;
        validate_finite("target", target)?;
        validate_non_negative("target_zone", target_zone)?;
        validate_non_negative("large_move", large_move)?;

        Ok(Self {
            symbol,
            high_band,
            low_band,
            target,
            target_zone,
            large_move,
            cutoff,
            timezone,
        })
    }

    /// True once local time in the asset's zone reaches the cutoff.
    pub fn is_past_cutoff(&self, now: UtcDateTime) -> bool {
        match self.cutoff {
            Some(cutoff) => now.local_time(self.timezone) >= cutoff,
            None => false,
        }
    }

    /// Copy with whichever overrides parse cleanly; anything else keeps the
    /// configured value.
    pub fn with_overrides(&self, overrides: &ThresholdOverrides) -> Self {
        let mut next = self.clone();
        if let Some(symbol) = overrides.symbol.as_deref().and_then(|raw| Symbol::parse(raw).ok()) {
            next.symbol = symbol;
        }
        if let Some(high) = parse_lenient(overrides.high.as_deref()) {
            next.high_band = high;
        }
        if let Some(low) = parse_lenient(overrides.low.as_deref()) {
            next.low_band = low;
        }
        if let Some(target) = parse_lenient(overrides.target.as_deref()) {
            next.target = target;
        }
        next
    }
}

/// Raw per-request threshold overrides (`a`, `h`, `l`, `t`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdOverrides {
    pub symbol: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub target: Option<String>,
}

impl ThresholdOverrides {
    /// Collect overrides from query pairs. The first value of a repeated key
    /// wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "a" => &mut overrides.symbol,
                "h" => &mut overrides.high,
                "l" => &mut overrides.low,
                "t" => &mut overrides.target,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        overrides
    }
}

fn parse_lenient(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Parse an IANA zone name such as `Europe/Warsaw`.
pub fn parse_timezone(input: &str) -> Result<Tz, ValidationError> {
    input
        .trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone {
            value: input.to_owned(),
        })
}

/// Parse a cutoff written as `HHMM` or `HH:MM`. `2400` means no cutoff.
pub fn parse_cutoff(input: &str) -> Result<Option<NaiveTime>, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidCutoff {
        value: input.to_owned(),
    };

    let digits: String = trimmed.chars().filter(|ch| *ch != ':').collect();
    let well_formed = digits.len() == 4
        && digits.chars().all(|ch| ch.is_ascii_digit())
        && (trimmed.len() == 4 || (trimmed.len() == 5 && trimmed.find(':') == Some(2)));
    if !well_formed {
        return Err(invalid());
    }

    if digits == "2400" {
        return Ok(None);
    }

    let hour = digits[..2].parse::<u32>().map_err(|_| invalid())?;
    let minute = digits[2..].parse::<u32>().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .map(Some)
        .ok_or_else(invalid)
}
