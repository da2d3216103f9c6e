use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// RFC3339 timestamp guaranteed to be UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(DateTime<Utc>);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Converts the feed's epoch-milliseconds encoding.
    pub fn from_unix_millis(millis: i64) -> Result<Self, ValidationError> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Self)
            .ok_or(ValidationError::TimestampOutOfRange { millis })
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = DateTime::parse_from_rfc3339(input).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        if parsed.offset().local_minus_utc() != 0 {
            return Err(ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            });
        }

        Ok(Self(parsed.with_timezone(&Utc)))
    }

    pub fn unix_seconds(self) -> i64 {
        self.0.timestamp()
    }

    /// Wall-clock time of day in the given zone.
    pub fn local_time(self, zone: Tz) -> NaiveTime {
        self.0.with_timezone(&zone).time()
    }

    /// `HH:MM:SS` in the given zone.
    pub fn format_clock(self, zone: Tz) -> String {
        self.0.with_timezone(&zone).format("%H:%M:%S").to_string()
    }

    pub fn format_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for UtcDateTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_epoch_millis() {
        let ts = UtcDateTime::from_unix_millis(1_704_067_200_500).expect("in range");
        assert_eq!(ts.format_rfc3339(), "2024-01-01T00:00:00.500Z");
        assert_eq!(ts.unix_seconds(), 1_704_067_200);
    }

    #[test]
    fn rejects_out_of_range_millis() {
        let err = UtcDateTime::from_unix_millis(i64::MAX).expect_err("must fail");
        assert!(matches!(err, ValidationError::TimestampOutOfRange { .. }));
    }

    #[test]
    fn formats_clock_in_zone() {
        let ts = UtcDateTime::parse("2024-07-01T12:30:05Z").expect("must parse");
        assert_eq!(ts.format_clock(chrono_tz::Europe::Warsaw), "14:30:05");
        assert_eq!(ts.format_clock(chrono_tz::UTC), "12:30:05");
    }

    #[test]
    fn rejects_non_utc_timestamp() {
        let err = UtcDateTime::parse("2024-01-01T01:00:00+01:00").expect_err("must fail");
        assert!(matches!(err, ValidationError::TimestampNotUtc { .. }));
    }
}
