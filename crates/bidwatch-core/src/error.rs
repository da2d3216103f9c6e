use thiserror::Error;

/// Validation errors for domain values exposed by `bidwatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("quote timestamp {millis}ms is out of range")]
    TimestampOutOfRange { millis: i64 },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("unknown timezone '{value}'")]
    UnknownTimezone { value: String },
    #[error("invalid cutoff '{value}', expected HHMM or HH:MM")]
    InvalidCutoff { value: String },
}

/// Configuration errors raised while loading settings at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {name}")]
    Missing { name: &'static str },

    #[error("variable {name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("variable {name} lists {found} values but {expected} assets are configured")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("asset configuration for {name} rejected: {source}")]
    Asset {
        name: String,
        #[source]
        source: ValidationError,
    },
}
