//! Quote sources.
//!
//! A [`QuoteSource`] turns a symbol into a validated [`Quote`]. Anything that
//! prevents that (transport failure, timeout, non-2xx status, a payload that
//! does not decode) is a [`SourceError`]; a half-decoded or zero-valued quote
//! never reaches the evaluator.
//!
//! | Source | Transport | Payload |
//! |--------|-----------|---------|
//! | [`JsonQuoteSource`] | `GET {api_url}{SYMBOL}.` | JSON array, first element used |
//! | [`ScrapeQuoteSource`] | `GET {page_url}{SYMBOL}.` | HTML, `div#symbol-bid` text |

mod json_feed;
mod scrape;
mod user_agent;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::http_client::HttpError;
use crate::{Quote, Symbol, ValidationError};

pub use json_feed::JsonQuoteSource;
pub use scrape::ScrapeQuoteSource;
pub use user_agent::random_user_agent;

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    Timeout,
    Decode,
    EmptyPayload,
    InvalidRequest,
}

/// Structured fetch failure reported per asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn empty_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::EmptyPayload,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    /// Maps a transport failure, keeping timeouts distinguishable.
    pub fn from_transport(source: &str, error: &HttpError) -> Self {
        if error.is_timeout() {
            Self::timeout(format!("{source} transport timeout: {}", error.message()))
        } else {
            Self::unavailable(format!("{source} transport error: {}", error.message()))
        }
    }

    pub fn from_validation(source: &str, error: &ValidationError) -> Self {
        Self::decode(format!("{source} returned an invalid quote: {error}"))
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::EmptyPayload => "source.empty_payload",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Fetches the current quote for one symbol.
///
/// Implementations must be `Send + Sync`; the alert cycle shares one source
/// across concurrently evaluated assets.
pub trait QuoteSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetches the latest quote for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream is unreachable, slow, answers
    /// with a non-2xx status, or sends a payload that does not decode into a
    /// valid [`Quote`].
    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>>;
}

/// Feed URL convention: base, symbol, then a literal dot.
pub(crate) fn instrument_url(base: &str, symbol: &Symbol) -> Result<String, SourceError> {
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(SourceError::invalid_request(format!(
            "base URL '{base}' is not an http(s) URL"
        )));
    }
    Ok(format!("{base}{symbol}."))
}
