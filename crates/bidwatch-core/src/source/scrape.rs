use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::source::{instrument_url, random_user_agent, QuoteSource, SourceError};
use crate::{Quote, Symbol, UtcDateTime};

const SOURCE_NAME: &str = "instrument page";

/// Quote source that reads the bid from the broker's public instrument page.
///
/// The page shows only the current bid, so the resulting quote has a flat
/// day range, no day change and the fetch time as its timestamp.
#[derive(Clone)]
pub struct ScrapeQuoteSource {
    http_client: Arc<dyn HttpClient>,
    page_url: String,
    user_agent: String,
    timeout_ms: u64,
}

impl ScrapeQuoteSource {
    pub fn new(http_client: Arc<dyn HttpClient>, page_url: impl Into<String>) -> Self {
        Self {
            http_client,
            page_url: page_url.into(),
            user_agent: random_user_agent().to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let request = HttpRequest::get(instrument_url(&self.page_url, symbol)?)
            .with_header("User-Agent", &self.user_agent)
            .with_header("Accept", "text/html")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::from_transport(SOURCE_NAME, &error))?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "{SOURCE_NAME} returned status {} for {symbol}",
                response.status
            )));
        }

        let bid = extract_bid(&response.body).ok_or_else(|| {
            SourceError::decode(format!("{SOURCE_NAME} for {symbol} has no readable bid"))
        })?;

        Quote::bid_only(symbol.clone(), bid, UtcDateTime::now())
            .map_err(|error| SourceError::from_validation(SOURCE_NAME, &error))
    }
}

impl QuoteSource for ScrapeQuoteSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_quote(symbol))
    }
}

static BID_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bid\s*=\s*["']?symbol-bid["']?[^>]*>(.*?)</div>"#)
        .expect("valid regex")
});

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Text of `div#symbol-bid` parsed as a number.
pub(crate) fn extract_bid(html: &str) -> Option<f64> {
    let inner = BID_ELEMENT.captures(html)?.get(1)?.as_str();
    let text: String = MARKUP
        .replace_all(inner, "")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();

    text.parse::<f64>().ok().filter(|bid| bid.is_finite())
}
