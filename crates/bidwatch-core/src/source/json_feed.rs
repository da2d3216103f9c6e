use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::source::{instrument_url, random_user_agent, QuoteSource, SourceError};
use crate::{Quote, Symbol, UtcDateTime};

const SOURCE_NAME: &str = "json feed";

/// Quote source for the broker's JSON quote feed.
#[derive(Clone)]
pub struct JsonQuoteSource {
    http_client: Arc<dyn HttpClient>,
    api_url: String,
    user_agent: String,
    timeout_ms: u64,
}

impl JsonQuoteSource {
    pub fn new(http_client: Arc<dyn HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            user_agent: random_user_agent().to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let request = HttpRequest::get(instrument_url(&self.api_url, symbol)?)
            .with_header("User-Agent", &self.user_agent)
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

        parse_feed_response(symbol, &response.body)
    }
}

impl QuoteSource for JsonQuoteSource {
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

/// Decode the feed's array payload; only the first element is used.
pub(crate) fn parse_feed_response(symbol: &Symbol, body: &str) -> Result<Quote, SourceError> {
    let entries: Vec<FeedQuote> = serde_json::from_str(body).map_err(|error| {
        SourceError::decode(format!(
            "{SOURCE_NAME} payload for {symbol} did not decode: {error}"
        ))
    })?;

    let Some(first) = entries.into_iter().next() else {
        return Err(SourceError::empty_payload(format!(
            "{SOURCE_NAME} returned no quotes for {symbol}"
        )));
    };

    debug!(%symbol, bid = first.bid_price, "decoded feed quote");

    let as_of = UtcDateTime::from_unix_millis(first.quote_tm)
        .map_err(|error| SourceError::from_validation(SOURCE_NAME, &error))?;

    Quote::new(
        symbol.clone(),
        first.bid_price,
        first.high_bid_price,
        first.low_bid_price,
        first.bid_day_change,
        render_percent(first.bid_day_change_pcnt),
        as_of,
        first.month_min,
        first.month_max,
    )
    .map_err(|error| SourceError::from_validation(SOURCE_NAME, &error))
}

/// Percent change is passed through as supplied; numbers are rendered
/// without reformatting.
fn render_percent(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct FeedQuote {
    #[serde(rename = "_bid_price")]
    bid_price: f64,
    #[serde(rename = "_high_bid_price")]
    high_bid_price: f64,
    #[serde(rename = "_low_bid_price")]
    low_bid_price: f64,
    #[serde(rename = "_bid_day_change")]
    bid_day_change: f64,
    #[serde(rename = "_bid_day_change_pcnt", default)]
    bid_day_change_pcnt: Value,
    #[serde(rename = "_quote_tm")]
    quote_tm: i64,
    #[serde(rename = "_30d_min_bid_price", default)]
    month_min: Option<f64>,
    #[serde(rename = "_30d_max_bid_price", default)]
    month_max: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceErrorKind;

    fn symbol() -> Symbol {
        Symbol::parse("FW20").expect("valid")
    }

    #[test]
    fn decodes_first_element_only() {
        let body = r#"[
            {"_symbol":"FW20","_bid_price":2301.5,"_high_bid_price":2320.0,"_low_bid_price":2290.0,
             "_bid_day_change":-4.5,"_bid_day_change_pcnt":"-0.19%","_quote_tm":1704189600000,
             "_30d_min_bid_price":2100.0,"_30d_max_bid_price":2400.0,"_ask_price":2302.0},
            {"_symbol":"FW20","_bid_price":1.0,"_high_bid_price":1.0,"_low_bid_price":1.0,
             "_bid_day_change":0.0,"_bid_day_change_pcnt":"0%","_quote_tm":0}
        ]"#;

        let quote = parse_feed_response(&symbol(), body).expect("decodes");
        assert_eq!(quote.bid, 2_301.5);
        assert_eq!(quote.high_bid, 2_320.0);
        assert_eq!(quote.low_bid, 2_290.0);
        assert_eq!(quote.day_change, -4.5);
        assert_eq!(quote.day_change_pct, "-0.19%");
        assert_eq!(quote.as_of.unix_seconds(), 1_704_189_600);
        assert_eq!(quote.month_min, Some(2_100.0));
        assert_eq!(quote.month_max, Some(2_400.0));
    }

    #[test]
    fn monthly_extremes_are_optional() {
        let body = r#"[{"_bid_price":1.5,"_high_bid_price":1.6,"_low_bid_price":1.4,
            "_bid_day_change":0.1,"_bid_day_change_pcnt":0.25,"_quote_tm":1704189600000}]"#;

        let quote = parse_feed_response(&symbol(), body).expect("decodes");
        assert_eq!(quote.month_min, None);
        assert_eq!(quote.month_max, None);
        assert_eq!(quote.day_change_pct, "0.25");
    }

    #[test]
    fn missing_bid_is_a_decode_error() {
        let body = r#"[{"_high_bid_price":1.6,"_low_bid_price":1.4,
            "_bid_day_change":0.1,"_bid_day_change_pcnt":"1%","_quote_tm":1704189600000}]"#;

        let err = parse_feed_response(&symbol(), body).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Decode);
    }

    #[test]
    fn empty_array_is_reported() {
        let err = parse_feed_response(&symbol(), "[]").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::EmptyPayload);
    }

    #[test]
    fn html_error_page_is_a_decode_error() {
        let err = parse_feed_response(&symbol(), "<html>maintenance</html>").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Decode);
        assert!(err.message().contains("FW20"));
    }
}
