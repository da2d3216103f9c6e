//! One alert cycle over the configured assets.
//!
//! For each asset, in configured order:
//!
//! 1. skip it when local time in the asset's zone has reached its cutoff
//!    (no fetch, no evaluation);
//! 2. fetch the quote, bounded by the call timeout;
//! 3. classify, map to a message, and hand the message to the channel,
//!    again bounded by the call timeout.
//!
//! A failure on one asset is recorded in its [`AssetOutcome`] and never
//! stops the others. The multiplexer keeps nothing between cycles, so a
//! condition that stays true fires again on every cycle.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::notify::NotificationChannel;
use crate::source::{QuoteSource, SourceError};
use crate::{classify, AssetConfig, Classification, SeverityMapper, Symbol, UtcDateTime};

/// Default number of assets evaluated at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Delivery state of the alert for an evaluated asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Delivery {
    /// Nothing fired.
    NotRequired,
    Delivered,
    Failed { reason: String },
}

/// What happened to one asset during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    Skipped {
        local_time: String,
        cutoff: String,
    },
    FetchFailed {
        code: String,
        message: String,
    },
    Evaluated {
        summary: String,
        bid: f64,
        classification: Classification,
        delivery: Delivery,
    },
}

/// Per-asset entry of a [`CycleReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetOutcome {
    pub symbol: Symbol,
    #[serde(flatten)]
    pub status: AssetStatus,
}

impl AssetOutcome {
    pub fn classification(&self) -> Option<Classification> {
        match &self.status {
            AssetStatus::Evaluated { classification, .. } => Some(*classification),
            _ => None,
        }
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self.status, AssetStatus::Skipped { .. })
    }

    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self.status, AssetStatus::FetchFailed { .. })
    }
}

/// Result of one cycle, outcomes in configured asset order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: UtcDateTime,
    pub outcomes: Vec<AssetOutcome>,
}

impl CycleReport {
    pub fn outcome(&self, symbol: &Symbol) -> Option<&AssetOutcome> {
        self.outcomes.iter().find(|outcome| &outcome.symbol == symbol)
    }

    /// Number of assets whose evaluation fired an alert.
    pub fn fired(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.classification().is_some_and(Classification::is_alert))
            .count()
    }

    pub fn fetch_failures(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_fetch_failure()).count()
    }
}

/// Runs alert cycles against a quote source and a notification channel.
#[derive(Clone)]
pub struct AssetMultiplexer {
    source: Arc<dyn QuoteSource>,
    channel: Arc<dyn NotificationChannel>,
    mapper: SeverityMapper,
    call_timeout: Duration,
    max_concurrency: usize,
}

impl AssetMultiplexer {
    pub fn new(source: Arc<dyn QuoteSource>, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            source,
            channel,
            mapper: SeverityMapper::default(),
            call_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_mapper(mut self, mapper: SeverityMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Evaluate every asset once at `now`.
    pub async fn run_cycle(&self, assets: &[AssetConfig], now: UtcDateTime) -> CycleReport {
        info!(
            assets = assets.len(),
            source = self.source.name(),
            channel = self.channel.name(),
            "alert cycle started"
        );

        let pending: Vec<_> = assets
            .iter()
            .map(|asset| self.run_asset(asset, now))
            .collect();
        let outcomes: Vec<AssetOutcome> = stream::iter(pending)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let report = CycleReport {
            started_at: now,
            outcomes,
        };
        info!(
            fired = report.fired(),
            fetch_failures = report.fetch_failures(),
            "alert cycle finished"
        );
        report
    }

    async fn run_asset(&self, asset: &AssetConfig, now: UtcDateTime) -> AssetOutcome {
        let symbol = asset.symbol.clone();

        if let Some(cutoff) = asset.cutoff.filter(|_| asset.is_past_cutoff(now)) {
            let local_time = now.format_clock(asset.timezone);
            debug!(%symbol, %local_time, %cutoff, "past end-of-day cutoff, skipping");
            return AssetOutcome {
                symbol,
                status: AssetStatus::Skipped {
                    local_time,
                    cutoff: cutoff.format("%H:%M").to_string(),
                },
            };
        }

        let quote = match self.fetch_bounded(&asset.symbol).await {
            Ok(quote) => quote,
            Err(error) => {
                warn!(%symbol, code = error.code(), error = %error.message(), "quote fetch failed");
                return AssetOutcome {
                    symbol,
                    status: AssetStatus::FetchFailed {
                        code: error.code().to_owned(),
                        message: error.message().to_owned(),
                    },
                };
            }
        };

        let classification = classify(&quote, asset);
        let delivery = match self.mapper.map(classification, asset, &quote) {
            Some(message) => {
                info!(
                    %symbol,
                    %classification,
                    bid = quote.bid,
                    priority = message.priority.ordinal(),
                    "alert fired"
                );
                match tokio::time::timeout(self.call_timeout, self.channel.send(&message)).await {
                    Ok(Ok(())) => Delivery::Delivered,
                    Ok(Err(error)) => {
                        warn!(%symbol, error = %error, "alert delivery failed");
                        Delivery::Failed {
                            reason: error.to_string(),
                        }
                    }
                    Err(_) => {
                        let reason = format!(
                            "{} did not answer within {}ms",
                            self.channel.name(),
                            self.call_timeout.as_millis()
                        );
                        warn!(%symbol, %reason, "alert delivery failed");
                        Delivery::Failed { reason }
                    }
                }
            }
            None => {
                debug!(%symbol, bid = quote.bid, "no threshold crossed");
                Delivery::NotRequired
            }
        };

        AssetOutcome {
            symbol,
            status: AssetStatus::Evaluated {
                summary: quote.summary(asset.timezone),
                bid: quote.bid,
                classification,
                delivery,
            },
        }
    }

    async fn fetch_bounded(&self, symbol: &Symbol) -> Result<crate::Quote, SourceError> {
        match tokio::time::timeout(self.call_timeout, self.source.fetch(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(format!(
                "{} did not answer within {}ms",
                self.source.name(),
                self.call_timeout.as_millis()
            ))),
        }
    }
}
