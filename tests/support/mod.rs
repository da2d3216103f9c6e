//! In-memory fakes shared by the behavior suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bidwatch_core::{
    AlertMessage, AssetConfig, NotificationChannel, NotifyError, Quote, QuoteSource, SourceError,
    Symbol, UtcDateTime,
};
use chrono::NaiveTime;
use chrono_tz::Tz;

/// Fixed quote time used by every fake quote: 2024-01-02T10:00:00Z.
pub const QUOTE_MILLIS: i64 = 1_704_189_600_000;

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

pub fn at(rfc3339: &str) -> UtcDateTime {
    UtcDateTime::parse(rfc3339).expect("valid timestamp")
}

/// FW20-like asset: bands 2200..2400, target 2300 +/- 5, large move 40.
pub fn asset(raw: &str) -> AssetConfig {
    asset_with(raw, None, chrono_tz::UTC)
}

pub fn asset_with(raw: &str, cutoff: Option<NaiveTime>, timezone: Tz) -> AssetConfig {
    AssetConfig::new(symbol(raw), 2_400.0, 2_200.0, 2_300.0, 5.0, 40.0, cutoff, timezone)
        .expect("valid asset")
}

pub fn quote(raw: &str, bid: f64, high: f64, low: f64, change: f64, pct: &str) -> Quote {
    Quote::new(
        symbol(raw),
        bid,
        high,
        low,
        change,
        pct,
        UtcDateTime::from_unix_millis(QUOTE_MILLIS).expect("valid timestamp"),
        None,
        None,
    )
    .expect("valid quote")
}

/// Quote with a quiet day around `bid`.
pub fn calm_quote(raw: &str, bid: f64) -> Quote {
    quote(raw, bid, bid + 2.0, bid - 2.0, 1.0, "0.04%")
}

#[derive(Clone)]
pub enum Scripted {
    Answer(Quote),
    Fail(SourceError),
    /// Never answers within any sensible timeout.
    Hang,
}

/// Quote source answering from a per-symbol script.
#[derive(Default)]
pub struct ScriptedSource {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(mut self, quote: Quote) -> Self {
        self.script
            .insert(quote.symbol.as_str().to_owned(), Scripted::Answer(quote));
        self
    }

    pub fn failing(mut self, raw: &str, error: SourceError) -> Self {
        self.script.insert(symbol(raw).as_str().to_owned(), Scripted::Fail(error));
        self
    }

    pub fn hanging(mut self, raw: &str) -> Self {
        self.script.insert(symbol(raw).as_str().to_owned(), Scripted::Hang);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl QuoteSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        self.calls
            .lock()
            .expect("lock")
            .push(symbol.as_str().to_owned());
        let scripted = self.script.get(symbol.as_str()).cloned();
        Box::pin(async move {
            match scripted {
                Some(Scripted::Answer(quote)) => Ok(quote),
                Some(Scripted::Fail(error)) => Err(error),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(SourceError::unavailable("woke up too late"))
                }
                None => Err(SourceError::unavailable(format!("no script for {symbol}"))),
            }
        })
    }
}

/// Channel that records every message and optionally refuses or stalls on
/// them all.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<AlertMessage>>,
    refusal: Option<NotifyError>,
    hang: bool,
    attempts: AtomicUsize,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(error: NotifyError) -> Self {
        Self {
            refusal: Some(error),
            ..Self::default()
        }
    }

    /// Never answers within any sensible timeout.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().expect("lock").clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if let Some(error) = &self.refusal {
                return Err(error.clone());
            }
            self.sent.lock().expect("lock").push(message.clone());
            Ok(())
        })
    }
}
