//! # Bidwatch Core
//!
//! Stateless bid-threshold alerting.
//!
//! ## Overview
//!
//! Each cycle fetches a fresh quote for every configured asset, classifies it
//! against the asset's bands, target zone and volatility threshold, and
//! pushes a notification when a condition holds. Nothing is remembered
//! between cycles.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Environment-driven runtime configuration |
//! | [`domain`] | Domain models (Quote, AssetConfig, Symbol, UtcDateTime) |
//! | [`error`] | Core error types |
//! | [`evaluator`] | Priority-ordered quote classification |
//! | [`http_client`] | HTTP client abstraction |
//! | [`multiplexer`] | One alert cycle across many assets |
//! | [`notify`] | Notification channels (Pushover, log) |
//! | [`severity`] | Classification to notification mapping |
//! | [`source`] | Quote sources (JSON feed, HTML page) |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use bidwatch_core::notify::LogChannel;
//! use bidwatch_core::source::JsonQuoteSource;
//! use bidwatch_core::{AppConfig, AssetMultiplexer, ReqwestHttpClient, UtcDateTime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let http = Arc::new(ReqwestHttpClient::new());
//!     let source = Arc::new(JsonQuoteSource::new(http, config.source_url.clone()));
//!     let multiplexer = AssetMultiplexer::new(source, Arc::new(LogChannel));
//!
//!     let report = multiplexer.run_cycle(&config.assets, UtcDateTime::now()).await;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Trigger (HTTP / │
//! │ CLI)            │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ AssetMultiplexer│────▶│ QuoteSource      │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ classify ──▶    │────▶│ Notification     │
//! │ SeverityMapper  │     │ Channel          │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod http_client;
pub mod multiplexer;
pub mod notify;
pub mod severity;
pub mod source;

pub use config::{AppConfig, AssetSettings, PushoverCredentials, SourceKind};
pub use domain::{
    parse_cutoff, parse_timezone, AssetConfig, Quote, Symbol, ThresholdOverrides, UtcDateTime,
};
pub use error::{ConfigError, ValidationError};
pub use evaluator::{classify, Classification};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use multiplexer::{AssetMultiplexer, AssetOutcome, AssetStatus, CycleReport, Delivery};
pub use notify::{LogChannel, NotificationChannel, NotifyError, PushoverChannel};
pub use severity::{AlertMessage, Priority, SeverityMapper, Tone};
pub use source::{JsonQuoteSource, QuoteSource, ScrapeQuoteSource, SourceError, SourceErrorKind};
