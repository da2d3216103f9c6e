//! # Domain Models
//!
//! Validated value types shared by the evaluator, the quote sources and the
//! alert cycle.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Quote`] | Bid snapshot for one instrument |
//! | [`AssetConfig`] | Bands, target and volatility threshold for one instrument |
//! | [`ThresholdOverrides`] | Lenient per-request overrides of an [`AssetConfig`] |
//! | [`Symbol`] | Validated instrument symbol |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates every invariant, so the evaluator can work on
//! plain arithmetic without an error path.

mod asset;
mod quote;
mod symbol;
mod timestamp;

pub use asset::{parse_cutoff, parse_timezone, AssetConfig, ThresholdOverrides};
pub use quote::Quote;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
