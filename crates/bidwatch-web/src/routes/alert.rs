//! Cycle triggers.
//!
//! `GET /alert` evaluates a single asset and answers with a JSON string: the
//! quote summary, `"skipped"` after the cutoff, or `"error: <message>"`.
//! Its query is read leniently: repeated keys keep their first value and an
//! unreadable query counts as no overrides.
//! `GET /alerts` evaluates every configured asset and answers with the full
//! cycle report.

use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use bidwatch_core::{AssetConfig, AssetStatus, CycleReport, Symbol, ThresholdOverrides};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alert", get(single_asset))
        .route("/alerts", get(all_assets))
}

async fn single_asset(
    State(state): State<AppState>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Json<String> {
    let overrides = query
        .map(|Query(pairs)| ThresholdOverrides::from_pairs(pairs))
        .unwrap_or_default();
    let Some(asset) = resolve_asset(&state.config.assets, &overrides) else {
        return Json(String::from("error: no assets configured"));
    };
    info!(symbol = %asset.symbol, "single-asset cycle requested");

    let report = state
        .multiplexer
        .run_cycle(std::slice::from_ref(&asset), (state.clock)())
        .await;

    let reply = match report.outcomes.into_iter().next().map(|outcome| outcome.status) {
        Some(AssetStatus::Evaluated { summary, .. }) => summary,
        Some(AssetStatus::Skipped { .. }) => String::from("skipped"),
        Some(AssetStatus::FetchFailed { message, .. }) => format!("error: {message}"),
        None => String::from("error: asset was not evaluated"),
    };
    Json(reply)
}

async fn all_assets(State(state): State<AppState>) -> Json<CycleReport> {
    info!(assets = state.config.assets.len(), "multi-asset cycle requested");
    let report = state
        .multiplexer
        .run_cycle(&state.config.assets, (state.clock)())
        .await;
    Json(report)
}

/// The configured asset named by `a`, otherwise the first configured asset
/// (renamed to `a` when it is a valid symbol), with the overrides applied.
fn resolve_asset(assets: &[AssetConfig], overrides: &ThresholdOverrides) -> Option<AssetConfig> {
    let requested = overrides
        .symbol
        .as_deref()
        .and_then(|raw| Symbol::parse(raw).ok());

    let base = requested
        .as_ref()
        .and_then(|symbol| assets.iter().find(|asset| &asset.symbol == symbol))
        .or_else(|| assets.first())?;

    Some(base.with_overrides(overrides))
}
