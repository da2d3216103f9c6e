//! Behavior-driven tests for alert cycles across several assets
//!
//! These tests verify HOW one cycle treats each asset independently:
//! cutoffs, fetch failures, timeouts and delivery failures.

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bidwatch_core::{
    AssetMultiplexer, AssetStatus, Classification, Delivery, NotifyError, SourceError,
};
use chrono::NaiveTime;
use support::{asset, asset_with, at, calm_quote, symbol, RecordingChannel, ScriptedSource};

// =============================================================================
// Cycle: independence between assets
// =============================================================================

#[tokio::test]
async fn when_one_fetch_fails_system_still_alerts_for_the_other_asset() {
    // Given: FW20 whose source is down and DE30 trading above its high band
    let source = Arc::new(
        ScriptedSource::new()
            .failing("FW20", SourceError::unavailable("feed returned status 503"))
            .answering(calm_quote("DE30", 2_450.0)),
    );
    let channel = Arc::new(RecordingChannel::new());
    let multiplexer = AssetMultiplexer::new(source, channel.clone());

    // When: One cycle runs over both assets
    let report = multiplexer
        .run_cycle(&[asset("FW20"), asset("DE30")], at("2024-01-02T10:00:00Z"))
        .await;

    // Then: The failure is recorded, the alert for DE30 is still delivered
    assert_eq!(
        report.outcome(&symbol("FW20")).map(|o| o.status.clone()),
        Some(AssetStatus::FetchFailed {
            code: String::from("source.unavailable"),
            message: String::from("feed returned status 503"),
        })
    );
    let de30 = report.outcome(&symbol("DE30")).expect("DE30 outcome");
    assert_eq!(de30.classification(), Some(Classification::AboveHighBand));

    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Above higher band");
    assert_eq!(sent[0].body, "DE30 is now at 2450.00");
}

#[tokio::test]
async fn when_asset_is_past_cutoff_system_skips_it_without_fetching() {
    // Given: FW20 closes at 17:00 Warsaw time, DE30 has no cutoff
    let warsaw = chrono_tz::Europe::Warsaw;
    let source = Arc::new(
        ScriptedSource::new()
            .answering(calm_quote("FW20", 2_301.0))
            .answering(calm_quote("DE30", 2_250.0)),
    );
    let channel = Arc::new(RecordingChannel::new());
    let multiplexer = AssetMultiplexer::new(source.clone(), channel.clone());
    let assets = [
        asset_with("FW20", NaiveTime::from_hms_opt(17, 0, 0), warsaw),
        asset_with("DE30", None, warsaw),
    ];

    // When: The cycle runs at 17:05 local time (16:05 UTC in winter)
    let report = multiplexer.run_cycle(&assets, at("2024-01-02T16:05:00Z")).await;

    // Then: FW20 is skipped and never fetched; DE30 is evaluated
    assert_eq!(
        report.outcomes[0].status,
        AssetStatus::Skipped {
            local_time: String::from("17:05:00"),
            cutoff: String::from("17:00"),
        }
    );
    assert_eq!(source.calls(), vec![String::from("DE30")]);
    assert_eq!(report.outcomes[1].classification(), Some(Classification::None));
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn when_cycle_runs_before_cutoff_system_evaluates_asset() {
    // Given: FW20 closes at 17:00 Warsaw time
    let source = Arc::new(ScriptedSource::new().answering(calm_quote("FW20", 2_301.0)));
    let channel = Arc::new(RecordingChannel::new());
    let multiplexer = AssetMultiplexer::new(source, channel.clone());
    let assets = [asset_with(
        "FW20",
        NaiveTime::from_hms_opt(17, 0, 0),
        chrono_tz::Europe::Warsaw,
    )];

    // When: The cycle runs at 16:59 local time
    let report = multiplexer.run_cycle(&assets, at("2024-01-02T15:59:00Z")).await;

    // Then: The target zone alert goes out
    assert_eq!(report.outcomes[0].classification(), Some(Classification::TargetZone));
    assert_eq!(channel.sent().len(), 1);
}

// =============================================================================
// Cycle: timeouts and delivery failures
// =============================================================================

#[tokio::test]
async fn when_source_hangs_system_records_timeout_and_moves_on() {
    // Given: A source that never answers for FW20 and a short call timeout
    let source = Arc::new(
        ScriptedSource::new()
            .hanging("FW20")
            .answering(calm_quote("DE30", 2_150.0)),
    );
    let channel = Arc::new(RecordingChannel::new());
    let multiplexer = AssetMultiplexer::new(source, channel.clone())
        .with_call_timeout(Duration::from_millis(50));

    // When: One cycle runs
    let started = Instant::now();
    let report = multiplexer
        .run_cycle(&[asset("FW20"), asset("DE30")], at("2024-01-02T10:00:00Z"))
        .await;

    // Then: FW20 times out, DE30 still alerts, and the cycle does not wait
    // for the hung call
    assert!(started.elapsed() < Duration::from_secs(5));
    match &report.outcomes[0].status {
        AssetStatus::FetchFailed { code, .. } => assert_eq!(code, "source.timeout"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(report.outcomes[1].classification(), Some(Classification::BelowLowBand));
    assert_eq!(channel.sent().len(), 1);
}

#[tokio::test]
async fn when_channel_hangs_system_reports_failed_delivery_and_moves_on() {
    // Given: FW20 in its target zone, DE30 calm, and a channel that never
    // answers
    let source = Arc::new(
        ScriptedSource::new()
            .answering(calm_quote("FW20", 2_301.0))
            .answering(calm_quote("DE30", 2_250.0)),
    );
    let channel = Arc::new(RecordingChannel::hanging());
    let multiplexer = AssetMultiplexer::new(source, channel.clone())
        .with_call_timeout(Duration::from_millis(50));

    // When: One cycle runs
    let started = Instant::now();
    let report = multiplexer
        .run_cycle(&[asset("FW20"), asset("DE30")], at("2024-01-02T10:00:00Z"))
        .await;

    // Then: The FW20 delivery fails on the call timeout, DE30 is still
    // evaluated, and the cycle does not wait for the hung send
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(channel.attempts(), 1);
    assert!(channel.sent().is_empty());
    match &report.outcomes[0].status {
        AssetStatus::Evaluated { delivery, .. } => assert_eq!(
            delivery,
            &Delivery::Failed {
                reason: String::from("recording did not answer within 50ms"),
            }
        ),
        other => panic!("expected evaluation, got {other:?}"),
    }
    match &report.outcomes[1].status {
        AssetStatus::Evaluated { delivery, .. } => assert_eq!(delivery, &Delivery::NotRequired),
        other => panic!("expected evaluation, got {other:?}"),
    }
    assert_eq!(report.fired(), 1);
}

#[tokio::test]
async fn when_delivery_is_rejected_system_reports_it_without_failing_cycle() {
    // Given: A channel that refuses every message and two firing assets
    let source = Arc::new(
        ScriptedSource::new()
            .answering(calm_quote("FW20", 2_301.0))
            .answering(calm_quote("DE30", 2_450.0)),
    );
    let channel = Arc::new(RecordingChannel::refusing(NotifyError::Rejected {
        channel: "recording",
        status: 429,
        reason: String::from("quota exceeded"),
    }));
    let multiplexer = AssetMultiplexer::new(source, channel.clone());

    // When: The cycle runs
    let report = multiplexer
        .run_cycle(&[asset("FW20"), asset("DE30")], at("2024-01-02T10:00:00Z"))
        .await;

    // Then: Both assets were evaluated, both deliveries attempted and failed
    assert_eq!(channel.attempts(), 2);
    assert_eq!(report.fired(), 2);
    for outcome in &report.outcomes {
        match &outcome.status {
            AssetStatus::Evaluated { delivery, .. } => assert_eq!(
                delivery,
                &Delivery::Failed {
                    reason: String::from(
                        "recording rejected message (status 429): quota exceeded"
                    ),
                }
            ),
            other => panic!("expected evaluation, got {other:?}"),
        }
    }
}

// =============================================================================
// Cycle: statelessness
// =============================================================================

#[tokio::test]
async fn when_condition_persists_system_alerts_again_next_cycle() {
    // Given: A bid that stays in the target zone
    let source = Arc::new(ScriptedSource::new().answering(calm_quote("FW20", 2_299.0)));
    let channel = Arc::new(RecordingChannel::new());
    let multiplexer = AssetMultiplexer::new(source, channel.clone());
    let assets = [asset("FW20")];

    // When: Two cycles run back to back
    multiplexer.run_cycle(&assets, at("2024-01-02T10:00:00Z")).await;
    multiplexer.run_cycle(&assets, at("2024-01-02T10:01:00Z")).await;

    // Then: Nothing is de-duplicated
    assert_eq!(channel.sent().len(), 2);
}

#[tokio::test]
async fn when_evaluated_system_reports_summary_line_in_asset_zone() {
    // Given: A Warsaw asset and a quote taken at 10:00 UTC
    let source = Arc::new(ScriptedSource::new().answering(calm_quote("FW20", 2_250.0)));
    let multiplexer = AssetMultiplexer::new(source, Arc::new(RecordingChannel::new()));
    let assets = [asset_with("FW20", None, chrono_tz::Europe::Warsaw)];

    // When
    let report = multiplexer.run_cycle(&assets, at("2024-01-02T10:00:00Z")).await;

    // Then: The summary uses local clock time and two decimals
    match &report.outcomes[0].status {
        AssetStatus::Evaluated { summary, delivery, .. } => {
            assert_eq!(summary, "11:00:00 - Bid: 2250.00 Change: 1.00 0.04%");
            assert_eq!(delivery, &Delivery::NotRequired);
        }
        other => panic!("expected evaluation, got {other:?}"),
    }
}
