mod check;
mod run;
mod serve;

use std::sync::Arc;

use bidwatch_core::{
    AppConfig, AssetMultiplexer, HttpClient, JsonQuoteSource, LogChannel, NotificationChannel,
    PushoverChannel, QuoteSource, ReqwestHttpClient, ScrapeQuoteSource, SeverityMapper, SourceKind,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Serve => serve::run().await,
        Command::Run(args) => run::run(args, cli.pretty).await,
        Command::Check(args) => check::run(args, cli.pretty),
    }
}

/// Wire the configured source and channel into a multiplexer.
fn build_multiplexer(config: &AppConfig, dry_run: bool) -> Result<AssetMultiplexer, CliError> {
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let timeout_ms = config.http_timeout_ms();

    let source: Arc<dyn QuoteSource> = match config.source {
        SourceKind::Json => Arc::new(
            JsonQuoteSource::new(http_client.clone(), config.source_url.clone())
                .with_timeout_ms(timeout_ms),
        ),
        SourceKind::Scrape => Arc::new(
            ScrapeQuoteSource::new(http_client.clone(), config.source_url.clone())
                .with_timeout_ms(timeout_ms),
        ),
    };

    let channel: Arc<dyn NotificationChannel> = if dry_run {
        Arc::new(LogChannel)
    } else {
        let credentials = config.pushover_credentials()?;
        Arc::new(
            PushoverChannel::new(
                http_client,
                credentials.app_token.clone(),
                credentials.recipient.clone(),
            )
            .with_timeout_ms(timeout_ms),
        )
    };

    info!(
        assets = config.assets.len(),
        source = source.name(),
        channel = channel.name(),
        "alert pipeline configured"
    );

    Ok(AssetMultiplexer::new(source, channel)
        .with_mapper(SeverityMapper::new(config.chart_base_url.clone()))
        .with_call_timeout(config.http_timeout)
        .with_max_concurrency(config.max_concurrency))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
