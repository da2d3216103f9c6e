use bidwatch_core::{
    classify, AlertMessage, AssetSettings, Classification, Quote, SeverityMapper, Symbol,
    UtcDateTime,
};
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::error::CliError;

use super::print_json;

#[derive(Debug, Serialize)]
struct CheckReport {
    symbol: Symbol,
    summary: String,
    classification: Classification,
    message: Option<AlertMessage>,
}

pub fn run(args: &CheckArgs, pretty: bool) -> Result<(), CliError> {
    let settings = AssetSettings::from_env()?;
    let symbol = Symbol::parse(&args.symbol)?;
    let asset = settings
        .asset(&symbol)
        .ok_or_else(|| CliError::Command(format!("no configured asset named {symbol}")))?;

    let quote = Quote::new(
        symbol.clone(),
        args.bid,
        args.high,
        args.low,
        args.change,
        args.pct.clone(),
        UtcDateTime::now(),
        None,
        None,
    )?;

    let classification = classify(&quote, asset);
    let message = SeverityMapper::new(settings.chart_base_url.clone()).map(classification, asset, &quote);

    print_json(
        &CheckReport {
            symbol,
            summary: quote.summary(asset.timezone),
            classification,
            message,
        },
        pretty,
    )
}
