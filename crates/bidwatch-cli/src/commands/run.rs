use bidwatch_core::{AppConfig, UtcDateTime};

use crate::cli::RunArgs;
use crate::error::CliError;

use super::{build_multiplexer, print_json};

pub async fn run(args: &RunArgs, pretty: bool) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    let multiplexer = build_multiplexer(&config, args.dry_run)?;

    let report = multiplexer.run_cycle(&config.assets, UtcDateTime::now()).await;
    print_json(&report, pretty)
}
