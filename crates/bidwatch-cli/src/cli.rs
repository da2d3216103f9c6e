//! CLI argument definitions for bidwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Serve the HTTP cycle triggers |
//! | `run` | Run one cycle over every configured asset |
//! | `check` | Classify a hand-entered quote offline |
//!
//! Settings come from the environment (and `.env`); see
//! `bidwatch_core::config`.
//!
//! # Examples
//!
//! ```bash
//! bidwatch serve
//! bidwatch run --dry-run --pretty
//! bidwatch check FW20 --bid 2301.5 --high 2350 --low 2280
//! ```

use clap::{Args, Parser, Subcommand};

/// Bid threshold alerts pushed to your phone.
#[derive(Debug, Parser)]
#[command(
    name = "bidwatch",
    author,
    version,
    about = "Stateless bid threshold alerting"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `/alert`, `/alerts` and `/health` until interrupted.
    Serve,

    /// Run one cycle over all configured assets and print the report.
    ///
    /// # Examples
    ///
    ///   bidwatch run
    ///   bidwatch run --dry-run --pretty
    Run(RunArgs),

    /// Classify a quote you type in, without fetching or sending anything.
    ///
    /// # Examples
    ///
    ///   bidwatch check FW20 --bid 2301.5 --high 2350 --low 2280
    ///   bidwatch check DE30 --bid 15100 --high 15300 --low 15050 --change -180 --pct=-1.18%
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log alerts instead of delivering them; Pushover credentials are not needed.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Configured asset to check against.
    pub symbol: String,

    /// Current bid.
    #[arg(long, allow_negative_numbers = true)]
    pub bid: f64,

    /// Today's highest bid.
    #[arg(long, allow_negative_numbers = true)]
    pub high: f64,

    /// Today's lowest bid.
    #[arg(long, allow_negative_numbers = true)]
    pub low: f64,

    /// Signed change from the prior close.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    pub change: f64,

    /// Percent change as displayed, e.g. `-1.18%`.
    #[arg(long, allow_hyphen_values = true, default_value = "")]
    pub pct: String,
}
