//! Runtime configuration loaded from environment variables.
//!
//! | Env Var | Default |
//! |---------|---------|
//! | `ASSETS` / `ASSET` | required |
//! | `HIGH`, `LOW`, `TARGET` | required, one value per asset |
//! | `LARGE_MOVE`, `TARGET_ZONE` | required, one value or one per asset |
//! | `ENDHOUR` | no cutoff; one `HH:MM` or `HHMM` applies to every asset |
//! | `CITY` | `UTC` |
//! | `QUOTE_SOURCE` | `json` |
//! | `API_URL` / `SCRAPE_URL` | required for the selected source |
//! | `WEB_URL` | no chart link |
//! | `APP_ID`, `GROUP_ID` | required unless dry run |
//! | `HTTP_TIMEOUT_MS` | `3000` |
//! | `MAX_CONCURRENCY` | `4` |
//! | `HOST`, `PORT` | `0.0.0.0`, `8080` |

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::multiplexer::DEFAULT_MAX_CONCURRENCY;
use crate::{parse_cutoff, parse_timezone, AssetConfig, ConfigError, Symbol};

const LIST_SEPARATOR: char = ':';

/// Which upstream the quotes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Json,
    Scrape,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Scrape => "scrape",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "scrape" | "html" => Ok(Self::Scrape),
            other => Err(format!("expected 'json' or 'scrape', got '{other}'")),
        }
    }
}

/// Pushover application token and recipient key.
#[derive(Clone, PartialEq, Eq)]
pub struct PushoverCredentials {
    pub app_token: String,
    pub recipient: String,
}

impl std::fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("app_token", &"<redacted>")
            .field("recipient", &"<redacted>")
            .finish()
    }
}

/// Immutable settings for one process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub assets: Vec<AssetConfig>,
    pub source: SourceKind,
    /// Base URL of the selected quote source.
    pub source_url: String,
    pub chart_base_url: Option<String>,
    pub pushover: Option<PushoverCredentials>,
    pub http_timeout: Duration,
    pub max_concurrency: usize,
    pub timezone: Tz,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        let AssetSettings {
            assets,
            timezone,
            chart_base_url,
        } = AssetSettings::load(&env)?;

        let source = env.parsed_or("QUOTE_SOURCE", SourceKind::Json)?;
        let source_url = match source {
            SourceKind::Json => env.required("API_URL")?,
            SourceKind::Scrape => env.required("SCRAPE_URL")?,
        };

        let pushover = match (env.get("APP_ID"), env.get("GROUP_ID")) {
            (Some(app_token), Some(recipient)) => Some(PushoverCredentials {
                app_token,
                recipient,
            }),
            _ => None,
        };

        let timeout_ms = env.parsed_or::<u64>("HTTP_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_MS",
                value: String::from("0"),
                reason: String::from("must be greater than zero"),
            });
        }
        let max_concurrency = env.parsed_or::<usize>("MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENCY",
                value: String::from("0"),
                reason: String::from("must be greater than zero"),
            });
        }

        Ok(Self {
            assets,
            source,
            source_url,
            chart_base_url,
            pushover,
            http_timeout: Duration::from_millis(timeout_ms),
            max_concurrency,
            timezone,
            host: env.get("HOST").unwrap_or_else(|| String::from("0.0.0.0")),
            port: env.parsed_or::<u16>("PORT", 8080)?,
        })
    }

    /// Credentials for live delivery; dry runs never ask for them.
    pub fn pushover_credentials(&self) -> Result<&PushoverCredentials, ConfigError> {
        match &self.pushover {
            Some(credentials) => Ok(credentials),
            None => Err(ConfigError::Missing {
                name: "APP_ID/GROUP_ID",
            }),
        }
    }

    pub fn asset(&self, symbol: &Symbol) -> Option<&AssetConfig> {
        self.assets.iter().find(|asset| &asset.symbol == symbol)
    }

    pub fn http_timeout_ms(&self) -> u64 {
        u64::try_from(self.http_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// The asset part of the configuration alone: thresholds, cutoffs, zone and
/// chart link. Needs no source or delivery settings.
#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub assets: Vec<AssetConfig>,
    pub timezone: Tz,
    pub chart_base_url: Option<String>,
}

impl AssetSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(&Lookup(lookup))
    }

    pub fn asset(&self, symbol: &Symbol) -> Option<&AssetConfig> {
        self.assets.iter().find(|asset| &asset.symbol == symbol)
    }

    fn load<F>(env: &Lookup<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let symbols = match env.get("ASSETS").or_else(|| env.get("ASSET")) {
            Some(raw) => split_list(&raw),
            None => return Err(ConfigError::Missing { name: "ASSETS" }),
        };
        if symbols.is_empty() {
            return Err(ConfigError::Missing { name: "ASSETS" });
        }
        let count = symbols.len();

        let highs = env.aligned::<f64>("HIGH", count, false)?;
        let lows = env.aligned::<f64>("LOW", count, false)?;
        let targets = env.aligned::<f64>("TARGET", count, false)?;
        let large_moves = env.aligned::<f64>("LARGE_MOVE", count, true)?;
        let target_zones = env.aligned::<f64>("TARGET_ZONE", count, true)?;
        let cutoffs = env.cutoffs(count)?;

        let timezone = match env.get("CITY") {
            Some(raw) => parse_timezone(&raw).map_err(|error| ConfigError::Invalid {
                name: "CITY",
                value: raw.clone(),
                reason: error.to_string(),
            })?,
            None => Tz::UTC,
        };

        let mut assets = Vec::with_capacity(count);
        for (index, raw_symbol) in symbols.iter().enumerate() {
            let symbol = Symbol::parse(raw_symbol).map_err(|source| ConfigError::Asset {
                name: raw_symbol.clone(),
                source,
            })?;
            let asset = AssetConfig::new(
                symbol,
                highs[index],
                lows[index],
                targets[index],
                target_zones[index],
                large_moves[index],
                cutoffs[index],
                timezone,
            )
            .map_err(|source| ConfigError::Asset {
                name: raw_symbol.clone(),
                source,
            })?;
            assets.push(asset);
        }

        Ok(Self {
            assets,
            timezone,
            chart_base_url: env.get("WEB_URL"),
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value, trimmed.
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing { name })
    }

    fn parsed_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(name) {
            Some(raw) => parse_value(name, &raw),
            None => Ok(default),
        }
    }

    /// One value per asset; `broadcast` also accepts a single shared value.
    fn aligned<T>(&self, name: &'static str, count: usize, broadcast: bool) -> Result<Vec<T>, ConfigError>
    where
        T: FromStr + Clone,
        T::Err: Display,
    {
        let raw = self.required(name)?;
        let values = split_list(&raw)
            .iter()
            .map(|item| parse_value::<T>(name, item))
            .collect::<Result<Vec<_>, _>>()?;

        match values.len() {
            1 if broadcast => Ok(vec![values[0].clone(); count]),
            found if found == count => Ok(values),
            found => Err(ConfigError::LengthMismatch {
                name,
                expected: count,
                found,
            }),
        }
    }

    fn cutoffs(&self, count: usize) -> Result<Vec<Option<NaiveTime>>, ConfigError> {
        let Some(raw) = self.get("ENDHOUR") else {
            return Ok(vec![None; count]);
        };

        // `HH:MM` collides with the list separator: a lone `17:30` is one
        // cutoff for every asset, per-asset lists use `HHMM` (`1730:2200`).
        let items = if raw.len() == 5 && raw.find(LIST_SEPARATOR) == Some(2) {
            vec![raw.clone()]
        } else {
            split_list(&raw)
        };

        let cutoffs = items
            .iter()
            .map(|item| {
                parse_cutoff(item).map_err(|error| ConfigError::Invalid {
                    name: "ENDHOUR",
                    value: item.clone(),
                    reason: error.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match cutoffs.len() {
            1 => Ok(vec![cutoffs[0]; count]),
            found if found == count => Ok(cutoffs),
            found => Err(ConfigError::LengthMismatch {
                name: "ENDHOUR",
                expected: count,
                found,
            }),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|error| ConfigError::Invalid {
        name,
        value: raw.to_owned(),
        reason: error.to_string(),
    })
}
