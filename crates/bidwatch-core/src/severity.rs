//! Mapping from a classification to the notification that announces it.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::{AssetConfig, Classification, Quote};

/// How often the channel re-delivers an unacknowledged emergency message.
pub const EMERGENCY_RETRY: Duration = Duration::from_secs(60);
/// How long the channel keeps re-delivering an emergency message.
pub const EMERGENCY_EXPIRE: Duration = Duration::from_secs(4 * 60);

/// Delivery urgency, serialized as its wire ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Normal,
    High,
    Emergency,
}

impl Priority {
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::High => 1,
            Self::Emergency => 2,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.ordinal())
    }
}

/// Notification sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Incoming,
    CashRegister,
    Vibrate,
}

impl Tone {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::CashRegister => "cashregister",
            Self::Vibrate => "vibrate",
        }
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message handed to a notification channel for one firing classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
    pub priority: Priority,
    pub url: Option<String>,
    pub url_title: Option<String>,
    /// Unix seconds of the quote that fired.
    pub timestamp: i64,
    pub tone: Tone,
    #[serde(serialize_with = "serialize_secs")]
    pub retry: Option<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    pub expire: Option<Duration>,
}

fn serialize_secs<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_some(&duration.as_secs()),
        None => serializer.serialize_none(),
    }
}

/// Builds alert messages; holds the chart page used for the message link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityMapper {
    chart_base_url: Option<String>,
}

impl SeverityMapper {
    pub fn new(chart_base_url: Option<String>) -> Self {
        Self {
            chart_base_url: chart_base_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Message for a classification, or `None` when nothing fired.
    pub fn map(
        &self,
        classification: Classification,
        asset: &AssetConfig,
        quote: &Quote,
    ) -> Option<AlertMessage> {
        let (title, priority) = match classification {
            Classification::TargetZone => ("Closing in on target price", Priority::Emergency),
            Classification::AboveHighBand => ("Above higher band", Priority::Normal),
            Classification::BelowLowBand => ("Below lower band", Priority::Normal),
            Classification::HighVolatilityRange => ("Big volatility today!", Priority::High),
            Classification::LargeDayMove => ("Big move today!", Priority::High),
            Classification::None => return None,
        };

        let symbol = asset.symbol.as_str();
        let body = match classification {
            Classification::HighVolatilityRange | Classification::LargeDayMove => format!(
                "{symbol} is now at {:.2}, {}",
                quote.bid, quote.day_change_pct
            ),
            _ => format!("{symbol} is now at {:.2}", quote.bid),
        };

        let (tone, retry, expire) = match priority {
            Priority::Emergency => (Tone::Incoming, Some(EMERGENCY_RETRY), Some(EMERGENCY_EXPIRE)),
            Priority::High => (Tone::CashRegister, None, None),
            Priority::Normal => (Tone::Vibrate, None, None),
        };

        let url = self
            .chart_base_url
            .as_ref()
            .map(|base| format!("{base}?a={}", urlencoding::encode(symbol)));
        let url_title = url.as_ref().map(|_| format!("Chart {symbol}"));

        Some(AlertMessage {
            title: title.to_owned(),
            body,
            priority,
            url,
            url_title,
            timestamp: quote.as_of.unix_seconds(),
            tone,
            retry,
            expire,
        })
    }
}
