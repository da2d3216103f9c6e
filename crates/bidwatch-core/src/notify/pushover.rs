use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::notify::{NotificationChannel, NotifyError};
use crate::AlertMessage;

/// Pushover message submission endpoint.
pub const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";

const CHANNEL_NAME: &str = "pushover";

/// Pushover delivery to one recipient (user or group key).
#[derive(Clone)]
pub struct PushoverChannel {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    app_token: String,
    recipient: String,
    timeout_ms: u64,
}

impl PushoverChannel {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        app_token: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: String::from(PUSHOVER_MESSAGES_URL),
            app_token: app_token.into(),
            recipient: recipient.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn build_request(&self, message: &AlertMessage) -> HttpRequest {
        let mut fields = vec![
            ("token", self.app_token.clone()),
            ("user", self.recipient.clone()),
            ("message", message.body.clone()),
            ("title", message.title.clone()),
            ("priority", message.priority.ordinal().to_string()),
            ("timestamp", message.timestamp.to_string()),
            ("sound", message.tone.as_str().to_owned()),
        ];
        if let Some(url) = &message.url {
            fields.push(("url", url.clone()));
        }
        if let Some(url_title) = &message.url_title {
            fields.push(("url_title", url_title.clone()));
        }
        if let Some(retry) = message.retry {
            fields.push(("retry", retry.as_secs().to_string()));
        }
        if let Some(expire) = message.expire {
            fields.push(("expire", expire.as_secs().to_string()));
        }

        HttpRequest::post_form(&self.endpoint, fields).with_timeout_ms(self.timeout_ms)
    }

    async fn deliver(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        let response = self
            .http_client
            .execute(self.build_request(message))
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    NotifyError::Timeout {
                        channel: CHANNEL_NAME,
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    NotifyError::Transport {
                        channel: CHANNEL_NAME,
                        message: error.message().to_owned(),
                    }
                }
            })?;

        let parsed = serde_json::from_str::<PushoverResponse>(&response.body).ok();
        let accepted = parsed.as_ref().map(|body| body.status == 1).unwrap_or(false);

        if response.is_success() && accepted {
            return Ok(());
        }

        let reason = parsed
            .map(|body| body.errors)
            .filter(|errors| !errors.is_empty())
            .map(|errors| errors.join("; "))
            .unwrap_or_else(|| String::from("unexpected response body"));

        Err(NotifyError::Rejected {
            channel: CHANNEL_NAME,
            status: response.status,
            reason,
        })
    }
}

impl NotificationChannel for PushoverChannel {
    fn name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}
