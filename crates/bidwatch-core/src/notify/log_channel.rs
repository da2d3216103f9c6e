use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::notify::{NotificationChannel, NotifyError};
use crate::AlertMessage;

/// Dry-run channel: records the message in the log instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                title = %message.title,
                body = %message.body,
                priority = message.priority.ordinal(),
                tone = %message.tone,
                "dry run: alert not delivered"
            );
            Ok(())
        })
    }
}
