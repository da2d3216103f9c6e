//! Notification channels.
//!
//! A [`NotificationChannel`] delivers one [`AlertMessage`]. Delivery failures
//! are reported to the caller, logged by the alert cycle and never retried
//! here; re-delivery of emergency messages is the channel provider's job,
//! driven by the message's retry and expiry hints.

mod log_channel;
mod pushover;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::AlertMessage;

pub use log_channel::LogChannel;
pub use pushover::{PushoverChannel, PUSHOVER_MESSAGES_URL};

/// Delivery failure for a single message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("{channel} transport error: {message}")]
    Transport {
        channel: &'static str,
        message: String,
    },

    #[error("{channel} timed out after {timeout_ms}ms")]
    Timeout {
        channel: &'static str,
        timeout_ms: u64,
    },

    #[error("{channel} rejected message (status {status}): {reason}")]
    Rejected {
        channel: &'static str,
        status: u16,
        reason: String,
    },
}

/// Delivers composed alert messages.
pub trait NotificationChannel: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be handed to the
    /// provider or the provider refused it.
    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}
