//! Push notifications for the operator
//!
//! Notifications are best-effort: callers log failures and carry on.

mod pushover;

use async_trait::async_trait;

pub use pushover::{PUSHOVER_API_URL, PushoverNotifier};

use crate::Result;

/// Push-notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification message
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Notifier used when no push service is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Send a notification, logging instead of propagating failure
pub async fn notify_or_log(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.notify(message).await {
        tracing::warn!(error = %e, "failed to send push notification");
    }
}
