//! One-off broadcast texts

use crate::channels::{Channel, OutgoingMessage};
use crate::{Error, Result};

/// Outcome of a broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Send `message` to every recipient, one at a time
///
/// Blank phone entries are skipped; per-recipient failures are logged and
/// counted.
///
/// # Errors
///
/// Returns error if the message is empty or no send succeeded
pub async fn broadcast(
    channel: &dyn Channel,
    recipients: &[String],
    message: &str,
) -> Result<BroadcastReport> {
    if message.trim().is_empty() {
        return Err(Error::Config("broadcast message is empty".to_string()));
    }

    let mut report = BroadcastReport::default();
    for phone in recipients {
        let phone = phone.trim();
        if phone.is_empty() {
            report.skipped += 1;
            continue;
        }

        match channel.send(OutgoingMessage::text(phone, message)).await {
            Ok(()) => {
                tracing::info!(to = %phone, channel = channel.name(), "broadcast sent");
                report.sent += 1;
            }
            Err(e) => {
                tracing::error!(to = %phone, error = %e, "broadcast send failed");
                report.failed += 1;
            }
        }
    }

    if report.sent == 0 {
        return Err(Error::Channel(format!(
            "broadcast reached no recipients ({} failed, {} skipped)",
            report.failed, report.skipped
        )));
    }
    Ok(report)
}
