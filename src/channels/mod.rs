//! Messaging channel adapters
//!
//! The SMS channel implements the `Channel` trait for outbound sends; inbound
//! messages arrive through the webhook in [`crate::api::webhooks`] and are
//! answered with a [`MessagingResponse`].

mod twilio;
mod twiml;

use async_trait::async_trait;

pub use twilio::{InboundSms, TwilioChannel, TWILIO_API_URL};
pub use twiml::MessagingResponse;

use crate::Result;

/// A message to send to a recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Recipient phone number
    pub to: String,

    /// Message body
    pub body: String,

    /// Optional media attachment URL
    pub media_url: Option<String>,
}

impl OutgoingMessage {
    /// Create a plain `text` message
    #[must_use]
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            media_url: None,
        }
    }

    /// Attach a media URL
    #[must_use]
    pub fn with_media(mut self, media_url: Option<String>) -> Self {
        self.media_url = media_url;
        self
    }
}

/// Trait for outbound messaging channels
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &'static str;

    /// Send a message
    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}
