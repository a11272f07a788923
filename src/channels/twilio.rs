//! Twilio SMS channel adapter
//!
//! Sends through the Programmable Messaging REST API. Inbound messages are
//! delivered by Twilio as form-encoded webhooks (see [`InboundSms`]).

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Channel, OutgoingMessage};
use crate::config::TwilioConfig;
use crate::{Error, Result};

/// Twilio REST API base URL
pub const TWILIO_API_URL: &str = "https://api.twilio.com";

/// Twilio SMS channel adapter
pub struct TwilioChannel {
    base_url: String,
    account_sid: SecretString,
    auth_token: SecretString,
    from_number: String,
    client: Client,
}

impl TwilioChannel {
    /// Create a new Twilio channel adapter
    ///
    /// # Arguments
    ///
    /// * `account_sid` - Twilio account SID
    /// * `auth_token` - Twilio auth token
    /// * `from_number` - Twilio phone number messages are sent from
    #[must_use]
    pub fn new(
        client: Client,
        account_sid: SecretString,
        auth_token: SecretString,
        from_number: String,
    ) -> Self {
        Self {
            base_url: TWILIO_API_URL.to_string(),
            account_sid,
            auth_token,
            from_number,
            client,
        }
    }

    /// Build the channel from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the SID, token or sender number is missing
    pub fn from_config(client: Client, config: &TwilioConfig) -> Result<Self> {
        let account_sid = config
            .account_sid
            .clone()
            .ok_or_else(|| Error::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = config
            .auth_token
            .clone()
            .ok_or_else(|| Error::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = config
            .from_number
            .clone()
            .ok_or_else(|| Error::Config("TWILIO_PHONE not set".to_string()))?;
        Ok(Self::new(client, account_sid, auth_token, from_number))
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send an SMS (or MMS when `media_url` is set)
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn send_sms(&self, to: &str, body: &str, media_url: Option<&str>) -> Result<()> {
        let sid = self.account_sid.expose_secret();
        let url = format!("{}/2010-04-01/Accounts/{sid}/Messages.json", self.base_url);

        let mut form = vec![
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];
        if let Some(media) = media_url {
            form.push(("MediaUrl", media));
        }

        let response = self
            .client
            .post(&url)
            .basic_auth(sid, Some(self.auth_token.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Twilio API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!("Twilio API error: {status} - {body}")));
        }

        tracing::debug!(to, media = media_url.is_some(), "SMS sent");
        Ok(())
    }
}

#[async_trait]
impl Channel for TwilioChannel {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.send_sms(&message.to, &message.body, message.media_url.as_deref())
            .await
    }
}

/// Inbound SMS webhook payload (form-encoded)
#[derive(Debug, Clone, Deserialize)]
pub struct InboundSms {
    /// Message text
    #[serde(rename = "Body", default)]
    pub body: String,

    /// Sender phone number
    #[serde(rename = "From", default)]
    pub from: String,

    /// Receiving phone number
    #[serde(rename = "To")]
    pub to: Option<String>,

    /// Message SID
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn channel(base_url: &str) -> TwilioChannel {
        TwilioChannel::new(
            Client::new(),
            SecretString::from("AC123"),
            SecretString::from("token"),
            "+15550000000".to_string(),
        )
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn sends_form_with_media() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("To".into(), "+15551112222".into()),
                Matcher::UrlEncoded("From".into(), "+15550000000".into()),
                Matcher::UrlEncoded("Body".into(), "hello there".into()),
                Matcher::UrlEncoded("MediaUrl".into(), "https://img.example/m.jpg".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM1"}"#)
            .create_async()
            .await;

        let message = OutgoingMessage::text("+15551112222", "hello there")
            .with_media(Some("https://img.example/m.jpg".to_string()));
        channel(&server.url()).send(message).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_channel_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(400)
            .with_body(r#"{"message":"invalid To"}"#)
            .create_async()
            .await;

        let err = channel(&server.url())
            .send_sms("bad", "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(msg) if msg.contains("invalid To")));
    }

    #[test]
    fn from_config_requires_credentials() {
        let config = TwilioConfig {
            account_sid: Some(SecretString::from("AC123")),
            auth_token: None,
            from_number: Some("+15550000000".to_string()),
        };
        assert!(matches!(
            TwilioChannel::from_config(Client::new(), &config),
            Err(Error::Config(_))
        ));
    }
}
