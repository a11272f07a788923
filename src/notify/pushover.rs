//! Pushover notification client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::Notifier;
use crate::config::PushoverConfig;
use crate::{Error, Result};

/// Pushover API base URL
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net";

/// Pushover notifier
pub struct PushoverNotifier {
    client: Client,
    base_url: String,
    token: SecretString,
    user: SecretString,
}

impl PushoverNotifier {
    /// Create a new Pushover notifier
    #[must_use]
    pub fn new(client: Client, token: SecretString, user: SecretString) -> Self {
        Self {
            client,
            base_url: PUSHOVER_API_URL.to_string(),
            token,
            user,
        }
    }

    /// Build from configuration, or `None` when credentials are missing
    #[must_use]
    pub fn from_config(client: Client, config: &PushoverConfig) -> Option<Self> {
        let token = config.token.clone()?;
        let user = config.user.clone()?;
        Some(Self::new(client, token, user))
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let form = [
            ("token", self.token.expose_secret()),
            ("user", self.user.expose_secret()),
            ("message", message),
        ];

        let response = self
            .client
            .post(format!("{}/1/messages.json", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("Pushover request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notify(format!("Pushover error: {status} - {body}")));
        }

        tracing::debug!("push notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn notifier(base_url: &str) -> PushoverNotifier {
        PushoverNotifier::new(
            Client::new(),
            SecretString::from("app-token"),
            SecretString::from("user-key"),
        )
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn posts_token_user_and_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("token".into(), "app-token".into()),
                Matcher::UrlEncoded("user".into(), "user-key".into()),
                Matcher::UrlEncoded("message".into(), "+1555: hello".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":1}"#)
            .create_async()
            .await;

        notifier(&server.url()).notify("+1555: hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_notify_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/1/messages.json")
            .with_status(400)
            .with_body(r#"{"status":0,"errors":["user identifier is invalid"]}"#)
            .create_async()
            .await;

        let err = notifier(&server.url()).notify("hi").await.unwrap_err();
        assert!(matches!(err, Error::Notify(_)));
    }

    #[test]
    fn from_config_needs_both_keys() {
        let config = PushoverConfig {
            token: Some(SecretString::from("t")),
            user: None,
        };
        assert!(PushoverNotifier::from_config(Client::new(), &config).is_none());
    }
}
