//! `JokeAPI` client

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

/// `JokeAPI` base URL
pub const JOKE_API_URL: &str = "https://v2.jokeapi.dev";

/// Joke client
#[derive(Clone)]
pub struct JokeClient {
    client: Client,
    base_url: String,
}

impl JokeClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: JOKE_API_URL.to_string(),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch a random joke rendered as one line
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the joke has an unknown shape
    pub async fn random(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/joke/Any", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upstream("jokeapi", response).await);
        }

        let joke: Joke = response.json().await?;
        Ok(joke.render())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Joke {
    Single { joke: String },
    Twopart { setup: String, delivery: String },
}

impl Joke {
    fn render(self) -> String {
        match self {
            Self::Single { joke } => joke,
            Self::Twopart { setup, delivery } => format!("{setup} ... {delivery}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn renders_two_part_joke() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/joke/Any")
            .with_status(200)
            .with_body(
                r#"{"error":false,"category":"Pun","type":"twopart",
                    "setup":"Why did the scarecrow win an award?",
                    "delivery":"He was outstanding in his field.","id":1}"#,
            )
            .create_async()
            .await;

        let joke = JokeClient::new(Client::new())
            .with_base_url(server.url())
            .random()
            .await
            .unwrap();
        assert_eq!(
            joke,
            "Why did the scarecrow win an award? ... He was outstanding in his field."
        );
    }

    #[tokio::test]
    async fn renders_single_joke() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/joke/Any")
            .with_status(200)
            .with_body(r#"{"error":false,"type":"single","joke":"I'm reading a book on anti-gravity."}"#)
            .create_async()
            .await;

        let joke = JokeClient::new(Client::new())
            .with_base_url(server.url())
            .random()
            .await
            .unwrap();
        assert_eq!(joke, "I'm reading a book on anti-gravity.");
    }

    #[tokio::test]
    async fn unknown_shape_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/joke/Any")
            .with_status(200)
            .with_body(r#"{"error":true,"message":"No matching joke found"}"#)
            .create_async()
            .await;

        let result = JokeClient::new(Client::new())
            .with_base_url(server.url())
            .random()
            .await;
        assert!(result.is_err());
    }
}
