//! API Ninjas fun-fact client

use rand::seq::SliceRandom;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{Error, Result};

/// API Ninjas base URL
pub const NINJA_API_URL: &str = "https://api.api-ninjas.com";

/// Fun-fact client
#[derive(Clone)]
pub struct FactClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct Fact {
    fact: String,
}

impl FactClient {
    #[must_use]
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: NINJA_API_URL.to_string(),
            api_key,
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one fun fact
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no fact is returned
    pub async fn random(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/v1/facts", self.base_url))
            .query(&[("limit", "1")])
            .header("X-Api-Key", self.api_key.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upstream("api-ninjas", response).await);
        }

        let facts: Vec<Fact> = response.json().await?;
        facts
            .choose(&mut rand::thread_rng())
            .map(|f| f.fact.trim().trim_end_matches('.').to_string())
            .ok_or(Error::MissingField {
                service: "api-ninjas",
                field: "[0].fact",
            })
    }
}
