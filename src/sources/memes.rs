//! Meme candidates scraped from Memedroid

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, USER_AGENT};
use scraper::{Html, Selector};
use url::Url;

use crate::{Error, Result};

/// Top memes of the day
pub const MEMEDROID_URL: &str = "https://www.memedroid.com/memes/top/day";

const IMAGE_SELECTOR: &str = "article.gallery-item img.img-responsive";

// Memedroid serves an interstitial to non-browser agents
const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Reports the size of a media URL in bytes
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Size of the resource (0 when the server does not say)
    async fn content_length(&self, url: &str) -> Result<u64>;
}

/// Supplies candidate meme image URLs
#[async_trait]
pub trait MemeSource: Send + Sync {
    /// Candidate image URLs in random order
    async fn candidates(&self) -> Result<Vec<String>>;
}

/// Memedroid scraper and HEAD-request size probe
#[derive(Clone)]
pub struct MemeClient {
    client: Client,
    url: String,
}

impl MemeClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: MEMEDROID_URL.to_string(),
        }
    }

    /// Override the page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl MemeSource for MemeClient {
    async fn candidates(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::upstream("memedroid", response).await);
        }

        let html = response.text().await?;
        let mut urls = extract_meme_urls(&html)?;
        urls.shuffle(&mut rand::thread_rng());
        tracing::debug!(candidates = urls.len(), "scraped meme candidates");
        Ok(urls)
    }
}

#[async_trait]
impl MediaProbe for MemeClient {
    async fn content_length(&self, url: &str) -> Result<u64> {
        let response = self
            .client
            .head(url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::upstream("memedroid", response).await);
        }

        // reqwest reports 0 for HEAD, so read the header directly
        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }
}

/// Extract image URLs from the gallery page, in page order
///
/// # Errors
///
/// Returns error if the selector cannot be parsed
pub fn extract_meme_urls(html: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(IMAGE_SELECTOR)
        .map_err(|e| Error::Scrape(format!("invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| Url::parse(src).is_ok_and(|u| matches!(u.scheme(), "http" | "https")))
        .map(ToString::to_string)
        .collect())
}
