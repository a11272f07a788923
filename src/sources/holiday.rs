//! Holiday-of-the-day scraper

use reqwest::Client;
use scraper::{Html, Selector};

use crate::{Error, Result};

/// Holiday calendar page
pub const HOLIDAY_URL: &str = "https://www.holidaycalendar.io/what-holiday-is-today";

const TITLE_SELECTOR: &str = "h3.card-link-title---hover-secondary-1";

/// Scrapes today's holiday title
#[derive(Clone)]
pub struct HolidayClient {
    client: Client,
    url: String,
}

impl HolidayClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: HOLIDAY_URL.to_string(),
        }
    }

    /// Override the page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetch today's holiday
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be fetched or has no holiday title
    pub async fn today(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(Error::upstream("holidaycalendar", response).await);
        }

        let html = response.text().await?;
        extract_holiday(&html)?
            .ok_or_else(|| Error::Scrape("holiday title not found on page".to_string()))
    }
}

/// Extract the first holiday title from the page HTML
///
/// # Errors
///
/// Returns error if the selector cannot be parsed
pub fn extract_holiday(html: &str) -> Result<Option<String>> {
    let selector = Selector::parse(TITLE_SELECTOR)
        .map_err(|e| Error::Scrape(format!("invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|title| !title.is_empty()))
}
