//! Error types for daybreak

use thiserror::Error;

/// Result type alias for daybreak operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in daybreak
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Job not found in configuration
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Upstream API answered with a non-success status
    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream response is missing a required field
    #[error("{service} response missing field: {field}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    /// HTML scraping error
    #[error("scrape error: {0}")]
    Scrape(String),

    /// SMS channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Push notification error
    #[error("notification error: {0}")]
    Notify(String),

    /// Text completion error
    #[error("completion error: {0}")]
    Completion(String),

    /// Image generation error
    #[error("image generation error: {0}")]
    Image(String),

    /// Media selection error
    #[error("media error: {0}")]
    Media(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Build an [`Error::Upstream`] from a failed response, consuming its body
    pub async fn upstream(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Upstream {
            service,
            status,
            body,
        }
    }
}
