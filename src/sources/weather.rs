//! `OpenWeather` One Call forecast client

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{Error, Result};

/// `OpenWeather` API base URL
pub const OPENWEATHER_API_URL: &str = "https://api.openweathermap.org";

/// Today's forecast for one location (imperial units, rounded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    /// Day temperature (°F)
    pub day: i64,
    /// Minimum temperature (°F)
    pub min: i64,
    /// Maximum temperature (°F)
    pub max: i64,
    /// UV index, when reported
    pub uv_index: Option<i64>,
    /// Human-readable summary
    pub summary: String,
}

/// Forecast client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherClient {
    /// Create a new forecast client
    #[must_use]
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: OPENWEATHER_API_URL.to_string(),
            api_key,
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch today's forecast for a coordinate
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or any of
    /// temperature/min/max/summary is absent
    pub async fn today(&self, lat: f64, lon: f64) -> Result<Forecast> {
        let response = self
            .client
            .get(format!("{}/data/3.0/onecall", self.base_url))
            .query(&[
                ("lat", lat.to_string().as_str()),
                ("lon", lon.to_string().as_str()),
                ("exclude", "current,minutely,hourly"),
                ("appid", self.api_key.expose_secret()),
                ("units", "imperial"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upstream("openweather", response).await);
        }

        let body: OneCallResponse = response.json().await?;
        let today = body.daily.into_iter().next().ok_or(Error::MissingField {
            service: "openweather",
            field: "daily[0]",
        })?;

        let forecast = Forecast::try_from(today)?;
        tracing::debug!(lat, lon, ?forecast, "fetched forecast");
        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    daily: Vec<DailyForecast>,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    temp: Option<DailyTemperature>,
    uvi: Option<f64>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyTemperature {
    day: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

const fn missing(field: &'static str) -> Error {
    Error::MissingField {
        service: "openweather",
        field,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round(value: f64) -> i64 {
    value.round() as i64
}

impl TryFrom<DailyForecast> for Forecast {
    type Error = Error;

    fn try_from(daily: DailyForecast) -> Result<Self> {
        let temp = daily.temp.ok_or_else(|| missing("temp"))?;
        let day = temp.day.ok_or_else(|| missing("temp.day"))?;
        let min = temp.min.ok_or_else(|| missing("temp.min"))?;
        let max = temp.max.ok_or_else(|| missing("temp.max"))?;
        let summary = daily
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| missing("summary"))?;

        Ok(Self {
            day: round(day),
            min: round(min),
            max: round(max),
            uv_index: daily.uvi.map(round),
            summary: summary.trim().trim_end_matches('.').to_string(),
        })
    }
}
