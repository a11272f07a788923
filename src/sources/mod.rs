//! Data sources for outbound jobs
//!
//! The forecast gates every job. The rest are decorations: optional extras
//! whose failure only drops a line from the message.

mod facts;
pub mod greetings;
mod holiday;
mod jokes;
mod memes;
mod weather;

use std::sync::Arc;

use reqwest::Client;

pub use facts::{FactClient, NINJA_API_URL};
pub use holiday::{HOLIDAY_URL, HolidayClient, extract_holiday};
pub use jokes::{JOKE_API_URL, JokeClient};
pub use memes::{MEMEDROID_URL, MediaProbe, MemeClient, MemeSource, extract_meme_urls};
pub use weather::{Forecast, OPENWEATHER_API_URL, WeatherClient};

use crate::config::SourceKeys;

/// Every client a job may draw from
#[derive(Clone)]
pub struct Sources {
    /// Forecast client, absent without `WEATHER_API_KEY`
    pub weather: Option<WeatherClient>,
    pub jokes: JokeClient,
    /// Fun facts, absent without `NINJA_API_KEY`
    pub facts: Option<FactClient>,
    pub holiday: HolidayClient,
    pub memes: Arc<dyn MemeSource>,
    pub probe: Arc<dyn MediaProbe>,
}

impl Sources {
    /// Build all clients over one shared HTTP client
    #[must_use]
    pub fn from_config(client: &Client, keys: &SourceKeys) -> Self {
        let memes = Arc::new(MemeClient::new(client.clone()));
        Self {
            weather: keys
                .weather
                .clone()
                .map(|key| WeatherClient::new(client.clone(), key)),
            jokes: JokeClient::new(client.clone()),
            facts: keys
                .ninja
                .clone()
                .map(|key| FactClient::new(client.clone(), key)),
            holiday: HolidayClient::new(client.clone()),
            memes: memes.clone(),
            probe: memes,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn keyed_clients_follow_keys() {
        let client = Client::new();
        let sources = Sources::from_config(&client, &SourceKeys::default());
        assert!(sources.weather.is_none());
        assert!(sources.facts.is_none());

        let keys = SourceKeys {
            weather: Some(SecretString::from("wx")),
            ninja: Some(SecretString::from("ninja")),
        };
        let sources = Sources::from_config(&client, &keys);
        assert!(sources.weather.is_some());
        assert!(sources.facts.is_some());
    }
}
