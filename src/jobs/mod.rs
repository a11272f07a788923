//! Outbound composition jobs
//!
//! A job is data: a location, a recipient list, a template and a set of
//! decorations. [`JobRunner`] executes any job through the same pipeline:
//! fetch the forecast and decorations, compose a body per recipient, pick
//! a meme that keeps the message under the size limit, then send.

pub mod compose;
pub mod media;
pub mod scheduler;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

pub use compose::{Extras, compose};
pub use media::{DEFAULT_MEDIA_ATTEMPTS, MAX_COMBINED_BYTES, select_media};
pub use scheduler::{Scheduler, next_occurrence, parse_at};

use crate::channels::{Channel, OutgoingMessage};
use crate::notify::{Notifier, notify_or_log};
use crate::sources::{Sources, greetings};
use crate::{Error, Result};

/// Message template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// One-paragraph forecast with UV index
    #[default]
    Forecast,
    /// Dated multi-line "daily scoop"
    Daily,
}

impl Template {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::Daily => "daily",
        }
    }
}

/// Forecast coordinates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// A message recipient
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Recipient {
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Recipient {
    /// Name for greetings and sign-offs
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("friend")
    }
}

/// Optional message extras
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Decorations {
    pub greeting: bool,
    pub holiday: bool,
    pub fun_fact: bool,
    pub joke: bool,
    pub meme: bool,
}

/// One configured job (`[[jobs]]` in the config file)
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Unique job name
    pub name: String,

    #[serde(default)]
    pub template: Template,

    /// Daily local run time (`HH:MM`); unscheduled when absent
    #[serde(default)]
    pub at: Option<String>,

    /// Push a copy of each sent message to the operator
    #[serde(default)]
    pub notify: bool,

    pub location: Option<Location>,

    #[serde(default)]
    pub recipients: Vec<Recipient>,

    #[serde(default)]
    pub decorations: Decorations,

    /// Meme candidates probed before sending without media
    #[serde(default = "default_media_attempts")]
    pub max_media_attempts: usize,

    /// Skip the send instead of dropping the meme when none fits
    #[serde(default)]
    pub media_required: bool,
}

const fn default_media_attempts() -> usize {
    DEFAULT_MEDIA_ATTEMPTS
}

impl JobConfig {
    /// Check the job is runnable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first problem found
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::Config(format!("job '{}': {reason}", self.name));

        if self.name.trim().is_empty() {
            return Err(Error::Config("job name must not be empty".to_string()));
        }

        let Some(location) = self.location else {
            return Err(invalid("missing location"));
        };
        if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lon) {
            return Err(invalid("location out of range"));
        }

        if self.recipients.is_empty() {
            return Err(invalid("no recipients"));
        }
        if self.recipients.iter().any(|r| r.phone.trim().is_empty()) {
            return Err(invalid("recipient with empty phone number"));
        }

        if let Some(at) = &self.at {
            parse_at(at).map_err(|_| invalid(&format!("invalid time '{at}', expected HH:MM")))?;
        }

        if self.decorations.meme && self.max_media_attempts == 0 {
            return Err(invalid("max_media_attempts must be at least 1"));
        }

        Ok(())
    }
}

/// Outcome of one job run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    pub sent: usize,
    pub failed: usize,
}

/// Executes jobs over a channel, a notifier and the data sources
pub struct JobRunner {
    sources: Sources,
    channel: Arc<dyn Channel>,
    notifier: Arc<dyn Notifier>,
}

impl JobRunner {
    #[must_use]
    pub fn new(sources: Sources, channel: Arc<dyn Channel>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            sources,
            channel,
            notifier,
        }
    }

    /// Run a job for today's local date
    ///
    /// # Errors
    ///
    /// See [`JobRunner::run_on`]
    pub async fn run(&self, job: &JobConfig) -> Result<JobReport> {
        self.run_on(job, chrono::Local::now().date_naive()).await
    }

    /// Run a job, dating the message `date`
    ///
    /// # Errors
    ///
    /// Returns error if the forecast cannot be fetched (nothing is sent), or
    /// if no recipient could be reached
    pub async fn run_on(&self, job: &JobConfig, date: NaiveDate) -> Result<JobReport> {
        let location = job
            .location
            .ok_or_else(|| Error::Config(format!("job '{}': missing location", job.name)))?;
        let weather = self
            .sources
            .weather
            .as_ref()
            .ok_or_else(|| Error::Config("WEATHER_API_KEY not set".to_string()))?;

        let (forecast, extras, candidates) = tokio::join!(
            weather.today(location.lat, location.lon),
            self.fetch_extras(job.decorations),
            self.fetch_meme_candidates(job.decorations.meme),
        );
        let forecast = forecast?;

        let mut report = JobReport::default();
        let mut last_error = None;

        for recipient in &job.recipients {
            let name = recipient.display_name();
            let greeting = job
                .decorations
                .greeting
                .then(|| greetings::random_greeting(name));
            let body = compose(job.template, date, name, greeting.as_deref(), &forecast, &extras);

            match self.deliver(job, recipient, body, &candidates).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::error!(job = %job.name, to = %recipient.phone, error = %e, "send failed");
                    report.failed += 1;
                    last_error = Some(e);
                }
            }
        }

        tracing::info!(job = %job.name, sent = report.sent, failed = report.failed, "job finished");

        match last_error {
            Some(e) if report.sent == 0 => Err(e),
            _ => Ok(report),
        }
    }

    async fn deliver(
        &self,
        job: &JobConfig,
        recipient: &Recipient,
        body: String,
        candidates: &[String],
    ) -> Result<()> {
        let media_url = if job.decorations.meme {
            let picked = select_media(
                candidates,
                self.sources.probe.as_ref(),
                &body,
                job.max_media_attempts,
            )
            .await;
            if picked.is_none() {
                if job.media_required {
                    return Err(Error::Media(
                        "no meme fits within the size limit".to_string(),
                    ));
                }
                tracing::warn!(job = %job.name, "no meme fits, sending without media");
            }
            picked
        } else {
            None
        };

        tracing::debug!(job = %job.name, to = %recipient.phone, body = %body, "sending");
        let message = OutgoingMessage::text(&recipient.phone, body.clone()).with_media(media_url);
        self.channel.send(message).await?;

        if job.notify {
            let notification = format!("Daily update for {}: {body}", recipient.display_name());
            notify_or_log(self.notifier.as_ref(), &notification).await;
        }
        Ok(())
    }

    async fn fetch_extras(&self, decorations: Decorations) -> Extras {
        let holiday = async {
            if decorations.holiday {
                decoration("holiday", self.sources.holiday.today().await)
            } else {
                None
            }
        };
        let fact = async {
            match (&self.sources.facts, decorations.fun_fact) {
                (Some(facts), true) => decoration("fun_fact", facts.random().await),
                (None, true) => {
                    tracing::warn!("fun fact requested but NINJA_API_KEY not set");
                    None
                }
                _ => None,
            }
        };
        let joke = async {
            if decorations.joke {
                decoration("joke", self.sources.jokes.random().await)
            } else {
                None
            }
        };

        let (holiday, fact, joke) = tokio::join!(holiday, fact, joke);
        Extras {
            holiday,
            fact,
            joke,
        }
    }

    async fn fetch_meme_candidates(&self, wanted: bool) -> Vec<String> {
        if !wanted {
            return Vec::new();
        }
        decoration("meme", self.sources.memes.candidates().await).unwrap_or_default()
    }
}

/// Downgrade a decoration failure to absence
fn decoration<T>(name: &'static str, result: Result<T>) -> Option<T> {
    result
        .inspect_err(|e| tracing::warn!(decoration = name, error = %e, "decoration unavailable"))
        .ok()
}
