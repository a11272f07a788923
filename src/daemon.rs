//! Service wiring
//!
//! Turns a [`Config`] into the live pieces: the reply handler behind the
//! webhook, the job runner, and the scheduler. `daybreak serve` runs both
//! halves until interrupted.

use std::sync::Arc;

use reqwest::Client;

use crate::api::{ApiServer, ApiState};
use crate::channels::{Channel, TwilioChannel};
use crate::conversation::ConversationStore;
use crate::jobs::{JobRunner, Scheduler};
use crate::notify::{NoopNotifier, Notifier, PushoverNotifier};
use crate::providers::OpenAiClient;
use crate::reply::ReplyHandler;
use crate::sources::Sources;
use crate::{Config, Result};

/// Build the SMS channel
///
/// # Errors
///
/// Returns error if Twilio credentials or the sender number are missing
pub fn sms_channel(config: &Config, client: &Client) -> Result<Arc<dyn Channel>> {
    Ok(Arc::new(TwilioChannel::from_config(
        client.clone(),
        &config.twilio,
    )?))
}

/// Build the operator notifier, falling back to a no-op without credentials
#[must_use]
pub fn notifier(config: &Config, client: &Client) -> Arc<dyn Notifier> {
    match PushoverNotifier::from_config(client.clone(), &config.pushover) {
        Some(pushover) => Arc::new(pushover),
        None => {
            tracing::info!("PUSHOVER_TOKEN/PUSHOVER_USER not set, notifications disabled");
            Arc::new(NoopNotifier)
        }
    }
}

/// Build the inbound reply handler
///
/// # Errors
///
/// Returns error if `OPENAI_API_KEY` is not set
pub fn reply_handler(config: &Config, client: &Client) -> Result<ReplyHandler> {
    let openai = Arc::new(OpenAiClient::from_config(client.clone(), &config.openai)?);
    let conversations = Arc::new(ConversationStore::new(
        config.reply.window,
        config.reply.max_conversations,
    ));
    Ok(ReplyHandler::new(
        config.reply.clone(),
        conversations,
        openai.clone(),
        openai,
        notifier(config, client),
    ))
}

/// Build the job runner
///
/// # Errors
///
/// Returns error if the SMS channel cannot be configured
pub fn job_runner(config: &Config, client: &Client) -> Result<JobRunner> {
    Ok(JobRunner::new(
        Sources::from_config(client, &config.sources),
        sms_channel(config, client)?,
        notifier(config, client),
    ))
}

/// Long-running service: webhook server plus job scheduler
pub struct Daemon {
    config: Config,
}

impl Daemon {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until the server stops or Ctrl-C is received
    ///
    /// # Errors
    ///
    /// Returns error if a component cannot be configured or the server fails
    pub async fn run(self) -> Result<()> {
        let client = self.config.http_client()?;

        let replies = Arc::new(reply_handler(&self.config, &client)?);
        let state = ApiState::new(replies).with_rate_limit(self.config.server.webhook_rpm);
        let server = ApiServer::new(state, self.config.server.port).spawn();

        let scheduled = self.config.jobs.iter().any(|j| j.at.is_some());
        let scheduler_tasks = if scheduled {
            let runner = Arc::new(job_runner(&self.config, &client)?);
            let scheduler = Scheduler::new(runner, &self.config.jobs)?;
            tracing::info!(jobs = scheduler.len(), "scheduler started");
            scheduler.spawn()
        } else {
            tracing::info!("no scheduled jobs");
            Vec::new()
        };

        let result = tokio::select! {
            joined = server => match joined {
                Ok(result) => result,
                Err(e) => Err(crate::Error::Config(format!("API server task failed: {e}"))),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                Ok(())
            }
        };

        for task in scheduler_tasks {
            task.abort();
        }
        result
    }
}
