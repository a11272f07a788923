//! Configuration management for daybreak
//!
//! Secrets come from the environment only. Everything else is read from the
//! optional TOML file ([`file`]) and may be overridden by environment
//! variables.

pub mod file;

use std::collections::HashSet;
use std::time::Duration;

use secrecy::SecretString;

use crate::jobs::JobConfig;
use crate::{Error, Result};

use file::DaybreakConfigFile;

/// Default HTTP server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default chat completion model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default system turn for completion requests
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a funny helpful assistant.";

/// Default canned reply for the trigger phrase
pub const DEFAULT_CANNED_REPLY: &str = "Rude";

/// Default image generation command prefix
pub const DEFAULT_IMAGE_PREFIX: &str = "/imagine";

/// Default number of recent turns sent as completion context
pub const DEFAULT_WINDOW: usize = 10;

/// Default maximum number of tracked senders
pub const DEFAULT_MAX_CONVERSATIONS: usize = 1000;

/// daybreak configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// SMS provider credentials and sender number
    pub twilio: TwilioConfig,

    /// Completion and image generation configuration
    pub openai: OpenAiConfig,

    /// Push notification credentials
    pub pushover: PushoverConfig,

    /// API keys for job data sources
    pub sources: SourceKeys,

    /// Inbound reply behavior
    pub reply: ReplyConfig,

    /// Outbound composition jobs
    pub jobs: Vec<JobConfig>,

    /// Broadcast recipients
    pub broadcast: Vec<String>,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Global webhook rate limit (requests per minute); `None` disables it
    pub webhook_rpm: Option<u32>,
}

/// SMS provider configuration
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    /// Account SID (`TWILIO_ACCOUNT_SID`)
    pub account_sid: Option<SecretString>,

    /// Auth token (`TWILIO_AUTH_TOKEN`)
    pub auth_token: Option<SecretString>,

    /// Sender phone number (`TWILIO_PHONE`)
    pub from_number: Option<String>,
}

/// Completion and image generation configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key (`OPENAI_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Chat completion model
    pub model: String,

    /// Image generation size
    pub image_size: String,
}

/// Push notification configuration
#[derive(Debug, Clone, Default)]
pub struct PushoverConfig {
    /// Application token (`PUSHOVER_TOKEN`)
    pub token: Option<SecretString>,

    /// User key (`PUSHOVER_USER`)
    pub user: Option<SecretString>,
}

/// API keys for job data sources
#[derive(Debug, Clone, Default)]
pub struct SourceKeys {
    /// `OpenWeather` API key (`WEATHER_API_KEY`)
    pub weather: Option<SecretString>,

    /// API Ninjas key (`NINJA_API_KEY`)
    pub ninja: Option<SecretString>,
}

/// Inbound reply behavior
#[derive(Debug, Clone)]
pub struct ReplyConfig {
    /// Exact-match phrase (compared trimmed and lowercased)
    pub trigger: Option<String>,

    /// Reply sent when the trigger matches
    pub canned_reply: String,

    /// Command prefix routing to image generation
    pub image_prefix: String,

    /// Fixed system turn
    pub system_prompt: String,

    /// Recent turns sent per completion request
    pub window: usize,

    /// Maximum tracked senders before least-recently-used eviction
    pub max_conversations: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            trigger: None,
            canned_reply: DEFAULT_CANNED_REPLY.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            window: DEFAULT_WINDOW,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
        }
    }
}

impl Config {
    /// Load configuration from the config file and process environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file is invalid or a value fails validation
    pub fn load() -> Result<Self> {
        let file = file::load_config_file()?;
        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if an override cannot be parsed or a job is invalid
    pub fn from_parts(
        file: DaybreakConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let secret = |key: &str| env(key).filter(|v| !v.is_empty()).map(SecretString::from);

        let port = match env("DAYBREAK_PORT").or_else(|| env("PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let webhook_rpm = match env("DAYBREAK_WEBHOOK_RPM") {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| Error::Config(format!("invalid webhook rpm: {raw}")))?,
            ),
            None => file.server.webhook_rpm,
        };

        let twilio = TwilioConfig {
            account_sid: secret("TWILIO_ACCOUNT_SID"),
            auth_token: secret("TWILIO_AUTH_TOKEN"),
            from_number: env("TWILIO_PHONE").or(file.twilio.from_number),
        };

        let openai = OpenAiConfig {
            api_key: secret("OPENAI_API_KEY"),
            model: env("DAYBREAK_LLM_MODEL")
                .or(file.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            image_size: file
                .llm
                .image_size
                .unwrap_or_else(|| "1024x1024".to_string()),
        };

        let pushover = PushoverConfig {
            token: secret("PUSHOVER_TOKEN"),
            user: secret("PUSHOVER_USER"),
        };

        let sources = SourceKeys {
            weather: secret("WEATHER_API_KEY"),
            ninja: secret("NINJA_API_KEY"),
        };

        let defaults = ReplyConfig::default();
        let reply = ReplyConfig {
            trigger: env("CUSTOM_REPLY_TRIGGER")
                .or(file.reply.trigger)
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
            canned_reply: file.reply.canned_reply.unwrap_or(defaults.canned_reply),
            image_prefix: file.reply.image_prefix.unwrap_or(defaults.image_prefix),
            system_prompt: file.reply.system_prompt.unwrap_or(defaults.system_prompt),
            window: file.reply.window.unwrap_or(defaults.window),
            max_conversations: file
                .reply
                .max_conversations
                .unwrap_or(defaults.max_conversations),
        };

        if reply.window == 0 {
            return Err(Error::Config("reply window must be at least 1".to_string()));
        }
        if reply.max_conversations == 0 {
            return Err(Error::Config(
                "max_conversations must be at least 1".to_string(),
            ));
        }

        let broadcast = env("DAYBREAK_RECIPIENTS").map_or(file.broadcast.recipients, |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        });

        let mut names = HashSet::new();
        for job in &file.jobs {
            job.validate()?;
            if !names.insert(job.name.as_str()) {
                return Err(Error::Config(format!("duplicate job name '{}'", job.name)));
            }
        }

        let http_timeout = Duration::from_secs(file.server.http_timeout_secs.unwrap_or(30));

        Ok(Self {
            server: ServerConfig { port, webhook_rpm },
            twilio,
            openai,
            pushover,
            sources,
            reply,
            jobs: file.jobs,
            broadcast,
            http_timeout,
        })
    }

    /// Find a configured job by name
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobNotFound`] if no job has that name
    pub fn job(&self, name: &str) -> Result<&JobConfig> {
        self.jobs
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| Error::JobNotFound(name.to_string()))
    }

    /// Build the shared HTTP client used by every outbound integration
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("daybreak/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)
    }
}
