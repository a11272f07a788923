//! TOML configuration file loading
//!
//! Supports `~/.config/daybreak/config.toml` (or `$DAYBREAK_CONFIG`) as a
//! persistent config source. All fields are optional; the file is a partial
//! overlay on top of defaults. Secrets never live here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::jobs::JobConfig;
use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DaybreakConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Inbound reply configuration
    #[serde(default)]
    pub reply: ReplyFileConfig,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// SMS provider configuration
    #[serde(default)]
    pub twilio: TwilioFileConfig,

    /// Broadcast recipients
    #[serde(default)]
    pub broadcast: BroadcastFileConfig,

    /// Outbound composition jobs
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// HTTP server port
    pub port: Option<u16>,

    /// Global webhook rate limit in requests per minute
    pub webhook_rpm: Option<u32>,

    /// Timeout for outbound HTTP requests in seconds
    pub http_timeout_secs: Option<u64>,
}

/// Inbound reply configuration
#[derive(Debug, Default, Deserialize)]
pub struct ReplyFileConfig {
    /// Exact-match phrase that short-circuits to the canned reply
    pub trigger: Option<String>,
    /// Reply sent when the trigger phrase matches
    pub canned_reply: Option<String>,
    /// Command prefix that routes to image generation
    pub image_prefix: Option<String>,
    /// System turn prepended to every completion request
    pub system_prompt: Option<String>,
    /// Number of recent turns sent as context
    pub window: Option<usize>,
    /// Maximum number of senders tracked at once
    pub max_conversations: Option<usize>,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Chat completion model (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// Image generation size (e.g. "1024x1024")
    pub image_size: Option<String>,
}

/// SMS provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct TwilioFileConfig {
    /// Sender phone number
    pub from_number: Option<String>,
}

/// Broadcast configuration
#[derive(Debug, Default, Deserialize)]
pub struct BroadcastFileConfig {
    /// Phone numbers that receive `daybreak broadcast` messages
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Load the TOML config file from the standard path
///
/// A missing file yields `DaybreakConfigFile::default()`.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed
pub fn load_config_file() -> Result<DaybreakConfigFile> {
    let Some(path) = config_file_path() else {
        return Ok(DaybreakConfigFile::default());
    };
    load_config_file_from(&path)
}

/// Load a TOML config file from an explicit path
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed
pub fn load_config_file_from(path: &Path) -> Result<DaybreakConfigFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(DaybreakConfigFile::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: DaybreakConfigFile = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        jobs = config.jobs.len(),
        "loaded config file"
    );
    Ok(config)
}

/// Return the config file path: `$DAYBREAK_CONFIG` or `~/.config/daybreak/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DAYBREAK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    directories::BaseDirs::new().map(|d| d.config_dir().join("daybreak").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::jobs::Template;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.jobs.is_empty());
        assert!(config.server.port.is_none());
    }

    #[test]
    fn parses_jobs_and_overlays() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 9000

[reply]
trigger = "stop"

[broadcast]
recipients = ["+15550001111"]

[[jobs]]
name = "morning"
template = "daily"
at = "07:30"
notify = true

[jobs.location]
lat = 40.7
lon = -74.0

[[jobs.recipients]]
phone = "+15550002222"
name = "Sam"

[jobs.decorations]
joke = true
meme = true
"#
        )
        .unwrap();

        let config = load_config_file_from(file.path()).unwrap();
        assert_eq!(config.server.port, Some(9000));
        assert_eq!(config.reply.trigger.as_deref(), Some("stop"));
        assert_eq!(config.broadcast.recipients, vec!["+15550001111"]);

        let job = &config.jobs[0];
        assert_eq!(job.name, "morning");
        assert_eq!(job.template, Template::Daily);
        assert!(job.notify);
        assert_eq!(job.recipients[0].name.as_deref(), Some("Sam"));
        assert!(job.decorations.joke);
        assert!(job.decorations.meme);
        assert!(!job.decorations.holiday);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[jobs]]\nname = 3").unwrap();
        assert!(load_config_file_from(file.path()).is_err());
    }
}
