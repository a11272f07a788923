//! Daybreak - SMS gateway for morning texts and conversational replies
//!
//! This library provides the core functionality for daybreak:
//! - An inbound SMS webhook answered by canned replies, image generation or
//!   a language model with a per-sender conversation window
//! - Outbound jobs that compose a forecast (plus optional greeting, holiday,
//!   fun fact, joke and meme) and text it to a recipient list
//! - One-off broadcasts and a daily in-process scheduler
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐    ┌──────────────────────────────┐
//! │  POST /api/webhooks/sms      │    │  Scheduler / `daybreak run`  │
//! └──────────────┬───────────────┘    └──────────────┬───────────────┘
//!                │                                   │
//! ┌──────────────▼───────────────┐    ┌──────────────▼───────────────┐
//! │ ReplyHandler                 │    │ JobRunner                    │
//! │ trigger │ image │ completion │    │ sources → compose → media    │
//! └──────────────┬───────────────┘    └──────────────┬───────────────┘
//!                │                                   │
//! ┌──────────────▼───────────────────────────────────▼───────────────┐
//! │      OpenAI   │   Twilio   │   Pushover   │   Weather & friends   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod broadcast;
pub mod channels;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod error;
pub mod jobs;
pub mod notify;
pub mod providers;
pub mod reply;
pub mod sources;

pub use broadcast::{BroadcastReport, broadcast};
pub use config::Config;
pub use conversation::{ConversationStore, Role, Turn};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use jobs::{JobConfig, JobReport, JobRunner};
pub use reply::{Reply, ReplyHandler};
