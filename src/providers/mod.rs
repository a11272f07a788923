//! Language-model providers
//!
//! Text completion and image generation sit behind traits so the reply handler
//! can be driven by any backend. The only bundled backend is `OpenAI`.

mod openai;

use async_trait::async_trait;

pub use openai::{OPENAI_API_URL, OpenAiClient};

use crate::conversation::Turn;
use crate::Result;

/// Chat-style text completion
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete an ordered list of turns, returning the assistant text
    async fn complete(&self, turns: &[Turn]) -> Result<String>;
}

/// Prompt-to-image generation
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate an image and return its URL
    async fn generate(&self, prompt: &str) -> Result<String>;
}
