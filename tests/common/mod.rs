//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use daybreak::channels::{Channel, OutgoingMessage};
use daybreak::config::ReplyConfig;
use daybreak::notify::Notifier;
use daybreak::providers::{CompletionProvider, ImageProvider};
use daybreak::{ConversationStore, Error, ReplyHandler, Result, Turn};
use tokio::sync::Mutex;

/// Mock SMS channel recording every send
#[derive(Default)]
pub struct MockChannel {
    sent_messages: Mutex<Vec<OutgoingMessage>>,
}

impl MockChannel {
    pub async fn get_sent_messages(&self) -> Vec<OutgoingMessage> {
        self.sent_messages.lock().await.clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.sent_messages.lock().await.push(message);
        Ok(())
    }
}

/// Completion provider that echoes the last user turn and records requests
#[derive(Default)]
pub struct MockCompletion {
    pub requests: Mutex<Vec<Vec<Turn>>>,
    pub fail: bool,
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        self.requests.lock().await.push(turns.to_vec());
        if self.fail {
            return Err(Error::Completion("upstream unavailable".to_string()));
        }
        let last = turns.last().map(|t| t.content.as_str()).unwrap_or_default();
        Ok(format!("echo: {last}"))
    }
}

/// Image provider returning a fixed URL
#[derive(Default)]
pub struct MockImages {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageProvider for MockImages {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok("https://images.example/generated.png".to_string())
    }
}

/// Notifier recording messages, optionally failing each one
#[derive(Default)]
pub struct MockNotifier {
    pub messages: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.messages.lock().await.push(message.to_string());
        if self.fail {
            return Err(Error::Notify("Pushover error: 500".to_string()));
        }
        Ok(())
    }
}

/// Mocks wired into a reply handler
pub struct ReplyMocks {
    pub completion: Arc<MockCompletion>,
    pub images: Arc<MockImages>,
    pub notifier: Arc<MockNotifier>,
}

/// Build a reply handler over mocks, with "go away" as the trigger phrase
pub fn reply_handler(completion: MockCompletion, notifier: MockNotifier) -> (ReplyHandler, ReplyMocks) {
    let config = ReplyConfig {
        trigger: Some("go away".to_string()),
        ..ReplyConfig::default()
    };
    let mocks = ReplyMocks {
        completion: Arc::new(completion),
        images: Arc::new(MockImages::default()),
        notifier: Arc::new(notifier),
    };
    let handler = ReplyHandler::new(
        config,
        Arc::new(ConversationStore::new(10, 100)),
        mocks.completion.clone(),
        mocks.images.clone(),
        mocks.notifier.clone(),
    );
    (handler, mocks)
}
