//! Inbound reply handling
//!
//! Every inbound message is routed one of three ways:
//! - an exact (trimmed, case-insensitive) match of the trigger phrase gets the
//!   canned reply and never reaches a model
//! - a message starting with the image prefix is sent to image generation and
//!   answered with the image URL
//! - anything else joins the sender's conversation window and is answered by
//!   the completion provider
//!
//! The operator is notified of every inbound message, whatever the outcome.

use std::sync::Arc;

use crate::config::ReplyConfig;
use crate::conversation::{ConversationStore, Turn, build_request};
use crate::notify::{Notifier, notify_or_log};
use crate::providers::{CompletionProvider, ImageProvider};
use crate::Result;

/// How an inbound message will be answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// Nothing to answer
    Ignore,
    /// Trigger phrase matched
    Canned,
    /// Image command with its prompt (possibly empty)
    Image(&'a str),
    /// Conversational completion
    Completion(&'a str),
}

/// Decide how to answer a message
#[must_use]
pub fn route<'a>(config: &ReplyConfig, body: &'a str) -> Route<'a> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Route::Ignore;
    }

    if config
        .trigger
        .as_deref()
        .is_some_and(|t| trimmed.to_lowercase() == t.trim().to_lowercase())
    {
        return Route::Canned;
    }

    if let Some(prompt) = strip_command(trimmed, &config.image_prefix) {
        return Route::Image(prompt);
    }

    Route::Completion(trimmed)
}

/// Strip a command prefix, requiring a word boundary after it
fn strip_command<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &text[prefix.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// A reply to deliver over the inbound channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub body: String,
}

impl Reply {
    fn text(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// Answers inbound messages
pub struct ReplyHandler {
    config: ReplyConfig,
    conversations: Arc<ConversationStore>,
    completion: Arc<dyn CompletionProvider>,
    images: Arc<dyn ImageProvider>,
    notifier: Arc<dyn Notifier>,
}

impl ReplyHandler {
    /// Create a reply handler
    #[must_use]
    pub fn new(
        config: ReplyConfig,
        conversations: Arc<ConversationStore>,
        completion: Arc<dyn CompletionProvider>,
        images: Arc<dyn ImageProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            conversations,
            completion,
            images,
            notifier,
        }
    }

    /// Conversation store backing the completion route
    #[must_use]
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Handle one inbound message
    ///
    /// Returns `Ok(None)` for messages that need no reply. The operator
    /// notification runs alongside the reply and never affects it.
    ///
    /// # Errors
    ///
    /// Returns error if the completion or image provider fails
    pub async fn handle(&self, sender: &str, body: &str) -> Result<Option<Reply>> {
        let notification = format!("{sender}: {body}");
        let (reply, ()) = tokio::join!(
            self.respond(sender, body),
            notify_or_log(self.notifier.as_ref(), &notification)
        );
        reply
    }

    /// Notify the operator of a message that will not be answered
    pub async fn notify_only(&self, sender: &str, body: &str) {
        notify_or_log(self.notifier.as_ref(), &format!("{sender}: {body}")).await;
    }

    async fn respond(&self, sender: &str, body: &str) -> Result<Option<Reply>> {
        match route(&self.config, body) {
            Route::Ignore => {
                tracing::debug!(sender, "empty message, no reply");
                Ok(None)
            }
            Route::Canned => {
                tracing::info!(sender, "trigger phrase matched");
                Ok(Some(Reply::text(self.config.canned_reply.clone())))
            }
            Route::Image("") => Ok(Some(Reply::text(format!(
                "Usage: {} <description>",
                self.config.image_prefix
            )))),
            Route::Image(prompt) => {
                tracing::info!(sender, "generating image");
                let url = self.images.generate(prompt).await?;
                Ok(Some(Reply::text(url)))
            }
            Route::Completion(text) => {
                let window = self.conversations.push(sender, Turn::user(text)).await;
                let request = build_request(&self.config.system_prompt, &window);
                tracing::debug!(sender, turns = request.len(), "requesting completion");

                let answer = self.completion.complete(&request).await?;
                self.conversations
                    .push(sender, Turn::assistant(answer.clone()))
                    .await;
                Ok(Some(Reply::text(answer)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct RecordingCompletion {
        requests: Mutex<Vec<Vec<Turn>>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionProvider for RecordingCompletion {
        async fn complete(&self, turns: &[Turn]) -> Result<String> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(turns.to_vec());
            if self.fail {
                return Err(Error::Completion("model down".to_string()));
            }
            Ok(format!("answer {}", requests.len()))
        }
    }

    #[derive(Default)]
    struct FakeImages {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageProvider for FakeImages {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://img.example/{}.png", prompt.replace(' ', "-")))
        }
    }

    #[derive(Default)]
    struct FailingNotifier {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, message: &str) -> Result<()> {
            self.calls.lock().unwrap().push(message.to_string());
            Err(Error::Notify("Pushover error: 500".to_string()))
        }
    }

    struct Harness {
        handler: ReplyHandler,
        completion: Arc<RecordingCompletion>,
        images: Arc<FakeImages>,
        notifier: Arc<FailingNotifier>,
    }

    fn harness_with(completion: RecordingCompletion) -> Harness {
        let config = ReplyConfig {
            trigger: Some("go away".to_string()),
            ..ReplyConfig::default()
        };
        let completion = Arc::new(completion);
        let images = Arc::new(FakeImages::default());
        let notifier = Arc::new(FailingNotifier::default());
        let handler = ReplyHandler::new(
            config,
            Arc::new(ConversationStore::new(10, 100)),
            completion.clone(),
            images.clone(),
            notifier.clone(),
        );
        Harness {
            handler,
            completion,
            images,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingCompletion::default())
    }

    #[test]
    fn routes() {
        let config = ReplyConfig {
            trigger: Some("go away".to_string()),
            ..ReplyConfig::default()
        };
        assert_eq!(route(&config, "  GO Away \n"), Route::Canned);
        assert_eq!(route(&config, "go away now"), Route::Completion("go away now"));
        assert_eq!(route(&config, "/imagine a red fox"), Route::Image("a red fox"));
        assert_eq!(route(&config, "/IMAGINE   fox "), Route::Image("fox"));
        assert_eq!(route(&config, "/imagine"), Route::Image(""));
        assert_eq!(route(&config, "/imagined it"), Route::Completion("/imagined it"));
        assert_eq!(route(&config, "   "), Route::Ignore);
    }

    #[test]
    fn trigger_matches_regardless_of_configured_case() {
        let config = ReplyConfig {
            trigger: Some("Go Away".to_string()),
            ..ReplyConfig::default()
        };
        assert_eq!(route(&config, "go away"), Route::Canned);
        assert_eq!(route(&config, "GO AWAY"), Route::Canned);
    }

    #[test]
    fn no_trigger_configured() {
        let config = ReplyConfig::default();
        assert_eq!(route(&config, "rude"), Route::Completion("rude"));
    }

    #[tokio::test]
    async fn trigger_phrase_bypasses_completion() {
        let h = harness();
        let reply = h.handler.handle("+1555", " Go away ").await.unwrap().unwrap();

        assert_eq!(reply.body, "Rude");
        assert!(h.completion.requests.lock().unwrap().is_empty());
        assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_command_returns_url_without_completion() {
        let h = harness();
        let reply = h
            .handler
            .handle("+1555", "/imagine sunny beach")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.body, "https://img.example/sunny-beach.png");
        assert!(h.completion.requests.lock().unwrap().is_empty());
        assert!(h.handler.conversations().window("+1555").await.is_empty());
    }

    #[tokio::test]
    async fn empty_image_prompt_gets_usage() {
        let h = harness();
        let reply = h.handler.handle("+1555", "/imagine").await.unwrap().unwrap();
        assert!(reply.body.starts_with("Usage: /imagine"));
        assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn request_never_exceeds_window_plus_system() {
        let h = harness();
        for i in 0..30 {
            h.handler
                .handle("+1555", &format!("message {i}"))
                .await
                .unwrap();
        }

        let requests = h.completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 30);
        for request in requests.iter() {
            assert!(request.len() <= 11);
            assert_eq!(request[0], Turn::system(crate::config::DEFAULT_SYSTEM_PROMPT));
        }
        let last = requests.last().unwrap();
        assert_eq!(last.len(), 11);
        assert_eq!(last[10], Turn::user("message 29"));
        assert_eq!(last[9], Turn::assistant("answer 29"));
    }

    #[tokio::test]
    async fn completion_records_both_turns() {
        let h = harness();
        let reply = h.handler.handle("+1555", "hello").await.unwrap().unwrap();
        assert_eq!(reply.body, "answer 1");

        let window = h.handler.conversations().window("+1555").await;
        assert_eq!(window, vec![Turn::user("hello"), Turn::assistant("answer 1")]);
    }

    #[tokio::test]
    async fn notification_failure_does_not_block_reply() {
        let h = harness();
        let reply = h.handler.handle("+1555", "hello").await.unwrap();

        assert!(reply.is_some());
        assert_eq!(
            h.notifier.calls.lock().unwrap().as_slice(),
            ["+1555: hello".to_string()]
        );
    }

    #[tokio::test]
    async fn completion_failure_propagates() {
        let h = harness_with(RecordingCompletion {
            fail: true,
            ..RecordingCompletion::default()
        });
        let result = h.handler.handle("+1555", "hello").await;

        assert!(matches!(result, Err(Error::Completion(_))));
        // Notification still went out
        assert_eq!(h.notifier.calls.lock().unwrap().len(), 1);
    }
}
