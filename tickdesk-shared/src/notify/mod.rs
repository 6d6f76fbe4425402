/// Out-of-band notification dispatch
///
/// Recovery codes leave the system through a [`NotificationDispatcher`].
/// Dispatch is awaited and returns an explicit result — there is no
/// fire-and-forget path, so flows can react to delivery failure instead of
/// assuming the message went out.
///
/// # Implementations
///
/// - [`email::HttpEmailDispatcher`]: transactional-mail HTTP API client
/// - [`MockDispatcher`]: records messages in memory, for tests
///
/// # Example
///
/// ```
/// use tickdesk_shared::notify::{MockDispatcher, NotificationDispatcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = MockDispatcher::new();
/// dispatcher.send("alice@example.org", "Hello", "body").await?;
/// assert_eq!(dispatcher.sent().len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod email;

use std::sync::{Arc, Mutex};

/// Error type for notification dispatch
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The provider rejected or failed to accept the message
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The dispatcher is misconfigured (bad endpoint URL, missing sender)
    #[error("Dispatcher configuration error: {0}")]
    Configuration(String),
}

/// Delivers a message to an address, awaited to completion
///
/// Implementations must be safe to share across request handlers; the
/// dispatcher is held in application state behind an `Arc`.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends `body` to `to` with the given subject line
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Delivery` if the message could not be handed
    /// off; callers treat this as a hard failure of the surrounding flow.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// A message captured by [`MockDispatcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory dispatcher for tests
///
/// Records every message and can be flipped into a failing mode to exercise
/// delivery-error paths.
#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the most recent message, if any
    pub fn last(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Makes subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for MockDispatcher {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Delivery("mock dispatcher set to fail".to_string()));
        }

        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_messages() {
        let dispatcher = MockDispatcher::new();

        dispatcher.send("a@b.c", "s1", "b1").await.unwrap();
        dispatcher.send("d@e.f", "s2", "b2").await.unwrap();

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@b.c");
        assert_eq!(dispatcher.last().unwrap().subject, "s2");
    }

    #[tokio::test]
    async fn test_mock_failing_mode() {
        let dispatcher = MockDispatcher::new();
        dispatcher.set_failing(true);

        let result = dispatcher.send("a@b.c", "s", "b").await;
        assert!(matches!(result, Err(NotifyError::Delivery(_))));
        assert!(dispatcher.sent().is_empty());

        dispatcher.set_failing(false);
        assert!(dispatcher.send("a@b.c", "s", "b").await.is_ok());
    }
}
