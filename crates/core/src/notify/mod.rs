pub mod webhook;

pub use webhook::WebhookNotifier;

pub const ALERT_SUBJECT: &str = "Crypto Price Alert";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("notification endpoint returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("notification sink error: {0}")]
    Other(#[source] anyhow::Error),
}

/// Fire-and-forget delivery. Callers log failures; nothing retries.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn sink_name(&self) -> &'static str;

    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn sink_name(&self) -> &'static str {
        "log"
    }

    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(topic, subject, body, "notification");
        Ok(())
    }
}
