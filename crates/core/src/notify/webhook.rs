use crate::notify::{Notifier, NotifyError};
use anyhow::Context;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    topic: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Publishes by POSTing `{topic, subject, message}` as JSON.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build notification http client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    fn sink_name(&self) -> &'static str {
        "webhook"
    }

    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            topic,
            subject,
            message: body,
        };

        let res = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(NotifyError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        tracing::debug!(topic, %status, "notification delivered");
        Ok(())
    }
}
