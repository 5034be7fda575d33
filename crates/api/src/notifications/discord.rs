//! Discord webhook notifier.

use std::time::Duration;

use serde_json::json;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to send Discord notification: {0}")]
    Request(#[from] reqwest::Error),

    /// Discord answers a successful webhook post with 204.
    #[error("unexpected status code from Discord: {0}")]
    UnexpectedStatus(u16),
}

#[derive(Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Post `{"content": message}` to the webhook.
    pub async fn send(&self, webhook_url: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(webhook_url)
            .json(&json!({ "content": message }))
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::NO_CONTENT {
            return Err(NotifyError::UnexpectedStatus(status.as_u16()));
        }
        Ok(())
    }

    /// Send on a detached task. Failures are logged only.
    pub fn spawn_send(&self, webhook_url: String, message: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&webhook_url, &message).await {
                tracing::error!(error = %e, "Failed to send Discord notification");
            }
        });
    }
}
