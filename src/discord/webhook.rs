use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::discord::{Embed, EmbedFooter, AVATAR_URL, BOT_NAME, COLOR_GREEN};
use crate::error::{AppError, AppResult};
use crate::logger::{Severity, Sink};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    avatar_url: &'a str,
    embeds: [&'a Embed; 1],
}

/// Posts alerts (errors and security events) to a Discord webhook
pub struct WebhookSink {
    client: Client,
    webhook_url: String,
}

impl WebhookSink {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    /// Send a test message to verify webhook configuration
    pub async fn send_test_message(&self) -> AppResult<()> {
        let mut embed = Embed::new("✅ Webhook Test", COLOR_GREEN);
        embed.description = Some("Your Discord webhook is configured correctly!".to_string());
        embed.timestamp = Some(chrono::Utc::now().to_rfc3339());
        embed.footer = Some(EmbedFooter {
            text: BOT_NAME.to_string(),
        });
        self.post(&embed).await
    }

    async fn post(&self, embed: &Embed) -> AppResult<()> {
        let payload = WebhookPayload {
            username: BOT_NAME,
            avatar_url: AVATAR_URL,
            embeds: [embed],
        };

        let response = self.client.post(&self.webhook_url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Discord(format!(
                "Webhook failed with status {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Sink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn accepts(&self, severity: Severity) -> bool {
        severity.is_alert()
    }

    async fn deliver(&self, embed: &Embed) -> AppResult<()> {
        self.post(embed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_alerts_accepted() {
        let sink = WebhookSink::new(Client::new(), "https://discord.com/api/webhooks/1/t");
        assert!(sink.accepts(Severity::Error));
        assert!(sink.accepts(Severity::Security));
        assert!(!sink.accepts(Severity::Info));
        assert!(!sink.accepts(Severity::Warning));
        assert!(!sink.accepts(Severity::Success));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        // Nothing listens on the discard port
        let sink = WebhookSink::new(Client::new(), "http://127.0.0.1:9/api/webhooks/1/t");
        let embed = Embed::new("❌ Error", 0xef4444);

        let err = sink.deliver(&embed).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
        assert_eq!(err.kind(), "Network");
        assert!(err.is_transient());
    }

    #[test]
    fn test_payload_shape() {
        let embed = Embed::new("❌ Error", 0xef4444);
        let payload = WebhookPayload {
            username: BOT_NAME,
            avatar_url: AVATAR_URL,
            embeds: [&embed],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["username"], BOT_NAME);
        assert_eq!(json["embeds"][0]["title"], "❌ Error");
    }
}
