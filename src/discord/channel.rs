use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::discord::Embed;
use crate::error::{AppError, AppResult};
use crate::logger::{Severity, Sink};

pub const DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Environment variable holding the log channel id
pub const LOG_CHANNEL_VAR: &str = "LOG_CHANNEL_ID";

#[derive(Serialize)]
struct MessagePayload<'a> {
    embeds: [&'a Embed; 1],
}

/// Posts every event to a text channel through the bot's REST API access
///
/// The channel id is read from the environment on each delivery, so it can be
/// set after startup; while it is missing the sink does nothing.
pub struct ChannelSink {
    client: Client,
    bot_token: String,
    api_url: String,
    channel_var: String,
}

impl ChannelSink {
    pub fn new(client: Client, bot_token: impl Into<String>) -> Self {
        Self {
            client,
            bot_token: bot_token.into(),
            api_url: DISCORD_API_URL.to_string(),
            channel_var: LOG_CHANNEL_VAR.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Read the channel id from a different environment variable
    pub fn with_channel_var(mut self, name: impl Into<String>) -> Self {
        self.channel_var = name.into();
        self
    }

    fn channel_id(&self) -> Option<String> {
        std::env::var(&self.channel_var)
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

#[async_trait]
impl Sink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn accepts(&self, _severity: Severity) -> bool {
        true
    }

    async fn deliver(&self, embed: &Embed) -> AppResult<()> {
        let Some(channel_id) = self.channel_id() else {
            tracing::trace!("{} not set, skipping channel delivery", self.channel_var);
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_url, channel_id))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&MessagePayload { embeds: [embed] })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Discord(format!(
                "Channel message failed with status {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_channel_is_noop() {
        // Points at a port nothing listens on; delivery must not even try
        let sink = ChannelSink::new(Client::new(), "token")
            .with_api_url("http://127.0.0.1:9")
            .with_channel_var("COSMETICS_BOT_TEST_UNSET_CHANNEL");

        let embed = Embed::new("ℹ️ Info", 0x3b82f6);
        assert!(sink.deliver(&embed).await.is_ok());
    }

    #[test]
    fn test_accepts_everything() {
        let sink = ChannelSink::new(Client::new(), "token");
        assert!(sink.accepts(Severity::Info));
        assert!(sink.accepts(Severity::Security));
    }
}
