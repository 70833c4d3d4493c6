use std::sync::Arc;
use std::time::Duration;

use crate::cache::ProfileCache;
use crate::config::Config;
use crate::discord::channel::ChannelSink;
use crate::discord::webhook::WebhookSink;
use crate::error::AppResult;
use crate::logger::Logger;
use crate::skins::ProfileFetcher;

/// Everything the bot's command handlers need, built once at startup
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub cache: Arc<ProfileCache>,
    pub logger: Arc<Logger>,
    pub fetcher: ProfileFetcher,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        // Per-request timeouts are set by the callers; this only bounds connects
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("CosmeticsBot/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let cache = Arc::new(ProfileCache::new(config.cache_max_entries, config.cache_ttl));
        let logger = Arc::new(Self::build_logger(&config, &http_client));

        let fetcher = ProfileFetcher::new(http_client.clone(), cache.clone(), config.endpoints.clone())
            .with_logger(logger.clone());

        tracing::info!(
            max_entries = config.cache_max_entries,
            ttl_secs = config.cache_ttl.as_secs(),
            remote_logging = logger.has_remote_sinks(),
            "Cosmetics bot state initialized"
        );

        Ok(Self {
            config,
            http_client,
            cache,
            logger,
            fetcher,
        })
    }

    fn build_logger(config: &Config, client: &reqwest::Client) -> Logger {
        let mut logger = Logger::new(config.debug);

        if let Some(token) = &config.bot_token {
            logger = logger.with_sink(Arc::new(ChannelSink::new(client.clone(), token.clone())));
        }
        if let Some(url) = &config.webhook_url {
            logger = logger.with_sink(Arc::new(WebhookSink::new(client.clone(), url.clone())));
        }

        logger
    }
}
