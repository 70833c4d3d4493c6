//! Structured logging: console output plus optional Discord delivery
//!
//! Every event goes to the console through `tracing`. When remote sinks are
//! configured the event is also rendered as an embed and fanned out to each
//! sink that accepts its severity. Nothing in here ever returns an error to
//! the caller: delivery failures end at the console.

mod event;

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing_subscriber::EnvFilter;

use crate::discord::Embed;
use crate::error::AppResult;
use crate::utils::redact::redact_error_message;

pub use event::{chunk_field, ErrorDetails, LogEvent, Severity};

/// A destination for rendered log events
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether events of this severity should be sent here
    fn accepts(&self, severity: Severity) -> bool;

    async fn deliver(&self, embed: &Embed) -> AppResult<()>;
}

/// Install the global `tracing` subscriber; `RUST_LOG` wins over the debug flag
pub fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber may already be installed (tests, embedding applications)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Logger composed of independently configured sinks
#[derive(Clone, Default)]
pub struct Logger {
    sinks: Vec<Arc<dyn Sink>>,
    debug: bool,
}

impl Logger {
    /// Console-only logger
    pub fn new(debug: bool) -> Self {
        Self {
            sinks: Vec::new(),
            debug,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn has_remote_sinks(&self) -> bool {
        !self.sinks.is_empty()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Log an error with context and extra fields. Never fails.
    pub async fn log_error(
        &self,
        error: &(dyn Error + Send + Sync),
        context: &str,
        extra: &[(&str, String)],
    ) {
        let event = LogEvent::new(Severity::Error, context)
            .with_error(error)
            .with_fields(extra);
        self.log_event(event).await;
    }

    pub async fn log_database_error(
        &self,
        error: &(dyn Error + Send + Sync),
        operation: &str,
        extra: &[(&str, String)],
    ) {
        let event = LogEvent::new(Severity::Error, format!("Database error during {}", operation))
            .with_error(error)
            .with_field("operation", operation)
            .with_fields(extra);
        self.log_event(event).await;
    }

    pub async fn log_command_error(
        &self,
        error: &(dyn Error + Send + Sync),
        command: &str,
        user: &str,
    ) {
        let event = LogEvent::new(Severity::Error, format!("Command /{} failed", command))
            .with_error(error)
            .with_field("command", command)
            .with_field("user", user);
        self.log_event(event).await;
    }

    /// Ticket lifecycle notification (opened, claimed, closed, ...)
    pub async fn log_ticket(
        &self,
        action: &str,
        ticket_id: &str,
        user: &str,
        extra: &[(&str, String)],
    ) {
        let event = LogEvent::new(Severity::Info, format!("Ticket {}", action))
            .with_field("ticket", ticket_id)
            .with_field("user", user)
            .with_fields(extra);
        self.log_event(event).await;
    }

    pub async fn log_success(&self, message: &str, fields: &[(&str, String)]) {
        self.log_event(LogEvent::new(Severity::Success, message).with_fields(fields))
            .await;
    }

    pub async fn log_info(&self, message: &str, fields: &[(&str, String)]) {
        self.log_event(LogEvent::new(Severity::Info, message).with_fields(fields))
            .await;
    }

    pub async fn log_warning(&self, message: &str, fields: &[(&str, String)]) {
        self.log_event(LogEvent::new(Severity::Warning, message).with_fields(fields))
            .await;
    }

    pub async fn log_security(&self, message: &str, fields: &[(&str, String)]) {
        self.log_event(LogEvent::new(Severity::Security, message).with_fields(fields))
            .await;
    }

    /// Write to the console, then render and dispatch when remote sinks exist
    pub async fn log_event(&self, event: LogEvent) {
        let summary = event.summary();
        match event.severity {
            Severity::Error | Severity::Security => {
                tracing::error!(severity = %event.severity, "{}", summary)
            }
            Severity::Warning => tracing::warn!(severity = %event.severity, "{}", summary),
            Severity::Info | Severity::Success => {
                tracing::info!(severity = %event.severity, "{}", summary)
            }
        }

        if !self.has_remote_sinks() {
            return;
        }

        let embed = event.render(self.debug);
        self.dispatch(&embed, event.severity).await;
    }

    /// Send a rendered event to every sink that accepts `severity`
    ///
    /// Transient network failures are dropped quietly; anything else is
    /// reported to the console only.
    pub async fn dispatch(&self, embed: &Embed, severity: Severity) {
        let deliveries = self
            .sinks
            .iter()
            .filter(|sink| sink.accepts(severity))
            .map(|sink| async move { (sink.name(), sink.deliver(embed).await) });

        for (name, result) in join_all(deliveries).await {
            match result {
                Ok(()) => tracing::trace!("Delivered {} event to {}", severity, name),
                Err(e) if e.is_transient() => {
                    tracing::trace!("Transient {} delivery failure suppressed: {}", name, e)
                }
                Err(e) => tracing::error!(
                    "Failed to deliver {} event to {}: {}",
                    severity,
                    name,
                    redact_error_message(&e.to_string())
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every delivered embed
    struct RecordingSink {
        alerts_only: bool,
        delivered: Mutex<Vec<Embed>>,
    }

    impl RecordingSink {
        fn new(alerts_only: bool) -> Arc<Self> {
            Arc::new(Self {
                alerts_only,
                delivered: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.delivered.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Sink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn accepts(&self, severity: Severity) -> bool {
            !self.alerts_only || severity.is_alert()
        }

        async fn deliver(&self, embed: &Embed) -> AppResult<()> {
            self.delivered.lock().unwrap().push(embed.clone());
            Ok(())
        }
    }

    /// Always fails with the configured error
    struct FailingSink {
        transient: bool,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Sink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn accepts(&self, _severity: Severity) -> bool {
            true
        }

        async fn deliver(&self, _embed: &Embed) -> AppResult<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.transient {
                Err(AppError::UpstreamTimeout("sink".to_string()))
            } else {
                Err(AppError::Discord(
                    "Webhook failed with status 400: https://discord.com/api/webhooks/1/secret"
                        .to_string(),
                ))
            }
        }
    }

    #[tokio::test]
    async fn test_console_only_logger_completes() {
        let logger = Logger::new(false);
        let err = AppError::UpstreamUnavailable("Username lookup failed (500)".to_string());
        logger
            .log_error(&err, "Mojang username lookup", &[("username", "Notch".to_string())])
            .await;
        assert!(!logger.has_remote_sinks());
    }

    #[tokio::test]
    async fn test_severity_routing() {
        let channel = RecordingSink::new(false);
        let webhook = RecordingSink::new(true);
        let logger = Logger::new(false)
            .with_sink(channel.clone())
            .with_sink(webhook.clone());

        logger.log_info("Bot started", &[]).await;
        logger.log_success("Profile cached", &[("player", "Notch".to_string())]).await;
        logger.log_warning("Slow upstream", &[]).await;
        assert_eq!(channel.count(), 3);
        assert_eq!(webhook.count(), 0);

        let err = AppError::UpstreamTimeout("Session profile".to_string());
        logger.log_command_error(&err, "cosmetics", "someone#0001").await;
        logger.log_security("Webhook URL rejected", &[]).await;
        assert_eq!(channel.count(), 5);
        assert_eq!(webhook.count(), 2);
    }

    #[tokio::test]
    async fn test_wrappers_tag_context() {
        let channel = RecordingSink::new(false);
        let logger = Logger::new(false).with_sink(channel.clone());

        let err = AppError::Config("pool exhausted".to_string());
        logger.log_database_error(&err, "insert ticket", &[]).await;
        logger
            .log_ticket("opened", "T-42", "someone", &[("topic", "Cape missing".to_string())])
            .await;

        let delivered = channel.delivered.lock().unwrap();
        assert_eq!(
            delivered[0].description.as_deref(),
            Some("**Database error during insert ticket**")
        );
        assert_eq!(delivered[0].field("operation").unwrap().value, "insert ticket");
        assert_eq!(delivered[1].description.as_deref(), Some("**Ticket opened**"));
        assert_eq!(delivered[1].field("ticket").unwrap().value, "T-42");
        assert_eq!(delivered[1].field("topic").unwrap().value, "Cape missing");
    }

    #[tokio::test]
    async fn test_sink_failures_are_contained() {
        let transient = Arc::new(FailingSink {
            transient: true,
            attempts: AtomicUsize::new(0),
        });
        let permanent = Arc::new(FailingSink {
            transient: false,
            attempts: AtomicUsize::new(0),
        });
        let healthy = RecordingSink::new(false);
        let logger = Logger::new(true)
            .with_sink(transient.clone())
            .with_sink(permanent.clone())
            .with_sink(healthy.clone());

        let err = AppError::Skin("bad textures".to_string());
        logger.log_error(&err, "Profile assembly", &[]).await;

        assert_eq!(transient.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(permanent.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.count(), 1);
    }
}
