use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discord::{
    Embed, EmbedField, EmbedFooter, BLANK_FIELD_NAME, BOT_NAME, COLOR_BLUE, COLOR_DARK_RED,
    COLOR_GREEN, COLOR_ORANGE, COLOR_RED, MAX_FIELD_VALUE,
};

/// Values up to this many characters render side by side
const INLINE_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
    Security,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Success => "success",
            Severity::Security => "security",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️ Info",
            Severity::Warning => "⚠️ Warning",
            Severity::Error => "❌ Error",
            Severity::Success => "✅ Success",
            Severity::Security => "🛡️ Security Alert",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Severity::Info => COLOR_BLUE,
            Severity::Warning => COLOR_ORANGE,
            Severity::Error => COLOR_RED,
            Severity::Success => COLOR_GREEN,
            Severity::Security => COLOR_DARK_RED,
        }
    }

    /// Severities that also go to the webhook
    pub fn is_alert(&self) -> bool {
        matches!(self, Severity::Error | Severity::Security)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error that triggered an event, flattened to text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetails {
    pub message: String,
    /// Messages of the `source()` chain, outermost cause first
    pub chain: Vec<String>,
}

impl ErrorDetails {
    pub fn from_error(error: &dyn Error) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            chain,
        }
    }
}

/// A single log/notification event. Created, rendered, dispatched, dropped.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub severity: Severity,
    pub context: String,
    pub fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    pub fn new(severity: Severity, context: impl Into<String>) -> Self {
        Self {
            severity,
            context: context.into(),
            fields: Vec::new(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn with_fields(mut self, fields: &[(&str, String)]) -> Self {
        self.fields
            .extend(fields.iter().map(|(k, v)| (k.to_string(), v.clone())));
        self
    }

    pub fn with_error(mut self, error: &dyn Error) -> Self {
        self.error = Some(ErrorDetails::from_error(error));
        self
    }

    /// One-line form for the console
    pub fn summary(&self) -> String {
        let mut line = self.context.clone();
        if let Some(error) = &self.error {
            line.push_str(": ");
            line.push_str(&error.message);
        }
        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            line.push_str(&format!(" [{}]", fields));
        }
        line
    }

    /// Render as a Discord embed. `debug` adds the error's cause chain.
    pub fn render(&self, debug: bool) -> Embed {
        let mut embed = Embed::new(self.severity.title(), self.severity.color());
        embed.description = Some(format!("**{}**", self.context));
        embed.timestamp = Some(self.timestamp.to_rfc3339());
        embed.footer = Some(EmbedFooter {
            text: BOT_NAME.to_string(),
        });

        if let Some(error) = &self.error {
            embed.fields.extend(chunk_field("Error", &error.message, false));
            if debug && !error.chain.is_empty() {
                let details = error
                    .chain
                    .iter()
                    .map(|cause| format!("caused by: {}", cause))
                    .collect::<Vec<_>>()
                    .join("\n");
                embed.fields.extend(chunk_field("Details", &details, false));
            }
        }

        for (name, value) in &self.fields {
            let inline = value.chars().count() <= INLINE_THRESHOLD;
            embed.fields.extend(chunk_field(name, value, inline));
        }

        embed.truncate_to_limits();
        embed
    }
}

/// Split a field whose value exceeds Discord's limit into consecutive fields.
/// Only the first chunk keeps `name`; the rest get an invisible label.
pub fn chunk_field(name: &str, value: &str, inline: bool) -> Vec<EmbedField> {
    if value.is_empty() {
        return vec![EmbedField::new(name, "-", inline)];
    }

    let chars: Vec<char> = value.chars().collect();
    chars
        .chunks(MAX_FIELD_VALUE)
        .enumerate()
        .map(|(i, chunk)| {
            let label = if i == 0 { name } else { BLANK_FIELD_NAME };
            EmbedField::new(label, chunk.iter().collect::<String>(), inline)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_chunk_field_lengths() {
        let value = "a".repeat(2500);
        let chunks = chunk_field("Payload", &value, false);

        let lengths: Vec<usize> = chunks.iter().map(|c| c.value.chars().count()).collect();
        assert_eq!(lengths, vec![1024, 1024, 452]);
        assert_eq!(chunks[0].name, "Payload");
        assert_eq!(chunks[1].name, BLANK_FIELD_NAME);
        assert_eq!(chunks[2].name, BLANK_FIELD_NAME);
        assert_eq!(
            chunks.iter().map(|c| c.value.as_str()).collect::<String>(),
            value
        );
    }

    #[test]
    fn test_chunk_field_counts_characters_not_bytes() {
        let value = "é".repeat(1500);
        let chunks = chunk_field("Accents", &value, true);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].value.chars().count(), 1024);
        assert_eq!(chunks[1].value.chars().count(), 476);
    }

    #[test]
    fn test_short_and_empty_values() {
        assert_eq!(chunk_field("Name", "Notch", true).len(), 1);
        assert_eq!(chunk_field("Name", "", true)[0].value, "-");
    }

    #[test]
    fn test_render_error_event() {
        let err = AppError::UpstreamTimeout("Username lookup".to_string());
        let event = LogEvent::new(Severity::Error, "Mojang username lookup")
            .with_error(&err)
            .with_field("username", "Notch");

        let embed = event.render(false);
        assert_eq!(embed.title.as_deref(), Some("❌ Error"));
        assert_eq!(embed.color, Some(COLOR_RED));
        assert_eq!(
            embed.description.as_deref(),
            Some("**Mojang username lookup**")
        );
        assert_eq!(
            embed.field("Error").unwrap().value,
            "Upstream timed out: Username lookup"
        );
        let username = embed.field("username").unwrap();
        assert!(username.inline);
        assert!(embed.field("Details").is_none());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_render_debug_includes_cause_chain() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"));

        let debug = LogEvent::new(Severity::Error, "ctx").with_error(&err).render(true);
        assert_eq!(
            debug.field("Details").unwrap().value,
            "caused by: disk on fire"
        );

        let quiet = LogEvent::new(Severity::Error, "ctx").with_error(&err).render(false);
        assert!(quiet.field("Details").is_none());
    }

    #[test]
    fn test_long_field_is_chunked_in_render() {
        let event = LogEvent::new(Severity::Info, "Ticket opened").with_field("transcript", "x".repeat(2500));
        let embed = event.render(false);
        assert_eq!(embed.fields.len(), 3);
        assert!(!embed.fields[0].inline);
    }

    #[test]
    fn test_summary() {
        let event = LogEvent::new(Severity::Warning, "Cache")
            .with_field("entries", "500");
        assert_eq!(event.summary(), "Cache [entries=500]");
    }

    #[test]
    fn test_alert_severities() {
        assert!(Severity::Error.is_alert());
        assert!(Severity::Security.is_alert());
        assert!(!Severity::Info.is_alert());
        assert!(!Severity::Warning.is_alert());
        assert!(!Severity::Success.is_alert());
    }
}
