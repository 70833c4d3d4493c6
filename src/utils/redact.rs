//! Redaction of Discord credentials before they reach the console
//!
//! Sink errors can echo the webhook URL or the bot token; these helpers strip
//! the secret parts so log files stay shareable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns whose second capture group is secret
static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Webhooks: keep the id, drop the token
        Regex::new(r"((?:discord|discordapp)\.com/api/(?:v\d+/)?webhooks/\d+/)([A-Za-z0-9_-]+)")
            .expect("Invalid Discord webhook regex"),
        // Authorization header values
        Regex::new(r"((?i:authorization)\s*[:=]\s*(?:Bot|Bearer)\s+)([A-Za-z0-9._-]+)")
            .expect("Invalid authorization regex"),
        // Token-length credentials after a scheme, without the header name
        Regex::new(r"((?:Bot|Bearer)\s+)([A-Za-z0-9._-]{20,})").expect("Invalid credential regex"),
    ]
});

/// Bare bot tokens: three dot-separated base64url segments
static BOT_TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_-]{23,28}\.[A-Za-z0-9_-]{6,7}\.[A-Za-z0-9_-]{27,}")
        .expect("Invalid bot token regex")
});

/// Redact the token part of a webhook URL
pub fn redact_url(url: &str) -> String {
    SECRET_PATTERNS[0]
        .replace_all(url, "${1}[REDACTED]")
        .to_string()
}

/// Redact webhook tokens, authorization values and bot tokens from a message
pub fn redact_error_message(message: &str) -> String {
    let mut result = message.to_string();

    for pattern in SECRET_PATTERNS.iter() {
        result = pattern.replace_all(&result, "${1}[REDACTED]").to_string();
    }

    BOT_TOKEN_PATTERN
        .replace_all(&result, "[TOKEN_REDACTED]")
        .to_string()
}
