//! Webhook URL validation
//!
//! The webhook URL comes from the environment; reject anything that is not a
//! Discord webhook before the logger starts posting error details to it.

use url::Url;

/// Hosts that serve Discord webhooks
const ALLOWED_WEBHOOK_HOSTS: &[&str] = &[
    "discord.com",
    "discordapp.com",
    "ptb.discord.com",
    "canary.discord.com",
];

/// Validate a Discord webhook URL
///
/// # Returns
/// * `Ok(Url)` - The parsed URL if valid
/// * `Err(String)` - Error message describing why validation failed
pub fn validate_webhook_url(url_str: &str) -> Result<Url, String> {
    let url = Url::parse(url_str.trim()).map_err(|e| format!("Invalid URL: {}", e))?;

    if url.scheme() != "https" {
        return Err(format!("Webhook URL must use https, got '{}'", url.scheme()));
    }

    let host = url
        .host_str()
        .ok_or_else(|| "Webhook URL has no host".to_string())?;
    if !ALLOWED_WEBHOOK_HOSTS.contains(&host) {
        return Err(format!("'{}' is not a Discord webhook host", host));
    }

    // /api/webhooks/{id}/{token}, optionally with a version segment
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let rest = match segments.as_slice() {
        ["api", version, rest @ ..] if version.starts_with('v') => rest,
        ["api", rest @ ..] => rest,
        _ => return Err("Webhook URL path must start with /api/webhooks".to_string()),
    };

    match rest {
        ["webhooks", id, token] if id.chars().all(|c| c.is_ascii_digit()) && !token.is_empty() => {
            Ok(url)
        }
        _ => Err("Webhook URL must look like /api/webhooks/{id}/{token}".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_webhook_urls() {
        assert!(validate_webhook_url("https://discord.com/api/webhooks/123456/abc_DEF-ghi").is_ok());
        assert!(validate_webhook_url("https://discordapp.com/api/webhooks/1/t").is_ok());
        assert!(validate_webhook_url("https://canary.discord.com/api/v10/webhooks/1/t").is_ok());
    }

    #[test]
    fn test_rejects_http() {
        let err = validate_webhook_url("http://discord.com/api/webhooks/1/t").unwrap_err();
        assert!(err.contains("https"));
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(validate_webhook_url("https://evil.example.com/api/webhooks/1/t").is_err());
        assert!(validate_webhook_url("https://discord.com.evil.example/api/webhooks/1/t").is_err());
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(validate_webhook_url("https://discord.com/channels/1/2").is_err());
        assert!(validate_webhook_url("https://discord.com/api/webhooks/abc/t").is_err());
        assert!(validate_webhook_url("https://discord.com/api/webhooks/1").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_webhook_url("not a url").is_err());
    }
}
