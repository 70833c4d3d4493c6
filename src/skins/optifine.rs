// OptiFine cape probe

use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::skins::{CapeKind, Cosmetic};

pub const OPTIFINE_CAPES_URL: &str = "http://s.optifine.net";

/// Probe timeout, shorter than the primary Mojang calls
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Get OptiFine cape URL for a player (doesn't check if it exists)
pub fn get_cape_url(base_url: &str, username: &str) -> String {
    format!("{}/capes/{}.png", base_url.trim_end_matches('/'), username)
}

/// Check whether a player has an OptiFine cape
/// Returns None if the player has no OptiFine cape
pub async fn probe_cape(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    timeout: Duration,
) -> AppResult<Option<Cosmetic>> {
    let url = get_cape_url(base_url, username);

    let response = client
        .head(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| AppError::Skin(format!("Failed to check OptiFine cape: {}", e)))?;

    // OptiFine returns 404 if user has no cape
    if response.status() != reqwest::StatusCode::OK {
        return Ok(None);
    }

    Ok(Some(Cosmetic {
        label: CapeKind::OptiFine.label().to_string(),
        url: Some(url),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cape_url() {
        assert_eq!(
            get_cape_url("http://s.optifine.net/", "Notch"),
            "http://s.optifine.net/capes/Notch.png"
        );
    }
}
