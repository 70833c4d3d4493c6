use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::error::{AppError, AppResult};
use crate::logger::Logger;
use crate::skins::{
    optifine, CapeDescriptor, Cosmetic, NameRecord, PlayerIdentity, PlayerProfile, ProfileData,
    SkinVariant,
};

pub const MOJANG_API_URL: &str = "https://api.mojang.com";
pub const SESSION_SERVER_URL: &str = "https://sessionserver.mojang.com";

/// Timeout for identity, session and name-history lookups
pub const PRIMARY_TIMEOUT: Duration = Duration::from_secs(10);

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{1,16}$").expect("Invalid username regex"));

/// Where the fetcher sends its requests
#[derive(Debug, Clone)]
pub struct MojangEndpoints {
    pub api_url: String,
    pub session_url: String,
    pub optifine_url: String,
    pub primary_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for MojangEndpoints {
    fn default() -> Self {
        Self {
            api_url: MOJANG_API_URL.to_string(),
            session_url: SESSION_SERVER_URL.to_string(),
            optifine_url: optifine::OPTIFINE_CAPES_URL.to_string(),
            primary_timeout: PRIMARY_TIMEOUT,
            probe_timeout: optifine::PROBE_TIMEOUT,
        }
    }
}

/// Username lookup response
#[derive(Debug, Deserialize)]
struct IdentityResponse {
    id: String,
    name: String,
}

/// Session server profile response
#[derive(Debug, Deserialize)]
struct SessionProfileResponse {
    #[allow(dead_code)] // Deserialized but not used directly
    id: String,
    #[serde(default)]
    properties: Vec<ProfileProperty>,
}

#[derive(Debug, Deserialize)]
struct ProfileProperty {
    name: String,
    value: String,
}

/// Decoded `textures` property
#[derive(Debug, Deserialize)]
struct TexturesPayload {
    #[serde(default)]
    textures: Textures,
}

#[derive(Debug, Default, Deserialize)]
struct Textures {
    #[serde(rename = "SKIN")]
    skin: Option<SkinTexture>,
    #[serde(rename = "CAPE")]
    cape: Option<CapeTexture>,
}

#[derive(Debug, Deserialize)]
struct SkinTexture {
    url: String,
    metadata: Option<SkinMetadata>,
}

#[derive(Debug, Deserialize)]
struct SkinMetadata {
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CapeTexture {
    url: String,
}

/// Check a username before it is put into a request path
pub fn validate_username(username: &str) -> AppResult<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput(
            "Username must not be empty".to_string(),
        ));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a valid Minecraft username",
            username
        )));
    }
    Ok(username)
}

/// Decode the base64 `textures` property of a session profile
fn decode_textures(value: &str) -> AppResult<Textures> {
    let bytes = BASE64
        .decode(value)
        .map_err(|e| AppError::Skin(format!("Invalid textures property: {}", e)))?;
    let payload: TexturesPayload = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Skin(format!("Failed to parse textures property: {}", e)))?;
    Ok(payload.textures)
}

/// Resolves players against Mojang and caches what it finds
pub struct ProfileFetcher {
    client: reqwest::Client,
    cache: Arc<ProfileCache>,
    endpoints: MojangEndpoints,
    logger: Option<Arc<Logger>>,
}

impl ProfileFetcher {
    pub fn new(client: reqwest::Client, cache: Arc<ProfileCache>, endpoints: MojangEndpoints) -> Self {
        Self {
            client,
            cache,
            endpoints,
            logger: None,
        }
    }

    /// Report username lookup failures to the structured logger
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    // ==================== Username -> UUID ====================

    /// Resolve a username to its account UUID
    ///
    /// `Ok(None)` means Mojang has no such player. Transport failures, timeouts
    /// and unexpected statuses are returned as errors and reported to the logger.
    pub async fn resolve_username(&self, username: &str) -> AppResult<Option<PlayerIdentity>> {
        let username = validate_username(username)?;
        let key = format!("mojang-{}", username.to_lowercase());

        let result = self
            .cache
            .get_or_fetch(&key, || self.fetch_identity(username))
            .await;

        if let Err(e) = &result {
            tracing::warn!("Username lookup for {} failed: {}", username, e);
            if let Some(logger) = &self.logger {
                logger
                    .log_error(
                        e,
                        "Mojang username lookup",
                        &[
                            ("username", username.to_string()),
                            ("errorType", e.kind().to_string()),
                            ("message", e.to_string()),
                        ],
                    )
                    .await;
            }
        }

        result
    }

    async fn fetch_identity(&self, username: &str) -> AppResult<Option<PlayerIdentity>> {
        let url = format!(
            "{}/users/profiles/minecraft/{}",
            self.endpoints.api_url, username
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.endpoints.primary_timeout)
            .send()
            .await
            .map_err(|e| AppError::upstream("Username lookup", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            tracing::debug!("No Mojang account named {}", username);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Username lookup failed ({})",
                status
            )));
        }

        let identity: IdentityResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("Username lookup", e))?;

        let uuid = Uuid::parse_str(&identity.id)
            .map_err(|e| AppError::Skin(format!("Invalid UUID '{}': {}", identity.id, e)))?;

        Ok(Some(PlayerIdentity {
            uuid,
            username: identity.name,
        }))
    }

    // ==================== Session profile ====================

    /// Assemble capes and cosmetics for a player
    ///
    /// `Ok(None)` when the session server does not know the UUID.
    pub async fn fetch_profile(&self, uuid: Uuid, username: &str) -> AppResult<Option<ProfileData>> {
        let key = format!("profile-{}", uuid.simple());
        self.cache
            .get_or_fetch(&key, || self.assemble_profile(uuid, username))
            .await
    }

    /// Like [`fetch_profile`](Self::fetch_profile), but any failure yields an empty profile
    pub async fn get_profile(&self, uuid: Uuid, username: &str) -> ProfileData {
        match self.fetch_profile(uuid, username).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::warn!("Session server has no profile for {}", uuid);
                ProfileData::empty()
            }
            Err(e) => {
                tracing::warn!("Failed to assemble profile for {} ({}): {}", username, uuid, e);
                ProfileData::empty()
            }
        }
    }

    async fn assemble_profile(&self, uuid: Uuid, username: &str) -> AppResult<Option<ProfileData>> {
        let url = format!(
            "{}/session/minecraft/profile/{}",
            self.endpoints.session_url,
            uuid.simple()
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.endpoints.primary_timeout)
            .send()
            .await
            .map_err(|e| AppError::upstream("Session profile", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Session profile failed ({})",
                status
            )));
        }

        let session: SessionProfileResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("Session profile", e))?;

        let textures = match session.properties.iter().find(|p| p.name == "textures") {
            Some(property) => decode_textures(&property.value)?,
            None => Textures::default(),
        };

        let mut profile = ProfileData::empty();

        if let Some(cape) = textures.cape {
            profile.capes.push(CapeDescriptor::from_url(&cape.url));
        }

        if let Some(skin) = textures.skin {
            let variant = SkinVariant::from_model(
                skin.metadata.as_ref().and_then(|m| m.model.as_deref()),
            );
            profile.cosmetics.push(Cosmetic {
                label: format!("🧍 Skin Model: {}", variant.label()),
                url: Some(skin.url.clone()),
            });
            profile.skin_variant = Some(variant);
            profile.skin_url = Some(skin.url);
        }

        // Best effort: a failed probe just means no OptiFine cape
        match optifine::probe_cape(
            &self.client,
            &self.endpoints.optifine_url,
            username,
            self.endpoints.probe_timeout,
        )
        .await
        {
            Ok(Some(cape)) => profile.cosmetics.push(cape),
            Ok(None) => {}
            Err(e) => tracing::debug!("OptiFine probe for {} ignored: {}", username, e),
        }

        profile.recount_pages();
        Ok(Some(profile))
    }

    // ==================== Name history ====================

    /// Name history, most recent first
    pub async fn fetch_name_history(&self, uuid: Uuid) -> AppResult<Option<Vec<NameRecord>>> {
        let key = format!("history-{}", uuid.simple());
        self.cache
            .get_or_fetch(&key, || self.fetch_names(uuid))
            .await
    }

    /// Like [`fetch_name_history`](Self::fetch_name_history), but failures are absent
    pub async fn get_name_history(&self, uuid: Uuid) -> Option<Vec<NameRecord>> {
        match self.fetch_name_history(uuid).await {
            Ok(history) => history,
            Err(e) => {
                tracing::debug!("Name history for {} unavailable: {}", uuid, e);
                None
            }
        }
    }

    async fn fetch_names(&self, uuid: Uuid) -> AppResult<Option<Vec<NameRecord>>> {
        let url = format!(
            "{}/user/profiles/{}/names",
            self.endpoints.api_url,
            uuid.simple()
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.endpoints.primary_timeout)
            .send()
            .await
            .map_err(|e| AppError::upstream("Name history", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Name history failed ({})",
                status
            )));
        }

        let mut names: Vec<NameRecord> = response
            .json()
            .await
            .map_err(|e| AppError::upstream("Name history", e))?;
        names.reverse();
        Ok(Some(names))
    }

    // ==================== Full lookup ====================

    /// Resolve a username and gather everything shown in the cosmetics embed
    pub async fn lookup_player(&self, username: &str) -> AppResult<Option<PlayerProfile>> {
        let identity = match self.resolve_username(username).await? {
            Some(identity) => identity,
            None => return Ok(None),
        };

        let data = self.get_profile(identity.uuid, &identity.username).await;
        let history = self
            .get_name_history(identity.uuid)
            .await
            .unwrap_or_default();

        Ok(Some(PlayerProfile::new(identity, data, history)))
    }
}
