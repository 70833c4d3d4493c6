pub mod capes;
pub mod mojang;
pub mod optifine;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use capes::{classify_cape, CapeKind};
pub use mojang::{MojangEndpoints, ProfileFetcher};

/// Capes and cosmetics shown per embed page
pub const ITEMS_PER_PAGE: usize = 5;

/// Number of pages needed to show `total` descriptors
pub fn page_count(total: usize) -> usize {
    total.div_ceil(ITEMS_PER_PAGE)
}

// ==================== Render URLs ====================

/// Head avatar render for a player
pub fn avatar_url(uuid: &Uuid, size: u32) -> String {
    format!("https://mc-heads.net/avatar/{}/{}", uuid.simple(), size)
}

/// Full body render for a player
pub fn body_render_url(uuid: &Uuid, size: u32) -> String {
    format!("https://mc-heads.net/body/{}/{}", uuid.simple(), size)
}

/// Raw skin texture download
pub fn skin_download_url(uuid: &Uuid) -> String {
    format!("https://mc-heads.net/skin/{}", uuid.simple())
}

pub fn namemc_url(uuid: &Uuid) -> String {
    format!("https://namemc.com/profile/{}", uuid.hyphenated())
}

/// Skin variant (Steve vs Alex arm width)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkinVariant {
    #[default]
    Classic, // Steve (4px arms)
    Slim,    // Alex (3px arms)
}

impl SkinVariant {
    /// Map the texture metadata `model` value; anything but "slim" is classic
    pub fn from_model(model: Option<&str>) -> Self {
        match model {
            Some(m) if m.eq_ignore_ascii_case("slim") => SkinVariant::Slim,
            _ => SkinVariant::Classic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkinVariant::Classic => "Classic (Steve)",
            SkinVariant::Slim => "Slim (Alex)",
        }
    }
}

impl std::fmt::Display for SkinVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkinVariant::Classic => write!(f, "classic"),
            SkinVariant::Slim => write!(f, "slim"),
        }
    }
}

/// Username resolved to its stable account identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub uuid: Uuid,
    /// Current display name as reported by Mojang (correct casing)
    pub username: String,
}

/// A cape with its classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapeDescriptor {
    pub kind: CapeKind,
    pub label: String,
    pub url: String,
}

impl CapeDescriptor {
    pub fn from_url(url: &str) -> Self {
        let kind = classify_cape(url);
        Self {
            kind,
            label: kind.label().to_string(),
            url: url.to_string(),
        }
    }
}

/// Any other cosmetic worth listing (third-party capes, skin model)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cosmetic {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One entry of a player's name history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameRecord {
    pub name: String,
    /// Milliseconds since the epoch; absent for the account's original name
    #[serde(rename = "changedToAt", skip_serializing_if = "Option::is_none")]
    pub changed_to_at: Option<i64>,
}

impl NameRecord {
    pub fn changed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.changed_to_at
            .and_then(chrono::DateTime::from_timestamp_millis)
    }
}

/// Cosmetics assembled from the session profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProfileData {
    pub capes: Vec<CapeDescriptor>,
    pub cosmetics: Vec<Cosmetic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_variant: Option<SkinVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_url: Option<String>,
    pub total_pages: usize,
}

impl ProfileData {
    /// Zeroed profile returned when assembly fails
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.capes.is_empty() && self.cosmetics.is_empty()
    }

    pub(crate) fn recount_pages(&mut self) {
        self.total_pages = page_count(self.capes.len() + self.cosmetics.len());
    }
}

/// Everything we know about a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub uuid: Uuid,
    pub username: String,
    /// Most recent name first
    pub name_history: Vec<NameRecord>,
    pub capes: Vec<CapeDescriptor>,
    pub cosmetics: Vec<Cosmetic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_variant: Option<SkinVariant>,
    pub total_pages: usize,
}

impl PlayerProfile {
    pub fn new(identity: PlayerIdentity, data: ProfileData, name_history: Vec<NameRecord>) -> Self {
        Self {
            uuid: identity.uuid,
            username: identity.username,
            name_history,
            capes: data.capes,
            cosmetics: data.cosmetics,
            skin_variant: data.skin_variant,
            total_pages: data.total_pages,
        }
    }

    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            uuid: self.uuid,
            username: self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(5), 1);
        assert_eq!(page_count(10), 2);
        assert_eq!(page_count(11), 3);
    }

    #[test]
    fn test_skin_variant_from_model() {
        assert_eq!(SkinVariant::from_model(Some("slim")), SkinVariant::Slim);
        assert_eq!(SkinVariant::from_model(Some("default")), SkinVariant::Classic);
        assert_eq!(SkinVariant::from_model(None), SkinVariant::Classic);
        assert_eq!(SkinVariant::Slim.label(), "Slim (Alex)");
    }

    #[test]
    fn test_name_record_deserialize() {
        let records: Vec<NameRecord> = serde_json::from_str(
            r#"[{"name":"First"},{"name":"Second","changedToAt":1423059891000}]"#,
        )
        .unwrap();
        assert_eq!(records[0].changed_to_at, None);
        assert_eq!(records[1].changed_at().unwrap().timestamp(), 1423059891);
    }

    #[test]
    fn test_empty_profile() {
        let empty = ProfileData::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.total_pages, 0);
    }
}
