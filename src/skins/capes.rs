//! Cape classification from texture URLs
//!
//! Rules are checked top to bottom and the first match wins. Several markers
//! only make sense on the official texture host, so those rules require the
//! official domain as well; the generic "official" rule must stay after them.

use serde::{Deserialize, Serialize};

const OFFICIAL_DOMAIN: &str = "minecraft.net";
const OPTIFINE_DOMAIN: &str = "optifine";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CapeKind {
    Minecon,
    Migrator,
    Translator,
    MojangEmployee,
    Legacy,
    Official,
    OptiFine,
    Unknown,
}

impl CapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            CapeKind::Minecon => "🎉 MINECON Cape",
            CapeKind::Migrator => "🔄 Migrator Cape",
            CapeKind::Translator => "🌐 Translator Cape",
            CapeKind::MojangEmployee => "🏢 Mojang Studios Cape",
            CapeKind::Legacy => "📜 Legacy Cape",
            CapeKind::Official => "✨ Official Minecraft Cape",
            CapeKind::OptiFine => "🧵 OptiFine Cape",
            CapeKind::Unknown => "❔ Unknown Cape",
        }
    }
}

type Predicate = fn(&str) -> bool;

fn is_official(url: &str) -> bool {
    url.contains(OFFICIAL_DOMAIN)
}

fn official_with(url: &str, marker: &str) -> bool {
    is_official(url) && url.contains(marker)
}

fn is_minecon(url: &str) -> bool {
    official_with(url, "minecon")
}

fn is_migrator(url: &str) -> bool {
    official_with(url, "migrator")
}

fn is_translator(url: &str) -> bool {
    official_with(url, "translator")
}

fn is_mojang_employee(url: &str) -> bool {
    official_with(url, "mojang")
}

fn is_legacy(url: &str) -> bool {
    official_with(url, "legacy") || official_with(url, "classic")
}

fn is_optifine(url: &str) -> bool {
    url.contains(OPTIFINE_DOMAIN)
}

/// Ordered (predicate, kind) rules; predicates receive the lowercased URL
const RULES: &[(Predicate, CapeKind)] = &[
    (is_minecon, CapeKind::Minecon),
    (is_migrator, CapeKind::Migrator),
    (is_translator, CapeKind::Translator),
    (is_mojang_employee, CapeKind::MojangEmployee),
    (is_legacy, CapeKind::Legacy),
    (is_official, CapeKind::Official),
    (is_optifine, CapeKind::OptiFine),
];

/// Classify a cape by its texture URL
pub fn classify_cape(url: &str) -> CapeKind {
    let url = url.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(url.as_str()))
        .map(|(_, kind)| *kind)
        .unwrap_or(CapeKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrator_before_official_fallback() {
        assert_eq!(
            classify_cape("https://minecraft.net/capes/migrator/x.png"),
            CapeKind::Migrator
        );
    }

    #[test]
    fn test_official_markers() {
        assert_eq!(
            classify_cape("https://textures.minecraft.net/minecon/2016.png"),
            CapeKind::Minecon
        );
        assert_eq!(
            classify_cape("https://textures.minecraft.net/Translator/cape.png"),
            CapeKind::Translator
        );
        assert_eq!(
            classify_cape("https://textures.minecraft.net/mojang/studios.png"),
            CapeKind::MojangEmployee
        );
        assert_eq!(
            classify_cape("https://textures.minecraft.net/legacy/cape.png"),
            CapeKind::Legacy
        );
    }

    #[test]
    fn test_official_hash_url_falls_back_to_generic() {
        assert_eq!(
            classify_cape(
                "http://textures.minecraft.net/texture/2340c0e03dd24a11b15a8b33c2a7e9e32abb2051b2481d0ba7defd635ca7a933"
            ),
            CapeKind::Official
        );
    }

    #[test]
    fn test_marker_outside_official_domain_is_ignored() {
        assert_eq!(
            classify_cape("http://s.optifine.net/capes/migrator.png"),
            CapeKind::OptiFine
        );
        assert_eq!(
            classify_cape("https://example.com/minecon.png"),
            CapeKind::Unknown
        );
    }

    #[test]
    fn test_first_match_wins() {
        // Contains both the event and migration markers
        assert_eq!(
            classify_cape("https://minecraft.net/minecon/migrator.png"),
            CapeKind::Minecon
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(CapeKind::Migrator.label(), "🔄 Migrator Cape");
        assert_eq!(CapeKind::Unknown.label(), "❔ Unknown Cape");
    }
}
