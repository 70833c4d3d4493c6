//! Cosmetics embed rendering
//!
//! Pure transforms over already-fetched profile data; nothing here touches the network.

use crate::discord::{Embed, EmbedField, EmbedFooter, EmbedMedia, COLOR_PURPLE};
use crate::skins::{
    avatar_url, body_render_url, namemc_url, page_count, skin_download_url, CapeDescriptor,
    Cosmetic, NameRecord, PlayerIdentity, PlayerProfile, ITEMS_PER_PAGE,
};

pub const PORTRAIT_FIELD: &str = "🖼️ Portrait";
pub const CAPES_FIELD: &str = "🧣 Active Capes";
pub const COSMETICS_FIELD: &str = "✨ Cosmetics";
pub const LINKS_FIELD: &str = "🔗 Useful Links";
pub const NAME_HISTORY_FIELD: &str = "📛 Name History";

/// Names listed in the history field before it is cut off
const MAX_HISTORY_ENTRIES: usize = 10;

/// Items of `items` shown on zero-based page `page_index`; empty when out of range
pub fn page_window<T>(items: &[T], page_index: usize) -> &[T] {
    let start = page_index.saturating_mul(ITEMS_PER_PAGE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + ITEMS_PER_PAGE).min(items.len());
    &items[start..end]
}

/// Build the cosmetics embed for one page
///
/// Capes and cosmetics are paged independently with the same page index.
pub fn build_display(
    identity: &PlayerIdentity,
    capes: &[CapeDescriptor],
    cosmetics: &[Cosmetic],
    page_index: usize,
) -> Embed {
    let body_url = body_render_url(&identity.uuid, 256);

    let mut embed = Embed::new(format!("{}'s Cosmetics", identity.username), COLOR_PURPLE);
    embed.url = Some(namemc_url(&identity.uuid));
    embed.image = Some(EmbedMedia {
        url: body_url.clone(),
    });
    embed.thumbnail = Some(EmbedMedia {
        url: avatar_url(&identity.uuid, 128),
    });

    embed.fields.push(EmbedField::new(
        PORTRAIT_FIELD,
        format!("[Full body render]({})", body_url),
        false,
    ));

    let cape_page = page_window(capes, page_index);
    if !cape_page.is_empty() {
        let value = cape_page
            .iter()
            .map(|cape| format!("[{}]({})", cape.label, cape.url))
            .collect::<Vec<_>>()
            .join("\n");
        embed.fields.push(EmbedField::new(CAPES_FIELD, value, true));
    }

    let cosmetic_page = page_window(cosmetics, page_index);
    if !cosmetic_page.is_empty() {
        let value = cosmetic_page
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        embed.fields.push(EmbedField::new(COSMETICS_FIELD, value, true));
    }

    embed.fields.push(EmbedField::new(
        LINKS_FIELD,
        format!(
            "[NameMC]({}) • [Skin]({}) • [Head]({})",
            namemc_url(&identity.uuid),
            skin_download_url(&identity.uuid),
            avatar_url(&identity.uuid, 512)
        ),
        false,
    ));

    let total_pages = page_count(capes.len() + cosmetics.len()).max(1);
    embed.footer = Some(EmbedFooter {
        text: format!(
            "Page {}/{} • {}",
            page_index.saturating_add(1),
            total_pages,
            identity.uuid.hyphenated()
        ),
    });

    embed
}

/// Cosmetics embed for a full profile; the first page also lists past names
pub fn build_profile_display(profile: &PlayerProfile, page_index: usize) -> Embed {
    let mut embed = build_display(
        &profile.identity(),
        &profile.capes,
        &profile.cosmetics,
        page_index,
    );

    if page_index == 0 && profile.name_history.len() > 1 {
        let history = format_name_history(&profile.name_history);
        // Keep the links section last
        let at = embed.fields.len().saturating_sub(1);
        embed
            .fields
            .insert(at, EmbedField::new(NAME_HISTORY_FIELD, history, false));
    }

    embed.truncate_to_limits();
    embed
}

fn format_name_history(history: &[NameRecord]) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .take(MAX_HISTORY_ENTRIES)
        .map(|record| match record.changed_at() {
            Some(at) => format!("`{}` • {}", record.name, at.format("%Y-%m-%d")),
            None => format!("`{}` • original", record.name),
        })
        .collect();

    if history.len() > MAX_HISTORY_ENTRIES {
        lines.push(format!("…and {} more", history.len() - MAX_HISTORY_ENTRIES));
    }
    lines.join("\n")
}
