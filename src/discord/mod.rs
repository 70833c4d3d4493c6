pub mod channel;
pub mod embed;
pub mod webhook;

use serde::{Deserialize, Serialize};

// Embed colors
pub const COLOR_GREEN: u32 = 0x22c55e;
pub const COLOR_RED: u32 = 0xef4444;
pub const COLOR_BLUE: u32 = 0x3b82f6;
pub const COLOR_ORANGE: u32 = 0xf97316;
pub const COLOR_PURPLE: u32 = 0x8b5cf6;
pub const COLOR_DARK_RED: u32 = 0x991b1b;

/// Discord rejects embeds beyond these sizes
pub const MAX_FIELD_VALUE: usize = 1024;
pub const MAX_FIELDS: usize = 25;
pub const MAX_DESCRIPTION: usize = 4096;
/// Sum of title, description, footer and field text
pub const MAX_EMBED_TOTAL: usize = 6000;

/// Label used for continuation fields; renders as nothing
pub const BLANK_FIELD_NAME: &str = "\u{200b}";

/// Bot name and avatar shown on webhook messages
pub const BOT_NAME: &str = "Cosmetics Bot";
pub const AVATAR_URL: &str = "https://mc-heads.net/avatar/MHF_Steve/128";

/// Embed as sent to Discord (channel messages and webhooks share the shape)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: Some(title.into()),
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Clamp the embed to Discord's size limits
    pub fn truncate_to_limits(&mut self) {
        if let Some(description) = &mut self.description {
            if description.chars().count() > MAX_DESCRIPTION {
                *description = truncate_chars(description, MAX_DESCRIPTION);
            }
        }
        if self.fields.len() > MAX_FIELDS {
            tracing::debug!("Dropping {} embed fields over the limit", self.fields.len() - MAX_FIELDS);
            self.fields.truncate(MAX_FIELDS);
        }

        // Trailing fields go first; the description is cut only if still over
        let mut dropped = 0;
        while self.total_chars() > MAX_EMBED_TOTAL && !self.fields.is_empty() {
            self.fields.pop();
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!("Dropped {} embed fields over the total size limit", dropped);
        }

        let excess = self.total_chars().saturating_sub(MAX_EMBED_TOTAL);
        if excess > 0 {
            if let Some(description) = &mut self.description {
                let keep = description.chars().count().saturating_sub(excess);
                *description = truncate_chars(description, keep);
            }
        }
    }

    /// Characters counted against Discord's total embed size
    pub fn total_chars(&self) -> usize {
        let count = |s: &Option<String>| s.as_deref().map_or(0, |s| s.chars().count());
        count(&self.title)
            + count(&self.description)
            + self.footer.as_ref().map_or(0, |f| f.text.chars().count())
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
    }
}

/// Cut a string to at most `max` characters, marking the cut with an ellipsis
pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
