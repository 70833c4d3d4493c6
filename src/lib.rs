//! Minecraft cosmetics helpers for a Discord bot
//!
//! - [`skins`]: Mojang lookups (username → UUID, session profile, name history)
//!   behind a bounded, sliding-TTL [`cache::ProfileCache`]
//! - [`discord::embed`]: paged cosmetics embeds
//! - [`logger`]: console logging with optional channel/webhook delivery

pub mod cache;
pub mod config;
pub mod discord;
pub mod error;
pub mod logger;
pub mod skins;
pub mod state;
pub mod utils;

pub use cache::ProfileCache;
pub use config::Config;
pub use discord::embed::{build_display, build_profile_display};
pub use error::{AppError, AppResult};
pub use logger::{Logger, Severity, Sink};
pub use skins::{classify_cape, MojangEndpoints, PlayerProfile, ProfileData, ProfileFetcher};
pub use state::AppState;
