pub mod calendar;
pub mod config;
pub mod session;
pub mod settings;
pub mod stats;
pub mod supabase;

pub use calendar::{CalendarPanel, EmbedOptions, ViewMode, build_embed_url, resolve_identifier};
pub use settings::Settings;
