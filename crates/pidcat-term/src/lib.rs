//! Terminal rendering for pidcat
//!
//! This crate turns filtered log entries into fixed-width, color-coded
//! terminal lines: a right-aligned tag, a level badge and the message.

mod colorizer;
mod output;
mod render;
mod terminal;
mod text;
mod theme;

pub use colorizer::{DEFAULT_TAG_WIDTH, MIN_TAG_WIDTH, TagColorizer};
pub use output::TerminalOutput;
pub use render::{BADGE_WIDTH, EntryRenderer, MIN_MESSAGE_WIDTH};
pub use terminal::{FALLBACK_COLUMNS, color_enabled, columns};
pub use theme::Theme;
