use pidcat_types::LogEntry;

use crate::colorizer::{DEFAULT_TAG_WIDTH, TagColorizer};
use crate::terminal;
use crate::text;
use crate::theme::Theme;

/// Width of the `" X "` level badge
pub const BADGE_WIDTH: usize = 3;

/// The message column never shrinks below this, even on tiny terminals
pub const MIN_MESSAGE_WIDTH: usize = 8;

/// Turns entries into full-width colored lines: tag, badge, message
pub struct EntryRenderer {
    tags: TagColorizer,

    /// Fixed line width; queried from the terminal when unset
    columns: Option<usize>,

    /// Plain lines carry no escape codes and keep the whole message
    color: bool,
}

impl EntryRenderer {
    pub fn new(tag_width: usize) -> Self {
        Self {
            tags: TagColorizer::new(tag_width),
            columns: None,
            color: true,
        }
    }

    /// Use a fixed line width instead of the terminal's
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Turn escape codes and message fitting on or off
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Current line width
    pub fn columns(&self) -> usize {
        self.columns.unwrap_or_else(terminal::columns)
    }

    /// Columns left for the message after the tag and badge
    pub fn message_width(&self) -> usize {
        self.columns()
            .saturating_sub(self.tags.width() + BADGE_WIDTH)
            .max(MIN_MESSAGE_WIDTH)
    }

    /// Render one entry as a printable line (no trailing newline)
    pub fn render(&mut self, entry: &LogEntry) -> String {
        if !self.color {
            return self.render_plain(entry);
        }

        let tag = self.tags.render(&entry.tag);
        let badge = Theme::badge(entry.severity()).apply(format!(" {} ", entry.level));
        let message = Theme::message().apply(self.message_field(&entry.message));
        format!("{tag}{badge}{message}")
    }

    /// Uncolored line for pipes and files: aligned tag, badge, full message
    fn render_plain(&self, entry: &LogEntry) -> String {
        let tag = self.tags.layout(&entry.tag);
        let space = if entry.message.starts_with(' ') { "" } else { " " };
        format!("{tag} {} {space}{}", entry.level, entry.message)
    }

    /// Message text padded or cut to exactly the message width
    fn message_field(&self, message: &str) -> String {
        let max = self.message_width();
        let message = if message.starts_with(' ') {
            message.to_string()
        } else {
            format!(" {message}")
        };

        if text::width(&message) > max {
            text::ellipsize(&message, max)
        } else {
            text::pad_right(&message, max)
        }
    }
}

impl Default for EntryRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_WIDTH)
    }
}
