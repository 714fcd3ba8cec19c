use std::collections::{HashMap, VecDeque};

use crossterm::style::{Color, StyledContent};

use crate::text;
use crate::theme::Theme;

/// Default on-screen width of the tag column
pub const DEFAULT_TAG_WIDTH: usize = 20;

/// Narrowest tag column that still leaves room for the ellipsis
pub const MIN_TAG_WIDTH: usize = 8;

/// Gives every tag a color on first sight and keeps it for the whole run
///
/// Colors come from a ring: a new tag takes the color at the front, which
/// then moves to the back. Once more tags than colors have been seen, tags
/// start sharing colors.
///
/// Owned by the render stage; not meant to be shared between tasks.
#[derive(Debug)]
pub struct TagColorizer {
    width: usize,
    palette: VecDeque<Color>,
    assigned: HashMap<String, Color>,
}

impl TagColorizer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(MIN_TAG_WIDTH),
            palette: Theme::TAG_PALETTE.into_iter().collect(),
            assigned: HashMap::new(),
        }
    }

    /// Column width of a rendered tag
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of distinct tags seen so far
    pub fn seen(&self) -> usize {
        self.assigned.len()
    }

    /// Color for `key`, taking the next one from the ring if it's new
    pub fn assign_or_lookup(&mut self, key: &str) -> Color {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }

        let color = match self.palette.pop_front() {
            Some(color) => {
                self.palette.push_back(color);
                color
            }
            None => Theme::FG,
        };
        self.assigned.insert(key.to_string(), color);
        color
    }

    /// Render `tag` right-aligned in exactly `width` columns, in its color
    pub fn render(&mut self, tag: &str) -> StyledContent<String> {
        let key = with_trailing_space(tag);
        let field = self.field(&key);
        let color = self.assign_or_lookup(&key);
        Theme::tag(color).apply(field)
    }

    /// The same fixed-width field as `render`, without a color
    pub fn layout(&self, tag: &str) -> String {
        self.field(&with_trailing_space(tag))
    }

    /// Fixed-width text for a tag that already ends in a space
    fn field(&self, key: &str) -> String {
        if text::width(key) > self.width {
            format!(" {}", text::ellipsize(key, self.width - 1))
        } else {
            text::pad_left(key, self.width)
        }
    }
}

impl Default for TagColorizer {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_WIDTH)
    }
}

/// Keep one-letter tags apart from the badge that follows them
fn with_trailing_space(tag: &str) -> String {
    if tag.ends_with(' ') {
        tag.to_string()
    } else {
        format!("{tag} ")
    }
}
