use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use pidcat_types::LogEntry;

/// `P/Tag( 1234): message` as printed by `logcat -v brief`
///
/// The tag runs up to the first `(`, the pid is the digits inside the
/// parentheses and the message starts after the first `:` that follows.
static BRIEF_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S)/([^(]*)\(\s*(\d+)\s*\):\s*(.*)").expect("brief line pattern is valid")
});

/// Parser for the brief logcat format
pub struct LogcatParser;

impl LogcatParser {
    /// Parse one raw line into a LogEntry
    ///
    /// Banner lines (`--------- beginning of main`), blank lines and
    /// continuation lines are rejected; callers are expected to drop them.
    pub fn parse(line: &str) -> Result<LogEntry, ParseError> {
        let caps = BRIEF_LINE.captures(line).ok_or(ParseError)?;

        let level = caps[1].trim().chars().next().ok_or(ParseError)?;

        Ok(LogEntry {
            level,
            tag: caps[2].trim().to_string(),
            pid: caps[3].trim().to_string(),
            message: caps[4].trim().to_string(),
        })
    }
}
