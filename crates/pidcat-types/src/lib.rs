//! Shared types for pidcat
//!
//! This crate contains data structures used across multiple pidcat crates.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// Device Types
// ============================================================================

/// How adb selects the device to talk to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    /// A specific device by serial number (`adb -s <serial>`)
    Serial(String),
    /// The only connected physical device (`adb -d`)
    Device,
    /// The only running emulator (`adb -e`)
    Emulator,
}

impl Connection {
    /// Command-line arguments selecting this connection
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Serial(serial) => vec!["-s".to_string(), serial.clone()],
            Self::Device => vec!["-d".to_string()],
            Self::Emulator => vec!["-e".to_string()],
        }
    }
}

/// One row of `adb shell ps` output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
    pub user: String,
    pub pid: String,
    pub ppid: String,
    pub vsz: String,
    pub rss: String,
    pub wchan: String,
    pub addr: String,
    pub state: String,
    pub name: String,
}

// ============================================================================
// Log Types
// ============================================================================

/// Logcat priority, ordered from least to most severe
///
/// `Unranked` stands in for any code logcat is not known to emit and sorts
/// below everything else. `Silent` is only meaningful as a filter floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Unranked,
    #[default]
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Silent,
}

impl Severity {
    /// Map a priority character to its rank; codes are case-sensitive
    pub fn from_code(code: char) -> Self {
        match code {
            'V' => Self::Verbose,
            'D' => Self::Debug,
            'I' => Self::Info,
            'W' => Self::Warning,
            'E' => Self::Error,
            'F' => Self::Fatal,
            'S' => Self::Silent,
            _ => Self::Unranked,
        }
    }

    /// Priority character for this rank (`?` for unranked)
    pub fn code(&self) -> char {
        match self {
            Self::Unranked => '?',
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warning => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
            Self::Silent => 'S',
        }
    }

    /// Whether an entry of this rank passes a `minimum` floor.
    ///
    /// A `Verbose` floor is the trivial filter and lets everything through,
    /// unranked codes included. Any higher floor drops unranked codes.
    pub fn is_in_scope(&self, minimum: Severity) -> bool {
        minimum <= Self::Verbose || *self >= minimum
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when a minimum level argument is not a known priority
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid level '{0}', expected one of V, D, I, W, E, F, S")]
pub struct InvalidSeverity(pub String);

impl FromStr for Severity {
    type Err = InvalidSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => match Self::from_code(code.to_ascii_uppercase()) {
                Self::Unranked => Err(InvalidSeverity(s.to_string())),
                severity => Ok(severity),
            },
            _ => Err(InvalidSeverity(s.to_string())),
        }
    }
}

/// A single parsed logcat line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Priority character as it appeared in the line
    pub level: char,

    /// Source tag (may be empty)
    pub tag: String,

    /// Process id, kept textual
    pub pid: String,

    /// Message body
    pub message: String,
}

impl LogEntry {
    pub fn new(
        level: char,
        tag: impl Into<String>,
        pid: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            tag: tag.into(),
            pid: pid.into(),
            message: message.into(),
        }
    }

    /// Rank of this entry's priority
    pub fn severity(&self) -> Severity {
        Severity::from_code(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [Severity; 6] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    #[test]
    fn test_in_scope_is_reflexive() {
        for level in ORDER {
            assert!(level.is_in_scope(level), "{level} should pass its own floor");
        }
    }

    #[test]
    fn test_in_scope_follows_total_order() {
        for (i, entry) in ORDER.iter().enumerate() {
            for (j, minimum) in ORDER.iter().enumerate() {
                assert_eq!(entry.is_in_scope(*minimum), i >= j, "{entry} vs {minimum}");
            }
        }
    }

    #[test]
    fn test_unranked_only_passes_trivial_floor() {
        let unknown = Severity::from_code('X');
        assert_eq!(unknown, Severity::Unranked);
        assert!(unknown.is_in_scope(Severity::Verbose));
        assert!(!unknown.is_in_scope(Severity::Debug));
        assert!(!unknown.is_in_scope(Severity::Fatal));
    }

    #[test]
    fn test_silent_floor_drops_everything() {
        for level in ORDER {
            assert!(!level.is_in_scope(Severity::Silent));
        }
    }

    #[test]
    fn test_parse_min_level() {
        assert_eq!("w".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" E ".parse::<Severity>(), Ok(Severity::Error));
        assert!("X".parse::<Severity>().is_err());
        assert!("WARN".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn test_connection_args() {
        assert_eq!(Connection::Serial("abc".into()).args(), vec!["-s", "abc"]);
        assert_eq!(Connection::Device.args(), vec!["-d"]);
        assert_eq!(Connection::Emulator.args(), vec!["-e"]);
    }

    #[test]
    fn test_entry_severity() {
        let entry = LogEntry::new('W', "Tag", "12", "msg");
        assert_eq!(entry.severity(), Severity::Warning);
    }

    #[test]
    fn test_lowercase_code_in_stream_is_unranked() {
        assert_eq!(Severity::from_code('w'), Severity::Unranked);
        let entry = LogEntry::new('e', "Tag", "12", "msg");
        assert_eq!(entry.severity(), Severity::Unranked);
        assert!(!entry.severity().is_in_scope(Severity::Debug));
    }
}
