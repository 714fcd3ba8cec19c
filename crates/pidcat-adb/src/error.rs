use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the adb binary
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("{} not found", .0.display())]
    BinaryNotFound(PathBuf),

    #[error("{command}: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("{command}: timeout")]
    Timeout { command: String },

    #[error("could not parse 'adb version' output: {0}")]
    UnparsableVersion(String),

    #[error("error parsing dumpsys output, do you have an app open?")]
    NoForegroundApp,

    #[error("no pid for '{0}' found")]
    NoPid(String),
}

impl AdbError {
    pub fn failed(command: impl Into<String>, reason: impl ToString) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.to_string(),
        }
    }
}
