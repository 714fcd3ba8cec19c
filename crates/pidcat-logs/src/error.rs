use std::io;

use thiserror::Error;

use pidcat_adb::AdbError;

/// A line that doesn't have the `P/Tag(pid): message` shape
#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse logcat line")]
pub struct ParseError;

/// Fatal pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("empty logcat command")]
    EmptyCommand,

    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("logcat stdout was not captured")]
    MissingStdout,

    #[error("reading logcat output: {0}")]
    Read(#[source] io::Error),

    #[error("waiting for logcat: {0}")]
    Wait(#[source] io::Error),

    #[error(transparent)]
    Resolution(#[from] AdbError),

    #[error("writing output: {0}")]
    Output(#[source] io::Error),

    #[error("pipeline task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
