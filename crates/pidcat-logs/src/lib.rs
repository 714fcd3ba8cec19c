//! Log processing for pidcat
//!
//! This crate provides logcat line parsing, the filter chain, pid tracking
//! and the streaming pipeline that ties them to a running `adb logcat`.

mod error;
mod filter;
mod output;
mod parser;
mod pids;
mod sink;
mod stream;

pub use error::{ParseError, PipelineError};
pub use filter::{EntryFilter, Rejection};
pub use output::{EntryOutput, Tee};
pub use parser::LogcatParser;
pub use pids::{PidWatchdog, WatchedPids, POLL_INTERVAL};
pub use sink::PlainTextSink;
pub use stream::{LINE_QUEUE_CAPACITY, LogcatPipeline};

// Re-export types used in our public API
pub use pidcat_types::{LogEntry, Severity};
