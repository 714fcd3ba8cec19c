//! adb client for pidcat
//!
//! This crate wraps the `adb` binary: locating it, listing processes and
//! packages, and building the `logcat` command line the pipeline runs.

mod client;
mod error;
mod ps;

pub use client::{AdbClient, PidResolver};
pub use error::AdbError;
pub use ps::parse_processes;

// Re-export types that are used in our public API
pub use pidcat_types::{Connection, ProcessInfo};
