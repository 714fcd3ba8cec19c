use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;

use crate::output::EntryOutput;
use pidcat_types::LogEntry;

/// Appends `level:tag:message` lines to a file
pub struct PlainTextSink {
    writer: LineWriter<File>,
}

impl PlainTextSink {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path)?;
        Ok(Self {
            writer: LineWriter::new(file),
        })
    }
}

impl EntryOutput for PlainTextSink {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        writeln!(self.writer, "{}:{}:{}", entry.level, entry.tag, entry.message)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
