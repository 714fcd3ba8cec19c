use std::io::{self, Stdout, Write};

use pidcat_logs::EntryOutput;
use pidcat_types::LogEntry;

use crate::render::EntryRenderer;

/// Writes rendered entries to a terminal (or any writer)
pub struct TerminalOutput<W = Stdout> {
    renderer: EntryRenderer,
    writer: W,
}

impl TerminalOutput<Stdout> {
    pub fn stdout(renderer: EntryRenderer) -> Self {
        Self::new(renderer, io::stdout())
    }
}

impl<W: Write> TerminalOutput<W> {
    pub fn new(renderer: EntryRenderer, writer: W) -> Self {
        Self { renderer, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EntryOutput for TerminalOutput<W> {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        let line = self.renderer.render(entry);
        writeln!(self.writer, "{line}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
