use std::io;

use pidcat_types::LogEntry;

/// Destination for entries that made it through the filter chain
pub trait EntryOutput {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<O: EntryOutput + ?Sized> EntryOutput for &mut O {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        (**self).emit(entry)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<O: EntryOutput> EntryOutput for Option<O> {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        match self {
            Some(output) => output.emit(entry),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Some(output) => output.flush(),
            None => Ok(()),
        }
    }
}

/// Collects entries in memory
impl EntryOutput for Vec<LogEntry> {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        self.push(entry.clone());
        Ok(())
    }
}

/// Sends every entry to two outputs, first then second
pub struct Tee<A, B>(pub A, pub B);

impl<A: EntryOutput, B: EntryOutput> EntryOutput for Tee<A, B> {
    fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        self.0.emit(entry)?;
        self.1.emit(entry)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()?;
        self.1.flush()
    }
}
