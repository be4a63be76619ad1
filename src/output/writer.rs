//! Line writer that flushes after every marker.

use std::io::{self, Stdout, Write};

use crate::output::Marker;

/// Writes markers one per line, flushing each before returning.
///
/// Observers read the stream incrementally, so a marker sitting in a buffer
/// is indistinguishable from a marker that was never written.
pub struct MarkerWriter<W: Write> {
    inner: W,
}

impl MarkerWriter<Stdout> {
    /// Writer bound to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> MarkerWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write `marker` followed by a newline and flush.
    pub fn emit(&mut self, marker: Marker) -> io::Result<()> {
        writeln!(self.inner, "{marker}")?;
        self.inner.flush()?;
        tracing::debug!(%marker, "Marker emitted");
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
