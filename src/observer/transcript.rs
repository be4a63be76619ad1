//! Captured stdout of an observed process.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::output::Marker;

/// One line read from the observed stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedLine {
    pub text: String,
    pub at: Instant,
    /// `None` when the line is not part of the marker vocabulary.
    pub marker: Option<Marker>,
}

impl ObservedLine {
    pub fn new(text: String, at: Instant) -> Self {
        let marker = text.parse().ok();
        Self { text, at, marker }
    }
}

/// Every line read so far, in arrival order.
#[derive(Debug, Clone)]
pub struct Transcript {
    started: Instant,
    lines: Vec<ObservedLine>,
}

impl Transcript {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: ObservedLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[ObservedLine] {
        &self.lines
    }

    /// Marker lines only, with their parsed markers.
    pub fn markers(&self) -> impl Iterator<Item = (&ObservedLine, Marker)> {
        self.lines
            .iter()
            .filter_map(|line| line.marker.map(|marker| (line, marker)))
    }

    /// Time from launch to `line`.
    pub fn offset(&self, line: &ObservedLine) -> Duration {
        line.at.saturating_duration_since(self.started)
    }

    /// One line per entry, prefixed with its offset from launch.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let _ = writeln!(out, "[+{:>5}ms] {}", self.offset(line).as_millis(), line.text);
        }
        out
    }
}
