//! Diagnostic Sinks
//!
//! The hub reports what it does to a [`DiagnosticSink`]. Each call carries
//! one or more printable parts; calls arrive in the order the hub loop
//! observed the underlying events.
//!
//! - [`NoopSink`]: discards everything (the default)
//! - [`RecordingSink`]: keeps every line in memory for inspection
//! - [`TracingSink`]: forwards lines to `tracing` at debug level
//! - [`WriterSink`]: writes one line per call to any `io::Write`

use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives trace notifications from the hub
pub trait DiagnosticSink: Send + Sync {
    /// Record one notification made of the given parts
    fn trace(&self, parts: &[&dyn fmt::Display]);
}

/// Concatenate parts into a single line
pub fn render(parts: &[&dyn fmt::Display]) -> String {
    let mut line = String::new();
    for part in parts {
        // Writing into a String cannot fail.
        let _ = write!(line, "{}", part);
    }
    line
}

/// Sink that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn trace(&self, _parts: &[&dyn fmt::Display]) {}
}

/// Sink that stores rendered lines in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded lines containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn trace(&self, parts: &[&dyn fmt::Display]) {
        let line = render(parts);
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}

/// Sink that emits each notification as a `tracing` debug event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn trace(&self, parts: &[&dyn fmt::Display]) {
        tracing::debug!(target: "fanhub::diagnostics", "{}", render(parts));
    }
}

/// Sink that writes one line per notification
pub struct WriterSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn trace(&self, parts: &[&dyn fmt::Display]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", render(parts)) {
            tracing::warn!(error = %e, "Failed to write diagnostic line");
        }
    }
}

/// Which sink to install, as named in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Off,
    Tracing,
    Stdout,
}

impl SinkKind {
    /// Build the sink this kind names
    pub fn build(self) -> Arc<dyn DiagnosticSink> {
        match self {
            SinkKind::Off => Arc::new(NoopSink),
            SinkKind::Tracing => Arc::new(TracingSink),
            SinkKind::Stdout => Arc::new(WriterSink::new(std::io::stdout())),
        }
    }
}

impl std::str::FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(SinkKind::Off),
            "tracing" | "log" => Ok(SinkKind::Tracing),
            "stdout" => Ok(SinkKind::Stdout),
            other => Err(format!("unknown diagnostics sink: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_concatenates() {
        let count = 3;
        assert_eq!(render(&[&"sent to ", &count, &" clients"]), "sent to 3 clients");
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.trace(&[&"first"]);
        sink.trace(&[&"second ", &2]);

        assert_eq!(sink.lines(), vec!["first", "second 2"]);
        assert_eq!(sink.count_containing("second"), 1);
    }

    #[test]
    fn test_writer_sink_writes_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.trace(&[&"hello"]);
        sink.trace(&[&"world"]);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "hello\nworld\n");
    }

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!("off".parse::<SinkKind>(), Ok(SinkKind::Off));
        assert_eq!("STDOUT".parse::<SinkKind>(), Ok(SinkKind::Stdout));
        assert!("syslog".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_noop_is_default_kind() {
        assert_eq!(SinkKind::default(), SinkKind::Off);
    }
}
