//! Diagnostic tracing of pipeline stages
//!
//! A [`Tracer`] writes human-readable lines to a [`TraceSink`]: a banner before
//! each stage followed by one line per item the stage consumed or produced.
//! When disabled every method returns after a single boolean check, and the
//! pipeline guards its rendering loops with [`Tracer::is_enabled`] so nothing
//! is formatted at all.

use std::fmt::Display;
use std::time::Duration;

/// Delimiter line framing each banner title
pub const DELIMITER: &str = "================================";

/// Destination for trace lines. Append-only.
pub trait TraceSink {
    fn emit(&mut self, line: &str);
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn emit(&mut self, line: &str) {
        (**self).emit(line)
    }
}

/// Prints each line to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl TraceSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl TraceSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Forwards each line as a `tracing` event with target `kestrel::trace`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&mut self, line: &str) {
        tracing::info!(target: "kestrel::trace", "{line}");
    }
}

/// Per-run handle on a trace sink
pub struct Tracer<'s> {
    sink: Option<&'s mut dyn TraceSink>,
    sections: usize,
}

impl<'s> Tracer<'s> {
    /// A tracer that writes to `sink` when `enabled`
    pub fn new(enabled: bool, sink: &'s mut dyn TraceSink) -> Self {
        Tracer {
            sink: enabled.then_some(sink),
            sections: 0,
        }
    }

    /// A tracer that emits nothing
    pub fn disabled() -> Self {
        Tracer {
            sink: None,
            sections: 0,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn line(&mut self, line: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(line);
        }
    }

    pub fn lines<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        if let Some(sink) = self.sink.as_mut() {
            for item in items {
                sink.emit(&item.to_string());
            }
        }
    }

    /// Delimiter, title, delimiter, blank line; preceded by a blank line
    /// unless this is the first section of the run.
    pub fn banner(&mut self, title: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self.sections > 0 {
            sink.emit("");
        }
        sink.emit(DELIMITER);
        sink.emit(title);
        sink.emit(DELIMITER);
        sink.emit("");
        self.sections += 1;
    }

    /// Blank line, then the wall-clock time of the run in milliseconds
    pub fn elapsed(&mut self, elapsed: Duration) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit("");
            sink.emit(&format!(
                "Total execution time: {:.3}ms",
                elapsed.as_secs_f64() * 1000.0
            ));
        }
    }
}
