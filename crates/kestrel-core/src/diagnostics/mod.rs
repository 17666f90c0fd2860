//! Source-anchored rendering of pipeline errors
//!
//! Spans are byte ranges; [`LineIndex`] maps them to 1-indexed lines and
//! columns so the CLI can show the offending line with a caret underneath.

use crate::ast::Span;

/// Diagnostic kind/category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Syntax,
    Compile,
    Runtime,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Compile => "compile",
            DiagnosticKind::Runtime => "runtime",
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<Span>,
    pub filename: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(
        kind: DiagnosticKind,
        message: impl Into<String>,
        span: Option<Span>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            filename: filename.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Format the diagnostic with source code snippet
    pub fn format(&self, source: &str) -> String {
        let mut output = format!("error[{}]: {}\n", self.kind.as_str(), self.message);

        match self.span {
            Some(span) => {
                let line_index = LineIndex::new(source);
                let (line, col) = line_index.line_col(source, span.start);
                output.push_str(&format!("  --> {}:{}:{}\n", self.filename, line, col));
                output.push_str(&format_snippet(source, &line_index, span));
            }
            None => output.push_str(&format!("  --> {}\n", self.filename)),
        }

        for note in &self.notes {
            output.push_str(&format!("  = note: {note}\n"));
        }

        output
    }
}

/// Start offsets of every line, for mapping byte offsets to positions
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-indexed (line, column) of a byte offset; the column counts characters
    pub fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        // line_starts[0] is 0, so at least one start precedes any offset
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let prefix = source
            .get(self.line_starts[line]..offset.min(source.len()))
            .unwrap_or("");
        (line + 1, prefix.chars().count() + 1)
    }

    /// Byte range of a 1-indexed line, without its newline
    pub fn line_range(&self, line: usize, source_len: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(source_len, |next| next - 1);
        Some((start, end))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

fn format_snippet(source: &str, line_index: &LineIndex, span: Span) -> String {
    let (line, col) = line_index.line_col(source, span.start);
    let Some((start, end)) = line_index.line_range(line, source.len()) else {
        return String::new();
    };
    let line_text = source.get(start..end).unwrap_or("").trim_end_matches('\r');
    let width = line.to_string().len();

    // Underline at most to the end of the first line.
    let span_end = span.end.min(end).max(span.start);
    let underline = source
        .get(span.start.min(end)..span_end)
        .map(|s| s.chars().count())
        .unwrap_or(0)
        .max(1);

    let mut output = String::new();
    output.push_str(&format!("{:width$} |\n", ""));
    output.push_str(&format!("{line:width$} | {line_text}\n"));
    output.push_str(&format!(
        "{:width$} | {}^{}\n",
        "",
        " ".repeat(col - 1),
        "~".repeat(underline - 1)
    ));
    output
}
