//! Run-log sink.
//!
//! The run log is the human-readable record of a run. It is shown live to
//! the operator and copied verbatim into the keyword report, so every line
//! goes through a [`LogSink`]. [`RunLog`] buffers lines for headless use;
//! [`ConsoleSink`] prints them as they arrive and keeps a buffer too.

use std::io::Write;

/// Role of a line in the report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Info,
    /// Opens a per-post section.
    Section,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

impl LogLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Info,
            text: text.into(),
        }
    }

    pub fn section(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Section,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Warning,
            text: text.into(),
        }
    }
}

/// Destination for run-log lines.
pub trait LogSink: Send {
    fn append(&mut self, line: &LogLine);
}

/// Append-only, in-memory run log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    lines: Vec<LogLine>,
}

impl RunLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Line texts in order, without kinds.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LogSink for RunLog {
    fn append(&mut self, line: &LogLine) {
        self.lines.push(line.clone());
    }
}

/// Writes each line to a terminal-like writer as it arrives.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    log: RunLog,
}

impl ConsoleSink<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            log: RunLog::new(),
        }
    }

    #[must_use]
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn into_inner(self) -> (W, RunLog) {
        (self.out, self.log)
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn append(&mut self, line: &LogLine) {
        let written = match line.kind {
            LineKind::Section => writeln!(self.out, "\n{}", line.text),
            LineKind::Info | LineKind::Warning => writeln!(self.out, "{}", line.text),
        };
        if let Err(e) = written.and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write run log line to console");
        }
        self.log.append(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_log_keeps_order() {
        let mut log = RunLog::new();
        log.append(&LogLine::info("one"));
        log.append(&LogLine::section("two"));
        log.append(&LogLine::warning("three"));
        assert_eq!(log.texts().collect::<Vec<_>>(), vec!["one", "two", "three"]);
        assert_eq!(log.lines()[1].kind, LineKind::Section);
    }

    #[test]
    fn console_sink_writes_and_buffers() {
        let mut sink = ConsoleSink::new(Vec::<u8>::new());
        sink.append(&LogLine::info("collecting posts"));
        sink.append(&LogLine::section("Post 1/1"));
        let (out, log) = sink.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "collecting posts\n\nPost 1/1\n");
        assert_eq!(log.len(), 2);
    }
}
