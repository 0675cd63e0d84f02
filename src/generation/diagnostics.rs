//! Diagnostics sink for the parsing pipeline
//!
//! Parsers never log directly. They emit through an injected [`DiagnosticsSink`]
//! so the pipeline stays observable in tests without global logging state.
//! The binary wires up [`TracingSink`], which forwards to `tracing`.

use std::fmt;
use std::sync::Mutex;

/// Severity of a pipeline diagnostic.
///
/// `Warning` marks degradations that affect generated output (dropped
/// parameters, unknown content types). `Info` covers notable but harmless
/// events (renames, counts). `Debug` covers expected skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic emitted by the pipeline.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Observable side channel for parser diagnostics.
///
/// Diagnostics never alter parsing decisions; they only report them.
pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Severity-shaped helpers for any sink, including `dyn DiagnosticsSink`.
pub trait SinkExt {
    fn debug(&self, message: impl Into<String>);
    fn info(&self, message: impl Into<String>);
    fn warn(&self, message: impl Into<String>);
}

impl<S: DiagnosticsSink + ?Sized> SinkExt for S {
    fn debug(&self, message: impl Into<String>) {
        self.emit(Diagnostic {
            severity: Severity::Debug,
            message: message.into(),
        });
    }

    fn info(&self, message: impl Into<String>) {
        self.emit(Diagnostic {
            severity: Severity::Info,
            message: message.into(),
        });
    }

    fn warn(&self, message: impl Into<String>) {
        self.emit(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }
}

/// Production sink forwarding to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Debug => tracing::debug!("{}", diagnostic.message),
            Severity::Info => tracing::info!("{}", diagnostic.message),
            Severity::Warning => tracing::warn!("{}", diagnostic.message),
        }
    }
}

/// Collecting sink for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn collected(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages at the given severity, in emission order.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.collected()
            .into_iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.message)
            .collect()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_collecting_sink_records_in_order() {
        let sink = CollectingSink::new();
        sink.warn("first");
        sink.debug("second");
        sink.info("third");

        let all = sink.collected();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].severity, Severity::Warning);
        assert_eq!(all[0].message, "first");
        assert_eq!(all[2].severity, Severity::Info);
    }

    #[test]
    fn test_messages_filters_by_severity() {
        let sink = CollectingSink::new();
        sink.warn("dropped parameter");
        sink.debug("skipping key");
        sink.warn("unknown content type");

        assert_eq!(
            sink.messages(Severity::Warning),
            vec!["dropped parameter", "unknown content type"]
        );
        assert_eq!(sink.messages(Severity::Debug), vec!["skipping key"]);
    }

    #[test]
    fn test_sink_ext_through_dyn() {
        let sink = Arc::new(CollectingSink::new());
        let dynamic: Arc<dyn DiagnosticsSink> = sink.clone();
        dynamic.warn("via arc");

        assert_eq!(sink.messages(Severity::Warning), vec!["via arc"]);
    }
}
