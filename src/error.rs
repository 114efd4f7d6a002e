//! Error and diagnostic types for kindql.

use serde::Serialize;
use thiserror::Error;

use crate::ast::Span;

/// The main error type for kindql operations.
///
/// Problems found inside a query block are not errors in this sense; they are
/// collected as [`Diagnostic`]s so one pass can report all of them.
#[derive(Debug, Error)]
pub enum KindqlError {
    /// Failed to parse host source.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Generated query code could not be parsed back.
    #[error("Generated code does not parse: {0}")]
    Reparse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration.
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing generated text failed.
    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

impl KindqlError {
    /// Create a parse error at the given position.
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self::Parse {
            line: span.line,
            column: span.column,
            message: message.into(),
        }
    }
}

/// Result type alias for kindql operations.
pub type KindqlResult<T> = Result<T, KindqlError>;

/// Broad category of a compile diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Wrong argument count, type or position for a keyword.
    Shape,
    /// Unsupported keyword, operator or direction token.
    Vocabulary,
    /// Inequality, ordering, kindless-ancestor or cursor rule violation.
    Semantic,
    /// A named result type or one of its fields cannot be found.
    Resolution,
    /// Generated code could not be turned back into a syntax tree.
    Internal,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::Shape => write!(f, "shape"),
            DiagnosticKind::Vocabulary => write!(f, "vocabulary"),
            DiagnosticKind::Semantic => write!(f, "semantic"),
            DiagnosticKind::Resolution => write!(f, "resolution"),
            DiagnosticKind::Internal => write!(f, "internal"),
        }
    }
}

/// A compile problem attached to a source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Collects diagnostics for a whole compilation pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic at `span`.
    pub fn add(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        let message = message.into();
        tracing::debug!(%kind, line = span.line, column = span.column, "{}", message);
        self.entries.push(Diagnostic {
            kind,
            message,
            line: span.line,
            column: span.column,
        });
    }

    pub fn shape(&mut self, message: impl Into<String>, span: Span) {
        self.add(DiagnosticKind::Shape, message, span);
    }

    pub fn vocabulary(&mut self, message: impl Into<String>, span: Span) {
        self.add(DiagnosticKind::Vocabulary, message, span);
    }

    pub fn semantic(&mut self, message: impl Into<String>, span: Span) {
        self.add(DiagnosticKind::Semantic, message, span);
    }

    pub fn resolution(&mut self, message: impl Into<String>, span: Span) {
        self.add(DiagnosticKind::Resolution, message, span);
    }

    pub fn internal(&mut self, message: impl Into<String>, span: Span) {
        self.add(DiagnosticKind::Internal, message, span);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KindqlError::parse(Span::new(3, 7), "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at 3:7: unexpected character"
        );
    }

    #[test]
    fn test_diagnostics_collect_in_order() {
        let mut diags = Diagnostics::new();
        diags.shape("first", Span::new(1, 1));
        diags.semantic("second", Span::new(2, 5));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.count(DiagnosticKind::Semantic), 1);
        let rendered: Vec<String> = diags.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["1:1: first", "2:5: second"]);
    }

    #[test]
    fn test_diagnostics_serialize_as_list() {
        let mut diags = Diagnostics::new();
        diags.resolution("Can't resolve the type 'Person'", Span::new(4, 9));
        let json = serde_json::to_string(&diags).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"resolution","message":"Can't resolve the type 'Person'","line":4,"column":9}]"#
        );
    }
}
