use serde::{Deserialize, Serialize};
use std::fmt;
use stencil_parser::ast::Span;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Info => write!(f, "info"),
        }
    }
}

/// Where a marker usage was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub span: Span,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// Static description of one kind of diagnostic
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message with a `{0}` placeholder for the target type
    pub message_format: &'static str,
    pub level: DiagnosticLevel,
}

impl DiagnosticDescriptor {
    /// Trailing two-digit check number of the identifier, e.g. `01` for `STN0201`
    pub fn check_number(&self) -> &'static str {
        let id: &'static str = self.id;
        id.get(id.len().saturating_sub(2)..).unwrap_or("")
    }

    pub fn format_message(&self, target: &str) -> String {
        self.message_format.replace("{0}", target)
    }

    /// Bind this descriptor to a usage site
    pub fn create(&self, location: Location, target: impl Into<String>) -> Diagnostic {
        let target = target.into();
        Diagnostic {
            level: self.level,
            id: self.id.to_string(),
            message: self.format_message(&target),
            location,
            target,
            suggestion: None,
        }
    }
}

/// A diagnostic reported for one marker usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// Stable identifier, e.g. `STN0201`
    pub id: String,

    pub message: String,

    /// Location of the offending marker annotation
    pub location: Location,

    /// Display name of the target type
    pub target: String,

    /// Optional detail on how to fix the issue
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}: {}", self.location, self.level, self.id, self.message)
    }
}

/// Ordered collection of the diagnostics of one pass.
///
/// Diagnostics are kept in the order they are reported; nothing is merged,
/// deduplicated or escalated.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn report(&mut self, descriptor: &DiagnosticDescriptor, location: Location, target: &str) {
        self.push(descriptor.create(location, target));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
