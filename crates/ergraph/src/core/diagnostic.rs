//! Non-fatal extraction diagnostics
//!
//! Extraction is best-effort: anything that does not match the expected shape is
//! skipped. Rather than dropping that information on the floor, extractors push a
//! [`Diagnostic`] describing what was skipped so callers can surface it.

use serde::Serialize;
use std::fmt;

/// How much a diagnostic matters to the person reading the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What was skipped or degraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The file carries the entity suffix but has no decorated entity class
    NotAnEntity,
    /// The file carries the enum suffix but declares no enum
    NotAnEnum,
    /// A marker decorator was not followed by a property declaration
    MissingProperty { decorator: String },
    /// A relationship decorator whose arguments do not reference a target type
    UnparsedRelationship { decorator: String, property: String },
    /// An embedded column (`@Column(() => Type)`) is not a scalar field
    EmbeddedColumnSkipped { property: String },
    /// More than one primary-key field was registered
    MultiplePrimaryKeys { names: Vec<String> },
    /// A raw type fell back to a generic token
    TypeFallback {
        field: String,
        raw: String,
        token: String,
    },
    /// An edge whose endpoint entity was never extracted
    DanglingRelationship {
        from: String,
        to: String,
        property: String,
    },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MultiplePrimaryKeys { .. }
            | DiagnosticKind::UnparsedRelationship { .. }
            | DiagnosticKind::DanglingRelationship { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::NotAnEntity => write!(f, "no decorated entity class found"),
            DiagnosticKind::NotAnEnum => write!(f, "no enum declaration found"),
            DiagnosticKind::MissingProperty { decorator } => {
                write!(f, "@{} is not followed by a property declaration", decorator)
            }
            DiagnosticKind::UnparsedRelationship {
                decorator,
                property,
            } => write!(
                f,
                "@{} on '{}' does not reference a target type",
                decorator, property
            ),
            DiagnosticKind::EmbeddedColumnSkipped { property } => {
                write!(f, "embedded column '{}' skipped", property)
            }
            DiagnosticKind::MultiplePrimaryKeys { names } => {
                write!(f, "multiple primary keys: {}", names.join(", "))
            }
            DiagnosticKind::TypeFallback { field, raw, token } => {
                write!(f, "type of '{}' ({}) recorded as '{}'", field, raw, token)
            }
            DiagnosticKind::DanglingRelationship { from, to, property } => write!(
                f,
                "relationship {}.{} references unknown entity '{}'",
                from, property, to
            ),
        }
    }
}

/// A single skipped or degraded item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// File name the diagnostic originates from, when known
    pub source: Option<String>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        Self { source: None, kind }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}: {}", self.severity(), source, self.kind),
            None => write!(f, "{}: {}", self.severity(), self.kind),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind) {
        self.items.push(Diagnostic::new(kind));
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Append every diagnostic from `other`, tagging untagged ones with `source`
    pub fn extend_from(&mut self, other: Diagnostics, source: &str) {
        self.items.extend(other.items.into_iter().map(|d| match d.source {
            Some(_) => d,
            None => d.with_source(source),
        }));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_source() {
        let diagnostic = Diagnostic::new(DiagnosticKind::NotAnEntity).with_source("a.entity.ts");
        assert_eq!(
            diagnostic.to_string(),
            "info: a.entity.ts: no decorated entity class found"
        );
    }

    #[test]
    fn test_dangling_relationship_is_warning() {
        let kind = DiagnosticKind::DanglingRelationship {
            from: "Employee".to_string(),
            to: "User".to_string(),
            property: "user".to_string(),
        };
        assert_eq!(kind.severity(), Severity::Warning);
        assert!(kind.to_string().contains("unknown entity 'User'"));
    }

    #[test]
    fn test_extend_from_tags_source() {
        let mut inner = Diagnostics::new();
        inner.push(DiagnosticKind::NotAnEnum);
        inner.push_diagnostic(Diagnostic::new(DiagnosticKind::NotAnEntity).with_source("kept"));

        let mut all = Diagnostics::new();
        all.extend_from(inner, "x.enum.ts");

        let sources: Vec<_> = all.iter().map(|d| d.source.clone().unwrap()).collect();
        assert_eq!(sources, vec!["x.enum.ts", "kept"]);
    }

    #[test]
    fn test_warning_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::NotAnEnum);
        diagnostics.push(DiagnosticKind::MultiplePrimaryKeys {
            names: vec!["id".to_string(), "code".to_string()],
        });
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
    }
}
