//! Diagnostics reported by the interop rule checker.

use std::fmt;

use serde::Serialize;

/// How severe a diagnostic is, as the host compiler would display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Not shown by default
    Hidden,
    /// Informational
    Info,
    /// A warning; does not fail a command line build
    Warning,
    /// An error
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// The static description of a rule.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticDescriptor {
    /// Rule id, e.g. `WME1084`
    pub id: &'static str,
    /// Short title
    pub title: &'static str,
    /// The message shown at each location
    pub message: &'static str,
    /// Rule category
    pub category: &'static str,
    /// Default severity
    pub severity: Severity,
}

/// Implementing one of the `Windows.Foundation` async interfaces in a runtime class.
pub static WME1084: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "WME1084",
    title: "WinRT doesn't support implementing Async interfaces",
    message: "Runtime components can't implement Async interfaces, use AsyncInfo class methods instead (see: WME Error 1084)",
    category: "Usage",
    severity: Severity::Warning,
};

/// One reported diagnostic, located at a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The violated rule
    pub descriptor: &'static DiagnosticDescriptor,
    /// Qualified name of the offending declaration
    pub location: String,
}

impl Diagnostic {
    /// Creates a diagnostic for `descriptor` at `location`.
    #[must_use]
    pub fn new(descriptor: &'static DiagnosticDescriptor, location: impl Into<String>) -> Self {
        Diagnostic {
            descriptor,
            location: location.into(),
        }
    }

    /// The rule id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    /// The severity of the rule.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.descriptor.severity
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.location, self.descriptor.severity, self.descriptor.id, self.descriptor.message
        )
    }
}

/// Receives diagnostics as soon as they are found.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
