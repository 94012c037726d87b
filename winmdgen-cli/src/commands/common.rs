use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use winmdgen::{
    model::Program,
    rules::{AsyncInterfaceViolation, Diagnostic},
};

/// Load a program description from its JSON file.
pub fn load_program(path: &Path) -> anyhow::Result<Program> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read program: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid program: {}", path.display()))
}

#[derive(Debug, Serialize)]
pub struct DiagnosticEntry {
    pub id: &'static str,
    pub severity: String,
    pub location: String,
    pub message: &'static str,
}

impl From<&Diagnostic> for DiagnosticEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        DiagnosticEntry {
            id: diagnostic.id(),
            severity: diagnostic.severity().to_string(),
            location: diagnostic.location.clone(),
            message: diagnostic.descriptor.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViolationEntry {
    pub class: String,
    pub interface: String,
}

impl From<&AsyncInterfaceViolation> for ViolationEntry {
    fn from(violation: &AsyncInterfaceViolation) -> Self {
        ViolationEntry {
            class: violation.type_name.to_string(),
            interface: violation.interface.to_string(),
        }
    }
}

/// Print diagnostics the way a compiler would, one per line.
pub fn print_diagnostics(diagnostics: &[DiagnosticEntry]) {
    for diagnostic in diagnostics {
        println!(
            "{}: {} {}: {}",
            diagnostic.location, diagnostic.severity, diagnostic.id, diagnostic.message
        );
    }
}
