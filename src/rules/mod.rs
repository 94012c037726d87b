//! The interop rule checker.
//!
//! Runs before any metadata is built. A single violation blocks generation, whatever the
//! severity of its diagnostic.

mod asyncinterface;
mod diagnostics;

pub use asyncinterface::{any_violations, check_program, AsyncInterfaceViolation, PROHIBITED_INTERFACES};
pub use diagnostics::{Diagnostic, DiagnosticDescriptor, DiagnosticSink, Severity, WME1084};
