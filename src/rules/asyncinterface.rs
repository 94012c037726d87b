//! Runtime classes must not implement the `Windows.Foundation` async interfaces.
//!
//! Async operations cross the ABI as `IAsyncAction` / `IAsyncOperation<T>` objects produced
//! by the `AsyncInfo` helpers; a component class implementing them itself is rejected.
//!
//! Each class is reported at most once: the prohibited interfaces are tried in a fixed
//! order and the first one found ends the check for that class, so a class implementing
//! two of them yields a single diagnostic naming the earlier one.

use log::debug;

use crate::{
    model::{QualifiedName, SymbolModel, TypeDeclaration, TypeKind, TypeOrigin, TypeReference},
    rules::diagnostics::{Diagnostic, DiagnosticSink, WME1084},
};

/// The prohibited interfaces, by original definition, in checking order.
///
/// Only references into another assembly match; a program type that happens to share
/// one of these names is not the platform interface.
pub const PROHIBITED_INTERFACES: [&str; 4] = [
    "Windows.Foundation.IAsyncAction",
    "Windows.Foundation.IAsyncActionWithProgress`1",
    "Windows.Foundation.IAsyncOperation`1",
    "Windows.Foundation.IAsyncOperationWithProgress`2",
];

/// A class that implements a prohibited interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncInterfaceViolation {
    /// The offending class
    pub type_name: QualifiedName,
    /// The implemented interface as it appears in the class's interface set
    pub interface: TypeReference,
}

/// Checks every class of `model` and reports one diagnostic per offending class to `sink`.
///
/// Non-class declarations are never checked. Diagnostics are reported as they are found,
/// in discovery order.
///
/// # Examples
///
/// ```rust
/// use winmdgen::model::{Program, TypeDeclaration, TypeReference, TypeSig};
/// use winmdgen::rules::{check_program, Diagnostic};
///
/// let mut program = Program::new();
/// program.add_unit(
///     "Worker.cs",
///     vec![TypeDeclaration::class("Contoso.Worker").implements(
///         TypeReference::external(
///             "Windows.Foundation.IAsyncOperation`1",
///             "Windows.Foundation.FoundationContract",
///         )
///         .with_arguments(vec![TypeSig::String]),
///     )],
/// );
///
/// let mut diagnostics: Vec<Diagnostic> = Vec::new();
/// let violations = check_program(&program, &mut diagnostics);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(diagnostics[0].location, "Contoso.Worker");
/// ```
pub fn check_program<M: SymbolModel + ?Sized>(
    model: &M,
    sink: &mut dyn DiagnosticSink,
) -> Vec<AsyncInterfaceViolation> {
    let prohibited: Vec<QualifiedName> = PROHIBITED_INTERFACES
        .iter()
        .map(|name| QualifiedName::parse(name))
        .collect();

    let mut violations = Vec::new();
    for declaration in model.types() {
        if declaration.kind != TypeKind::Class {
            continue;
        }

        if let Some(violation) = check_class(model, declaration, &prohibited) {
            debug!(
                "{} implements prohibited interface {}",
                violation.type_name, violation.interface
            );
            sink.report(Diagnostic::new(&WME1084, violation.type_name.to_string()));
            violations.push(violation);
        }
    }

    violations
}

fn check_class<M: SymbolModel + ?Sized>(
    model: &M,
    declaration: &TypeDeclaration,
    prohibited: &[QualifiedName],
) -> Option<AsyncInterfaceViolation> {
    let implemented = model.all_interfaces(declaration);

    for definition in prohibited {
        if let Some(interface) = implemented
            .iter()
            .find(|interface| {
                matches!(interface.origin, TypeOrigin::External { .. })
                    && interface.original_definition() == definition
            })
        {
            return Some(AsyncInterfaceViolation {
                type_name: declaration.name.clone(),
                interface: interface.clone(),
            });
        }
    }

    None
}

/// True if any violation was found.
#[must_use]
pub fn any_violations(violations: &[AsyncInterfaceViolation]) -> bool {
    !violations.is_empty()
}
