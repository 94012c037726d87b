//! The async interface rule over whole programs.

use winmdgen::{model::FOUNDATION_CONTRACT, prelude::*, rules::WME1084};

fn foundation(name: &str, arguments: Vec<TypeSig>) -> TypeReference {
    TypeReference::external(&format!("Windows.Foundation.{name}"), FOUNDATION_CONTRACT)
        .with_arguments(arguments)
}

fn check(types: Vec<TypeDeclaration>) -> (Vec<AsyncInterfaceViolation>, Vec<Diagnostic>) {
    let mut program = Program::new();
    program.add_unit("Component.cs", types);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let violations = check_program(&program, &mut diagnostics);
    (violations, diagnostics)
}

#[test]
fn clean_program_has_no_violations() {
    let (violations, diagnostics) = check(vec![
        TypeDeclaration::interface("Contoso.IWidget"),
        TypeDeclaration::class("Contoso.Widget")
            .implements(TypeReference::program("Contoso.IWidget"))
            .implements(foundation("IClosable", vec![])),
    ]);
    assert!(violations.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn worker_is_reported_once() {
    let (violations, diagnostics) = check(vec![TypeDeclaration::class("Contoso.Worker")
        .implements(foundation("IAsyncOperation`1", vec![TypeSig::String]))]);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].type_name.to_string(), "Contoso.Worker");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].descriptor, &WME1084);
    assert_eq!(diagnostics[0].location, "Contoso.Worker");
}

#[test]
fn first_match_only() {
    let (violations, diagnostics) = check(vec![TypeDeclaration::class("Contoso.Busy")
        .implements(foundation("IAsyncOperation`1", vec![TypeSig::I4]))
        .implements(foundation("IAsyncAction", vec![]))]);

    // IAsyncAction is checked first, whatever the declaration order
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        violations[0].interface.original_definition().to_string(),
        "Windows.Foundation.IAsyncAction"
    );
}

#[test]
fn closed_generics_match_their_definition() {
    let flagged = |argument: TypeSig| {
        let (violations, _) = check(vec![TypeDeclaration::class("Contoso.Worker")
            .implements(foundation("IAsyncOperation`1", vec![argument]))]);
        violations
            .iter()
            .map(|violation| violation.interface.original_definition().clone())
            .collect::<Vec<_>>()
    };

    let strings = flagged(TypeSig::String);
    let integers = flagged(TypeSig::I4);
    assert_eq!(strings.len(), 1);
    assert_eq!(strings, integers);
}

#[test]
fn inherited_interfaces_are_checked() {
    let (violations, _) = check(vec![
        TypeDeclaration::interface("Contoso.IJob").implements(foundation("IAsyncAction", vec![])),
        TypeDeclaration::class("Contoso.Job").implements(TypeReference::program("Contoso.IJob")),
    ]);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].type_name.to_string(), "Contoso.Job");
}

#[test]
fn only_classes_are_checked() {
    let (violations, _) = check(vec![
        TypeDeclaration::interface("Contoso.IOperation")
            .implements(foundation("IAsyncOperation`1", vec![TypeSig::String])),
    ]);
    assert!(violations.is_empty());
}

#[test]
fn one_diagnostic_per_offending_class() {
    let (violations, diagnostics) = check(vec![
        TypeDeclaration::class("Contoso.A").implements(foundation("IAsyncAction", vec![])),
        TypeDeclaration::class("Contoso.B"),
        TypeDeclaration::class("Contoso.C").implements(foundation(
            "IAsyncOperationWithProgress`2",
            vec![TypeSig::String, TypeSig::U4],
        )),
    ]);

    assert_eq!(violations.len(), 2);
    let locations: Vec<&str> = diagnostics.iter().map(|d| d.location.as_str()).collect();
    assert_eq!(locations, ["Contoso.A", "Contoso.C"]);
}
