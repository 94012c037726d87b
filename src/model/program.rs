//! The symbol model adapter and its default implementation over source units.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{
    declaration::TypeDeclaration,
    reference::{QualifiedName, TypeReference, TypeSig},
};

/// Read access to the types the host compiler discovered.
///
/// The pipeline never mutates a model. `types` yields declarations in discovery order
/// (source units in order, declarations in source order within each unit), which is also
/// the order the table builder visits them in.
pub trait SymbolModel {
    /// All declared types in discovery order.
    fn types(&self) -> Vec<&TypeDeclaration>;

    /// Every interface `declaration` implements, directly or through base types and
    /// inherited interfaces.
    fn all_interfaces(&self, declaration: &TypeDeclaration) -> Vec<TypeReference>;

    /// Looks up a declared type by qualified name.
    fn find(&self, name: &QualifiedName) -> Option<&TypeDeclaration> {
        self.types()
            .into_iter()
            .find(|declaration| declaration.name == *name)
    }
}

/// One source file of the program and the types it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Path of the source file, used for locations only
    pub path: String,
    /// Declared types in source order
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

/// A program as an ordered list of source units.
///
/// `Program` deserializes from JSON of the form
/// `{"units": [{"path": "Widget.cs", "types": [{"name": "Contoso.Widget", "kind": "Class"}]}]}`.
///
/// # Examples
///
/// ```rust
/// use winmdgen::model::{Program, SymbolModel, TypeDeclaration, TypeReference};
///
/// let mut program = Program::new();
/// program.add_unit(
///     "Shapes.cs",
///     vec![
///         TypeDeclaration::interface("Contoso.IShape"),
///         TypeDeclaration::interface("Contoso.ICircle")
///             .implements(TypeReference::program("Contoso.IShape")),
///         TypeDeclaration::class("Contoso.Circle")
///             .implements(TypeReference::program("Contoso.ICircle")),
///     ],
/// );
///
/// let circle = program.types()[2];
/// let names: Vec<String> = program
///     .all_interfaces(circle)
///     .iter()
///     .map(|interface| interface.to_string())
///     .collect();
/// assert_eq!(names, ["Contoso.ICircle", "Contoso.IShape"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    units: Vec<SourceUnit>,
}

impl Program {
    /// An empty program.
    #[must_use]
    pub fn new() -> Self {
        Program::default()
    }

    /// Appends a source unit.
    pub fn add_unit(&mut self, path: &str, types: Vec<TypeDeclaration>) {
        self.units.push(SourceUnit {
            path: path.to_string(),
            types,
        });
    }

    /// The source units in order.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// The source unit that declares `name`.
    #[must_use]
    pub fn unit_of(&self, name: &QualifiedName) -> Option<&SourceUnit> {
        self.units
            .iter()
            .find(|unit| unit.types.iter().any(|declaration| declaration.name == *name))
    }

    fn collect_interfaces(
        &self,
        declaration: &TypeDeclaration,
        arguments: &[TypeSig],
        found: &mut Vec<TypeReference>,
        visiting: &mut HashSet<QualifiedName>,
    ) {
        if !visiting.insert(declaration.name.clone()) {
            return;
        }

        for interface in &declaration.interfaces {
            let interface = interface.substitute(arguments);
            if !found.contains(&interface) {
                found.push(interface.clone());
            }
            self.descend(&interface, found, visiting);
        }

        if let Some(base) = &declaration.base_type {
            self.descend(&base.substitute(arguments), found, visiting);
        }

        visiting.remove(&declaration.name);
    }

    fn descend(
        &self,
        reference: &TypeReference,
        found: &mut Vec<TypeReference>,
        visiting: &mut HashSet<QualifiedName>,
    ) {
        if !reference.is_program() {
            return;
        }
        if let Some(definition) = self.find(&reference.name) {
            self.collect_interfaces(definition, &reference.arguments, found, visiting);
        }
    }
}

impl SymbolModel for Program {
    fn types(&self) -> Vec<&TypeDeclaration> {
        self.units.iter().flat_map(|unit| unit.types.iter()).collect()
    }

    fn all_interfaces(&self, declaration: &TypeDeclaration) -> Vec<TypeReference> {
        let mut found = Vec::new();
        let mut visiting = HashSet::new();
        self.collect_interfaces(declaration, &[], &mut found, &mut visiting);
        found
    }

    fn find(&self, name: &QualifiedName) -> Option<&TypeDeclaration> {
        self.units
            .iter()
            .flat_map(|unit| unit.types.iter())
            .find(|declaration| declaration.name == *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{reference::FOUNDATION_CONTRACT, TypeSig};

    fn async_operation(argument: TypeSig) -> TypeReference {
        TypeReference::external("Windows.Foundation.IAsyncOperation`1", FOUNDATION_CONTRACT)
            .with_arguments(vec![argument])
    }

    #[test]
    fn discovery_order_spans_units() {
        let mut program = Program::new();
        program.add_unit("B.cs", vec![TypeDeclaration::class("N.B")]);
        program.add_unit(
            "A.cs",
            vec![TypeDeclaration::class("N.A"), TypeDeclaration::interface("N.IA")],
        );

        let names: Vec<String> = program.types().iter().map(|t| t.qualified_name()).collect();
        assert_eq!(names, ["N.B", "N.A", "N.IA"]);
        assert_eq!(program.unit_of(&QualifiedName::parse("N.IA")).unwrap().path, "A.cs");
    }

    #[test]
    fn inherited_through_base_class() {
        let mut program = Program::new();
        program.add_unit(
            "Workers.cs",
            vec![
                TypeDeclaration::class("N.BaseWorker").implements(async_operation(TypeSig::I4)),
                TypeDeclaration::class("N.Worker").extends(TypeReference::program("N.BaseWorker")),
            ],
        );

        let worker = program.types()[1];
        assert_eq!(program.all_interfaces(worker), vec![async_operation(TypeSig::I4)]);
    }

    #[test]
    fn generic_interface_substitution() {
        let mut program = Program::new();
        program.add_unit(
            "Box.cs",
            vec![
                TypeDeclaration::interface("N.IBox`1")
                    .generic("T")
                    .implements(async_operation(TypeSig::GenericParam(0))),
                TypeDeclaration::class("N.StringBox").implements(
                    TypeReference::program("N.IBox`1").with_arguments(vec![TypeSig::String]),
                ),
            ],
        );

        let all = program.all_interfaces(program.types()[1]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], async_operation(TypeSig::String));
    }

    #[test]
    fn duplicates_and_cycles() {
        let mut program = Program::new();
        program.add_unit(
            "Cycle.cs",
            vec![
                TypeDeclaration::interface("N.IA").implements(TypeReference::program("N.IB")),
                TypeDeclaration::interface("N.IB").implements(TypeReference::program("N.IA")),
                TypeDeclaration::class("N.C")
                    .implements(TypeReference::program("N.IA"))
                    .implements(TypeReference::program("N.IB")),
            ],
        );

        let all = program.all_interfaces(program.types()[2]);
        let names: Vec<String> = all.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["N.IA", "N.IB"]);
    }

    #[test]
    fn deserialize() {
        let json = r#"{
            "units": [{
                "path": "Widget.cs",
                "types": [{
                    "name": "Contoso.Widget",
                    "kind": "Class",
                    "interfaces": [{"name": "Contoso.IWidget"}],
                    "members": [{"name": "Render", "kind": "Method"}]
                }]
            }]
        }"#;

        let program: Program = serde_json::from_str(json).unwrap();
        let widget = program.types()[0];
        assert_eq!(widget.qualified_name(), "Contoso.Widget");
        assert!(widget.interfaces[0].is_program());
        assert_eq!(widget.members[0].signature.return_type, TypeSig::Void);
    }
}
