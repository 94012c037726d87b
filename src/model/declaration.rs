//! Type and member declarations, with fluent constructors.
//!
//! Declarations are produced by the host compiler (or deserialized by the CLI) and are
//! read-only to the rest of the pipeline. Accessor methods of properties and events are
//! not declared here; the table builder synthesizes them.
//!
//! # Examples
//!
//! ```rust
//! use winmdgen::model::{MemberDeclaration, TypeDeclaration, TypeReference, TypeSig};
//!
//! let widget = TypeDeclaration::class("Contoso.Widget")
//!     .implements(TypeReference::program("Contoso.IWidget"))
//!     .method(MemberDeclaration::method("Render").param("scale", TypeSig::R8))
//!     .member(MemberDeclaration::property("Name", TypeSig::String).read_only());
//!
//! assert_eq!(widget.qualified_name(), "Contoso.Widget");
//! assert_eq!(widget.members.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::model::reference::{QualifiedName, TypeReference, TypeSig};

/// The five kinds of Windows Runtime types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// A runtime class
    Class,
    /// An interface
    Interface,
    /// A value type with public fields only
    Struct,
    /// An `Int32` backed enumeration
    Enum,
    /// A delegate with a single `Invoke` method
    Delegate,
}

impl TypeKind {
    /// The base type implied by the kind, `None` for interfaces.
    #[must_use]
    pub fn implicit_base(self) -> Option<TypeReference> {
        match self {
            TypeKind::Class => Some(TypeReference::system("Object")),
            TypeKind::Interface => None,
            TypeKind::Struct => Some(TypeReference::system("ValueType")),
            TypeKind::Enum => Some(TypeReference::system("Enum")),
            TypeKind::Delegate => Some(TypeReference::system("MulticastDelegate")),
        }
    }
}

/// Declared accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible to consumers of the component
    #[default]
    Public,
    /// Only visible inside the component
    Internal,
}

/// A named method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: TypeSig,
}

/// Parameters and return type of a member.
///
/// Properties and fields store their type in `return_type`; events store it in their kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Return type, `Void` when absent
    #[serde(default)]
    pub return_type: TypeSig,
}

/// Member modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Declared on the type rather than on instances
    #[serde(default)]
    pub is_static: bool,
}

/// What a member is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    /// A method
    Method,
    /// A property with the given accessors
    Property {
        /// `get_X` is synthesized
        getter: bool,
        /// `put_X` is synthesized
        setter: bool,
    },
    /// An event whose handler is a delegate type
    Event {
        /// The delegate type of the handler
        handler: TypeReference,
    },
    /// A struct field, or an enum literal when `constant` is set
    Field {
        /// Literal value of an enum member
        constant: Option<i32>,
    },
}

/// A member of a [`TypeDeclaration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeclaration {
    /// Member name
    pub name: String,
    /// Member kind
    pub kind: MemberKind,
    /// Parameters and return (or property/field) type
    #[serde(default)]
    pub signature: Signature,
    /// Modifiers
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl MemberDeclaration {
    fn new(name: &str, kind: MemberKind, return_type: TypeSig) -> Self {
        MemberDeclaration {
            name: name.to_string(),
            kind,
            signature: Signature {
                parameters: Vec::new(),
                return_type,
            },
            modifiers: Modifiers::default(),
        }
    }

    /// A method returning `void` with no parameters.
    #[must_use]
    pub fn method(name: &str) -> Self {
        Self::new(name, MemberKind::Method, TypeSig::Void)
    }

    /// A read-write property of type `ty`.
    #[must_use]
    pub fn property(name: &str, ty: TypeSig) -> Self {
        Self::new(
            name,
            MemberKind::Property {
                getter: true,
                setter: true,
            },
            ty,
        )
    }

    /// An event raised through `handler`.
    #[must_use]
    pub fn event(name: &str, handler: TypeReference) -> Self {
        Self::new(name, MemberKind::Event { handler }, TypeSig::Void)
    }

    /// A struct field of type `ty`.
    #[must_use]
    pub fn field(name: &str, ty: TypeSig) -> Self {
        Self::new(name, MemberKind::Field { constant: None }, ty)
    }

    /// An enum member with the given value.
    #[must_use]
    pub fn enum_value(name: &str, value: i32) -> Self {
        Self::new(
            name,
            MemberKind::Field {
                constant: Some(value),
            },
            TypeSig::I4,
        )
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: &str, ty: TypeSig) -> Self {
        self.signature.parameters.push(Parameter {
            name: name.to_string(),
            ty,
        });
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returns(mut self, ty: TypeSig) -> Self {
        self.signature.return_type = ty;
        self
    }

    /// Marks the member static.
    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// Drops the setter of a property. No effect on other kinds.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        if let MemberKind::Property { setter, .. } = &mut self.kind {
            *setter = false;
        }
        self
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Qualified metadata name; generic types carry the arity suffix
    pub name: QualifiedName,
    /// Type kind
    pub kind: TypeKind,
    /// Declared accessibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Generic parameter names in ordinal order
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    /// Explicit base type, the kind's implicit base when `None`
    #[serde(default)]
    pub base_type: Option<TypeReference>,
    /// Directly implemented (or, for interfaces, required) interfaces
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    /// Declared members in source order
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

impl TypeDeclaration {
    /// An empty public declaration of `kind`.
    #[must_use]
    pub fn new(kind: TypeKind, full_name: &str) -> Self {
        TypeDeclaration {
            name: QualifiedName::parse(full_name),
            kind,
            visibility: Visibility::Public,
            generic_parameters: Vec::new(),
            base_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// A runtime class.
    #[must_use]
    pub fn class(full_name: &str) -> Self {
        Self::new(TypeKind::Class, full_name)
    }

    /// An interface.
    #[must_use]
    pub fn interface(full_name: &str) -> Self {
        Self::new(TypeKind::Interface, full_name)
    }

    /// A struct.
    #[must_use]
    pub fn structure(full_name: &str) -> Self {
        Self::new(TypeKind::Struct, full_name)
    }

    /// An enum.
    #[must_use]
    pub fn enumeration(full_name: &str) -> Self {
        Self::new(TypeKind::Enum, full_name)
    }

    /// A delegate. Its signature is the declared `Invoke` method.
    #[must_use]
    pub fn delegate(full_name: &str) -> Self {
        Self::new(TypeKind::Delegate, full_name)
    }

    /// Makes the declaration internal.
    #[must_use]
    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Appends a generic parameter.
    #[must_use]
    pub fn generic(mut self, name: &str) -> Self {
        self.generic_parameters.push(name.to_string());
        self
    }

    /// Sets an explicit base type.
    #[must_use]
    pub fn extends(mut self, base: TypeReference) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Adds an interface, unless one with the same original definition is already present.
    #[must_use]
    pub fn implements(mut self, interface: TypeReference) -> Self {
        if !self
            .interfaces
            .iter()
            .any(|existing| existing.same_definition(&interface))
        {
            self.interfaces.push(interface);
        }
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, member: MemberDeclaration) -> Self {
        self.members.push(member);
        self
    }

    /// Adds a method. Same as [`TypeDeclaration::member`], reads better in chains.
    #[must_use]
    pub fn method(self, method: MemberDeclaration) -> Self {
        self.member(method)
    }

    /// The fully qualified name as a string.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    /// The explicit base type, or the implicit base of the kind.
    #[must_use]
    pub fn effective_base(&self) -> Option<TypeReference> {
        self.base_type
            .clone()
            .or_else(|| self.kind.implicit_base())
    }

    /// A reference to this declaration, open over its own generic parameters.
    #[must_use]
    pub fn as_reference(&self) -> TypeReference {
        let mut reference = TypeReference::program(&self.qualified_name());
        reference.is_value_type = matches!(self.kind, TypeKind::Struct | TypeKind::Enum);
        reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implements_skips_same_definition() {
        let declaration = TypeDeclaration::class("Contoso.Store")
            .implements(
                TypeReference::program("Contoso.IBox`1").with_arguments(vec![TypeSig::I4]),
            )
            .implements(
                TypeReference::program("Contoso.IBox`1").with_arguments(vec![TypeSig::String]),
            )
            .implements(TypeReference::program("Contoso.IOther"));

        assert_eq!(declaration.interfaces.len(), 2);
        assert_eq!(declaration.interfaces[0].arguments, vec![TypeSig::I4]);
    }

    #[test]
    fn implicit_bases() {
        let base = |declaration: TypeDeclaration| {
            declaration.effective_base().map(|base| base.name.to_string())
        };

        assert_eq!(base(TypeDeclaration::class("A.B")).as_deref(), Some("System.Object"));
        assert_eq!(base(TypeDeclaration::interface("A.IB")), None);
        assert_eq!(base(TypeDeclaration::structure("A.S")).as_deref(), Some("System.ValueType"));
        assert_eq!(base(TypeDeclaration::enumeration("A.E")).as_deref(), Some("System.Enum"));
        assert_eq!(
            base(TypeDeclaration::delegate("A.D")).as_deref(),
            Some("System.MulticastDelegate")
        );
        assert_eq!(
            base(TypeDeclaration::class("A.B").extends(TypeReference::program("A.Base")))
                .as_deref(),
            Some("A.Base")
        );
    }

    #[test]
    fn member_builders() {
        let property = MemberDeclaration::property("Count", TypeSig::I4).read_only();
        assert_eq!(
            property.kind,
            MemberKind::Property {
                getter: true,
                setter: false
            }
        );
        assert_eq!(property.signature.return_type, TypeSig::I4);

        let method = MemberDeclaration::method("Add")
            .param("left", TypeSig::I4)
            .param("right", TypeSig::I4)
            .returns(TypeSig::I4)
            .static_member();
        assert_eq!(method.signature.parameters.len(), 2);
        assert!(method.modifiers.is_static);

        let literal = MemberDeclaration::enum_value("Red", 2);
        assert_eq!(literal.kind, MemberKind::Field { constant: Some(2) });
    }

    #[test]
    fn value_type_reference() {
        assert!(TypeDeclaration::structure("A.Point").as_reference().is_value_type);
        assert!(!TypeDeclaration::class("A.Widget").as_reference().is_value_type);
    }
}
