//! Qualified names, type references and member type signatures.
//!
//! A [`TypeReference`] names a type either declared by the program being compiled or
//! resolved from referenced metadata. Closed generic instantiations carry their type
//! arguments; [`TypeReference::original_definition`] strips them, which is what interface
//! matching compares.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The assembly that defines the Windows Runtime base types (`System.Object` and friends).
pub const MSCORLIB: &str = "mscorlib";

/// The contract assembly holding `Windows.Foundation` and its metadata attributes.
pub const FOUNDATION_CONTRACT: &str = "Windows.Foundation.FoundationContract";

/// A namespace qualified metadata name.
///
/// Serialized as the dotted full name.
///
/// `name` is the metadata name and carries the generic arity suffix, e.g.
/// ``IAsyncOperation`1``.
///
/// # Examples
///
/// ```rust
/// use winmdgen::model::QualifiedName;
///
/// let name = QualifiedName::parse("Windows.Foundation.IAsyncOperation`1");
/// assert_eq!(name.namespace, "Windows.Foundation");
/// assert_eq!(name.name, "IAsyncOperation`1");
/// assert_eq!(name.arity(), 1);
/// assert_eq!(name.to_string(), "Windows.Foundation.IAsyncOperation`1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct QualifiedName {
    /// Dotted namespace, empty for the global namespace
    pub namespace: String,
    /// Simple metadata name including any arity suffix
    pub name: String,
}

impl QualifiedName {
    /// Creates a name from its parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        QualifiedName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Splits a fully qualified name on its last dot.
    #[must_use]
    pub fn parse(full_name: &str) -> Self {
        match full_name.rfind('.') {
            Some(split) => QualifiedName::new(&full_name[..split], &full_name[split + 1..]),
            None => QualifiedName::new("", full_name),
        }
    }

    /// The generic arity encoded in the name's `` `N `` suffix, 0 if there is none.
    #[must_use]
    pub fn arity(&self) -> u32 {
        self.name
            .rsplit_once('`')
            .and_then(|(_, count)| count.parse().ok())
            .unwrap_or(0)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

impl From<String> for QualifiedName {
    fn from(full_name: String) -> Self {
        QualifiedName::parse(&full_name)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

/// Where a referenced type is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeOrigin {
    /// Declared by the program being compiled
    #[default]
    Program,
    /// Resolved from referenced metadata
    External {
        /// Name of the defining assembly or contract
        assembly: String,
    },
}

/// A possibly generic, possibly closed reference to a type.
///
/// # Examples
///
/// ```rust
/// use winmdgen::model::{TypeReference, TypeSig};
///
/// let closed = TypeReference::external(
///     "Windows.Foundation.IAsyncOperation`1",
///     "Windows.Foundation.FoundationContract",
/// )
/// .with_arguments(vec![TypeSig::String]);
///
/// let other = TypeReference::external(
///     "Windows.Foundation.IAsyncOperation`1",
///     "Windows.Foundation.FoundationContract",
/// )
/// .with_arguments(vec![TypeSig::I4]);
///
/// assert_ne!(closed, other);
/// assert!(closed.same_definition(&other));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    /// The referenced definition's name
    pub name: QualifiedName,
    /// The defining scope
    #[serde(default)]
    pub origin: TypeOrigin,
    /// Type arguments of a closed generic instantiation, empty otherwise
    #[serde(default)]
    pub arguments: Vec<TypeSig>,
    /// Whether the referenced type is a value type (struct or enum)
    #[serde(default)]
    pub is_value_type: bool,
}

impl TypeReference {
    /// A reference to a type declared by the program.
    #[must_use]
    pub fn program(full_name: &str) -> Self {
        TypeReference {
            name: QualifiedName::parse(full_name),
            origin: TypeOrigin::Program,
            arguments: Vec::new(),
            is_value_type: false,
        }
    }

    /// A reference to a type defined in `assembly`.
    #[must_use]
    pub fn external(full_name: &str, assembly: &str) -> Self {
        TypeReference {
            name: QualifiedName::parse(full_name),
            origin: TypeOrigin::External {
                assembly: assembly.to_string(),
            },
            arguments: Vec::new(),
            is_value_type: false,
        }
    }

    /// A reference to one of the `System` base types in [`MSCORLIB`].
    #[must_use]
    pub fn system(name: &str) -> Self {
        TypeReference::external(&format!("System.{name}"), MSCORLIB)
    }

    /// Closes a generic definition over `arguments`.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<TypeSig>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Marks the referenced type as a value type.
    #[must_use]
    pub fn value_type(mut self) -> Self {
        self.is_value_type = true;
        self
    }

    /// The referenced definition with all type arguments stripped.
    #[must_use]
    pub fn original_definition(&self) -> &QualifiedName {
        &self.name
    }

    /// True if both references name the same definition, regardless of type arguments.
    #[must_use]
    pub fn same_definition(&self, other: &TypeReference) -> bool {
        self.name == other.name
    }

    /// True for a closed instantiation of a generic definition.
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// True if the type is declared by the program.
    #[must_use]
    pub fn is_program(&self) -> bool {
        self.origin == TypeOrigin::Program
    }

    /// Replaces generic parameter ordinals in the arguments by `arguments` of an enclosing
    /// instantiation.
    #[must_use]
    pub fn substitute(&self, arguments: &[TypeSig]) -> TypeReference {
        TypeReference {
            arguments: self
                .arguments
                .iter()
                .map(|argument| argument.substitute(arguments))
                .collect(),
            ..self.clone()
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "<")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{argument}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// The type of a parameter, return value, field or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TypeSig {
    #[default]
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    String,
    Object,
    /// A class, interface, struct, enum or delegate
    Named(TypeReference),
    /// The n-th generic parameter of the enclosing type
    GenericParam(u32),
    /// A single-dimensional, zero-based array
    SzArray(Box<TypeSig>),
}

impl TypeSig {
    /// Shorthand for [`TypeSig::Named`].
    #[must_use]
    pub fn named(reference: TypeReference) -> Self {
        TypeSig::Named(reference)
    }

    /// Replaces [`TypeSig::GenericParam`] ordinals with the matching entry of `arguments`.
    /// Ordinals beyond `arguments` are kept.
    #[must_use]
    pub fn substitute(&self, arguments: &[TypeSig]) -> TypeSig {
        match self {
            TypeSig::GenericParam(ordinal) => arguments
                .get(*ordinal as usize)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeSig::Named(reference) => TypeSig::Named(reference.substitute(arguments)),
            TypeSig::SzArray(element) => TypeSig::SzArray(Box::new(element.substitute(arguments))),
            _ => self.clone(),
        }
    }

    /// Every program type this signature mentions, in pre-order.
    pub(crate) fn program_references(&self) -> Vec<&TypeReference> {
        let mut found = Vec::new();
        self.collect_program_references(&mut found);
        found
    }

    fn collect_program_references<'a>(&'a self, found: &mut Vec<&'a TypeReference>) {
        match self {
            TypeSig::Named(reference) => {
                if reference.is_program() {
                    found.push(reference);
                }
                for argument in &reference.arguments {
                    argument.collect_program_references(found);
                }
            }
            TypeSig::SzArray(element) => element.collect_program_references(found),
            _ => {}
        }
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Void => write!(f, "void"),
            TypeSig::Boolean => write!(f, "bool"),
            TypeSig::Char => write!(f, "char"),
            TypeSig::I1 => write!(f, "sbyte"),
            TypeSig::U1 => write!(f, "byte"),
            TypeSig::I2 => write!(f, "short"),
            TypeSig::U2 => write!(f, "ushort"),
            TypeSig::I4 => write!(f, "int"),
            TypeSig::U4 => write!(f, "uint"),
            TypeSig::I8 => write!(f, "long"),
            TypeSig::U8 => write!(f, "ulong"),
            TypeSig::R4 => write!(f, "float"),
            TypeSig::R8 => write!(f, "double"),
            TypeSig::String => write!(f, "string"),
            TypeSig::Object => write!(f, "object"),
            TypeSig::Named(reference) => write!(f, "{reference}"),
            TypeSig::GenericParam(ordinal) => write!(f, "!{ordinal}"),
            TypeSig::SzArray(element) => write!(f, "{element}[]"),
        }
    }
}
