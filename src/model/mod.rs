//! The symbol model adapter.
//!
//! Everything the generator knows about the program being compiled flows through this
//! module: [`TypeDeclaration`]s with their [`MemberDeclaration`]s, the [`TypeReference`]s
//! between them, and the [`SymbolModel`] trait that answers discovery order and
//! transitive interface queries. [`Program`] is the in-crate implementation used by the CLI
//! and the tests; a host compiler can implement [`SymbolModel`] over its own symbols.

mod declaration;
mod program;
mod reference;

pub use declaration::{
    MemberDeclaration, MemberKind, Modifiers, Parameter, Signature, TypeDeclaration, TypeKind,
    Visibility,
};
pub use program::{Program, SourceUnit, SymbolModel};
pub use reference::{QualifiedName, TypeOrigin, TypeReference, TypeSig, FOUNDATION_CONTRACT, MSCORLIB};
