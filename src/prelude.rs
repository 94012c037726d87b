//! # winmdgen Prelude
//!
//! The types most programs need to check a component, build its metadata and drive a
//! generation run. Import everything with `use winmdgen::prelude::*;`.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all winmdgen operations
pub use crate::Error;

/// The result type used throughout winmdgen
pub use crate::Result;

// ================================================================================================
// Symbol Model
// ================================================================================================

/// Declarations, references and the symbol model adapter
pub use crate::model::{
    MemberDeclaration, MemberKind, Parameter, Program, QualifiedName, SourceUnit, SymbolModel,
    TypeDeclaration, TypeKind, TypeOrigin, TypeReference, TypeSig, Visibility,
};

// ================================================================================================
// Rules
// ================================================================================================

/// The interop rule checker and its diagnostics
pub use crate::rules::{check_program, AsyncInterfaceViolation, Diagnostic, DiagnosticSink, Severity};

// ================================================================================================
// Building and Writing
// ================================================================================================

/// Table building
pub use crate::builder::{
    build_artifact, build_tables, ArtifactOptions, AssemblyVersion, MetadataBuilder, TableSet,
};

/// Serialization and publication
pub use crate::writer::{serialize, write_artifact, BinaryArtifact};

/// Reading an artifact back
pub use crate::file::WinmdFile;

/// Metadata table identifiers and tokens
pub use crate::metadata::{tables::TableId, token::Token};

// ================================================================================================
// Driver
// ================================================================================================

/// Generation runs for a host build
pub use crate::driver::{
    execute, BuildProperties, CsWinRtTool, GeneratedSource, GenerationDriver, GenerationLog,
    GenerationOutcome, GenerationState, GeneratorConfig, ProjectionTool,
};
