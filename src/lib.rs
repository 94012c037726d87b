// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # winmdgen
//!
//! Synthesizes Windows Runtime metadata (`.winmd`) for authored runtime components.
//!
//! A program's declared classes, interfaces, structs, enums and delegates are validated
//! against the Windows Runtime interop rules, turned into ECMA-335 metadata tables and
//! serialized into a PE32 image whose metadata root is labeled `WindowsRuntime 1.4`.
//! Projection tools consume that image to generate language bindings.
//!
//! ## Quick Start
//!
//! ```rust
//! use winmdgen::prelude::*;
//!
//! let mut program = Program::new();
//! program.add_unit(
//!     "Widget.cs",
//!     vec![
//!         TypeDeclaration::interface("Contoso.IWidget"),
//!         TypeDeclaration::class("Contoso.Widget")
//!             .implements(TypeReference::program("Contoso.IWidget"))
//!             .method(MemberDeclaration::method("Render")),
//!     ],
//! );
//!
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//! assert!(check_program(&program, &mut diagnostics).is_empty());
//!
//! let artifact = build_artifact(&program, &ArtifactOptions::new("Contoso", "1.0.0.0"))?;
//! let file = WinmdFile::from_mem(artifact.bytes().to_vec())?;
//! assert_eq!(file.version(), "WindowsRuntime 1.4");
//! # Ok::<(), winmdgen::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - The symbol model adapter: declarations, references and [`model::SymbolModel`]
//! - [`rules`] - The interop rule checker ([`rules::check_program`])
//! - [`builder`] - The metadata table builder ([`builder::MetadataBuilder`])
//! - [`writer`] - The binary container writer ([`writer::serialize`])
//! - [`driver`] - The one-shot generation pipeline ([`driver::GenerationDriver`])
//! - [`metadata`] - ECMA-335 format definitions shared by the writer and the reader
//! - [`file`] - Reading an emitted artifact back
//!
//! ## Standards Compliance
//!
//! Tables, heaps and signatures follow the **ECMA-335 specification** (6th edition),
//! partition II, with the Windows Runtime conventions for type flags and attributes.
#[macro_use]
pub(crate) mod error;

pub(crate) mod utils;

/// Shared fixtures for unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

pub mod builder;
pub mod driver;
pub mod file;
pub mod metadata;
pub mod model;
pub mod rules;
pub mod writer;

pub use builder::{build_artifact, ArtifactOptions};
pub use error::Error;

/// The generic Result type of this crate.
pub type Result<T> = std::result::Result<T, Error>;
