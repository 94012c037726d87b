//! ECMA-335 metadata format definitions.
//!
//! This module contains the building blocks shared by the metadata writer and the artifact
//! reader: tokens, table rows and their index widths, heap streams, signatures, the metadata
//! root and the CLI header.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references
//! - [`tables`] - Row layouts of every table a Windows Runtime component needs
//! - [`streams`] - The `#~`, `#Strings`, `#GUID` and `#Blob` streams, readers and builders
//! - [`signatures`] - Method, field, property and type specification signatures
//! - [`root`] - The `BSJB` metadata root and stream directory
//! - [`cor20header`] - The CLI header that points at the metadata
//!
//! # Examples
//!
//! ```rust
//! use winmdgen::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::from_parts(TableId::TypeDef, 2);
//! assert_eq!(token.value(), 0x0200_0002);
//! ```

/// Implementation of the Header of CIL
pub mod cor20header;
/// Implementation of the root metadata structure
pub mod root;
/// Implementation of method and type signatures
pub mod signatures;
/// Implementation of all metadata streams (tables, heaps, etc.)
pub mod streams;
/// Implementation of the .NET metadata tables
pub mod tables;
/// Commonly used metadata token type
pub mod token;
