//! Metadata streams of a Windows Runtime metadata image.
//!
//! The metadata root carries five streams:
//!
//! ## String Heaps
//! - **`#Strings`** - UTF-8 identifier strings heap containing type names, member names, etc.
//!   The first entry is always the empty string. All entries are null-terminated.
//! - **`#US`** - User string heap. Metadata-only images carry no IL, so the writer emits
//!   the minimal heap and no reader is provided.
//!
//! ## Binary Data
//! - **`#Blob`** - Signatures and custom attribute values, each prefixed with a compressed length.
//! - **`#GUID`** - Sequence of 128-bit GUIDs; the module version id lives here.
//!
//! ## Metadata Tables
//! - **`#~`** - The compressed metadata tables.
//!
//! Every heap has a reader (used when an emitted artifact is parsed back) and a builder
//! (used while tables are being built).
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 24.2.2 - Stream Headers
//! - ECMA-335 6th Edition, Partition II, Section 22 - Metadata Tables

/// The header of a stream, indicates location + size + name
mod streamheader;
pub use streamheader::{StreamHeader, STREAM_NAMES};

/// The '#String' heap implementation
mod strings;
pub use strings::{Strings, StringsBuilder};

/// The '#~' implementation
mod tablesheader;
pub use tablesheader::TablesHeader;

/// The '#GUID' heap / array implementation
mod guid;
pub use guid::{Guid, GuidBuilder};

/// The '#Blob' heap implementation
mod blob;
pub use blob::{Blob, BlobBuilder};

/// Contents of the `#US` heap in an image without IL: the empty entry, padded
pub const EMPTY_USER_STRINGS: [u8; 4] = [0, 0, 0, 0];
