use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Binary format errors
/// - [`Error::Malformed`] - Corrupted or invalid structure while reading or writing
/// - [`Error::OutOfBounds`] - Attempted to read or write beyond a buffer
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
///
/// ## Declaration errors
/// - [`Error::DuplicateType`] - The same qualified name was declared twice
/// - [`Error::InvalidDeclaration`] - A declaration violates the data model invariants
///
/// ## Table building errors
/// - [`Error::UnresolvedReference`] - A deferred reference never found its target
/// - [`Error::OrderingViolation`] - A table ordering invariant could not be restored
///
/// ## I/O and external errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::WriteFailed`] - The artifact could not be produced or published
/// - [`Error::ExternalTool`] - The projection tool failed
///
/// ## Configuration errors
/// - [`Error::MissingProperty`] - A required build property was absent at its point of use
/// - [`Error::InvalidVersion`] - `AssemblyVersion` could not be parsed
///
/// # Examples
///
/// ```rust,no_run
/// use winmdgen::{file::WinmdFile, Error};
/// use std::path::Path;
///
/// match WinmdFile::from_file(Path::new("Component.winmd")) {
///     Ok(file) => println!("Metadata version {}", file.version()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be parsed, or a structure could not be encoded.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted.
    #[error("Out of Bound access would have occurred!")]
    OutOfBounds,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// A type with the same qualified name was already visited.
    #[error("Type '{0}' is declared more than once")]
    DuplicateType(String),

    /// A declaration violates the invariants of the symbol model.
    #[error("Invalid declaration '{name}': {message}")]
    InvalidDeclaration {
        /// Qualified name of the offending declaration
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// A deferred reference was never resolved.
    ///
    /// The `owner` token identifies the row that holds the reference, `target` is the
    /// qualified name that was never visited.
    #[error("Unresolved reference from {owner} to '{target}'")]
    UnresolvedReference {
        /// Token of the row holding the dangling reference
        owner: Token,
        /// The qualified name that was never declared
        target: String,
    },

    /// A metadata table violates an ordering or range invariant after finalization.
    #[error("Ordering violation in {table}: {message}")]
    OrderingViolation {
        /// Name of the offending table
        table: String,
        /// Description of the violated invariant
        message: String,
    },

    /// The artifact could not be written or published.
    #[error("Failed to write artifact: {message}")]
    WriteFailed {
        /// Description of the failure
        message: String,
    },

    /// The external projection tool could not be run or reported failure.
    #[error("External tool failed: {message}")]
    ExternalTool {
        /// Description of the failure, including exit status where available
        message: String,
    },

    /// A required build property is missing where it is consumed.
    #[error("Required build property '{0}' is missing")]
    MissingProperty(&'static str),

    /// The configured assembly version is not a valid `major.minor.build.revision` string.
    #[error("Invalid assembly version '{0}'")]
    InvalidVersion(String),
}
