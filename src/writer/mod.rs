//! Binary container writer.
//!
//! [`serialize`] turns a finalized [`TableSet`] into the bytes of a `.winmd` file: a PE32
//! image with one `.text` section holding the CLI header and the metadata. Serialization
//! is a pure function of the tables. There is no clock and no randomness: the module
//! version id and the COFF timestamp are derived from the content, so the same tables
//! always produce byte-identical output.
//!
//! [`write_artifact`] publishes those bytes atomically through [`output::Output`].
//!
//! # Examples
//!
//! ```rust
//! use winmdgen::builder::{AssemblyVersion, MetadataBuilder};
//! use winmdgen::file::WinmdFile;
//! use winmdgen::metadata::tables::TableId;
//! use winmdgen::writer::serialize;
//!
//! let tables = MetadataBuilder::new("Contoso", AssemblyVersion::default())?.finalize()?;
//! let artifact = serialize(&tables)?;
//!
//! let file = WinmdFile::from_mem(artifact.bytes().to_vec())?;
//! assert_eq!(file.version(), "WindowsRuntime 1.4");
//! assert_eq!(file.table_row_count(TableId::TypeDef), 1);
//! # Ok::<(), winmdgen::Error>(())
//! ```

mod metadata;
pub mod output;
mod pe;
mod tables;

use std::path::Path;

use log::{debug, info};

use crate::{builder::TableSet, Result};
use output::Output;

/// The serialized bytes of one `.winmd` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryArtifact {
    bytes: Vec<u8>,
    mvid: uguid::Guid,
}

impl BinaryArtifact {
    /// The file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a serialized artifact.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The content derived module version id.
    #[must_use]
    pub fn mvid(&self) -> uguid::Guid {
        self.mvid
    }

    /// Consumes the artifact, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Serializes `tables` into a PE32 image.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a value does not fit its column or header
/// field.
pub fn serialize(tables: &TableSet) -> Result<BinaryArtifact> {
    let metadata = metadata::write_metadata(tables)?;
    let bytes = pe::write_image(&metadata.bytes, metadata.timestamp)?;

    debug!(
        "Serialized {} bytes of metadata into a {} byte image",
        metadata.bytes.len(),
        bytes.len()
    );
    Ok(BinaryArtifact {
        bytes,
        mvid: metadata.mvid,
    })
}

/// Writes `artifact` to `path`, replacing an existing file atomically.
///
/// # Errors
/// Returns [`crate::Error::WriteFailed`] if the file can not be created or published.
pub fn write_artifact(artifact: &BinaryArtifact, path: &Path) -> Result<()> {
    let mut output = Output::create(path, artifact.len() as u64)?;
    output.write_at(0, artifact.bytes())?;
    output.finalize()?;

    info!("Wrote {} ({} bytes)", path.display(), artifact.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{AssemblyVersion, MetadataBuilder},
        file::WinmdFile,
        metadata::tables::{TableId, TypeDefRaw},
        model::{MemberDeclaration, TypeDeclaration, TypeReference},
    };

    fn widget() -> TableSet {
        let mut builder = MetadataBuilder::new("Contoso", AssemblyVersion::new(1, 0, 0, 0)).unwrap();
        builder.visit_type(&TypeDeclaration::interface("Contoso.IWidget")).unwrap();
        builder
            .visit_type(
                &TypeDeclaration::class("Contoso.Widget")
                    .implements(TypeReference::program("Contoso.IWidget"))
                    .method(MemberDeclaration::method("Render")),
            )
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn read_back() {
        let tables = widget();
        let artifact = serialize(&tables).unwrap();
        let file = WinmdFile::from_mem(artifact.bytes().to_vec()).unwrap();

        assert_eq!(file.present_tables(), tables.present_tables());
        for (table, rows) in tables.row_counts() {
            assert_eq!(file.table_row_count(table), rows, "{:?}", table);
        }

        let type_defs = file.rows::<TypeDefRaw>().unwrap();
        assert_eq!(type_defs, tables.type_defs());
        assert_eq!(file.string(type_defs[2].type_name).unwrap(), "Widget");
        assert_eq!(file.guid(1).unwrap(), artifact.mvid());
        assert_eq!(file.table_row_count(TableId::InterfaceImpl), 1);
    }

    #[test]
    fn deterministic() {
        assert_eq!(serialize(&widget()).unwrap(), serialize(&widget()).unwrap());
    }

    #[test]
    fn write_to_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("Contoso.winmd");
        let artifact = serialize(&widget()).unwrap();

        write_artifact(&artifact, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes());
        assert!(WinmdFile::from_file(&path).is_ok());
    }
}
