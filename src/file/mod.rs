//! Reading an emitted Windows Runtime metadata artifact back.
//!
//! [`WinmdFile`] parses a PE image produced by [`crate::writer::serialize`] (or any other
//! metadata-only CLI image whose tables this crate knows) down to its metadata tables:
//! PE headers → CLI header → metadata root → `#~` stream. It is what the tests and the
//! `tables` command of the CLI use to check that an artifact says what the builder meant.
//!
//! Files on disk are memory mapped; [`WinmdFile::from_mem`] takes bytes that were just
//! serialized.
//!
//! # Examples
//!
//! ```rust,no_run
//! use winmdgen::file::WinmdFile;
//! use winmdgen::metadata::tables::{TableId, TypeDefRaw};
//! use std::path::Path;
//!
//! let file = WinmdFile::from_file(Path::new("Contoso.winmd"))?;
//! println!("Metadata version {}", file.version());
//! for table in file.present_tables() {
//!     println!("{:?}: {} rows", table, file.table_row_count(table));
//! }
//!
//! for type_def in file.rows::<TypeDefRaw>()? {
//!     println!("{}", file.string(type_def.type_name)?);
//! }
//! # Ok::<(), winmdgen::Error>(())
//! ```

pub mod io;
mod source;

use std::path::Path;

use goblin::pe::PE;

use crate::{
    metadata::{
        cor20header::Cor20Header,
        root::Root,
        streams::{Blob, Guid, StreamHeader, Strings, TablesHeader},
        tables::{RowReadable, TableId},
    },
    Error::{GoblinErr, OutOfBounds},
    Result,
};
use source::Source;

/// Placement of one section, kept for RVA translation
#[derive(Debug, Clone, Copy)]
struct SectionRange {
    virtual_address: u32,
    virtual_size: u32,
    pointer_to_raw_data: u32,
}

/// A parsed Windows Runtime metadata image.
///
/// Loading validates the PE headers, the CLI header, the metadata root and the `#~` header;
/// rows and heap entries are decoded on request.
pub struct WinmdFile {
    data: Source,
    sections: Vec<SectionRange>,
    timestamp: u32,
    cor20: Cor20Header,
    root: Root,
    metadata_offset: usize,
    row_counts: Vec<(TableId, u32)>,
}

impl WinmdFile {
    /// Loads an artifact from the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid PE image, or does not
    /// carry readable metadata.
    pub fn from_file(file: &Path) -> Result<WinmdFile> {
        Self::load(Source::map(file)?)
    }

    /// Loads an artifact from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not a valid PE image or does not carry readable
    /// metadata.
    pub fn from_mem(data: Vec<u8>) -> Result<WinmdFile> {
        Self::load(Source::Owned(data))
    }

    fn load(data: Source) -> Result<WinmdFile> {
        if data.bytes().is_empty() {
            return Err(malformed_error!("Provided image is empty"));
        }

        let (sections, timestamp, clr_rva, clr_size) = {
            let pe = PE::parse(data.bytes()).map_err(GoblinErr)?;
            let Some(optional_header) = pe.header.optional_header else {
                return Err(malformed_error!("File does not have an OptionalHeader"));
            };
            let Some(clr) = optional_header.data_directories.get_clr_runtime_header() else {
                return Err(malformed_error!(
                    "File does not have a CLR runtime header directory"
                ));
            };

            let sections = pe
                .sections
                .iter()
                .map(|section| SectionRange {
                    virtual_address: section.virtual_address,
                    virtual_size: section.virtual_size,
                    pointer_to_raw_data: section.pointer_to_raw_data,
                })
                .collect::<Vec<_>>();

            (
                sections,
                pe.header.coff_header.time_date_stamp,
                clr.virtual_address,
                clr.size,
            )
        };

        let clr_offset = rva_to_offset(&sections, clr_rva)?;
        let cor20 = Cor20Header::read(data.slice(clr_offset, clr_size as usize)?)?;

        let metadata_offset = rva_to_offset(&sections, cor20.meta_data_rva)?;
        let metadata = data.slice(metadata_offset, cor20.meta_data_size as usize)?;
        let root = Root::read(metadata)?;

        let row_counts = {
            let tables_stream = stream_slice(metadata, &root, "#~")?;
            let header = TablesHeader::from(tables_stream)?;
            header
                .present_tables()
                .into_iter()
                .map(|table| (table, header.table_row_count(table)))
                .collect()
        };

        Ok(WinmdFile {
            data,
            sections,
            timestamp,
            cor20,
            root,
            metadata_offset,
            row_counts,
        })
    }

    /// Returns the total size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.bytes().len()
    }

    /// Returns true if the image has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.bytes().is_empty()
    }

    /// The raw image
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.bytes()
    }

    /// The COFF `TimeDateStamp` field
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// The CLI header
    #[must_use]
    pub fn cor20(&self) -> &Cor20Header {
        &self.cor20
    }

    /// The metadata root and its stream directory
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// The metadata version string, `WindowsRuntime 1.4` for artifacts this crate writes
    #[must_use]
    pub fn version(&self) -> &str {
        &self.root.version
    }

    /// The tables that have at least one row, in `TableId` order
    #[must_use]
    pub fn present_tables(&self) -> Vec<TableId> {
        self.row_counts.iter().map(|(table, _)| *table).collect()
    }

    /// The row count of `table`, 0 when the table is absent
    #[must_use]
    pub fn table_row_count(&self, table: TableId) -> u32 {
        self.row_counts
            .iter()
            .find(|(id, _)| *id == table)
            .map_or(0, |(_, rows)| *rows)
    }

    /// The `#~` stream
    ///
    /// # Errors
    /// Returns an error if the stream can not be parsed.
    pub fn tables(&self) -> Result<TablesHeader<'_>> {
        TablesHeader::from(self.stream("#~")?)
    }

    /// Decodes every row of the table `T` belongs to.
    ///
    /// # Errors
    /// Returns an error if the table data can not be decoded.
    pub fn rows<T: RowReadable>(&self) -> Result<Vec<T>> {
        self.tables()?.rows::<T>()
    }

    /// Looks up an identifier in the `#Strings` heap.
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the index is invalid.
    pub fn string(&self, index: u32) -> Result<&str> {
        Strings::from(self.stream("#Strings")?)?.get(index as usize)
    }

    /// Looks up an entry of the `#Blob` heap.
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the index is invalid.
    pub fn blob(&self, index: u32) -> Result<&[u8]> {
        Blob::from(self.stream("#Blob")?)?.get(index as usize)
    }

    /// Looks up a 1-based entry of the `#GUID` heap.
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the index is invalid.
    pub fn guid(&self, index: u32) -> Result<uguid::Guid> {
        Guid::from(self.stream("#GUID")?)?.get(index as usize)
    }

    /// Converts a relative virtual address to a file offset.
    ///
    /// # Errors
    /// Returns an error if no section contains `rva`.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        rva_to_offset(&self.sections, rva)
    }

    fn stream(&self, name: &str) -> Result<&[u8]> {
        let metadata = self
            .data
            .slice(self.metadata_offset, self.cor20.meta_data_size as usize)?;
        stream_slice(metadata, &self.root, name)
    }
}

fn stream_slice<'a>(metadata: &'a [u8], root: &Root, name: &str) -> Result<&'a [u8]> {
    let header: &StreamHeader = root
        .stream(name)
        .ok_or_else(|| malformed_error!("Metadata has no {} stream", name))?;

    let start = header.offset as usize;
    let end = start.checked_add(header.size as usize).ok_or(OutOfBounds)?;
    metadata.get(start..end).ok_or(OutOfBounds)
}

fn rva_to_offset(sections: &[SectionRange], rva: u32) -> Result<usize> {
    for section in sections {
        let Some(section_max) = section.virtual_address.checked_add(section.virtual_size) else {
            return Err(malformed_error!(
                "Section malformed, causing integer overflow - {} + {}",
                section.virtual_address,
                section.virtual_size
            ));
        };

        if section.virtual_address <= rva && rva < section_max {
            return Ok((rva - section.virtual_address) as usize
                + section.pointer_to_raw_data as usize);
        }
    }

    Err(malformed_error!(
        "RVA could not be converted to offset - {}",
        rva
    ))
}
