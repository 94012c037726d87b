//! The `#~` stream: header, row counts and every row in `TableId` order.
//!
//! Rows are serialized through their [`RowWritable`] implementations with index widths
//! taken from a [`TableInfo`] built from the final row counts and heap sizes.

use std::sync::Arc;

use crate::{
    builder::TableSet,
    file::io::write_le_at,
    metadata::tables::{RowWritable, TableId, TableInfo, TableInfoRef},
    utils::{align_to, to_u32},
    Result,
};

/// Schema version of the tables stream.
const SCHEMA_MAJOR: u8 = 2;
const SCHEMA_MINOR: u8 = 0;

/// Heaps at or above this size are addressed with 4-byte indexes.
pub(crate) const LARGE_HEAP: usize = 0x1_0000;

/// Runs `$body` with `$rows` bound to the rows of `$table`, for every table a
/// [`TableSet`] carries.
macro_rules! dispatch_rows {
    ($tables:expr, $table:expr, |$rows:ident| $body:expr, $otherwise:expr) => {
        match $table {
            TableId::Module => { let $rows = &$tables.modules[..]; $body }
            TableId::TypeRef => { let $rows = &$tables.type_refs[..]; $body }
            TableId::TypeDef => { let $rows = &$tables.type_defs[..]; $body }
            TableId::Field => { let $rows = &$tables.fields[..]; $body }
            TableId::MethodDef => { let $rows = &$tables.methods[..]; $body }
            TableId::Param => { let $rows = &$tables.params[..]; $body }
            TableId::InterfaceImpl => { let $rows = &$tables.interface_impls[..]; $body }
            TableId::MemberRef => { let $rows = &$tables.member_refs[..]; $body }
            TableId::Constant => { let $rows = &$tables.constants[..]; $body }
            TableId::CustomAttribute => { let $rows = &$tables.custom_attributes[..]; $body }
            TableId::EventMap => { let $rows = &$tables.event_maps[..]; $body }
            TableId::Event => { let $rows = &$tables.events[..]; $body }
            TableId::PropertyMap => { let $rows = &$tables.property_maps[..]; $body }
            TableId::Property => { let $rows = &$tables.properties[..]; $body }
            TableId::MethodSemantics => { let $rows = &$tables.method_semantics[..]; $body }
            TableId::TypeSpec => { let $rows = &$tables.type_specs[..]; $body }
            TableId::Assembly => { let $rows = &$tables.assemblies[..]; $body }
            TableId::AssemblyRef => { let $rows = &$tables.assembly_refs[..]; $body }
            TableId::GenericParam => { let $rows = &$tables.generic_params[..]; $body }
            _ => $otherwise,
        }
    };
}

fn rows_size<T: RowWritable>(rows: &[T], info: &TableInfoRef) -> usize {
    rows.len() * <T as RowWritable>::row_size(info) as usize
}

fn write_rows<T: RowWritable>(
    rows: &[T],
    data: &mut [u8],
    offset: &mut usize,
    info: &TableInfoRef,
) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        row.row_write(data, offset, to_u32(index + 1)?, info)?;
    }
    Ok(())
}

/// Serializes the tables of one [`TableSet`].
pub(crate) struct TableWriter<'a> {
    tables: &'a TableSet,
    info: TableInfoRef,
    present: Vec<(TableId, u32)>,
}

impl<'a> TableWriter<'a> {
    /// Sizes every index column for the given heap sizes in bytes (GUIDs: count).
    pub fn new(tables: &'a TableSet, strings: usize, guids: usize, blobs: usize) -> Self {
        let present = tables.row_counts();
        let info = Arc::new(TableInfo::from_row_counts(
            &present,
            strings >= LARGE_HEAP,
            guids >= LARGE_HEAP,
            blobs >= LARGE_HEAP,
        ));
        TableWriter {
            tables,
            info,
            present,
        }
    }

    /// Bit vector of the tables holding rows.
    pub fn valid_mask(&self) -> u64 {
        self.present
            .iter()
            .fold(0u64, |mask, (table, _)| mask | (1u64 << (*table as u64)))
    }

    fn rows_size(&self) -> Result<usize> {
        let mut size = 0;
        for (table, _) in &self.present {
            size += dispatch_rows!(
                self.tables,
                *table,
                |rows| rows_size(rows, &self.info),
                return Err(malformed_error!("No row layout for table {:?}", table))
            );
        }
        Ok(size)
    }

    /// The complete stream, padded to 4 bytes.
    pub fn write(&self) -> Result<Vec<u8>> {
        let header_size = 24 + self.present.len() * 4;
        let size = align_to(header_size + self.rows_size()?, 4);
        let mut data = vec![0u8; size];
        let mut offset = 0;

        write_le_at(&mut data, &mut offset, 0u32)?;
        write_le_at(&mut data, &mut offset, SCHEMA_MAJOR)?;
        write_le_at(&mut data, &mut offset, SCHEMA_MINOR)?;
        write_le_at(&mut data, &mut offset, self.info.heap_size_flags())?;
        // Reserved, always 1
        write_le_at(&mut data, &mut offset, 1u8)?;
        write_le_at(&mut data, &mut offset, self.valid_mask())?;
        write_le_at(&mut data, &mut offset, TableId::SORTED_MASK)?;
        for (_, rows) in &self.present {
            write_le_at(&mut data, &mut offset, *rows)?;
        }

        for (table, _) in &self.present {
            dispatch_rows!(
                self.tables,
                *table,
                |rows| write_rows(rows, &mut data, &mut offset, &self.info)?,
                return Err(malformed_error!("No row layout for table {:?}", table))
            );
        }

        Ok(data)
    }
}
