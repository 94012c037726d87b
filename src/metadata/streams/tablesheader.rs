//! Tables stream (`#~`) header and row access.
//!
//! The writer emits the `#~` stream in one pass; this module is the read side used to check
//! an emitted artifact. [`TablesHeader`] parses the schema header and row counts, computes the
//! start of every present table, and decodes rows on demand through [`RowReadable`].
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le,
    metadata::tables::{row_size, RowReadable, TableId, TableInfo, TableInfoRef},
    Error::OutOfBounds,
    Result,
};

/// The `TablesHeader` structure represents the header in the '#~' stream, which contains all
/// metadata tables of the image.
///
/// ```rust,no_run
/// use winmdgen::metadata::{streams::TablesHeader, tables::{TableId, TypeDefRaw}};
///
/// # fn example(tables: &TablesHeader) -> winmdgen::Result<()> {
/// for type_def in tables.rows::<TypeDefRaw>()? {
///     println!("TypeDef {}: flags={:#x}", type_def.rid, type_def.flags);
/// }
/// println!("{} InterfaceImpl rows", tables.table_row_count(TableId::InterfaceImpl));
/// # Ok(())
/// # }
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6 && II.22
pub struct TablesHeader<'a> {
    /// Major version of table schemata, shall be 2
    pub major_version: u8,
    /// Minor version of table schemata, shall be 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and the resulting index sizes
    pub info: TableInfoRef,
    data: &'a [u8],
    table_offsets: Vec<Option<usize>>,
}

impl<'a> TablesHeader<'a> {
    /// Create a `TablesHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The `#~` stream
    ///
    /// # Errors
    /// Returns an error if the data is too short, no table is present, or a present table is
    /// one this crate has no row layout for
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        if valid == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        let info = Arc::new(TableInfo::new(data, valid)?);
        let mut table_offsets = vec![None; TableId::COUNT];
        let mut current_offset = 24 + valid.count_ones() as usize * 4;

        for table_id in TableId::iter() {
            let rows = info.get(table_id).rows;
            if rows == 0 {
                continue;
            }

            let size = row_size(table_id, &info).ok_or_else(|| {
                malformed_error!("Table {:?} has no supported row layout", table_id)
            })?;

            table_offsets[table_id as usize] = Some(current_offset);
            current_offset += rows as usize * size as usize;
            if current_offset > data.len() {
                return Err(OutOfBounds);
            }
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            data,
            table_offsets,
        })
    }

    /// Number of tables present in the valid vector
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Row count of `table`, 0 when absent
    #[must_use]
    pub fn table_row_count(&self, table: TableId) -> u32 {
        self.info.get(table).rows
    }

    /// The tables with at least one row, in `TableId` order
    #[must_use]
    pub fn present_tables(&self) -> Vec<TableId> {
        TableId::iter()
            .filter(|table| self.table_row_count(*table) > 0)
            .collect()
    }

    /// Decodes every row of the table `T` belongs to.
    ///
    /// # Errors
    /// Returns an error if a row can not be decoded.
    pub fn rows<T: RowReadable>(&self) -> Result<Vec<T>> {
        let Some(start) = self.table_offsets[T::TABLE_ID as usize] else {
            return Ok(Vec::new());
        };

        let count = self.table_row_count(T::TABLE_ID);
        let mut offset = start;
        let mut rows = Vec::with_capacity(count as usize);
        for rid in 1..=count {
            rows.push(T::row_read(self.data, &mut offset, rid, &self.info)?);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{ModuleRaw, TypeDefRaw};

    #[rustfmt::skip]
    fn stream() -> Vec<u8> {
        vec![
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // schema 2.0
            0x00, 0x01,             // heap sizes, reserved
            0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: Module, TypeDef
            0x00, 0xFA, 0x01, 0x33, 0x00, 0x16, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // Module rows
            0x02, 0x00, 0x00, 0x00, // TypeDef rows
            // Module: generation, name, mvid, encid, encbaseid
            0x00, 0x00, 0x0A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
            // TypeDef 1: <Module>
            0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
            // TypeDef 2
            0xA1, 0x40, 0x00, 0x00, 0x1D, 0x00, 0x24, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
        ]
    }

    #[test]
    fn crafted() {
        let data = stream();
        let header = TablesHeader::from(&data).unwrap();

        assert_eq!(header.major_version, 2);
        assert_eq!(header.minor_version, 0);
        assert_eq!(header.table_count(), 2);
        assert_eq!(header.sorted, TableId::SORTED_MASK);
        assert_eq!(header.present_tables(), vec![TableId::Module, TableId::TypeDef]);
        assert_eq!(header.table_row_count(TableId::TypeDef), 2);
        assert_eq!(header.table_row_count(TableId::Field), 0);

        let module = header.rows::<ModuleRaw>().unwrap();
        assert_eq!(module.len(), 1);
        assert_eq!(module[0].name, 0x0A);
        assert_eq!(module[0].mvid, 1);

        let types = header.rows::<TypeDefRaw>().unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].rid, 2);
        assert_eq!(types[1].flags, 0x40A1);
        assert_eq!(types[1].type_name, 0x1D);
        assert_eq!(types[1].type_namespace, 0x24);
    }

    #[test]
    fn absent_table_has_no_rows() {
        let data = stream();
        let header = TablesHeader::from(&data).unwrap();
        assert!(header
            .rows::<crate::metadata::tables::FieldRaw>()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn truncated() {
        let data = stream();
        assert!(TablesHeader::from(&data[..data.len() - 1]).is_err());
        assert!(TablesHeader::from(&data[..20]).is_err());
    }

    #[test]
    fn unsupported_table() {
        let mut data = stream();
        // NestedClass (0x29) in place of TypeDef
        data[8] = 0x01;
        data[13] = 0x02;
        assert!(TablesHeader::from(&data).is_err());
    }
}
