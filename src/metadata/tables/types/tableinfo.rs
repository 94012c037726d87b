use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::types::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::max`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds the row count of every table and the resulting index column widths.
///
/// The reader builds it from a `#~` header; the writer builds it from the row counts of a
/// finalized table set. Both sides share the width rules, so a row serialized with a
/// `TableInfo` parses back with the `TableInfo` read from the emitted header.
#[derive(Clone, Default, Debug)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Parses the row counts of a `#~` stream.
    ///
    /// ## Arguments
    /// * 'data' - The `#~` stream, starting at its header
    /// * '`valid_bitvec`' - The valid bitvector from the header, showing which tables are present
    ///
    /// # Errors
    /// Returns an error if the table data is insufficient or malformed
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if data.len() < next_row_offset {
                return Err(OutOfBounds);
            }

            if (valid_bitvec & (1 << table_id as usize)) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            if row_count == 0 {
                continue;
            }

            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        if valid_bitvec >> TableId::COUNT != 0 {
            return Err(malformed_error!(
                "Valid mask 0x{:016x} names unknown tables",
                valid_bitvec
            ));
        }

        let heap_size_flags = read_le::<u8>(data.get(6..).ok_or(OutOfBounds)?)?;
        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        };

        table_info.calculate_coded_index_bits();

        Ok(table_info)
    }

    /// Builds a `TableInfo` from known row counts, as the writer does before serializing.
    ///
    /// ## Arguments
    /// * 'counts'      - (table, row count) pairs; tables not listed have no rows
    /// * 'large_str'   - #Strings indexes are 4 bytes
    /// * 'large_guid'  - #GUID indexes are 4 bytes
    /// * 'large_blob'  - #Blob indexes are 4 bytes
    #[must_use]
    pub fn from_row_counts(
        counts: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for (table, count) in counts {
            table_info.rows[*table as usize] = TableRowInfo::new(*count);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        Self::from_row_counts(valid_tables, large_str, large_guid, large_blob)
    }

    /// Decodes a coded index value into its component table and row index.
    ///
    /// # Errors
    /// Returns an error if the tag value is out of bounds for the coded index type
    pub fn decode_coded_index(
        &self,
        value: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(TableId, u32)> {
        let tables = coded_index_type.tables();
        let tag_bits = coded_index_type.tag_bits();
        let tag_mask = (1 << tag_bits) - 1;

        let tag = value & tag_mask;
        let index = value >> tag_bits;

        if tag as usize >= tables.len() {
            return Err(OutOfBounds);
        }

        Ok((tables[tag as usize], index))
    }

    /// Returns true, if a requested table is larger than 2^16 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#String' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the '#Guid' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// The `HeapSizes` byte of the `#~` header
    #[must_use]
    pub fn heap_size_flags(&self) -> u8 {
        u8::from(self.is_large_index_str)
            | (u8::from(self.is_large_index_guid) << 1)
            | (u8::from(self.is_large_index_blob) << 2)
    }

    /// Returns the size of a '#String' heap index in bytes
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Returns the size of a '#Guid' heap index in bytes
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Returns the size of a '#Blob' heap index in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Returns the row information for a specific table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the number of bits required to represent an index into a specific table.
    #[must_use]
    pub fn table_index_bits(&self, table_id: TableId) -> u8 {
        self.rows[table_id as usize].bits
    }

    /// Returns the number of bytes required to represent an index into a specific table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Returns the cached byte size for a specific coded index reference.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .map(|table| self.table_index_bits(*table))
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_tables() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 10), (TableId::Field, 3)], false, false, false);
        assert_eq!(info.table_index_bytes(TableId::TypeDef), 2);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 2);
        assert_eq!(info.heap_size_flags(), 0);
    }

    #[test]
    fn coded_index_widening() {
        // 2^14 rows need 15 bits; with 2 tag bits TypeDefOrRef crosses 16 bits
        let info = TableInfo::new_test(&[(TableId::TypeRef, 1 << 14)], false, false, false);
        assert_eq!(info.table_index_bytes(TableId::TypeRef), 2);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasSemantics), 2);
    }

    #[test]
    fn heap_flags() {
        let info = TableInfo::from_row_counts(&[], true, false, true);
        assert_eq!(info.heap_size_flags(), 0b101);
        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.guid_bytes(), 2);
        assert_eq!(info.blob_bytes(), 4);
    }

    #[test]
    fn decode() {
        let info = TableInfo::new_test(&[], false, false, false);
        assert_eq!(
            info.decode_coded_index((5 << 2) | 1, CodedIndexType::TypeDefOrRef).unwrap(),
            (TableId::TypeRef, 5)
        );
        assert_eq!(
            info.decode_coded_index((7 << 3) | 3, CodedIndexType::CustomAttributeType).unwrap(),
            (TableId::MemberRef, 7)
        );
        assert!(info.decode_coded_index(3, CodedIndexType::TypeDefOrRef).is_err());
    }

    #[test]
    fn parse_header_counts() {
        let mut data = vec![0u8; 24];
        data[6] = 0x02;
        data.extend_from_slice(&1u32.to_le_bytes()); // Module
        data.extend_from_slice(&3u32.to_le_bytes()); // TypeDef
        let valid = (1 << TableId::Module as u64) | (1 << TableId::TypeDef as u64);

        let info = TableInfo::new(&data, valid).unwrap();
        assert_eq!(info.get(TableId::Module).rows, 1);
        assert_eq!(info.get(TableId::TypeDef).rows, 3);
        assert_eq!(info.get(TableId::TypeRef).rows, 0);
        assert!(info.is_large_guid());
        assert!(!info.is_large_str());
    }
}
