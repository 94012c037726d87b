use crate::{
    metadata::tables::types::{TableId, TableInfoRef},
    Result,
};

/// A row type of a metadata table that can be parsed from a `#~` stream.
///
/// Types implementing this trait must:
/// - Provide accurate row size calculations for the given index widths
/// - Support 1-based row indexing (as per CLI specification)
pub trait RowReadable: Sized + Send {
    /// The table this row type belongs to.
    const TABLE_ID: TableId;

    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// ## Arguments
    ///
    /// * `sizes` - Table size information containing heap sizes and table row counts
    ///   used to determine the appropriate index sizes
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads and parses a single row, advancing `offset` past it.
    ///
    /// ## Arguments
    ///
    /// * `data` - The table data to read from
    /// * `offset` - The current read position
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// ## Errors
    ///
    /// Returns [`crate::Error`] when the buffer contains insufficient data or a coded index
    /// carries an invalid tag.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// A row type of a metadata table that can be serialized into a `#~` stream.
///
/// The writer sizes the table data with [`RowWritable::row_size`] and then calls
/// [`RowWritable::row_write`] once per row in table order.
pub trait RowWritable: Sized + Send {
    /// Calculates the size in bytes of a single row for this table type.
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Serializes this row into `data` at `offset`, advancing `offset` past it.
    ///
    /// ## Arguments
    ///
    /// * `data` - The buffer to write the row data into
    /// * `offset` - The current write position
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for serializing variable-sized fields
    ///
    /// ## Errors
    ///
    /// Returns [`crate::Error`] when the buffer lacks space, a small column overflows, or
    /// a coded index names a table its column can not reference.
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()>;
}
