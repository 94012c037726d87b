use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The Constant table stores compile-time constant values for fields, parameters and properties. `TableId` = 0x0B
pub struct ConstantRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 1-byte constant, the `ELEMENT_TYPE` of the value, followed by a 1-byte padding zero
    pub base: u8,
    /// an index into the Param, Field, or Property table; more precisely, a `HasConstant`
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl RowReadable for ConstantRaw {
    const TABLE_ID: TableId = TableId::Constant;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* base + padding */    2 +
            /* parent */            sizes.coded_index_bytes(CodedIndexType::HasConstant) +
            /* value */             sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        let base = read_le_at::<u8>(data, offset)?;
        *offset += 1;

        Ok(ConstantRaw {
            rid,
            token: Token::new(0x0B00_0000 + rid),
            base,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasConstant)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for ConstantRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        <Self as RowReadable>::row_size(sizes)
    }

    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at::<u8>(data, offset, self.base)?;
        write_le_at::<u8>(data, offset, 0)?;
        self.parent
            .write(data, offset, sizes, CodedIndexType::HasConstant)?;
        write_le_at_dyn(data, offset, self.value, sizes.is_large_blob())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{TableId, TableInfo};

    #[test]
    fn enum_literal() {
        let sizes = Arc::new(TableInfo::new_test(&[(TableId::Field, 4)], false, false, false));
        let row = ConstantRaw {
            rid: 1,
            token: Token::new(0x0B000001),
            base: 0x08,
            parent: CodedIndex::new(TableId::Field, 3),
            value: 0x11,
        };

        let mut buffer = vec![0u8; <ConstantRaw as RowWritable>::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(buffer, vec![0x08, 0x00, 0x0C, 0x00, 0x11, 0x00]);

        let mut offset = 0;
        assert_eq!(ConstantRaw::row_read(&buffer, &mut offset, 1, &sizes).unwrap(), row);
    }
}
