use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The `MethodSemantics` table associates property and event accessors with their owner. `TableId` = 0x18
pub struct MethodSemanticsRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 2-byte bitmask of type `MethodSemanticsAttributes`
    pub semantics: u32,
    /// an index into the `MethodDef` table
    pub method: u32,
    /// an index into the Event or Property table; more precisely, a `HasSemantics`
    pub association: CodedIndex,
}

impl RowReadable for MethodSemanticsRaw {
    const TABLE_ID: TableId = TableId::MethodSemantics;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* semantics */     2 +
            /* method */        sizes.table_index_bytes(TableId::MethodDef) +
            /* association */   sizes.coded_index_bytes(CodedIndexType::HasSemantics)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            rid,
            token: Token::new(0x1800_0000 + rid),
            semantics: u32::from(read_le_at::<u16>(data, offset)?),
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, sizes, CodedIndexType::HasSemantics)?,
        })
    }
}

impl RowWritable for MethodSemanticsRaw {
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
        write_le_at_dyn(data, offset, self.semantics, false)?;
        write_le_at_dyn(data, offset, self.method, sizes.is_large(TableId::MethodDef))?;
        self.association
            .write(data, offset, sizes, CodedIndexType::HasSemantics)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::TableInfo;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x02, 0x00, // semantics: getter
            0x04, 0x00, // method
            0x03, 0x00, // association: Property 1
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MethodDef, 4), (TableId::Property, 1)],
            false,
            false,
            false,
        ));
        let mut offset = 0;
        let row = MethodSemanticsRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();

        assert_eq!(row.token.value(), 0x18000001);
        assert_eq!(row.semantics, 2);
        assert_eq!(row.method, 4);
        assert_eq!(row.association, CodedIndex::new(TableId::Property, 1));
    }
}
