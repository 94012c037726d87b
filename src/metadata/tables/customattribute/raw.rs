use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The `CustomAttribute` table attaches attribute instances to metadata entities. `TableId` = 0x0C
pub struct CustomAttributeRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into a metadata table that has an associated `HasCustomAttribute` coded index
    pub parent: CodedIndex,
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `CustomAttributeType`
    pub constructor: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl RowReadable for CustomAttributeRaw {
    const TABLE_ID: TableId = TableId::CustomAttribute;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */        sizes.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
            /* constructor */   sizes.coded_index_bytes(CodedIndexType::CustomAttributeType) +
            /* value */         sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: Token::new(0x0C00_0000 + rid),
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasCustomAttribute)?,
            constructor: CodedIndex::read(data, offset, sizes, CodedIndexType::CustomAttributeType)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for CustomAttributeRaw {
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
        self.parent
            .write(data, offset, sizes, CodedIndexType::HasCustomAttribute)?;
        self.constructor
            .write(data, offset, sizes, CodedIndexType::CustomAttributeType)?;
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
    fn member_ref_constructor() {
        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::InterfaceImpl, 1), (TableId::MemberRef, 2)],
            false,
            false,
            false,
        ));
        let row = CustomAttributeRaw {
            rid: 1,
            token: Token::new(0x0C000001),
            parent: CodedIndex::new(TableId::InterfaceImpl, 1),
            constructor: CodedIndex::new(TableId::MemberRef, 2),
            value: 0x20,
        };

        let mut buffer = vec![0u8; <CustomAttributeRaw as RowWritable>::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(buffer, vec![0x25, 0x00, 0x13, 0x00, 0x20, 0x00]);

        let mut offset = 0;
        let parsed = CustomAttributeRaw::row_read(&buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(parsed.parent, row.parent);
        assert_eq!(parsed.constructor.tag, TableId::MemberRef);
        assert_eq!(parsed.constructor.row, 2);
    }
}
