use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The `TypeRef` table contains references to types defined in other modules or assemblies. `TableId` = 0x01
pub struct TypeRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into a Module, `ModuleRef`, `AssemblyRef` or `TypeRef` table, or null; more precisely, a `ResolutionScope`
    pub resolution_scope: CodedIndex,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
}

impl RowReadable for TypeRefRaw {
    const TABLE_ID: TableId = TableId::TypeRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* resolution_scope */  sizes.coded_index_bytes(CodedIndexType::ResolutionScope) +
            /* type_name */         sizes.str_bytes() +
            /* type_namespace */    sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            token: Token::new(0x0100_0000 + rid),
            resolution_scope: CodedIndex::read(data, offset, sizes, CodedIndexType::ResolutionScope)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for TypeRefRaw {
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
        self.resolution_scope
            .write(data, offset, sizes, CodedIndexType::ResolutionScope)?;
        write_le_at_dyn(data, offset, self.type_name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.type_namespace, sizes.is_large_str())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{TableId, TableInfo};

    #[test]
    fn crafted_short() {
        let data = vec![
            0x0A, 0x00, // resolution_scope: AssemblyRef 2
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
        ];

        let sizes = Arc::new(TableInfo::new_test(&[(TableId::AssemblyRef, 2)], false, false, false));
        let mut offset = 0;
        let row = TypeRefRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();

        assert_eq!(row.token.value(), 0x01000001);
        assert_eq!(row.resolution_scope, CodedIndex::new(TableId::AssemblyRef, 2));
        assert_eq!(row.type_name, 0x42);
        assert_eq!(row.type_namespace, 0x43);
    }

    #[test]
    fn write_large_strings() {
        let sizes = Arc::new(TableInfo::new_test(&[(TableId::AssemblyRef, 1)], true, false, false));
        let row = TypeRefRaw {
            rid: 1,
            token: Token::new(0x01000001),
            resolution_scope: CodedIndex::new(TableId::AssemblyRef, 1),
            type_name: 0x0001_0000,
            type_namespace: 0x20,
        };

        let mut buffer = vec![0u8; <TypeRefRaw as RowWritable>::row_size(&sizes) as usize];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();

        assert_eq!(
            buffer,
            vec![0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x20, 0x00, 0x00, 0x00]
        );
    }
}
