use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The `InterfaceImpl` table records the interfaces a type implements. `TableId` = 0x09
pub struct InterfaceImplRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into the `TypeDef` table
    pub class: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef`
    pub interface: CodedIndex,
}

impl InterfaceImplRaw {
    /// The key this table is sorted by
    ///
    /// # Errors
    /// Returns an error if `interface` is not a valid `TypeDefOrRef` reference
    pub fn sort_key(&self) -> Result<(u32, u32)> {
        Ok((self.class, self.interface.encode(CodedIndexType::TypeDefOrRef)?))
    }
}

impl RowReadable for InterfaceImplRaw {
    const TABLE_ID: TableId = TableId::InterfaceImpl;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */     sizes.table_index_bytes(TableId::TypeDef) +
            /* interface */ sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(InterfaceImplRaw {
            rid,
            token: Token::new(0x0900_0000 + rid),
            class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            interface: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl RowWritable for InterfaceImplRaw {
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
        write_le_at_dyn(data, offset, self.class, sizes.is_large(TableId::TypeDef))?;
        self.interface
            .write(data, offset, sizes, CodedIndexType::TypeDefOrRef)?;
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
            0x03, 0x00, // class
            0x08, 0x00, // interface: TypeDef 2
        ];

        let sizes = Arc::new(TableInfo::new_test(&[(TableId::TypeDef, 3)], false, false, false));
        let mut offset = 0;
        let row = InterfaceImplRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();

        assert_eq!(row.token.value(), 0x09000001);
        assert_eq!(row.class, 3);
        assert_eq!(row.interface, CodedIndex::new(TableId::TypeDef, 2));
        assert_eq!(row.sort_key().unwrap(), (3, 8));
    }
}
