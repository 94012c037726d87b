use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The `GenericParam` table defines the generic parameters of types and methods. `TableId` = 0x2A
pub struct GenericParamRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// the 2-byte index of the generic parameter, numbered left-to-right, from zero
    pub number: u32,
    /// a 2-byte bitmask of type `GenericParamAttributes`
    pub flags: u32,
    /// an index into the `TypeDef` or `MethodDef` table; more precisely, a `TypeOrMethodDef`
    pub owner: CodedIndex,
    /// a non-null index into the String heap
    pub name: u32,
}

impl GenericParamRaw {
    /// The key this table is sorted by
    ///
    /// # Errors
    /// Returns an error if `owner` is not a valid `TypeOrMethodDef` reference
    pub fn sort_key(&self) -> Result<(u32, u32)> {
        Ok((self.owner.encode(CodedIndexType::TypeOrMethodDef)?, self.number))
    }
}

impl RowReadable for GenericParamRaw {
    const TABLE_ID: TableId = TableId::GenericParam;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* number */    2 +
            /* flags */     2 +
            /* owner */     sizes.coded_index_bytes(CodedIndexType::TypeOrMethodDef) +
            /* name */      sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            token: Token::new(0x2A00_0000 + rid),
            number: u32::from(read_le_at::<u16>(data, offset)?),
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            owner: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for GenericParamRaw {
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
        write_le_at_dyn(data, offset, self.number, false)?;
        write_le_at_dyn(data, offset, self.flags, false)?;
        self.owner
            .write(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
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
            0x01, 0x00, // number
            0x00, 0x00, // flags
            0x06, 0x00, // owner: TypeDef 3
            0x2A, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::new_test(&[(TableId::TypeDef, 3)], false, false, false));
        let mut offset = 0;
        let row = GenericParamRaw::row_read(&data, &mut offset, 2, &sizes).unwrap();

        assert_eq!(row.token.value(), 0x2A000002);
        assert_eq!(row.number, 1);
        assert_eq!(row.owner, CodedIndex::new(TableId::TypeDef, 3));
        assert_eq!(row.sort_key().unwrap(), (6, 1));
    }
}
