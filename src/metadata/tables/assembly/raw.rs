use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
/// The Assembly table holds the identity of the current assembly. `TableId` = 0x20
pub struct AssemblyRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 4-byte constant of type `AssemblyHashAlgorithm`
    pub hash_alg_id: u32,
    /// a 2-byte constant
    pub major_version: u32,
    /// a 2-byte constant
    pub minor_version: u32,
    /// a 2-byte constant
    pub build_number: u32,
    /// a 2-byte constant
    pub revision_number: u32,
    /// a 4-byte bitmask of type `AssemblyFlags`
    pub flags: u32,
    /// an index into the Blob heap
    pub public_key: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub culture: u32,
}

impl RowReadable for AssemblyRaw {
    const TABLE_ID: TableId = TableId::Assembly;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* hash_alg_id */       4 +
            /* major_version */     2 +
            /* minor_version */     2 +
            /* build_number */      2 +
            /* revision_number */   2 +
            /* flags */             4 +
            /* public_key */        sizes.blob_bytes() +
            /* name */              sizes.str_bytes() +
            /* culture */           sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRaw {
            rid,
            token: Token::new(0x2000_0000 + rid),
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: u32::from(read_le_at::<u16>(data, offset)?),
            minor_version: u32::from(read_le_at::<u16>(data, offset)?),
            build_number: u32::from(read_le_at::<u16>(data, offset)?),
            revision_number: u32::from(read_le_at::<u16>(data, offset)?),
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for AssemblyRaw {
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
        write_le_at::<u32>(data, offset, self.hash_alg_id)?;
        write_le_at_dyn(data, offset, self.major_version, false)?;
        write_le_at_dyn(data, offset, self.minor_version, false)?;
        write_le_at_dyn(data, offset, self.build_number, false)?;
        write_le_at_dyn(data, offset, self.revision_number, false)?;
        write_le_at::<u32>(data, offset, self.flags)?;
        write_le_at_dyn(data, offset, self.public_key, sizes.is_large_blob())?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.culture, sizes.is_large_str())?;
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
            0x04, 0x80, 0x00, 0x00, // hash_alg_id
            0x01, 0x00, // major_version
            0x02, 0x00, // minor_version
            0x03, 0x00, // build_number
            0x04, 0x00, // revision_number
            0x00, 0x02, 0x00, 0x00, // flags
            0x00, 0x00, // public_key
            0x10, 0x00, // name
            0x00, 0x00, // culture
        ];

        let sizes = Arc::new(TableInfo::new_test(&[], false, false, false));
        let mut offset = 0;
        let row = AssemblyRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();

        assert_eq!(row.token.value(), 0x20000001);
        assert_eq!(row.hash_alg_id, 0x8004);
        assert_eq!(
            (row.major_version, row.minor_version, row.build_number, row.revision_number),
            (1, 2, 3, 4)
        );
        assert_eq!(row.flags, 0x0200);
        assert_eq!(row.name, 0x10);

        let mut buffer = vec![0u8; data.len()];
        let mut offset = 0;
        row.row_write(&mut buffer, &mut offset, 1, &sizes).unwrap();
        assert_eq!(buffer, data);
    }
}
