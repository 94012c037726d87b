//! # Coded Index Types Module
//!
//! Coded indices combine a table identifier and row index into a single value by using the
//! lower bits to encode which table is referenced and the remaining bits for the row.
//! This allows a column to reference different kinds of entities (e.g. `TypeDef`, `TypeRef`
//! or `TypeSpec`) with one compact value.
//!
//! - [`CodedIndexType`]: the coded index combinations defined in ECMA-335
//! - [`CodedIndex`]: a decoded (or to-be-encoded) reference with its computed token
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Section II.24.2.6

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{TableId, TableInfoRef},
        token::Token,
    },
    Error, Result,
};

/// Represents all coded index types defined in the CLI metadata specification.
///
/// A coded index type defines which combination of metadata tables can be referenced
/// by a particular coded index column. The number of tag bits is `ceil(log2(n))` where `n`
/// is the number of tables in the combination.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables.
    TypeDefOrRef,

    /// References `Field`, `Param`, or `Property` tables.
    HasConstant,

    /// References any entity that can have custom attributes attached.
    HasCustomAttribute,

    /// References `Field` or `Param` tables.
    HasFieldMarshal,

    /// References `TypeDef`, `MethodDef`, or `Assembly` tables.
    HasDeclSecurity,

    /// References `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, or `TypeSpec` tables.
    ///
    /// Used as the parent of member references, e.g. attribute constructors.
    MemberRefParent,

    /// References `Event` or `Property` tables.
    HasSemantics,

    /// References `MethodDef` or `MemberRef` tables.
    MethodDefOrRef,

    /// References `Field` or `MethodDef` tables.
    MemberForwarded,

    /// References `File`, `AssemblyRef`, or `ExportedType` tables.
    Implementation,

    /// References `MethodDef` or `MemberRef` tables for attribute constructors.
    ///
    /// Tags 0, 1 and 4 are unused; `MethodDef` is tag 2 and `MemberRef` is tag 3.
    CustomAttributeType,

    /// References `Module`, `ModuleRef`, `AssemblyRef`, or `TypeRef` tables.
    ResolutionScope,

    /// References `TypeDef` or `MethodDef` tables.
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Returns the tables that can be referenced by this coded index type, in tag order.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity, // labeled 'Permission' in the standard
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            // Placeholders keep the 3-bit tag layout; only tags 2 and 3 are meaningful
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of low bits used for the table tag
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let count = self.tables().len();
        // ceil(log2(count)) for count >= 2
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }

    /// Returns the tag that selects `table` within this coded index type
    #[must_use]
    pub fn tag_of(&self, table: TableId) -> Option<u32> {
        match (self, table) {
            (CodedIndexType::CustomAttributeType, TableId::MethodDef) => Some(2),
            (CodedIndexType::CustomAttributeType, TableId::MemberRef) => Some(3),
            (CodedIndexType::CustomAttributeType, _) => None,
            _ => self
                .tables()
                .iter()
                .position(|candidate| *candidate == table)
                .and_then(|tag| u32::try_from(tag).ok()),
        }
    }
}

/// A decoded representation of a coded index value.
///
/// - `tag`: The metadata table being referenced
/// - `row`: The 1-based row index within that table (0 is a null reference)
/// - `token`: The token for the same row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The [`TableId`] this index is referring to.
    pub tag: TableId,

    /// The row ID that this `CodedIndex` is pointing to.
    pub row: u32,

    /// The computed metadata token for this coded index.
    pub token: Token,
}

impl CodedIndex {
    /// Creates a new `CodedIndex` with the specified table and row.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Creates a null reference, encoded as 0 regardless of the coded index type
    #[must_use]
    pub fn null() -> CodedIndex {
        CodedIndex::new(TableId::TypeDef, 0)
    }

    /// Returns true if this index does not reference a row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }

    /// Reads and decodes a coded index from a byte buffer.
    ///
    /// ## Errors
    ///
    /// Returns an error if the buffer is too small or the tag is not valid for `ci_type`.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfoRef,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let is_large = info.coded_index_bytes(ci_type) == 4;
        let coded_index = read_le_at_dyn(data, offset, is_large)?;

        let (tag, row) = info.decode_coded_index(coded_index, ci_type)?;
        Ok(CodedIndex::new(tag, row))
    }

    /// Encodes this reference as a `ci_type` coded index value.
    ///
    /// A null reference always encodes to 0.
    ///
    /// ## Errors
    ///
    /// Returns an error if `ci_type` cannot reference the table of this index, or the row
    /// does not fit next to the tag bits.
    pub fn encode(&self, ci_type: CodedIndexType) -> Result<u32> {
        if self.is_null() {
            return Ok(0);
        }

        let Some(tag) = ci_type.tag_of(self.tag) else {
            return Err(malformed_error!(
                "{:?} can not reference table {:?}",
                ci_type,
                self.tag
            ));
        };

        let bits = ci_type.tag_bits();
        if self.row >= (1 << (32 - bits)) {
            return Err(malformed_error!(
                "Row {} does not fit into a {:?} coded index",
                self.row,
                ci_type
            ));
        }

        Ok((self.row << bits) | tag)
    }

    /// Encodes and writes this reference with the column width `info` dictates.
    ///
    /// ## Errors
    ///
    /// Returns an error if encoding fails or the buffer is too small.
    pub fn write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        info: &TableInfoRef,
        ci_type: CodedIndexType,
    ) -> Result<()> {
        let value = self.encode(ci_type)?;
        write_le_at_dyn(data, offset, value, info.coded_index_bytes(ci_type) == 4)
    }
}

impl TryFrom<Token> for CodedIndex {
    type Error = Error;

    /// Converts a non-null token of a known table into a `CodedIndex`.
    fn try_from(token: Token) -> Result<Self> {
        if token.is_null() {
            return Err(malformed_error!("Cannot convert null token to CodedIndex"));
        }

        match TableId::from_token_table(token.table()) {
            Some(table) => Ok(CodedIndex::new(table, token.row())),
            None => Err(malformed_error!("Unknown table ID: 0x{:02x}", token.table())),
        }
    }
}
