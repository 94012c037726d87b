use strum::{EnumCount, EnumIter};

/// Identifiers for the metadata tables defined in ECMA-335 partition II, section 22.
///
/// The discriminant is the table number used in tokens and in the `valid` / `sorted` bit
/// vectors of the `#~` stream. Iteration order ([`strum::IntoEnumIterator`]) is ascending
/// table number, which is also the order in which row counts and rows are serialized.
///
/// Only a subset is ever emitted for a Windows Runtime component; the rest exist so that
/// coded indexes have their correct tag layout and so that the reader accepts any valid
/// `valid` mask.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    /// `Module` (0x00) - exactly one row describing this module
    Module = 0x00,
    /// `TypeRef` (0x01) - references to types in other assemblies
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - types defined by this module, `<Module>` first
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - unoptimized metadata indirection, never emitted
    FieldPtr = 0x03,
    /// `Field` (0x04)
    Field = 0x04,
    /// `MethodPtr` (0x05) - never emitted
    MethodPtr = 0x05,
    /// `MethodDef` (0x06)
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - never emitted
    ParamPtr = 0x07,
    /// `Param` (0x08)
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - sorted by class, then interface
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A)
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - sorted by parent
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - sorted by parent
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D)
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E)
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F)
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10)
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11)
    StandAloneSig = 0x11,
    /// `EventMap` (0x12)
    EventMap = 0x12,
    /// `EventPtr` (0x13) - never emitted
    EventPtr = 0x13,
    /// `Event` (0x14)
    Event = 0x14,
    /// `PropertyMap` (0x15)
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - never emitted
    PropertyPtr = 0x16,
    /// `Property` (0x17)
    Property = 0x17,
    /// `MethodSemantics` (0x18) - sorted by association
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19)
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A)
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - generic instantiations
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C)
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D)
    FieldRVA = 0x1D,
    /// `EncLog` (0x1E)
    EncLog = 0x1E,
    /// `EncMap` (0x1F)
    EncMap = 0x1F,
    /// `Assembly` (0x20) - at most one row
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21)
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22)
    AssemblyOS = 0x22,
    /// `AssemblyRef` (0x23)
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24)
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25)
    AssemblyRefOS = 0x25,
    /// `File` (0x26)
    File = 0x26,
    /// `ExportedType` (0x27)
    ExportedType = 0x27,
    /// `ManifestResource` (0x28)
    ManifestResource = 0x28,
    /// `NestedClass` (0x29)
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - sorted by owner, then number
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B)
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C)
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Bit vector of the tables ECMA-335 requires to be sorted (II.24.2.6)
    pub const SORTED_MASK: u64 = 0x0000_1600_3301_FA00;

    /// Returns the table for the high byte of a token, if it names a known table
    #[must_use]
    pub fn from_token_table(table: u8) -> Option<TableId> {
        use strum::IntoEnumIterator;

        TableId::iter().find(|id| *id as u8 == table)
    }

    /// Returns true if this table is part of the sorted set
    #[must_use]
    pub fn is_sorted(self) -> bool {
        Self::SORTED_MASK & (1 << self as u64) != 0
    }
}
