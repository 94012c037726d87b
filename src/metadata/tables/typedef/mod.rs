//! The `TypeDef` table (0x02) and its flag constants.
//!
//! Every type of the component gets one row, preceded by the `<Module>` pseudo type in row 1.
//! Each row owns a contiguous run of `Field` and `MethodDef` rows, delimited by the
//! `field_list` / `method_list` of the next row.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// Type attribute flag constants for `TypeDef` entries.
///
/// ## Visibility Flags
/// - [`TypeAttributes::NOT_PUBLIC`] / [`TypeAttributes::PUBLIC`] - Top-level type visibility
///
/// ## Layout Flags
/// - [`TypeAttributes::AUTO_LAYOUT`] - Runtime-determined field layout (default)
/// - [`TypeAttributes::SEQUENTIAL_LAYOUT`] - Fields laid out in declaration order, used for structs
///
/// ## Semantic Flags
/// - [`TypeAttributes::CLASS`] / [`TypeAttributes::INTERFACE`] - Type category
/// - [`TypeAttributes::ABSTRACT`] / [`TypeAttributes::SEALED`] - Inheritance modifiers
/// - [`TypeAttributes::WINDOWS_RUNTIME`] - The type is a Windows Runtime type
pub mod TypeAttributes {
    /// Mask for extracting type visibility information.
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;

    /// Type has no public scope (internal to assembly).
    pub const NOT_PUBLIC: u32 = 0x0000_0000;

    /// Type has public scope (visible outside assembly).
    pub const PUBLIC: u32 = 0x0000_0001;

    /// Mask for extracting class layout information.
    pub const LAYOUT_MASK: u32 = 0x0000_0018;

    /// Class fields are automatically laid out by the runtime.
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;

    /// Class fields are laid out sequentially in declaration order.
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;

    /// Mask for extracting class semantics information.
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;

    /// Type is a class.
    pub const CLASS: u32 = 0x0000_0000;

    /// Type is an interface.
    pub const INTERFACE: u32 = 0x0000_0020;

    /// Class is abstract; every interface carries this flag.
    pub const ABSTRACT: u32 = 0x0000_0080;

    /// Class cannot be extended.
    pub const SEALED: u32 = 0x0000_0100;

    /// Class name is special.
    pub const SPECIAL_NAME: u32 = 0x0000_0400;

    /// Class or interface is imported.
    pub const IMPORT: u32 = 0x0000_1000;

    /// The type is a Windows Runtime type, shares its bit with the legacy `Serializable` flag.
    pub const WINDOWS_RUNTIME: u32 = 0x0000_4000;

    /// Initialize the class any time before first static field access.
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}
