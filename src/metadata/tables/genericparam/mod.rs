//! The `GenericParam` table (0x2A): one row per type parameter, in declaration order.
//! Sorted by `owner`, then `number`.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `GenericParamAttributes`
pub mod GenericParamAttributes {
    /// These 2 bits contain one of the variance values
    pub const VARIANCE_MASK: u32 = 0x0003;
    /// The generic parameter is covariant
    pub const COVARIANT: u32 = 0x0001;
    /// The generic parameter is contravariant
    pub const CONTRAVARIANT: u32 = 0x0002;
}
