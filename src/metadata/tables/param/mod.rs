//! The `Param` table (0x08): named parameters of methods, numbered from 1.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `ParamAttributes`
pub mod ParamAttributes {
    /// Param is [In]
    pub const IN: u32 = 0x0001;
    /// Param is [out]
    pub const OUT: u32 = 0x0002;
    /// Param is optional
    pub const OPTIONAL: u32 = 0x0010;
    /// Param has default value
    pub const HAS_DEFAULT: u32 = 0x1000;
}
