//! The `Assembly` table (0x20): the identity of the component itself.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `AssemblyFlags`
pub mod AssemblyFlags {
    /// The assembly reference holds the full (unhashed) public key
    pub const PUBLIC_KEY: u32 = 0x0001;
    /// The implementation of this assembly used at runtime is not expected to match the version seen at compile time
    pub const RETARGETABLE: u32 = 0x0100;
    /// The assembly contains Windows Runtime types (`ContentType` = `WindowsRuntime`)
    pub const CONTENT_TYPE_WINDOWS_RUNTIME: u32 = 0x0200;
}

#[allow(non_snake_case)]
/// All possible values for `AssemblyHashAlgorithm`
pub mod AssemblyHashAlgorithm {
    /// No hash algorithm specified
    pub const NONE: u32 = 0x0000;
    /// SHA1 hash algorithm
    pub const SHA1: u32 = 0x8004;
}
