//! The `TypeRef` table (0x01): types that live in other assemblies, such as `System.Object`
//! or `Windows.Foundation.IAsyncAction`.

mod raw;

pub use raw::*;
