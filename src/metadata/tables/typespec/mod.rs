//! The `TypeSpec` table (0x1B): closed generic instantiations such as
//! `IVector<String>`, one row per distinct signature.

mod raw;

pub use raw::*;
