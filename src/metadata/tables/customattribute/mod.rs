//! The `CustomAttribute` table (0x0C): the interop attributes attached to types and
//! interface implementations. Sorted by `parent`.

mod raw;

pub use raw::*;
