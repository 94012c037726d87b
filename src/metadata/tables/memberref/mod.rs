//! The `MemberRef` table (0x0A): members of external types, here the constructors of the
//! interop attributes.

mod raw;

pub use raw::*;
