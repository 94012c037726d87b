//! The `InterfaceImpl` table (0x09): which type implements which interface.
//!
//! The table is sorted by `class`, then by `interface`.

mod raw;

pub use raw::*;
