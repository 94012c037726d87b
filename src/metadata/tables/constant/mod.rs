//! The `Constant` table (0x0B): literal values of enum members. Sorted by `parent`.

mod raw;

pub use raw::*;
