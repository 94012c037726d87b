//! The `Module` table (0x00): a single row naming this module and carrying its MVID.

mod raw;

pub use raw::*;
