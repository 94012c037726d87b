//! The `PropertyMap` table (0x15): maps a type to the first row of its contiguous run of Propertys.

mod raw;

pub use raw::*;
