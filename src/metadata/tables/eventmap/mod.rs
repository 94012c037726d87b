//! The `EventMap` table (0x12): maps a type to the first row of its contiguous run of Events.

mod raw;

pub use raw::*;
