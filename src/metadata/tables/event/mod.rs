//! The `Event` table (0x14). Each event owns an `add_` and a `remove_` accessor through
//! `MethodSemantics`.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `EventAttributes`
pub mod EventAttributes {
    /// Event is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the event
    pub const RTSPECIAL_NAME: u32 = 0x0400;
}
