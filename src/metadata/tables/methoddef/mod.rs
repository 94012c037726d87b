//! The `MethodDef` table (0x06) and the method attribute flags.
//!
//! Windows Runtime metadata carries no method bodies: every row has an RVA of 0 and is
//! implemented by the runtime.

mod raw;

pub use raw::*;

use bitflags::bitflags;

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug)]
    /// Method attribute flags (`MethodAttributes`)
    pub struct MethodAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method can not be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug)]
    /// Method implementation flags (`MethodImplAttributes`)
    pub struct MethodImplAttributes: u32 {
        /// Method impl is IL
        const IL = 0x0000;
        /// Method impl is provided by the runtime
        const RUNTIME = 0x0003;
    }
}
