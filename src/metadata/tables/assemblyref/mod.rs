//! The `AssemblyRef` table (0x23): the assemblies external types resolve against, e.g.
//! `mscorlib` and `Windows.Foundation.FoundationContract`.

mod raw;

pub use raw::*;
