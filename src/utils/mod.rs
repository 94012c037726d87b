//! Small helpers shared by the heaps, signature encoders and the PE writer.

mod compressed;
mod math;

pub use compressed::{read_compressed_uint, write_compressed_uint};
pub use math::{align_to, to_u32};
