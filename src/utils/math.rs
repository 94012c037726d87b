//! Mathematical utility functions.

use crate::Result;

/// Converts a `usize` to `u32` for PE serialization, returning an error if the value
/// exceeds `u32::MAX`. All metadata structures are bounded well below this limit.
///
/// # Errors
///
/// Returns an error if `value` exceeds `u32::MAX`.
pub fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| malformed_error!("PE serialization value {value} exceeds u32::MAX"))
}

/// Rounds `value` up to the next multiple of `alignment`, which must be a power of two.
///
/// ```rust,ignore
/// assert_eq!(align_to(5, 4), 8);
/// assert_eq!(align_to(0x200, 0x200), 0x200);
/// ```
#[must_use]
pub fn align_to(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment() {
        assert_eq!(align_to(0, 4), 0);
        assert_eq!(align_to(1, 4), 4);
        assert_eq!(align_to(4, 4), 4);
        assert_eq!(align_to(0x201, 0x200), 0x400);
    }

    #[test]
    fn narrowing() {
        assert_eq!(to_u32(42).unwrap(), 42);
        assert!(to_u32(usize::MAX).is_err());
    }
}
