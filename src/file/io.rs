//! Bounds-checked little-endian reading and writing for metadata and PE structures.
//!
//! Everything in a `.winmd` image is little-endian. The helpers here are the only place
//! that converts between primitives and bytes; they never panic and report
//! [`crate::Error::OutOfBounds`] instead of slicing past the end of a buffer.
//!
//! - [`read_le`] / [`read_le_at`] - read a primitive, optionally advancing an offset
//! - [`read_le_at_dyn`] - read a 2- or 4-byte heap/table index
//! - [`write_le_at`] / [`write_le_at_dyn`] - the writing counterparts
//!
//! ```rust,ignore
//! let mut buffer = [0u8; 6];
//! let mut offset = 0;
//! write_le_at::<u16>(&mut buffer, &mut offset, 0x1234)?;
//! write_le_at_dyn(&mut buffer, &mut offset, 0x0506_0708, true)?;
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<u16>(&buffer, &mut offset)?, 0x1234);
//! ```

use crate::{Error::OutOfBounds, Result};

/// Endian-aware conversion between a primitive and its byte representation.
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cil_io {
    ($($ty:ty => $n:literal),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_cil_io!(u8 => 1, u16 => 2, u32 => 4, u64 => 8, i32 => 4);

/// Reads a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is too short.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value of type `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let end = offset.checked_add(type_len).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Reads either a 2-byte or a 4-byte index, promoted to `u32`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    if is_large {
        read_le_at::<u32>(data, offset)
    } else {
        Ok(u32::from(read_le_at::<u16>(data, offset)?))
    }
}

/// Writes `value` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le_at<T: CilIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    let end = offset.checked_add(bytes.len()).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

/// Writes `value` as a 4-byte index when `is_large`, otherwise as a 2-byte index.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small, or
/// [`crate::Error::Malformed`] if a small index does not fit into 16 bits.
pub fn write_le_at_dyn(
    data: &mut [u8],
    offset: &mut usize,
    value: u32,
    is_large: bool,
) -> Result<()> {
    if is_large {
        write_le_at::<u32>(data, offset, value)
    } else {
        let small = u16::try_from(value)
            .map_err(|_| malformed_error!("Index {} does not fit a 2-byte column", value))?;
        write_le_at::<u16>(data, offset, small)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_u32() {
        let mut buffer = [0u8; 4];
        let mut offset = 0;
        write_le_at::<u32>(&mut buffer, &mut offset, 0x1234_5678).unwrap();
        assert_eq!(buffer, [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(offset, 4);
        assert_eq!(read_le::<u32>(&buffer).unwrap(), 0x1234_5678);
    }

    #[test]
    fn dyn_sizes() {
        let mut buffer = [0u8; 6];
        let mut offset = 0;
        write_le_at_dyn(&mut buffer, &mut offset, 0x0102, false).unwrap();
        write_le_at_dyn(&mut buffer, &mut offset, 0x0304_0506, true).unwrap();
        assert_eq!(offset, 6);

        let mut offset = 0;
        assert_eq!(read_le_at_dyn(&buffer, &mut offset, false).unwrap(), 0x0102);
        assert_eq!(read_le_at_dyn(&buffer, &mut offset, true).unwrap(), 0x0304_0506);
    }

    #[test]
    fn small_column_overflow() {
        let mut buffer = [0u8; 2];
        let mut offset = 0;
        assert!(write_le_at_dyn(&mut buffer, &mut offset, 0x1_0000, false).is_err());
    }

    #[test]
    fn out_of_bounds() {
        let data = [0u8; 3];
        let mut offset = 0;
        assert!(matches!(read_le_at::<u32>(&data, &mut offset), Err(OutOfBounds)));
        assert_eq!(offset, 0);

        let mut buffer = [0u8; 1];
        assert!(write_le_at::<u16>(&mut buffer, &mut offset, 1).is_err());
    }
}
