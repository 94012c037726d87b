//! ECMA-335 compressed unsigned integers (II.23.2).
//!
//! - Values < 0x80: 1 byte (`0xxxxxxx`)
//! - Values < 0x4000: 2 bytes (`10xxxxxx xxxxxxxx`)
//! - Values < 0x2000_0000: 4 bytes (`110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx`)
//!
//! All forms are big-endian, unlike every other integer in the metadata.

use crate::{file::io::read_le_at, Result};

/// Appends the compressed form of `value` to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for values of `0x2000_0000` and above, which have no
/// compressed representation.
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        0..=0x7F => buffer.push(value as u8),
        0x80..=0x3FFF => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push(value as u8);
        }
        0x4000..=0x1FFF_FFFF => {
            buffer.push(0xC0 | (value >> 24) as u8);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        _ => {
            return Err(malformed_error!(
                "Value 0x{:08x} is too large for a compressed integer",
                value
            ))
        }
    }

    Ok(())
}

/// Reads a compressed unsigned integer at `offset` and advances past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
/// [`crate::Error::Malformed`] for an invalid leading byte.
pub fn read_compressed_uint(data: &[u8], offset: &mut usize) -> Result<u32> {
    let first_byte = read_le_at::<u8>(data, offset)?;

    if (first_byte & 0x80) == 0 {
        return Ok(u32::from(first_byte));
    }

    if (first_byte & 0xC0) == 0x80 {
        let second_byte = read_le_at::<u8>(data, offset)?;
        return Ok(((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte));
    }

    if (first_byte & 0xE0) == 0xC0 {
        let b1 = u32::from(read_le_at::<u8>(data, offset)?);
        let b2 = u32::from(read_le_at::<u8>(data, offset)?);
        let b3 = u32::from(read_le_at::<u8>(data, offset)?);
        return Ok(((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3);
    }

    Err(malformed_error!("Invalid compressed uint - {}", first_byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecma_samples() {
        // II.23.2 lists these encodings
        for (value, expected) in [
            (0x03_u32, vec![0x03]),
            (0x7F, vec![0x7F]),
            (0x80, vec![0x80, 0x80]),
            (0x2E57, vec![0xAE, 0x57]),
            (0x3FFF, vec![0xBF, 0xFF]),
            (0x4000, vec![0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, vec![0xDF, 0xFF, 0xFF, 0xFF]),
        ] {
            let mut buffer = Vec::new();
            write_compressed_uint(value, &mut buffer).unwrap();
            assert_eq!(buffer, expected, "0x{:x}", value);

            let mut offset = 0;
            assert_eq!(read_compressed_uint(&buffer, &mut offset).unwrap(), value);
            assert_eq!(offset, buffer.len());
        }
    }

    #[test]
    fn too_large() {
        let mut buffer = Vec::new();
        assert!(write_compressed_uint(0x2000_0000, &mut buffer).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_lead_byte() {
        let mut offset = 0;
        assert!(read_compressed_uint(&[0xE0, 0, 0, 0], &mut offset).is_err());
    }
}
