//! Blob Heap (`#Blob`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#Blob` heap, which stores binary data such as signatures
//! and custom attribute values, and the de-duplicating [`BlobBuilder`] the table builder fills.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::collections::HashMap;

use crate::{
    utils::{read_compressed_uint, to_u32, write_compressed_uint},
    Error::OutOfBounds,
    Result,
};

/// '#Blob' points to streams of bytes. Each 'valid' blob is pointed to by a table column, and
/// each is prefixed with its compressed length.
///
/// * If the first one byte of the 'blob' is 0bbbbbbb, then the rest of the 'blob' contains the
///   bbbbbbb bytes of actual data.
/// * If the first two bytes of the 'blob' are 10bbbbbb and x, then the rest of the 'blob'
///   contains the (bbbbbb << 8 + x) bytes of actual data.
/// * If the first four bytes of the 'blob' are 110bbbbb, x, y, and z, then the rest of the
///   'blob' contains the (bbbbb << 24 + x << 16 + y << 8 + z) bytes of actual data.
///
/// # Examples
///
/// ```rust
/// use winmdgen::metadata::streams::Blob;
/// let data = &[0u8, 0x03, 0x41, 0x42, 0x43];
/// let blob = Blob::from(data).unwrap();
/// assert_eq!(blob.get(1).unwrap(), &[0x41, 0x42, 0x43]);
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.4
///
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is empty or doesn't start with a null byte (invalid blob heap format)
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Get a view into the bytes contained at the provided location.
    ///
    /// ## Arguments
    /// * 'index' - The offset within the blob to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or if the blob length cannot be parsed
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut data_start = index;
        let len = read_compressed_uint(self.data, &mut data_start)? as usize;

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }
}

/// De-duplicating builder for the `#Blob` heap.
///
/// Identical byte sequences share one entry. The empty blob is always offset 0.
#[derive(Debug, Clone)]
pub struct BlobBuilder {
    data: Vec<u8>,
    offsets: HashMap<Vec<u8>, u32>,
}

impl Default for BlobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobBuilder {
    /// Creates a heap holding only the empty blob
    #[must_use]
    pub fn new() -> Self {
        BlobBuilder {
            data: vec![0],
            offsets: HashMap::new(),
        }
    }

    /// Adds `value` with its length prefix and returns its heap offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob is too long for a compressed length.
    pub fn add(&mut self, value: &[u8]) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }
        if let Some(offset) = self.offsets.get(value) {
            return Ok(*offset);
        }

        let offset = to_u32(self.data.len())?;
        write_compressed_uint(to_u32(value.len())?, &mut self.data)?;
        self.data.extend_from_slice(value);
        self.offsets.insert(value.to_vec(), offset);

        Ok(offset)
    }

    /// Current heap size in bytes, before padding
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if only the empty blob is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }

    /// The raw heap bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = {
            let mut data = vec![0xCC; 300];
            /* i - 0    - should always be 0    */ data[0]          = 0b_00000000_u8;

            /* i - 1    - len 10                */ data[1]          = 0b_00001010_u8;
            /* i - 1    - len 10                */ data[2..12]      .copy_from_slice(&[0x0A; 10]);

            /* i - 12   - len 5                 */ data[12]         = 0b_00000101_u8;
            /* i - 12   - len 5                 */ data[13..18]     .copy_from_slice(&[0xAB; 5]);

            /* i - 18   - invalid               */ data[18]         = 0b_11111111_u8;

            /* i - 19   - len 257               */ data[19]         = 0b_10000001_u8;
            /* i - 19   - len 257               */ data[20]         = 0b_00000001_u8;
            /* i - 19   - len 257               */ data[21..278]    .copy_from_slice(&[0xBA; 257]);
            data
        };

        let blob = Blob::from(&data).unwrap();

        assert_eq!(blob.get(0).unwrap(), &[] as &[u8]);
        assert_eq!(blob.get(1).unwrap(), &[0x0A; 10]);
        assert_eq!(blob.get(12).unwrap(), &[0xAB; 5]);
        assert!(blob.get(18).is_err());
        assert_eq!(blob.get(19).unwrap(), &[0xBA; 257][..]);
        assert!(blob.get(300).is_err());
    }

    #[test]
    fn truncated() {
        let data = [0x00, 0x05, 0x01, 0x02];
        let blob = Blob::from(&data).unwrap();
        assert!(blob.get(1).is_err());
    }

    #[test]
    fn dedup() {
        let mut builder = BlobBuilder::new();
        assert_eq!(builder.add(&[]).unwrap(), 0);

        let sig = builder.add(&[0x20, 0x00, 0x01]).unwrap();
        let other = builder.add(&[0x06, 0x08]).unwrap();
        assert_eq!(sig, 1);
        assert_eq!(other, 5);
        assert_eq!(builder.add(&[0x20, 0x00, 0x01]).unwrap(), sig);

        let heap = Blob::from(builder.data()).unwrap();
        assert_eq!(heap.get(sig as usize).unwrap(), &[0x20, 0x00, 0x01]);
        assert_eq!(heap.get(other as usize).unwrap(), &[0x06, 0x08]);
    }

    #[test]
    fn long_blob_prefix() {
        let mut builder = BlobBuilder::new();
        let offset = builder.add(&[0x11; 200]).unwrap();
        assert_eq!(&builder.data()[1..3], &[0x80, 0xC8]);

        let heap = Blob::from(builder.data()).unwrap();
        assert_eq!(heap.get(offset as usize).unwrap().len(), 200);
    }
}
