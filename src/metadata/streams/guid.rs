//! GUID Heap (`#GUID`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#GUID` heap, which stores 128-bit GUIDs, and the
//! [`GuidBuilder`] used for the module version id.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{utils::to_u32, Error::OutOfBounds, Result};

/// '#GUID' is a heap, which contains a sequence of 128-bit GUIDs. Indexes are 1-based.
///
/// # Examples
///
/// ```rust
/// use winmdgen::metadata::streams::Guid;
/// let data = [0xAAu8; 16];
/// let guid_heap = Guid::from(&data).unwrap();
/// assert_eq!(guid_heap.get(1).unwrap().to_bytes(), [0xAA; 16]);
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.5
///
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too small to contain a valid GUID (less than 16 bytes)
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() < 16 {
            return Err(malformed_error!("Data for #Guid heap is too small"));
        }

        Ok(Guid { data })
    }

    /// Returns the GUID at the specified 1-based index
    ///
    /// ## Arguments
    /// * 'index' - The index of the GUID to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is 0 or past the end of the heap
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index < 1 || index * 16 > self.data.len() {
            return Err(OutOfBounds);
        }

        let start = (index - 1) * 16;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[start..start + 16]);

        Ok(uguid::Guid::from_bytes(buffer))
    }
}

/// Builder for the `#GUID` heap
#[derive(Debug, Clone, Default)]
pub struct GuidBuilder {
    guids: Vec<uguid::Guid>,
}

impl GuidBuilder {
    /// Creates an empty heap
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `guid` and returns its 1-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index does not fit 32 bits.
    pub fn add(&mut self, guid: uguid::Guid) -> Result<u32> {
        self.guids.push(guid);
        to_u32(self.guids.len())
    }

    /// Replaces the GUID at a 1-based index; used to patch the module version id once the
    /// content hash is known.
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] for an index that was never handed out.
    pub fn set(&mut self, index: u32, guid: uguid::Guid) -> Result<()> {
        let slot = (index as usize)
            .checked_sub(1)
            .and_then(|i| self.guids.get_mut(i))
            .ok_or(OutOfBounds)?;
        *slot = guid;
        Ok(())
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn len(&self) -> usize {
        self.guids.len()
    }

    /// Returns true if no GUID was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guids.is_empty()
    }

    /// Serializes the heap
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.guids.iter().flat_map(|guid| guid.to_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data : [u8; 48] = [
            0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let guids = Guid::from(&data).unwrap();

        assert_eq!(
            guids.get(1).unwrap(),
            uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5")
        );
        assert_eq!(
            guids.get(2).unwrap(),
            uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA")
        );
        assert_eq!(guids.get(3).unwrap(), uguid::Guid::ZERO);
        assert!(guids.get(0).is_err());
        assert!(guids.get(4).is_err());
    }

    #[test]
    fn builder_patch() {
        let mut builder = GuidBuilder::new();
        let mvid = builder.add(uguid::Guid::ZERO).unwrap();
        assert_eq!(mvid, 1);

        let patched = uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5");
        builder.set(mvid, patched).unwrap();
        assert!(builder.set(2, patched).is_err());
        assert!(builder.set(0, patched).is_err());

        let bytes = builder.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(Guid::from(&bytes).unwrap().get(1).unwrap(), patched);
    }
}
