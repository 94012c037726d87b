//! String Heap (`#Strings`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#Strings` heap, which stores identifier strings in UTF-8 encoding,
//! and the [`StringsBuilder`] that interns identifiers while tables are being built.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::{collections::HashMap, ffi::CStr};

use crate::{utils::to_u32, Error::OutOfBounds, Result};

/// '#Strings' hold various identifiers which are referenced form other tables within the CIL metadata.
/// e.g. type names, namespaces, member names and parameter names.
///
/// # Examples
///
/// ```rust
/// use winmdgen::metadata::streams::Strings;
/// let data = &[0u8, b'H', b'e', b'l', b'l', b'o', 0u8];
/// let strings = Strings::from(data).unwrap();
/// assert_eq!(strings.get(1).unwrap(), "Hello");
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.3
///
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data'    - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the string heap data is empty or does not start with the empty string
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #String heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Get a view into the string contained at the provided location.
    ///
    /// ## Arguments
    /// * 'index' - The offset within the heap to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the string data is invalid UTF-8
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => result
                .to_str()
                .map_err(|_| malformed_error!("Invalid string at index - {}", index)),
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}

/// Interning builder for the `#Strings` heap.
///
/// Every distinct identifier is stored once; adding the same text again returns the first
/// offset. The empty string is always offset 0.
#[derive(Debug, Clone)]
pub struct StringsBuilder {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl Default for StringsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StringsBuilder {
    /// Creates a heap holding only the empty string
    #[must_use]
    pub fn new() -> Self {
        StringsBuilder {
            data: vec![0],
            offsets: HashMap::new(),
        }
    }

    /// Interns `value` and returns its heap offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the text contains an embedded NUL or the heap
    /// outgrows 32-bit offsets.
    pub fn add(&mut self, value: &str) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }
        if let Some(offset) = self.offsets.get(value) {
            return Ok(*offset);
        }
        if value.as_bytes().contains(&0) {
            return Err(malformed_error!("Identifier '{}' contains a NUL byte", value));
        }

        let offset = to_u32(self.data.len())?;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);

        Ok(offset)
    }

    /// Current heap size in bytes, before padding
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if only the empty string is present
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
        let data : [u8; 33] = [
            0x00,
            0x3c, 0x4d, 0x61, 0x69, 0x6e, 0x3e, 0x24, 0x00,
            0x43, 0x5f, 0x53, 0x68, 0x61, 0x72, 0x70, 0x5f, 0x50, 0x4f, 0x43, 0x5f, 0x31, 0x00,
            0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00,
            0x00,
        ];

        let str_view = Strings::from(&data).unwrap();

        assert_eq!(str_view.get(0).unwrap(), "");
        assert_eq!(str_view.get(1).unwrap(), "<Main>$");
        assert_eq!(str_view.get(9).unwrap(), "C_Sharp_POC_1");
        assert_eq!(str_view.get(23).unwrap(), "<Module>");
        assert!(str_view.get(33).is_err());
    }

    #[test]
    fn interning() {
        let mut builder = StringsBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.add("").unwrap(), 0);

        let widget = builder.add("Widget").unwrap();
        let contoso = builder.add("Contoso").unwrap();
        assert_eq!(widget, 1);
        assert_eq!(contoso, 8);
        assert_eq!(builder.add("Widget").unwrap(), widget);
        assert_eq!(builder.len(), 16);

        let heap = Strings::from(builder.data()).unwrap();
        assert_eq!(heap.get(widget as usize).unwrap(), "Widget");
        assert_eq!(heap.get(contoso as usize).unwrap(), "Contoso");
    }

    #[test]
    fn embedded_nul() {
        let mut builder = StringsBuilder::new();
        assert!(builder.add("Wid\0get").is_err());
        assert!(builder.is_empty());
    }
}
