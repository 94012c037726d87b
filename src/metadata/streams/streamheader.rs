//! Stream Header for .NET Metadata Streams
//!
//! Provides parsing and emission of stream headers, which describe the name, offset, and size of
//! each metadata stream. The writer lays out one header per stream right after the metadata root.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, write_le_at},
    utils::align_to,
    Error::OutOfBounds,
    Result,
};

/// The stream names a Windows Runtime metadata image may carry
pub const STREAM_NAMES: [&str; 5] = ["#~", "#Strings", "#US", "#GUID", "#Blob"];

/// A stream header provides the names, and the position and length of a particular table or heap. Note that the
/// length of a Stream header structure is not fixed, but depends on the length of its name field (a variable
/// length null-terminated string, padded to a 4-byte boundary).
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Memory offset with start of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4
    pub size: u32,
    /// Name of Stream\0 max 32char
    pub name: String,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the stream name is unknown
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let name_bytes = &data[8..std::cmp::min(data.len(), 8 + 32)];
        let name_len = name_bytes
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| malformed_error!("Stream header name is not terminated"))?;
        let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

        if !STREAM_NAMES.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Size of the serialized header, including the padded name
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        8 + align_to(self.name.len() + 1, 4)
    }

    /// Serializes this header at `offset`, advancing it past the padded name.
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the buffer is too small.
    pub fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        let end = *offset + self.encoded_size();
        if end > data.len() {
            return Err(OutOfBounds);
        }

        write_le_at(data, offset, self.offset)?;
        write_le_at(data, offset, self.size)?;

        data[*offset..*offset + self.name.len()].copy_from_slice(self.name.as_bytes());
        data[*offset + self.name.len()..end].fill(0);
        *offset = end;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
    }

    #[test]
    fn crafted_invalid() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
    }

    #[test]
    fn write_pads_name() {
        let header = StreamHeader {
            offset: 0x70,
            size: 0x1C,
            name: "#Strings".to_string(),
        };
        assert_eq!(header.encoded_size(), 20);

        let mut buffer = vec![0xFF; 20];
        let mut offset = 0;
        header.write(&mut buffer, &mut offset).unwrap();

        assert_eq!(offset, 20);
        assert_eq!(&buffer[0..4], &[0x70, 0, 0, 0]);
        assert_eq!(&buffer[8..16], b"#Strings");
        assert_eq!(&buffer[16..20], &[0, 0, 0, 0]);
        assert_eq!(StreamHeader::from(&buffer).unwrap(), header);
    }

    #[test]
    fn write_short_name() {
        let header = StreamHeader {
            offset: 0,
            size: 4,
            name: "#US".to_string(),
        };
        assert_eq!(header.encoded_size(), 12);

        let mut small = vec![0; 11];
        let mut offset = 0;
        assert!(header.write(&mut small, &mut offset).is_err());
    }
}
