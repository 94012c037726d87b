//! Metadata root header and stream directory.
//!
//! This module defines the [`Root`] struct, which represents the root metadata header and stream
//! directory as specified by ECMA-335. The writer builds one with [`Root::new`] and serializes it
//! in front of the streams; the artifact reader parses it back with [`Root::read`].
//!
//! # Example
//!
//! ```rust
//! use winmdgen::metadata::root::Root;
//! let root = Root::read(&[
//!            0x42, 0x53, 0x4A, 0x42,
//!            0x01, 0x00,
//!            0x01, 0x00,
//!            0x00, 0x00, 0x00, 0x00,
//!            0x08, 0x00, 0x00, 0x00,
//!            b'v', b'4', b'.', b'0', 0x00, 0x00, 0x00, 0x00,
//!            0x00, 0x00,
//!            0x01, 0x00,
//!            0x28, 0x00, 0x00, 0x00, // StreamHeader
//!            0x04, 0x00, 0x00, 0x00,
//!            0x23, 0x7E, 0x00, 0x00,
//!            0x00, 0x00, 0x00, 0x00,
//!        ])?;
//! assert_eq!(root.version, "v4.0");
//! # Ok::<(), winmdgen::Error>(())
//! ```
//!
//! # References
//!
//! - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at, write_le_at},
    metadata::streams::StreamHeader,
    utils::{align_to, to_u32},
    Error::OutOfBounds,
    Result,
};

/// The MAGIC value indicating the CIL header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Version string of Windows Runtime metadata
pub const WINRT_METADATA_VERSION: &str = "WindowsRuntime 1.4";

/// The header of the present Metadata, providing necessary information for parsing.
///
/// ## Reference
/// - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// Always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold version string, including padding
    pub length: u32,
    /// 'VersionString', without the terminating NUL and padding
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of Streams
    pub stream_number: u16,
    /// Streams
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Creates a version 1.1 root for the given version string and stream directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the directory holds more streams than the
    /// format allows.
    pub fn new(version: &str, stream_headers: Vec<StreamHeader>) -> Result<Root> {
        let stream_number = u16::try_from(stream_headers.len())
            .map_err(|_| malformed_error!("Too many streams"))?;

        Ok(Root {
            signature: CIL_HEADER_MAGIC,
            major_version: 1,
            minor_version: 1,
            reserved: 0,
            length: to_u32(align_to(version.len() + 1, 4))?,
            version: version.to_string(),
            flags: 0,
            stream_number,
            stream_headers,
        })
    }

    /// Size of the serialized root, including the stream directory
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        20 + self.length as usize
            + self
                .stream_headers
                .iter()
                .map(StreamHeader::encoded_size)
                .sum::<usize>()
    }

    /// Serializes the root and stream directory at `offset`.
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the buffer is too small.
    pub fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        if *offset + self.encoded_size() > data.len() {
            return Err(OutOfBounds);
        }

        write_le_at(data, offset, self.signature)?;
        write_le_at(data, offset, self.major_version)?;
        write_le_at(data, offset, self.minor_version)?;
        write_le_at(data, offset, self.reserved)?;
        write_le_at(data, offset, self.length)?;

        let version_end = *offset + self.length as usize;
        data[*offset..*offset + self.version.len()].copy_from_slice(self.version.as_bytes());
        data[*offset + self.version.len()..version_end].fill(0);
        *offset = version_end;

        write_le_at(data, offset, self.flags)?;
        write_le_at(data, offset, self.stream_number)?;
        for header in &self.stream_headers {
            header.write(data, offset)?;
        }

        Ok(())
    }

    /// Reads a [`Root`] metadata header from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The metadata, starting at the root
    ///
    /// # Errors
    /// Returns an error if the data is too short, the signature is invalid, or the stream directory is malformed.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 36 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let version_string_length = read_le_at::<u32>(data, &mut 12)?;
        let Some(str_end) = (version_string_length as usize).checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causing integer overflow - {} + {}",
                version_string_length,
                16
            ));
        };
        if str_end + 4 > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..str_end];
        let version_len = version_bytes
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8_lossy(&version_bytes[..version_len]).into_owned();

        let flags = read_le::<u16>(&data[str_end..])?;
        let stream_count = read_le::<u16>(&data[str_end + 2..])?;
        if stream_count == 0 || stream_count > 5 {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams: Vec<StreamHeader> = Vec::with_capacity(stream_count as usize);
        let mut stream_offset = str_end + 4;
        for _ in 0..stream_count {
            if stream_offset > data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[stream_offset..])?;
            if streams.iter().any(|s| s.name == new_stream.name) {
                return Err(malformed_error!("Duplicate stream - {}", new_stream.name));
            }

            match u32::checked_add(new_stream.offset, new_stream.size) {
                Some(range) if range as usize <= data.len() => {}
                Some(_) => return Err(OutOfBounds),
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            stream_offset += new_stream.encoded_size();
            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_string_length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }

    /// Looks up a stream header by name
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x00, 0x20,
            0x00, 0x30,
            0x00, 0x00, 0x00, 0x40,
            0x08, 0x00, 0x00, 0x00,
            b'H', b'E', b'L', b'L', b'O', 0x00, 0x00, 0x00,
            0x00, 0x60,
            0x01, 0x00,

            0x24, 0x00, 0x00, 0x00, // StreamHeader
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let parsed_header = Root::read(&header_bytes).unwrap();

        assert_eq!(parsed_header.signature, CIL_HEADER_MAGIC);
        assert_eq!(parsed_header.major_version, 0x2000);
        assert_eq!(parsed_header.minor_version, 0x3000);
        assert_eq!(parsed_header.reserved, 0x40000000);
        assert_eq!(parsed_header.length, 8);
        assert_eq!(parsed_header.version, "HELLO");
        assert_eq!(parsed_header.flags, 0x6000);
        assert_eq!(parsed_header.stream_number, 1);
        assert_eq!(parsed_header.stream_headers[0].offset, 0x24);
        assert_eq!(parsed_header.stream_headers[0].size, 0x4);
        assert_eq!(parsed_header.stream_headers[0].name, "#~");
    }

    #[test]
    fn bad_magic() {
        let mut data = [0u8; 40];
        data[0] = 0x42;
        assert!(Root::read(&data).is_err());
    }

    #[test]
    fn write_read_winrt_version() {
        let root = Root::new(
            WINRT_METADATA_VERSION,
            vec![
                StreamHeader {
                    offset: 0x54,
                    size: 4,
                    name: "#~".to_string(),
                },
                StreamHeader {
                    offset: 0x58,
                    size: 4,
                    name: "#Strings".to_string(),
                },
            ],
        )
        .unwrap();

        // 18 characters plus NUL, padded
        assert_eq!(root.length, 20);
        assert_eq!(root.encoded_size(), 20 + 20 + 12 + 20);

        let mut data = vec![0u8; 0x5C];
        let mut offset = 0;
        root.write(&mut data, &mut offset).unwrap();
        assert_eq!(offset, root.encoded_size());
        assert_eq!(&data[16..34], WINRT_METADATA_VERSION.as_bytes());

        let parsed = Root::read(&data).unwrap();
        assert_eq!(parsed, root);
        assert_eq!(parsed.stream("#Strings").unwrap().offset, 0x58);
        assert!(parsed.stream("#Blob").is_none());
    }

    #[test]
    fn duplicate_stream() {
        let root = Root::new(
            "v1",
            vec![
                StreamHeader {
                    offset: 0,
                    size: 4,
                    name: "#~".to_string(),
                },
                StreamHeader {
                    offset: 0,
                    size: 4,
                    name: "#~".to_string(),
                },
            ],
        )
        .unwrap();

        let mut data = vec![0u8; 64];
        let mut offset = 0;
        root.write(&mut data, &mut offset).unwrap();
        assert!(Root::read(&data).is_err());
    }
}
