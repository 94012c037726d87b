//! The metadata block: root, stream directory and the five streams.
//!
//! The module version id and the image timestamp are derived from the content: a SHA-1
//! over the tables stream and the heaps (with the MVID slot still zeroed) seeds both, so
//! the same tables always produce the same bytes.

use log::debug;
use sha1::{Digest, Sha1};

use crate::{
    builder::TableSet,
    metadata::{
        root::{Root, WINRT_METADATA_VERSION},
        streams::{StreamHeader, EMPTY_USER_STRINGS, STREAM_NAMES},
    },
    utils::{align_to, to_u32},
    writer::tables::TableWriter,
    Result,
};

/// Slot of the module version id in the `#GUID` heap.
const MVID_INDEX: u32 = 1;

/// Serialized metadata plus the identity derived from it.
#[derive(Debug, Clone)]
pub(crate) struct MetadataImage {
    /// Root, directory and streams
    pub bytes: Vec<u8>,
    /// Content derived module version id
    pub mvid: uguid::Guid,
    /// Content derived COFF timestamp
    pub timestamp: u32,
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut data = data.to_vec();
    data.resize(align_to(data.len(), 4), 0);
    data
}

/// A name based id: SHA-1 digest bytes with the version 5 and variant bits set.
fn content_guid(digest: &[u8]) -> uguid::Guid {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = (bytes[6] & 0x0F) | 0x50;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    uguid::Guid::from_bytes(bytes)
}

/// Serializes every stream of `tables` behind a `WindowsRuntime 1.4` root.
pub(crate) fn write_metadata(tables: &TableSet) -> Result<MetadataImage> {
    let strings = padded(tables.strings().data());
    let blobs = padded(tables.blobs().data());
    let user_strings = EMPTY_USER_STRINGS.to_vec();

    let table_stream =
        TableWriter::new(tables, strings.len(), tables.guids().len(), blobs.len()).write()?;

    let mut hasher = Sha1::new();
    hasher.update(&table_stream);
    hasher.update(&strings);
    hasher.update(&blobs);
    hasher.update(tables.guids().to_bytes());
    let digest = hasher.finalize();

    let mvid = content_guid(&digest);
    let timestamp = u32::from_le_bytes([digest[16], digest[17], digest[18], digest[19]]);

    let mut guids = tables.guids().clone();
    guids.set(MVID_INDEX, mvid)?;
    let guids = guids.to_bytes();

    let streams: [&[u8]; 5] = [&table_stream, &strings, &user_strings, &guids, &blobs];

    // Names are fixed, so the root size does not depend on the offsets
    let mut headers = STREAM_NAMES
        .iter()
        .zip(streams.iter())
        .map(|(name, data)| {
            Ok(StreamHeader {
                offset: 0,
                size: to_u32(data.len())?,
                name: (*name).to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let root_size = Root::new(WINRT_METADATA_VERSION, headers.clone())?.encoded_size();
    let mut offset = align_to(root_size, 4);
    for header in &mut headers {
        header.offset = to_u32(offset)?;
        offset += header.size as usize;
    }

    let root = Root::new(WINRT_METADATA_VERSION, headers)?;
    let mut bytes = vec![0u8; offset];
    let mut cursor = 0;
    root.write(&mut bytes, &mut cursor)?;

    for (header, data) in root.stream_headers.iter().zip(streams.iter()) {
        let start = header.offset as usize;
        bytes[start..start + data.len()].copy_from_slice(data);
        debug!("{} at {:#x}, {} bytes", header.name, header.offset, header.size);
    }

    Ok(MetadataImage {
        bytes,
        mvid,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{AssemblyVersion, MetadataBuilder},
        metadata::streams::Guid,
    };

    fn tables(name: &str) -> TableSet {
        MetadataBuilder::new(name, AssemblyVersion::default())
            .unwrap()
            .finalize()
            .unwrap()
    }

    #[test]
    fn streams_are_aligned() {
        let image = write_metadata(&tables("Contoso")).unwrap();
        let root = Root::read(&image.bytes).unwrap();

        assert_eq!(root.version, WINRT_METADATA_VERSION);
        let names: Vec<&str> = root.stream_headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, STREAM_NAMES);
        for header in &root.stream_headers {
            assert_eq!(header.offset % 4, 0);
            assert_eq!(header.size % 4, 0);
        }
    }

    #[test]
    fn mvid_is_patched_and_content_derived() {
        let first = write_metadata(&tables("Contoso")).unwrap();
        let again = write_metadata(&tables("Contoso")).unwrap();
        let other = write_metadata(&tables("Fabrikam")).unwrap();

        assert_eq!(first.bytes, again.bytes);
        assert_ne!(first.mvid, other.mvid);
        assert_ne!(first.timestamp, other.timestamp);
        assert_ne!(first.mvid, uguid::Guid::ZERO);

        let root = Root::read(&first.bytes).unwrap();
        let header = root.stream("#GUID").unwrap();
        let start = header.offset as usize;
        let heap = Guid::from(&first.bytes[start..start + header.size as usize]).unwrap();
        assert_eq!(heap.get(1).unwrap(), first.mvid);
    }
}
