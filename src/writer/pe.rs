//! The PE32 container around the metadata.
//!
//! A metadata-only image has no code, imports or relocations. Its single `.text`
//! section holds the CLI header immediately followed by the metadata block:
//!
//! | File offset | RVA      | Content                                   |
//! |-------------|----------|-------------------------------------------|
//! | `0x000`     |          | DOS header and stub                       |
//! | `0x080`     |          | `PE\0\0`, COFF and PE32 optional header   |
//! | `0x178`     |          | `.text` section header                    |
//! | `0x200`     | `0x2000` | CLI header (72 bytes)                     |
//! | `0x248`     | `0x2048` | Metadata root and streams                 |

use crate::{
    file::io::write_le_at,
    metadata::cor20header::{Cor20Header, COR20_HEADER_SIZE},
    utils::{align_to, to_u32},
    Result,
};

const PE_OFFSET: usize = 0x80;
const COFF_HEADER_SIZE: usize = 20;
const OPTIONAL_HEADER_SIZE: u16 = 0xE0;
const SECTION_HEADER_SIZE: usize = 40;

const MACHINE_I386: u16 = 0x014C;
/// `EXECUTABLE_IMAGE | 32BIT_MACHINE | DLL`
const IMAGE_CHARACTERISTICS: u16 = 0x2102;
const PE32_MAGIC: u16 = 0x010B;
const IMAGE_BASE: u32 = 0x1000_0000;
const SECTION_ALIGNMENT: u32 = 0x2000;
const FILE_ALIGNMENT: u32 = 0x200;
const SUBSYSTEM_WINDOWS_CUI: u16 = 3;
/// `DYNAMIC_BASE | NX_COMPAT | NO_SEH | TERMINAL_SERVER_AWARE`
const DLL_CHARACTERISTICS: u16 = 0x8540;
const DATA_DIRECTORIES: usize = 16;
const CLR_RUNTIME_HEADER_DIRECTORY: usize = 14;
/// `CNT_CODE | MEM_EXECUTE | MEM_READ`
const TEXT_CHARACTERISTICS: u32 = 0x6000_0020;

/// RVA of the `.text` section and of the CLI header.
pub(crate) const TEXT_RVA: u32 = SECTION_ALIGNMENT;
/// RVA of the metadata root.
pub(crate) const METADATA_RVA: u32 = TEXT_RVA + COR20_HEADER_SIZE;

#[rustfmt::skip]
const DOS_HEADER: [u8; PE_OFFSET] = [
    0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00,
    0xB8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00,
    // "This program cannot be run in DOS mode.\r\r\n$"
    0x0E, 0x1F, 0xBA, 0x0E, 0x00, 0xB4, 0x09, 0xCD, 0x21, 0xB8, 0x01, 0x4C, 0xCD, 0x21, 0x54, 0x68,
    0x69, 0x73, 0x20, 0x70, 0x72, 0x6F, 0x67, 0x72, 0x61, 0x6D, 0x20, 0x63, 0x61, 0x6E, 0x6E, 0x6F,
    0x74, 0x20, 0x62, 0x65, 0x20, 0x72, 0x75, 0x6E, 0x20, 0x69, 0x6E, 0x20, 0x44, 0x4F, 0x53, 0x20,
    0x6D, 0x6F, 0x64, 0x65, 0x2E, 0x0D, 0x0D, 0x0A, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Lays out a complete image around `metadata`.
pub(crate) fn write_image(metadata: &[u8], timestamp: u32) -> Result<Vec<u8>> {
    let headers_end = PE_OFFSET
        + 4
        + COFF_HEADER_SIZE
        + usize::from(OPTIONAL_HEADER_SIZE)
        + SECTION_HEADER_SIZE;
    let size_of_headers = align_to(headers_end, FILE_ALIGNMENT as usize);

    let text_size = COR20_HEADER_SIZE as usize + metadata.len();
    let text_raw_size = align_to(text_size, FILE_ALIGNMENT as usize);
    let size_of_image = align_to(TEXT_RVA as usize + text_size, SECTION_ALIGNMENT as usize);

    let mut data = vec![0u8; size_of_headers + text_raw_size];
    data[..PE_OFFSET].copy_from_slice(&DOS_HEADER);

    let mut cursor = PE_OFFSET;
    let offset = &mut cursor;
    data[*offset..*offset + 4].copy_from_slice(b"PE\0\0");
    *offset += 4;

    // COFF header
    write_le_at(&mut data, offset, MACHINE_I386)?;
    write_le_at(&mut data, offset, 1u16)?;
    write_le_at(&mut data, offset, timestamp)?;
    write_le_at(&mut data, offset, 0u32)?; // symbol table
    write_le_at(&mut data, offset, 0u32)?; // symbols
    write_le_at(&mut data, offset, OPTIONAL_HEADER_SIZE)?;
    write_le_at(&mut data, offset, IMAGE_CHARACTERISTICS)?;

    // PE32 optional header, standard fields
    write_le_at(&mut data, offset, PE32_MAGIC)?;
    write_le_at(&mut data, offset, 8u8)?; // linker major
    write_le_at(&mut data, offset, 0u8)?; // linker minor
    write_le_at(&mut data, offset, to_u32(text_raw_size)?)?; // code
    write_le_at(&mut data, offset, 0u32)?; // initialized data
    write_le_at(&mut data, offset, 0u32)?; // uninitialized data
    write_le_at(&mut data, offset, 0u32)?; // entry point
    write_le_at(&mut data, offset, TEXT_RVA)?; // base of code
    write_le_at(&mut data, offset, 0u32)?; // base of data

    // Windows specific fields
    write_le_at(&mut data, offset, IMAGE_BASE)?;
    write_le_at(&mut data, offset, SECTION_ALIGNMENT)?;
    write_le_at(&mut data, offset, FILE_ALIGNMENT)?;
    write_le_at(&mut data, offset, 4u16)?; // OS major
    write_le_at(&mut data, offset, 0u16)?;
    write_le_at(&mut data, offset, 0u16)?; // image major
    write_le_at(&mut data, offset, 0u16)?;
    write_le_at(&mut data, offset, 4u16)?; // subsystem major
    write_le_at(&mut data, offset, 0u16)?;
    write_le_at(&mut data, offset, 0u32)?; // win32 version
    write_le_at(&mut data, offset, to_u32(size_of_image)?)?;
    write_le_at(&mut data, offset, to_u32(size_of_headers)?)?;
    write_le_at(&mut data, offset, 0u32)?; // checksum
    write_le_at(&mut data, offset, SUBSYSTEM_WINDOWS_CUI)?;
    write_le_at(&mut data, offset, DLL_CHARACTERISTICS)?;
    write_le_at(&mut data, offset, 0x0010_0000u32)?; // stack reserve
    write_le_at(&mut data, offset, 0x0000_1000u32)?; // stack commit
    write_le_at(&mut data, offset, 0x0010_0000u32)?; // heap reserve
    write_le_at(&mut data, offset, 0x0000_1000u32)?; // heap commit
    write_le_at(&mut data, offset, 0u32)?; // loader flags
    write_le_at(&mut data, offset, to_u32(DATA_DIRECTORIES)?)?;

    for directory in 0..DATA_DIRECTORIES {
        let (rva, size) = if directory == CLR_RUNTIME_HEADER_DIRECTORY {
            (TEXT_RVA, COR20_HEADER_SIZE)
        } else {
            (0, 0)
        };
        write_le_at(&mut data, offset, rva)?;
        write_le_at(&mut data, offset, size)?;
    }

    // .text section header
    data[*offset..*offset + 8].copy_from_slice(b".text\0\0\0");
    *offset += 8;
    write_le_at(&mut data, offset, to_u32(text_size)?)?;
    write_le_at(&mut data, offset, TEXT_RVA)?;
    write_le_at(&mut data, offset, to_u32(text_raw_size)?)?;
    write_le_at(&mut data, offset, to_u32(size_of_headers)?)?;
    write_le_at(&mut data, offset, 0u32)?; // relocations
    write_le_at(&mut data, offset, 0u32)?; // line numbers
    write_le_at(&mut data, offset, 0u16)?;
    write_le_at(&mut data, offset, 0u16)?;
    write_le_at(&mut data, offset, TEXT_CHARACTERISTICS)?;
    debug_assert_eq!(*offset, headers_end);

    let mut text = size_of_headers;
    Cor20Header::metadata_only(METADATA_RVA, to_u32(metadata.len())?).write(&mut data, &mut text)?;
    data[text..text + metadata.len()].copy_from_slice(metadata);

    Ok(data)
}
