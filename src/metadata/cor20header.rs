//! CLR 2.0 (Cor20) header parsing for .NET assemblies.
//!
//! This module defines the [`Cor20Header`] struct, which represents the main header of a CLI image
//! as found in the IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR data directory of PE files. The writer
//! emits a metadata-only header with [`Cor20Header::metadata_only`].
//!
//! # Reference
//! - [ECMA-335 II.24](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le_at, write_le_at},
    Error::OutOfBounds,
    Result,
};

/// Size of the CLI header in bytes
pub const COR20_HEADER_SIZE: u32 = 72;

/// The image contains only IL code
pub const COMIMAGE_FLAGS_ILONLY: u32 = 0x0000_0001;

/// The main header of CIL, located at the beginning of the `IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR` data
/// directory of PE files.
///
/// This struct contains all fields defined by the ECMA-335 standard for the CLR 2.0 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cor20Header {
    /// Size of header in bytes
    pub cb: u32,
    /// The minimum version of runtime required to run this program
    pub major_runtime_version: u16,
    /// The minor portion of the version
    pub minor_runtime_version: u16,
    /// RVA of the `MetaData`
    pub meta_data_rva: u32,
    /// Size of the `MetaData`
    pub meta_data_size: u32,
    /// Flags describing this runtime
    pub flags: u32,
    /// Token for the `MethodDef` or File of the entry point for the image
    pub entry_point_token: u32,
    /// RVA of implementation specific resources
    pub resource_rva: u32,
    /// Size of implementation specific resources
    pub resource_size: u32,
    /// RVA of the hash data for this pe file used by the CLI loader for binding and versioning
    pub strong_name_signature_rva: u32,
    /// Size of the hash data
    pub strong_name_signature_size: u32,
    /// Always 0
    pub code_manager_table_rva: u32,
    /// Always 0
    pub code_manager_table_size: u32,
    /// RVA of an array of locations in the file that contain an array of functions pointers
    pub vtable_fixups_rva: u32,
    /// Size of an array of locations in the file that contain an array of functions pointers
    pub vtable_fixups_size: u32,
    /// Always 0
    pub export_address_table_jmp_rva: u32,
    /// Always 0
    pub export_address_table_jmp_size: u32,
    /// Always 0
    pub managed_native_header_rva: u32,
    /// Always 0
    pub managed_native_header_size: u32,
}

impl Cor20Header {
    /// A header for an image that carries metadata and nothing else: runtime 2.5, `ILONLY`,
    /// no entry point, resources, strong name or fixups.
    #[must_use]
    pub fn metadata_only(meta_data_rva: u32, meta_data_size: u32) -> Cor20Header {
        Cor20Header {
            cb: COR20_HEADER_SIZE,
            major_runtime_version: 2,
            minor_runtime_version: 5,
            meta_data_rva,
            meta_data_size,
            flags: COMIMAGE_FLAGS_ILONLY,
            entry_point_token: 0,
            resource_rva: 0,
            resource_size: 0,
            strong_name_signature_rva: 0,
            strong_name_signature_size: 0,
            code_manager_table_rva: 0,
            code_manager_table_size: 0,
            vtable_fixups_rva: 0,
            vtable_fixups_size: 0,
            export_address_table_jmp_rva: 0,
            export_address_table_jmp_size: 0,
            managed_native_header_rva: 0,
            managed_native_header_size: 0,
        }
    }

    /// Serializes the header at `offset`.
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the buffer is too small.
    pub fn write(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        if *offset + COR20_HEADER_SIZE as usize > data.len() {
            return Err(OutOfBounds);
        }

        write_le_at(data, offset, self.cb)?;
        write_le_at(data, offset, self.major_runtime_version)?;
        write_le_at(data, offset, self.minor_runtime_version)?;
        for value in [
            self.meta_data_rva,
            self.meta_data_size,
            self.flags,
            self.entry_point_token,
            self.resource_rva,
            self.resource_size,
            self.strong_name_signature_rva,
            self.strong_name_signature_size,
            self.code_manager_table_rva,
            self.code_manager_table_size,
            self.vtable_fixups_rva,
            self.vtable_fixups_size,
            self.export_address_table_jmp_rva,
            self.export_address_table_jmp_size,
            self.managed_native_header_rva,
            self.managed_native_header_size,
        ] {
            write_le_at(data, offset, value)?;
        }

        Ok(())
    }

    /// Create a `Cor20Header` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short to contain a valid CLR header,
    /// or if any field validation fails per ECMA-335 II.24.3.3.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        const VALID_FLAGS: u32 = 0x0000_001F; // Based on ECMA-335 defined flags

        if data.len() < 72 {
            return Err(OutOfBounds);
        }

        let mut offset = 0;

        let cb = read_le_at::<u32>(data, &mut offset)?;
        if cb != COR20_HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = read_le_at::<u16>(data, &mut offset)?;
        let minor_runtime_version = read_le_at::<u16>(data, &mut offset)?;
        if major_runtime_version == 0 || major_runtime_version > 10 {
            return Err(malformed_error!(
                "Invalid major runtime version: {}",
                major_runtime_version
            ));
        }

        let meta_data_rva = read_le_at::<u32>(data, &mut offset)?;

        if meta_data_rva == 0 {
            return Err(malformed_error!("Metadata RVA cannot be zero"));
        }

        let meta_data_size = read_le_at::<u32>(data, &mut offset)?;
        if meta_data_size == 0 {
            return Err(malformed_error!("Metadata size cannot be zero"));
        } else if meta_data_size > 0x1000_0000 {
            return Err(malformed_error!(
                "Metadata size {} exceeds reasonable limit (256MB)",
                meta_data_size
            ));
        }

        let flags = read_le_at::<u32>(data, &mut offset)?;
        if flags & !VALID_FLAGS != 0 {
            return Err(malformed_error!(
                "Invalid CLR flags: 0x{:08X} contains undefined bits",
                flags
            ));
        }

        let entry_point_token = read_le_at::<u32>(data, &mut offset)?;

        let resource_rva = read_le_at::<u32>(data, &mut offset)?;
        let resource_size = read_le_at::<u32>(data, &mut offset)?;
        if (resource_rva == 0 && resource_size != 0) || (resource_rva != 0 && resource_size == 0) {
            return Err(malformed_error!("Resource values are invalid"));
        }

        let strong_name_signature_rva = read_le_at::<u32>(data, &mut offset)?;
        let strong_name_signature_size = read_le_at::<u32>(data, &mut offset)?;
        if (strong_name_signature_rva == 0 && strong_name_signature_size != 0)
            || (strong_name_signature_rva != 0 && strong_name_signature_size == 0)
        {
            return Err(malformed_error!("Strong name values are invalid"));
        }

        let code_manager_table_rva = read_le_at::<u32>(data, &mut offset)?;
        let code_manager_table_size = read_le_at::<u32>(data, &mut offset)?;
        if code_manager_table_rva != 0 || code_manager_table_size != 0 {
            return Err(malformed_error!(
                "Code Manager Table fields must be zero (reserved)"
            ));
        }

        let vtable_fixups_rva = read_le_at::<u32>(data, &mut offset)?;
        let vtable_fixups_size = read_le_at::<u32>(data, &mut offset)?;
        if (vtable_fixups_rva == 0 && vtable_fixups_size != 0)
            || (vtable_fixups_rva != 0 && vtable_fixups_size == 0)
        {
            return Err(malformed_error!("VTable fixups are invalid"));
        }

        let export_address_table_jmp_rva = read_le_at::<u32>(data, &mut offset)?;
        let export_address_table_jmp_size = read_le_at::<u32>(data, &mut offset)?;
        if export_address_table_jmp_rva != 0 || export_address_table_jmp_size != 0 {
            return Err(malformed_error!(
                "Export Address Table Jump fields must be zero (reserved)"
            ));
        }

        let managed_native_header_rva = read_le_at::<u32>(data, &mut offset)?;
        let managed_native_header_size = read_le_at::<u32>(data, &mut offset)?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
            resource_rva,
            resource_size,
            strong_name_signature_rva,
            strong_name_signature_size,
            code_manager_table_rva,
            code_manager_table_size,
            vtable_fixups_rva,
            vtable_fixups_size,
            export_address_table_jmp_rva,
            export_address_table_jmp_size,
            managed_native_header_rva,
            managed_native_header_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x48, 0x00, 0x00, 0x00, // cb = 72 (0x48)
            0x02, 0x00,             // major_runtime_version = 2
            0x03, 0x00,             // minor_runtime_version = 3
            0x00, 0x00, 0x00, 0x04, // meta_data_rva = 0x04000000
            0x00, 0x00, 0x00, 0x05, // meta_data_size = 0x05000000
            0x00, 0x00, 0x00, 0x00, // flags = 0 (valid flags)
            0x00, 0x00, 0x00, 0x07, // entry_point_token = 0x07000000
            0x00, 0x00, 0x00, 0x00, // resource_rva = 0 (no resources)
            0x00, 0x00, 0x00, 0x00, // resource_size = 0
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva = 0
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_size = 0
            0x00, 0x00, 0x00, 0x00, // code_manager_table_rva = 0 (reserved)
            0x00, 0x00, 0x00, 0x00, // code_manager_table_size = 0 (reserved)
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_rva = 0
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_size = 0
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_rva = 0 (reserved)
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_size = 0 (reserved)
            0x00, 0x00, 0x00, 0x00, // managed_native_header_rva = 0 (reserved)
            0x00, 0x00, 0x00, 0x00  // managed_native_header_size = 0 (reserved)
        ];

        let parsed_header = Cor20Header::read(&header_bytes).unwrap();

        assert_eq!(parsed_header.cb, 72);
        assert_eq!(parsed_header.major_runtime_version, 2);
        assert_eq!(parsed_header.minor_runtime_version, 3);
        assert_eq!(parsed_header.meta_data_rva, 0x04000000);
        assert_eq!(parsed_header.meta_data_size, 0x05000000);
        assert_eq!(parsed_header.flags, 0);
        assert_eq!(parsed_header.entry_point_token, 0x07000000);
        assert_eq!(parsed_header.resource_rva, 0);
        assert_eq!(parsed_header.resource_size, 0);
        assert_eq!(parsed_header.strong_name_signature_rva, 0);
        assert_eq!(parsed_header.strong_name_signature_size, 0);
        assert_eq!(parsed_header.code_manager_table_rva, 0);
        assert_eq!(parsed_header.code_manager_table_size, 0);
        assert_eq!(parsed_header.vtable_fixups_rva, 0);
        assert_eq!(parsed_header.vtable_fixups_size, 0);
        assert_eq!(parsed_header.export_address_table_jmp_rva, 0);
        assert_eq!(parsed_header.export_address_table_jmp_size, 0);
        assert_eq!(parsed_header.managed_native_header_rva, 0);
        assert_eq!(parsed_header.managed_native_header_size, 0);
    }

    #[test]
    fn metadata_only_round_trip() {
        let header = Cor20Header::metadata_only(0x2048, 0x1F4);

        let mut data = vec![0u8; 72];
        let mut offset = 0;
        header.write(&mut data, &mut offset).unwrap();
        assert_eq!(offset, 72);
        assert_eq!(&data[0..8], &[0x48, 0, 0, 0, 0x02, 0x00, 0x05, 0x00]);
        assert_eq!(&data[8..12], &[0x48, 0x20, 0, 0]);
        assert_eq!(&data[16..20], &[0x01, 0, 0, 0]);

        assert_eq!(Cor20Header::read(&data).unwrap(), header);
    }

    #[test]
    fn write_short_buffer() {
        let header = Cor20Header::metadata_only(0x2048, 0x1F4);
        let mut data = vec![0u8; 71];
        let mut offset = 0;
        assert!(header.write(&mut data, &mut offset).is_err());
    }
}
