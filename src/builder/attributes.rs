//! The two custom attributes every Windows Runtime component carries.
//!
//! A class marks its first implemented interface as the default interface, and every
//! interface and delegate carries a `GuidAttribute` holding its interface id. Authored
//! types have no declared GUID, so the id is derived from the qualified name: the same
//! name always yields the same interface id, in every build.

use std::fmt;

use sha1::{Digest, Sha1};

use crate::{
    builder::{next_rid, MetadataBuilder},
    metadata::{
        signatures::{encode_method_signature, SignatureMethod, SignatureParameter, TypeSignature},
        tables::{CodedIndex, CustomAttributeRaw, MemberRefRaw, TableId},
        token::Token,
    },
    model::{QualifiedName, FOUNDATION_CONTRACT},
    Result,
};

const DEFAULT_ATTRIBUTE: &str = "Windows.Foundation.Metadata.DefaultAttribute";
const GUID_ATTRIBUTE: &str = "Windows.Foundation.Metadata.GuidAttribute";

/// Name space id all authored interface ids are derived in.
const NAMESPACE_ID: [u8; 16] = [
    0x11, 0xF4, 0x7A, 0xD5, 0x7B, 0x73, 0x42, 0xC0, 0xAB, 0xAE, 0x87, 0x8B, 0x1E, 0x16, 0xAD,
    0xEE,
];

/// Custom attribute blob prolog.
const PROLOG: [u8; 2] = [0x01, 0x00];

/// An interface id in its `GuidAttribute` constructor form.
///
/// ```rust
/// use winmdgen::builder::InterfaceGuid;
///
/// let guid = InterfaceGuid::from_name("Contoso.IWidget");
/// assert_eq!(guid, InterfaceGuid::from_name("Contoso.IWidget"));
/// assert_ne!(guid, InterfaceGuid::from_name("Contoso.IGadget"));
/// assert_eq!(guid.data3 >> 12, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceGuid {
    /// First 4 bytes
    pub data1: u32,
    /// Next 2 bytes
    pub data2: u16,
    /// Next 2 bytes, including the version
    pub data3: u16,
    /// Last 8 bytes, including the variant
    pub data4: [u8; 8],
}

impl InterfaceGuid {
    /// A name based (RFC 4122 version 5) id of `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(NAMESPACE_ID);
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        bytes[6] = (bytes[6] & 0x0F) | 0x50;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;

        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..]);
        InterfaceGuid {
            data1: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_be_bytes([bytes[4], bytes[5]]),
            data3: u16::from_be_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }

    /// The `GuidAttribute(u32, u16, u16, u8 x 8)` value blob.
    #[must_use]
    pub fn to_attribute_blob(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(20);
        blob.extend_from_slice(&PROLOG);
        blob.extend_from_slice(&self.data1.to_le_bytes());
        blob.extend_from_slice(&self.data2.to_le_bytes());
        blob.extend_from_slice(&self.data3.to_le_bytes());
        blob.extend_from_slice(&self.data4);
        // No named arguments
        blob.extend_from_slice(&[0x00, 0x00]);
        blob
    }
}

impl fmt::Display for InterfaceGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;
        for byte in &self.data4[2..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl MetadataBuilder {
    /// The `MemberRef` row of the constructor of `attribute`, created on first use.
    fn attribute_constructor(&mut self, attribute: &str, params: Vec<TypeSignature>) -> Result<u32> {
        if let Some(rid) = self.member_ref_index.get(attribute) {
            return Ok(*rid);
        }

        let class = self.type_ref(&QualifiedName::parse(attribute), FOUNDATION_CONTRACT, false)?;
        let signature = encode_method_signature(&SignatureMethod {
            has_this: true,
            param_count_generic: 0,
            return_type: SignatureParameter::new(TypeSignature::Void),
            params: params.into_iter().map(SignatureParameter::new).collect(),
        })?;

        let rid = next_rid(self.member_refs.len())?;
        let name = self.strings.add(".ctor")?;
        let signature = self.blobs.add(&signature)?;
        self.member_refs.push(MemberRefRaw {
            rid,
            token: Token::from_parts(TableId::MemberRef, rid),
            class: CodedIndex::new(TableId::TypeRef, class),
            name,
            signature,
        });
        self.member_ref_index.insert(attribute.to_string(), rid);
        Ok(rid)
    }

    fn push_attribute(&mut self, parent: CodedIndex, constructor: u32, value: &[u8]) -> Result<()> {
        let rid = next_rid(self.custom_attributes.len())?;
        let value = self.blobs.add(value)?;
        self.custom_attributes.push(CustomAttributeRaw {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            parent,
            constructor: CodedIndex::new(TableId::MemberRef, constructor),
            value,
        });
        Ok(())
    }

    /// Marks an `InterfaceImpl` row as the default interface of its class.
    pub(super) fn add_default_attribute(&mut self, interface_impl: u32) -> Result<()> {
        let constructor = self.attribute_constructor(DEFAULT_ATTRIBUTE, Vec::new())?;
        self.push_attribute(
            CodedIndex::new(TableId::InterfaceImpl, interface_impl),
            constructor,
            &[PROLOG[0], PROLOG[1], 0x00, 0x00],
        )
    }

    /// Attaches the name derived interface id to an interface or delegate.
    pub(super) fn add_guid_attribute(&mut self, type_def: u32, name: &QualifiedName) -> Result<()> {
        let mut params = vec![TypeSignature::U4, TypeSignature::U2, TypeSignature::U2];
        params.extend(std::iter::repeat(TypeSignature::U1).take(8));
        let constructor = self.attribute_constructor(GUID_ATTRIBUTE, params)?;

        let guid = InterfaceGuid::from_name(&name.to_string());
        self.push_attribute(
            CodedIndex::new(TableId::TypeDef, type_def),
            constructor,
            &guid.to_attribute_blob(),
        )
    }
}
