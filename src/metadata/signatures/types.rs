use crate::metadata::token::Token;

#[allow(non_snake_case, missing_docs)]
/// Element types used in signatures (II.23.1.16)
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
}

#[allow(non_snake_case)]
/// Calling convention bits of method and property signatures (II.23.2.1)
pub mod CALLING_CONVENTION {
    /// Managed default calling convention
    pub const DEFAULT: u8 = 0x00;
    /// The method has generic parameters
    pub const GENERIC: u8 = 0x10;
    /// Instance method, a 'this' pointer is passed
    pub const HASTHIS: u8 = 0x20;
    /// The 'this' pointer is listed explicitly in the parameters
    pub const EXPLICITTHIS: u8 = 0x40;
}

#[allow(non_snake_case)]
/// Leading bytes of non-method signatures
pub mod SIGNATURE_HEADER {
    /// Field signature (II.23.2.4)
    pub const FIELD: u8 = 0x06;
    /// Property signature (II.23.2.5)
    pub const PROPERTY: u8 = 0x08;
}

/// A type as it appears inside a signature blob
///
/// Class and value type references carry a TypeDef, TypeRef or TypeSpec token, which is
/// compressed into a `TypeDefOrRefOrSpecEncoded` value when the blob is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSignature {
    /// void
    #[default]
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// System.Object
    Object,
    /// System.IntPtr
    I,
    /// CIL value-type
    ValueType(Token),
    /// CIL Class
    Class(Token),
    /// Generic parameter of the enclosing type, by ordinal
    GenericParamType(u32),
    /// Generic parameter of the enclosing method, by ordinal
    GenericParamMethod(u32),
    /// Single dimension, zero based array
    SzArray(Box<TypeSignature>),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
}

/// Parameter or return type of a method signature
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureParameter {
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

impl SignatureParameter {
    /// A by-value parameter of type `base`
    #[must_use]
    pub fn new(base: TypeSignature) -> Self {
        SignatureParameter {
            by_ref: false,
            base,
        }
    }
}

/// Represents a method signature (II.23.2.1)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureMethod {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// Number of generic parameters of the method itself
    pub param_count_generic: u32,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// The parameters of this `Method`
    pub params: Vec<SignatureParameter>,
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureField {
    /// The signature of this type
    pub base: TypeSignature,
}

/// Property signature (II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureProperty {
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The signature of this property
    pub base: TypeSignature,
    /// The parameters of this property (indexers)
    pub params: Vec<SignatureParameter>,
}

/// Type specification signature (II.23.2.14)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureTypeSpec {
    /// Signature of this type
    pub base: TypeSignature,
}
