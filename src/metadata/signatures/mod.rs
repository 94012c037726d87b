//! Method, field, property and type specification signatures.
//!
//! Signatures encode type information, method parameters, generic arity and calling
//! conventions in the compact binary format stored in the `#Blob` heap. The table builder
//! produces them with the encoders; [`SignatureParser`] reads them back from an emitted artifact.
//!
//! # Binary Format
//!
//! - Calling conventions encoded as single bytes
//! - Parameter counts using compressed integers
//! - Type references as `TypeDefOrRefOrSpecEncoded` compressed integers
//! - Generic parameters encoded with positional indices
//!
//! # Examples
//!
//! ```rust
//! use winmdgen::metadata::signatures::{parse_method_signature, TypeSignature};
//!
//! let method_sig = parse_method_signature(&[0x20, 0x01, 0x01, 0x0E])?;
//! assert_eq!(method_sig.params[0].base, TypeSignature::String);
//! # Ok::<(), winmdgen::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod encoders;
mod parser;
mod types;

pub use encoders::*;
pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a `SignatureMethod` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed
pub fn parse_method_signature(data: &[u8]) -> Result<SignatureMethod> {
    SignatureParser::new(data).parse_method_signature()
}

/// Parse a `SignatureField` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed
pub fn parse_field_signature(data: &[u8]) -> Result<SignatureField> {
    SignatureParser::new(data).parse_field_signature()
}

/// Parse a `SignatureProperty` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed
pub fn parse_property_signature(data: &[u8]) -> Result<SignatureProperty> {
    SignatureParser::new(data).parse_property_signature()
}

/// Parse a `SignatureTypeSpec` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed
pub fn parse_type_spec_signature(data: &[u8]) -> Result<SignatureTypeSpec> {
    SignatureParser::new(data).parse_type_spec_signature()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    #[test]
    fn encoded_signatures_parse_back() {
        let method = SignatureMethod {
            has_this: true,
            param_count_generic: 0,
            return_type: SignatureParameter::new(TypeSignature::Class(Token::new(0x1B00_0001))),
            params: vec![
                SignatureParameter::new(TypeSignature::Boolean),
                SignatureParameter::new(TypeSignature::ValueType(Token::new(0x0200_0004))),
            ],
        };
        let blob = encode_method_signature(&method).unwrap();
        assert_eq!(parse_method_signature(&blob).unwrap(), method);

        let property = SignatureProperty {
            has_this: true,
            base: TypeSignature::SzArray(Box::new(TypeSignature::String)),
            params: vec![],
        };
        let blob = encode_property_signature(&property).unwrap();
        assert_eq!(parse_property_signature(&blob).unwrap(), property);

        let field = SignatureField {
            base: TypeSignature::I4,
        };
        let blob = encode_field_signature(&field).unwrap();
        assert_eq!(parse_field_signature(&blob).unwrap(), field);
    }
}
