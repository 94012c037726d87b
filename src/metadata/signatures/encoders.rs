//! Signature encoders for the `#Blob` heap.
//!
//! Each encoder implements the ECMA-335 binary format of one signature kind:
//!
//! - [`encode_method_signature`] - Method signatures for MethodDef and MemberRef
//! - [`encode_field_signature`] - Field signatures for the Field table
//! - [`encode_property_signature`] - Property signatures for the Property table
//! - [`encode_typespec_signature`] - Type specification signatures for the TypeSpec table

use crate::{
    metadata::{
        signatures::{
            SignatureField, SignatureMethod, SignatureParameter, SignatureProperty,
            SignatureTypeSpec, TypeSignature, CALLING_CONVENTION, ELEMENT_TYPE, SIGNATURE_HEADER,
        },
        tables::TableId,
        token::Token,
    },
    utils::{to_u32, write_compressed_uint},
    Result,
};

/// Encodes a token as a `TypeDefOrRefOrSpecEncoded` value (II.23.2.8).
///
/// - TypeDef: `(rid << 2) | 0`
/// - TypeRef: `(rid << 2) | 1`
/// - TypeSpec: `(rid << 2) | 2`
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the token's table is not TypeDef, TypeRef or TypeSpec.
pub fn encode_type_def_or_ref_coded_index(token: Token) -> Result<u32> {
    let rid = token.row();

    match TableId::from_token_table(token.table()) {
        Some(TableId::TypeDef) => Ok(rid << 2),
        Some(TableId::TypeRef) => Ok((rid << 2) | 1),
        Some(TableId::TypeSpec) => Ok((rid << 2) | 2),
        _ => Err(malformed_error!(
            "Invalid token table 0x{:02X} for TypeDefOrRef coded index - {}",
            token.table(),
            token
        )),
    }
}

/// Appends the encoding of a single type.
///
/// # Errors
///
/// Returns an error if a type token can not be encoded.
pub fn encode_type_signature(signature: &TypeSignature, buffer: &mut Vec<u8>) -> Result<()> {
    match signature {
        TypeSignature::Void => buffer.push(ELEMENT_TYPE::VOID),
        TypeSignature::Boolean => buffer.push(ELEMENT_TYPE::BOOLEAN),
        TypeSignature::Char => buffer.push(ELEMENT_TYPE::CHAR),
        TypeSignature::I1 => buffer.push(ELEMENT_TYPE::I1),
        TypeSignature::U1 => buffer.push(ELEMENT_TYPE::U1),
        TypeSignature::I2 => buffer.push(ELEMENT_TYPE::I2),
        TypeSignature::U2 => buffer.push(ELEMENT_TYPE::U2),
        TypeSignature::I4 => buffer.push(ELEMENT_TYPE::I4),
        TypeSignature::U4 => buffer.push(ELEMENT_TYPE::U4),
        TypeSignature::I8 => buffer.push(ELEMENT_TYPE::I8),
        TypeSignature::U8 => buffer.push(ELEMENT_TYPE::U8),
        TypeSignature::R4 => buffer.push(ELEMENT_TYPE::R4),
        TypeSignature::R8 => buffer.push(ELEMENT_TYPE::R8),
        TypeSignature::String => buffer.push(ELEMENT_TYPE::STRING),
        TypeSignature::Object => buffer.push(ELEMENT_TYPE::OBJECT),
        TypeSignature::I => buffer.push(ELEMENT_TYPE::I),
        TypeSignature::ValueType(token) => {
            buffer.push(ELEMENT_TYPE::VALUETYPE);
            write_compressed_uint(encode_type_def_or_ref_coded_index(*token)?, buffer)?;
        }
        TypeSignature::Class(token) => {
            buffer.push(ELEMENT_TYPE::CLASS);
            write_compressed_uint(encode_type_def_or_ref_coded_index(*token)?, buffer)?;
        }
        TypeSignature::GenericParamType(ordinal) => {
            buffer.push(ELEMENT_TYPE::VAR);
            write_compressed_uint(*ordinal, buffer)?;
        }
        TypeSignature::GenericParamMethod(ordinal) => {
            buffer.push(ELEMENT_TYPE::MVAR);
            write_compressed_uint(*ordinal, buffer)?;
        }
        TypeSignature::SzArray(element) => {
            buffer.push(ELEMENT_TYPE::SZARRAY);
            encode_type_signature(element, buffer)?;
        }
        TypeSignature::GenericInst(base, arguments) => {
            if !matches!(
                base.as_ref(),
                TypeSignature::Class(_) | TypeSignature::ValueType(_)
            ) {
                return Err(malformed_error!(
                    "GENERICINST base must be a class or value type - {:?}",
                    base
                ));
            }

            buffer.push(ELEMENT_TYPE::GENERICINST);
            encode_type_signature(base, buffer)?;
            write_compressed_uint(to_u32(arguments.len())?, buffer)?;
            for argument in arguments {
                encode_type_signature(argument, buffer)?;
            }
        }
    }

    Ok(())
}

/// `Param ::= [BYREF] Type`
fn encode_parameter(parameter: &SignatureParameter, buffer: &mut Vec<u8>) -> Result<()> {
    if parameter.by_ref {
        buffer.push(ELEMENT_TYPE::BYREF);
    }

    encode_type_signature(&parameter.base, buffer)
}

/// Encodes a method signature into binary format according to ECMA-335.
///
/// Method signatures encode:
/// - Calling convention byte
/// - Generic parameter count, for generic methods
/// - Parameter count (compressed integer)
/// - Return type
/// - Parameter types
///
/// # Errors
///
/// Returns an error if encoding any parameter or return type fails.
///
/// # Examples
///
/// ```rust
/// use winmdgen::metadata::signatures::*;
///
/// let signature = SignatureMethod {
///     has_this: true,
///     params: vec![SignatureParameter::new(TypeSignature::I4)],
///     ..Default::default()
/// };
///
/// assert_eq!(encode_method_signature(&signature)?, vec![0x20, 0x01, 0x01, 0x08]);
/// # Ok::<(), winmdgen::Error>(())
/// ```
pub fn encode_method_signature(signature: &SignatureMethod) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let mut calling_convention = CALLING_CONVENTION::DEFAULT;
    if signature.has_this {
        calling_convention |= CALLING_CONVENTION::HASTHIS;
    }
    if signature.param_count_generic > 0 {
        calling_convention |= CALLING_CONVENTION::GENERIC;
    }
    buffer.push(calling_convention);

    if signature.param_count_generic > 0 {
        write_compressed_uint(signature.param_count_generic, &mut buffer)?;
    }

    write_compressed_uint(to_u32(signature.params.len())?, &mut buffer)?;

    encode_parameter(&signature.return_type, &mut buffer)?;
    for param in &signature.params {
        encode_parameter(param, &mut buffer)?;
    }

    Ok(buffer)
}

/// Encodes a field signature: the `FIELD` prolog followed by the field type.
///
/// # Errors
///
/// Returns an error if encoding the field type fails.
pub fn encode_field_signature(signature: &SignatureField) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::FIELD];
    encode_type_signature(&signature.base, &mut buffer)?;
    Ok(buffer)
}

/// Encodes a property signature.
///
/// Property signatures encode:
/// - Property signature prolog (0x08 | HASTHIS if instance property)
/// - Parameter count (compressed integer)
/// - Property type
/// - Index parameter types (for indexers)
///
/// # Errors
///
/// Returns an error if encoding the property type or any parameter fails.
pub fn encode_property_signature(signature: &SignatureProperty) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let mut prolog = SIGNATURE_HEADER::PROPERTY;
    if signature.has_this {
        prolog |= CALLING_CONVENTION::HASTHIS;
    }
    buffer.push(prolog);

    write_compressed_uint(to_u32(signature.params.len())?, &mut buffer)?;
    encode_type_signature(&signature.base, &mut buffer)?;
    for param in &signature.params {
        encode_parameter(param, &mut buffer)?;
    }

    Ok(buffer)
}

/// Encodes a type specification signature, which is the bare type encoding.
///
/// # Errors
///
/// Returns [`crate::Error`] if type signature encoding fails.
pub fn encode_typespec_signature(signature: &SignatureTypeSpec) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_type_signature(&signature.base, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_instance_void() {
        let signature = SignatureMethod {
            has_this: true,
            ..Default::default()
        };
        assert_eq!(
            encode_method_signature(&signature).unwrap(),
            vec![0x20, 0x00, 0x01]
        );
    }

    #[test]
    fn method_static_with_params() {
        let signature = SignatureMethod {
            has_this: false,
            param_count_generic: 0,
            return_type: SignatureParameter::new(TypeSignature::String),
            params: vec![
                SignatureParameter::new(TypeSignature::I4),
                SignatureParameter::new(TypeSignature::SzArray(Box::new(TypeSignature::U1))),
            ],
        };
        assert_eq!(
            encode_method_signature(&signature).unwrap(),
            vec![0x00, 0x02, 0x0E, 0x08, 0x1D, 0x05]
        );
    }

    #[test]
    fn method_generic_and_byref() {
        let signature = SignatureMethod {
            has_this: true,
            param_count_generic: 1,
            return_type: SignatureParameter::new(TypeSignature::GenericParamMethod(0)),
            params: vec![SignatureParameter {
                by_ref: true,
                base: TypeSignature::GenericParamType(0),
            }],
        };
        assert_eq!(
            encode_method_signature(&signature).unwrap(),
            vec![0x30, 0x01, 0x01, 0x1E, 0x00, 0x10, 0x13, 0x00]
        );
    }

    #[test]
    fn field() {
        let signature = SignatureField {
            base: TypeSignature::I4,
        };
        assert_eq!(encode_field_signature(&signature).unwrap(), vec![0x06, 0x08]);
    }

    #[test]
    fn property() {
        let signature = SignatureProperty {
            has_this: true,
            base: TypeSignature::String,
            params: vec![],
        };
        assert_eq!(
            encode_property_signature(&signature).unwrap(),
            vec![0x28, 0x00, 0x0E]
        );
    }

    #[test]
    fn typespec_generic_instance() {
        // IAsyncOperation`1<string>, with IAsyncOperation`1 as TypeRef 3
        let signature = SignatureTypeSpec {
            base: TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0003))),
                vec![TypeSignature::String],
            ),
        };
        assert_eq!(
            encode_typespec_signature(&signature).unwrap(),
            vec![0x15, 0x12, 0x0D, 0x01, 0x0E]
        );
    }

    #[test]
    fn value_type_typedef() {
        let mut buffer = Vec::new();
        encode_type_signature(&TypeSignature::ValueType(Token::new(0x0200_0005)), &mut buffer)
            .unwrap();
        assert_eq!(buffer, vec![0x11, 0x14]);
    }

    #[test]
    fn invalid_tokens() {
        let mut buffer = Vec::new();
        assert!(
            encode_type_signature(&TypeSignature::Class(Token::new(0x0600_0001)), &mut buffer)
                .is_err()
        );

        let signature = SignatureTypeSpec {
            base: TypeSignature::GenericInst(Box::new(TypeSignature::I4), vec![]),
        };
        assert!(encode_typespec_signature(&signature).is_err());
    }
}
