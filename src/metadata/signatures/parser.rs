use crate::{
    file::io::read_le_at,
    metadata::{
        signatures::{
            SignatureField, SignatureMethod, SignatureParameter, SignatureProperty,
            SignatureTypeSpec, TypeSignature, CALLING_CONVENTION, ELEMENT_TYPE, SIGNATURE_HEADER,
        },
        tables::TableId,
        token::Token,
    },
    utils::read_compressed_uint,
    Error::OutOfBounds,
    Result,
};

/// Maximum nesting of types within one signature
const MAX_RECURSION_DEPTH: usize = 50;

/// Parser for the signature kinds this crate emits
///
/// # Example
///
/// ```rust
/// use winmdgen::metadata::signatures::SignatureParser;
/// let data = &[0x20, 0x01, 0x01, 0x0E];
/// let mut parser = SignatureParser::new(data);
/// let sig = parser.parse_method_signature().unwrap();
/// assert_eq!(sig.params.len(), 1);
/// ```
///
/// A parser instance is meant for a single signature.
pub struct SignatureParser<'a> {
    data: &'a [u8],
    offset: usize,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` from a byte slice
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            data,
            offset: 0,
            depth: 0,
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        read_le_at::<u8>(self.data, &mut self.offset)
    }

    fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.offset).copied().ok_or(OutOfBounds)
    }

    fn read_compressed_uint(&mut self) -> Result<u32> {
        read_compressed_uint(self.data, &mut self.offset)
    }

    /// Reads a `TypeDefOrRefOrSpecEncoded` value back into a token
    fn read_type_token(&mut self) -> Result<Token> {
        let encoded = self.read_compressed_uint()?;
        let table = match encoded & 0x3 {
            0 => TableId::TypeDef,
            1 => TableId::TypeRef,
            2 => TableId::TypeSpec,
            _ => {
                return Err(malformed_error!(
                    "Invalid TypeDefOrRef tag in signature - {}",
                    encoded
                ))
            }
        };

        Ok(Token::from_parts(table, encoded >> 2))
    }

    fn parse_type(&mut self) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(malformed_error!(
                "Signature nesting exceeds {} levels",
                MAX_RECURSION_DEPTH
            ));
        }

        let current_byte = self.read_byte()?;
        let parsed = match current_byte {
            ELEMENT_TYPE::VOID => TypeSignature::Void,
            ELEMENT_TYPE::BOOLEAN => TypeSignature::Boolean,
            ELEMENT_TYPE::CHAR => TypeSignature::Char,
            ELEMENT_TYPE::I1 => TypeSignature::I1,
            ELEMENT_TYPE::U1 => TypeSignature::U1,
            ELEMENT_TYPE::I2 => TypeSignature::I2,
            ELEMENT_TYPE::U2 => TypeSignature::U2,
            ELEMENT_TYPE::I4 => TypeSignature::I4,
            ELEMENT_TYPE::U4 => TypeSignature::U4,
            ELEMENT_TYPE::I8 => TypeSignature::I8,
            ELEMENT_TYPE::U8 => TypeSignature::U8,
            ELEMENT_TYPE::R4 => TypeSignature::R4,
            ELEMENT_TYPE::R8 => TypeSignature::R8,
            ELEMENT_TYPE::STRING => TypeSignature::String,
            ELEMENT_TYPE::OBJECT => TypeSignature::Object,
            ELEMENT_TYPE::I => TypeSignature::I,
            ELEMENT_TYPE::VALUETYPE => TypeSignature::ValueType(self.read_type_token()?),
            ELEMENT_TYPE::CLASS => TypeSignature::Class(self.read_type_token()?),
            ELEMENT_TYPE::VAR => TypeSignature::GenericParamType(self.read_compressed_uint()?),
            ELEMENT_TYPE::MVAR => TypeSignature::GenericParamMethod(self.read_compressed_uint()?),
            ELEMENT_TYPE::SZARRAY => TypeSignature::SzArray(Box::new(self.parse_type()?)),
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not TYPE_CLASS or TYPE_VALUE - {}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.read_compressed_uint()?;

                let mut type_args = Vec::with_capacity(arg_count.min(64) as usize);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                TypeSignature::GenericInst(Box::new(base_type), type_args)
            }
            _ => {
                return Err(malformed_error!(
                    "Unsupported ELEMENT_TYPE - {}",
                    current_byte
                ))
            }
        };

        self.depth -= 1;
        Ok(parsed)
    }

    fn parse_param(&mut self) -> Result<SignatureParameter> {
        let mut by_ref = false;
        if self.peek_byte()? == ELEMENT_TYPE::BYREF {
            self.offset += 1;
            by_ref = true;
        }

        Ok(SignatureParameter {
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parse a `MethodDefSig` or `MethodRefSig`
    ///
    /// # Errors
    /// Returns an error if the blob is truncated or holds an unsupported element type
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let convention = self.read_byte()?;
        let param_count_generic = if convention & CALLING_CONVENTION::GENERIC != 0 {
            self.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.read_compressed_uint()?;
        let return_type = self.parse_param()?;

        let mut params = Vec::with_capacity(param_count.min(256) as usize);
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(SignatureMethod {
            has_this: convention & CALLING_CONVENTION::HASTHIS != 0,
            param_count_generic,
            return_type,
            params,
        })
    }

    /// Parse a `FieldSig`
    ///
    /// # Errors
    /// Returns an error if the prolog is not `FIELD` or the type can not be parsed
    pub fn parse_field_signature(&mut self) -> Result<SignatureField> {
        let head_byte = self.read_byte()?;
        if head_byte != SIGNATURE_HEADER::FIELD {
            return Err(malformed_error!(
                "SignatureField - invalid start - {}",
                head_byte
            ));
        }

        Ok(SignatureField {
            base: self.parse_type()?,
        })
    }

    /// Parse a `PropertySig`
    ///
    /// # Errors
    /// Returns an error if the prolog is not `PROPERTY` or a type can not be parsed
    pub fn parse_property_signature(&mut self) -> Result<SignatureProperty> {
        let head_byte = self.read_byte()?;
        if head_byte & SIGNATURE_HEADER::PROPERTY == 0 {
            return Err(malformed_error!(
                "SignatureProperty - invalid start - {}",
                head_byte
            ));
        }

        let param_count = self.read_compressed_uint()?;
        let base = self.parse_type()?;

        let mut params = Vec::with_capacity(param_count.min(256) as usize);
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(SignatureProperty {
            has_this: head_byte & CALLING_CONVENTION::HASTHIS != 0,
            base,
            params,
        })
    }

    /// Parse a `TypeSpec` blob
    ///
    /// # Errors
    /// Returns an error if the type can not be parsed
    pub fn parse_type_spec_signature(&mut self) -> Result<SignatureTypeSpec> {
        Ok(SignatureTypeSpec {
            base: self.parse_type()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_with_array() {
        // Instance method with parameters: int Method(string s, ref int[] numbers)
        let result = SignatureParser::new(&[0x20, 0x02, 0x08, 0x0E, 0x10, 0x1D, 0x08])
            .parse_method_signature()
            .unwrap();

        assert!(result.has_this);
        assert_eq!(result.return_type.base, TypeSignature::I4);
        assert_eq!(result.params[0].base, TypeSignature::String);
        assert!(!result.params[0].by_ref);
        assert!(result.params[1].by_ref);
        assert_eq!(
            result.params[1].base,
            TypeSignature::SzArray(Box::new(TypeSignature::I4))
        );
    }

    #[test]
    fn generic_method() {
        let result = SignatureParser::new(&[0x30, 0x01, 0x01, 0x13, 0x00, 0x13, 0x00])
            .parse_method_signature()
            .unwrap();

        assert_eq!(result.param_count_generic, 1);
        assert_eq!(result.return_type.base, TypeSignature::GenericParamType(0));
    }

    #[test]
    fn typespec_tokens() {
        let result = SignatureParser::new(&[0x15, 0x12, 0x0D, 0x01, 0x11, 0x14])
            .parse_type_spec_signature()
            .unwrap();

        assert_eq!(
            result.base,
            TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0003))),
                vec![TypeSignature::ValueType(Token::new(0x0200_0005))]
            )
        );
    }

    #[test]
    fn invalid() {
        assert!(SignatureParser::new(&[0x07, 0x08])
            .parse_field_signature()
            .is_err());
        assert!(SignatureParser::new(&[0x15, 0x08, 0x00])
            .parse_type_spec_signature()
            .is_err());
        assert!(SignatureParser::new(&[0x20, 0x01, 0x01])
            .parse_method_signature()
            .is_err());
        assert!(SignatureParser::new(&[0x12, 0x03])
            .parse_type_spec_signature()
            .is_err());
    }

    #[test]
    fn nesting_limit() {
        let mut data = vec![ELEMENT_TYPE::SZARRAY; 60];
        data.push(ELEMENT_TYPE::I4);
        assert!(SignatureParser::new(&data)
            .parse_type_spec_signature()
            .is_err());
    }
}
