//! Turning model references into handles: `AssemblyRef`, `TypeRef` and `TypeSpec` rows,
//! deferred program types and signature types.

use crate::{
    builder::{
        handles::{PendingTypeSpec, SigType, TypeHandle},
        next_rid, MetadataBuilder,
    },
    metadata::{
        signatures::TypeSignature,
        tables::{AssemblyFlags, AssemblyRefRaw, CodedIndex, TableId, TypeRefRaw},
        token::Token,
    },
    model::{
        MemberKind, QualifiedName, TypeDeclaration, TypeOrigin, TypeReference, TypeSig, MSCORLIB,
    },
    Error, Result,
};

/// Public key token of `mscorlib`.
const MSCORLIB_PUBLIC_KEY_TOKEN: [u8; 8] = [0xB7, 0x7A, 0x5C, 0x56, 0x19, 0x34, 0xE0, 0x89];

/// Windows Runtime references bind by name; the version is a wildcard.
const ANY_VERSION: u32 = 255;

fn primitive(signature: &TypeSig) -> Option<TypeSignature> {
    Some(match signature {
        TypeSig::Void => TypeSignature::Void,
        TypeSig::Boolean => TypeSignature::Boolean,
        TypeSig::Char => TypeSignature::Char,
        TypeSig::I1 => TypeSignature::I1,
        TypeSig::U1 => TypeSignature::U1,
        TypeSig::I2 => TypeSignature::I2,
        TypeSig::U2 => TypeSignature::U2,
        TypeSig::I4 => TypeSignature::I4,
        TypeSig::U4 => TypeSignature::U4,
        TypeSig::I8 => TypeSignature::I8,
        TypeSig::U8 => TypeSignature::U8,
        TypeSig::R4 => TypeSignature::R4,
        TypeSig::R8 => TypeSignature::R8,
        TypeSig::String => TypeSignature::String,
        TypeSig::Object => TypeSignature::Object,
        TypeSig::Named(_) | TypeSig::GenericParam(_) | TypeSig::SzArray(_) => return None,
    })
}

fn check_arity(reference: &TypeReference) -> Result<()> {
    let arity = reference.name.arity() as usize;
    if reference.arguments.len() != arity {
        return Err(Error::InvalidDeclaration {
            name: reference.to_string(),
            message: format!(
                "{} type arguments given for arity {}",
                reference.arguments.len(),
                arity
            ),
        });
    }
    Ok(())
}

fn check_reference(reference: &TypeReference) -> Result<()> {
    check_arity(reference)?;
    reference.arguments.iter().try_for_each(check_signature)
}

fn check_signature(signature: &TypeSig) -> Result<()> {
    match signature {
        TypeSig::Named(reference) => check_reference(reference),
        TypeSig::SzArray(element) => check_signature(element),
        _ => Ok(()),
    }
}

/// Checks the arity of every type `declaration` mentions: base type, interfaces, event
/// handlers and member signatures, type arguments included.
pub(super) fn check_references(declaration: &TypeDeclaration) -> Result<()> {
    for reference in declaration.base_type.iter().chain(&declaration.interfaces) {
        check_reference(reference)?;
    }

    for member in &declaration.members {
        if let MemberKind::Event { handler } = &member.kind {
            check_reference(handler)?;
        }
        check_signature(&member.signature.return_type)?;
        for parameter in &member.signature.parameters {
            check_signature(&parameter.ty)?;
        }
    }
    Ok(())
}

impl MetadataBuilder {
    /// The `AssemblyRef` row for `assembly`, created on first use.
    pub(super) fn assembly_ref(&mut self, assembly: &str) -> Result<u32> {
        if let Some(rid) = self.assembly_ref_index.get(assembly) {
            return Ok(*rid);
        }

        let rid = next_rid(self.assembly_refs.len())?;
        let (flags, public_key_or_token) = if assembly == MSCORLIB {
            (0, self.blobs.add(&MSCORLIB_PUBLIC_KEY_TOKEN)?)
        } else {
            (AssemblyFlags::CONTENT_TYPE_WINDOWS_RUNTIME, 0)
        };
        let name = self.strings.add(assembly)?;

        self.assembly_refs.push(AssemblyRefRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRef, rid),
            major_version: ANY_VERSION,
            minor_version: ANY_VERSION,
            build_number: ANY_VERSION,
            revision_number: ANY_VERSION,
            flags,
            public_key_or_token,
            name,
            culture: 0,
            hash_value: 0,
        });
        self.assembly_ref_index.insert(assembly.to_string(), rid);
        Ok(rid)
    }

    /// The `TypeRef` row for `name` in `assembly`, created on first use.
    pub(super) fn type_ref(
        &mut self,
        name: &QualifiedName,
        assembly: &str,
        is_value_type: bool,
    ) -> Result<u32> {
        let key = (assembly.to_string(), name.clone());
        if let Some(rid) = self.type_ref_index.get(&key) {
            return Ok(*rid);
        }

        let scope = self.assembly_ref(assembly)?;
        let rid = next_rid(self.type_refs.len())?;
        let type_name = self.strings.add(&name.name)?;
        let type_namespace = self.strings.add(&name.namespace)?;

        self.type_refs.push(TypeRefRaw {
            rid,
            token: Token::from_parts(TableId::TypeRef, rid),
            resolution_scope: CodedIndex::new(TableId::AssemblyRef, scope),
            type_name,
            type_namespace,
        });
        if is_value_type {
            self.value_types.refs.insert(rid);
        }
        self.type_ref_index.insert(key, rid);
        Ok(rid)
    }

    /// A handle to the definition `reference` names, ignoring its type arguments.
    ///
    /// Program types that were not visited yet are deferred on behalf of `owner`.
    pub(super) fn definition_handle(
        &mut self,
        reference: &TypeReference,
        owner: Token,
    ) -> Result<TypeHandle> {
        match &reference.origin {
            TypeOrigin::External { assembly } => Ok(TypeHandle::Ref(self.type_ref(
                &reference.name,
                assembly,
                reference.is_value_type,
            )?)),
            TypeOrigin::Program => Ok(match self.visited.get(&reference.name) {
                Some(rid) => TypeHandle::Def(*rid),
                None => self.deferred.defer(owner, reference.name.clone()),
            }),
        }
    }

    /// A handle usable in `TypeDefOrRef` position: closed generic instantiations go
    /// through a shared `TypeSpec` row.
    pub(super) fn type_handle(&mut self, reference: &TypeReference, owner: Token) -> Result<TypeHandle> {
        if reference.is_generic_instance() {
            Ok(TypeHandle::Spec(self.type_spec(reference)?))
        } else {
            check_arity(reference)?;
            self.definition_handle(reference, owner)
        }
    }

    /// The `TypeSpec` row of a closed generic instantiation, created on first use.
    pub(super) fn type_spec(&mut self, reference: &TypeReference) -> Result<u32> {
        if let Some(rid) = self.type_spec_index.get(reference) {
            return Ok(*rid);
        }

        check_arity(reference)?;
        let rid = next_rid(self.type_specs.len())?;
        let owner = Token::from_parts(TableId::TypeSpec, rid);

        let definition = self.definition_handle(reference, owner)?;
        let arguments = reference
            .arguments
            .iter()
            .map(|argument| self.sig_type(argument, owner))
            .collect::<Result<Vec<_>>>()?;

        self.type_specs.push(PendingTypeSpec {
            signature: SigType::GenericInst(definition, arguments),
        });
        self.type_spec_index.insert(reference.clone(), rid);
        Ok(rid)
    }

    /// Converts a model type into a signature type, deferring program types on behalf of
    /// `owner`.
    pub(super) fn sig_type(&mut self, signature: &TypeSig, owner: Token) -> Result<SigType> {
        if let Some(primitive) = primitive(signature) {
            return Ok(SigType::Primitive(primitive));
        }

        Ok(match signature {
            TypeSig::Named(reference) if reference.is_generic_instance() => {
                check_arity(reference)?;
                let definition = self.definition_handle(reference, owner)?;
                let arguments = reference
                    .arguments
                    .iter()
                    .map(|argument| self.sig_type(argument, owner))
                    .collect::<Result<Vec<_>>>()?;
                SigType::GenericInst(definition, arguments)
            }
            TypeSig::Named(reference) => {
                check_arity(reference)?;
                SigType::Named(self.definition_handle(reference, owner)?)
            }
            TypeSig::GenericParam(ordinal) => SigType::GenericParam(*ordinal),
            TypeSig::SzArray(element) => SigType::SzArray(Box::new(self.sig_type(element, owner)?)),
            _ => return Err(malformed_error!("Unhandled signature type {}", signature)),
        })
    }
}
