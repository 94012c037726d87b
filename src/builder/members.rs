//! Member rows of one type: fields, methods and their parameters, properties, events and
//! the accessors that link them through `MethodSemantics`.
//!
//! Everything is emitted while the type is visited so each type owns contiguous runs:
//! fields first (the enum `value__` before the literals), then methods (a delegate's
//! `.ctor` first, declared methods, then property accessors, then event accessors).

use crate::{
    builder::{
        handles::{
            PendingEvent, PendingField, PendingMethod, PendingMethodSig, PendingProperty,
            PendingPropertySig, SigType, TypeHandle,
        },
        invalid, next_rid, MetadataBuilder,
    },
    metadata::{
        signatures::{TypeSignature, ELEMENT_TYPE},
        tables::{
            CodedIndex, ConstantRaw, EventMapRaw, FieldAttributes, MethodAttributes,
            MethodImplAttributes, MethodSemanticsAttributes, MethodSemanticsRaw,
            ParamAttributes, ParamRaw, PropertyMapRaw, TableId,
        },
        token::Token,
    },
    model::{
        MemberDeclaration, MemberKind, Parameter, TypeDeclaration, TypeKind, TypeReference,
        TypeSig, FOUNDATION_CONTRACT,
    },
    Result,
};

/// Name of the storage field of an enum.
const ENUM_VALUE_FIELD: &str = "value__";

fn event_registration_token() -> TypeSig {
    TypeSig::Named(
        TypeReference::external("Windows.Foundation.EventRegistrationToken", FOUNDATION_CONTRACT)
            .value_type(),
    )
}

fn method_flags(kind: TypeKind, is_static: bool) -> (MethodAttributes, MethodImplAttributes) {
    match kind {
        TypeKind::Interface => (
            MethodAttributes::PUBLIC
                | MethodAttributes::VIRTUAL
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::NEW_SLOT
                | MethodAttributes::ABSTRACT,
            MethodImplAttributes::IL,
        ),
        TypeKind::Delegate => (
            MethodAttributes::PUBLIC
                | MethodAttributes::VIRTUAL
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::NEW_SLOT,
            MethodImplAttributes::RUNTIME,
        ),
        _ if is_static => (
            MethodAttributes::PUBLIC | MethodAttributes::STATIC | MethodAttributes::HIDE_BY_SIG,
            MethodImplAttributes::RUNTIME,
        ),
        _ => (
            MethodAttributes::PUBLIC
                | MethodAttributes::FINAL
                | MethodAttributes::VIRTUAL
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::NEW_SLOT,
            MethodImplAttributes::RUNTIME,
        ),
    }
}

fn parameter(name: &str, ty: TypeSig) -> Parameter {
    Parameter {
        name: name.to_string(),
        ty,
    }
}

/// Rejects members the kind of `declaration` can not have.
pub(super) fn check_members(declaration: &TypeDeclaration) -> Result<()> {
    for member in &declaration.members {
        let allowed = match (declaration.kind, &member.kind) {
            (TypeKind::Enum, MemberKind::Field { constant }) => constant.is_some(),
            (TypeKind::Struct, MemberKind::Field { constant }) => {
                constant.is_none() && !member.modifiers.is_static
            }
            (TypeKind::Enum | TypeKind::Struct, _) => false,
            (_, MemberKind::Field { .. }) => false,
            (TypeKind::Interface, _) => !member.modifiers.is_static,
            (TypeKind::Delegate, MemberKind::Method) => member.name == "Invoke",
            (TypeKind::Delegate, _) => false,
            (TypeKind::Class, _) => true,
        };

        if !allowed {
            return Err(invalid(
                declaration,
                format!("member '{}' is not allowed on a {:?}", member.name, declaration.kind),
            ));
        }

        if let MemberKind::Property {
            getter: false,
            setter: false,
        } = member.kind
        {
            return Err(invalid(
                declaration,
                format!("property '{}' has no accessor", member.name),
            ));
        }
    }

    if declaration.kind == TypeKind::Delegate && declaration.members.len() != 1 {
        return Err(invalid(declaration, "a delegate declares exactly one Invoke method"));
    }

    Ok(())
}

impl MetadataBuilder {
    pub(super) fn emit_members(&mut self, declaration: &TypeDeclaration, type_rid: u32) -> Result<()> {
        match declaration.kind {
            TypeKind::Enum => self.emit_enum_fields(declaration, type_rid)?,
            TypeKind::Struct => self.emit_struct_fields(declaration)?,
            TypeKind::Delegate => self.emit_delegate_constructor()?,
            TypeKind::Class | TypeKind::Interface => {}
        }

        for member in &declaration.members {
            if member.kind == MemberKind::Method {
                let (flags, impl_flags) = method_flags(declaration.kind, member.modifiers.is_static);
                self.push_method(
                    &member.name,
                    flags,
                    impl_flags,
                    !member.modifiers.is_static,
                    &member.signature.return_type,
                    &member.signature.parameters,
                )?;
            }
        }

        let mut first_property = true;
        for member in &declaration.members {
            if let MemberKind::Property { getter, setter } = member.kind {
                self.emit_property(declaration.kind, type_rid, member, getter, setter, first_property)?;
                first_property = false;
            }
        }

        let mut first_event = true;
        for member in &declaration.members {
            if let MemberKind::Event { handler } = &member.kind {
                self.emit_event(declaration.kind, type_rid, member, handler, first_event)?;
                first_event = false;
            }
        }

        Ok(())
    }

    fn push_field(&mut self, name: &str, flags: u32, signature: SigType) -> Result<u32> {
        let rid = next_rid(self.fields.len())?;
        let name = self.strings.add(name)?;
        self.fields.push(PendingField {
            flags,
            name,
            signature,
        });
        Ok(rid)
    }

    fn emit_enum_fields(&mut self, declaration: &TypeDeclaration, type_rid: u32) -> Result<()> {
        self.push_field(
            ENUM_VALUE_FIELD,
            FieldAttributes::PUBLIC | FieldAttributes::SPECIAL_NAME | FieldAttributes::RTSPECIAL_NAME,
            SigType::Primitive(TypeSignature::I4),
        )?;

        for member in &declaration.members {
            let MemberKind::Field {
                constant: Some(value),
            } = member.kind
            else {
                continue;
            };

            let field = self.push_field(
                &member.name,
                FieldAttributes::PUBLIC
                    | FieldAttributes::STATIC
                    | FieldAttributes::LITERAL
                    | FieldAttributes::HAS_DEFAULT,
                SigType::Named(TypeHandle::Def(type_rid)),
            )?;

            let rid = next_rid(self.constants.len())?;
            let value = self.blobs.add(&value.to_le_bytes())?;
            self.constants.push(ConstantRaw {
                rid,
                token: Token::from_parts(TableId::Constant, rid),
                base: ELEMENT_TYPE::I4,
                parent: CodedIndex::new(TableId::Field, field),
                value,
            });
        }
        Ok(())
    }

    fn emit_struct_fields(&mut self, declaration: &TypeDeclaration) -> Result<()> {
        for member in &declaration.members {
            let owner = Token::from_parts(TableId::Field, next_rid(self.fields.len())?);
            let signature = self.sig_type(&member.signature.return_type, owner)?;
            self.push_field(&member.name, FieldAttributes::PUBLIC, signature)?;
        }
        Ok(())
    }

    /// Delegates are constructed by the runtime from an object and a function pointer.
    fn emit_delegate_constructor(&mut self) -> Result<()> {
        let signature = PendingMethodSig {
            has_this: true,
            return_type: SigType::Primitive(TypeSignature::Void),
            params: vec![
                SigType::Primitive(TypeSignature::Object),
                SigType::Primitive(TypeSignature::I),
            ],
        };
        self.push_method_row(
            ".ctor",
            MethodAttributes::PRIVATE
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::SPECIAL_NAME
                | MethodAttributes::RT_SPECIAL_NAME,
            MethodImplAttributes::RUNTIME,
            signature,
            &["object", "method"],
        )?;
        Ok(())
    }

    /// Converts a declared signature and appends the method with its parameters.
    fn push_method(
        &mut self,
        name: &str,
        flags: MethodAttributes,
        impl_flags: MethodImplAttributes,
        has_this: bool,
        return_type: &TypeSig,
        parameters: &[Parameter],
    ) -> Result<u32> {
        let owner = Token::from_parts(TableId::MethodDef, next_rid(self.methods.len())?);
        let signature = PendingMethodSig {
            has_this,
            return_type: self.sig_type(return_type, owner)?,
            params: parameters
                .iter()
                .map(|parameter| self.sig_type(&parameter.ty, owner))
                .collect::<Result<Vec<_>>>()?,
        };
        let names: Vec<&str> = parameters.iter().map(|parameter| parameter.name.as_str()).collect();
        self.push_method_row(name, flags, impl_flags, signature, &names)
    }

    fn push_method_row(
        &mut self,
        name: &str,
        flags: MethodAttributes,
        impl_flags: MethodImplAttributes,
        signature: PendingMethodSig,
        parameter_names: &[&str],
    ) -> Result<u32> {
        let rid = next_rid(self.methods.len())?;
        let param_list = next_rid(self.params.len())?;

        for (sequence, parameter) in parameter_names.iter().enumerate() {
            let param_rid = next_rid(self.params.len())?;
            let name = self.strings.add(parameter)?;
            self.params.push(ParamRaw {
                rid: param_rid,
                token: Token::from_parts(TableId::Param, param_rid),
                flags: ParamAttributes::IN,
                sequence: u32::try_from(sequence + 1)
                    .map_err(|_| malformed_error!("Too many parameters on {}", name))?,
                name,
            });
        }

        let name = self.strings.add(name)?;
        self.methods.push(PendingMethod {
            impl_flags: impl_flags.bits(),
            flags: flags.bits(),
            name,
            signature,
            param_list,
        });
        Ok(rid)
    }

    fn push_semantics(&mut self, semantics: u32, method: u32, association: CodedIndex) -> Result<()> {
        let rid = next_rid(self.method_semantics.len())?;
        self.method_semantics.push(MethodSemanticsRaw {
            rid,
            token: Token::from_parts(TableId::MethodSemantics, rid),
            semantics,
            method,
            association,
        });
        Ok(())
    }

    fn emit_property(
        &mut self,
        kind: TypeKind,
        type_rid: u32,
        member: &MemberDeclaration,
        getter: bool,
        setter: bool,
        first: bool,
    ) -> Result<()> {
        let rid = next_rid(self.properties.len())?;
        let owner = Token::from_parts(TableId::Property, rid);
        let is_static = member.modifiers.is_static;
        let ty = &member.signature.return_type;

        if first {
            let map_rid = next_rid(self.property_maps.len())?;
            self.property_maps.push(PropertyMapRaw {
                rid: map_rid,
                token: Token::from_parts(TableId::PropertyMap, map_rid),
                parent: type_rid,
                property_list: rid,
            });
        }

        let signature = PendingPropertySig {
            has_this: !is_static,
            ty: self.sig_type(ty, owner)?,
        };
        let name = self.strings.add(&member.name)?;
        self.properties.push(PendingProperty {
            flags: 0,
            name,
            signature,
        });

        let association = CodedIndex::new(TableId::Property, rid);
        let (flags, impl_flags) = method_flags(kind, is_static);
        let flags = flags | MethodAttributes::SPECIAL_NAME;

        if getter {
            let method = self.push_method(
                &format!("get_{}", member.name),
                flags,
                impl_flags,
                !is_static,
                ty,
                &[],
            )?;
            self.push_semantics(MethodSemanticsAttributes::GETTER, method, association)?;
        }

        if setter {
            let method = self.push_method(
                &format!("put_{}", member.name),
                flags,
                impl_flags,
                !is_static,
                &TypeSig::Void,
                &[parameter("value", ty.clone())],
            )?;
            self.push_semantics(MethodSemanticsAttributes::SETTER, method, association)?;
        }

        Ok(())
    }

    fn emit_event(
        &mut self,
        kind: TypeKind,
        type_rid: u32,
        member: &MemberDeclaration,
        handler: &TypeReference,
        first: bool,
    ) -> Result<()> {
        let rid = next_rid(self.events.len())?;
        let owner = Token::from_parts(TableId::Event, rid);
        let is_static = member.modifiers.is_static;

        if first {
            let map_rid = next_rid(self.event_maps.len())?;
            self.event_maps.push(EventMapRaw {
                rid: map_rid,
                token: Token::from_parts(TableId::EventMap, map_rid),
                parent: type_rid,
                event_list: rid,
            });
        }

        let event_type = self.type_handle(handler, owner)?;
        let name = self.strings.add(&member.name)?;
        self.events.push(PendingEvent {
            flags: 0,
            name,
            event_type,
        });

        let association = CodedIndex::new(TableId::Event, rid);
        let (flags, impl_flags) = method_flags(kind, is_static);
        let flags = flags | MethodAttributes::SPECIAL_NAME;

        let add = self.push_method(
            &format!("add_{}", member.name),
            flags,
            impl_flags,
            !is_static,
            &event_registration_token(),
            &[parameter("handler", TypeSig::Named(handler.clone()))],
        )?;
        self.push_semantics(MethodSemanticsAttributes::ADD_ON, add, association)?;

        let remove = self.push_method(
            &format!("remove_{}", member.name),
            flags,
            impl_flags,
            !is_static,
            &TypeSig::Void,
            &[parameter("token", event_registration_token())],
        )?;
        self.push_semantics(MethodSemanticsAttributes::REMOVE_ON, remove, association)?;

        Ok(())
    }
}
