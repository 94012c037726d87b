//! Handles into the table arena and references that resolve later.
//!
//! While types are visited, a reference to a program type that has not been visited yet
//! can not be encoded: its `TypeDef` row does not exist. Such references are recorded in
//! the [`DeferredArena`] and carried around as [`TypeHandle::Deferred`]. Visiting the
//! target resolves every slot waiting on its name; `finalize` turns all handles into
//! coded indexes and fails on the first slot that never resolved.

use std::collections::{HashMap, HashSet};

use crate::{
    metadata::{
        signatures::{
            SignatureMethod, SignatureParameter, SignatureProperty, TypeSignature,
        },
        tables::{CodedIndex, TableId},
        token::Token,
    },
    model::QualifiedName,
    Error, Result,
};

/// A type in `TypeDefOrRef` position, possibly not yet resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TypeHandle {
    /// A program type that was already visited
    Def(u32),
    /// An external type
    Ref(u32),
    /// A closed generic instantiation
    Spec(u32),
    /// A program type visited later, by arena slot
    Deferred(usize),
}

/// One reference waiting for its target to be visited.
#[derive(Clone, Debug)]
pub(crate) struct DeferredReference {
    /// The row holding the reference
    pub owner: Token,
    /// The program type it names
    pub target: QualifiedName,
    /// The target's `TypeDef` row, once visited
    pub resolved: Option<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct DeferredArena {
    slots: Vec<DeferredReference>,
    waiting: HashMap<QualifiedName, Vec<usize>>,
}

impl DeferredArena {
    /// Records a reference from `owner` to the not yet visited `target`.
    pub fn defer(&mut self, owner: Token, target: QualifiedName) -> TypeHandle {
        let slot = self.slots.len();
        self.waiting.entry(target.clone()).or_default().push(slot);
        self.slots.push(DeferredReference {
            owner,
            target,
            resolved: None,
        });
        TypeHandle::Deferred(slot)
    }

    /// Resolves every slot waiting on `name` to `rid`, returning how many there were.
    pub fn resolve(&mut self, name: &QualifiedName, rid: u32) -> usize {
        let Some(slots) = self.waiting.remove(name) else {
            return 0;
        };

        for slot in &slots {
            self.slots[*slot].resolved = Some(rid);
        }
        slots.len()
    }

    /// The first reference, in creation order, that never resolved.
    pub fn first_unresolved(&self) -> Option<&DeferredReference> {
        self.slots.iter().find(|slot| slot.resolved.is_none())
    }

    /// Number of references still waiting.
    pub fn pending(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    /// Turns a handle into its `TypeDefOrRef` coded index.
    pub fn coded_index(&self, handle: TypeHandle) -> Result<CodedIndex> {
        Ok(match handle {
            TypeHandle::Def(rid) => CodedIndex::new(TableId::TypeDef, rid),
            TypeHandle::Ref(rid) => CodedIndex::new(TableId::TypeRef, rid),
            TypeHandle::Spec(rid) => CodedIndex::new(TableId::TypeSpec, rid),
            TypeHandle::Deferred(slot) => {
                let reference = self.slots.get(slot).ok_or(Error::OutOfBounds)?;
                match reference.resolved {
                    Some(rid) => CodedIndex::new(TableId::TypeDef, rid),
                    None => {
                        return Err(Error::UnresolvedReference {
                            owner: reference.owner,
                            target: reference.target.to_string(),
                        })
                    }
                }
            }
        })
    }
}

/// A signature type whose named types are still handles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SigType {
    /// Element types without a token
    Primitive(TypeSignature),
    /// A class, interface, delegate, struct or enum
    Named(TypeHandle),
    /// A closed generic instantiation
    GenericInst(TypeHandle, Vec<SigType>),
    /// A type generic parameter by ordinal
    GenericParam(u32),
    /// Single dimension array
    SzArray(Box<SigType>),
}

/// Decides between `CLASS` and `VALUETYPE` for resolved type rows.
#[derive(Debug, Default)]
pub(crate) struct ValueTypes {
    pub defs: HashSet<u32>,
    pub refs: HashSet<u32>,
}

impl ValueTypes {
    fn is_value_type(&self, index: &CodedIndex) -> bool {
        match index.tag {
            TableId::TypeDef => self.defs.contains(&index.row),
            TableId::TypeRef => self.refs.contains(&index.row),
            _ => false,
        }
    }
}

impl SigType {
    /// Resolves all handles into a signature ready for encoding.
    pub fn resolve(&self, arena: &DeferredArena, value_types: &ValueTypes) -> Result<TypeSignature> {
        Ok(match self {
            SigType::Primitive(signature) => signature.clone(),
            SigType::Named(handle) => named(*handle, arena, value_types)?,
            SigType::GenericInst(handle, arguments) => TypeSignature::GenericInst(
                Box::new(named(*handle, arena, value_types)?),
                arguments
                    .iter()
                    .map(|argument| argument.resolve(arena, value_types))
                    .collect::<Result<Vec<_>>>()?,
            ),
            SigType::GenericParam(ordinal) => TypeSignature::GenericParamType(*ordinal),
            SigType::SzArray(element) => {
                TypeSignature::SzArray(Box::new(element.resolve(arena, value_types)?))
            }
        })
    }
}

fn named(handle: TypeHandle, arena: &DeferredArena, value_types: &ValueTypes) -> Result<TypeSignature> {
    let index = arena.coded_index(handle)?;
    Ok(if value_types.is_value_type(&index) {
        TypeSignature::ValueType(index.token)
    } else {
        TypeSignature::Class(index.token)
    })
}

/// A method signature with unresolved types.
#[derive(Clone, Debug)]
pub(crate) struct PendingMethodSig {
    pub has_this: bool,
    pub return_type: SigType,
    pub params: Vec<SigType>,
}

impl PendingMethodSig {
    pub fn resolve(&self, arena: &DeferredArena, value_types: &ValueTypes) -> Result<SignatureMethod> {
        Ok(SignatureMethod {
            has_this: self.has_this,
            param_count_generic: 0,
            return_type: SignatureParameter::new(self.return_type.resolve(arena, value_types)?),
            params: self
                .params
                .iter()
                .map(|param| Ok(SignatureParameter::new(param.resolve(arena, value_types)?)))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// A property signature with an unresolved type.
#[derive(Clone, Debug)]
pub(crate) struct PendingPropertySig {
    pub has_this: bool,
    pub ty: SigType,
}

impl PendingPropertySig {
    pub fn resolve(&self, arena: &DeferredArena, value_types: &ValueTypes) -> Result<SignatureProperty> {
        Ok(SignatureProperty {
            has_this: self.has_this,
            base: self.ty.resolve(arena, value_types)?,
            params: Vec::new(),
        })
    }
}

/// `TypeDef` row before its base type is resolved.
#[derive(Clone, Debug)]
pub(crate) struct PendingTypeDef {
    pub flags: u32,
    pub name: u32,
    pub namespace: u32,
    pub extends: Option<TypeHandle>,
    pub field_list: u32,
    pub method_list: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingField {
    pub flags: u32,
    pub name: u32,
    pub signature: SigType,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingMethod {
    pub impl_flags: u32,
    pub flags: u32,
    pub name: u32,
    pub signature: PendingMethodSig,
    pub param_list: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingProperty {
    pub flags: u32,
    pub name: u32,
    pub signature: PendingPropertySig,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingEvent {
    pub flags: u32,
    pub name: u32,
    pub event_type: TypeHandle,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingInterfaceImpl {
    pub class: u32,
    pub interface: TypeHandle,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingTypeSpec {
    pub signature: SigType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defer_then_resolve() {
        let mut arena = DeferredArena::default();
        let owner = Token::from_parts(TableId::InterfaceImpl, 1);
        let target = QualifiedName::parse("N.IWidget");

        let handle = arena.defer(owner, target.clone());
        let second = arena.defer(Token::from_parts(TableId::MethodDef, 4), target.clone());
        assert_eq!(arena.pending(), 2);
        assert!(arena.coded_index(handle).is_err());

        assert_eq!(arena.resolve(&target, 3), 2);
        assert_eq!(arena.pending(), 0);
        assert_eq!(arena.coded_index(handle).unwrap(), CodedIndex::new(TableId::TypeDef, 3));
        assert_eq!(arena.coded_index(second).unwrap().row, 3);
        assert!(arena.first_unresolved().is_none());
        assert_eq!(arena.resolve(&target, 3), 0);
    }

    #[test]
    fn unresolved_reports_owner() {
        let mut arena = DeferredArena::default();
        let owner = Token::from_parts(TableId::TypeDef, 2);
        let handle = arena.defer(owner, QualifiedName::parse("N.Missing"));

        match arena.coded_index(handle) {
            Err(Error::UnresolvedReference { owner: found, target }) => {
                assert_eq!(found, owner);
                assert_eq!(target, "N.Missing");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(arena.first_unresolved().unwrap().target.name, "Missing");
    }

    #[test]
    fn value_types_pick_element_type() {
        let arena = DeferredArena::default();
        let mut value_types = ValueTypes::default();
        value_types.refs.insert(2);

        let token = SigType::Named(TypeHandle::Ref(2))
            .resolve(&arena, &value_types)
            .unwrap();
        assert_eq!(token, TypeSignature::ValueType(Token::from_parts(TableId::TypeRef, 2)));

        let class = SigType::Named(TypeHandle::Ref(1))
            .resolve(&arena, &value_types)
            .unwrap();
        assert_eq!(class, TypeSignature::Class(Token::from_parts(TableId::TypeRef, 1)));
    }
}
