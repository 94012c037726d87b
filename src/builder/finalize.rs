//! Freezing the builder into a [`TableSet`].
//!
//! Resolves every handle, encodes the signature blobs, restores the ordering of the
//! sorted tables and checks the result once more before anything is written.

use std::collections::HashMap;

use log::{debug, info};

use crate::{
    builder::{MetadataBuilder, TableSet},
    metadata::{
        signatures::{
            encode_field_signature, encode_method_signature, encode_property_signature,
            encode_typespec_signature, SignatureField, SignatureTypeSpec,
        },
        tables::{
            CodedIndex, CodedIndexType, EventRaw, FieldRaw, GenericParamRaw, InterfaceImplRaw,
            MethodDefRaw, PropertyRaw, TableId, TypeDefRaw, TypeSpecRaw,
        },
        token::Token,
    },
    utils::to_u32,
    Error, Result,
};

/// Assigns rid and token by position after a table was reordered.
macro_rules! renumber {
    ($rows:expr, $table:expr) => {
        for (index, row) in $rows.iter_mut().enumerate() {
            let rid = to_u32(index + 1)?;
            row.rid = rid;
            row.token = Token::from_parts($table, rid);
        }
    };
}

/// Stable sort by a fallible key.
fn sort_rows<T, K: Ord + Copy>(rows: Vec<T>, key: impl Fn(&T) -> Result<K>) -> Result<Vec<T>> {
    let mut keyed = rows
        .into_iter()
        .map(|row| Ok((key(&row)?, row)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by_key(|(key, _)| *key);
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

fn ordering(table: TableId, message: impl Into<String>) -> Error {
    Error::OrderingViolation {
        table: format!("{table:?}"),
        message: message.into(),
    }
}

impl MetadataBuilder {
    /// Resolves, orders and validates all rows.
    ///
    /// # Errors
    /// Returns [`Error::UnresolvedReference`] for the first reference whose target was
    /// never visited, and [`Error::OrderingViolation`] if the tables break an ordering or
    /// range invariant.
    pub fn finalize(mut self) -> Result<TableSet> {
        if let Some(reference) = self.deferred.first_unresolved() {
            return Err(Error::UnresolvedReference {
                owner: reference.owner,
                target: reference.target.to_string(),
            });
        }

        let arena = &self.deferred;
        let value_types = &self.value_types;

        let mut type_defs = Vec::with_capacity(self.type_defs.len());
        for (index, pending) in self.type_defs.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            type_defs.push(TypeDefRaw {
                rid,
                token: Token::from_parts(TableId::TypeDef, rid),
                flags: pending.flags,
                type_name: pending.name,
                type_namespace: pending.namespace,
                extends: match pending.extends {
                    Some(handle) => arena.coded_index(handle)?,
                    None => CodedIndex::null(),
                },
                field_list: pending.field_list,
                method_list: pending.method_list,
            });
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (index, pending) in self.fields.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            let signature = encode_field_signature(&SignatureField {
                base: pending.signature.resolve(arena, value_types)?,
            })?;
            fields.push(FieldRaw {
                rid,
                token: Token::from_parts(TableId::Field, rid),
                flags: pending.flags,
                name: pending.name,
                signature: self.blobs.add(&signature)?,
            });
        }

        let mut methods = Vec::with_capacity(self.methods.len());
        for (index, pending) in self.methods.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            let signature =
                encode_method_signature(&pending.signature.resolve(arena, value_types)?)?;
            methods.push(MethodDefRaw {
                rid,
                token: Token::from_parts(TableId::MethodDef, rid),
                rva: 0,
                impl_flags: pending.impl_flags,
                flags: pending.flags,
                name: pending.name,
                signature: self.blobs.add(&signature)?,
                param_list: pending.param_list,
            });
        }

        let mut properties = Vec::with_capacity(self.properties.len());
        for (index, pending) in self.properties.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            let signature =
                encode_property_signature(&pending.signature.resolve(arena, value_types)?)?;
            properties.push(PropertyRaw {
                rid,
                token: Token::from_parts(TableId::Property, rid),
                flags: pending.flags,
                name: pending.name,
                signature: self.blobs.add(&signature)?,
            });
        }

        let mut events = Vec::with_capacity(self.events.len());
        for (index, pending) in self.events.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            events.push(EventRaw {
                rid,
                token: Token::from_parts(TableId::Event, rid),
                flags: pending.flags,
                name: pending.name,
                event_type: arena.coded_index(pending.event_type)?,
            });
        }

        let mut type_specs = Vec::with_capacity(self.type_specs.len());
        for (index, pending) in self.type_specs.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            let signature = encode_typespec_signature(&SignatureTypeSpec {
                base: pending.signature.resolve(arena, value_types)?,
            })?;
            type_specs.push(TypeSpecRaw {
                rid,
                token: Token::from_parts(TableId::TypeSpec, rid),
                signature: self.blobs.add(&signature)?,
            });
        }

        let mut interface_impls = Vec::with_capacity(self.interface_impls.len());
        for (index, pending) in self.interface_impls.iter().enumerate() {
            let rid = to_u32(index + 1)?;
            interface_impls.push(InterfaceImplRaw {
                rid,
                token: Token::from_parts(TableId::InterfaceImpl, rid),
                class: pending.class,
                interface: arena.coded_index(pending.interface)?,
            });
        }

        // InterfaceImpl and GenericParam rows can own attributes; collect their moves first
        let mut moved: HashMap<(TableId, u32), u32> = HashMap::new();

        let mut interface_impls = sort_rows(interface_impls, InterfaceImplRaw::sort_key)?;
        for (index, row) in interface_impls.iter().enumerate() {
            moved.insert((TableId::InterfaceImpl, row.rid), to_u32(index + 1)?);
        }
        renumber!(interface_impls, TableId::InterfaceImpl);

        let mut generic_params = sort_rows(
            std::mem::take(&mut self.generic_params),
            GenericParamRaw::sort_key,
        )?;
        for (index, row) in generic_params.iter().enumerate() {
            moved.insert((TableId::GenericParam, row.rid), to_u32(index + 1)?);
        }
        renumber!(generic_params, TableId::GenericParam);

        let mut custom_attributes = std::mem::take(&mut self.custom_attributes);
        for attribute in &mut custom_attributes {
            if let Some(row) = moved.get(&(attribute.parent.tag, attribute.parent.row)) {
                attribute.parent = CodedIndex::new(attribute.parent.tag, *row);
            }
        }
        let mut custom_attributes = sort_rows(custom_attributes, |row| {
            row.parent.encode(CodedIndexType::HasCustomAttribute)
        })?;
        renumber!(custom_attributes, TableId::CustomAttribute);

        let mut constants = sort_rows(std::mem::take(&mut self.constants), |row| {
            row.parent.encode(CodedIndexType::HasConstant)
        })?;
        renumber!(constants, TableId::Constant);

        let mut method_semantics = sort_rows(std::mem::take(&mut self.method_semantics), |row| {
            row.association.encode(CodedIndexType::HasSemantics)
        })?;
        renumber!(method_semantics, TableId::MethodSemantics);

        let tables = TableSet {
            modules: self.modules,
            type_refs: self.type_refs,
            type_defs,
            fields,
            methods,
            params: self.params,
            interface_impls,
            member_refs: self.member_refs,
            constants,
            custom_attributes,
            event_maps: self.event_maps,
            events,
            property_maps: self.property_maps,
            properties,
            method_semantics,
            type_specs,
            assemblies: self.assemblies,
            assembly_refs: self.assembly_refs,
            generic_params,
            strings: self.strings,
            blobs: self.blobs,
            guids: self.guids,
        };

        validate(&tables)?;

        info!(
            "Finalized {} types, {} methods, {} type references",
            tables.type_defs.len().saturating_sub(1),
            tables.methods.len(),
            tables.type_refs.len()
        );
        for (table, rows) in tables.row_counts() {
            debug!("{:?}: {} rows", table, rows);
        }

        Ok(tables)
    }
}

fn check_ascending<T>(
    table: TableId,
    rows: &[T],
    key: impl Fn(&T) -> Result<(u32, u32)>,
) -> Result<()> {
    let keys = rows.iter().map(key).collect::<Result<Vec<_>>>()?;
    if let Some(index) = keys.windows(2).position(|pair| pair[0] > pair[1]) {
        return Err(ordering(table, format!("row {} is out of order", index + 2)));
    }
    Ok(())
}

/// A range list column: non-decreasing and at most one past the target table.
fn check_list(table: TableId, lists: impl Iterator<Item = u32>, target: &TableSet, of: TableId) -> Result<()> {
    let bound = target.row_count(of) + 1;
    let mut previous = 1;
    for (index, list) in lists.enumerate() {
        if list < previous || list > bound {
            return Err(ordering(
                table,
                format!("row {} starts its {:?} list at {}", index + 1, of, list),
            ));
        }
        previous = list;
    }
    Ok(())
}

fn check_row(table: TableId, tables: &TableSet, target: TableId, row: u32) -> Result<()> {
    if row > tables.row_count(target) {
        return Err(ordering(
            table,
            format!("reference to {:?} row {} is out of range", target, row),
        ));
    }
    Ok(())
}

fn check_index(table: TableId, tables: &TableSet, index: &CodedIndex) -> Result<()> {
    check_row(table, tables, index.tag, index.row)
}

/// Re-checks the invariants the writer relies on.
fn validate(tables: &TableSet) -> Result<()> {
    check_ascending(TableId::InterfaceImpl, &tables.interface_impls, InterfaceImplRaw::sort_key)?;
    check_ascending(TableId::GenericParam, &tables.generic_params, GenericParamRaw::sort_key)?;
    check_ascending(TableId::Constant, &tables.constants, |row| {
        Ok((row.parent.encode(CodedIndexType::HasConstant)?, 0))
    })?;
    check_ascending(TableId::CustomAttribute, &tables.custom_attributes, |row| {
        Ok((row.parent.encode(CodedIndexType::HasCustomAttribute)?, 0))
    })?;
    check_ascending(TableId::MethodSemantics, &tables.method_semantics, |row| {
        Ok((row.association.encode(CodedIndexType::HasSemantics)?, 0))
    })?;

    check_list(
        TableId::TypeDef,
        tables.type_defs.iter().map(|row| row.field_list),
        tables,
        TableId::Field,
    )?;
    check_list(
        TableId::TypeDef,
        tables.type_defs.iter().map(|row| row.method_list),
        tables,
        TableId::MethodDef,
    )?;
    check_list(
        TableId::MethodDef,
        tables.methods.iter().map(|row| row.param_list),
        tables,
        TableId::Param,
    )?;
    check_list(
        TableId::PropertyMap,
        tables.property_maps.iter().map(|row| row.property_list),
        tables,
        TableId::Property,
    )?;
    check_list(
        TableId::EventMap,
        tables.event_maps.iter().map(|row| row.event_list),
        tables,
        TableId::Event,
    )?;

    for row in &tables.type_refs {
        check_index(TableId::TypeRef, tables, &row.resolution_scope)?;
    }
    for row in &tables.type_defs {
        check_index(TableId::TypeDef, tables, &row.extends)?;
    }
    for row in &tables.interface_impls {
        check_row(TableId::InterfaceImpl, tables, TableId::TypeDef, row.class)?;
        check_index(TableId::InterfaceImpl, tables, &row.interface)?;
    }
    for row in &tables.member_refs {
        check_index(TableId::MemberRef, tables, &row.class)?;
    }
    for row in &tables.constants {
        check_index(TableId::Constant, tables, &row.parent)?;
    }
    for row in &tables.custom_attributes {
        check_index(TableId::CustomAttribute, tables, &row.parent)?;
        check_index(TableId::CustomAttribute, tables, &row.constructor)?;
    }
    for row in &tables.events {
        check_index(TableId::Event, tables, &row.event_type)?;
    }
    for row in &tables.event_maps {
        check_row(TableId::EventMap, tables, TableId::TypeDef, row.parent)?;
    }
    for row in &tables.property_maps {
        check_row(TableId::PropertyMap, tables, TableId::TypeDef, row.parent)?;
    }
    for row in &tables.method_semantics {
        check_row(TableId::MethodSemantics, tables, TableId::MethodDef, row.method)?;
        check_index(TableId::MethodSemantics, tables, &row.association)?;
    }
    for row in &tables.generic_params {
        check_index(TableId::GenericParam, tables, &row.owner)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::AssemblyVersion,
        model::{MemberDeclaration, TypeDeclaration, TypeReference, TypeSig, FOUNDATION_CONTRACT},
    };

    fn builder() -> MetadataBuilder {
        MetadataBuilder::new("Contoso", AssemblyVersion::default()).unwrap()
    }

    fn widget_tables(interface_first: bool) -> TableSet {
        let interface = TypeDeclaration::interface("Contoso.IWidget")
            .method(MemberDeclaration::method("Render"));
        let class = TypeDeclaration::class("Contoso.Widget")
            .implements(TypeReference::program("Contoso.IWidget"))
            .method(MemberDeclaration::method("Render"))
            .method(
                MemberDeclaration::method("Clone")
                    .returns(TypeSig::Named(TypeReference::program("Contoso.IWidget"))),
            );

        let mut builder = builder();
        if interface_first {
            builder.visit_type(&interface).unwrap();
            builder.visit_type(&class).unwrap();
        } else {
            builder.visit_type(&class).unwrap();
            assert_eq!(builder.pending_references(), 2);
            builder.visit_type(&interface).unwrap();
        }
        assert_eq!(builder.pending_references(), 0);
        builder.finalize().unwrap()
    }

    fn implemented_by_name(tables: &TableSet) -> Vec<(String, String)> {
        tables
            .interface_impls()
            .iter()
            .map(|row| {
                let class = &tables.type_defs()[row.class as usize - 1];
                let interface = &tables.type_defs()[row.interface.row as usize - 1];
                (
                    tables.string(class.type_name).unwrap().to_string(),
                    tables.string(interface.type_name).unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn forward_references_are_order_independent() {
        let forward = widget_tables(false);
        let backward = widget_tables(true);

        assert_eq!(implemented_by_name(&forward), implemented_by_name(&backward));
        assert_eq!(
            implemented_by_name(&forward),
            [("Widget".to_string(), "IWidget".to_string())]
        );
        assert_eq!(forward.row_count(TableId::TypeDef), backward.row_count(TableId::TypeDef));
        assert_eq!(forward.row_count(TableId::MethodDef), 3);
    }

    #[test]
    fn unresolved_reference() {
        let mut builder = builder();
        builder
            .visit_type(
                &TypeDeclaration::class("N.A").implements(TypeReference::program("N.IMissing")),
            )
            .unwrap();

        match builder.finalize() {
            Err(Error::UnresolvedReference { owner, target }) => {
                assert_eq!(owner, Token::from_parts(TableId::InterfaceImpl, 1));
                assert_eq!(target, "N.IMissing");
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn interface_impls_are_sorted_and_attributes_follow() {
        let mut builder = builder();
        builder.visit_type(&TypeDeclaration::interface("N.IA")).unwrap();
        // The TypeRef is listed first but its coded index is larger than the TypeDef's
        builder
            .visit_type(
                &TypeDeclaration::class("N.A")
                    .implements(TypeReference::external(
                        "Windows.Foundation.IClosable",
                        FOUNDATION_CONTRACT,
                    ))
                    .implements(TypeReference::program("N.IA")),
            )
            .unwrap();
        let tables = builder.finalize().unwrap();

        let impls = tables.interface_impls();
        assert_eq!(impls[0].interface, CodedIndex::new(TableId::TypeDef, 2));
        assert_eq!(impls[1].interface.tag, TableId::TypeRef);
        assert_eq!(impls[1].rid, 2);

        // The default attribute follows the first declared interface to its new row
        let default = tables
            .custom_attributes()
            .iter()
            .find(|row| row.parent.tag == TableId::InterfaceImpl)
            .unwrap();
        assert_eq!(default.parent.row, 2);

        let keys: Vec<u32> = tables
            .custom_attributes()
            .iter()
            .map(|row| row.parent.encode(CodedIndexType::HasCustomAttribute).unwrap())
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn validate_rejects_bad_lists() {
        let mut tables = builder().finalize().unwrap();
        tables.type_defs[0].method_list = 5;
        assert!(matches!(validate(&tables), Err(Error::OrderingViolation { .. })));
    }

    #[test]
    fn validate_rejects_dangling_index() {
        let mut tables = builder().finalize().unwrap();
        tables.type_defs[0].extends = CodedIndex::new(TableId::TypeRef, 9);
        match validate(&tables) {
            Err(Error::OrderingViolation { table, .. }) => assert_eq!(table, "TypeDef"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
