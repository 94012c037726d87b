//! The frozen result of table building.

use crate::{
    metadata::{
        streams::{BlobBuilder, GuidBuilder, Strings, StringsBuilder},
        tables::{
            AssemblyRaw, AssemblyRefRaw, ConstantRaw, CustomAttributeRaw, EventMapRaw, EventRaw,
            FieldRaw, GenericParamRaw, InterfaceImplRaw, MemberRefRaw, MethodDefRaw,
            MethodSemanticsRaw, ModuleRaw, ParamRaw, PropertyMapRaw, PropertyRaw, TableId,
            TypeDefRaw, TypeRefRaw, TypeSpecRaw,
        },
    },
    Result,
};

/// Every table row and heap of one component, ordered and fully resolved.
///
/// Produced by [`crate::builder::MetadataBuilder::finalize`] and consumed read-only by
/// [`crate::writer::serialize`]. All sorted tables are in ECMA-335 order and every range
/// list is consistent; nothing can be added any more.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub(crate) modules: Vec<ModuleRaw>,
    pub(crate) type_refs: Vec<TypeRefRaw>,
    pub(crate) type_defs: Vec<TypeDefRaw>,
    pub(crate) fields: Vec<FieldRaw>,
    pub(crate) methods: Vec<MethodDefRaw>,
    pub(crate) params: Vec<ParamRaw>,
    pub(crate) interface_impls: Vec<InterfaceImplRaw>,
    pub(crate) member_refs: Vec<MemberRefRaw>,
    pub(crate) constants: Vec<ConstantRaw>,
    pub(crate) custom_attributes: Vec<CustomAttributeRaw>,
    pub(crate) event_maps: Vec<EventMapRaw>,
    pub(crate) events: Vec<EventRaw>,
    pub(crate) property_maps: Vec<PropertyMapRaw>,
    pub(crate) properties: Vec<PropertyRaw>,
    pub(crate) method_semantics: Vec<MethodSemanticsRaw>,
    pub(crate) type_specs: Vec<TypeSpecRaw>,
    pub(crate) assemblies: Vec<AssemblyRaw>,
    pub(crate) assembly_refs: Vec<AssemblyRefRaw>,
    pub(crate) generic_params: Vec<GenericParamRaw>,
    pub(crate) strings: StringsBuilder,
    pub(crate) blobs: BlobBuilder,
    pub(crate) guids: GuidBuilder,
}

fn count<T>(rows: &[T]) -> u32 {
    u32::try_from(rows.len()).unwrap_or(u32::MAX)
}

impl TableSet {
    /// Number of rows in `table`; 0 for tables this crate never emits.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::Module => count(&self.modules),
            TableId::TypeRef => count(&self.type_refs),
            TableId::TypeDef => count(&self.type_defs),
            TableId::Field => count(&self.fields),
            TableId::MethodDef => count(&self.methods),
            TableId::Param => count(&self.params),
            TableId::InterfaceImpl => count(&self.interface_impls),
            TableId::MemberRef => count(&self.member_refs),
            TableId::Constant => count(&self.constants),
            TableId::CustomAttribute => count(&self.custom_attributes),
            TableId::EventMap => count(&self.event_maps),
            TableId::Event => count(&self.events),
            TableId::PropertyMap => count(&self.property_maps),
            TableId::Property => count(&self.properties),
            TableId::MethodSemantics => count(&self.method_semantics),
            TableId::TypeSpec => count(&self.type_specs),
            TableId::Assembly => count(&self.assemblies),
            TableId::AssemblyRef => count(&self.assembly_refs),
            TableId::GenericParam => count(&self.generic_params),
            _ => 0,
        }
    }

    /// The tables holding at least one row, in `TableId` order.
    #[must_use]
    pub fn present_tables(&self) -> Vec<TableId> {
        self.row_counts().into_iter().map(|(table, _)| table).collect()
    }

    /// `(table, rows)` for every non-empty table, in `TableId` order.
    #[must_use]
    pub fn row_counts(&self) -> Vec<(TableId, u32)> {
        use strum::IntoEnumIterator;

        TableId::iter()
            .map(|table| (table, self.row_count(table)))
            .filter(|(_, rows)| *rows > 0)
            .collect()
    }

    /// Resolves a `#Strings` index.
    ///
    /// # Errors
    /// Returns an error for an index outside the heap.
    pub fn string(&self, index: u32) -> Result<&str> {
        Strings::from(self.strings.data())?.get(index as usize)
    }

    /// The `TypeDef` rows, `<Module>` first.
    #[must_use]
    pub fn type_defs(&self) -> &[TypeDefRaw] {
        &self.type_defs
    }

    /// The `TypeRef` rows.
    #[must_use]
    pub fn type_refs(&self) -> &[TypeRefRaw] {
        &self.type_refs
    }

    /// The `MethodDef` rows.
    #[must_use]
    pub fn methods(&self) -> &[MethodDefRaw] {
        &self.methods
    }

    /// The `Field` rows.
    #[must_use]
    pub fn fields(&self) -> &[FieldRaw] {
        &self.fields
    }

    /// The `InterfaceImpl` rows, sorted by class then interface.
    #[must_use]
    pub fn interface_impls(&self) -> &[InterfaceImplRaw] {
        &self.interface_impls
    }

    /// The `CustomAttribute` rows, sorted by parent.
    #[must_use]
    pub fn custom_attributes(&self) -> &[CustomAttributeRaw] {
        &self.custom_attributes
    }

    /// The `MemberRef` rows.
    #[must_use]
    pub fn member_refs(&self) -> &[MemberRefRaw] {
        &self.member_refs
    }

    /// The `GenericParam` rows, sorted by owner then number.
    #[must_use]
    pub fn generic_params(&self) -> &[GenericParamRaw] {
        &self.generic_params
    }

    /// The `TypeSpec` rows.
    #[must_use]
    pub fn type_specs(&self) -> &[TypeSpecRaw] {
        &self.type_specs
    }

    /// The `Property` rows.
    #[must_use]
    pub fn properties(&self) -> &[PropertyRaw] {
        &self.properties
    }

    /// The `Event` rows.
    #[must_use]
    pub fn events(&self) -> &[EventRaw] {
        &self.events
    }

    /// The `MethodSemantics` rows, sorted by association.
    #[must_use]
    pub fn method_semantics(&self) -> &[MethodSemanticsRaw] {
        &self.method_semantics
    }

    /// The `Constant` rows, sorted by parent.
    #[must_use]
    pub fn constants(&self) -> &[ConstantRaw] {
        &self.constants
    }

    /// The `#Strings` heap.
    #[must_use]
    pub fn strings(&self) -> &StringsBuilder {
        &self.strings
    }

    /// The `#Blob` heap.
    #[must_use]
    pub fn blobs(&self) -> &BlobBuilder {
        &self.blobs
    }

    /// The `#GUID` heap; slot 1 is the module version id, patched by the writer.
    #[must_use]
    pub fn guids(&self) -> &GuidBuilder {
        &self.guids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let tables = TableSet::default();
        assert!(tables.present_tables().is_empty());
        assert_eq!(tables.row_count(TableId::TypeDef), 0);
        assert_eq!(tables.row_count(TableId::ClassLayout), 0);
    }
}
