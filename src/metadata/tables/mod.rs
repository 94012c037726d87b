//! ECMA-335 metadata tables.
//!
//! Each table a Windows Runtime component needs lives in its own module with a `*Raw` row
//! type that implements both [`RowReadable`] and [`RowWritable`], plus the flag constants
//! used in its columns. The shared infrastructure (table ids, coded indexes, index widths)
//! is in [`types`].
//!
//! # Reference
//! - [ECMA-335 II.22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod assembly;
mod assemblyref;
mod constant;
mod customattribute;
mod event;
mod eventmap;
mod field;
mod genericparam;
mod interfaceimpl;
mod memberref;
mod methoddef;
mod methodsemantics;
mod module;
mod param;
mod property;
mod propertymap;
mod typedef;
mod typeref;
mod typespec;
pub mod types;

pub use assembly::*;
pub use assemblyref::*;
pub use constant::*;
pub use customattribute::*;
pub use event::*;
pub use eventmap::*;
pub use field::*;
pub use genericparam::*;
pub use interfaceimpl::*;
pub use memberref::*;
pub use methoddef::*;
pub use methodsemantics::*;
pub use module::*;
pub use param::*;
pub use property::*;
pub use propertymap::*;
pub use typedef::*;
pub use typeref::*;
pub use typespec::*;
pub use types::*;

/// Size in bytes of one row of `table`, or `None` for tables this crate never emits.
///
/// The `#~` reader uses this to step over tables it is not asked about.
#[must_use]
pub fn row_size(table: TableId, sizes: &TableInfoRef) -> Option<u32> {
    Some(match table {
        TableId::Module => <ModuleRaw as RowReadable>::row_size(sizes),
        TableId::TypeRef => <TypeRefRaw as RowReadable>::row_size(sizes),
        TableId::TypeDef => <TypeDefRaw as RowReadable>::row_size(sizes),
        TableId::Field => <FieldRaw as RowReadable>::row_size(sizes),
        TableId::MethodDef => <MethodDefRaw as RowReadable>::row_size(sizes),
        TableId::Param => <ParamRaw as RowReadable>::row_size(sizes),
        TableId::InterfaceImpl => <InterfaceImplRaw as RowReadable>::row_size(sizes),
        TableId::MemberRef => <MemberRefRaw as RowReadable>::row_size(sizes),
        TableId::Constant => <ConstantRaw as RowReadable>::row_size(sizes),
        TableId::CustomAttribute => <CustomAttributeRaw as RowReadable>::row_size(sizes),
        TableId::EventMap => <EventMapRaw as RowReadable>::row_size(sizes),
        TableId::Event => <EventRaw as RowReadable>::row_size(sizes),
        TableId::PropertyMap => <PropertyMapRaw as RowReadable>::row_size(sizes),
        TableId::Property => <PropertyRaw as RowReadable>::row_size(sizes),
        TableId::MethodSemantics => <MethodSemanticsRaw as RowReadable>::row_size(sizes),
        TableId::TypeSpec => <TypeSpecRaw as RowReadable>::row_size(sizes),
        TableId::Assembly => <AssemblyRaw as RowReadable>::row_size(sizes),
        TableId::AssemblyRef => <AssemblyRefRaw as RowReadable>::row_size(sizes),
        TableId::GenericParam => <GenericParamRaw as RowReadable>::row_size(sizes),
        _ => return None,
    })
}
