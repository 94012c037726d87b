//! The metadata table builder.
//!
//! [`MetadataBuilder`] turns [`TypeDeclaration`]s into ECMA-335 table rows, one type at a
//! time in discovery order. Rows are appended as soon as a type is visited, so every
//! type's fields, methods, parameters, properties and events form contiguous runs. A
//! reference to a program type that has not been visited yet is deferred and resolved
//! when the target shows up; [`MetadataBuilder::finalize`] fails if any reference is left
//! dangling, restores the ordering of the sorted tables and hands out a frozen
//! [`TableSet`].
//!
//! # Examples
//!
//! ```rust
//! use winmdgen::builder::{AssemblyVersion, MetadataBuilder};
//! use winmdgen::metadata::tables::TableId;
//! use winmdgen::model::{TypeDeclaration, TypeReference};
//!
//! let mut builder = MetadataBuilder::new("Contoso", AssemblyVersion::new(1, 0, 0, 0))?;
//!
//! // The class is visited before the interface it implements.
//! builder.visit_type(
//!     &TypeDeclaration::class("Contoso.Widget")
//!         .implements(TypeReference::program("Contoso.IWidget")),
//! )?;
//! builder.visit_type(&TypeDeclaration::interface("Contoso.IWidget"))?;
//!
//! let tables = builder.finalize()?;
//! assert_eq!(tables.row_count(TableId::TypeDef), 3);
//! assert_eq!(tables.row_count(TableId::InterfaceImpl), 1);
//! # Ok::<(), winmdgen::Error>(())
//! ```

mod attributes;
mod finalize;
mod handles;
mod members;
mod references;
mod tableset;
mod version;

use std::collections::{HashMap, HashSet};

use log::debug;

pub use attributes::InterfaceGuid;
pub use tableset::TableSet;
pub use version::AssemblyVersion;

use crate::{
    builder::handles::{
        DeferredArena, PendingEvent, PendingField, PendingInterfaceImpl, PendingMethod,
        PendingProperty, PendingTypeDef, PendingTypeSpec, ValueTypes,
    },
    metadata::{
        streams::{BlobBuilder, GuidBuilder, StringsBuilder},
        tables::{
            AssemblyFlags, AssemblyHashAlgorithm, AssemblyRaw, AssemblyRefRaw, CodedIndex,
            ConstantRaw, CustomAttributeRaw, EventMapRaw, GenericParamRaw, MemberRefRaw,
            MethodSemanticsRaw, ModuleRaw, ParamRaw, PropertyMapRaw, TableId, TypeAttributes,
            TypeRefRaw,
        },
        token::Token,
    },
    model::{QualifiedName, SymbolModel, TypeDeclaration, TypeKind, TypeReference, Visibility},
    utils::to_u32,
    writer::{serialize, BinaryArtifact},
    Error, Result,
};

/// Highest row number a metadata token can address.
const MAX_ROWS: usize = 0x00FF_FFFF;

/// Identity of the component being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOptions {
    /// Assembly and file name, without extension
    pub assembly_name: String,
    /// Assembly version string, parsed when the artifact is built
    pub version: String,
}

impl ArtifactOptions {
    /// Options for `assembly_name` at `version`.
    #[must_use]
    pub fn new(assembly_name: &str, version: &str) -> Self {
        ArtifactOptions {
            assembly_name: assembly_name.to_string(),
            version: version.to_string(),
        }
    }

    /// The parsed version.
    ///
    /// # Errors
    /// Returns [`Error::InvalidVersion`] if the version string can not be parsed.
    pub fn assembly_version(&self) -> Result<AssemblyVersion> {
        AssemblyVersion::parse(&self.version)
    }
}

/// Builds the finalized tables for every type of `model`, in discovery order.
///
/// # Errors
/// Returns the first declaration, resolution or ordering error.
pub fn build_tables<M: SymbolModel + ?Sized>(model: &M, options: &ArtifactOptions) -> Result<TableSet> {
    let mut builder = MetadataBuilder::new(&options.assembly_name, options.assembly_version()?)?;
    for declaration in model.types() {
        builder.visit_type(declaration)?;
    }
    builder.finalize()
}

/// Builds and serializes the `.winmd` image for `model`.
///
/// # Errors
/// Returns any error of [`build_tables`] or [`serialize`].
pub fn build_artifact<M: SymbolModel + ?Sized>(
    model: &M,
    options: &ArtifactOptions,
) -> Result<BinaryArtifact> {
    serialize(&build_tables(model, options)?)
}

/// The 1-based row number the next row of a table holding `len` rows receives.
pub(crate) fn next_rid(len: usize) -> Result<u32> {
    if len >= MAX_ROWS {
        return Err(malformed_error!("Table exceeds {} rows", MAX_ROWS));
    }
    to_u32(len + 1)
}

/// Accumulates table rows for one component.
///
/// The builder is single use: [`MetadataBuilder::finalize`] consumes it.
pub struct MetadataBuilder {
    strings: StringsBuilder,
    blobs: BlobBuilder,
    guids: GuidBuilder,

    modules: Vec<ModuleRaw>,
    assemblies: Vec<AssemblyRaw>,
    assembly_refs: Vec<AssemblyRefRaw>,
    type_refs: Vec<TypeRefRaw>,
    type_defs: Vec<PendingTypeDef>,
    fields: Vec<PendingField>,
    methods: Vec<PendingMethod>,
    params: Vec<ParamRaw>,
    interface_impls: Vec<PendingInterfaceImpl>,
    member_refs: Vec<MemberRefRaw>,
    constants: Vec<ConstantRaw>,
    custom_attributes: Vec<CustomAttributeRaw>,
    event_maps: Vec<EventMapRaw>,
    events: Vec<PendingEvent>,
    property_maps: Vec<PropertyMapRaw>,
    properties: Vec<PendingProperty>,
    method_semantics: Vec<MethodSemanticsRaw>,
    type_specs: Vec<PendingTypeSpec>,
    generic_params: Vec<GenericParamRaw>,

    visited: HashMap<QualifiedName, u32>,
    assembly_ref_index: HashMap<String, u32>,
    type_ref_index: HashMap<(String, QualifiedName), u32>,
    type_spec_index: HashMap<TypeReference, u32>,
    member_ref_index: HashMap<String, u32>,
    deferred: DeferredArena,
    value_types: ValueTypes,
}

impl MetadataBuilder {
    /// Seeds the `Module` and `Assembly` rows and the `<Module>` pseudo type.
    ///
    /// # Errors
    /// Returns [`Error::MissingProperty`] for an empty assembly name.
    pub fn new(assembly_name: &str, version: AssemblyVersion) -> Result<Self> {
        if assembly_name.trim().is_empty() {
            return Err(Error::MissingProperty("AssemblyName"));
        }

        let mut builder = MetadataBuilder {
            strings: StringsBuilder::new(),
            blobs: BlobBuilder::new(),
            guids: GuidBuilder::new(),
            modules: Vec::new(),
            assemblies: Vec::new(),
            assembly_refs: Vec::new(),
            type_refs: Vec::new(),
            type_defs: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            params: Vec::new(),
            interface_impls: Vec::new(),
            member_refs: Vec::new(),
            constants: Vec::new(),
            custom_attributes: Vec::new(),
            event_maps: Vec::new(),
            events: Vec::new(),
            property_maps: Vec::new(),
            properties: Vec::new(),
            method_semantics: Vec::new(),
            type_specs: Vec::new(),
            generic_params: Vec::new(),
            visited: HashMap::new(),
            assembly_ref_index: HashMap::new(),
            type_ref_index: HashMap::new(),
            type_spec_index: HashMap::new(),
            member_ref_index: HashMap::new(),
            deferred: DeferredArena::default(),
            value_types: ValueTypes::default(),
        };

        // The writer patches the MVID once the content hash is known
        let mvid = builder.guids.add(uguid::Guid::ZERO)?;
        let module_name = builder.strings.add(&format!("{assembly_name}.winmd"))?;
        builder.modules.push(ModuleRaw {
            rid: 1,
            token: Token::from_parts(TableId::Module, 1),
            generation: 0,
            name: module_name,
            mvid,
            encid: 0,
            encbaseid: 0,
        });

        let name = builder.strings.add(assembly_name)?;
        builder.assemblies.push(AssemblyRaw {
            rid: 1,
            token: Token::from_parts(TableId::Assembly, 1),
            hash_alg_id: AssemblyHashAlgorithm::SHA1,
            major_version: u32::from(version.major),
            minor_version: u32::from(version.minor),
            build_number: u32::from(version.build),
            revision_number: u32::from(version.revision),
            flags: AssemblyFlags::CONTENT_TYPE_WINDOWS_RUNTIME,
            public_key: 0,
            name,
            culture: 0,
        });

        let module_type = builder.strings.add("<Module>")?;
        builder.type_defs.push(PendingTypeDef {
            flags: TypeAttributes::NOT_PUBLIC,
            name: module_type,
            namespace: 0,
            extends: None,
            field_list: 1,
            method_list: 1,
        });

        Ok(builder)
    }

    /// Number of types visited so far, not counting `<Module>`.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of references still waiting for their target to be visited.
    #[must_use]
    pub fn pending_references(&self) -> usize {
        self.deferred.pending()
    }

    /// Emits the rows of one declaration and returns its `TypeDef` token.
    ///
    /// Earlier references to this type's name resolve to the new row. The declaration is
    /// validated as a whole first; a rejected declaration leaves the builder unchanged.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateType`] if the name was visited before, and
    /// [`Error::InvalidDeclaration`] when the declaration breaks an invariant of the model
    /// (generic arity, duplicate interfaces, members the kind can not have).
    pub fn visit_type(&mut self, declaration: &TypeDeclaration) -> Result<Token> {
        validate_declaration(declaration)?;
        if self.visited.contains_key(&declaration.name) {
            return Err(Error::DuplicateType(declaration.qualified_name()));
        }

        let rid = next_rid(self.type_defs.len())?;
        let token = Token::from_parts(TableId::TypeDef, rid);

        let name = self.strings.add(&declaration.name.name)?;
        let namespace = self.strings.add(&declaration.name.namespace)?;
        let extends = match declaration.effective_base() {
            Some(base) => Some(self.type_handle(&base, token)?),
            None => None,
        };

        self.type_defs.push(PendingTypeDef {
            flags: type_flags(declaration),
            name,
            namespace,
            extends,
            field_list: next_rid(self.fields.len())?,
            method_list: next_rid(self.methods.len())?,
        });
        self.visited.insert(declaration.name.clone(), rid);
        if matches!(declaration.kind, TypeKind::Struct | TypeKind::Enum) {
            self.value_types.defs.insert(rid);
        }

        let resolved = self.deferred.resolve(&declaration.name, rid);
        if resolved > 0 {
            debug!("{} resolved {} deferred references", declaration.name, resolved);
        }

        for (number, parameter) in declaration.generic_parameters.iter().enumerate() {
            let param_rid = next_rid(self.generic_params.len())?;
            let name = self.strings.add(parameter)?;
            self.generic_params.push(GenericParamRaw {
                rid: param_rid,
                token: Token::from_parts(TableId::GenericParam, param_rid),
                number: to_u32(number)?,
                flags: 0,
                owner: CodedIndex::new(TableId::TypeDef, rid),
                name,
            });
        }

        self.emit_interfaces(declaration, rid)?;
        self.emit_members(declaration, rid)?;

        if matches!(declaration.kind, TypeKind::Interface | TypeKind::Delegate) {
            self.add_guid_attribute(rid, &declaration.name)?;
        }

        debug!("Visited {} as {}", declaration.name, token);
        Ok(token)
    }

    fn emit_interfaces(&mut self, declaration: &TypeDeclaration, class: u32) -> Result<()> {
        for (position, interface) in declaration.interfaces.iter().enumerate() {
            let rid = next_rid(self.interface_impls.len())?;
            let owner = Token::from_parts(TableId::InterfaceImpl, rid);
            let handle = self.type_handle(interface, owner)?;
            self.interface_impls.push(PendingInterfaceImpl {
                class,
                interface: handle,
            });

            if position == 0 && declaration.kind == TypeKind::Class {
                self.add_default_attribute(rid)?;
            }
        }
        Ok(())
    }
}

fn type_flags(declaration: &TypeDeclaration) -> u32 {
    let visibility = match declaration.visibility {
        Visibility::Public => TypeAttributes::PUBLIC,
        Visibility::Internal => TypeAttributes::NOT_PUBLIC,
    };

    let semantics = match declaration.kind {
        TypeKind::Interface => TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
        TypeKind::Struct => TypeAttributes::SEALED | TypeAttributes::SEQUENTIAL_LAYOUT,
        TypeKind::Class | TypeKind::Enum | TypeKind::Delegate => TypeAttributes::SEALED,
    };

    visibility | semantics | TypeAttributes::WINDOWS_RUNTIME
}

fn invalid(declaration: &TypeDeclaration, message: impl Into<String>) -> Error {
    Error::InvalidDeclaration {
        name: declaration.qualified_name(),
        message: message.into(),
    }
}

fn validate_declaration(declaration: &TypeDeclaration) -> Result<()> {
    if declaration.name.name.is_empty() {
        return Err(invalid(declaration, "type name is empty"));
    }

    let arity = declaration.name.arity() as usize;
    if arity != declaration.generic_parameters.len() {
        return Err(invalid(
            declaration,
            format!(
                "arity suffix {} does not match {} generic parameters",
                arity,
                declaration.generic_parameters.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for interface in &declaration.interfaces {
        if !seen.insert(interface.original_definition()) {
            return Err(invalid(
                declaration,
                format!("interface {} is listed twice", interface.original_definition()),
            ));
        }
    }

    if declaration.kind == TypeKind::Interface && declaration.base_type.is_some() {
        return Err(invalid(declaration, "interfaces can not have a base type"));
    }

    members::check_members(declaration)?;
    references::check_references(declaration)
}
