//! End to end tests: programs through the builder and writer, read back from bytes.

use std::collections::BTreeSet;

use winmdgen::{
    metadata::tables::{InterfaceImplRaw, MethodDefRaw, TypeDefRaw},
    prelude::*,
};

fn options() -> ArtifactOptions {
    ArtifactOptions::new("Contoso", "1.0.0.0")
}

fn widget() -> Program {
    let mut program = Program::new();
    program.add_unit(
        "Widget.cs",
        vec![
            TypeDeclaration::class("Contoso.Widget")
                .implements(TypeReference::program("Contoso.IWidget"))
                .method(MemberDeclaration::method("Render")),
            TypeDeclaration::interface("Contoso.IWidget"),
        ],
    );
    program
}

fn shapes(order: &[usize]) -> Program {
    let declarations = [
        TypeDeclaration::class("Contoso.Circle")
            .implements(TypeReference::program("Contoso.IShape"))
            .method(
                MemberDeclaration::method("Scale")
                    .param("factor", TypeSig::R8)
                    .returns(TypeSig::named(TypeReference::program("Contoso.IShape"))),
            ),
        TypeDeclaration::interface("Contoso.IShape").method(
            MemberDeclaration::method("Area").returns(TypeSig::R8),
        ),
    ];

    let mut program = Program::new();
    program.add_unit(
        "Shapes.cs",
        order.iter().map(|index| declarations[*index].clone()).collect(),
    );
    program
}

fn type_name(file: &WinmdFile, rows: &[TypeDefRaw], rid: u32) -> Result<String> {
    let row = &rows[rid as usize - 1];
    Ok(format!(
        "{}.{}",
        file.string(row.type_namespace)?,
        file.string(row.type_name)?
    ))
}

#[test]
fn widget_scenario() -> Result<()> {
    let program = widget();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    assert!(check_program(&program, &mut diagnostics).is_empty());
    assert!(diagnostics.is_empty());

    let artifact = build_artifact(&program, &options())?;
    let file = WinmdFile::from_mem(artifact.into_bytes())?;
    assert_eq!(file.version(), "WindowsRuntime 1.4");

    let type_defs = file.rows::<TypeDefRaw>()?;
    assert_eq!(type_defs.len(), 3);
    assert_eq!(file.string(type_defs[0].type_name)?, "<Module>");
    assert_eq!(type_name(&file, &type_defs, 2)?, "Contoso.Widget");
    assert_eq!(type_name(&file, &type_defs, 3)?, "Contoso.IWidget");

    // Widget owns the single method: its list starts at 1, IWidget's run is empty
    let methods = file.rows::<MethodDefRaw>()?;
    assert_eq!(methods.len(), 1);
    assert_eq!(file.string(methods[0].name)?, "Render");
    assert_eq!(type_defs[1].method_list, 1);
    assert_eq!(type_defs[2].method_list, 2);

    let impls = file.rows::<InterfaceImplRaw>()?;
    assert_eq!(impls.len(), 1);
    assert_eq!(impls[0].class, 2);
    assert_eq!(impls[0].interface.tag, TableId::TypeDef);
    assert_eq!(impls[0].interface.row, 3);
    Ok(())
}

#[test]
fn round_trip_row_counts() -> Result<()> {
    let tables = build_tables(&shapes(&[0, 1]), &options())?;
    let artifact = serialize(&tables)?;
    let file = WinmdFile::from_mem(artifact.bytes().to_vec())?;

    assert_eq!(file.present_tables(), tables.present_tables());
    for (table, rows) in tables.row_counts() {
        assert_eq!(file.table_row_count(table), rows, "{table:?}");
    }

    // Rows come back in the order they were written
    assert_eq!(file.rows::<TypeDefRaw>()?, tables.type_defs());
    assert_eq!(file.rows::<MethodDefRaw>()?, tables.methods());
    assert_eq!(file.rows::<InterfaceImplRaw>()?, tables.interface_impls());
    Ok(())
}

#[test]
fn identical_input_identical_bytes() -> Result<()> {
    let first = build_artifact(&shapes(&[0, 1]), &options())?;
    let second = build_artifact(&shapes(&[0, 1]), &options())?;
    assert_eq!(first.bytes(), second.bytes());
    assert_eq!(first.mvid(), second.mvid());

    let other = build_artifact(&shapes(&[0, 1]), &ArtifactOptions::new("Contoso", "2.0.0.0"))?;
    assert_ne!(first.mvid(), other.mvid());
    Ok(())
}

/// Every edge of the reference graph, by type name.
fn reference_graph(program: &Program) -> Result<BTreeSet<(String, String)>> {
    let artifact = build_artifact(program, &options())?;
    let file = WinmdFile::from_mem(artifact.into_bytes())?;
    let type_defs = file.rows::<TypeDefRaw>()?;

    let mut edges = BTreeSet::new();
    for row in file.rows::<InterfaceImplRaw>()? {
        assert_eq!(row.interface.tag, TableId::TypeDef);
        edges.insert((
            type_name(&file, &type_defs, row.class)?,
            type_name(&file, &type_defs, row.interface.row)?,
        ));
    }
    Ok(edges)
}

#[test]
fn forward_references_resolve_in_any_order() -> Result<()> {
    let forward = reference_graph(&shapes(&[0, 1]))?;
    let backward = reference_graph(&shapes(&[1, 0]))?;

    assert_eq!(forward, backward);
    assert!(forward.contains(&("Contoso.Circle".to_string(), "Contoso.IShape".to_string())));
    Ok(())
}

#[test]
fn unresolved_program_reference_fails() {
    let mut program = Program::new();
    program.add_unit(
        "Orphan.cs",
        vec![TypeDeclaration::class("Contoso.Orphan")
            .implements(TypeReference::program("Contoso.IMissing"))],
    );

    let result = build_artifact(&program, &options());
    assert!(matches!(result, Err(Error::UnresolvedReference { .. })));
}

#[test]
fn duplicate_types_are_rejected() {
    let mut program = Program::new();
    program.add_unit("A.cs", vec![TypeDeclaration::class("Contoso.A")]);
    program.add_unit("B.cs", vec![TypeDeclaration::class("Contoso.A")]);

    assert!(matches!(
        build_artifact(&program, &options()),
        Err(Error::DuplicateType(name)) if name == "Contoso.A"
    ));
}

#[test]
fn artifact_on_disk() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("Contoso.winmd");

    let artifact = build_artifact(&widget(), &options())?;
    write_artifact(&artifact, &path)?;

    let file = WinmdFile::from_file(&path)?;
    assert_eq!(file.data(), artifact.bytes());
    assert_eq!(file.guid(1)?, artifact.mvid());
    Ok(())
}
