//! Generation runs as a host build performs them.

use std::{ffi::OsString, fs, path::Path};

use winmdgen::{
    driver::{GeneratorConfig, ToolOutput},
    model::FOUNDATION_CONTRACT,
    prelude::*,
};

/// Writes one source into the `-output` directory and remembers how often it ran.
#[derive(Default)]
struct RecordingTool {
    runs: usize,
    arguments: Vec<String>,
}

impl ProjectionTool for RecordingTool {
    fn run(&mut self, _program: &Path, arguments: &[OsString]) -> Result<ToolOutput> {
        self.runs += 1;
        self.arguments = arguments
            .iter()
            .map(|argument| argument.to_string_lossy().into_owned())
            .collect();

        let output = arguments
            .iter()
            .skip_while(|argument| *argument != "-output")
            .nth(1)
            .ok_or(Error::ExternalTool {
                message: "no -output".to_string(),
            })?;
        fs::write(Path::new(output).join("Contoso.cs"), "namespace Contoso {}")?;
        Ok(ToolOutput::success("generated 1 file"))
    }
}

fn properties(generated: &Path) -> BuildProperties {
    BuildProperties::parse(&format!(
        "is_global = true\n\
         [*.cs]\n\
         build_property.AssemblyName = Contoso\n\
         build_property.AssemblyVersion = 1.0.0.0\n\
         build_property.GeneratedFilesDir = {}\n\
         build_property.CsWinRTComponent = true\n\
         build_property.CsWinRTExe = cswinrt\n",
        generated.display()
    ))
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

fn worker() -> Program {
    let mut program = Program::new();
    program.add_unit(
        "Worker.cs",
        vec![TypeDeclaration::class("Contoso.Worker").implements(
            TypeReference::external("Windows.Foundation.IAsyncOperation`1", FOUNDATION_CONTRACT)
                .with_arguments(vec![TypeSig::String]),
        )],
    );
    program
}

fn driver(generated: &Path) -> Result<GenerationDriver<RecordingTool>> {
    let config = GeneratorConfig::from_properties(&properties(generated)).ok_or(
        Error::MissingProperty("CsWinRTComponent"),
    )?;
    let log = GenerationLog::create(&config.log_path())?;
    Ok(GenerationDriver::new(config, log, RecordingTool::default()))
}

#[test]
fn widget_reaches_done() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let generated = temp_dir.path().join("Generated Files");
    let mut driver = driver(&generated)?;

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let outcome = driver.run(&widget(), &mut diagnostics)?;

    assert!(diagnostics.is_empty());
    assert_eq!(driver.state(), GenerationState::Done);
    assert_eq!(driver.tool().runs, 1);
    assert_eq!(driver.tool().arguments[4], "10.0.18362.0");
    assert_eq!(driver.tool().arguments[6], "Contoso");

    match outcome {
        GenerationOutcome::Completed { artifact, sources } => {
            assert_eq!(artifact, generated.join("Contoso.winmd"));
            let file = WinmdFile::from_file(&artifact)?;
            assert_eq!(file.table_row_count(TableId::TypeDef), 3);
            assert_eq!(file.table_row_count(TableId::MethodDef), 1);
            assert_eq!(file.table_row_count(TableId::InterfaceImpl), 1);

            assert_eq!(sources.len(), 1);
            assert_eq!(sources[0].hint_name, "Contoso");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let log = fs::read_to_string(generated.join("log.txt"))?;
    assert!(log.contains("generated 1 file"));
    assert!(log.trim_end().ends_with("Done"));
    Ok(())
}

#[test]
fn worker_aborts_without_artifact() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let generated = temp_dir.path().join("generated");
    let mut driver = driver(&generated)?;

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let outcome = driver.run(&worker(), &mut diagnostics)?;

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].location, "Contoso.Worker");
    assert!(matches!(outcome, GenerationOutcome::Aborted { ref violations } if violations.len() == 1));
    assert_eq!(driver.state(), GenerationState::Aborted);
    assert_eq!(driver.tool().runs, 0);
    assert!(!generated.join("Contoso.winmd").exists());
    Ok(())
}

#[test]
fn disabled_without_opt_in() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let generated = temp_dir.path().join("generated");
    let mut properties = properties(&generated);
    properties.insert("build_property.CsWinRTComponent", "false");

    let outcome = execute(
        &properties,
        &widget(),
        &mut Vec::<Diagnostic>::new(),
        RecordingTool::default(),
    )?;
    assert_eq!(outcome, GenerationOutcome::Disabled);
    assert!(!generated.exists());
    Ok(())
}

#[test]
fn execute_runs_the_pipeline() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let generated = temp_dir.path().join("generated");

    let outcome = execute(
        &properties(&generated),
        &widget(),
        &mut Vec::<Diagnostic>::new(),
        RecordingTool::default(),
    )?;
    assert!(matches!(outcome, GenerationOutcome::Completed { .. }));
    assert!(generated.join("Contoso.winmd").exists());
    Ok(())
}

#[test]
fn missing_assembly_name_fails_the_run() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let generated = temp_dir.path().join("generated");
    let mut properties = properties(&generated);
    properties.insert("build_property.AssemblyName", "");

    let result = execute(
        &properties,
        &widget(),
        &mut Vec::<Diagnostic>::new(),
        RecordingTool::default(),
    );
    assert!(matches!(result, Err(Error::MissingProperty("AssemblyName"))));

    let log = fs::read_to_string(generated.join("log.txt"))?;
    assert!(log.contains("AssemblyName"));
    Ok(())
}
