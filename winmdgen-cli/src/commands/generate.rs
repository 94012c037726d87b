use std::{ffi::OsString, path::Path};

use anyhow::Context;
use serde::Serialize;
use winmdgen::{
    driver::{execute, BuildProperties, CsWinRtTool, GenerationOutcome, ProjectionTool, ToolOutput},
    rules::Diagnostic,
};

use crate::{
    app::GlobalOptions,
    commands::common::{load_program, print_diagnostics, DiagnosticEntry, ViolationEntry},
    output::print_output,
};

/// Stands in for the projection tool when `--skip-projection` is given.
struct SkipProjection;

impl ProjectionTool for SkipProjection {
    fn run(&mut self, program: &Path, _arguments: &[OsString]) -> winmdgen::Result<ToolOutput> {
        Ok(ToolOutput::success(&format!(
            "Skipped projection tool {}",
            program.display()
        )))
    }
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<String>,
    sources: Vec<String>,
    diagnostics: Vec<DiagnosticEntry>,
    violations: Vec<ViolationEntry>,
}

pub fn run(
    program: &Path,
    properties: &Path,
    sources_out: Option<&Path>,
    skip_projection: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let program = load_program(program)?;
    let properties = BuildProperties::from_file(properties)
        .with_context(|| format!("failed to read properties: {}", properties.display()))?;

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let outcome = if skip_projection {
        execute(&properties, &program, &mut diagnostics, SkipProjection)
    } else {
        execute(&properties, &program, &mut diagnostics, CsWinRtTool)
    }
    .context("generation failed")?;

    let mut output = GenerateOutput {
        status: "disabled",
        artifact: None,
        sources: Vec::new(),
        diagnostics: diagnostics.iter().map(DiagnosticEntry::from).collect(),
        violations: Vec::new(),
    };

    match &outcome {
        GenerationOutcome::Disabled => {}
        GenerationOutcome::Aborted { violations } => {
            output.status = "aborted";
            output.violations = violations.iter().map(ViolationEntry::from).collect();
        }
        GenerationOutcome::Completed { artifact, sources } => {
            output.status = "completed";
            output.artifact = Some(artifact.display().to_string());

            if let Some(directory) = sources_out {
                std::fs::create_dir_all(directory).with_context(|| {
                    format!("failed to create directory: {}", directory.display())
                })?;
                for source in sources {
                    let path = directory.join(format!("{}.cs", source.hint_name));
                    std::fs::write(&path, &source.text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                }
            }
            output.sources = sources.iter().map(|s| s.hint_name.clone()).collect();
        }
    }

    print_output(&output, opts, |out| {
        print_diagnostics(&out.diagnostics);
        match out.status {
            "completed" => {
                if let Some(artifact) = &out.artifact {
                    println!("Wrote {artifact}");
                }
                for source in &out.sources {
                    println!("  + {source}.cs");
                }
            }
            "aborted" => println!("Generation aborted: errors in authored runtime component found."),
            _ => println!("CsWinRTComponent is not enabled; nothing to do."),
        }
    })?;

    if matches!(outcome, GenerationOutcome::Aborted { .. }) {
        anyhow::bail!("generation aborted");
    }
    Ok(())
}
