use std::path::Path;

use anyhow::bail;
use serde::Serialize;
use winmdgen::rules::{check_program, Diagnostic};

use crate::{
    app::GlobalOptions,
    commands::common::{load_program, print_diagnostics, DiagnosticEntry, ViolationEntry},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct CheckOutput {
    diagnostics: Vec<DiagnosticEntry>,
    violations: Vec<ViolationEntry>,
}

pub fn run(program: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let program = load_program(program)?;

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let violations = check_program(&program, &mut diagnostics);

    let output = CheckOutput {
        diagnostics: diagnostics.iter().map(DiagnosticEntry::from).collect(),
        violations: violations.iter().map(ViolationEntry::from).collect(),
    };

    print_output(&output, opts, |out| {
        if out.diagnostics.is_empty() {
            println!("No interop rule violations.");
        } else {
            print_diagnostics(&out.diagnostics);
        }
    })?;

    if !violations.is_empty() {
        bail!("{} runtime class(es) violate the interop rules", violations.len());
    }
    Ok(())
}
