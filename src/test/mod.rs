//! Shared fixtures for unit tests.

use std::{ffi::OsString, fs, path::Path};

use crate::{
    driver::{ProjectionTool, ToolOutput},
    model::{MemberDeclaration, Program, TypeDeclaration, TypeReference, TypeSig, FOUNDATION_CONTRACT},
    Result,
};

// Helper function to create a Windows.Foundation interface reference
pub fn foundation_interface(name: &str, arguments: Vec<TypeSig>) -> TypeReference {
    TypeReference::external(&format!("Windows.Foundation.{name}"), FOUNDATION_CONTRACT)
        .with_arguments(arguments)
}

// `Contoso.Widget : IWidget` with a single `Render` method
pub fn widget_program() -> Program {
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

// `Contoso.Worker : IAsyncOperation<string>`, rejected by the rule checker
pub fn worker_program() -> Program {
    let mut program = Program::new();
    program.add_unit(
        "Worker.cs",
        vec![TypeDeclaration::class("Contoso.Worker")
            .implements(foundation_interface("IAsyncOperation`1", vec![TypeSig::String]))],
    );
    program
}

/// A projection tool that records its invocations and writes canned sources.
#[derive(Debug, Default)]
pub struct FakeTool {
    files: Vec<(String, String)>,
    code: i32,
    stderr: String,
    calls: Vec<Vec<String>>,
}

impl FakeTool {
    // Exits with 0 after writing `files` into the `-output` directory
    pub fn producing(files: &[(&str, &str)]) -> Self {
        FakeTool {
            files: files
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
            ..FakeTool::default()
        }
    }

    // Exits with `code`, printing `stderr`
    pub fn failing(code: i32, stderr: &str) -> Self {
        FakeTool {
            code,
            stderr: stderr.to_string(),
            ..FakeTool::default()
        }
    }

    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }
}

impl ProjectionTool for FakeTool {
    fn run(&mut self, _program: &Path, arguments: &[OsString]) -> Result<ToolOutput> {
        let arguments: Vec<String> = arguments
            .iter()
            .map(|argument| argument.to_string_lossy().into_owned())
            .collect();

        if let Some(position) = arguments.iter().position(|argument| argument == "-output") {
            if let Some(output) = arguments.get(position + 1) {
                for (name, text) in &self.files {
                    fs::write(Path::new(output).join(name), text)?;
                }
            }
        }

        self.calls.push(arguments);
        Ok(ToolOutput {
            code: Some(self.code),
            stdout: "cswinrt".to_string(),
            stderr: self.stderr.clone(),
        })
    }
}
