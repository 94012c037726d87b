//! The generation driver.
//!
//! One [`GenerationDriver`] performs one run for one compilation:
//!
//! ```text
//! Idle -> Checking -> Building -> Finalizing -> Writing -> InvokingExternalTool -> Done
//!            |            |            |            |                |
//!            +------------+------------+------------+----------------+--> Aborted
//! ```
//!
//! A rule violation found while checking ends the run early with
//! [`GenerationOutcome::Aborted`]: nothing is written and the tool is never started. Any
//! error after that point also moves the driver to [`GenerationState::Aborted`], is
//! written to the log with every cause in its chain and is returned to the caller, which
//! fails the build. There are no retries.
//!
//! [`execute`] is the entry point a host build calls: it reads the configuration from the
//! build properties, opens the log and runs a driver.

pub mod config;
pub mod log;
pub mod scratch;
pub mod tool;

use std::{
    fs,
    path::{Path, PathBuf},
};

use strum::Display;

pub use config::{BuildProperties, GeneratorConfig};
pub use self::log::GenerationLog;
pub use scratch::{GeneratedSource, ScratchDir};
pub use tool::{CsWinRtTool, ProjectionTool, ToolOutput};

use crate::{
    builder::{MetadataBuilder, TableSet},
    model::SymbolModel,
    rules::{any_violations, check_program, AsyncInterfaceViolation, DiagnosticSink},
    writer::{serialize, write_artifact},
    Result,
};

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GenerationState {
    /// Created, not started
    Idle,
    /// Running the interop rules
    Checking,
    /// Visiting declarations
    Building,
    /// Resolving deferred references and ordering tables
    Finalizing,
    /// Serializing and publishing the artifact
    Writing,
    /// Running the projection tool
    InvokingExternalTool,
    /// Finished successfully
    Done,
    /// Stopped by a violation or an error
    Aborted,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The project did not opt into component authoring
    Disabled,
    /// The rule checker found violations; nothing was generated
    Aborted {
        /// One entry per offending class
        violations: Vec<AsyncInterfaceViolation>,
    },
    /// The artifact was written and the projection sources were collected
    Completed {
        /// Path of the `.winmd` file
        artifact: PathBuf,
        /// Sources to add to the compilation
        sources: Vec<GeneratedSource>,
    },
}

/// Runs the pipeline once for one compilation.
pub struct GenerationDriver<T: ProjectionTool> {
    config: GeneratorConfig,
    log: Option<GenerationLog>,
    tool: T,
    scratch: Option<ScratchDir>,
    history: Vec<GenerationState>,
}

impl<T: ProjectionTool> GenerationDriver<T> {
    /// A driver in the [`GenerationState::Idle`] state.
    pub fn new(config: GeneratorConfig, log: GenerationLog, tool: T) -> Self {
        GenerationDriver {
            config,
            log: Some(log),
            tool,
            scratch: None,
            history: vec![GenerationState::Idle],
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> GenerationState {
        self.history
            .last()
            .copied()
            .unwrap_or(GenerationState::Idle)
    }

    /// Every state entered so far, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[GenerationState] {
        &self.history
    }

    /// The configuration of this run.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The projection tool.
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Runs the pipeline over `model`, reporting diagnostics to `sink`.
    ///
    /// The log is closed when this returns, on every path.
    ///
    /// # Errors
    /// Returns the first error of building, writing or the projection tool, after logging
    /// it. A driver runs once; a second call fails.
    pub fn run<M: SymbolModel + ?Sized>(
        &mut self,
        model: &M,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<GenerationOutcome> {
        if self.state() != GenerationState::Idle {
            return Err(malformed_error!(
                "Generation already ran, driver is {}",
                self.state()
            ));
        }

        let result = self.generate(model, sink);
        if let Err(error) = &result {
            self.enter(GenerationState::Aborted);
            self.log_error(error);
        }

        self.scratch = None;
        if let Some(log) = self.log.take() {
            log.close();
        }
        result
    }

    fn generate<M: SymbolModel + ?Sized>(
        &mut self,
        model: &M,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<GenerationOutcome> {
        self.enter(GenerationState::Checking);
        let violations = check_program(model, sink);
        if any_violations(&violations) {
            self.log_line("Exiting early -- errors in authored runtime component found.");
            self.enter(GenerationState::Aborted);
            return Ok(GenerationOutcome::Aborted { violations });
        }

        let tables = self.build(model)?;

        self.enter(GenerationState::Writing);
        let artifact = self.write(&tables)?;

        self.enter(GenerationState::InvokingExternalTool);
        let sources = self.project(&artifact)?;

        self.log_line("Done");
        self.enter(GenerationState::Done);
        Ok(GenerationOutcome::Completed { artifact, sources })
    }

    fn build<M: SymbolModel + ?Sized>(&mut self, model: &M) -> Result<TableSet> {
        self.enter(GenerationState::Building);
        let options = self.config.artifact_options();
        let mut builder = MetadataBuilder::new(&options.assembly_name, options.assembly_version()?)?;
        for declaration in model.types() {
            builder.visit_type(declaration)?;
        }

        self.enter(GenerationState::Finalizing);
        builder.finalize()
    }

    fn write(&mut self, tables: &TableSet) -> Result<PathBuf> {
        let path = self.config.artifact_path()?;
        fs::create_dir_all(&self.config.generated_files_dir)?;

        self.log_line(format_args!("Writing {}", path.display()));
        write_artifact(&serialize(tables)?, &path)?;
        Ok(path)
    }

    fn project(&mut self, artifact: &Path) -> Result<Vec<GeneratedSource>> {
        let scratch = match self.scratch.take() {
            Some(scratch) => scratch,
            None => {
                let scratch = ScratchDir::create()?;
                self.log_line(format_args!("Created temp folder: {}", scratch.path().display()));
                scratch
            }
        };

        for stale in scratch.clear_sources()? {
            self.log_line(format_args!("Clearing {}", stale.display()));
        }

        let arguments = self.config.tool_arguments(artifact, scratch.path());
        let command_line = arguments
            .iter()
            .map(|argument| argument.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        let running = format!("Running {} {}", self.config.tool_path.display(), command_line);
        self.log_line(running);

        let output = self.tool.run(&self.config.tool_path, &arguments)?;
        self.log_line(&output.stdout);
        self.log_line(&output.stderr);
        output.check()?;

        let sources = scratch.read_sources()?;
        for source in &sources {
            self.log_line(format_args!("Adding {}", source.hint_name));
        }
        scratch.close()?;

        Ok(sources)
    }

    fn enter(&mut self, state: GenerationState) {
        ::log::debug!("Generation: {} -> {}", self.state(), state);
        self.history.push(state);
    }

    fn log_line(&mut self, message: impl std::fmt::Display) {
        if let Some(log) = self.log.as_mut() {
            log.line(message);
        }
    }

    fn log_error(&mut self, error: &crate::Error) {
        self.log_line(error);
        let mut cause = std::error::Error::source(error);
        while let Some(inner) = cause {
            self.log_line(format_args!("Caused by: {inner}"));
            cause = std::error::Error::source(inner);
        }
    }
}

/// Runs generation for a compilation as configured by `properties`.
///
/// Returns [`GenerationOutcome::Disabled`] without touching the file system unless
/// `build_property.CsWinRTComponent` is `true`. Otherwise the log is opened in the
/// generated files directory (or only forwarded to the `log` facade if that directory is
/// not configured) and a [`GenerationDriver`] runs over `model`.
///
/// # Errors
/// Returns any error of [`GenerationDriver::run`], or a failure to create the log file.
pub fn execute<M, T>(
    properties: &BuildProperties,
    model: &M,
    sink: &mut dyn DiagnosticSink,
    tool: T,
) -> Result<GenerationOutcome>
where
    M: SymbolModel + ?Sized,
    T: ProjectionTool,
{
    let Some(config) = GeneratorConfig::from_properties(properties) else {
        ::log::debug!("CsWinRTComponent is not set, skipping generation");
        return Ok(GenerationOutcome::Disabled);
    };

    let log = if config.generated_files_dir.as_os_str().is_empty() {
        GenerationLog::forward_only()
    } else {
        GenerationLog::create(&config.log_path())?
    };

    GenerationDriver::new(config, log, tool).run(model, sink)
}
