//! The external projection tool.
//!
//! After the artifact is written, `cswinrt` reads it back and produces the C# sources of
//! the component's projection. [`ProjectionTool`] is the seam the driver calls through;
//! [`CsWinRtTool`] runs the real executable.

use std::{
    ffi::OsString,
    path::Path,
    process::{Command, ExitStatus},
};

use log::debug;

use crate::{Error, Result};

/// What a finished tool process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    /// Output of a process that exited with code 0.
    #[must_use]
    pub fn success(stdout: &str) -> Self {
        ToolOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn from_status(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        ToolOutput {
            code: status.code(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// Fails unless the process exited with code 0.
    ///
    /// # Errors
    /// Returns [`Error::ExternalTool`] for any other exit.
    pub fn check(&self) -> Result<()> {
        match self.code {
            Some(0) => Ok(()),
            Some(code) => Err(Error::ExternalTool {
                message: format!("exited with code {code}"),
            }),
            None => Err(Error::ExternalTool {
                message: "terminated by a signal".to_string(),
            }),
        }
    }
}

/// Runs a projection tool to completion.
pub trait ProjectionTool {
    /// Runs `program` with `arguments` and waits for it to exit.
    ///
    /// Implementations must drain both output streams before inspecting the exit status.
    ///
    /// # Errors
    /// Returns [`Error::ExternalTool`] if the process can not be started.
    fn run(&mut self, program: &Path, arguments: &[OsString]) -> Result<ToolOutput>;
}

/// The `cswinrt` executable, started as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsWinRtTool;

impl ProjectionTool for CsWinRtTool {
    fn run(&mut self, program: &Path, arguments: &[OsString]) -> Result<ToolOutput> {
        if program.as_os_str().is_empty() {
            return Err(Error::ExternalTool {
                message: "no tool path configured (CsWinRTExe)".to_string(),
            });
        }

        debug!("Starting {}", program.display());
        let output = Command::new(program)
            .args(arguments)
            .output()
            .map_err(|e| Error::ExternalTool {
                message: format!("failed to start {}: {e}", program.display()),
            })?;

        Ok(ToolOutput::from_status(output.status, &output.stdout, &output.stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_exit_codes() {
        assert!(ToolOutput::success("ok").check().is_ok());

        let failed = ToolOutput {
            code: Some(2),
            stdout: String::new(),
            stderr: "error".to_string(),
        };
        assert!(matches!(failed.check(), Err(Error::ExternalTool { .. })));

        let killed = ToolOutput {
            code: None,
            ..failed
        };
        assert!(matches!(killed.check(), Err(Error::ExternalTool { .. })));
    }

    #[test]
    fn empty_program() {
        let result = CsWinRtTool.run(Path::new(""), &[]);
        assert!(matches!(result, Err(Error::ExternalTool { .. })));
    }

    #[test]
    fn missing_program() {
        let result = CsWinRtTool.run(Path::new("/nonexistent/winmdgen/cswinrt"), &["-verbose".into()]);
        assert!(matches!(result, Err(Error::ExternalTool { .. })));
    }
}
