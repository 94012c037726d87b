//! The per-run log file.
//!
//! Every line is also forwarded to the `log` facade at `info` level, so a host that
//! installs a logger sees the same trace as the file. The file is flushed and closed when
//! the handle is dropped, whichever way the run ends.

use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::Result;

/// Line oriented log of one generation run.
pub struct GenerationLog {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl GenerationLog {
    /// Creates (or truncates) the log file at `path`, creating its directory if needed.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(GenerationLog {
            writer: Some(BufWriter::new(File::create(path)?)),
            path: Some(path.to_path_buf()),
        })
    }

    /// A log that only forwards to the `log` facade.
    #[must_use]
    pub fn forward_only() -> Self {
        GenerationLog {
            writer: None,
            path: None,
        }
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one entry. Multi-line text is written as is.
    ///
    /// A failing write disables the file and is reported once through `log`; it never
    /// fails the run.
    pub fn line(&mut self, message: impl Display) {
        let message = message.to_string();
        info!("{}", message.trim_end());

        if let Some(writer) = self.writer.as_mut() {
            if let Err(error) = writeln!(writer, "{message}") {
                warn!("Disabling generation log: {error}");
                self.writer = None;
            }
        }
    }

    /// Flushes and closes the file.
    pub fn close(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(error) = writer.flush() {
                warn!("Failed to flush generation log: {error}");
            }
        }
    }
}

impl Drop for GenerationLog {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_reach_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("generated").join("log.txt");

        let mut log = GenerationLog::create(&path).unwrap();
        assert_eq!(log.path(), Some(path.as_path()));
        log.line("Writing Contoso.winmd");
        log.line(format_args!("{} + {}", 1, 2));
        log.close();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Writing Contoso.winmd\n1 + 2\n"
        );
    }

    #[test]
    fn drop_flushes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("log.txt");
        {
            let mut log = GenerationLog::create(&path).unwrap();
            log.line("Done");
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "Done\n");
    }

    #[test]
    fn forward_only() {
        let mut log = GenerationLog::forward_only();
        log.line("nowhere");
        assert!(log.path().is_none());
    }
}
