//! The scratch directory the projection tool writes its sources into.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;
use tempfile::TempDir;

use crate::Result;

/// Extension of the sources the projection tool produces.
const SOURCE_EXTENSION: &str = "cs";

/// A source file to add to the compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    /// Unique name of the source within the compilation, the file stem
    pub hint_name: String,
    /// File contents
    pub text: String,
}

/// A temporary directory, removed with everything in it when dropped.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Creates a fresh directory under the system temporary directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the directory can not be created.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("winmdgen").tempdir()?;
        debug!("Created scratch directory {}", dir.path().display());
        Ok(ScratchDir { dir })
    }

    /// Creates a fresh directory inside `parent`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the directory can not be created.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("winmdgen").tempdir_in(parent)?;
        Ok(ScratchDir { dir })
    }

    /// The directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Top level source files, sorted by path.
    fn sources(&self) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for entry in fs::read_dir(self.dir.path())? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == SOURCE_EXTENSION) {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }

    /// Deletes the sources left by an earlier run, returning their paths.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if a file can not be removed.
    pub fn clear_sources(&self) -> Result<Vec<PathBuf>> {
        let sources = self.sources()?;
        for source in &sources {
            fs::remove_file(source)?;
        }
        Ok(sources)
    }

    /// Reads every top level source back, sorted by path.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if a file can not be read.
    pub fn read_sources(&self) -> Result<Vec<GeneratedSource>> {
        self.sources()?
            .into_iter()
            .map(|path| {
                let hint_name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(GeneratedSource {
                    hint_name,
                    text: fs::read_to_string(&path)?,
                })
            })
            .collect()
    }

    /// Removes the directory now, reporting failures.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the directory can not be removed.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_then_read() {
        let scratch = ScratchDir::create().unwrap();
        fs::write(scratch.path().join("Stale.cs"), "old").unwrap();
        fs::write(scratch.path().join("notes.txt"), "keep").unwrap();

        let cleared = scratch.clear_sources().unwrap();
        assert_eq!(cleared, [scratch.path().join("Stale.cs")]);
        assert!(scratch.path().join("notes.txt").exists());

        fs::write(scratch.path().join("WinRT.cs"), "b").unwrap();
        fs::write(scratch.path().join("Contoso.cs"), "a").unwrap();
        fs::create_dir(scratch.path().join("nested.cs")).unwrap();

        let sources = scratch.read_sources().unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.hint_name.as_str()).collect();
        assert_eq!(names, ["Contoso", "WinRT"]);
        assert_eq!(sources[0].text, "a");
    }

    #[test]
    fn removed_on_close() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create_in(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();
        fs::write(path.join("A.cs"), "a").unwrap();

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn removed_on_drop() {
        let path = {
            let scratch = ScratchDir::create().unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
