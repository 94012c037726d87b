//! Memory-mapped artifact output with atomic publication.
//!
//! The artifact is written into a temporary file next to the target, mapped into memory,
//! flushed and only then renamed over the target. Readers of the target path never see
//! a partially written artifact, and an [`Output`] dropped before
//! [`Output::finalize`] removes its temporary file.

use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// A memory-mapped temporary file that becomes `target_path` on finalization.
pub struct Output {
    /// The memory mapping of the temporary file
    mmap: MmapMut,

    /// The temporary file; deleted on drop unless persisted
    file: NamedTempFile,

    /// The final destination
    target_path: PathBuf,
}

impl Output {
    /// Creates a temporary file of `size` bytes in the directory of `target_path`.
    ///
    /// # Errors
    /// Returns [`Error::WriteFailed`] if the file can not be created, sized or mapped.
    pub fn create<P: AsRef<Path>>(target_path: P, size: u64) -> Result<Self> {
        let target_path = target_path.as_ref().to_path_buf();
        let directory = match target_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let file = tempfile::Builder::new()
            .prefix(".winmdgen")
            .suffix(".tmp")
            .tempfile_in(&directory)
            .map_err(|e| Error::WriteFailed {
                message: format!("Failed to create temporary file in {}: {e}", directory.display()),
            })?;

        file.as_file().set_len(size).map_err(|e| Error::WriteFailed {
            message: format!("Failed to set file size: {e}"),
        })?;

        // The temporary file is private to this process until it is persisted
        let mmap = unsafe {
            MmapOptions::new()
                .map_mut(file.as_file())
                .map_err(|e| Error::WriteFailed {
                    message: format!("Failed to create memory mapping: {e}"),
                })?
        };

        Ok(Self {
            mmap,
            file,
            target_path,
        })
    }

    /// Writes `data` at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::WriteFailed`] if the write would exceed the file size.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::WriteFailed {
            message: format!("Offset {offset} does not fit the address space"),
        })?;
        let end = start + data.len();

        if end > self.mmap.len() {
            return Err(Error::WriteFailed {
                message: format!(
                    "Write would exceed file size: offset={}, len={}, file_size={}",
                    offset,
                    data.len(),
                    self.mmap.len()
                ),
            });
        }

        self.mmap[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Total size of the file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// The final destination.
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Flushes the mapping and atomically renames the temporary file over the target.
    ///
    /// # Errors
    /// Returns [`Error::WriteFailed`] if flushing or renaming fails; the temporary file
    /// is removed in that case.
    pub fn finalize(self) -> Result<()> {
        self.mmap.flush().map_err(|e| Error::WriteFailed {
            message: format!("Failed to flush memory mapping: {e}"),
        })?;
        drop(self.mmap);

        self.file
            .persist(&self.target_path)
            .map_err(|e| Error::WriteFailed {
                message: format!("Failed to publish {}: {}", self.target_path.display(), e.error),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn leftovers(directory: &Path) -> usize {
        std::fs::read_dir(directory)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(".winmdgen")
            })
            .count()
    }

    #[test]
    fn finalize_publishes() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("Contoso.winmd");

        let mut output = Output::create(&target, 8).unwrap();
        assert_eq!(output.size(), 8);
        assert!(!target.exists());

        output.write_at(0, b"MZ").unwrap();
        output.write_at(6, &[1, 2]).unwrap();
        output.finalize().unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), [b'M', b'Z', 0, 0, 0, 0, 1, 2]);
        assert_eq!(leftovers(temp_dir.path()), 0);
    }

    #[test]
    fn drop_removes_temporary() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("Contoso.winmd");
        std::fs::write(&target, b"old").unwrap();

        {
            let mut output = Output::create(&target, 4).unwrap();
            output.write_at(0, b"new!").unwrap();
            assert_eq!(leftovers(temp_dir.path()), 1);
        }

        assert_eq!(leftovers(temp_dir.path()), 0);
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn write_out_of_bounds() {
        let temp_dir = tempdir().unwrap();
        let mut output = Output::create(temp_dir.path().join("x.winmd"), 4).unwrap();
        assert!(matches!(
            output.write_at(2, &[0; 4]),
            Err(Error::WriteFailed { .. })
        ));
    }
}
