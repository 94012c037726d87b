//! Where the bytes of a [`super::WinmdFile`] live.

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error::OutOfBounds, Result};

/// The image bytes: a buffer that was handed over, or a read-only mapping of a file.
#[derive(Debug)]
pub(crate) enum Source {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Source {
    /// Maps the file at `path`.
    pub fn map(path: &Path) -> Result<Source> {
        let file = fs::File::open(path)?;
        // Read-only, and the artifact is not modified while it is being inspected
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(Source::Mapped(mmap))
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Source::Owned(data) => data,
            Source::Mapped(mmap) => mmap,
        }
    }

    /// `len` bytes at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(OutOfBounds)?;
        self.bytes().get(offset..end).ok_or(OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_bounds() {
        let mut data = vec![0xCC_u8; 64];
        data[10..15].fill(0xBB);
        let source = Source::Owned(data);

        assert_eq!(source.slice(10, 5).unwrap(), &[0xBB; 5]);
        assert!(source.slice(60, 5).is_err());
        assert!(source.slice(usize::MAX, 2).is_err());
        assert!(source.slice(64, 0).unwrap().is_empty());
    }

    #[test]
    fn mapped_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("image.bin");
        fs::write(&path, b"MZ\x90\x00").unwrap();

        let source = Source::map(&path).unwrap();
        assert_eq!(source.bytes(), b"MZ\x90\x00");
        assert_eq!(source.slice(0, 2).unwrap(), b"MZ");
        assert!(Source::map(&temp_dir.path().join("missing")).is_err());
    }
}
