use std::{fmt, str::FromStr};

use crate::{Error, Result};

/// A four part assembly version, `major.minor.build.revision`.
///
/// Parsing accepts one to four dot-separated parts; missing parts are 0 and an empty
/// string is `0.0.0.0`.
///
/// ```rust
/// use winmdgen::builder::AssemblyVersion;
///
/// let version: AssemblyVersion = "1.2".parse()?;
/// assert_eq!(version, AssemblyVersion::new(1, 2, 0, 0));
/// assert_eq!(version.to_string(), "1.2.0.0");
/// assert!("1.2.3.4.5".parse::<AssemblyVersion>().is_err());
/// # Ok::<(), winmdgen::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its parts.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses `text`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidVersion`] for more than four parts or a part that is not a
    /// 16-bit unsigned number.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(AssemblyVersion::default());
        }

        let mut parts = [0u16; 4];
        let mut count = 0;
        for part in text.split('.') {
            let slot = parts
                .get_mut(count)
                .ok_or_else(|| Error::InvalidVersion(text.to_string()))?;
            *slot = part
                .trim()
                .parse()
                .map_err(|_| Error::InvalidVersion(text.to_string()))?;
            count += 1;
        }

        Ok(AssemblyVersion::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        AssemblyVersion::parse(text)
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(AssemblyVersion::parse("").unwrap(), AssemblyVersion::default());
        assert_eq!(AssemblyVersion::parse("3").unwrap(), AssemblyVersion::new(3, 0, 0, 0));
        assert_eq!(
            AssemblyVersion::parse("1.0.65535.7").unwrap(),
            AssemblyVersion::new(1, 0, 65535, 7)
        );
    }

    #[test]
    fn parse_failures() {
        for text in ["1.x", "1..2", "65536", "1.2.3.4.5", "-1"] {
            match AssemblyVersion::parse(text) {
                Err(Error::InvalidVersion(value)) => assert_eq!(value, text),
                other => panic!("{text}: unexpected {:?}", other),
            }
        }
    }
}
