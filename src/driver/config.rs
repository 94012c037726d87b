//! Build properties and the generator configuration derived from them.
//!
//! The host build passes its MSBuild properties as analyzer-config text:
//!
//! ```text
//! is_global = true
//!
//! [*.cs]
//! build_property.AssemblyName = Contoso
//! build_property.CsWinRTComponent = true
//! ```
//!
//! Section headers and comments are ignored; later assignments to the same key win.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{builder::ArtifactOptions, Error, Result};

/// Prefix of every MSBuild property key.
pub const BUILD_PROPERTY_PREFIX: &str = "build_property.";

/// Platform metadata the projection tool resolves `Windows.*` references against when
/// `CsWinRTWindowsMetadata` is not set.
pub const DEFAULT_WINDOWS_METADATA: &str = "10.0.18362.0";

/// Name of the per-run log file inside the generated files directory.
pub const LOG_FILE_NAME: &str = "log.txt";

/// Key/value properties supplied by the host build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProperties {
    values: BTreeMap<String, String>,
}

impl BuildProperties {
    /// Parses analyzer-config text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use winmdgen::driver::BuildProperties;
    ///
    /// let properties = BuildProperties::parse(
    ///     "# generated\n[*.cs]\nbuild_property.AssemblyName = Contoso\n",
    /// );
    /// assert_eq!(properties.build_property("AssemblyName"), Some("Contoso"));
    /// assert_eq!(properties.build_property("Missing"), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    values.insert(key.to_string(), value.trim().to_string());
                }
            }
        }

        BuildProperties { values }
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file can not be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(BuildProperties::parse(&std::fs::read_to_string(path)?))
    }

    /// Sets `key` to `value`, replacing a previous value.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// The raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The value of `build_property.<name>`.
    #[must_use]
    pub fn build_property(&self, name: &str) -> Option<&str> {
        self.get(&format!("{BUILD_PROPERTY_PREFIX}{name}"))
    }

    /// True when the project opted into component authoring.
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.build_property("CsWinRTComponent")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no property was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything one generation run needs to know about the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// `AssemblyName`, also the artifact file name
    pub assembly_name: String,
    /// `AssemblyVersion`, parsed when tables are built
    pub assembly_version: String,
    /// `GeneratedFilesDir`, receives the artifact and the log
    pub generated_files_dir: PathBuf,
    /// `CsWinRTExe`, the projection tool
    pub tool_path: PathBuf,
    /// `CsWinRTWindowsMetadata`, the platform metadata reference
    pub windows_metadata: String,
}

impl GeneratorConfig {
    /// Reads the configuration, or `None` if the project is not a runtime component.
    ///
    /// Missing properties are carried as empty values and fail where they are first used.
    #[must_use]
    pub fn from_properties(properties: &BuildProperties) -> Option<Self> {
        if !properties.is_component() {
            return None;
        }

        let property = |name: &str| properties.build_property(name).unwrap_or_default().to_string();
        let windows_metadata = match properties.build_property("CsWinRTWindowsMetadata") {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => DEFAULT_WINDOWS_METADATA.to_string(),
        };

        Some(GeneratorConfig {
            assembly_name: property("AssemblyName"),
            assembly_version: property("AssemblyVersion"),
            generated_files_dir: PathBuf::from(property("GeneratedFilesDir")),
            tool_path: PathBuf::from(property("CsWinRTExe")),
            windows_metadata,
        })
    }

    /// Identity of the artifact.
    #[must_use]
    pub fn artifact_options(&self) -> ArtifactOptions {
        ArtifactOptions::new(&self.assembly_name, &self.assembly_version)
    }

    /// `<GeneratedFilesDir>/<AssemblyName>.winmd`.
    ///
    /// # Errors
    /// Returns [`Error::MissingProperty`] if either property is empty.
    pub fn artifact_path(&self) -> Result<PathBuf> {
        if self.assembly_name.is_empty() {
            return Err(Error::MissingProperty("AssemblyName"));
        }
        if self.generated_files_dir.as_os_str().is_empty() {
            return Err(Error::MissingProperty("GeneratedFilesDir"));
        }

        Ok(self
            .generated_files_dir
            .join(format!("{}.winmd", self.assembly_name)))
    }

    /// The log file of a run.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.generated_files_dir.join(LOG_FILE_NAME)
    }

    /// Arguments of the projection tool for `artifact`, writing into `output`.
    #[must_use]
    pub fn tool_arguments(&self, artifact: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-component".into(),
            "-input".into(),
            artifact.as_os_str().to_os_string(),
            "-input".into(),
            self.windows_metadata.clone().into(),
            "-include".into(),
            self.assembly_name.clone().into(),
            "-output".into(),
            output.as_os_str().to_os_string(),
            "-verbose".into(),
        ]
    }
}
