//! Conversion run configuration loaded from `mapconv.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::AppError;

/// Configuration for a conversion run loaded from `mapconv.toml`.
///
/// Format tags stay raw strings here; they are validated against the known
/// formats when the config is applied, so an unknown tag fails the run
/// before any source directory is scanned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertConfig {
    /// Mapping sources to aggregate, in declaration order.
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// One `[[source]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the mapping documents.
    pub dir: PathBuf,
    /// Mapping format tag, e.g. `"xml"` or `"annotation"`.
    pub format: String,
}

/// The `[export]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Export format tag, e.g. `"yaml"`.
    #[serde(default)]
    pub format: Option<String>,
    /// Destination directory for rendered documents.
    #[serde(default)]
    pub dest: Option<PathBuf>,
}

impl ConvertConfig {
    /// Load and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<ConvertConfig, AppError> {
        if !path.is_file() {
            return Err(AppError::ConfigMissing(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
