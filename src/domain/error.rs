use std::io;

use thiserror::Error;

/// Library-wide error type for mapconv operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Mapping format tag is not in the recognized set.
    #[error("Unsupported mapping format '{0}': expected annotation, xml, yaml, yml, or native")]
    UnsupportedMappingFormat(String),

    /// Export format tag is not in the recognized set.
    #[error("Unsupported export format '{0}': expected xml, yaml, yml, native, or annotation")]
    UnsupportedExportFormat(String),

    /// Entity name fails segment validation.
    #[error(
        "Invalid entity name '{0}': segments must start with a letter or '_' and contain only alphanumerics or '_', separated by '::'"
    )]
    InvalidEntityName(String),

    /// Mapping file could not be parsed.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// Mapping file declares a different entity than its filename encodes.
    #[error("Mapping file {file} declares '{declared}' but is named for '{expected}'")]
    MappingNameMismatch { file: String, declared: String, expected: String },

    /// A preloaded entity has no mapping document in its source directory.
    #[error("No mapping document found for entity '{name}' in {dir}")]
    DocumentMissing { name: String, dir: String },

    /// Rendered output could not be produced.
    #[error("Failed to render {what}: {details}")]
    RenderError { what: String, details: String },

    /// Exporter was asked to write files without a destination directory.
    #[error("Export destination is required for {0} export")]
    DestinationRequired(String),

    /// Conversion was requested with no mapping sources registered.
    #[error("No mapping sources registered. Pass --source <format>:<dir> or add [[source]] entries to mapconv.toml")]
    NoSources,

    /// Config file missing (mapconv.toml).
    #[error("Config file not found: {0}")]
    ConfigMissing(String),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl AppError {
    pub(crate) fn parse_error(path: &std::path::Path, details: impl ToString) -> Self {
        AppError::ParseError { what: path.display().to_string(), details: details.to_string() }
    }
}
