//! API facade for the application.
//!
//! High-level entry points used by both the CLI and library callers. Sources
//! and export settings given explicitly win over the config file; the config
//! file is only read when something is left to resolve.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{AppError, ConvertConfig, EntityMetadata, ExportFormat, SourceConfig};
use crate::services::MetadataAggregator;

/// Config file consulted when sources or export settings are not given.
pub const DEFAULT_CONFIG_FILE: &str = "mapconv.toml";

/// Inputs for a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Mapping sources in registration order. Falls back to the config
    /// file's `[[source]]` entries when empty.
    pub sources: Vec<SourceConfig>,
    /// Export format tag. Falls back to `[export] format`.
    pub to: Option<String>,
    /// Destination directory. Falls back to `[export] dest`.
    pub dest: Option<PathBuf>,
    /// Explicit config file path; `mapconv.toml` in the working directory
    /// otherwise.
    pub config: Option<PathBuf>,
}

/// Outcome of a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Collected entity names in collection order.
    pub entities: Vec<String>,
    /// The format the records were rendered in.
    pub format: ExportFormat,
    /// Written files in collection order.
    pub written: Vec<PathBuf>,
}

/// Inputs for a listing run.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Mapping sources in registration order; config file fallback as for
    /// [`ConvertOptions`].
    pub sources: Vec<SourceConfig>,
    pub config: Option<PathBuf>,
}

/// One collected entity, reduced to listing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub table: Option<String>,
    pub fields: usize,
    pub associations: usize,
}

impl From<&EntityMetadata> for EntitySummary {
    fn from(metadata: &EntityMetadata) -> Self {
        Self {
            name: metadata.name().to_string(),
            table: metadata.table().map(str::to_string),
            fields: metadata.fields().len(),
            associations: metadata.associations().len(),
        }
    }
}

/// Collect metadata from the resolved sources and write it out in the
/// resolved target format.
pub fn convert(options: ConvertOptions) -> Result<ConvertReport, AppError> {
    let ConvertOptions { sources, to, dest, config } = options;

    let needs_fallback = sources.is_empty() || to.is_none() || dest.is_none();
    let fallback = if config.is_some() || needs_fallback {
        fallback_config(config.as_deref())?
    } else {
        ConvertConfig::default()
    };

    let sources = if sources.is_empty() { fallback.sources } else { sources };
    let to = to.or(fallback.export.format).ok_or_else(|| {
        AppError::Configuration(
            "No export format given. Pass --to <format> or set [export] format in mapconv.toml"
                .to_string(),
        )
    })?;
    let dest = dest.or(fallback.export.dest);

    let aggregator = build_aggregator(sources)?;
    let exporter = aggregator.exporter_by_tag(&to, dest)?;
    let entities = exporter.metadata().iter().map(|m| m.name().to_string()).collect();
    let written = exporter.export()?;
    Ok(ConvertReport { entities, format: exporter.format(), written })
}

/// Collect metadata from the resolved sources and summarize each entity.
pub fn inspect(options: InspectOptions) -> Result<Vec<EntitySummary>, AppError> {
    let InspectOptions { sources, config } = options;

    let fallback = if config.is_some() || sources.is_empty() {
        fallback_config(config.as_deref())?
    } else {
        ConvertConfig::default()
    };
    let sources = if sources.is_empty() { fallback.sources } else { sources };

    let aggregator = build_aggregator(sources)?;
    let entities = aggregator.collect()?;
    Ok(entities.iter().map(EntitySummary::from).collect())
}

/// An explicit config path must exist; the default path is optional.
fn fallback_config(path: Option<&Path>) -> Result<ConvertConfig, AppError> {
    match path {
        Some(path) => ConvertConfig::load(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                ConvertConfig::load(default)
            } else {
                Ok(ConvertConfig::default())
            }
        }
    }
}

fn build_aggregator(sources: Vec<SourceConfig>) -> Result<MetadataAggregator, AppError> {
    if sources.is_empty() {
        return Err(AppError::NoSources);
    }
    let mut aggregator = MetadataAggregator::new();
    for source in sources {
        aggregator.add_source_by_tag(source.dir, &source.format)?;
    }
    Ok(aggregator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FOO_XML: &str = r#"<entity-mapping>
  <entity name="Foo" table="foos">
    <id name="id" type="bigint" generator="auto"/>
    <field name="label" type="string" length="50"/>
  </entity>
</entity-mapping>
"#;

    fn xml_source(temp: &tempfile::TempDir) -> SourceConfig {
        let dir = temp.path().join("xml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Foo.entity.xml"), FOO_XML).unwrap();
        SourceConfig { dir, format: "xml".to_string() }
    }

    #[test]
    fn convert_writes_rendered_documents() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("out");
        let options = ConvertOptions {
            sources: vec![xml_source(&temp)],
            to: Some("yaml".to_string()),
            dest: Some(dest.clone()),
            config: None,
        };

        let report = convert(options).unwrap();
        assert_eq!(report.entities, vec!["Foo"]);
        assert_eq!(report.format, ExportFormat::Yaml);
        assert_eq!(report.written, vec![dest.join("Foo.entity.yaml")]);
        assert!(dest.join("Foo.entity.yaml").is_file());
    }

    #[test]
    fn convert_falls_back_to_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let source = xml_source(&temp);
        let dest = temp.path().join("converted");
        let config_path = temp.path().join("mapconv.toml");
        fs::write(
            &config_path,
            format!(
                "[[source]]\ndir = {:?}\nformat = \"xml\"\n\n[export]\nformat = \"native\"\ndest = {:?}\n",
                source.dir, dest
            ),
        )
        .unwrap();

        let report =
            convert(ConvertOptions { config: Some(config_path), ..Default::default() }).unwrap();
        assert_eq!(report.format, ExportFormat::Native);
        assert_eq!(report.written, vec![dest.join("foo.rs")]);
    }

    #[test]
    fn explicit_flags_win_over_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let source = xml_source(&temp);
        let dest = temp.path().join("flag_dest");
        let config_path = temp.path().join("mapconv.toml");
        fs::write(&config_path, "[export]\nformat = \"native\"\n").unwrap();

        let report = convert(ConvertOptions {
            sources: vec![source],
            to: Some("xml".to_string()),
            dest: Some(dest.clone()),
            config: Some(config_path),
        })
        .unwrap();
        assert_eq!(report.format, ExportFormat::Xml);
        assert_eq!(report.written, vec![dest.join("Foo.entity.xml")]);
    }

    #[test]
    fn convert_without_sources_anywhere_fails() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("mapconv.toml");
        fs::write(&config_path, "[export]\nformat = \"yaml\"\n").unwrap();

        let err = convert(ConvertOptions {
            to: Some("yaml".to_string()),
            dest: Some(temp.path().join("out")),
            config: Some(config_path),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::NoSources));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let temp = tempfile::tempdir().unwrap();
        let err = convert(ConvertOptions {
            sources: vec![xml_source(&temp)],
            dest: Some(temp.path().join("out")),
            config: Some(temp.path().join("nonexistent.toml")),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(_)));
    }

    #[test]
    fn convert_without_target_format_fails() {
        let temp = tempfile::tempdir().unwrap();
        let err = convert(ConvertOptions {
            sources: vec![xml_source(&temp)],
            dest: Some(temp.path().join("out")),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn unknown_source_tag_fails_before_scanning() {
        let err = convert(ConvertOptions {
            sources: vec![SourceConfig {
                dir: PathBuf::from("/definitely/not/here"),
                format: "protobuf".to_string(),
            }],
            to: Some("yaml".to_string()),
            dest: Some(PathBuf::from("/tmp/out")),
            config: None,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMappingFormat(ref tag) if tag == "protobuf"));
    }

    #[test]
    fn inspect_summarizes_collected_entities() {
        let temp = tempfile::tempdir().unwrap();
        let options = InspectOptions { sources: vec![xml_source(&temp)], config: None };

        let summaries = inspect(options).unwrap();
        assert_eq!(
            summaries,
            vec![EntitySummary {
                name: "Foo".to_string(),
                table: Some("foos".to_string()),
                fields: 2,
                associations: 0,
            }]
        );
    }
}
