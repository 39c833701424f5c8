//! Metadata aggregation across mapping sources.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, EntityMetadata, EntityName, ExportFormat, MappingFormat};
use crate::ports::MappingDriver;
use crate::services::annotation_driver::AnnotationDriver;
use crate::services::export::Exporter;
use crate::services::native_registry::NativeModuleRegistry;
use crate::services::source_scan;
use crate::services::xml_driver::XmlDriver;
use crate::services::yaml_driver::YamlDriver;

/// One registered mapping source.
///
/// Non-native sources carry their driver from registration time; native
/// sources are read file-by-file through the provider registry instead.
pub enum MappingSource {
    Native { dir: PathBuf },
    Annotation { dir: PathBuf, driver: AnnotationDriver },
    File { dir: PathBuf, format: MappingFormat, driver: Box<dyn MappingDriver> },
}

impl MappingSource {
    pub fn dir(&self) -> &Path {
        match self {
            MappingSource::Native { dir }
            | MappingSource::Annotation { dir, .. }
            | MappingSource::File { dir, .. } => dir,
        }
    }

    pub fn format(&self) -> MappingFormat {
        match self {
            MappingSource::Native { .. } => MappingFormat::Native,
            MappingSource::Annotation { .. } => MappingFormat::Annotation,
            MappingSource::File { format, .. } => *format,
        }
    }
}

impl fmt::Debug for MappingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingSource")
            .field("dir", &self.dir())
            .field("format", &self.format().tag())
            .finish()
    }
}

/// Aggregates entity metadata from registered mapping sources and hands the
/// collected records to exporters.
///
/// Sources are scanned in registration order on every collection call;
/// nothing is cached between calls. Collection and export must not be
/// interleaved from multiple threads over one aggregator.
#[derive(Debug, Default)]
pub struct MetadataAggregator {
    sources: Vec<MappingSource>,
    native_modules: NativeModuleRegistry,
}

impl MetadataAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping source with a statically known format. The driver
    /// for the format is resolved here, not at collection time.
    pub fn add_source(&mut self, dir: impl Into<PathBuf>, format: MappingFormat) {
        let dir = dir.into();
        let source = match format {
            MappingFormat::Native => MappingSource::Native { dir },
            MappingFormat::Annotation => {
                MappingSource::Annotation { driver: AnnotationDriver::new(dir.clone()), dir }
            }
            MappingFormat::Xml => MappingSource::File {
                driver: Box::new(XmlDriver::new(dir.clone())),
                dir,
                format,
            },
            MappingFormat::Yaml => MappingSource::File {
                driver: Box::new(YamlDriver::new(dir.clone())),
                dir,
                format,
            },
        };
        self.sources.push(source);
    }

    /// Register a mapping source from a runtime format tag. An unknown tag
    /// fails without mutating the source list.
    pub fn add_source_by_tag(&mut self, dir: impl Into<PathBuf>, tag: &str) -> Result<(), AppError> {
        let format = MappingFormat::from_tag(tag)
            .ok_or_else(|| AppError::UnsupportedMappingFormat(tag.to_string()))?;
        self.add_source(dir, format);
        Ok(())
    }

    pub fn sources(&self) -> &[MappingSource] {
        &self.sources
    }

    /// Register the provider for a native mapping module, keyed by module
    /// path relative to its source directory.
    pub fn register_native_module<F>(&mut self, module: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<Vec<EntityMetadata>, AppError> + Send + Sync + 'static,
    {
        self.native_modules.register(module, provider);
    }

    /// Scan every registered source and return the aggregated records.
    ///
    /// When two sources declare the same entity name, the later record
    /// replaces the earlier one while keeping the earlier position. Mapped
    /// superclass records are dropped in a final pass. Driver and I/O errors
    /// abort the whole collection and propagate unchanged.
    pub fn collect(&self) -> Result<Vec<EntityMetadata>, AppError> {
        let mut collection = Collection::new();
        for source in &self.sources {
            match source {
                MappingSource::Native { dir } => self.collect_native(dir, &mut collection)?,
                MappingSource::Annotation { driver, .. } => {
                    Self::collect_annotation(driver, &mut collection)?;
                }
                MappingSource::File { driver, .. } => {
                    Self::collect_file(driver.as_ref(), &mut collection)?;
                }
            }
        }
        Ok(collection.into_entities())
    }

    /// Collect all records and wrap them in an exporter for `format`.
    /// Runs exactly one full scan.
    pub fn exporter(
        &self,
        format: ExportFormat,
        dest: Option<PathBuf>,
    ) -> Result<Exporter, AppError> {
        Ok(Exporter::new(format, self.collect()?, dest))
    }

    /// Tag-dispatched variant of [`Self::exporter`]. The tag is validated
    /// before any source is scanned.
    pub fn exporter_by_tag(&self, tag: &str, dest: Option<PathBuf>) -> Result<Exporter, AppError> {
        let format = ExportFormat::from_tag(tag)
            .ok_or_else(|| AppError::UnsupportedExportFormat(tag.to_string()))?;
        self.exporter(format, dest)
    }

    fn collect_native(&self, dir: &Path, collection: &mut Collection) -> Result<(), AppError> {
        for file in source_scan::rust_sources(dir)? {
            let Some(module) = NativeModuleRegistry::module_path(dir, &file) else {
                continue;
            };
            if let Some(provider) = self.native_modules.provider(&module) {
                for metadata in provider()? {
                    collection.insert(metadata);
                }
            }
        }
        Ok(())
    }

    fn collect_annotation(
        driver: &AnnotationDriver,
        collection: &mut Collection,
    ) -> Result<(), AppError> {
        for decl in driver.declared_types()? {
            if driver.is_transient(&decl) {
                continue;
            }
            let mut metadata = EntityMetadata::new(decl.name.clone());
            driver.populate(&decl, &mut metadata)?;
            collection.insert(metadata);
        }
        Ok(())
    }

    fn collect_file(
        driver: &dyn MappingDriver,
        collection: &mut Collection,
    ) -> Result<(), AppError> {
        for name in driver.preload()? {
            let mut metadata = EntityMetadata::new(name.clone());
            driver.populate(&name, &mut metadata)?;
            collection.insert(metadata);
        }
        Ok(())
    }
}

/// Ordered, name-keyed record collection. Inserting an existing name
/// replaces the record in place, keeping its original position.
struct Collection {
    entities: Vec<EntityMetadata>,
    index: HashMap<EntityName, usize>,
}

impl Collection {
    fn new() -> Self {
        Self { entities: Vec::new(), index: HashMap::new() }
    }

    fn insert(&mut self, metadata: EntityMetadata) {
        match self.index.get(metadata.name()) {
            Some(&at) => self.entities[at] = metadata,
            None => {
                self.index.insert(metadata.name().clone(), self.entities.len());
                self.entities.push(metadata);
            }
        }
    }

    /// Drop mapped superclass records and return the rest in order.
    fn into_entities(self) -> Vec<EntityMetadata> {
        self.entities.into_iter().filter(|e| !e.is_mapped_superclass()).collect()
    }
}
