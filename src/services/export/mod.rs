//! Metadata exporters.

mod annotation;
mod native;
mod xml;
mod yaml;

pub use annotation::AnnotationRenderer;
pub use native::NativeRenderer;
pub use xml::XmlRenderer;
pub use yaml::YamlRenderer;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, EntityMetadata, ExportFormat};
use crate::ports::MetadataRenderer;

impl ExportFormat {
    /// Renderer implementation for this format.
    pub fn renderer(&self) -> Box<dyn MetadataRenderer> {
        match self {
            ExportFormat::Xml => Box::new(XmlRenderer),
            ExportFormat::Yaml => Box::new(YamlRenderer),
            ExportFormat::Native => Box::new(NativeRenderer),
            ExportFormat::Annotation => Box::new(AnnotationRenderer),
        }
    }
}

/// Writes an aggregated metadata collection out in one target format.
///
/// Holds the records collected at construction time; `export` renders one
/// document per record under the destination directory.
pub struct Exporter {
    format: ExportFormat,
    metadata: Vec<EntityMetadata>,
    dest: Option<PathBuf>,
    renderer: Box<dyn MetadataRenderer>,
}

impl Exporter {
    pub(crate) fn new(
        format: ExportFormat,
        metadata: Vec<EntityMetadata>,
        dest: Option<PathBuf>,
    ) -> Self {
        Self { renderer: format.renderer(), format, metadata, dest }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn metadata(&self) -> &[EntityMetadata] {
        &self.metadata
    }

    pub fn dest(&self) -> Option<&Path> {
        self.dest.as_deref()
    }

    /// Render one record in this exporter's format without writing it.
    pub fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError> {
        self.renderer.render(metadata)
    }

    /// Render every record into the destination directory, creating it as
    /// needed. Returns the written paths in collection order.
    pub fn export(&self) -> Result<Vec<PathBuf>, AppError> {
        let dest = self
            .dest
            .as_ref()
            .ok_or_else(|| AppError::DestinationRequired(self.format.tag().to_string()))?;

        let mut written = Vec::with_capacity(self.metadata.len());
        for metadata in &self.metadata {
            let path = dest.join(self.renderer.relative_path(metadata));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, self.renderer.render(metadata)?)?;
            written.push(path);
        }
        Ok(written)
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("format", &self.format.tag())
            .field("entities", &self.metadata.len())
            .field("dest", &self.dest)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityName, FieldMetadata, FieldType, IdGenerator};

    fn sample(name: &str) -> EntityMetadata {
        let mut metadata = EntityMetadata::new(EntityName::new(name).unwrap());
        metadata.set_table("samples");
        metadata.add_field(FieldMetadata::id("id", FieldType::BigInt, IdGenerator::Auto));
        metadata
    }

    #[test]
    fn export_writes_one_document_per_record() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("out");
        let exporter = Exporter::new(
            ExportFormat::Yaml,
            vec![sample("crm::Customer"), sample("Tag")],
            Some(dest.clone()),
        );

        let written = exporter.export().unwrap();
        assert_eq!(
            written,
            vec![dest.join("crm.Customer.entity.yaml"), dest.join("Tag.entity.yaml")]
        );
        for path in &written {
            assert!(path.is_file());
        }
    }

    #[test]
    fn export_nests_rust_sources_by_namespace() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("out");
        let exporter =
            Exporter::new(ExportFormat::Native, vec![sample("crm::Customer")], Some(dest.clone()));

        let written = exporter.export().unwrap();
        assert_eq!(written, vec![dest.join("crm/customer.rs")]);
        assert!(dest.join("crm").is_dir());
    }

    #[test]
    fn export_without_destination_fails() {
        let exporter = Exporter::new(ExportFormat::Xml, vec![sample("Foo")], None);
        let err = exporter.export().unwrap_err();
        assert!(matches!(err, AppError::DestinationRequired(ref tag) if tag == "xml"));
    }
}
