//! YAML exporter.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::domain::{
    AppError, AssociationKind, AssociationMetadata, EntityMetadata, FieldMetadata,
};
use crate::ports::MetadataRenderer;

/// Renders one record as a single-document YAML mapping keyed by entity name.
pub struct YamlRenderer;

impl MetadataRenderer for YamlRenderer {
    fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError> {
        let mut body = Mapping::new();
        if metadata.is_mapped_superclass() {
            body.insert("kind".into(), "mapped_superclass".into());
        }
        if let Some(table) = metadata.table() {
            body.insert("table".into(), table.into());
        }
        if let Some(repository) = metadata.repository() {
            body.insert("repository".into(), repository.into());
        }

        let ids = field_section(metadata.fields().iter().filter(|field| field.id));
        if !ids.is_empty() {
            body.insert("id".into(), Value::Mapping(ids));
        }
        let fields = field_section(metadata.fields().iter().filter(|field| !field.id));
        if !fields.is_empty() {
            body.insert("fields".into(), Value::Mapping(fields));
        }

        for kind in AssociationKind::ALL {
            let section = association_section(metadata.associations(), kind);
            if !section.is_empty() {
                body.insert(kind.tag().into(), Value::Mapping(section));
            }
        }

        let mut document = Mapping::new();
        document.insert(metadata.name().as_str().into(), Value::Mapping(body));
        serde_yaml::to_string(&document).map_err(|err| AppError::RenderError {
            what: metadata.name().to_string(),
            details: err.to_string(),
        })
    }

    fn relative_path(&self, metadata: &EntityMetadata) -> PathBuf {
        PathBuf::from(format!("{}.entity.yaml", metadata.name().file_stem()))
    }
}

fn field_section<'a>(fields: impl Iterator<Item = &'a FieldMetadata>) -> Mapping {
    let mut section = Mapping::new();
    for field in fields {
        let mut entry = Mapping::new();
        entry.insert("type".into(), field.field_type.tag().into());
        if let Some(column) = &field.column {
            entry.insert("column".into(), column.as_str().into());
        }
        if field.id {
            if let Some(generator) = field.generator {
                entry.insert("generator".into(), generator.tag().into());
            }
        } else {
            if let Some(length) = field.length {
                entry.insert("length".into(), length.into());
            }
            if field.nullable {
                entry.insert("nullable".into(), true.into());
            }
            if field.unique {
                entry.insert("unique".into(), true.into());
            }
        }
        section.insert(field.name.as_str().into(), Value::Mapping(entry));
    }
    section
}

fn association_section(associations: &[AssociationMetadata], kind: AssociationKind) -> Mapping {
    let mut section = Mapping::new();
    for association in associations.iter().filter(|association| association.kind == kind) {
        let mut entry = Mapping::new();
        entry.insert("target".into(), association.target.as_str().into());
        if let Some(mapped_by) = &association.mapped_by {
            entry.insert("mapped_by".into(), mapped_by.as_str().into());
        }
        if let Some(inversed_by) = &association.inversed_by {
            entry.insert("inversed_by".into(), inversed_by.as_str().into());
        }
        if let Some(join_column) = &association.join_column {
            entry.insert("join_column".into(), join_column.as_str().into());
        }
        section.insert(association.field.as_str().into(), Value::Mapping(entry));
    }
    section
}
