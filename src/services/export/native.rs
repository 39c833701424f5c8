//! Rust source exporter.
//!
//! Emits one module per record with a `metadata()` constructor, the shape the
//! native driver loads through registered providers.

use std::path::PathBuf;

use crate::domain::{AppError, AssociationMetadata, EntityMetadata, FieldMetadata};
use crate::ports::MetadataRenderer;

/// Renders one record as a Rust module exposing `pub fn metadata()`.
pub struct NativeRenderer;

impl MetadataRenderer for NativeRenderer {
    fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError> {
        let mut source = String::new();
        source.push_str(&format!("//! Mapping metadata for `{}`.\n\n", metadata.name()));
        source.push_str(&imports(metadata));
        source.push_str(&format!("/// Builds the mapping record for `{}`.\n", metadata.name()));
        source.push_str("pub fn metadata() -> Result<EntityMetadata, AppError> {\n");
        source.push_str(&format!(
            "    let mut metadata = EntityMetadata::new(EntityName::new({:?})?);\n",
            metadata.name().as_str()
        ));
        if metadata.is_mapped_superclass() {
            source.push_str("    metadata.mark_mapped_superclass();\n");
        }
        if let Some(table) = metadata.table() {
            source.push_str(&format!("    metadata.set_table({table:?});\n"));
        }
        if let Some(repository) = metadata.repository() {
            source.push_str(&format!("    metadata.set_repository({repository:?});\n"));
        }
        for field in metadata.fields() {
            source.push_str(&format!("    metadata.add_field({});\n", field_expr(field)));
        }
        for association in metadata.associations() {
            source.push_str(&format!(
                "    metadata.add_association(\n        {},\n    );\n",
                association_expr(association)
            ));
        }
        source.push_str("    Ok(metadata)\n}\n");
        Ok(source)
    }

    fn relative_path(&self, metadata: &EntityMetadata) -> PathBuf {
        metadata.name().snake_path().with_extension("rs")
    }
}

fn imports(metadata: &EntityMetadata) -> String {
    let mut names = vec!["AppError", "EntityMetadata", "EntityName"];
    if !metadata.fields().is_empty() {
        names.push("FieldMetadata");
        names.push("FieldType");
    }
    if metadata.fields().iter().any(|field| field.generator.is_some()) {
        names.push("IdGenerator");
    }
    if !metadata.associations().is_empty() {
        names.push("AssociationKind");
        names.push("AssociationMetadata");
    }
    names.sort_unstable();
    format!("use mapconv::{{{}}};\n\n", names.join(", "))
}

fn field_expr(field: &FieldMetadata) -> String {
    let mut expr = match (field.id, field.generator) {
        (true, Some(generator)) => format!(
            "FieldMetadata::id({:?}, FieldType::{:?}, IdGenerator::{:?})",
            field.name, field.field_type, generator
        ),
        (true, None) => {
            format!("FieldMetadata::new({:?}, FieldType::{:?}).with_id()", field.name, field.field_type)
        }
        (false, _) => format!("FieldMetadata::new({:?}, FieldType::{:?})", field.name, field.field_type),
    };
    if let Some(column) = &field.column {
        expr.push_str(&format!(".with_column({column:?})"));
    }
    if let Some(length) = field.length {
        expr.push_str(&format!(".with_length({length})"));
    }
    if field.nullable {
        expr.push_str(".nullable()");
    }
    if field.unique {
        expr.push_str(".unique()");
    }
    expr
}

fn association_expr(association: &AssociationMetadata) -> String {
    let mut expr = format!(
        "AssociationMetadata::new({:?}, AssociationKind::{:?}, EntityName::new({:?})?)",
        association.field,
        association.kind,
        association.target.as_str()
    );
    if let Some(mapped_by) = &association.mapped_by {
        expr.push_str(&format!(".with_mapped_by({mapped_by:?})"));
    }
    if let Some(inversed_by) = &association.inversed_by {
        expr.push_str(&format!(".with_inversed_by({inversed_by:?})"));
    }
    if let Some(join_column) = &association.join_column {
        expr.push_str(&format!(".with_join_column({join_column:?})"));
    }
    expr
}
