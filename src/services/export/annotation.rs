//! Annotated-struct exporter.
//!
//! Emits Rust struct declarations carrying the mapping attributes the
//! annotation driver reads. Column types that the driver could not recover
//! from the Rust field type alone are spelled out explicitly.

use std::path::PathBuf;

use crate::domain::{
    AppError, AssociationKind, AssociationMetadata, EntityMetadata, FieldMetadata, FieldType,
};
use crate::ports::MetadataRenderer;

/// Renders one record as an annotated struct declaration.
pub struct AnnotationRenderer;

impl MetadataRenderer for AnnotationRenderer {
    fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError> {
        let mut source = String::new();
        source.push_str(&format!("//! `{}` mapping.\n\n", metadata.name()));
        source.push_str("#[derive(Debug, Clone)]\n");
        source.push_str(&declaration_attr(metadata));

        let short = metadata.name().short_name();
        if metadata.fields().is_empty() && metadata.associations().is_empty() {
            source.push_str(&format!("pub struct {short};\n"));
            return Ok(source);
        }

        source.push_str(&format!("pub struct {short} {{\n"));
        for field in metadata.fields() {
            push_field(&mut source, field);
        }
        for association in metadata.associations() {
            push_association(&mut source, association);
        }
        source.push_str("}\n");
        Ok(source)
    }

    fn relative_path(&self, metadata: &EntityMetadata) -> PathBuf {
        metadata.name().snake_path().with_extension("rs")
    }
}

fn declaration_attr(metadata: &EntityMetadata) -> String {
    if metadata.is_mapped_superclass() {
        return "#[mapped_superclass]\n".to_string();
    }
    let mut args = Vec::new();
    if let Some(table) = metadata.table() {
        args.push(format!("table = {table:?}"));
    }
    if let Some(repository) = metadata.repository() {
        args.push(format!("repository = {repository:?}"));
    }
    if args.is_empty() {
        "#[entity]\n".to_string()
    } else {
        format!("#[entity({})]\n", args.join(", "))
    }
}

fn push_field(source: &mut String, field: &FieldMetadata) {
    let mut column_args = Vec::new();
    if let Some(column) = &field.column {
        column_args.push(format!("name = {column:?}"));
    }
    if needs_explicit_type(field.field_type) {
        column_args.push(format!("type = {:?}", field.field_type.tag()));
    }
    if let Some(length) = field.length {
        column_args.push(format!("length = {length}"));
    }
    if field.unique {
        column_args.push("unique".to_string());
    }

    if field.id {
        source.push_str("    #[id]\n");
        if let Some(generator) = field.generator {
            source.push_str(&format!("    #[generated({})]\n", generator.tag()));
        }
        if !column_args.is_empty() {
            source.push_str(&format!("    #[column({})]\n", column_args.join(", ")));
        }
    } else if column_args.is_empty() {
        source.push_str("    #[column]\n");
    } else {
        source.push_str(&format!("    #[column({})]\n", column_args.join(", ")));
    }

    let mut rust_type = field.field_type.rust_type().to_string();
    if field.nullable {
        rust_type = format!("Option<{rust_type}>");
    }
    source.push_str(&format!("    pub {}: {rust_type},\n", field.name));
}

fn push_association(source: &mut String, association: &AssociationMetadata) {
    let mut args = vec![format!("target = {:?}", association.target.as_str())];
    if let Some(mapped_by) = &association.mapped_by {
        args.push(format!("mapped_by = {mapped_by:?}"));
    }
    if let Some(inversed_by) = &association.inversed_by {
        args.push(format!("inversed_by = {inversed_by:?}"));
    }
    if let Some(join_column) = &association.join_column {
        args.push(format!("join_column = {join_column:?}"));
    }
    source.push_str(&format!(
        "    #[{}({})]\n",
        association.kind.tag(),
        args.join(", ")
    ));

    let short = association.target.short_name().to_string();
    let rust_type = match association.kind {
        AssociationKind::ManyToOne | AssociationKind::OneToOne => short,
        AssociationKind::OneToMany | AssociationKind::ManyToMany => format!("Vec<{short}>"),
    };
    source.push_str(&format!("    pub {}: {rust_type},\n", association.field));
}

/// Whether reading the emitted Rust type back would lose the column type.
fn needs_explicit_type(field_type: FieldType) -> bool {
    match FieldType::from_rust_type(field_type.rust_type()) {
        Some((recovered, _)) => recovered != field_type,
        None => true,
    }
}
