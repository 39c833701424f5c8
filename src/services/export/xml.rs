//! XML exporter.

use std::path::PathBuf;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::domain::{AppError, AssociationMetadata, EntityMetadata, FieldMetadata};
use crate::ports::MetadataRenderer;

/// Renders one record as an `<entity-mapping>` document.
pub struct XmlRenderer;

impl MetadataRenderer for XmlRenderer {
    fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|err| render_err(metadata, err))?;
        writer
            .write_event(Event::Start(BytesStart::new("entity-mapping")))
            .map_err(|err| render_err(metadata, err))?;

        let element = if metadata.is_mapped_superclass() { "mapped-superclass" } else { "entity" };
        let mut declaration = BytesStart::new(element);
        declaration.push_attribute(("name", metadata.name().as_str()));
        if let Some(table) = metadata.table() {
            declaration.push_attribute(("table", table));
        }
        if let Some(repository) = metadata.repository() {
            declaration.push_attribute(("repository", repository));
        }
        writer
            .write_event(Event::Start(declaration))
            .map_err(|err| render_err(metadata, err))?;

        for field in metadata.fields() {
            writer
                .write_event(Event::Empty(field_element(field)))
                .map_err(|err| render_err(metadata, err))?;
        }
        for association in metadata.associations() {
            writer
                .write_event(Event::Empty(association_element(association)))
                .map_err(|err| render_err(metadata, err))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(element)))
            .map_err(|err| render_err(metadata, err))?;
        writer
            .write_event(Event::End(BytesEnd::new("entity-mapping")))
            .map_err(|err| render_err(metadata, err))?;

        let mut document = String::from_utf8(writer.into_inner())
            .map_err(|err| render_err(metadata, err))?;
        document.push('\n');
        Ok(document)
    }

    fn relative_path(&self, metadata: &EntityMetadata) -> PathBuf {
        PathBuf::from(format!("{}.entity.xml", metadata.name().file_stem()))
    }
}

fn render_err(metadata: &EntityMetadata, err: impl ToString) -> AppError {
    AppError::RenderError { what: metadata.name().to_string(), details: err.to_string() }
}

fn field_element(field: &FieldMetadata) -> BytesStart<'static> {
    let mut element = BytesStart::new(if field.id { "id" } else { "field" });
    element.push_attribute(("name", field.name.as_str()));
    element.push_attribute(("type", field.field_type.tag()));
    if let Some(column) = &field.column {
        element.push_attribute(("column", column.as_str()));
    }
    if field.id {
        if let Some(generator) = field.generator {
            element.push_attribute(("generator", generator.tag()));
        }
        return element;
    }
    if let Some(length) = field.length {
        element.push_attribute(("length", length.to_string().as_str()));
    }
    if field.nullable {
        element.push_attribute(("nullable", "true"));
    }
    if field.unique {
        element.push_attribute(("unique", "true"));
    }
    element
}

fn association_element(association: &AssociationMetadata) -> BytesStart<'static> {
    let mut element = BytesStart::new(association.kind.tag().replace('_', "-"));
    element.push_attribute(("field", association.field.as_str()));
    element.push_attribute(("target", association.target.as_str()));
    if let Some(mapped_by) = &association.mapped_by {
        element.push_attribute(("mapped-by", mapped_by.as_str()));
    }
    if let Some(inversed_by) = &association.inversed_by {
        element.push_attribute(("inversed-by", inversed_by.as_str()));
    }
    if let Some(join_column) = &association.join_column {
        element.push_attribute(("join-column", join_column.as_str()));
    }
    element
}
