//! XML mapping driver.
//!
//! Reads `<entity-mapping>` documents named `<Name>.entity.xml`, where
//! `<Name>` is the entity name with `::` encoded as `.`
//! (`crm.Customer.entity.xml` declares `crm::Customer`).

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::domain::{
    AppError, AssociationKind, AssociationMetadata, EntityMetadata, EntityName, FieldMetadata,
    FieldType, IdGenerator,
};
use crate::ports::MappingDriver;
use crate::services::source_scan;

pub const XML_SUFFIXES: &[&str] = &[".entity.xml"];

/// Mapping driver over a directory of `.entity.xml` documents.
#[derive(Debug, Clone)]
pub struct XmlDriver {
    dir: PathBuf,
}

impl XmlDriver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl MappingDriver for XmlDriver {
    fn preload(&self) -> Result<Vec<EntityName>, AppError> {
        let mut names = Vec::new();
        for path in source_scan::mapping_documents(&self.dir, XML_SUFFIXES)? {
            if let Some(file_name) = path.file_name().and_then(|n| n.to_str())
                && let Some(stem) = source_scan::mapping_stem(file_name, XML_SUFFIXES)
            {
                names.push(EntityName::from_file_stem(stem)?);
            }
        }
        Ok(names)
    }

    fn populate(&self, name: &EntityName, metadata: &mut EntityMetadata) -> Result<(), AppError> {
        let path = source_scan::locate_document(&self.dir, &name.file_stem(), XML_SUFFIXES)
            .ok_or_else(|| AppError::DocumentMissing {
                name: name.to_string(),
                dir: self.dir.display().to_string(),
            })?;
        let content = fs::read_to_string(&path)?;
        parse_document(&path, &content, name, metadata)
    }
}

fn parse_document(
    path: &Path,
    content: &str,
    expected: &EntityName,
    metadata: &mut EntityMetadata,
) -> Result<(), AppError> {
    let mut reader = Reader::from_str(content);
    let mut declared = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let element = local_name(e);
                match element.as_str() {
                    "entity-mapping" => {}
                    "entity" | "mapped-superclass" => {
                        if declared {
                            return Err(AppError::parse_error(
                                path,
                                "more than one entity declaration in one document",
                            ));
                        }
                        declared = true;
                        read_declaration(path, e, &element, expected, metadata)?;
                    }
                    "id" => {
                        require_declared(path, declared, &element)?;
                        metadata.add_field(read_id(path, e)?);
                    }
                    "field" => {
                        require_declared(path, declared, &element)?;
                        metadata.add_field(read_field(path, e)?);
                    }
                    "many-to-one" | "one-to-many" | "one-to-one" | "many-to-many" => {
                        require_declared(path, declared, &element)?;
                        metadata.add_association(read_association(path, e, &element)?);
                    }
                    // Unknown elements are skipped so documents can carry
                    // vendor extensions.
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(AppError::parse_error(path, err)),
            _ => {}
        }
    }

    if !declared {
        return Err(AppError::parse_error(
            path,
            "expected an <entity> or <mapped-superclass> declaration",
        ));
    }
    Ok(())
}

fn read_declaration(
    path: &Path,
    e: &BytesStart,
    element: &str,
    expected: &EntityName,
    metadata: &mut EntityMetadata,
) -> Result<(), AppError> {
    let declared = require_attr(path, e, element, "name")?;
    if declared != expected.as_str() {
        return Err(AppError::MappingNameMismatch {
            file: path.display().to_string(),
            declared,
            expected: expected.to_string(),
        });
    }
    if element == "mapped-superclass" {
        metadata.mark_mapped_superclass();
    }
    if let Some(table) = attr(path, e, "table")? {
        metadata.set_table(table);
    }
    if let Some(repository) = attr(path, e, "repository")? {
        metadata.set_repository(repository);
    }
    Ok(())
}

fn read_id(path: &Path, e: &BytesStart) -> Result<FieldMetadata, AppError> {
    let name = require_attr(path, e, "id", "name")?;
    let field_type = match attr(path, e, "type")? {
        Some(tag) => parse_field_type(path, &tag)?,
        None => FieldType::Integer,
    };
    let mut field = FieldMetadata::new(name, field_type);
    field.id = true;
    field.column = attr(path, e, "column")?;
    if let Some(tag) = attr(path, e, "generator")? {
        field.generator = Some(IdGenerator::from_tag(&tag).ok_or_else(|| {
            AppError::parse_error(path, format!("unknown id generator '{tag}'"))
        })?);
    }
    Ok(field)
}

fn read_field(path: &Path, e: &BytesStart) -> Result<FieldMetadata, AppError> {
    let name = require_attr(path, e, "field", "name")?;
    let field_type = match attr(path, e, "type")? {
        Some(tag) => parse_field_type(path, &tag)?,
        None => FieldType::String,
    };
    let mut field = FieldMetadata::new(name, field_type);
    field.column = attr(path, e, "column")?;
    if let Some(raw) = attr(path, e, "length")? {
        field.length = Some(raw.parse().map_err(|_| {
            AppError::parse_error(path, format!("invalid length '{raw}': expected an integer"))
        })?);
    }
    field.nullable = flag(path, e, "nullable")?;
    field.unique = flag(path, e, "unique")?;
    Ok(field)
}

fn read_association(
    path: &Path,
    e: &BytesStart,
    element: &str,
) -> Result<AssociationMetadata, AppError> {
    let kind = match element {
        "many-to-one" => AssociationKind::ManyToOne,
        "one-to-many" => AssociationKind::OneToMany,
        "one-to-one" => AssociationKind::OneToOne,
        _ => AssociationKind::ManyToMany,
    };
    let field = require_attr(path, e, element, "field")?;
    let target = EntityName::new(&require_attr(path, e, element, "target")?)?;

    let mut association = AssociationMetadata::new(field, kind, target);
    association.mapped_by = attr(path, e, "mapped-by")?;
    association.inversed_by = attr(path, e, "inversed-by")?;
    association.join_column = attr(path, e, "join-column")?;
    Ok(association)
}

fn require_declared(path: &Path, declared: bool, element: &str) -> Result<(), AppError> {
    if declared {
        Ok(())
    } else {
        Err(AppError::parse_error(path, format!("<{element}> appears outside an entity declaration")))
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr(path: &Path, e: &BytesStart, key: &str) -> Result<Option<String>, AppError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| AppError::parse_error(path, err))?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(|err| AppError::parse_error(path, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn require_attr(path: &Path, e: &BytesStart, element: &str, key: &str) -> Result<String, AppError> {
    attr(path, e, key)?.ok_or_else(|| {
        AppError::parse_error(path, format!("<{element}> is missing required attribute '{key}'"))
    })
}

fn flag(path: &Path, e: &BytesStart, key: &str) -> Result<bool, AppError> {
    match attr(path, e, key)?.as_deref() {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(AppError::parse_error(
            path,
            format!("invalid boolean '{other}' for attribute '{key}'"),
        )),
    }
}

fn parse_field_type(path: &Path, tag: &str) -> Result<FieldType, AppError> {
    FieldType::from_tag(tag)
        .ok_or_else(|| AppError::parse_error(path, format!("unknown mapping type '{tag}'")))
}
