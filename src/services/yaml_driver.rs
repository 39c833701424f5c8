//! YAML mapping driver.
//!
//! Reads documents named `<Name>.entity.yaml` (or `.entity.yml`) whose single
//! top-level key is the entity name:
//!
//! ```yaml
//! crm::Customer:
//!   table: customers
//!   id:
//!     id: { type: bigint, generator: auto }
//!   fields:
//!     email: { type: string, length: 120, unique: true }
//!   many_to_one:
//!     address: { target: crm::Address, join_column: address_id }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::Mapping;

use crate::domain::{
    AppError, AssociationKind, AssociationMetadata, EntityMetadata, EntityName, FieldMetadata,
    FieldType, IdGenerator,
};
use crate::ports::MappingDriver;
use crate::services::source_scan;

pub const YAML_SUFFIXES: &[&str] = &[".entity.yaml", ".entity.yml"];

/// Mapping driver over a directory of `.entity.yaml` documents.
#[derive(Debug, Clone)]
pub struct YamlDriver {
    dir: PathBuf,
}

impl YamlDriver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl MappingDriver for YamlDriver {
    fn preload(&self) -> Result<Vec<EntityName>, AppError> {
        let mut names = Vec::new();
        for path in source_scan::mapping_documents(&self.dir, YAML_SUFFIXES)? {
            if let Some(file_name) = path.file_name().and_then(|n| n.to_str())
                && let Some(stem) = source_scan::mapping_stem(file_name, YAML_SUFFIXES)
            {
                names.push(EntityName::from_file_stem(stem)?);
            }
        }
        Ok(names)
    }

    fn populate(&self, name: &EntityName, metadata: &mut EntityMetadata) -> Result<(), AppError> {
        let path = source_scan::locate_document(&self.dir, &name.file_stem(), YAML_SUFFIXES)
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
    let doc: Mapping =
        serde_yaml::from_str(content).map_err(|err| AppError::parse_error(path, err))?;

    let mut entries = doc.into_iter();
    let (key, body) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(AppError::parse_error(
                path,
                "expected exactly one top-level entity key",
            ));
        }
    };
    let declared = key
        .as_str()
        .ok_or_else(|| AppError::parse_error(path, "top-level entity key must be a string"))?;
    if declared != expected.as_str() {
        return Err(AppError::MappingNameMismatch {
            file: path.display().to_string(),
            declared: declared.to_string(),
            expected: expected.to_string(),
        });
    }

    let entity: dto::EntityDto =
        serde_yaml::from_value(body).map_err(|err| AppError::parse_error(path, err))?;
    apply(path, entity, metadata)
}

fn apply(path: &Path, dto: dto::EntityDto, metadata: &mut EntityMetadata) -> Result<(), AppError> {
    match dto.kind.as_deref() {
        None | Some("entity") => {}
        Some("mapped_superclass") => metadata.mark_mapped_superclass(),
        Some(other) => {
            return Err(AppError::parse_error(path, format!("unknown entity kind '{other}'")));
        }
    }
    if let Some(table) = dto.table {
        metadata.set_table(table);
    }
    if let Some(repository) = dto.repository {
        metadata.set_repository(repository);
    }

    for (name, id) in entries::<dto::IdDto>(path, dto.id)? {
        let field_type = match id.field_type {
            Some(tag) => parse_field_type(path, &tag)?,
            None => FieldType::Integer,
        };
        let mut field = FieldMetadata::new(name, field_type);
        field.id = true;
        field.column = id.column;
        if let Some(tag) = id.generator {
            field.generator = Some(IdGenerator::from_tag(&tag).ok_or_else(|| {
                AppError::parse_error(path, format!("unknown id generator '{tag}'"))
            })?);
        }
        metadata.add_field(field);
    }

    for (name, spec) in entries::<dto::FieldDto>(path, dto.fields)? {
        let field_type = match spec.field_type {
            Some(tag) => parse_field_type(path, &tag)?,
            None => FieldType::String,
        };
        let mut field = FieldMetadata::new(name, field_type);
        field.column = spec.column;
        field.length = spec.length;
        field.nullable = spec.nullable;
        field.unique = spec.unique;
        metadata.add_field(field);
    }

    let sections = [
        (AssociationKind::ManyToOne, dto.many_to_one),
        (AssociationKind::OneToMany, dto.one_to_many),
        (AssociationKind::OneToOne, dto.one_to_one),
        (AssociationKind::ManyToMany, dto.many_to_many),
    ];
    for (kind, section) in sections {
        for (name, spec) in entries::<dto::AssociationDto>(path, section)? {
            let target = EntityName::new(&spec.target)?;
            let mut association = AssociationMetadata::new(name, kind, target);
            association.mapped_by = spec.mapped_by;
            association.inversed_by = spec.inversed_by;
            association.join_column = spec.join_column;
            metadata.add_association(association);
        }
    }
    Ok(())
}

/// Iterate a YAML mapping section as `(name, typed value)` pairs, preserving
/// document order.
fn entries<T: DeserializeOwned>(
    path: &Path,
    section: Option<Mapping>,
) -> Result<Vec<(String, T)>, AppError> {
    let Some(mapping) = section else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| AppError::parse_error(path, "mapping keys must be strings"))?;
        let parsed = serde_yaml::from_value(value)
            .map_err(|err| AppError::parse_error(path, format!("{name}: {err}")))?;
        out.push((name, parsed));
    }
    Ok(out)
}

fn parse_field_type(path: &Path, tag: &str) -> Result<FieldType, AppError> {
    FieldType::from_tag(tag)
        .ok_or_else(|| AppError::parse_error(path, format!("unknown mapping type '{tag}'")))
}

mod dto {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct EntityDto {
        pub kind: Option<String>,
        pub table: Option<String>,
        pub repository: Option<String>,
        pub id: Option<Mapping>,
        pub fields: Option<Mapping>,
        pub many_to_one: Option<Mapping>,
        pub one_to_many: Option<Mapping>,
        pub one_to_one: Option<Mapping>,
        pub many_to_many: Option<Mapping>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct IdDto {
        #[serde(rename = "type")]
        pub field_type: Option<String>,
        pub column: Option<String>,
        pub generator: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct FieldDto {
        #[serde(rename = "type")]
        pub field_type: Option<String>,
        pub column: Option<String>,
        pub length: Option<u32>,
        #[serde(default)]
        pub nullable: bool,
        #[serde(default)]
        pub unique: bool,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct AssociationDto {
        pub target: String,
        pub mapped_by: Option<String>,
        pub inversed_by: Option<String>,
        pub join_column: Option<String>,
    }
}
