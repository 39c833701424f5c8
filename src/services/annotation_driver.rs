//! Attribute mapping driver.
//!
//! Scans a Rust source tree for structs carrying mapping attributes:
//!
//! ```text
//! #[entity(table = "customers", repository = "crm::CustomerRepository")]
//! pub struct Customer {
//!     #[id]
//!     #[generated(auto)]
//!     pub id: i64,
//!     #[column(length = 120, unique)]
//!     pub email: String,
//!     #[many_to_one(target = "crm::Address", join_column = "address_id")]
//!     pub address: Address,
//! }
//! ```
//!
//! The entity name is the struct name qualified by the directory path under
//! the source root (`crm/customer.rs` declaring `Customer` is
//! `crm::Customer`); `name = "..."` on `#[entity]` or `#[mapped_superclass]`
//! overrides the derived name. Structs without an `entity` or
//! `mapped_superclass` attribute are transient and skipped. The scanner is line oriented:
//! attributes and field declarations are expected one per line, the layout
//! rustfmt produces.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{
    AppError, AssociationKind, AssociationMetadata, EntityMetadata, EntityName, FieldMetadata,
    FieldType, IdGenerator,
};
use crate::services::source_scan;

const STRUCT_ATTRS: &[&str] = &["entity", "mapped_superclass"];
const FIELD_ATTRS: &[&str] =
    &["id", "generated", "column", "many_to_one", "one_to_many", "one_to_one", "many_to_many"];

/// Mapping driver over a Rust source tree of attribute-annotated structs.
#[derive(Debug, Clone)]
pub struct AnnotationDriver {
    dir: PathBuf,
    reader: AttributeReader,
}

/// One struct declaration found during a scan, with its parsed attributes.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: EntityName,
    file: PathBuf,
    attrs: Vec<Attribute>,
    fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
struct FieldDecl {
    name: String,
    rust_type: String,
    attrs: Vec<Attribute>,
}

#[derive(Debug, Clone)]
struct Attribute {
    name: String,
    args: Vec<AttrArg>,
}

#[derive(Debug, Clone)]
struct AttrArg {
    key: String,
    /// `None` for bare flags like `unique` or `auto`.
    value: Option<String>,
}

impl Attribute {
    fn value_of(&self, key: &str) -> Option<&str> {
        self.args.iter().find(|a| a.key == key).and_then(|a| a.value.as_deref())
    }

    fn has_flag(&self, key: &str) -> bool {
        self.args.iter().any(|a| a.key == key && a.value.is_none())
    }

    fn bare_arg(&self) -> Option<&str> {
        self.args.iter().find(|a| a.value.is_none()).map(|a| a.key.as_str())
    }
}

impl AnnotationDriver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, reader: AttributeReader::new() }
    }

    pub fn with_reader(dir: PathBuf, reader: AttributeReader) -> Self {
        Self { dir, reader }
    }

    /// All struct declarations in the source tree, in scan order, whether
    /// mapped or transient.
    pub fn declared_types(&self) -> Result<Vec<TypeDecl>, AppError> {
        let mut types = Vec::new();
        for path in source_scan::rust_sources(&self.dir)? {
            let content = fs::read_to_string(&path)?;
            let namespace = self.namespace_of(&path);
            parse_source(&path, &content, &namespace, &self.reader, &mut types)?;
        }
        Ok(types)
    }

    /// Whether `decl` carries no mapping declaration and should be skipped.
    pub fn is_transient(&self, decl: &TypeDecl) -> bool {
        !decl.attrs.iter().any(|a| STRUCT_ATTRS.contains(&a.name.as_str()))
    }

    /// Read the mapping attributes of `decl` into `metadata`.
    pub fn populate(
        &self,
        decl: &TypeDecl,
        metadata: &mut EntityMetadata,
    ) -> Result<(), AppError> {
        for attr in &decl.attrs {
            match attr.name.as_str() {
                "entity" => {
                    check_keys(&decl.file, attr, &["name", "table", "repository"])?;
                    if let Some(table) = attr.value_of("table") {
                        metadata.set_table(table);
                    }
                    if let Some(repository) = attr.value_of("repository") {
                        metadata.set_repository(repository);
                    }
                }
                "mapped_superclass" => {
                    check_keys(&decl.file, attr, &["name"])?;
                    metadata.mark_mapped_superclass();
                }
                other => {
                    return Err(AppError::parse_error(
                        &decl.file,
                        format!("#[{other}] is not valid on struct '{}'", decl.name),
                    ));
                }
            }
        }

        for field in &decl.fields {
            read_field(&decl.file, field, metadata)?;
        }
        Ok(())
    }

    fn namespace_of(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.dir).unwrap_or(path);
        let Some(parent) = rel.parent() else {
            return String::new();
        };
        parent
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// Parses mapping attributes out of `#[...]` lines.
///
/// Attributes may be written bare (`#[entity]`) or qualified with the
/// reader's namespace (`#[orm::entity]`). Everything else, derives included,
/// is ignored.
#[derive(Debug, Clone)]
pub struct AttributeReader {
    namespace: String,
}

impl AttributeReader {
    pub fn new() -> Self {
        Self::with_namespace("orm")
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    /// Parse one attribute line. Returns `None` for attributes outside the
    /// mapping vocabulary.
    fn parse(&self, path: &Path, line: &str) -> Result<Option<Attribute>, AppError> {
        let Some(inner) = line.strip_prefix("#[") else {
            return Ok(None);
        };
        let name_end = inner.find(['(', ']']).unwrap_or(inner.len());
        let raw_name = inner[..name_end].trim();
        let prefix = format!("{}::", self.namespace);
        let name = raw_name.strip_prefix(&prefix).unwrap_or(raw_name);
        if !STRUCT_ATTRS.contains(&name) && !FIELD_ATTRS.contains(&name) {
            return Ok(None);
        }

        let args = if inner[name_end..].starts_with('(') {
            let close = inner.rfind(')').ok_or_else(|| {
                AppError::parse_error(
                    path,
                    format!("#[{name}] must be closed on a single line"),
                )
            })?;
            parse_args(&inner[name_end + 1..close])
        } else {
            Vec::new()
        };
        Ok(Some(Attribute { name: name.to_string(), args }))
    }
}

impl Default for AttributeReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_source(
    path: &Path,
    content: &str,
    namespace: &str,
    reader: &AttributeReader,
    out: &mut Vec<TypeDecl>,
) -> Result<(), AppError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut pending: Vec<Attribute> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.starts_with("#[") {
            if let Some(attr) = reader.parse(path, line)? {
                pending.push(attr);
            }
            i += 1;
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            i += 1;
            continue;
        }
        if let Some(struct_name) = struct_name_of(line) {
            let attrs = std::mem::take(&mut pending);
            let mut fields = Vec::new();
            if !line.ends_with(';') {
                i = parse_fields(path, &lines, i, reader, &mut fields)?;
            }
            let name = match declared_name(&attrs) {
                Some(raw) => EntityName::new(raw)?,
                None if namespace.is_empty() => EntityName::new(&struct_name)?,
                None => EntityName::new(&format!("{namespace}::{struct_name}"))?,
            };
            out.push(TypeDecl { name, file: path.to_path_buf(), attrs, fields });
            i += 1;
            continue;
        }
        // Any other item ends the attribute run.
        pending.clear();
        i += 1;
    }
    Ok(())
}

/// Consume a struct body starting at the declaration line. Returns the index
/// of the line holding the closing brace.
fn parse_fields(
    path: &Path,
    lines: &[&str],
    start: usize,
    reader: &AttributeReader,
    fields: &mut Vec<FieldDecl>,
) -> Result<usize, AppError> {
    let mut depth = brace_delta(lines[start]);
    if depth == 0 {
        // `struct Foo {}` closes on the declaration line.
        if lines[start].contains('{') {
            return Ok(start);
        }
        return Err(AppError::parse_error(
            path,
            "expected '{' on the struct declaration line",
        ));
    }

    let mut pending: Vec<Attribute> = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        let line = lines[i].trim();
        let delta = brace_delta(lines[i]);
        if depth + delta <= 0 {
            return Ok(i);
        }
        depth += delta;

        if line.starts_with("#[") {
            if let Some(attr) = reader.parse(path, line)? {
                pending.push(attr);
            }
        } else if let Some((name, rust_type)) = field_decl_of(line) {
            fields.push(FieldDecl { name, rust_type, attrs: std::mem::take(&mut pending) });
        } else if !line.is_empty() && !line.starts_with("//") {
            pending.clear();
        }
        i += 1;
    }
    Err(AppError::parse_error(path, "unterminated struct body"))
}

fn read_field(
    path: &Path,
    field: &FieldDecl,
    metadata: &mut EntityMetadata,
) -> Result<(), AppError> {
    let mut is_id = false;
    let mut generator: Option<IdGenerator> = None;
    let mut column: Option<&Attribute> = None;
    let mut association: Option<&Attribute> = None;

    for attr in &field.attrs {
        match attr.name.as_str() {
            "id" => {
                if !attr.args.is_empty() {
                    return Err(AppError::parse_error(
                        path,
                        format!("#[id] on field '{}' takes no arguments", field.name),
                    ));
                }
                is_id = true;
            }
            "generated" => {
                let strategy = attr.bare_arg().ok_or_else(|| {
                    AppError::parse_error(
                        path,
                        format!("#[generated] on field '{}' needs a strategy", field.name),
                    )
                })?;
                generator = Some(IdGenerator::from_tag(strategy).ok_or_else(|| {
                    AppError::parse_error(
                        path,
                        format!("unknown id generation strategy '{strategy}'"),
                    )
                })?);
            }
            "column" => column = Some(attr),
            "many_to_one" | "one_to_many" | "one_to_one" | "many_to_many" => {
                if association.is_some() {
                    return Err(AppError::parse_error(
                        path,
                        format!("field '{}' has more than one association attribute", field.name),
                    ));
                }
                association = Some(attr);
            }
            other => {
                return Err(AppError::parse_error(
                    path,
                    format!("#[{other}] is not valid on field '{}'", field.name),
                ));
            }
        }
    }

    if let Some(attr) = association {
        if is_id || generator.is_some() || column.is_some() {
            return Err(AppError::parse_error(
                path,
                format!("association field '{}' cannot carry column attributes", field.name),
            ));
        }
        metadata.add_association(read_association(path, field, attr)?);
        return Ok(());
    }

    if !is_id && generator.is_none() && column.is_none() {
        // Unannotated fields are not persisted.
        return Ok(());
    }
    if generator.is_some() && !is_id {
        return Err(AppError::parse_error(
            path,
            format!("#[generated] on field '{}' requires #[id]", field.name),
        ));
    }

    let inferred = FieldType::from_rust_type(&field.rust_type);
    let explicit = match column.and_then(|attr| attr.value_of("type")) {
        Some(tag) => Some(FieldType::from_tag(tag).ok_or_else(|| {
            AppError::parse_error(path, format!("unknown mapping type '{tag}'"))
        })?),
        None => None,
    };
    let field_type = match explicit.or(inferred.map(|(ty, _)| ty)) {
        Some(ty) => ty,
        None => {
            return Err(AppError::parse_error(
                path,
                format!(
                    "cannot infer a mapping type for field '{}' of type '{}'; add type = \"...\"",
                    field.name, field.rust_type
                ),
            ));
        }
    };

    let mut meta = FieldMetadata::new(field.name.clone(), field_type);
    meta.id = is_id;
    meta.generator = generator;
    meta.nullable = field.rust_type.trim().starts_with("Option<");
    if let Some(attr) = column {
        check_keys(path, attr, &["name", "type", "length", "nullable", "unique"])?;
        meta.column = attr.value_of("name").map(str::to_owned);
        if let Some(raw) = attr.value_of("length") {
            meta.length = Some(raw.parse().map_err(|_| {
                AppError::parse_error(
                    path,
                    format!("invalid length '{raw}' on field '{}'", field.name),
                )
            })?);
        }
        meta.nullable |= attr.has_flag("nullable");
        meta.unique = attr.has_flag("unique");
    }
    metadata.add_field(meta);
    Ok(())
}

fn read_association(
    path: &Path,
    field: &FieldDecl,
    attr: &Attribute,
) -> Result<AssociationMetadata, AppError> {
    check_keys(path, attr, &["target", "mapped_by", "inversed_by", "join_column"])?;
    // Attribute names already use the association tags.
    let kind = AssociationKind::from_tag(&attr.name).ok_or_else(|| {
        AppError::parse_error(path, format!("unknown association '{}'", attr.name))
    })?;
    let target = attr.value_of("target").ok_or_else(|| {
        AppError::parse_error(
            path,
            format!("association field '{}' needs target = \"...\"", field.name),
        )
    })?;

    let mut association =
        AssociationMetadata::new(field.name.clone(), kind, EntityName::new(target)?);
    association.mapped_by = attr.value_of("mapped_by").map(str::to_owned);
    association.inversed_by = attr.value_of("inversed_by").map(str::to_owned);
    association.join_column = attr.value_of("join_column").map(str::to_owned);
    Ok(association)
}

/// The `name = "..."` override carried by a mapping attribute, if any.
fn declared_name(attrs: &[Attribute]) -> Option<&str> {
    attrs
        .iter()
        .find(|a| STRUCT_ATTRS.contains(&a.name.as_str()))
        .and_then(|a| a.value_of("name"))
}

fn check_keys(path: &Path, attr: &Attribute, allowed: &[&str]) -> Result<(), AppError> {
    for arg in &attr.args {
        if !allowed.contains(&arg.key.as_str()) {
            return Err(AppError::parse_error(
                path,
                format!("unknown key '{}' in #[{}]", arg.key, attr.name),
            ));
        }
    }
    Ok(())
}

fn parse_args(raw: &str) -> Vec<AttrArg> {
    let mut args = Vec::new();
    for part in split_args(raw) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((key, value)) => {
                let value = value.trim();
                let value =
                    value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
                args.push(AttrArg { key: key.trim().to_string(), value: Some(value.to_string()) });
            }
            None => args.push(AttrArg { key: part.to_string(), value: None }),
        }
    }
    args
}

/// Split attribute arguments on commas outside string literals.
fn split_args(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn struct_name_of(line: &str) -> Option<String> {
    let rest = line
        .strip_prefix("pub struct ")
        .or_else(|| line.strip_prefix("pub(crate) struct "))
        .or_else(|| line.strip_prefix("struct "))?;
    let name: String =
        rest.chars().take_while(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    if name.is_empty() { None } else { Some(name) }
}

fn field_decl_of(line: &str) -> Option<(String, String)> {
    let line = line.strip_suffix(',').unwrap_or(line);
    let (name_part, type_part) = line.split_once(':')?;
    let name = name_part.trim().rsplit(' ').next()?.to_string();
    if !is_ident(&name) {
        return None;
    }
    let rust_type = type_part.trim().to_string();
    if rust_type.is_empty() {
        return None;
    }
    Some((name, rust_type))
}

fn is_ident(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    for ch in line.chars() {
        match ch {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}
