//! Typed entity metadata model shared by all mapping drivers and exporters.

use std::fmt;

use super::EntityName;

/// Mapping type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Text,
    Integer,
    BigInt,
    Boolean,
    Float,
    DateTime,
    Date,
    Binary,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Integer,
        FieldType::BigInt,
        FieldType::Boolean,
        FieldType::Float,
        FieldType::DateTime,
        FieldType::Date,
        FieldType::Binary,
    ];

    /// Canonical tag used in mapping documents.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::BigInt => "bigint",
            FieldType::Boolean => "boolean",
            FieldType::Float => "float",
            FieldType::DateTime => "datetime",
            FieldType::Date => "date",
            FieldType::Binary => "binary",
        }
    }

    pub fn from_tag(tag: &str) -> Option<FieldType> {
        match tag.to_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "text" => Some(FieldType::Text),
            "integer" | "int" => Some(FieldType::Integer),
            "bigint" => Some(FieldType::BigInt),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "float" => Some(FieldType::Float),
            "datetime" => Some(FieldType::DateTime),
            "date" => Some(FieldType::Date),
            "binary" => Some(FieldType::Binary),
            _ => None,
        }
    }

    /// Rust type emitted for this mapping type in generated struct fields.
    pub fn rust_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Text => "String",
            FieldType::Integer => "i32",
            FieldType::BigInt => "i64",
            FieldType::Boolean => "bool",
            FieldType::Float => "f64",
            FieldType::DateTime | FieldType::Date => "String",
            FieldType::Binary => "Vec<u8>",
        }
    }

    /// Infer a mapping type from a Rust field type. Returns the type and
    /// whether it was wrapped in `Option` (nullable). `None` means the Rust
    /// type has no mapping equivalent and the field needs an explicit
    /// `type = "..."` attribute.
    pub fn from_rust_type(raw: &str) -> Option<(FieldType, bool)> {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed.strip_prefix("Option<").and_then(|s| s.strip_suffix('>')) {
            return FieldType::from_rust_type(inner).map(|(ty, _)| (ty, true));
        }
        let ty = match trimmed {
            "String" => FieldType::String,
            "i8" | "i16" | "i32" => FieldType::Integer,
            "i64" | "isize" => FieldType::BigInt,
            "bool" => FieldType::Boolean,
            "f32" | "f64" => FieldType::Float,
            "Vec<u8>" => FieldType::Binary,
            _ => return None,
        };
        Some((ty, false))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Identifier generation strategy for an id field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdGenerator {
    Auto,
    Sequence,
    Identity,
    None,
}

impl IdGenerator {
    pub fn tag(&self) -> &'static str {
        match self {
            IdGenerator::Auto => "auto",
            IdGenerator::Sequence => "sequence",
            IdGenerator::Identity => "identity",
            IdGenerator::None => "none",
        }
    }

    pub fn from_tag(tag: &str) -> Option<IdGenerator> {
        match tag.to_lowercase().as_str() {
            "auto" => Some(IdGenerator::Auto),
            "sequence" => Some(IdGenerator::Sequence),
            "identity" => Some(IdGenerator::Identity),
            "none" => Some(IdGenerator::None),
            _ => None,
        }
    }
}

/// One persisted field of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMetadata {
    pub name: String,
    /// Column name override; drivers leave `None` when the column matches
    /// the field name.
    pub column: Option<String>,
    pub field_type: FieldType,
    pub length: Option<u32>,
    pub nullable: bool,
    pub unique: bool,
    pub id: bool,
    /// Only meaningful on id fields.
    pub generator: Option<IdGenerator>,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            column: None,
            field_type,
            length: None,
            nullable: false,
            unique: false,
            id: false,
            generator: None,
        }
    }

    /// Shorthand for an identifier field.
    pub fn id(name: impl Into<String>, field_type: FieldType, generator: IdGenerator) -> Self {
        let mut field = FieldMetadata::new(name, field_type);
        field.id = true;
        field.generator = Some(generator);
        field
    }

    /// Mark the field as part of the identifier without a generator strategy.
    pub fn with_id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Relationship cardinality between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 4] = [
        AssociationKind::ManyToOne,
        AssociationKind::OneToMany,
        AssociationKind::OneToOne,
        AssociationKind::ManyToMany,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            AssociationKind::ManyToOne => "many_to_one",
            AssociationKind::OneToMany => "one_to_many",
            AssociationKind::OneToOne => "one_to_one",
            AssociationKind::ManyToMany => "many_to_many",
        }
    }

    pub fn from_tag(tag: &str) -> Option<AssociationKind> {
        match tag.to_lowercase().as_str() {
            "many_to_one" => Some(AssociationKind::ManyToOne),
            "one_to_many" => Some(AssociationKind::OneToMany),
            "one_to_one" => Some(AssociationKind::OneToOne),
            "many_to_many" => Some(AssociationKind::ManyToMany),
            _ => None,
        }
    }
}

/// One association field of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationMetadata {
    pub field: String,
    pub kind: AssociationKind,
    pub target: EntityName,
    /// Field on the target side that owns the association.
    pub mapped_by: Option<String>,
    /// Field on the target side that mirrors this owning association.
    pub inversed_by: Option<String>,
    pub join_column: Option<String>,
}

impl AssociationMetadata {
    pub fn new(field: impl Into<String>, kind: AssociationKind, target: EntityName) -> Self {
        Self {
            field: field.into(),
            kind,
            target,
            mapped_by: None,
            inversed_by: None,
            join_column: None,
        }
    }

    pub fn with_mapped_by(mut self, field: impl Into<String>) -> Self {
        self.mapped_by = Some(field.into());
        self
    }

    pub fn with_inversed_by(mut self, field: impl Into<String>) -> Self {
        self.inversed_by = Some(field.into());
        self
    }

    pub fn with_join_column(mut self, column: impl Into<String>) -> Self {
        self.join_column = Some(column.into());
        self
    }
}

/// Normalized description of one persistable entity class.
///
/// Drivers populate a fresh value per discovered entity; exporters consume
/// the populated value. Nothing here is retained by the aggregator between
/// collection calls.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetadata {
    name: EntityName,
    table: Option<String>,
    repository: Option<String>,
    mapped_superclass: bool,
    fields: Vec<FieldMetadata>,
    associations: Vec<AssociationMetadata>,
}

impl EntityMetadata {
    pub fn new(name: EntityName) -> Self {
        Self {
            name,
            table: None,
            repository: None,
            mapped_superclass: false,
            fields: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn name(&self) -> &EntityName {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Whether this record describes an abstract base mapping rather than a
    /// directly instantiated entity. Such records are dropped from final
    /// collection output.
    pub fn is_mapped_superclass(&self) -> bool {
        self.mapped_superclass
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn associations(&self) -> &[AssociationMetadata] {
        &self.associations
    }

    pub fn id_fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|f| f.id)
    }

    pub fn set_table(&mut self, table: impl Into<String>) {
        self.table = Some(table.into());
    }

    pub fn set_repository(&mut self, repository: impl Into<String>) {
        self.repository = Some(repository.into());
    }

    pub fn mark_mapped_superclass(&mut self) {
        self.mapped_superclass = true;
    }

    pub fn add_field(&mut self, field: FieldMetadata) {
        self.fields.push(field);
    }

    pub fn add_association(&mut self, association: AssociationMetadata) {
        self.associations.push(association);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> EntityName {
        EntityName::new(raw).unwrap()
    }

    #[test]
    fn new_metadata_is_a_plain_entity() {
        let metadata = EntityMetadata::new(name("Customer"));
        assert!(!metadata.is_mapped_superclass());
        assert!(metadata.table().is_none());
        assert!(metadata.fields().is_empty());
    }

    #[test]
    fn id_fields_filters_identifiers() {
        let mut metadata = EntityMetadata::new(name("Customer"));
        metadata.add_field(FieldMetadata::id("id", FieldType::BigInt, IdGenerator::Auto));
        metadata.add_field(FieldMetadata::new("email", FieldType::String));

        let ids: Vec<&str> = metadata.id_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(ids, vec!["id"]);
    }

    #[test]
    fn field_builder_chains() {
        let field = FieldMetadata::new("email", FieldType::String)
            .with_column("email_address")
            .with_length(120)
            .unique();

        assert_eq!(field.column.as_deref(), Some("email_address"));
        assert_eq!(field.length, Some(120));
        assert!(field.unique);
        assert!(!field.nullable);
        assert!(!field.id);
    }

    #[test]
    fn field_type_tags_roundtrip() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_tag(ty.tag()), Some(ty));
        }
    }

    #[test]
    fn association_tags_roundtrip() {
        for kind in AssociationKind::ALL {
            assert_eq!(AssociationKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn rust_type_inference_covers_scalars() {
        assert_eq!(FieldType::from_rust_type("String"), Some((FieldType::String, false)));
        assert_eq!(FieldType::from_rust_type("i32"), Some((FieldType::Integer, false)));
        assert_eq!(FieldType::from_rust_type("i64"), Some((FieldType::BigInt, false)));
        assert_eq!(FieldType::from_rust_type("bool"), Some((FieldType::Boolean, false)));
        assert_eq!(FieldType::from_rust_type("Vec<u8>"), Some((FieldType::Binary, false)));
    }

    #[test]
    fn rust_type_inference_unwraps_option() {
        assert_eq!(FieldType::from_rust_type("Option<String>"), Some((FieldType::String, true)));
        assert_eq!(FieldType::from_rust_type("Option<i64>"), Some((FieldType::BigInt, true)));
    }

    #[test]
    fn unknown_rust_type_has_no_inference() {
        assert_eq!(FieldType::from_rust_type("Uuid"), None);
    }
}
