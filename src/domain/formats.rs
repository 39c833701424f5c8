use std::fmt;

/// Source formats a mapping directory can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingFormat {
    /// Attribute-annotated Rust struct declarations.
    Annotation,
    /// One `*.entity.xml` document per entity.
    Xml,
    /// One `*.entity.yaml` (or `.yml`) document per entity.
    Yaml,
    /// Native declarative Rust modules served by registered providers.
    Native,
}

impl MappingFormat {
    /// All mapping formats in registry order.
    pub const ALL: [MappingFormat; 4] =
        [MappingFormat::Annotation, MappingFormat::Xml, MappingFormat::Yaml, MappingFormat::Native];

    /// Canonical tag for this format.
    pub fn tag(&self) -> &'static str {
        match self {
            MappingFormat::Annotation => "annotation",
            MappingFormat::Xml => "xml",
            MappingFormat::Yaml => "yaml",
            MappingFormat::Native => "native",
        }
    }

    /// Look up a format by tag. Returns `None` for unrecognized tags so the
    /// caller decides whether that is an error.
    pub fn from_tag(tag: &str) -> Option<MappingFormat> {
        match tag.to_lowercase().as_str() {
            "annotation" => Some(MappingFormat::Annotation),
            "xml" => Some(MappingFormat::Xml),
            "yaml" | "yml" => Some(MappingFormat::Yaml),
            "native" | "rust" => Some(MappingFormat::Native),
            _ => None,
        }
    }
}

impl fmt::Display for MappingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Target formats an exporter can be obtained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// One `*.entity.xml` document per entity.
    Xml,
    /// One `*.entity.yaml` document per entity.
    Yaml,
    /// Rust source with a `metadata()` constructor per entity.
    Native,
    /// Attribute-annotated Rust struct per entity.
    Annotation,
}

impl ExportFormat {
    /// All export formats in registry order.
    pub const ALL: [ExportFormat; 4] =
        [ExportFormat::Xml, ExportFormat::Yaml, ExportFormat::Native, ExportFormat::Annotation];

    /// Canonical tag for this format.
    pub fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Native => "native",
            ExportFormat::Annotation => "annotation",
        }
    }

    /// Look up a format by tag. Returns `None` for unrecognized tags so the
    /// caller decides whether that is an error.
    pub fn from_tag(tag: &str) -> Option<ExportFormat> {
        match tag.to_lowercase().as_str() {
            "xml" => Some(ExportFormat::Xml),
            "yaml" | "yml" => Some(ExportFormat::Yaml),
            "native" | "rust" => Some(ExportFormat::Native),
            "annotation" => Some(ExportFormat::Annotation),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
