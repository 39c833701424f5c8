//! mapconv: Convert ORM entity mapping metadata between annotation, XML, YAML,
//! and native Rust formats.
//!
//! The core is the [`MetadataAggregator`]: register mapping sources as
//! (directory, format) pairs, collect a deduplicated ordered set of entity
//! records across them, and hand the result to a format's exporter. The
//! [`convert`] and [`inspect`] facade functions cover the common runs; the
//! aggregator is public for callers that need native provider registration or
//! custom wiring.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

pub use app::api::{
    ConvertOptions, ConvertReport, EntitySummary, InspectOptions, convert, inspect,
};
pub use domain::{
    AppError, AssociationKind, AssociationMetadata, ConvertConfig, EntityMetadata, EntityName,
    ExportConfig, ExportFormat, FieldMetadata, FieldType, IdGenerator, MappingFormat, SourceConfig,
};
pub use services::{Exporter, MetadataAggregator, NativeModuleRegistry};
