pub mod config;
pub mod entity_name;
pub mod error;
pub mod formats;
pub mod metadata;

pub use config::{ConvertConfig, ExportConfig, SourceConfig};
pub use entity_name::EntityName;
pub use error::AppError;
pub use formats::{ExportFormat, MappingFormat};
pub use metadata::{
    AssociationKind, AssociationMetadata, EntityMetadata, FieldMetadata, FieldType, IdGenerator,
};
