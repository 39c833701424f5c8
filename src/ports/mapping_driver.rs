//! Mapping driver port definition.

use crate::domain::{AppError, EntityMetadata, EntityName};

/// Port for reading entity metadata out of one mapping source directory.
///
/// A driver is constructed over a single directory. Enumerating names and
/// parsing documents are split so that a collection pass reads each mapping
/// document exactly once.
pub trait MappingDriver {
    /// Names of all entities declared in the source directory, in scan order.
    ///
    /// File-based drivers derive names from file names alone; no document is
    /// parsed here.
    fn preload(&self) -> Result<Vec<EntityName>, AppError>;

    /// Parse the mapping document backing `name` into `metadata`.
    fn populate(&self, name: &EntityName, metadata: &mut EntityMetadata) -> Result<(), AppError>;
}
