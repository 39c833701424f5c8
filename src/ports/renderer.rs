//! Metadata renderer port definition.

use std::path::PathBuf;

use crate::domain::{AppError, EntityMetadata};

/// Port for rendering one entity metadata record into an output document.
pub trait MetadataRenderer {
    /// Render `metadata` as the full textual body of its output document.
    fn render(&self, metadata: &EntityMetadata) -> Result<String, AppError>;

    /// Path of the rendered document relative to the export destination.
    fn relative_path(&self, metadata: &EntityMetadata) -> PathBuf;
}
