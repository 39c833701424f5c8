//! Registry of native metadata providers.
//!
//! Rust sources cannot be loaded at run time the way mapping documents are
//! read, so native sources pair a scanned directory with registered provider
//! functions. A provider is keyed by the module path of the file it stands
//! for (`crm/customer.rs` is `crm::customer`, `crm/mod.rs` is `crm`) and
//! returns the metadata records that module defines. Scanned files without a
//! registered provider contribute nothing.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::domain::{AppError, EntityMetadata};

pub type NativeProvider = Box<dyn Fn() -> Result<Vec<EntityMetadata>, AppError> + Send + Sync>;

/// Provider functions for native mapping modules.
#[derive(Default)]
pub struct NativeModuleRegistry {
    providers: HashMap<String, NativeProvider>,
}

impl NativeModuleRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    /// Register the provider for one module path, replacing any previous one.
    pub fn register<F>(&mut self, module: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<Vec<EntityMetadata>, AppError> + Send + Sync + 'static,
    {
        self.providers.insert(module.into(), Box::new(provider));
    }

    pub fn provider(&self, module: &str) -> Option<&NativeProvider> {
        self.providers.get(module)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Module path of `file` relative to `root`, or `None` for files that do
    /// not name a module (non-Rust files, files outside `root`).
    pub fn module_path(root: &Path, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(root).ok()?;
        let mut segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let last = segments.pop()?;
        let stem = last.strip_suffix(".rs")?;
        if stem != "mod" {
            segments.push(stem.to_string());
        }
        if segments.is_empty() { None } else { Some(segments.join("::")) }
    }
}

impl fmt::Debug for NativeModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modules: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        modules.sort_unstable();
        f.debug_struct("NativeModuleRegistry").field("modules", &modules).finish()
    }
}
