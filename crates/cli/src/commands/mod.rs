//! Subcommand implementations
//!
//! Every command runs either against a local catalog or against a running
//! estimator service, depending on whether an API URL was configured.

pub mod catalog;
pub mod compare;
pub mod estimate;
pub mod history;

use crate::client::ApiClient;
use anyhow::{Context, Result};
use estimator_lib::Catalog;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Where estimates are computed
pub enum Backend {
    Local { catalog: Arc<Catalog> },
    Remote(ApiClient),
}

impl Backend {
    /// Local backend with a catalog file, or the built-in catalog
    pub fn local(catalog_path: Option<&Path>) -> Result<Self> {
        let catalog = match catalog_path {
            Some(path) => Catalog::from_json_file(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
            None => Catalog::builtin(),
        };
        Ok(Backend::Local {
            catalog: Arc::new(catalog),
        })
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
