//! Service configuration

use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use estimator_lib::Catalog;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration, read from `ESTIMATOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name attached to every structured log event
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the estimator API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Pricing catalog JSON; the built-in catalog when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "estimator".to_string())
}

fn default_api_port() -> u16 {
    8080
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            catalog_path: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder().add_source(
                config::Environment::with_prefix("ESTIMATOR").try_parsing(true),
            ),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Invalid ESTIMATOR_* configuration")
    }

    /// Load the configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display())),
            None => Ok(Catalog::builtin()),
        }
    }
}
