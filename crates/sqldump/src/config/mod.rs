//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Databases named explicitly by the configuration, in order.
    ///
    /// Empty when `dump.all_databases` is set; the catalog decides then.
    pub fn explicit_databases(&self) -> Vec<String> {
        if self.dump.all_databases {
            return Vec::new();
        }
        if self.dump.databases.is_empty() {
            vec![self.source.database.clone()]
        } else {
            self.dump.databases.clone()
        }
    }
}
