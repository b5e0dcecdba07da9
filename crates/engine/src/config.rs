//! Store configuration via `docstore.toml`
//!
//! Every field has a default, so an empty file (or no file) yields the
//! default configuration. Limits of zero are rejected when the config is
//! loaded or handed to `DocumentStore::with_config`.

use docstore_core::{Error, Limits, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docstore.toml";

/// Document store configuration
///
/// # Example
///
/// ```toml
/// auto_generate_ids = true
/// max_batch_size = 100000
/// max_fields_per_document = 1024
/// max_field_name_bytes = 1024
/// max_text_bytes = 16777216
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Assign an `ObjectId` `_id` to documents stored without one.
    /// When false such documents are rejected.
    #[serde(default = "default_true")]
    pub auto_generate_ids: bool,
    /// Maximum documents per insert batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Maximum fields per document
    #[serde(default = "default_max_fields")]
    pub max_fields_per_document: usize,
    /// Maximum field name length in bytes
    #[serde(default = "default_max_field_name_bytes")]
    pub max_field_name_bytes: usize,
    /// Maximum Text value length in bytes
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    Limits::default().max_batch_size
}

fn default_max_fields() -> usize {
    Limits::default().max_fields_per_document
}

fn default_max_field_name_bytes() -> usize {
    Limits::default().max_field_name_bytes
}

fn default_max_text_bytes() -> usize {
    Limits::default().max_text_bytes
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            auto_generate_ids: default_true(),
            max_batch_size: default_max_batch_size(),
            max_fields_per_document: default_max_fields(),
            max_field_name_bytes: default_max_field_name_bytes(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

impl StoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docstore configuration
#
# Assign an ObjectId `_id` to documents inserted without one (default: true).
# When false, such documents are rejected as invalid.
auto_generate_ids = true

# Reject insert batches larger than this (default: 100000)
max_batch_size = 100000

# Per-document limits
max_fields_per_document = 1024
max_field_name_bytes = 1024
max_text_bytes = 16777216    # 16MB
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text does not parse or a limit is zero.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed, or a limit is zero.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Reject zero limits
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_batch_size", self.max_batch_size),
            ("max_fields_per_document", self.max_fields_per_document),
            ("max_field_name_bytes", self.max_field_name_bytes),
            ("max_text_bytes", self.max_text_bytes),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }

    /// Document and batch limits described by this config
    pub fn limits(&self) -> Limits {
        Limits {
            max_batch_size: self.max_batch_size,
            max_fields_per_document: self.max_fields_per_document,
            max_field_name_bytes: self.max_field_name_bytes,
            max_text_bytes: self.max_text_bytes,
        }
    }
}
