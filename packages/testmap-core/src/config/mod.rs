//! Mapping configuration
//!
//! Where the rule file lives and which file suffixes count as resources.
//!
//! # Examples
//!
//! ```rust,ignore
//! use testmap_core::config::MappingConfig;
//!
//! let config = MappingConfig::from_yaml("testmap.yaml")?;
//! let rule_file = config.resolve_rule_file(workspace_root);
//! ```
//!
//! YAML schema v1:
//!
//! ```yaml
//! version: 1
//! rule_file: testmap.mapping
//! resource_suffixes: [".feature", ".yml"]
//! ```

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Schema versions this crate understands
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Default mapping file name, relative to the workspace root
pub const DEFAULT_RULE_FILE: &str = "testmap.mapping";

/// Default resource suffix watched for changes
pub const DEFAULT_RESOURCE_SUFFIX: &str = ".feature";

/// Resource mapping configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Path of the rule file; relative paths are resolved against a base directory
    pub rule_file: PathBuf,

    /// Path suffixes that mark a changed file as a mapped resource
    pub resource_suffixes: Vec<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            rule_file: PathBuf::from(DEFAULT_RULE_FILE),
            resource_suffixes: vec![DEFAULT_RESOURCE_SUFFIX.to_string()],
        }
    }
}

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigExportV1 {
    version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_suffixes: Option<Vec<String>>,
}

impl MappingConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(yaml)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let defaults = Self::default();
        let config = Self {
            rule_file: export.rule_file.unwrap_or(defaults.rule_file),
            resource_suffixes: export
                .resource_suffixes
                .unwrap_or(defaults.resource_suffixes),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML schema v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: SUPPORTED_VERSIONS.last().copied(),
            rule_file: Some(self.rule_file.clone()),
            resource_suffixes: Some(self.resource_suffixes.clone()),
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.rule_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "rule_file must not be empty".to_string(),
            ));
        }
        if self.resource_suffixes.is_empty() {
            return Err(ConfigError::Validation(
                "resource_suffixes must list at least one suffix".to_string(),
            ));
        }
        if self.resource_suffixes.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::Validation(
                "resource_suffixes must not contain empty entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Rule file location, anchored at `base` when configured as a relative path
    pub fn resolve_rule_file(&self, base: impl AsRef<Path>) -> PathBuf {
        if self.rule_file.is_absolute() {
            self.rule_file.clone()
        } else {
            base.as_ref().join(&self.rule_file)
        }
    }
}
