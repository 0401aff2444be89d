//! RuleStore - file-bound rule set with atomic replacement
//!
//! Readers take an `Arc<RuleSet>` snapshot under a short read lock and
//! evaluate without holding it. A reload parses the whole file first and only
//! then swaps the pointer, so readers see the old or the new set in full.

use crate::config::MappingConfig;
use crate::errors::{MappingError, Result};
use crate::features::resource_mapping::domain::{parse_rules, RuleSet};
use parking_lot::{Mutex, RwLock};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Read and parse a rule file
///
/// A missing file is not an error: it yields an empty [`RuleSet`].
pub fn load_rule_file(path: &Path) -> Result<RuleSet> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_rules(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Resource mapping file {} does not exist.", path.display());
            Ok(RuleSet::empty())
        }
        Err(e) => Err(MappingError::io(path, e)),
    }
}

/// Owner of the active [`RuleSet`] for one rule file
#[derive(Debug)]
pub struct RuleStore {
    source: PathBuf,
    active: RwLock<Arc<RuleSet>>,
    /// Serializes reloads so the installed set always reflects the last read
    reload_lock: Mutex<()>,
}

impl RuleStore {
    /// Bind to `source` and load it
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or contains a
    /// malformed rule line.
    pub fn open(source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let rules = load_rule_file(&source)?;
        info!(
            "Loaded {} resource mapping rules from {}",
            rules.len(),
            source.display()
        );
        Ok(Self::from_rules(source, rules))
    }

    /// Open the rule file named by `config`, resolved against `base`
    pub fn from_config(config: &MappingConfig, base: impl AsRef<Path>) -> Result<Self> {
        config.validate()?;
        Self::open(config.resolve_rule_file(base))
    }

    /// Load a YAML config file and open its rule file
    ///
    /// A relative `rule_file` is resolved against the directory holding the
    /// config file.
    pub fn from_config_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let config = MappingConfig::from_yaml(config_path)?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base)
    }

    /// Bind to `source` with an already-built rule set, without touching disk
    pub fn from_rules(source: impl Into<PathBuf>, rules: RuleSet) -> Self {
        Self {
            source: source.into(),
            active: RwLock::new(Arc::new(rules)),
            reload_lock: Mutex::new(()),
        }
    }

    /// Rule file this store reads from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The rule set currently in force
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.active.read().clone()
    }

    /// Re-read the bound file and swap the result in
    ///
    /// On failure the previously active rules stay in force and the error is
    /// returned to the caller; nothing is retried.
    pub fn reload(&self) -> Result<Arc<RuleSet>> {
        let _writer = self.reload_lock.lock();

        match load_rule_file(&self.source) {
            Ok(rules) => {
                info!(
                    "Reloaded {} resource mapping rules from {}",
                    rules.len(),
                    self.source.display()
                );
                Ok(self.install(rules))
            }
            Err(e) => {
                warn!("Keeping previous resource mappings: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the active rules wholesale
    pub fn install(&self, rules: RuleSet) -> Arc<RuleSet> {
        let rules = Arc::new(rules);
        *self.active.write() = Arc::clone(&rules);
        rules
    }
}
