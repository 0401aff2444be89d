//! Change-batch processor
//!
//! Decides per batch whether a workspace refresh is needed and signals the
//! [`RefreshTrigger`] at most once. A batch needs a refresh when any entry in
//! its delta tree ends with a watched resource suffix, or when it touches the
//! rule file of the bound [`RuleStore`].

use crate::delta::{portable_path, walk, ResourceDelta};
use crate::event::ChangeEvent;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use testmap_core::{MappingConfig, RefreshTrigger, RuleStore};
use tracing::{debug, info, warn};

/// Job name reported while a batch is processed
pub const PROCESSOR_NAME: &str = "Looking for tests";

/// Suffix test on portable (`/`-separated) paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixFilter {
    suffixes: Vec<String>,
}

impl SuffixFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &MappingConfig) -> Self {
        Self::new(config.resource_suffixes.iter().cloned())
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = portable_path(path);
        self.suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }
}

impl Default for SuffixFilter {
    fn default() -> Self {
        Self::new([testmap_core::config::DEFAULT_RESOURCE_SUFFIX])
    }
}

/// Rule file location normalized for comparison with delta paths
///
/// A relative source is anchored at the working directory when the binding
/// is made; a same-named file elsewhere never counts as the rule file.
#[derive(Debug)]
struct RuleFileBinding {
    store: Arc<RuleStore>,
    file_name: Option<std::ffi::OsString>,
    canonical: Option<PathBuf>,
}

impl RuleFileBinding {
    fn new(store: Arc<RuleStore>) -> Self {
        let file_name = store.source().file_name().map(|n| n.to_os_string());
        let canonical = canonical_location(store.source());
        Self {
            store,
            file_name,
            canonical,
        }
    }

    fn is_touched_by(&self, path: &Path) -> bool {
        let source = self.store.source();
        if path == source {
            return true;
        }
        if path.file_name() != self.file_name.as_deref() {
            return false;
        }
        match (&self.canonical, canonical_location(path)) {
            (Some(expected), Some(actual)) => *expected == actual,
            _ => false,
        }
    }
}

/// Canonical parent joined with the file name; works for removed files
fn canonical_location(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.canonicalize().ok().map(|dir| dir.join(name))
}

/// Turns change batches into refresh signals
pub struct ResourceChangeProcessor<T: RefreshTrigger> {
    filter: SuffixFilter,
    trigger: T,
    rule_file: Option<RuleFileBinding>,
}

impl<T: RefreshTrigger> ResourceChangeProcessor<T> {
    pub fn new(filter: SuffixFilter, trigger: T) -> Self {
        Self {
            filter,
            trigger,
            rule_file: None,
        }
    }

    /// Reload `store` whenever a batch touches its rule file
    pub fn with_rule_store(mut self, store: Arc<RuleStore>) -> Self {
        self.rule_file = Some(RuleFileBinding::new(store));
        self
    }

    pub fn name(&self) -> &'static str {
        PROCESSOR_NAME
    }

    pub fn filter(&self) -> &SuffixFilter {
        &self.filter
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn can_process(&self, event: &ChangeEvent) -> bool {
        event.kind.is_post_change()
    }

    /// Whether any entry of the delta tree carries a watched suffix
    pub fn contains_resource_changes(&self, deltas: &[ResourceDelta]) -> bool {
        walk(deltas).any(|delta| self.filter.matches(delta.path()))
    }

    /// Handle one batch; returns `true` when a refresh was signalled
    pub fn process(&self, event: &ChangeEvent) -> bool {
        if !self.can_process(event) {
            debug!("{}: skipping {} batch", PROCESSOR_NAME, event.kind);
            return false;
        }

        let rules_changed = self.reload_rules_if_touched(&event.deltas);
        if !rules_changed && !self.contains_resource_changes(&event.deltas) {
            debug!("{}: no resource changes in batch", PROCESSOR_NAME);
            return false;
        }

        info!("{}: resource change detected", PROCESSOR_NAME);
        self.trigger.resource_change_detected();
        true
    }

    fn reload_rules_if_touched(&self, deltas: &[ResourceDelta]) -> bool {
        let Some(binding) = &self.rule_file else {
            return false;
        };
        if !walk(deltas).any(|delta| binding.is_touched_by(delta.path())) {
            return false;
        }

        match binding.store.reload() {
            Ok(rules) => {
                debug!("{}: {} mapping rules active", PROCESSOR_NAME, rules.len());
            }
            Err(e) => {
                warn!(
                    "{}: mapping file {} rejected: {}",
                    PROCESSOR_NAME,
                    binding.store.source().display(),
                    e
                );
            }
        }
        true
    }
}

impl<T: RefreshTrigger> std::fmt::Debug for ResourceChangeProcessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceChangeProcessor")
            .field("filter", &self.filter)
            .field(
                "rule_file",
                &self.rule_file.as_ref().map(|b| b.store.source()),
            )
            .finish()
    }
}
