//! Resource Mapping Engine
//!
//! Algorithm:
//! 1. For each changed path, find rules whose resource pattern whole-matches it
//! 2. For each class pattern of those rules, resolve every indexed class that
//!    whole-matches it (direct hits)
//! 3. Union the index's changed parents of the direct hits
//!
//! Pure with respect to its inputs: no I/O, no mutation of the index.

use crate::errors::Result;
use crate::features::resource_mapping::domain::{ClassIdentity, RuleSet, TestClassSet};
use crate::features::resource_mapping::infrastructure::RuleStore;
use crate::features::resource_mapping::ports::{ClassIndex, ResourceMapping};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Select the test classes impacted by `changed_files` under `rules`
///
/// Returns an empty set when no path matches any rule.
pub fn select_tests<P, I>(rules: &RuleSet, changed_files: &[P], index: &I) -> TestClassSet
where
    P: AsRef<Path>,
    I: ClassIndex + ?Sized,
{
    let mut direct: HashSet<ClassIdentity> = HashSet::new();
    // A class pattern shared by several matching rules or paths is expanded once
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut matched_rules = 0usize;

    for changed in changed_files {
        let path = changed.as_ref().to_string_lossy();

        for rule in rules.iter().filter(|rule| rule.applies_to(&path)) {
            matched_rules += 1;

            for pattern in rule.class_patterns() {
                if !expanded.insert(pattern.as_str()) {
                    continue;
                }

                for name in index.find_matching_class_names(pattern) {
                    match index.resolve(&name) {
                        Some(class) => {
                            direct.insert(class);
                        }
                        None => debug!("Indexed class '{}' could not be resolved", name),
                    }
                }
            }
        }
    }

    if direct.is_empty() {
        debug!(
            "No resource-triggered tests for {} changed files ({} rule matches)",
            changed_files.len(),
            matched_rules
        );
        return TestClassSet::new();
    }

    let parents = index.find_changed_parents(&direct);

    debug!(
        "Resource mapping: {} changed files, {} rule matches, {} direct tests, {} changed parents",
        changed_files.len(),
        matched_rules,
        direct.len(),
        parents.len()
    );

    let mut selected: TestClassSet = direct.into_iter().collect();
    selected.extend(parents);
    selected
}

/// [`ResourceMapping`] backed by a file-bound [`RuleStore`]
///
/// Each evaluation works on one RuleSet snapshot; a concurrent reload only
/// affects evaluations that start after it.
#[derive(Debug, Clone)]
pub struct RuleBasedMapping {
    store: Arc<RuleStore>,
}

impl RuleBasedMapping {
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }
}

impl ResourceMapping for RuleBasedMapping {
    fn update_resource_mapping_list(&self) -> Result<()> {
        self.store.reload().map(|_| ())
    }

    fn select_tests(&self, changed_files: &[PathBuf], index: &dyn ClassIndex) -> TestClassSet {
        let rules = self.store.snapshot();
        select_tests(&rules, changed_files, index)
    }
}
