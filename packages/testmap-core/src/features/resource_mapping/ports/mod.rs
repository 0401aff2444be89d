//! Ports - Interface definitions for Resource Mapping
//!
//! The class index and the workspace refresh driver live outside this crate;
//! they are passed in explicitly through these traits.

use super::domain::{ClassIdentity, Pattern, TestClassSet};
use crate::errors::Result;
use std::collections::HashSet;
use std::path::PathBuf;

/// Read-only view of the known classes and their dependency edges
///
/// Implementations must not change while a single evaluation is running.
pub trait ClassIndex: Send + Sync {
    /// Every class name currently indexed
    fn indexed_class_names(&self) -> Vec<String>;

    /// Indexed class names that whole-match `pattern`
    fn find_matching_class_names(&self, pattern: &Pattern) -> Vec<String> {
        self.indexed_class_names()
            .into_iter()
            .filter(|name| pattern.matches(name))
            .collect()
    }

    /// Look up an indexed class by fully-qualified name
    fn resolve(&self, class_name: &str) -> Option<ClassIdentity>;

    /// Classes whose dependency surface includes any member of `classes`
    fn find_changed_parents(&self, classes: &HashSet<ClassIdentity>) -> HashSet<ClassIdentity>;
}

/// "Resource change detected" signal consumed by a workspace refresh driver
pub trait RefreshTrigger: Send + Sync {
    fn resource_change_detected(&self);
}

impl<F> RefreshTrigger for F
where
    F: Fn() + Send + Sync,
{
    fn resource_change_detected(&self) {
        self()
    }
}

/// Maps changed resources to the tests that must re-run
pub trait ResourceMapping: Send + Sync {
    /// Re-read the mapping if it is controlled by an external resource
    ///
    /// Needed when the rule file was edited or test classes were added to or
    /// removed from the dependency graph.
    fn update_resource_mapping_list(&self) -> Result<()>;

    /// Test classes to add to the run for `changed_files`
    fn select_tests(&self, changed_files: &[PathBuf], index: &dyn ClassIndex) -> TestClassSet;
}
