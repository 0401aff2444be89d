//! Test class identities and result sets

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;

/// A test class, unique by fully-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIdentity {
    name: String,
}

impl ClassIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Fully-qualified class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the package prefix
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for ClassIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Hashes and compares exactly like the name, so sets can be probed by `&str`
impl Borrow<str> for ClassIdentity {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl From<&str> for ClassIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassIdentity {
    fn from(name: String) -> Self {
        Self { name }
    }
}

/// Test classes selected for re-run
///
/// Produced fresh per evaluation; duplicates collapse by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestClassSet {
    classes: HashSet<ClassIdentity>,
}

impl TestClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the class was already present
    pub fn insert(&mut self, class: ClassIdentity) -> bool {
        self.classes.insert(class)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, ClassIdentity> {
        self.classes.iter()
    }

    /// Class names in lexical order, for stable output
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.iter().map(ClassIdentity::name).collect();
        names.sort_unstable();
        names
    }
}

impl Extend<ClassIdentity> for TestClassSet {
    fn extend<I: IntoIterator<Item = ClassIdentity>>(&mut self, iter: I) {
        self.classes.extend(iter);
    }
}

impl FromIterator<ClassIdentity> for TestClassSet {
    fn from_iter<I: IntoIterator<Item = ClassIdentity>>(iter: I) -> Self {
        Self {
            classes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TestClassSet {
    type Item = ClassIdentity;
    type IntoIter = hash_set::IntoIter<ClassIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_iter()
    }
}

impl<'a> IntoIterator for &'a TestClassSet {
    type Item = &'a ClassIdentity;
    type IntoIter = hash_set::Iter<'a, ClassIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}
