//! In-memory class index
//!
//! A [`ClassIndex`] for hosts that have no compiler model of their own, and
//! for tests. Classes are registered by fully-qualified name. Edges are
//! stored keyed by the used class, so the changed parents of a class are the
//! classes reachable by walking from it to its users. Unregistered classes
//! may appear in edges and are walked through but never reported.

use crate::features::resource_mapping::domain::ClassIdentity;
use crate::features::resource_mapping::ports::ClassIndex;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// `dependent` uses `dependency`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub dependent: String,
    pub dependency: String,
}

/// Serializable dump of an index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassIndexSnapshot {
    pub classes: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

/// Known classes and their reverse dependency edges
#[derive(Debug, Default)]
pub struct InMemoryClassIndex {
    classes: DashMap<String, ClassIdentity>,
    /// dependency → classes that use it
    dependents: DashMap<String, HashSet<String>>,
}

impl InMemoryClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &ClassIndexSnapshot) -> Self {
        let index = Self::new();
        for class in &snapshot.classes {
            index.add_class(class.as_str());
        }
        for edge in &snapshot.dependencies {
            index.add_dependency(edge.dependent.as_str(), edge.dependency.as_str());
        }
        index
    }

    /// Current contents, sorted for stable output
    pub fn snapshot(&self) -> ClassIndexSnapshot {
        let mut classes: Vec<String> = self.classes.iter().map(|e| e.key().clone()).collect();
        classes.sort_unstable();

        let mut dependencies: Vec<DependencyEdge> = self
            .dependents
            .iter()
            .flat_map(|entry| {
                let dependency = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|dependent| DependencyEdge {
                        dependent: dependent.clone(),
                        dependency: dependency.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        dependencies.sort_unstable();

        ClassIndexSnapshot {
            classes,
            dependencies,
        }
    }

    pub fn add_class(&self, name: impl Into<String>) {
        let name = name.into();
        self.classes
            .entry(name.clone())
            .or_insert_with(|| ClassIdentity::new(name));
    }

    /// Record that `dependent` uses `dependency`
    ///
    /// Edges may reference classes that are not (yet) indexed; those are
    /// traversed but never reported.
    pub fn add_dependency(&self, dependent: impl Into<String>, dependency: impl Into<String>) {
        self.dependents
            .entry(dependency.into())
            .or_default()
            .insert(dependent.into());
    }

    /// Drop a class and every edge touching it
    pub fn remove_class(&self, name: &str) {
        self.classes.remove(name);
        self.dependents.remove(name);
        for mut entry in self.dependents.iter_mut() {
            entry.value_mut().remove(name);
        }
        self.dependents.retain(|_, users| !users.is_empty());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Direct dependents of `name`
    pub fn dependents_of(&self, name: &str) -> HashSet<String> {
        self.dependents
            .get(name)
            .map(|users| users.value().clone())
            .unwrap_or_default()
    }

    /// Clear all data (for testing or rebuild)
    pub fn clear(&self) {
        self.classes.clear();
        self.dependents.clear();
    }

    /// Number of indexed classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassIndex for InMemoryClassIndex {
    fn indexed_class_names(&self) -> Vec<String> {
        self.classes.iter().map(|e| e.key().clone()).collect()
    }

    fn resolve(&self, class_name: &str) -> Option<ClassIdentity> {
        self.classes.get(class_name).map(|e| e.value().clone())
    }

    /// Every indexed class that transitively depends on a member of `classes`
    ///
    /// Members of `classes` themselves are not reported, even inside a cycle.
    fn find_changed_parents(&self, classes: &HashSet<ClassIdentity>) -> HashSet<ClassIdentity> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        for class in classes {
            if visited.insert(class.name().to_string()) {
                queue.push_back(class.name().to_string());
            }
        }

        let mut parents = HashSet::new();

        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents_of(&current) {
                if !visited.insert(dependent.clone()) {
                    continue;
                }
                if let Some(identity) = self.resolve(&dependent) {
                    parents.insert(identity);
                }
                queue.push_back(dependent);
            }
        }

        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(set: &HashSet<ClassIdentity>) -> Vec<&str> {
        let mut names: Vec<&str> = set.iter().map(ClassIdentity::name).collect();
        names.sort_unstable();
        names
    }

    fn seeds(names: &[&str]) -> HashSet<ClassIdentity> {
        names.iter().map(|n| ClassIdentity::new(*n)).collect()
    }

    #[test]
    fn test_resolve_and_names() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.A");
        index.add_class("com.A");
        index.add_class("com.B");

        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("com.A"), Some(ClassIdentity::new("com.A")));
        assert_eq!(index.resolve("com.Z"), None);

        let mut all = index.indexed_class_names();
        all.sort();
        assert_eq!(all, vec!["com.A", "com.B"]);
    }

    #[test]
    fn test_find_matching_class_names() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.foo.BarTest");
        index.add_class("com.foo.BarTestHelper");

        let pattern = crate::features::resource_mapping::domain::Pattern::new(r"com\.foo\..*Test")
            .unwrap();
        assert_eq!(index.find_matching_class_names(&pattern), vec!["com.foo.BarTest"]);
    }

    #[test]
    fn test_no_dependents() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.A");

        assert!(index.find_changed_parents(&seeds(&["com.A"])).is_empty());
    }

    #[test]
    fn test_transitive_parents() {
        let index = InMemoryClassIndex::new();
        for class in ["com.A", "com.B", "com.C", "com.D"] {
            index.add_class(class);
        }
        // C → B → A, D independent
        index.add_dependency("com.B", "com.A");
        index.add_dependency("com.C", "com.B");

        let parents = index.find_changed_parents(&seeds(&["com.A"]));
        assert_eq!(names(&parents), vec!["com.B", "com.C"]);
    }

    #[test]
    fn test_diamond_and_cycle() {
        let index = InMemoryClassIndex::new();
        for class in ["com.A", "com.B", "com.C", "com.D"] {
            index.add_class(class);
        }
        //     D
        //    / \
        //   B   C
        //    \ /
        //     A   (and A depends back on D)
        index.add_dependency("com.B", "com.A");
        index.add_dependency("com.C", "com.A");
        index.add_dependency("com.D", "com.B");
        index.add_dependency("com.D", "com.C");
        index.add_dependency("com.A", "com.D");

        let parents = index.find_changed_parents(&seeds(&["com.A"]));
        assert_eq!(names(&parents), vec!["com.B", "com.C", "com.D"]);
    }

    #[test]
    fn test_unindexed_intermediate_is_traversed_not_reported() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.A");
        index.add_class("com.C");
        index.add_dependency("com.Hidden", "com.A");
        index.add_dependency("com.C", "com.Hidden");

        let parents = index.find_changed_parents(&seeds(&["com.A"]));
        assert_eq!(names(&parents), vec!["com.C"]);
    }

    #[test]
    fn test_remove_class_drops_edges() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.A");
        index.add_class("com.B");
        index.add_dependency("com.B", "com.A");

        index.remove_class("com.B");

        assert!(!index.contains("com.B"));
        assert!(index.dependents_of("com.A").is_empty());
        assert!(index.find_changed_parents(&seeds(&["com.A"])).is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.B");
        index.add_class("com.A");
        index.add_dependency("com.B", "com.A");

        let snapshot = index.snapshot();
        assert_eq!(snapshot.classes, vec!["com.A", "com.B"]);
        assert_eq!(
            snapshot.dependencies,
            vec![DependencyEdge {
                dependent: "com.B".to_string(),
                dependency: "com.A".to_string(),
            }]
        );

        let rebuilt = InMemoryClassIndex::from_snapshot(&snapshot);
        assert_eq!(rebuilt.snapshot(), snapshot);
    }

    #[test]
    fn test_clear() {
        let index = InMemoryClassIndex::new();
        index.add_class("com.A");
        index.add_dependency("com.B", "com.A");

        index.clear();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.snapshot().dependencies.is_empty());
    }
}
