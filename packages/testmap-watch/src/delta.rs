//! Nested change notifications
//!
//! A batch arrives as a tree: a changed folder carries its affected children.
//! [`walk`] flattens the tree lazily, depth-first, parents before children.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    Added,
    Removed,
    Changed,
}

impl DeltaKind {
    /// Net effect of `self` followed by `later` on the same path
    ///
    /// `None` when the two cancel out: a file created and removed again.
    pub fn then(self, later: DeltaKind) -> Option<DeltaKind> {
        match (self, later) {
            (DeltaKind::Added, DeltaKind::Removed) => None,
            (DeltaKind::Added, _) => Some(DeltaKind::Added),
            (DeltaKind::Removed, DeltaKind::Added) => Some(DeltaKind::Changed),
            (DeltaKind::Changed, DeltaKind::Added) => Some(DeltaKind::Changed),
            (_, later) => Some(later),
        }
    }
}

/// One affected resource and the affected resources below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDelta {
    path: PathBuf,
    kind: DeltaKind,
    children: Vec<ResourceDelta>,
}

impl ResourceDelta {
    pub fn new(path: impl Into<PathBuf>, kind: DeltaKind) -> Self {
        Self {
            path: path.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn changed(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DeltaKind::Changed)
    }

    pub fn with_child(mut self, child: ResourceDelta) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ResourceDelta>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DeltaKind {
        self.kind
    }

    pub fn children(&self) -> &[ResourceDelta] {
        &self.children
    }

    /// Path with `/` separators on every platform
    pub fn portable_path(&self) -> String {
        portable_path(&self.path)
    }
}

/// `path` rendered with `/` separators
pub fn portable_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Depth-first, pre-order iterator over every delta in a forest
#[derive(Debug, Clone)]
pub struct DeltaWalk<'a> {
    stack: Vec<&'a ResourceDelta>,
}

impl<'a> Iterator for DeltaWalk<'a> {
    type Item = &'a ResourceDelta;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

pub fn walk(deltas: &[ResourceDelta]) -> DeltaWalk<'_> {
    DeltaWalk {
        stack: deltas.iter().rev().collect(),
    }
}
