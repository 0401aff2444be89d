//! Change batches

use crate::delta::ResourceDelta;

/// Where in the workspace lifecycle a batch was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEventKind {
    PreBuild,
    PostBuild,
    PostChange,
    PreClose,
    PreDelete,
}

impl ChangeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEventKind::PreBuild => "pre_build",
            ChangeEventKind::PostBuild => "post_build",
            ChangeEventKind::PostChange => "post_change",
            ChangeEventKind::PreClose => "pre_close",
            ChangeEventKind::PreDelete => "pre_delete",
        }
    }

    /// Batches that describe completed changes
    pub fn is_post_change(&self) -> bool {
        matches!(self, ChangeEventKind::PostBuild | ChangeEventKind::PostChange)
    }
}

impl std::fmt::Display for ChangeEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One batch of change notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeEventKind,
    pub deltas: Vec<ResourceDelta>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeEventKind, deltas: Vec<ResourceDelta>) -> Self {
        Self { kind, deltas }
    }

    pub fn post_change(deltas: Vec<ResourceDelta>) -> Self {
        Self::new(ChangeEventKind::PostChange, deltas)
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}
