//! Infrastructure - rule file storage and a reference class index

mod in_memory_index;
mod rule_store;

pub use in_memory_index::{ClassIndexSnapshot, DependencyEdge, InMemoryClassIndex};
pub use rule_store::{load_rule_file, RuleStore};
