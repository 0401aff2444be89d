//! Domain - rules, patterns, and class identities
//!
//! Pure value types: no I/O, no shared state.

mod class;
mod pattern;
mod rule;

pub use class::{ClassIdentity, TestClassSet};
pub use pattern::Pattern;
pub use rule::{parse_rules, MappingRule, RuleSet};
