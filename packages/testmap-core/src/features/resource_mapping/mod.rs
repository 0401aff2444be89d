//! Resource Mapping - select tests affected by changed non-source files
//!
//! A flat rule file maps resource path patterns to test class patterns:
//!
//! ```text
//! # comments and blank lines are skipped
//! src/test/resources/.*\.feature=com\.acme\..*Steps
//! config\.yml=com\.acme\.ConfigTest,com\.acme\.BootTest
//! ```
//!
//! Patterns use the `regex` crate syntax and must match the WHOLE path or
//! class name (`^(?:pattern)$`), never a substring.
//!
//! Flow: changed paths → [`RuleSet`] (direct hits via [`ClassIndex`]) →
//! changed-parent closure → [`TestClassSet`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export application layer (primary interface)
pub use application::{select_tests, RuleBasedMapping};

pub use domain::{parse_rules, ClassIdentity, MappingRule, Pattern, RuleSet, TestClassSet};
pub use infrastructure::{ClassIndexSnapshot, InMemoryClassIndex, RuleStore};
pub use ports::{ClassIndex, RefreshTrigger, ResourceMapping};
