/*
 * Testmap Core - Resource-to-Test Mapping Engine
 *
 * Selects test classes to re-run when non-source resources change.
 *
 * Feature-First Hexagonal Architecture:
 * - config/    : Versioned YAML configuration
 * - features/  : Vertical slices (resource_mapping: domain → ports → application → infrastructure)
 * - errors     : Crate-wide error type
 */

pub mod config;
pub mod errors;
pub mod features;

pub use config::{ConfigError, ConfigResult, MappingConfig};
pub use errors::{MappingError, Result};
pub use features::resource_mapping::{
    parse_rules, select_tests, ClassIdentity, ClassIndex, ClassIndexSnapshot, InMemoryClassIndex,
    MappingRule, Pattern, RefreshTrigger, ResourceMapping, RuleBasedMapping, RuleSet, RuleStore,
    TestClassSet,
};
