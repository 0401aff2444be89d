//! Application - the resource mapping engine

mod engine;

pub use engine::{select_tests, RuleBasedMapping};
