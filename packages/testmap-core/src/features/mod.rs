//! Feature slices

pub mod resource_mapping;
