//! # Apmec Core
//!
//! Core domain logic for the Apmec MEC orchestration client.
//!
//! This crate contains pure business logic with no I/O dependencies:
//! - Error definitions
//! - Resource and collection envelope helpers
//! - Pagination link model
//! - The resource descriptor catalog

pub mod envelope;
pub mod errors;
pub mod resources;

// Re-export commonly used types
pub use envelope::{
    links_key, plural_of, plural_table, truncated, unwrap_resource, wrap_resource, PageLink,
    DEFAULT_DESC_LENGTH, DEFAULT_ERROR_REASON_LENGTH,
};
pub use errors::{CoreError, Result};
pub use resources::{
    by_name, ResourceDescriptor, ALL, EVENT, EXTENSION, MEA, MEAD, MECA, MECAD, MES, MESD, VIM,
};
