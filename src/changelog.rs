//! Structured changelog records, persistence and schema validation.

/// Changelog entry record and label vocabulary.
pub mod entry;

/// JSON Schema validation of the changelog document.
pub mod schema;

/// File and in-memory changelog stores.
pub mod store;
