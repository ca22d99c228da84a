//! Hosting platform access for release lookups, pull request search and
//! release body updates.

/// Configuration and authentication for forge platforms.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Retry and dry-run wrapper around forge implementations.
pub mod manager;

/// Request and response records exchanged with forges.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
