//! Command execution for release-scribe.
//!
//! Each CLI subcommand has its own module with an `execute` entry point:
//!
//! - **update**: Add changelog entries and a release notes section for a
//!   newly published release
//! - **sync**: Copy a release's notes from the document into the hosting
//!   release description
//! - **validate**: Check the changelog against its JSON Schema
//!
//! Commands load `release-scribe.toml`, construct the hosting and
//! summarization clients from CLI credentials, and hand them to the
//! [`Orchestrator`](crate::orchestrator::Orchestrator).
//!
//! # Dry Run Support
//!
//! With `--dry-run` no file is written and no release is updated. Everything
//! that would have been written is logged instead.

/// Client and orchestrator construction shared by the commands.
pub mod common;

/// Release-triggered changelog and document update.
pub mod update;

/// Release description synchronization.
pub mod sync;

/// Changelog schema validation.
pub mod validate;
