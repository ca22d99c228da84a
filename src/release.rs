//! Release tags, merge windows and release classification.

/// Breaking-change and major-bump classification.
pub mod classify;

/// Prefixed release tags and strict version parsing.
pub mod tag;

/// Previous-tag lookup and merge window resolution.
pub mod window;
