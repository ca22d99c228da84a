//! Natural-language summarization of pull requests.

/// Anthropic Messages API implementation.
pub mod anthropic;

/// Summarizer trait used by the pipeline.
pub mod traits;

/// Requests, structured outputs and prompts.
pub mod types;
