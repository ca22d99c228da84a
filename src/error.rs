//! Custom error types for release-scribe.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are
//! grouped by the taxonomy the pipeline reacts to: configuration errors and
//! missing entities abort immediately, transient external failures are
//! retried, invariant and validation failures abort naming every offender.

use std::fmt::Display;

use reqwest::StatusCode;
use thiserror::Error;

/// A single JSON Schema violation reported against the changelog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the offending instance, e.g. `/0/title`.
    pub path: String,
    /// Human readable description of the violation.
    pub message: String,
}

impl Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.path)
        }
    }
}

fn join_references(references: &[String]) -> String {
    if references.is_empty() {
        return "none".into();
    }
    references.join(", ")
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("\n  - {v}"))
        .collect::<String>()
}

/// Main error type for release-scribe operations.
#[derive(Error, Debug)]
pub enum ReleaseScribeError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Repository {0} is not configured for changelog updates")]
    UnconfiguredRepository(String),

    // Lookup errors
    #[error("Not found: {entity}")]
    NotFound { entity: String },

    // Forge errors
    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    // Summarization service errors
    #[error("Summarization failed: {0}")]
    SummarizerError(String),

    // Transient network/API errors
    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("Transient API error: {0}")]
    TransientApi(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Operation timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("API authentication failed: {0}")]
    AuthenticationError(String),

    // Invariant violations
    #[error(
        "Grouped entries do not partition the pull requests exactly once: duplicated [{}], missing [{}], unknown [{}]",
        join_references(.duplicated),
        join_references(.missing),
        join_references(.unknown)
    )]
    PartitionViolation {
        duplicated: Vec<String>,
        missing: Vec<String>,
        unknown: Vec<String>,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    // Validation failures
    #[error(
        "Changelog schema validation failed with {} violation(s):{}",
        .0.len(),
        join_violations(.0)
    )]
    SchemaValidation(Vec<SchemaViolation>),

    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Datetime parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseScribeError
pub type Result<T> = std::result::Result<T, ReleaseScribeError>;

impl ReleaseScribeError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a not-found error naming the missing entity
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// Create a summarizer error with context
    pub fn summarizer(msg: impl Into<String>) -> Self {
        Self::SummarizerError(msg.into())
    }

    /// Whether the retry policy may attempt the failed call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_)
                | Self::TransientApi(_)
                | Self::RateLimitExceeded
                | Self::Timeout { .. }
        )
    }

    /// Classify an HTTP status returned by an external service.
    pub fn from_status(status: StatusCode, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status.as_u16() {
            401 => Self::AuthenticationError(msg),
            429 => Self::RateLimitExceeded,
            // 529 is the summarization service's "overloaded" status
            500..=599 => Self::TransientApi(format!("{status}: {msg}")),
            _ => Self::ForgeError(format!("{status}: {msg}")),
        }
    }
}

// Implement From for reqwest errors (network/API)
impl From<reqwest::Error> for ReleaseScribeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status, err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for ReleaseScribeError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.to_lowercase().contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code.is_server_error() =>
            {
                Self::TransientApi(format!("GitHub API error: {}", err))
            }
            octocrab::Error::Hyper { .. } | octocrab::Error::Service { .. } => {
                Self::NetworkError(format!("GitHub API error: {}", err))
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}
