//! CLI argument parsing and credential resolution.
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    Result, config::DEFAULT_CONFIG_FILE, error::ReleaseScribeError,
    forge::request::RepoId,
};

/// Environment variable checked before `GITHUB_TOKEN` when no token flag is
/// given.
pub const PRIVATE_REPO_TOKEN_ENV: &str = "PRIVATE_REPO_TOKEN";

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the release-scribe configuration file.
    pub config: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Log what would be written instead of writing files or releases.
    pub dry_run: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release notes subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Update the changelog and release notes document for a published
    /// release.
    Update {
        #[arg(long, env = "SOURCE_REPO")]
        /// Repository the release was published in (owner/name).
        repo: RepoId,

        #[arg(long, env = "RELEASE_TAG")]
        /// Published tag, with or without the repository's tag prefix.
        tag: String,

        #[arg(long, env = "RELEASE_URL")]
        /// Web URL of the published release.
        release_url: String,

        #[arg(long, env = "PUBLISHED_AT")]
        /// RFC 3339 publish timestamp of the release.
        published_at: DateTime<Utc>,

        #[arg(long)]
        /// GitHub token. Falls back to PRIVATE_REPO_TOKEN, then GITHUB_TOKEN.
        github_token: Option<String>,

        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        /// Anthropic API key.
        anthropic_api_key: Option<String>,
    },

    /// Copy a release's notes from the document into the hosting release
    /// description.
    Sync {
        #[arg(long, env = "RELEASE_TAG")]
        /// Release tag, with or without the target repository's tag prefix.
        tag: String,

        #[arg(long, env = "TARGET_REPO")]
        /// Repository whose release is updated. Defaults to [sync].target_repo.
        target_repo: Option<RepoId>,

        #[arg(long, env = "MARKDOWN_FILE")]
        /// Release notes document. Defaults to [sync].markdown_file.
        markdown_file: Option<String>,

        #[arg(long)]
        /// GitHub token. Falls back to PRIVATE_REPO_TOKEN, then GITHUB_TOKEN.
        github_token: Option<String>,
    },

    /// Validate the changelog against its JSON Schema.
    Validate {
        #[arg(long)]
        /// Changelog file. Defaults to the configured changelog_path.
        changelog: Option<PathBuf>,

        #[arg(long)]
        /// Schema file. Defaults to the configured schema_path or the
        /// generated schema.
        schema: Option<PathBuf>,
    },
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Hosting token from the flag, then `PRIVATE_REPO_TOKEN`, then
/// `GITHUB_TOKEN`. Empty values count as unset.
pub fn resolve_github_token(flag: Option<String>) -> Result<SecretString> {
    non_empty(flag)
        .or_else(|| non_empty(env::var(PRIVATE_REPO_TOKEN_ENV).ok()))
        .or_else(|| non_empty(env::var("GITHUB_TOKEN").ok()))
        .map(SecretString::from)
        .ok_or_else(|| {
            ReleaseScribeError::InvalidArgs(
                "must set --github-token, PRIVATE_REPO_TOKEN or GITHUB_TOKEN"
                    .into(),
            )
        })
}

/// Summarization API key from the flag or `ANTHROPIC_API_KEY`.
pub fn resolve_anthropic_key(flag: Option<String>) -> Result<SecretString> {
    non_empty(flag).map(SecretString::from).ok_or_else(|| {
        ReleaseScribeError::InvalidArgs(
            "must set --anthropic-api-key or ANTHROPIC_API_KEY".into(),
        )
    })
}
