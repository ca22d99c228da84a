//! Release-triggered update command implementation.
use log::*;
use std::sync::Arc;

use crate::{
    Result,
    cli::{self, resolve_anthropic_key},
    command::common,
    error::ReleaseScribeError,
    orchestrator::update::UpdateParams,
    release::tag::ReleaseTag,
    summarizer::{
        anthropic::{AnthropicConfig, AnthropicSummarizer},
        traits::Summarizer,
    },
};

/// Execute the update command and print the run report as JSON.
pub async fn execute(args: &cli::Args) -> Result<()> {
    let cli::Command::Update {
        repo,
        tag,
        release_url,
        published_at,
        github_token,
        anthropic_api_key,
    } = &args.command
    else {
        return Err(ReleaseScribeError::InvalidArgs(
            "expected the update command".into(),
        ));
    };

    let config = common::load_configuration(args)?;

    let prefix = config
        .stream_for_repo(repo)?
        .source_for(repo)
        .map(|s| s.tag_prefix.clone())
        .unwrap_or_default();
    let tag = ReleaseTag::from_forge(tag, &prefix);

    let api_key = resolve_anthropic_key(anthropic_api_key.clone())?;
    let forge = common::forge_manager(args, &config, github_token.clone())?;

    let summarizer: Arc<dyn Summarizer> =
        Arc::new(AnthropicSummarizer::new(AnthropicConfig {
            api_key,
            model: config.model.clone(),
            timeout_secs: config.retry.timeout_secs,
            retry: config.retry.clone(),
            ..AnthropicConfig::default()
        })?);

    let orchestrator = common::orchestrator_builder(args, config, forge)
        .summarizer(summarizer)
        .build()?;

    let report = orchestrator
        .update(UpdateParams {
            repo: repo.clone(),
            tag,
            release_url: release_url.clone(),
            published_at: *published_at,
        })
        .await?;

    if report.attention.is_empty() {
        info!("update complete: nothing needs attention");
    } else {
        warn!(
            "update complete: {} item(s) need attention",
            report.attention.len()
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
