//! Summarizer backed by the Anthropic Messages API.
//!
//! Structured output is obtained through forced tool use: each call declares
//! one tool whose input schema is generated from the expected output type,
//! and the model is required to call it.
use async_trait::async_trait;
use log::*;
use schemars::{JsonSchema, generate::SchemaSettings};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use crate::{
    Result,
    error::ReleaseScribeError,
    grouping::GroupedEntryDraft,
    retry::RetryPolicy,
    summarizer::{
        traits::Summarizer,
        types::{
            BodyOutput, BodyRequest, BreakingOutput, BreakingRequest,
            GroupingOutput, GroupingRequest, body_prompt, breaking_prompt,
            grouping_prompt,
        },
    },
};

pub const DEFAULT_ANTHROPIC_BASE_URI: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Connection settings for the Anthropic API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base_uri: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from("".to_string()),
            model: DEFAULT_MODEL.to_string(),
            api_base_uri: DEFAULT_ANTHROPIC_BASE_URI.to_string(),
            timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

/// A tool the model is forced to call, carrying the output schema.
struct OutputTool {
    name: &'static str,
    description: &'static str,
    max_tokens: u32,
}

const GROUPING_TOOL: OutputTool = OutputTool {
    name: "record_changelog_entries",
    description: "Record the grouped changelog entries for this release.",
    max_tokens: 2000,
};

const BREAKING_TOOL: OutputTool = OutputTool {
    name: "record_breaking_changes",
    description: "Record the breaking-change bullets for this release.",
    max_tokens: 1000,
};

const BODY_TOOL: OutputTool = OutputTool {
    name: "record_release_body",
    description: "Record the markdown body of the release notes section.",
    max_tokens: 2000,
};

/// Input schema for `T` with every subschema inlined.
pub fn input_schema<T: JsonSchema>() -> Result<Value> {
    let schema = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();

    let mut value = serde_json::to_value(&schema)?;

    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }

    Ok(value)
}

fn request_body<T: JsonSchema>(
    model: &str,
    tool: &OutputTool,
    prompt: &str,
) -> Result<Value> {
    Ok(json!({
        "model": model,
        "max_tokens": tool.max_tokens,
        "temperature": 0,
        "tools": [{
            "name": tool.name,
            "description": tool.description,
            "input_schema": input_schema::<T>()?,
        }],
        "tool_choice": {"type": "tool", "name": tool.name},
        "messages": [{"role": "user", "content": prompt}],
    }))
}

/// Pull the forced tool call's input out of a Messages API response.
fn parse_tool_input<T: DeserializeOwned>(
    response: &Value,
    tool_name: &str,
) -> Result<T> {
    let input = response["content"]
        .as_array()
        .and_then(|blocks| {
            blocks.iter().find(|b| {
                b["type"] == "tool_use" && b["name"] == tool_name
            })
        })
        .map(|b| b["input"].clone())
        .ok_or_else(|| {
            ReleaseScribeError::summarizer(format!(
                "response did not call {tool_name} (stop reason: {})",
                response["stop_reason"]
            ))
        })?;

    serde_json::from_value(input).map_err(|e| {
        ReleaseScribeError::summarizer(format!(
            "{tool_name} returned malformed output: {e}"
        ))
    })
}

pub struct AnthropicSummarizer {
    client: reqwest::Client,
    messages_url: Url,
    config: AnthropicConfig,
}

/// Messages endpoint below `base`, keeping any path prefix of `base`.
fn messages_url(base: &str) -> Result<Url> {
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;
    Ok(base.join("v1/messages")?)
}

impl AnthropicSummarizer {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let messages_url = messages_url(&config.api_base_uri)?;

        Ok(Self {
            client,
            messages_url,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn call_once(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.messages_url.clone())
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match ReleaseScribeError::from_status(status, text) {
                ReleaseScribeError::ForgeError(msg) => {
                    ReleaseScribeError::SummarizerError(msg)
                }
                other => other,
            });
        }

        Ok(response.json().await?)
    }

    async fn call_tool<T: JsonSchema + DeserializeOwned>(
        &self,
        tool: &OutputTool,
        prompt: &str,
    ) -> Result<T> {
        let body = request_body::<T>(&self.config.model, tool, prompt)?;

        debug!("calling {} with a {} char prompt", tool.name, prompt.len());

        let response = self
            .config
            .retry
            .run(tool.name, || self.call_once(&body))
            .await?;

        parse_tool_input(&response, tool.name)
    }
}

#[async_trait]
impl Summarizer for AnthropicSummarizer {
    async fn group_entries(
        &self,
        req: &GroupingRequest,
    ) -> Result<Vec<GroupedEntryDraft>> {
        let output: GroupingOutput =
            self.call_tool(&GROUPING_TOOL, &grouping_prompt(req)).await?;
        Ok(output.entries)
    }

    async fn breaking_bullets(
        &self,
        req: &BreakingRequest,
    ) -> Result<Vec<String>> {
        let output: BreakingOutput =
            self.call_tool(&BREAKING_TOOL, &breaking_prompt(req)).await?;
        Ok(output.bullets)
    }

    async fn release_body(&self, req: &BodyRequest) -> Result<String> {
        let output: BodyOutput =
            self.call_tool(&BODY_TOOL, &body_prompt(req)).await?;

        if output.content.trim().is_empty() {
            return Err(ReleaseScribeError::summarizer(
                "release body is empty",
            ));
        }

        Ok(output.content)
    }
}
