//! Requests sent to the summarization service, the structured outputs it
//! must return, and the prompts built from them.
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    collector::PullRequest, config::stream::Audience,
    grouping::GroupedEntryDraft, release::tag::ReleaseTag,
};

/// PR body budget per pull request in grouping prompts.
pub const GROUPING_BODY_LIMIT: usize = 3500;
/// PR body budget per pull request in body-text prompts.
pub const SUMMARY_BODY_LIMIT: usize = 300;

/// Group release-notes pull requests into a few changelog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingRequest {
    pub stream: String,
    pub audience: Audience,
    pub tag: ReleaseTag,
    pub pull_requests: Vec<PullRequest>,
    pub max_groups: usize,
}

/// Summarize breaking pull requests as bullets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingRequest {
    pub stream: String,
    pub tag: ReleaseTag,
    pub pull_requests: Vec<PullRequest>,
}

/// Write the markdown body of a release section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRequest {
    pub stream: String,
    pub audience: Audience,
    pub tag: ReleaseTag,
    pub release_url: String,
    pub published_at: DateTime<Utc>,
    pub pull_requests: Vec<PullRequest>,
    pub include_pr_links: bool,
}

/// Structured output of the grouping call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GroupingOutput {
    /// Changelog entries, most important first
    pub entries: Vec<GroupedEntryDraft>,
}

/// Structured output of the breaking-changes call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BreakingOutput {
    /// One bullet per breaking change, without leading dashes
    pub bullets: Vec<String>,
}

/// Structured output of the body-text call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BodyOutput {
    /// Markdown body, without the release heading, intro or banner
    pub content: String,
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn audience_phrase(audience: Audience) -> &'static str {
    match audience {
        Audience::Oss => "open source users",
        Audience::Pro => "users of the commercial offering",
        Audience::All => "all users",
    }
}

pub fn grouping_prompt(req: &GroupingRequest) -> String {
    let mut prompt = format!(
        "You are writing changelog entries for the {} release stream, version {}.\n\
         The audience is {}. Focus on what users can now do or benefit from.\n\n\
         Pull requests:\n",
        req.stream,
        req.tag,
        audience_phrase(req.audience)
    );

    for pr in req.pull_requests.iter() {
        prompt.push_str(&format!(
            "\n### {} {}\nURL: {}\nLabels: {}\nBody:\n{}\n",
            pr.reference(),
            pr.title,
            pr.url,
            pr.labels.join(", "),
            truncate_chars(&pr.body, GROUPING_BODY_LIMIT)
        ));
    }

    prompt.push_str(&format!(
        "\nGroup these pull requests into between 1 and {} changelog entries. \
         Refer to pull requests by their full `owner/name#number` reference \
         as shown in the headings above. Every reference must appear in \
         exactly one entry; the same number in two repositories is two \
         different pull requests. Do not invent references. For each entry \
         write a concise title (max 60 characters, no PR numbers), a 1-3 \
         sentence markdown-friendly description, and suggest labels.",
        req.max_groups
    ));

    prompt
}

pub fn breaking_prompt(req: &BreakingRequest) -> String {
    let mut prompt = format!(
        "List the breaking changes in version {} of the {} release stream, \
         one bullet per change, telling users what they must do to upgrade.\n\n\
         Pull requests labeled as breaking:\n",
        req.tag, req.stream
    );

    for pr in req.pull_requests.iter() {
        prompt.push_str(&format!(
            "- {} (#{}): {} - {}\n",
            pr.title,
            pr.number,
            pr.url,
            truncate_chars(&pr.body, GROUPING_BODY_LIMIT).replace('\n', " ")
        ));
    }

    prompt
}

pub fn body_prompt(req: &BodyRequest) -> String {
    let summaries = req
        .pull_requests
        .iter()
        .map(|pr| {
            format!(
                "- {} (#{}): {} - {}",
                pr.title,
                pr.number,
                pr.url,
                truncate_chars(&pr.body, SUMMARY_BODY_LIMIT).replace('\n', " ")
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    let links = if req.include_pr_links {
        "Include a markdown link to each PR using the format [PR #<number>](<url>) for each bullet."
    } else {
        "Do not include PR links; keep the prose concise."
    };

    format!(
        "Write release notes for the {} release stream, version {}.\n\
         Release URL: {}\n\
         Published at: {}\n\
         The audience is {}.\n\n\
         Pull requests:\n{}\n\n\
         Write only the body of the section: no release heading, no intro \
         sentence, no image. Use bolded subsection headers (####) to group \
         related changes. Use <details><summary>Fixed</summary>...</details> \
         for bug fixes and <details><summary>Improved</summary>...</details> \
         for minor improvements when appropriate. {} Highlight the top \
         user-facing improvements first.",
        req.stream,
        req.tag,
        req.release_url,
        req.published_at.to_rfc3339(),
        audience_phrase(req.audience),
        summaries,
        links
    )
}
