use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Result, markdown::strip_extra_lines, release::tag::ReleaseTag};

/// Tera template for a new release section.
pub const SECTION_TEMPLATE: &str = r#"## {{ tag }} ({{ date }})

See what's new and improved in version {{ tag }}.

<img src="{{ image_url }}" align="left" alt="{{ tag }}" width="800">

{% if breaking_bullets %}
#### Breaking Changes

{% for bullet in breaking_bullets -%}
- {{ bullet }}
{% endfor %}
{% elif breaking_needs_review %}
#### Breaking Changes

> **Needs manual review:** this release is a major version bump but no pull request was labeled as breaking. Document any breaking changes before publishing.
{% endif %}

{{ body }}

{% if release_url %}
[View full release on GitHub]({{ release_url }})
{% endif %}

***
"#;

/// What the breaking-changes part of a section should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakingNotes {
    None,
    Bullets(Vec<String>),
    /// Major bump without any breaking-labeled pull request.
    NeedsReview,
}

/// Inputs for rendering one release section.
#[derive(Debug, Clone)]
pub struct SectionInput {
    pub tag: ReleaseTag,
    pub published_at: DateTime<Utc>,
    pub image_url: String,
    pub breaking: BreakingNotes,
    pub body: String,
    pub release_url: Option<String>,
}

#[derive(Serialize)]
struct SectionContext<'a> {
    tag: &'a str,
    date: String,
    image_url: &'a str,
    breaking_bullets: Vec<String>,
    breaking_needs_review: bool,
    body: &'a str,
    release_url: Option<&'a str>,
}

fn clean_bullet(bullet: &str) -> String {
    let trimmed = bullet.trim();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Substitute `{index}` in an illustration URL template.
pub fn image_url(template: &str, index: u32) -> String {
    template.replace("{index}", &index.to_string())
}

/// Render the markdown section for a release.
pub fn compose_section(input: &SectionInput) -> Result<String> {
    let (breaking_bullets, breaking_needs_review) = match &input.breaking {
        BreakingNotes::None => (vec![], false),
        BreakingNotes::Bullets(bullets) => (
            bullets
                .iter()
                .map(|b| clean_bullet(b))
                .filter(|b| !b.is_empty())
                .collect(),
            false,
        ),
        BreakingNotes::NeedsReview => (vec![], true),
    };

    let ctx = SectionContext {
        tag: input.tag.as_str(),
        date: input.published_at.format("%Y-%m-%d").to_string(),
        image_url: &input.image_url,
        breaking_bullets,
        breaking_needs_review,
        body: input.body.trim(),
        release_url: input.release_url.as_deref(),
    };

    let context = tera::Context::from_serialize(&ctx)?;
    let section = tera::Tera::one_off(SECTION_TEMPLATE, &context, false)?;

    Ok(strip_extra_lines(&section))
}
