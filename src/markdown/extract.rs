use regex::Regex;
use std::sync::LazyLock;

use crate::{
    Result,
    error::ReleaseScribeError,
    markdown::{LEVEL_TWO_HEADING_REGEX, section_heading_regex},
    release::tag::ReleaseTag,
};

/// Matches a line consisting solely of `***`
static SEPARATOR_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*\*[ \t]*$").unwrap());

/// Matches a "View full release ..." link line
static VIEW_FULL_RELEASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[view full release[^\]]*\]\(.*\)\s*$").unwrap()
});

/// Matches a trailing `***` separator at the very end of the text
static TRAILING_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?\*\*\*\s*$").unwrap());

/// Matches HTML comments, including multi-line ones
static HTML_COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Matches an `<img ...>` tag and the whitespace following it
static IMG_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\s+[^>]*>\s*").unwrap());

/// Matches the first release heading with a strict version
static VERSION_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^##\s+(?<tag>v?\d+\.\d+\.\d+)\s+\(").unwrap()
});

/// Matches a numbered illustration inside an `<img>` tag's src
static IMAGE_INDEX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<img\s[^>]*src\s*=\s*"[^"]*?(?<index>\d+)\.(?:jpg|jpeg|png|webp)""#,
    )
    .unwrap()
});

/// The most recent release section of a document, as far as it can be
/// inferred from its heading and illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestSection {
    pub tag: ReleaseTag,
    pub image_index: Option<u32>,
}

/// Inspect the first `## X.Y.Z (` section of `text`.
pub fn latest_section(text: &str) -> Option<LatestSection> {
    let caps = VERSION_HEADING_REGEX.captures(text)?;
    let heading = caps.get(0)?;

    let body_start = text[heading.end()..]
        .find('\n')
        .map(|i| heading.end() + i + 1)
        .unwrap_or(text.len());

    let body_end = LEVEL_TWO_HEADING_REGEX
        .find(&text[body_start..])
        .map(|m| body_start + m.start())
        .unwrap_or(text.len());

    let image_index = IMAGE_INDEX_REGEX
        .captures(&text[body_start..body_end])
        .and_then(|c| c["index"].parse().ok());

    Some(LatestSection {
        tag: ReleaseTag::new(&caps["tag"]),
        image_index,
    })
}

/// Extract the body of the release section for `tag`, stripped of the
/// document-specific decoration (intro sentence, banner image, comments,
/// separators and "View full release" links).
pub fn extract_release_section(text: &str, tag: &str) -> Result<String> {
    let tag = tag.trim();

    if tag.is_empty() {
        return Err(ReleaseScribeError::InvalidArgs(
            "release tag must not be empty".into(),
        ));
    }

    let heading = section_heading_regex(tag)?.find(text).ok_or_else(|| {
        ReleaseScribeError::not_found(format!("release heading for tag {tag}"))
    })?;

    let Some(line_end) = text[heading.start()..].find('\n') else {
        return Ok(String::new());
    };

    let content_start = heading.start() + line_end + 1;
    let rest = &text[content_start..];

    let content_end = [
        LEVEL_TWO_HEADING_REGEX.find(rest).map(|m| m.start()),
        SEPARATOR_LINE_REGEX.find(rest).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(rest.len());

    let section = rest[..content_end].trim();

    let section = section
        .lines()
        .filter(|line| !VIEW_FULL_RELEASE_REGEX.is_match(line.trim()))
        .collect::<Vec<&str>>()
        .join("\n");

    let section = TRAILING_SEPARATOR_REGEX.replace(section.trim_end(), "");
    let section = HTML_COMMENT_REGEX.replace_all(section.trim_end(), "");
    let section = section.trim();

    let intro = Regex::new(&format!(
        r"(?mi)^See what's new and improved in version {}\.?\s*",
        regex::escape(tag)
    ))?;
    let section = intro.replacen(section, 1, "");
    let section = IMG_TAG_REGEX.replacen(section.trim(), 1, "");

    Ok(section.trim().to_string())
}
