//! Reading and writing the rolling release-notes document.
use regex::Regex;
use std::sync::LazyLock;

/// Rendering of new release sections.
pub mod compose;

/// Location and clean-up of release sections.
pub mod extract;

/// Idempotent insertion of sections and managed blocks.
pub mod upsert;

/// Matches 3 or more consecutive new lines
static EXTRA_NEW_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Matches the start of any level-2 heading line
pub(crate) static LEVEL_TWO_HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+").unwrap());

/// Collapse runs of blank lines (3+ new lines) to a single blank line and
/// trim surrounding whitespace.
pub fn strip_extra_lines(text: &str) -> String {
    EXTRA_NEW_LINES_REGEX
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}

/// Regex matching the heading line start of the section for `tag`, i.e.
/// `## <tag> (`. The tag must match exactly, not as a prefix.
pub(crate) fn section_heading_regex(tag: &str) -> crate::Result<Regex> {
    Ok(Regex::new(&format!(
        r"(?m)^##\s+{}\s+\(",
        regex::escape(tag.trim())
    ))?)
}
