use regex::Regex;

use crate::{
    Result,
    markdown::{LEVEL_TWO_HEADING_REGEX, section_heading_regex},
};

/// Heading in hosting-generated release bodies that managed blocks are
/// placed in front of.
pub const WHATS_CHANGED_HEADING: &str = "## What's Changed";

pub fn managed_block_start(tag: &str) -> String {
    format!("<!-- RELEASE_SCRIBE_NOTES_START tag={tag} -->")
}

pub fn managed_block_end(tag: &str) -> String {
    format!("<!-- RELEASE_SCRIBE_NOTES_END tag={tag} -->")
}

/// Replace (or add) the managed block for `tag` in a release body.
///
/// Any existing block for the tag is removed wherever it sits. The new
/// block is placed right before the first "What's Changed" heading, or at
/// the top when there is none. Re-running with the same inputs yields the
/// same output.
pub fn upsert_managed_block(existing: &str, block: &str, tag: &str) -> Result<String> {
    let tag = tag.trim();
    let start = managed_block_start(tag);
    let end = managed_block_end(tag);

    let block_regex = Regex::new(&format!(
        r"(?s){}.*?{}\s*",
        regex::escape(&start),
        regex::escape(&end)
    ))?;

    let cleaned = block_regex.replace_all(existing.trim(), "");
    let cleaned = cleaned.trim();

    let managed = format!("{start}\n{}\n{end}", block.trim());

    let combined = if cleaned.is_empty() {
        managed
    } else if let Some(idx) = cleaned.find(WHATS_CHANGED_HEADING) {
        let before = cleaned[..idx].trim_end();
        let after = cleaned[idx..].trim_start();
        format!("{before}\n\n{managed}\n\n{after}")
    } else {
        format!("{managed}\n\n{cleaned}")
    };

    Ok(format!("{}\n", combined.trim()))
}

/// Split a leading `---` fenced frontmatter block from the body.
fn split_frontmatter(document: &str) -> (Option<&str>, &str) {
    if !document.starts_with("---") {
        return (None, document);
    }

    match document[3..].find("\n---") {
        Some(pos) => {
            let end = 3 + pos + "\n---".len();
            (
                Some(document[..end].trim_end_matches('\n')),
                document[end..].trim_start_matches('\n'),
            )
        }
        None => (None, document),
    }
}

/// Insert the release `section` for `tag` into a release-notes document.
///
/// Frontmatter is preserved verbatim. An existing section for the same tag
/// is replaced in place; otherwise the section goes before the first
/// level-2 heading of the body, or at the top of an empty body.
pub fn insert_section(document: &str, section: &str, tag: &str) -> Result<String> {
    let (frontmatter, body) = split_frontmatter(document);
    let insertion = format!("{}\n\n", section.trim());

    let updated_body = match section_heading_regex(tag)?.find(body) {
        Some(existing) => {
            let after_heading = existing.end();
            let section_end = body[after_heading..]
                .find('\n')
                .and_then(|nl| {
                    let next_line = after_heading + nl + 1;
                    LEVEL_TWO_HEADING_REGEX
                        .find(&body[next_line..])
                        .map(|m| next_line + m.start())
                })
                .unwrap_or(body.len());

            format!(
                "{}{insertion}{}",
                &body[..existing.start()],
                &body[section_end..]
            )
        }
        None => match LEVEL_TWO_HEADING_REGEX.find(body) {
            Some(first) => format!(
                "{}{insertion}{}",
                &body[..first.start()],
                &body[first.start()..]
            ),
            None => format!("{insertion}{body}"),
        },
    };

    let updated = match frontmatter {
        Some(frontmatter) => format!("{frontmatter}\n\n{updated_body}"),
        None => updated_body,
    };

    Ok(format!("{}\n", updated.trim_end()))
}
