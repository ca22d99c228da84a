//! Breaking-change and major-bump classification.
use std::collections::HashSet;

use crate::{collector::PullRequest, release::tag::parse_strict_version};

/// True when both tags parse as strict versions and the current major is
/// greater than the previous one.
pub fn is_major_bump(previous: Option<&str>, current: &str) -> bool {
    let Some(previous) = previous.and_then(parse_strict_version) else {
        return false;
    };

    let Some(current) = parse_strict_version(current) else {
        return false;
    };

    current.major > previous.major
}

/// Release-notes pull requests that are not in the breaking set, keyed by
/// (repository, number). Input order is preserved.
pub fn regular_pull_requests(
    notes: &[PullRequest],
    breaking: &[PullRequest],
) -> Vec<PullRequest> {
    let breaking_keys: HashSet<_> = breaking.iter().map(|pr| pr.key()).collect();

    notes
        .iter()
        .filter(|pr| !breaking_keys.contains(&pr.key()))
        .cloned()
        .collect()
}
