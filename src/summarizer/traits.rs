use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    grouping::GroupedEntryDraft,
    summarizer::types::{BodyRequest, BreakingRequest, GroupingRequest},
};

/// Natural-language generation the pipeline delegates to an external
/// service. Implementations must return output matching the declared
/// structure or an error; they never repair it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Group pull requests into changelog entry drafts.
    async fn group_entries(
        &self,
        req: &GroupingRequest,
    ) -> Result<Vec<GroupedEntryDraft>>;

    /// One bullet per breaking change.
    async fn breaking_bullets(&self, req: &BreakingRequest)
    -> Result<Vec<String>>;

    /// Markdown body of a release section.
    async fn release_body(&self, req: &BodyRequest) -> Result<String>;
}
