use chrono::{DateTime, SecondsFormat, Utc};
use log::*;

use crate::{
    Result,
    changelog::{
        entry::ChangelogEntry,
        schema::{load_schema, validate_entries},
        store::prepend_entries,
    },
    collector::{PullRequest, aggregate::Aggregator},
    config::stream::StreamConfig,
    forge::request::RepoId,
    grouping::{AssemblyContext, assemble},
    image::{ImageRotator, state::MemoryImageStateStore},
    markdown::{
        compose::{BreakingNotes, SectionInput, compose_section, image_url},
        upsert::insert_section,
    },
    orchestrator::{
        Orchestrator,
        report::{AttentionItem, RunReport, short_descriptions},
    },
    release::{
        classify::{is_major_bump, regular_pull_requests},
        tag::ReleaseTag,
    },
    summarizer::types::{BodyRequest, BreakingRequest, GroupingRequest},
};

/// Release event that triggers an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    /// Repository the release was published in
    pub repo: RepoId,
    /// Release tag without the repository's prefix
    pub tag: ReleaseTag,
    pub release_url: String,
    pub published_at: DateTime<Utc>,
}

impl Orchestrator {
    /// Update the changelog and the stream's release-notes document for a
    /// newly published release.
    pub async fn update(&self, params: UpdateParams) -> Result<RunReport> {
        let stream = self.config.stream_for_repo(&params.repo)?;

        info!(
            "updating release notes for {} {} (stream {})",
            params.repo, params.tag, stream.name
        );

        let aggregator =
            Aggregator::resolve(&self.forge, stream, &params.repo, &params.tag)
                .await?;

        let previous_tag = aggregator.primary().and_then(|p| p.previous.clone());

        let notes = aggregator
            .collect(&self.config.release_notes_label)
            .await?;
        let breaking = aggregator
            .collect_any(&self.config.breaking.labels)
            .await?;
        let regular = regular_pull_requests(&notes, &breaking);

        let major_bump = is_major_bump(
            previous_tag.as_ref().map(|t| t.as_str()),
            params.tag.as_str(),
        );

        let mut report = RunReport {
            stream: stream.name.clone(),
            tag: Some(params.tag.clone()),
            previous_tag: previous_tag.clone(),
            major_bump,
            collected: notes.len(),
            breaking: breaking.len(),
            regular: regular.len(),
            dry_run: self.dry_run,
            ..RunReport::default()
        };

        if notes.is_empty() && breaking.is_empty() {
            warn!(
                "no pull requests labeled {} or breaking for {}: nothing to do",
                self.config.release_notes_label, params.tag
            );
            return Ok(report);
        }

        report.attention.extend(short_descriptions(
            &notes,
            self.config.attention.short_description_threshold,
        ));

        if major_bump && breaking.is_empty() {
            report.attention.push(AttentionItem::MajorBumpWithoutBreaking {
                previous: previous_tag.clone(),
                tag: params.tag.clone(),
            });
        }

        let published_at =
            params.published_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let entries = self
            .update_changelog(stream, &params.tag, &published_at, &notes)
            .await?;

        for entry in entries.iter() {
            if entry.needs_completion() {
                report.attention.push(AttentionItem::PlaceholderFields {
                    entry_id: entry.id,
                    fields: entry
                        .placeholder_fields()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                });
            }
        }

        report.entry_ids = entries.iter().map(|e| e.id).collect();

        let document = self
            .read_document(&stream.markdown_file)?
            .unwrap_or_default();

        let image_index =
            self.allocate_image(&params.tag, &stream.markdown_file, &document)?;
        report.image_index = Some(image_index);

        let (bullets, body) = self
            .generate_text(stream, &params, &breaking, &regular)
            .await?;

        let breaking_notes = if !bullets.is_empty() {
            BreakingNotes::Bullets(bullets)
        } else if !breaking.is_empty()
            || (major_bump && self.config.breaking.major_bump_placeholder)
        {
            BreakingNotes::NeedsReview
        } else {
            BreakingNotes::None
        };

        let section = compose_section(&SectionInput {
            tag: params.tag.clone(),
            published_at: params.published_at,
            image_url: image_url(&self.config.image.url_template, image_index),
            breaking: breaking_notes,
            body,
            release_url: stream
                .include_release_link
                .then(|| params.release_url.clone()),
        })?;

        let updated = insert_section(&document, &section, params.tag.as_str())?;
        self.write_document(&stream.markdown_file, &updated)?;
        report.markdown_file = Some(stream.markdown_file.clone());

        for item in report.attention.iter() {
            warn!("needs attention: {item}");
        }

        Ok(report)
    }

    /// Group the release-notes pull requests into new changelog entries,
    /// validate the resulting changelog and write it. Returns the new
    /// entries (empty when the release was already recorded).
    async fn update_changelog(
        &self,
        stream: &StreamConfig,
        tag: &ReleaseTag,
        published_at: &str,
        notes: &[PullRequest],
    ) -> Result<Vec<ChangelogEntry>> {
        if notes.is_empty() {
            info!("no release-notes pull requests: changelog unchanged");
            return Ok(vec![]);
        }

        if self
            .changelog_store
            .contains_release(published_at, stream.audience)?
        {
            warn!(
                "changelog already has {} entries published at {published_at}: not adding them again",
                stream.audience
            );
            return Ok(vec![]);
        }

        let existing = self.changelog_store.load_all()?;
        let max_existing_id = existing.iter().map(|e| e.id).max().unwrap_or(0);

        let drafts = self
            .summarizer()?
            .group_entries(&GroupingRequest {
                stream: stream.name.clone(),
                audience: stream.audience,
                tag: tag.clone(),
                pull_requests: notes.to_vec(),
                max_groups: self.config.grouping.max_groups,
            })
            .await?;

        let entries = assemble(
            notes,
            &drafts,
            &AssemblyContext {
                max_existing_id,
                published_at: published_at.to_string(),
                audience: stream.audience,
                max_groups: self.config.grouping.max_groups,
            },
        )?;

        let combined = prepend_entries(&entries, &existing);

        let schema_path = self
            .config
            .schema_path
            .as_deref()
            .map(|p| self.resolve_path(p));
        let schema = load_schema(schema_path.as_deref())?;
        validate_entries(&schema, &combined)?;

        if self.dry_run {
            warn!(
                "dry_run: would add changelog entries:\n{}",
                serde_json::to_string_pretty(&entries)?
            );
        } else {
            self.changelog_store.write_all(&combined)?;
            info!("added {} changelog entries", entries.len());
        }

        Ok(entries)
    }

    fn allocate_image(
        &self,
        tag: &ReleaseTag,
        file: &str,
        document: &str,
    ) -> Result<u32> {
        let max_index = self.config.image.max_index;

        if self.dry_run {
            let scratch = MemoryImageStateStore::new(self.image_store.load()?);
            return ImageRotator::new(&scratch, max_index)?
                .next_image_index(tag, file, document);
        }

        ImageRotator::new(self.image_store.as_ref(), max_index)?
            .next_image_index(tag, file, document)
    }

    /// Breaking bullets and section body, requested concurrently.
    async fn generate_text(
        &self,
        stream: &StreamConfig,
        params: &UpdateParams,
        breaking: &[PullRequest],
        regular: &[PullRequest],
    ) -> Result<(Vec<String>, String)> {
        let summarizer = self.summarizer()?;

        let breaking_req = BreakingRequest {
            stream: stream.name.clone(),
            tag: params.tag.clone(),
            pull_requests: breaking.to_vec(),
        };

        let body_req = BodyRequest {
            stream: stream.name.clone(),
            audience: stream.audience,
            tag: params.tag.clone(),
            release_url: params.release_url.clone(),
            published_at: params.published_at,
            pull_requests: regular.to_vec(),
            include_pr_links: stream.include_pr_links,
        };

        let bullets = async {
            if breaking_req.pull_requests.is_empty() {
                return Ok(vec![]);
            }
            summarizer.breaking_bullets(&breaking_req).await
        };

        let body = async {
            if body_req.pull_requests.is_empty() {
                return Ok(String::new());
            }
            summarizer.release_body(&body_req).await
        };

        tokio::try_join!(bullets, body)
    }
}
