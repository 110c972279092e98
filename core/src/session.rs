//! Review editing session.
//!
//! The session owns the record being edited and is passed explicitly to every
//! handler. Each handler runs to completion; auto-save is only checked when the
//! caller asks, typically after handling a user action.

use crate::config::SessionConfig;
use crate::drafts::store::{DraftEntry, DraftStore, SubmissionReceipt};
use crate::error::{CoreError, CoreResult};
use crate::review::checklist::{ArtifactCategory, RiskScore};
use crate::review::model::{Artifact, CheckResult, MetadataField, ReviewRecord, Score};
use crate::review::risk::{self, CategoryRisk, ReviewRisk};
use std::path::Path;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

pub struct ReviewSession {
    record: ReviewRecord,
    autosave_interval: Duration,
    /// Last save, or session start before the first one.
    last_saved_at: OffsetDateTime,
    dirty: bool,
}

impl ReviewSession {
    pub fn new(config: &SessionConfig, now: OffsetDateTime) -> Self {
        let mut record = ReviewRecord::default();
        record.metadata.aimcr_date = iso_date(now);
        Self::from_record(record, config, now)
    }

    /// Resume editing a loaded draft.
    pub fn from_record(record: ReviewRecord, config: &SessionConfig, now: OffsetDateTime) -> Self {
        Self {
            record,
            autosave_interval: Duration::seconds(
                i64::try_from(config.autosave_interval_secs).unwrap_or(i64::MAX),
            ),
            last_saved_at: now,
            dirty: false,
        }
    }

    pub fn record(&self) -> &ReviewRecord {
        &self.record
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Appends a default artifact and returns its index.
    pub fn add_artifact(&mut self, category: ArtifactCategory) -> usize {
        let artifacts = self.record.artifacts_mut(category);
        artifacts.push(Artifact::new_default(category, artifacts.len() + 1));
        self.dirty = true;
        artifacts.len() - 1
    }

    pub fn remove_artifact(&mut self, category: ArtifactCategory, index: usize) -> CoreResult<Artifact> {
        self.artifact_mut(category, index)?;
        self.dirty = true;
        Ok(self.record.artifacts_mut(category).remove(index))
    }

    pub fn rename_artifact(
        &mut self,
        category: ArtifactCategory,
        index: usize,
        name: impl Into<String>,
    ) -> CoreResult<()> {
        self.artifact_mut(category, index)?.name = name.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_score(
        &mut self,
        category: ArtifactCategory,
        index: usize,
        check: &str,
        score: RiskScore,
    ) -> CoreResult<()> {
        self.check_mut(category, index, check)?.score = Some(Score::Level(score));
        self.dirty = true;
        Ok(())
    }

    pub fn set_notes(
        &mut self,
        category: ArtifactCategory,
        index: usize,
        check: &str,
        notes: impl Into<String>,
    ) -> CoreResult<()> {
        self.check_mut(category, index, check)?.notes = notes.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_metadata(&mut self, field: MetadataField, value: impl Into<String>) {
        self.record.metadata.set(field, value);
        self.dirty = true;
    }

    pub fn set_observations(&mut self, text: impl Into<String>) {
        self.record.observations = text.into();
        self.dirty = true;
    }

    pub fn set_recommendation(&mut self, text: impl Into<String>) {
        self.record.recommendation = text.into();
        self.dirty = true;
    }

    pub fn category_risk(&self, category: ArtifactCategory) -> Option<CategoryRisk> {
        risk::category_risk(category, self.record.artifacts(category))
    }

    pub fn review_risk(&self) -> ReviewRisk {
        risk::review_risk(&self.record)
    }

    pub fn save_draft(&mut self, store: &DraftStore, now: OffsetDateTime) -> CoreResult<DraftEntry> {
        if self.record.metadata.aimcr_date.is_none() {
            self.record.metadata.aimcr_date = iso_date(now);
        }
        let entry = store.save(&self.record, now)?;
        self.last_saved_at = now;
        self.dirty = false;
        Ok(entry)
    }

    /// Saves when there are unsaved edits and more than the auto-save interval
    /// has passed since the last save (or since the session started).
    pub fn autosave_if_due(
        &mut self,
        store: &DraftStore,
        now: OffsetDateTime,
    ) -> CoreResult<Option<DraftEntry>> {
        if !self.dirty || now - self.last_saved_at <= self.autosave_interval {
            return Ok(None);
        }
        tracing::debug!(elapsed = %(now - self.last_saved_at), "auto-saving draft");
        self.save_draft(store, now).map(Some)
    }

    /// Final submission. On success the session starts over with an empty record.
    pub fn submit(
        &mut self,
        store: &DraftStore,
        submissions_root: &Path,
        confirmed: bool,
        now: OffsetDateTime,
    ) -> CoreResult<SubmissionReceipt> {
        if !confirmed {
            return Err(CoreError::SubmissionNotConfirmed);
        }
        let receipt = store.submit(&self.record, submissions_root, now)?;
        self.record = ReviewRecord::default();
        self.record.metadata.aimcr_date = iso_date(now);
        self.last_saved_at = now;
        self.dirty = false;
        Ok(receipt)
    }

    fn artifact_mut(&mut self, category: ArtifactCategory, index: usize) -> CoreResult<&mut Artifact> {
        let artifacts = self.record.artifacts_mut(category);
        let len = artifacts.len();
        artifacts.get_mut(index).ok_or(CoreError::ArtifactIndex {
            category: category.key().to_string(),
            index,
            len,
        })
    }

    /// Known checks only; a check missing from a loaded artifact is recreated in place.
    fn check_mut(
        &mut self,
        category: ArtifactCategory,
        index: usize,
        check: &str,
    ) -> CoreResult<&mut CheckResult> {
        if category.check_position(check).is_none() {
            return Err(CoreError::UnknownCheck {
                category: category.key().to_string(),
                check: check.to_string(),
            });
        }
        let artifact = self.artifact_mut(category, index)?;
        if artifact.checks.get(check).is_none() {
            artifact.checks.insert(check, CheckResult::default());
            artifact.checks.sort_for_category(category);
        }
        artifact.checks.get_mut(check).ok_or_else(|| CoreError::UnknownCheck {
            category: category.key().to_string(),
            check: check.to_string(),
        })
    }
}

fn iso_date(now: OffsetDateTime) -> Option<String> {
    now.format(format_description!("[year]-[month]-[day]")).ok()
}
