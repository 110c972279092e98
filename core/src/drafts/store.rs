use crate::error::{CoreError, CoreResult};
use crate::report::scores_csv::render_scores_csv;
use crate::review::interchange::{parse_review_record, to_draft_json};
use crate::review::model::ReviewRecord;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use time::macros::format_description;
use time::OffsetDateTime;

use super::sync::{publish_quietly, pull_quietly, DraftSync, NoSync};

pub const UNKNOWN_PROJECT: &str = "UNKNOWN";
pub const SUBMISSION_DATA_FILE: &str = "data.json";
pub const SUBMISSION_SCORES_FILE: &str = "scores.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl DraftEntry {
    /// `P1_20251214_093000.json` -> `P1 20251214 093000`
    pub fn label(&self) -> String {
        self.name
            .strip_suffix(".json")
            .unwrap_or(&self.name)
            .replace('_', " ")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub folder: PathBuf,
    pub data_sha256: String,
}

pub struct DraftStore {
    dir: PathBuf,
    sync: Box<dyn DraftSync>,
}

impl DraftStore {
    pub fn open(dir: impl AsRef<Path>) -> CoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            sync: Box::new(NoSync),
        })
    }

    pub fn with_sync(mut self, sync: Box<dyn DraftSync>) -> Self {
        self.sync = sync;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn refresh(&self) {
        pull_quietly(self.sync.as_ref());
    }

    /// Writes `<project>_<YYYYmmdd_HHMMSS>.json`. A save in the same second as a
    /// previous one for the same project replaces it.
    pub fn save(&self, record: &ReviewRecord, now: OffsetDateTime) -> CoreResult<DraftEntry> {
        let project = sanitize_project_id(record.metadata.project_id.as_deref());
        let stamp = now
            .format(format_description!(
                "[year][month][day]_[hour][minute][second]"
            ))
            .map_err(|e| CoreError::TimeFormat(e.to_string()))?;
        let name = format!("{}_{}.json", project, stamp);
        let path = self.dir.join(&name);
        fs::write(&path, to_draft_json(record)?)?;
        let modified = fs::metadata(&path)?.modified()?;
        tracing::info!(draft = %name, "draft saved");

        publish_quietly(self.sync.as_ref(), &format!("draft: {}", project));
        Ok(DraftEntry {
            name,
            path,
            modified,
        })
    }

    /// Newest first.
    pub fn list(&self) -> CoreResult<Vec<DraftEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            entries.push(DraftEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                modified: entry.metadata()?.modified()?,
                path,
            });
        }
        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(entries)
    }

    pub fn load(&self, name: &str) -> CoreResult<ReviewRecord> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "." {
            return Err(CoreError::InvalidInput(format!(
                "draft name must be a plain file name: {:?}",
                name
            )));
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(CoreError::DraftNotFound(name.to_string()));
        }
        read_record_file(&path)
    }

    /// Writes `AIMCR-<project>-<date>/data.json` (same form as drafts) and a
    /// `scores.csv` beside it under `submissions_root`.
    pub fn submit(
        &self,
        record: &ReviewRecord,
        submissions_root: &Path,
        now: OffsetDateTime,
    ) -> CoreResult<SubmissionReceipt> {
        let project = sanitize_project_id(record.metadata.project_id.as_deref());
        let date = now
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|e| CoreError::TimeFormat(e.to_string()))?;
        let folder = submissions_root.join(format!("AIMCR-{}-{}", project, date));
        fs::create_dir_all(&folder)?;

        let data = to_draft_json(record)?;
        fs::write(folder.join(SUBMISSION_DATA_FILE), &data)?;
        fs::write(folder.join(SUBMISSION_SCORES_FILE), render_scores_csv(record)?)?;
        let data_sha256 = sha256_hex(data.as_bytes());
        tracing::info!(folder = %folder.display(), sha256 = %data_sha256, "review submitted");

        publish_quietly(self.sync.as_ref(), &format!("FINAL AIMCR {}", project));
        Ok(SubmissionReceipt {
            folder,
            data_sha256,
        })
    }
}

pub fn read_record_file(path: &Path) -> CoreResult<ReviewRecord> {
    let text = fs::read_to_string(path)?;
    parse_review_record(&text)
}

/// Keeps `[A-Za-z0-9_-]`, replaces anything else with `_`.
pub fn sanitize_project_id(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return UNKNOWN_PROJECT.to_string();
    }
    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
