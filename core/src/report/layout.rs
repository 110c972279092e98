//! Lays a review record out as an ordered list of document blocks.
//!
//! Pagination and typography belong to whichever [`DocumentSink`](super::DocumentSink)
//! consumes the blocks; this module only decides what goes where.

use crate::config::ReportConfig;
use crate::error::{CoreError, CoreResult};
use crate::review::checklist::ArtifactCategory;
use crate::review::model::{Artifact, MetadataField, ReviewRecord};
use crate::review::risk::total_risk;
use time::macros::format_description;
use time::OffsetDateTime;

pub const REPORT_TITLE: &str = "KSL AI Model Control Review";
pub const REVIEW_INFORMATION: &str = "Review Information";
pub const GENERAL_OBSERVATIONS: &str = "General Observations";
pub const FINAL_RECOMMENDATION: &str = "Final Recommendation";

pub const METADATA_MISSING: &str = "N/A";
pub const NO_ITEMS: &str = "No items in this category.";
pub const NO_CHECKS: &str = "No checks recorded.";
pub const NO_OBSERVATIONS: &str = "None recorded.";
pub const NO_RECOMMENDATION: &str = "Not provided.";
pub const EMPTY_CELL: &str = "—";
pub const NOTES_SEE_BELOW: &str = "See details below ↓";

pub const DEFAULT_NOTES_OVERFLOW_THRESHOLD: usize = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleWeight {
    Heavy,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesCell {
    Inline(String),
    /// Notes too long for the table; rendered as an expanded block after it.
    Overflow,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRow {
    pub check: String,
    /// `None` renders as a plain dash.
    pub score: Option<String>,
    pub notes: NotesCell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBlock {
    Title(String),
    Rule(RuleWeight),
    SectionHeader(String),
    ItemHeader { index: usize, name: String },
    FieldTable(Vec<(String, String)>),
    CheckTable(Vec<CheckRow>),
    ExpandedNotes { check: String, notes: String },
    TotalRisk(u32),
    Paragraph(String),
    PageBreak,
    Footer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub blocks: Vec<ReportBlock>,
}

impl ReportDocument {
    pub fn section_headers(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            ReportBlock::SectionHeader(title) => Some(title.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub notes_overflow_threshold: usize,
    pub generated_at: OffsetDateTime,
}

impl ReportOptions {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            notes_overflow_threshold: config.notes_overflow_threshold,
            generated_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            notes_overflow_threshold: DEFAULT_NOTES_OVERFLOW_THRESHOLD,
            generated_at: OffsetDateTime::now_utc(),
        }
    }
}

pub fn build_report(record: &ReviewRecord, options: &ReportOptions) -> CoreResult<ReportDocument> {
    let mut blocks = vec![
        ReportBlock::Title(REPORT_TITLE.to_string()),
        ReportBlock::Rule(RuleWeight::Heavy),
        ReportBlock::SectionHeader(REVIEW_INFORMATION.to_string()),
        ReportBlock::FieldTable(
            MetadataField::ALL
                .iter()
                .map(|field| {
                    let value = record.metadata.get(*field).unwrap_or(METADATA_MISSING);
                    (field.label().to_string(), value.to_string())
                })
                .collect(),
        ),
    ];

    for (pos, category) in ArtifactCategory::ALL.iter().enumerate() {
        if pos > 0 {
            blocks.push(ReportBlock::PageBreak);
        }
        push_category_section(&mut blocks, *category, record.artifacts(*category), options);
    }

    blocks.push(ReportBlock::SectionHeader(GENERAL_OBSERVATIONS.to_string()));
    blocks.push(ReportBlock::Paragraph(or_placeholder(
        &record.observations,
        NO_OBSERVATIONS,
    )));
    blocks.push(ReportBlock::SectionHeader(FINAL_RECOMMENDATION.to_string()));
    blocks.push(ReportBlock::Paragraph(or_placeholder(
        &record.recommendation,
        NO_RECOMMENDATION,
    )));

    blocks.push(ReportBlock::Rule(RuleWeight::Light));
    let stamp = options
        .generated_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| CoreError::TimeFormat(e.to_string()))?;
    blocks.push(ReportBlock::Footer(format!(
        "Report generated on {} UTC",
        stamp
    )));

    Ok(ReportDocument { blocks })
}

fn push_category_section(
    blocks: &mut Vec<ReportBlock>,
    category: ArtifactCategory,
    artifacts: &[Artifact],
    options: &ReportOptions,
) {
    blocks.push(ReportBlock::SectionHeader(category.report_title().to_string()));
    if artifacts.is_empty() {
        blocks.push(ReportBlock::Paragraph(NO_ITEMS.to_string()));
        return;
    }

    for (idx, artifact) in artifacts.iter().enumerate() {
        blocks.push(ReportBlock::ItemHeader {
            index: idx + 1,
            name: artifact.display_name().to_string(),
        });

        if artifact.checks.is_empty() {
            blocks.push(ReportBlock::Paragraph(NO_CHECKS.to_string()));
            continue;
        }

        let mut rows = Vec::with_capacity(artifact.checks.len());
        let mut expanded = Vec::new();
        for (check, result) in artifact.checks.iter() {
            let notes = result.notes.trim();
            let cell = if notes.is_empty() {
                NotesCell::Empty
            } else if notes.chars().count() > options.notes_overflow_threshold {
                expanded.push(ReportBlock::ExpandedNotes {
                    check: check.to_string(),
                    notes: notes.to_string(),
                });
                NotesCell::Overflow
            } else {
                NotesCell::Inline(notes.to_string())
            };
            rows.push(CheckRow {
                check: check.to_string(),
                score: result.score.as_ref().map(|s| s.display()),
                notes: cell,
            });
        }

        tracing::debug!(
            category = category.key(),
            artifact = artifact.display_name(),
            overflowed = expanded.len(),
            "laid out artifact"
        );

        blocks.push(ReportBlock::CheckTable(rows));
        blocks.extend(expanded);
        blocks.push(ReportBlock::TotalRisk(total_risk(artifact.checks.results())));
    }
}

fn or_placeholder(text: &str, placeholder: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}
