use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::checklist::{ArtifactCategory, RiskScore};
use super::interchange::normalize_date;

pub const UNNAMED_COMPONENT: &str = "(Unnamed component)";

/// A stored score. Anything outside the closed 1..=5 set is kept verbatim so a
/// hand-edited draft survives a load/save cycle, but it never counts toward risk.
#[derive(Debug, Clone, PartialEq)]
pub enum Score {
    Level(RiskScore),
    Unusable(Value),
}

impl Score {
    pub fn from_json(value: &Value) -> Self {
        let level = match value {
            Value::Number(n) => match n.as_u64() {
                Some(u) => RiskScore::from_value(u),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= 5.0)
                    .and_then(|f| RiskScore::from_value(f as u64)),
            },
            _ => None,
        };
        match level {
            Some(level) => Score::Level(level),
            None => Score::Unusable(value.clone()),
        }
    }

    pub fn risk_score(&self) -> Option<RiskScore> {
        match self {
            Score::Level(level) => Some(*level),
            Score::Unusable(_) => None,
        }
    }

    pub fn value(&self) -> Option<u32> {
        self.risk_score().map(RiskScore::value)
    }

    /// Text shown in the report's score column.
    pub fn display(&self) -> String {
        match self {
            Score::Level(level) => level.value().to_string(),
            Score::Unusable(Value::String(s)) => s.clone(),
            Score::Unusable(other) => other.to_string(),
        }
    }
}

impl From<RiskScore> for Score {
    fn from(level: RiskScore) -> Self {
        Score::Level(level)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Level(level) => serializer.serialize_u32(level.value()),
            Score::Unusable(raw) => raw.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    pub notes: String,
}

impl Default for CheckResult {
    fn default() -> Self {
        Self {
            score: Some(Score::Level(RiskScore::default())),
            notes: String::new(),
        }
    }
}

/// Check name -> result, kept in the owning category's fixed check order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckMap {
    entries: Vec<(String, CheckResult)>,
}

impl CheckMap {
    pub fn for_category(category: ArtifactCategory) -> Self {
        Self {
            entries: category
                .check_names()
                .iter()
                .map(|name| (name.to_string(), CheckResult::default()))
                .collect(),
        }
    }

    pub fn get(&self, check: &str) -> Option<&CheckResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == check)
            .map(|(_, result)| result)
    }

    pub fn get_mut(&mut self, check: &str) -> Option<&mut CheckResult> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == check)
            .map(|(_, result)| result)
    }

    /// Replaces an existing entry in place, otherwise appends.
    pub fn insert(&mut self, check: impl Into<String>, result: CheckResult) {
        let check = check.into();
        match self.get_mut(&check) {
            Some(existing) => *existing = result,
            None => self.entries.push((check, result)),
        }
    }

    /// Appends without merging, so list-shaped input keeps one row per entry.
    pub fn push(&mut self, check: impl Into<String>, result: CheckResult) {
        self.entries.push((check.into(), result));
    }

    pub fn has_duplicate_names(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(i, (name, _))| self.entries[..i].iter().any(|(earlier, _)| earlier == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn results(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.iter().map(|(_, result)| result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorders entries so the category's known checks come first in fixed order;
    /// unknown names keep their relative order after them.
    pub fn sort_for_category(&mut self, category: ArtifactCategory) {
        self.entries.sort_by_key(|(name, _)| {
            category
                .check_position(name)
                .unwrap_or(category.check_names().len())
        });
    }
}

#[derive(Serialize)]
struct NamedCheck<'a> {
    name: &'a str,
    #[serde(flatten)]
    result: &'a CheckResult,
}

/// Keyed by check name; falls back to a `[{"name", ...}]` list when names repeat so
/// no entry is lost.
impl Serialize for CheckMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.has_duplicate_names() {
            let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
            for (name, result) in &self.entries {
                seq.serialize_element(&NamedCheck { name, result })?;
            }
            return seq.end();
        }
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub checks: CheckMap,
}

impl Artifact {
    /// A fresh artifact as created by "add artifact": every check scored 1 with no notes.
    /// `position` is 1-based.
    pub fn new_default(category: ArtifactCategory, position: usize) -> Self {
        Self {
            name: format!("Artifact {}", position),
            checks: CheckMap::for_category(category),
        }
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            UNNAMED_COMPONENT
        } else {
            trimmed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    ProposalTitle,
    PrincipalInvestigator,
    ProposalDate,
    ReviewerName,
    ReviewerId,
    ReviewDate,
    ProjectId,
}

impl MetadataField {
    /// Report order.
    pub const ALL: [MetadataField; 7] = [
        MetadataField::ProposalTitle,
        MetadataField::PrincipalInvestigator,
        MetadataField::ProposalDate,
        MetadataField::ReviewerName,
        MetadataField::ReviewerId,
        MetadataField::ReviewDate,
        MetadataField::ProjectId,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MetadataField::ProposalTitle => "proposal_title",
            MetadataField::PrincipalInvestigator => "principal_investigator",
            MetadataField::ProposalDate => "proposal_date",
            MetadataField::ReviewerName => "reviewer_name",
            MetadataField::ReviewerId => "reviewer_id",
            MetadataField::ReviewDate => "aimcr_date",
            MetadataField::ProjectId => "project_id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetadataField::ProposalTitle => "Proposal Title",
            MetadataField::PrincipalInvestigator => "Principal Investigator",
            MetadataField::ProposalDate => "Proposal Date",
            MetadataField::ReviewerName => "Reviewer Name",
            MetadataField::ReviewerId => "Reviewer ID",
            MetadataField::ReviewDate => "AIMCR Date",
            MetadataField::ProjectId => "Project ID",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReviewMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_investigator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aimcr_date: Option<String>,
    /// Keys this tool does not interpret, carried through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ReviewMetadata {
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Date fields are stored in canonical `YYYY-MM-DD` form when the input is day-first.
    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        let value = value.into();
        let value = match field {
            MetadataField::ProposalDate | MetadataField::ReviewDate => normalize_date(&value),
            _ => value,
        };
        *self.slot_mut(field) = Some(value);
    }

    fn slot(&self, field: MetadataField) -> &Option<String> {
        match field {
            MetadataField::ProposalTitle => &self.proposal_title,
            MetadataField::PrincipalInvestigator => &self.principal_investigator,
            MetadataField::ProposalDate => &self.proposal_date,
            MetadataField::ReviewerName => &self.reviewer_name,
            MetadataField::ReviewerId => &self.reviewer_id,
            MetadataField::ReviewDate => &self.aimcr_date,
            MetadataField::ProjectId => &self.project_id,
        }
    }

    fn slot_mut(&mut self, field: MetadataField) -> &mut Option<String> {
        match field {
            MetadataField::ProposalTitle => &mut self.proposal_title,
            MetadataField::PrincipalInvestigator => &mut self.principal_investigator,
            MetadataField::ProposalDate => &mut self.proposal_date,
            MetadataField::ReviewerName => &mut self.reviewer_name,
            MetadataField::ReviewerId => &mut self.reviewer_id,
            MetadataField::ReviewDate => &mut self.aimcr_date,
            MetadataField::ProjectId => &mut self.project_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReviewRecord {
    pub metadata: ReviewMetadata,
    pub third_party_software: Vec<Artifact>,
    pub source_code: Vec<Artifact>,
    pub datasets_user_files: Vec<Artifact>,
    pub models: Vec<Artifact>,
    pub observations: String,
    pub recommendation: String,
}

impl ReviewRecord {
    pub fn artifacts(&self, category: ArtifactCategory) -> &[Artifact] {
        match category {
            ArtifactCategory::ThirdPartySoftware => &self.third_party_software,
            ArtifactCategory::SourceCode => &self.source_code,
            ArtifactCategory::DatasetsUserFiles => &self.datasets_user_files,
            ArtifactCategory::Models => &self.models,
        }
    }

    pub fn artifacts_mut(&mut self, category: ArtifactCategory) -> &mut Vec<Artifact> {
        match category {
            ArtifactCategory::ThirdPartySoftware => &mut self.third_party_software,
            ArtifactCategory::SourceCode => &mut self.source_code,
            ArtifactCategory::DatasetsUserFiles => &mut self.datasets_user_files,
            ArtifactCategory::Models => &mut self.models,
        }
    }

    pub fn artifact_count(&self) -> usize {
        ArtifactCategory::ALL
            .iter()
            .map(|c| self.artifacts(*c).len())
            .sum()
    }
}
